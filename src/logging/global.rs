// SPDX-License-Identifier: Apache-2.0 OR MIT
// Process-wide registry, bootstrapped from the environment on first use

use serde_json::{Map, Value};
use std::sync::{Arc, OnceLock};

use super::{LogConfig, LogRegistry, Logger, OutputAdapter, Severity};
use crate::config::{ConfigError, LogSettings};

static GLOBAL: OnceLock<LogRegistry> = OnceLock::new();

/// The process-wide registry
///
/// Created on first use from `LOGS`, `LOG_LEVEL` and `LOG_OUTPUT`. Each
/// invalid variable is reported on stderr and replaced by its default, so
/// logging never prevents the process from starting.
pub fn global() -> &'static LogRegistry {
    GLOBAL.get_or_init(|| bootstrap(&LogSettings::from_env()))
}

fn bootstrap(settings: &LogSettings) -> LogRegistry {
    let (validated, errors) = settings.validate_or_default();
    for err in &errors {
        eprintln!("nslog: {} (using the default)", err);
    }
    LogRegistry::with_config(LogConfig::from(validated))
}

/// Get the process-wide handle for a namespace
pub fn create_logger(namespace: &str) -> Logger {
    global().create_logger(namespace)
}

/// Get the process-wide handle for a namespace, allowing forced writes
pub fn create_forced_logger(namespace: &str) -> Logger {
    global().create_forced_logger(namespace)
}

pub fn set_namespaces(filter: &str) -> Result<(), ConfigError> {
    global().set_namespaces(filter)
}

pub fn set_level(level: Severity) {
    global().set_level(level)
}

pub fn set_severity_floor(level: &str) -> Result<(), ConfigError> {
    global().set_severity_floor(level)
}

pub fn set_outputs(outputs: Vec<Arc<dyn OutputAdapter>>) {
    global().set_outputs(outputs)
}

pub fn set_output<A: OutputAdapter + 'static>(output: A) {
    global().set_output(output)
}

pub fn set_outputs_by_name<S: AsRef<str>>(names: &[S]) -> Result<(), ConfigError> {
    global().set_outputs_by_name(names)
}

pub fn set_global_context(context: Map<String, Value>) {
    global().set_global_context(context)
}
