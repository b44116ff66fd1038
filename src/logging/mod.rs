// SPDX-License-Identifier: Apache-2.0 OR MIT
// Namespace-scoped logging: severity filtering, logger registry, outputs
//
// Flow: a namespace filter and a severity floor decide, per namespace, which
// severities are enabled. The registry caches one Logger per namespace and
// rebuilds its enabled table on every filter/floor change. Enabled calls
// build a LogRecord and hand it to each output in order.

mod entry;
mod global;
mod logger;
#[macro_use]
mod macros;
mod namespace;
mod output;
mod severity;

// Public exports
pub use entry::{to_data, LogRecord};
pub use global::{
    create_forced_logger, create_logger, global, set_global_context, set_level, set_namespaces,
    set_output, set_outputs, set_outputs_by_name, set_severity_floor,
};
pub use logger::{id, LogConfig, LogRegistry, Logger};
pub use namespace::{NamespaceFilter, NamespaceRule};
pub use output::{
    json_line, pretty_text, stringify, JsonOutput, OutputAdapter, OutputKind, PrettyOutput,
};
pub use severity::Severity;
