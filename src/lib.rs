// SPDX-License-Identifier: Apache-2.0 OR MIT
//! Namespace-scoped logging facade.
//!
//! Loggers are created per namespace (`"billing:invoice"`), filtered by a
//! namespace pattern list and a severity floor, and write structured records
//! to pluggable outputs.
//!
//! ```ignore
//! nslog::set_namespaces("billing:*,billing:cache=none")?;
//! nslog::set_level(nslog::Severity::Info);
//!
//! let log = nslog::create_logger("billing:invoice");
//! log.info("invoice created");
//! nslog::log_warn!(log, ctx = request_id, "slow upstream", json!({ "ms": 950 }));
//! ```

pub mod config;
pub mod logging;

pub use config::{ConfigError, LogSettings};
pub use logging::{
    create_forced_logger, create_logger, global, id, set_global_context, set_level,
    set_namespaces, set_output, set_outputs, set_outputs_by_name, set_severity_floor, LogRecord,
    LogRegistry, Logger, OutputAdapter, OutputKind, Severity,
};
