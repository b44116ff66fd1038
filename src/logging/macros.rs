// SPDX-License-Identifier: Apache-2.0 OR MIT
// Logging macros for convenient logging

/// Shared expansion for the per-severity macros
///
/// Accepts `logger, msg`, `logger, msg, data` and the same two forms
/// prefixed with `ctx = id,`. `data` is anything serializable.
#[doc(hidden)]
#[macro_export]
macro_rules! __nslog_at {
    ($severity:expr, $logger:expr, ctx = $ctx:expr, $msg:expr) => {
        $logger.log_with_context($severity, &$ctx, &$msg, None)
    };
    ($severity:expr, $logger:expr, ctx = $ctx:expr, $msg:expr, $data:expr) => {
        $logger.log_with_context(
            $severity,
            &$ctx,
            &$msg,
            $crate::logging::to_data(&$data),
        )
    };
    ($severity:expr, $logger:expr, $msg:expr) => {
        $logger.log($severity, &$msg, None)
    };
    ($severity:expr, $logger:expr, $msg:expr, $data:expr) => {
        $logger.log($severity, &$msg, $crate::logging::to_data(&$data))
    };
}

/// Log a message with trace severity
///
/// # Examples
/// ```ignore
/// log_trace!(logger, "entering handler");
/// ```
#[macro_export]
macro_rules! log_trace {
    ($($arg:tt)+) => {
        $crate::__nslog_at!($crate::logging::Severity::Trace, $($arg)+)
    };
}

/// Log a message with debug severity
///
/// # Examples
/// ```ignore
/// log_debug!(logger, "cache miss", json!({ "key": key }));
/// ```
#[macro_export]
macro_rules! log_debug {
    ($($arg:tt)+) => {
        $crate::__nslog_at!($crate::logging::Severity::Debug, $($arg)+)
    };
}

/// Log a message with info severity
///
/// # Examples
/// ```ignore
/// log_info!(logger, ctx = request_id, "request accepted");
/// ```
#[macro_export]
macro_rules! log_info {
    ($($arg:tt)+) => {
        $crate::__nslog_at!($crate::logging::Severity::Info, $($arg)+)
    };
}

/// Log a message with warn severity
///
/// # Examples
/// ```ignore
/// log_warn!(logger, "retrying", json!({ "attempt": 3 }));
/// ```
#[macro_export]
macro_rules! log_warn {
    ($($arg:tt)+) => {
        $crate::__nslog_at!($crate::logging::Severity::Warn, $($arg)+)
    };
}

/// Log a message with error severity
///
/// # Examples
/// ```ignore
/// log_error!(logger, ctx = request_id, "upstream failed", json!({ "status": 502 }));
/// ```
#[macro_export]
macro_rules! log_error {
    ($($arg:tt)+) => {
        $crate::__nslog_at!($crate::logging::Severity::Error, $($arg)+)
    };
}
