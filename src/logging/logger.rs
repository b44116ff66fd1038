// SPDX-License-Identifier: Apache-2.0 OR MIT
// Logger handles and the LogRegistry that materializes them

use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{
    Arc, Mutex, MutexGuard, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard, Weak,
};

use super::entry::LogRecord;
use super::namespace::NamespaceFilter;
use super::output::{OutputAdapter, OutputKind};
use super::Severity;
use crate::config::{ConfigError, LogSettings, ValidatedSettings, DEFAULT_LEVEL};

/// Generate a fresh correlation id (UUID v4)
pub fn id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Filtering and dispatch state shared by every logger of a registry
pub struct LogConfig {
    /// Minimum severity for namespaces whose matching rule has no level
    pub floor: Severity,
    pub filter: NamespaceFilter,
    /// Adapters, called in order
    pub outputs: Vec<Arc<dyn OutputAdapter>>,
    /// Copied into `meta` of every record
    pub global_context: Map<String, Value>,
}

impl LogConfig {
    /// Check if `severity` is enabled for `namespace` under this configuration
    #[inline]
    pub fn is_enabled(&self, namespace: &str, severity: Severity) -> bool {
        self.filter.is_enabled(namespace, severity, self.floor)
    }

    /// Enabled table for a namespace: one bit per emittable severity
    fn enabled_mask(&self, namespace: &str) -> u8 {
        Severity::EMITTABLE
            .into_iter()
            .filter(|severity| self.is_enabled(namespace, *severity))
            .fold(0, |mask, severity| mask | severity.bit())
    }
}

impl Default for LogConfig {
    /// Everything enabled at `warn`, JSON to stdout
    fn default() -> Self {
        Self {
            floor: DEFAULT_LEVEL,
            filter: NamespaceFilter::match_all(),
            outputs: vec![OutputKind::Json.adapter()],
            global_context: Map::new(),
        }
    }
}

impl From<ValidatedSettings> for LogConfig {
    fn from(settings: ValidatedSettings) -> Self {
        Self {
            floor: settings.level,
            filter: settings.filter,
            outputs: settings
                .outputs
                .into_iter()
                .map(OutputKind::adapter)
                .collect(),
            global_context: settings.context,
        }
    }
}

impl std::fmt::Debug for LogConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LogConfig")
            .field("floor", &self.floor)
            .field("namespaces", &self.filter.raw())
            .field("outputs", &self.outputs.len())
            .field("global_context", &self.global_context)
            .finish()
    }
}

struct RegistryInner {
    config: RwLock<LogConfig>,
    /// Lock order: `loggers` before `config`
    loggers: Mutex<HashMap<String, Logger>>,
}

impl RegistryInner {
    fn config(&self) -> RwLockReadGuard<'_, LogConfig> {
        self.config.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn config_mut(&self) -> RwLockWriteGuard<'_, LogConfig> {
        self.config.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn loggers(&self) -> MutexGuard<'_, HashMap<String, Logger>> {
        self.loggers.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Logger handle for one namespace
///
/// Cloning is cheap and every clone refers to the same handle. The enabled
/// table is rebuilt in place by the registry whenever the namespace filter
/// or the floor changes, so a handle never needs to be fetched again.
#[derive(Clone)]
pub struct Logger {
    state: Arc<LoggerState>,
}

struct LoggerState {
    namespace: String,
    enabled: AtomicU8,
    force_write: bool,
    registry: Weak<RegistryInner>,
}

impl Logger {
    fn new(namespace: &str, force_write: bool, mask: u8, registry: Weak<RegistryInner>) -> Self {
        Self {
            state: Arc::new(LoggerState {
                namespace: namespace.to_string(),
                enabled: AtomicU8::new(mask),
                force_write,
                registry,
            }),
        }
    }

    /// Namespace this handle logs under
    pub fn namespace(&self) -> &str {
        &self.state.namespace
    }

    /// Check if a severity currently produces output
    #[inline]
    pub fn is_level_enabled(&self, severity: Severity) -> bool {
        self.state.enabled.load(Ordering::Relaxed) & severity.bit() != 0
    }

    /// All currently enabled severities, ascending
    pub fn enabled_levels(&self) -> Vec<Severity> {
        Severity::EMITTABLE
            .into_iter()
            .filter(|severity| self.is_level_enabled(*severity))
            .collect()
    }

    /// Whether [`Logger::force`] may bypass filtering on this handle
    pub fn can_force_write(&self) -> bool {
        self.state.force_write
    }

    /// True when both values are the same registry handle
    pub fn ptr_eq(&self, other: &Logger) -> bool {
        Arc::ptr_eq(&self.state, &other.state)
    }

    fn resync(&self, config: &LogConfig) {
        let mask = config.enabled_mask(&self.state.namespace);
        self.state.enabled.store(mask, Ordering::Relaxed);
    }

    /// Log a message with a freshly generated context id
    #[inline]
    pub fn log(&self, severity: Severity, message: &str, data: Option<Value>) {
        if !self.is_level_enabled(severity) {
            return;
        }
        self.emit(severity, None, message, data);
    }

    /// Log a message under an existing context id
    ///
    /// An empty `context_id` is replaced by a fresh one.
    #[inline]
    pub fn log_with_context(
        &self,
        severity: Severity,
        context_id: &str,
        message: &str,
        data: Option<Value>,
    ) {
        if !self.is_level_enabled(severity) {
            return;
        }
        self.emit(severity, Some(context_id), message, data);
    }

    /// Log even if the severity is disabled, when this handle was created
    /// with [`LogRegistry::create_forced_logger`]
    ///
    /// On an ordinary handle this is the same as `log`/`log_with_context`.
    pub fn force(
        &self,
        severity: Severity,
        context_id: Option<&str>,
        message: &str,
        data: Option<Value>,
    ) {
        if severity == Severity::None {
            return;
        }
        if !self.is_level_enabled(severity) && !self.state.force_write {
            return;
        }
        self.emit(severity, context_id, message, data);
    }

    /// Log with trace severity
    #[inline]
    pub fn trace(&self, message: &str) {
        self.log(Severity::Trace, message, None);
    }

    /// Log with debug severity
    #[inline]
    pub fn debug(&self, message: &str) {
        self.log(Severity::Debug, message, None);
    }

    /// Log with info severity
    #[inline]
    pub fn info(&self, message: &str) {
        self.log(Severity::Info, message, None);
    }

    /// Log with warn severity
    #[inline]
    pub fn warn(&self, message: &str) {
        self.log(Severity::Warn, message, None);
    }

    /// Log with error severity
    #[inline]
    pub fn error(&self, message: &str) {
        self.log(Severity::Error, message, None);
    }

    /// Build the record and hand it to every output, in order
    fn emit(&self, severity: Severity, context_id: Option<&str>, message: &str, data: Option<Value>) {
        let Some(registry) = self.state.registry.upgrade() else {
            return;
        };

        // Snapshot under the read lock, release it before calling adapters
        let (outputs, meta) = {
            let config = registry.config();
            (config.outputs.clone(), config.global_context.clone())
        };

        let context_id = context_id
            .filter(|ctx| !ctx.is_empty())
            .map(str::to_string)
            .unwrap_or_else(id);

        let record = LogRecord::new(
            severity,
            &self.state.namespace,
            context_id,
            message,
            data,
            meta,
        );

        for output in &outputs {
            output.write(&record);
        }
    }
}

impl std::fmt::Debug for Logger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Logger")
            .field("namespace", &self.state.namespace)
            .field("enabled", &self.enabled_levels())
            .field("force_write", &self.state.force_write)
            .finish()
    }
}

/// Registry of logger handles and the configuration they follow
///
/// Handles are created once per namespace and kept for the lifetime of the
/// registry. Every change to the floor or the namespace filter resyncs all
/// of them.
pub struct LogRegistry {
    inner: Arc<RegistryInner>,
}

impl LogRegistry {
    /// Registry with default configuration (all namespaces, `warn`, JSON)
    pub fn new() -> Self {
        Self::with_config(LogConfig::default())
    }

    pub fn with_config(config: LogConfig) -> Self {
        Self {
            inner: Arc::new(RegistryInner {
                config: RwLock::new(config),
                loggers: Mutex::new(HashMap::new()),
            }),
        }
    }

    /// Create a registry from settings, rejecting invalid ones
    pub fn from_settings(settings: &LogSettings) -> Result<Self, ConfigError> {
        let validated = settings.validate()?;
        Ok(Self::with_config(LogConfig::from(validated)))
    }

    /// Create a registry from `LOGS`, `LOG_LEVEL` and `LOG_OUTPUT`
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_settings(&LogSettings::from_env())
    }

    /// Get the handle for a namespace, creating it on first use
    pub fn create_logger(&self, namespace: &str) -> Logger {
        self.get_or_create(namespace, false)
    }

    /// Like `create_logger`, but the new handle may bypass filtering through
    /// [`Logger::force`]
    ///
    /// The capability is fixed when the handle is first created: a namespace
    /// that already has an ordinary handle keeps it.
    pub fn create_forced_logger(&self, namespace: &str) -> Logger {
        self.get_or_create(namespace, true)
    }

    fn get_or_create(&self, namespace: &str, force_write: bool) -> Logger {
        let mut loggers = self.inner.loggers();
        if let Some(logger) = loggers.get(namespace) {
            return logger.clone();
        }

        let mask = self.inner.config().enabled_mask(namespace);
        let logger = Logger::new(namespace, force_write, mask, Arc::downgrade(&self.inner));
        loggers.insert(namespace.to_string(), logger.clone());
        logger
    }

    /// Get an existing handle without creating one
    pub fn get(&self, namespace: &str) -> Option<Logger> {
        self.inner.loggers().get(namespace).cloned()
    }

    /// Number of handles created so far
    pub fn len(&self) -> usize {
        self.inner.loggers().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Replace the namespace filter and resync all handles
    pub fn set_namespaces(&self, filter: &str) -> Result<(), ConfigError> {
        let filter = NamespaceFilter::parse(filter)?;
        self.reconfigure(|config| config.filter = filter);
        Ok(())
    }

    /// Set the global severity floor and resync all handles
    pub fn set_level(&self, level: Severity) {
        self.reconfigure(|config| config.floor = level);
    }

    /// Set the floor by name (`"trace"` … `"error"`, or `"none"`)
    pub fn set_severity_floor(&self, level: &str) -> Result<(), ConfigError> {
        let level = level.parse::<Severity>()?;
        self.set_level(level);
        Ok(())
    }

    /// Replace the outputs; an empty list silences everything
    pub fn set_outputs(&self, outputs: Vec<Arc<dyn OutputAdapter>>) {
        self.inner.config_mut().outputs = outputs;
    }

    /// Use a single output
    pub fn set_output<A: OutputAdapter + 'static>(&self, output: A) {
        self.set_outputs(vec![Arc::new(output)]);
    }

    /// Select built-in outputs by name (`"json"`, `"pretty"`)
    pub fn set_outputs_by_name<S: AsRef<str>>(&self, names: &[S]) -> Result<(), ConfigError> {
        let kinds = names
            .iter()
            .map(|name| name.as_ref().parse::<OutputKind>())
            .collect::<Result<Vec<_>, _>>()?;
        self.set_outputs(kinds.into_iter().map(OutputKind::adapter).collect());
        Ok(())
    }

    /// Replace the global context wholesale
    pub fn set_global_context(&self, context: Map<String, Value>) {
        self.inner.config_mut().global_context = context;
    }

    /// Validate settings, then replace the whole configuration at once
    pub fn apply(&self, settings: &LogSettings) -> Result<(), ConfigError> {
        let config = LogConfig::from(settings.validate()?);
        self.reconfigure(move |current| *current = config);
        Ok(())
    }

    /// Current severity floor
    pub fn level(&self) -> Severity {
        self.inner.config().floor
    }

    /// Current namespace filter string
    pub fn namespaces(&self) -> String {
        self.inner.config().filter.raw().to_string()
    }

    /// Copy of the current global context
    pub fn global_context(&self) -> Map<String, Value> {
        self.inner.config().global_context.clone()
    }

    /// Evaluate the current configuration without creating a handle
    pub fn is_enabled(&self, namespace: &str, severity: Severity) -> bool {
        self.inner.config().is_enabled(namespace, severity)
    }

    /// Rebuild the enabled table of every handle from the current config
    pub fn resync_all(&self) {
        let loggers = self.inner.loggers();
        let config = self.inner.config();
        for logger in loggers.values() {
            logger.resync(&config);
        }
    }

    fn reconfigure<F: FnOnce(&mut LogConfig)>(&self, update: F) {
        let loggers = self.inner.loggers();
        let mut config = self.inner.config_mut();
        update(&mut config);
        for logger in loggers.values() {
            logger.resync(&config);
        }
    }
}

impl Default for LogRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for LogRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let loggers = self.inner.loggers();
        let config = self.inner.config();
        f.debug_struct("LogRegistry")
            .field("config", &*config)
            .field("loggers", &loggers.len())
            .finish()
    }
}
