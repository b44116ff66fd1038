// SPDX-License-Identifier: Apache-2.0 OR MIT
//! Logging configuration: error type, settings and environment bootstrap.
//!
//! Settings come from three places, in increasing precedence:
//! - built-in defaults (`*`, `warn`, `json`)
//! - a JSON5 settings file
//! - the `LOGS`, `LOG_LEVEL` and `LOG_OUTPUT` environment variables

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::logging::{NamespaceFilter, OutputKind, Severity};

/// Environment variable holding the namespace filter
pub const ENV_NAMESPACES: &str = "LOGS";
/// Environment variable holding the severity floor
pub const ENV_LEVEL: &str = "LOG_LEVEL";
/// Environment variable holding a comma-separated list of outputs
pub const ENV_OUTPUT: &str = "LOG_OUTPUT";

pub const DEFAULT_NAMESPACES: &str = "*";
pub const DEFAULT_LEVEL: Severity = Severity::Warn;

/// Configuration errors
///
/// Every setter validates its input before touching any state, so a call
/// that returns one of these leaves the previous configuration in place.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid level: '{0}'")]
    InvalidLevel(String),

    #[error("Level {level} is not a valid log level (in namespace '{segment}')")]
    InvalidNamespaceLevel { level: String, segment: String },

    #[error("Invalid namespace pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("Invalid output: '{0}'")]
    InvalidOutput(String),

    #[error("failed to read settings file '{}': {}", .0.display(), .1)]
    Io(PathBuf, String),

    #[error("failed to parse settings: {0}")]
    Parse(String),
}

/// Logging settings as found in a settings file or the environment
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LogSettings {
    /// Namespace filter, e.g. `"app:*,app:db=none"`
    #[serde(default = "default_namespaces")]
    pub namespaces: String,

    /// Severity floor name
    #[serde(default = "default_level")]
    pub level: String,

    /// Built-in output names, in dispatch order
    #[serde(default = "default_outputs")]
    pub outputs: Vec<String>,

    /// Global context attached to every record
    #[serde(default)]
    pub context: Map<String, Value>,
}

fn default_namespaces() -> String {
    DEFAULT_NAMESPACES.to_string()
}

fn default_level() -> String {
    DEFAULT_LEVEL.as_str().to_string()
}

fn default_outputs() -> Vec<String> {
    vec![OutputKind::Json.as_str().to_string()]
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            namespaces: default_namespaces(),
            level: default_level(),
            outputs: default_outputs(),
            context: Map::new(),
        }
    }
}

/// Settings after validation, ready to be applied to a registry
#[derive(Debug, Clone)]
pub struct ValidatedSettings {
    pub filter: NamespaceFilter,
    pub level: Severity,
    pub outputs: Vec<OutputKind>,
    pub context: Map<String, Value>,
}

impl LogSettings {
    /// Load settings from a JSON5 file
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(path.to_path_buf(), e.to_string()))?;
        Self::parse(&content)
    }

    /// Parse settings from a JSON5 string; missing fields take defaults
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        json5::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Defaults overridden by the process environment
    pub fn from_env() -> Self {
        Self::default().with_overrides(|key| std::env::var(key).ok())
    }

    /// Override fields from a variable lookup (`LOGS`, `LOG_LEVEL`, `LOG_OUTPUT`)
    ///
    /// Unset or empty variables leave the field unchanged.
    pub fn with_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.is_empty());

        if let Some(namespaces) = var(ENV_NAMESPACES) {
            self.namespaces = namespaces;
        }
        if let Some(level) = var(ENV_LEVEL) {
            self.level = level;
        }
        if let Some(outputs) = var(ENV_OUTPUT) {
            self.outputs = outputs
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect();
        }
        self
    }

    /// Check every field, reporting the first problem found
    pub fn validate(&self) -> Result<ValidatedSettings, ConfigError> {
        let filter = NamespaceFilter::parse(&self.namespaces)?;
        let level = self.level.parse::<Severity>()?;
        let outputs = self
            .outputs
            .iter()
            .map(|name| name.parse::<OutputKind>())
            .collect::<Result<Vec<_>, _>>()?;

        Ok(ValidatedSettings {
            filter,
            level,
            outputs,
            context: self.context.clone(),
        })
    }

    /// Check every field, replacing each invalid one by its default
    ///
    /// Returns the usable settings along with one error per field that was
    /// replaced.
    pub fn validate_or_default(&self) -> (ValidatedSettings, Vec<ConfigError>) {
        let mut errors = Vec::new();

        let filter = NamespaceFilter::parse(&self.namespaces).unwrap_or_else(|e| {
            errors.push(e);
            NamespaceFilter::match_all()
        });
        let level = self.level.parse::<Severity>().unwrap_or_else(|e| {
            errors.push(e);
            DEFAULT_LEVEL
        });
        let outputs = self
            .outputs
            .iter()
            .map(|name| name.parse::<OutputKind>())
            .collect::<Result<Vec<_>, _>>()
            .unwrap_or_else(|e| {
                errors.push(e);
                vec![OutputKind::Json]
            });

        let validated = ValidatedSettings {
            filter,
            level,
            outputs,
            context: self.context.clone(),
        };
        (validated, errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::HashMap;
    use std::io::Write;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let settings = LogSettings::default();
        assert_eq!(settings.namespaces, "*");
        assert_eq!(settings.level, "warn");
        assert_eq!(settings.outputs, vec!["json".to_string()]);
        assert!(settings.context.is_empty());
    }

    #[test]
    fn test_parse_minimal_settings() {
        let settings = LogSettings::parse("{}").unwrap();
        assert_eq!(settings, LogSettings::default());
    }

    #[test]
    fn test_parse_settings_with_comments() {
        let json5 = r#"{
            // enable everything under app, silence the db layer
            namespaces: "app:*, app:db=none",
            level: "info",
            outputs: ["pretty", "json"],
            context: { service: "billing", version: 2 },
        }"#;

        let settings = LogSettings::parse(json5).unwrap();
        assert_eq!(settings.namespaces, "app:*, app:db=none");
        assert_eq!(settings.level, "info");
        assert_eq!(settings.outputs, vec!["pretty", "json"]);
        assert_eq!(settings.context.get("service"), Some(&json!("billing")));

        let validated = settings.validate().unwrap();
        assert_eq!(validated.level, Severity::Info);
        assert_eq!(validated.outputs, vec![OutputKind::Pretty, OutputKind::Json]);
        assert_eq!(validated.filter.rules().len(), 2);
    }

    #[test]
    fn test_parse_error() {
        let err = LogSettings::parse("{ namespaces: ").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "{{ level: 'debug' }}").unwrap();

        let settings = LogSettings::load_from_file(file.path()).unwrap();
        assert_eq!(settings.level, "debug");
        assert_eq!(settings.namespaces, "*");
    }

    #[test]
    fn test_load_missing_file() {
        let err = LogSettings::load_from_file(Path::new("/nonexistent/nslog.json5")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(..)));
        assert!(err.to_string().contains("/nonexistent/nslog.json5"));
    }

    #[test]
    fn test_env_overrides() {
        let settings = LogSettings::default().with_overrides(lookup(&[
            ("LOGS", "api:*"),
            ("LOG_LEVEL", "debug"),
            ("LOG_OUTPUT", "pretty, json"),
        ]));
        assert_eq!(settings.namespaces, "api:*");
        assert_eq!(settings.level, "debug");
        assert_eq!(settings.outputs, vec!["pretty", "json"]);
    }

    #[test]
    fn test_empty_env_values_are_ignored() {
        let settings =
            LogSettings::default().with_overrides(lookup(&[("LOGS", ""), ("LOG_LEVEL", "")]));
        assert_eq!(settings, LogSettings::default());
    }

    #[test]
    fn test_validate_errors() {
        let settings = LogSettings {
            level: "verbose".into(),
            ..Default::default()
        };
        assert_eq!(
            settings.validate().unwrap_err().to_string(),
            "Invalid level: 'verbose'"
        );

        let settings = LogSettings {
            outputs: vec!["json".into(), "syslog".into()],
            ..Default::default()
        };
        assert_eq!(
            settings.validate().unwrap_err().to_string(),
            "Invalid output: 'syslog'"
        );

        let settings = LogSettings {
            namespaces: "a=loud".into(),
            ..Default::default()
        };
        assert!(matches!(
            settings.validate().unwrap_err(),
            ConfigError::InvalidNamespaceLevel { .. }
        ));
    }

    #[test]
    fn test_validate_or_default_keeps_valid_fields() {
        let settings = LogSettings::default().with_overrides(lookup(&[
            ("LOGS", "api:*"),
            ("LOG_LEVEL", "loud"),
            ("LOG_OUTPUT", "pretty"),
        ]));

        let (validated, errors) = settings.validate_or_default();
        assert_eq!(errors.len(), 1);
        assert!(matches!(errors[0], ConfigError::InvalidLevel(_)));
        assert_eq!(validated.level, DEFAULT_LEVEL);
        assert_eq!(validated.filter.raw(), "api:*");
        assert_eq!(validated.outputs, vec![OutputKind::Pretty]);
    }

    #[test]
    fn test_validate_or_default_replaces_each_bad_field() {
        let settings = LogSettings {
            namespaces: "api=loud".into(),
            level: "info".into(),
            outputs: vec!["pretty".into(), "fax".into()],
            ..Default::default()
        };

        let (validated, errors) = settings.validate_or_default();
        assert_eq!(errors.len(), 2);
        assert_eq!(validated.filter.raw(), DEFAULT_NAMESPACES);
        assert_eq!(validated.level, Severity::Info);
        assert_eq!(validated.outputs, vec![OutputKind::Json]);

        let (_, errors) = LogSettings::default().validate_or_default();
        assert!(errors.is_empty());
    }
}
