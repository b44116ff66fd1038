// SPDX-License-Identifier: Apache-2.0 OR MIT
// Severity levels for logging (trace is least severe, none silences)

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::config::ConfigError;

/// Log severity levels, ordered from least to most severe
///
/// `None` is a sentinel: it is never enabled and never the level of an
/// emitted record. Used as a namespace rule level it silences the namespace.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Very verbose tracing
    Trace = 0,
    /// Debug-level messages
    Debug = 1,
    /// Informational
    Info = 2,
    /// Warning conditions
    Warn = 3,
    /// Error conditions
    Error = 4,
    /// Never enabled
    None = 5,
}

impl Severity {
    /// Every severity, in ascending order
    pub const ALL: [Severity; 6] = [
        Severity::Trace,
        Severity::Debug,
        Severity::Info,
        Severity::Warn,
        Severity::Error,
        Severity::None,
    ];

    /// Severities a record can be emitted at (everything but `None`)
    pub const EMITTABLE: [Severity; 5] = [
        Severity::Trace,
        Severity::Debug,
        Severity::Info,
        Severity::Warn,
        Severity::Error,
    ];

    /// Get severity name as static string
    pub const fn as_str(self) -> &'static str {
        match self {
            Severity::Trace => "trace",
            Severity::Debug => "debug",
            Severity::Info => "info",
            Severity::Warn => "warn",
            Severity::Error => "error",
            Severity::None => "none",
        }
    }

    /// Look up a severity by its exact (lowercase) name
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.as_str() == name)
    }

    /// Bit used for this severity in a logger's enabled table
    #[inline]
    pub(crate) const fn bit(self) -> u8 {
        1 << (self as u8)
    }
}

impl FromStr for Severity {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s).ok_or_else(|| ConfigError::InvalidLevel(s.to_string()))
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_ordering() {
        assert!(Severity::Trace < Severity::Debug);
        assert!(Severity::Debug < Severity::Info);
        assert!(Severity::Info < Severity::Warn);
        assert!(Severity::Warn < Severity::Error);
        assert!(Severity::Error < Severity::None);
    }

    #[test]
    fn test_severity_bits_are_distinct() {
        let mask = Severity::ALL.into_iter().fold(0u8, |mask, s| {
            assert_eq!(mask & s.bit(), 0);
            mask | s.bit()
        });
        assert_eq!(mask, 0b11_1111);
        assert_eq!(Severity::Trace.bit(), 1);
        assert_eq!(Severity::None.bit(), 1 << 5);
    }

    #[test]
    fn test_severity_parse() {
        assert_eq!("warn".parse::<Severity>().unwrap(), Severity::Warn);
        assert_eq!("none".parse::<Severity>().unwrap(), Severity::None);

        // Case-sensitive
        let err = "WARN".parse::<Severity>().unwrap_err();
        assert_eq!(err.to_string(), "Invalid level: 'WARN'");
        assert!("warning".parse::<Severity>().is_err());
    }

    #[test]
    fn test_severity_display() {
        assert_eq!(format!("{}", Severity::Trace), "trace");
        assert_eq!(format!("{}", Severity::Error), "error");
    }

    #[test]
    fn test_emittable_excludes_none() {
        assert!(!Severity::EMITTABLE.contains(&Severity::None));
        assert_eq!(Severity::EMITTABLE.len() + 1, Severity::ALL.len());
    }

    #[test]
    fn test_serde_names() {
        let json = serde_json::to_string(&Severity::Warn).unwrap();
        assert_eq!(json, "\"warn\"");
        let parsed: Severity = serde_json::from_str("\"debug\"").unwrap();
        assert_eq!(parsed, Severity::Debug);
    }
}
