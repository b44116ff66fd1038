// SPDX-License-Identifier: Apache-2.0 OR MIT
// Namespace filter rules: glob patterns with optional per-pattern levels

use regex::Regex;

use super::Severity;
use crate::config::ConfigError;

/// One compiled segment of a namespace filter (`pattern` or `pattern=level`)
#[derive(Debug, Clone)]
pub struct NamespaceRule {
    glob: String,
    regex: Regex,
    /// Explicit level for matching namespaces; `None` defers to the floor
    pub min_severity: Option<Severity>,
}

impl NamespaceRule {
    /// Parse a single filter segment
    ///
    /// Returns `Ok(None)` when the segment has an empty pattern, so that a
    /// stray `=info` is ignored rather than rejected.
    pub fn parse(segment: &str) -> Result<Option<Self>, ConfigError> {
        let (glob, level) = match segment.split_once('=') {
            Some((glob, level)) => (glob, level),
            None => (segment, ""),
        };

        let min_severity = if level.is_empty() {
            None
        } else {
            let severity = Severity::from_name(level).ok_or_else(|| {
                ConfigError::InvalidNamespaceLevel {
                    level: level.to_string(),
                    segment: segment.to_string(),
                }
            })?;
            Some(severity)
        };

        if glob.is_empty() {
            return Ok(None);
        }

        let regex = compile_glob(glob)?;
        Ok(Some(Self {
            glob: glob.to_string(),
            regex,
            min_severity,
        }))
    }

    /// The glob this rule was compiled from
    pub fn glob(&self) -> &str {
        &self.glob
    }

    /// Check whether the rule's pattern matches the whole namespace
    #[inline]
    pub fn matches(&self, namespace: &str) -> bool {
        self.regex.is_match(namespace)
    }
}

/// Translate a glob into an anchored regex: `*` matches any substring,
/// everything else is literal.
fn compile_glob(glob: &str) -> Result<Regex, ConfigError> {
    let body: Vec<String> = glob.split('*').map(regex::escape).collect();
    let pattern = format!("^{}$", body.join(".*?"));
    Regex::new(&pattern).map_err(|source| ConfigError::InvalidPattern {
        pattern: glob.to_string(),
        source,
    })
}

/// Ordered list of namespace rules, as declared in the filter string
#[derive(Debug, Clone, Default)]
pub struct NamespaceFilter {
    raw: String,
    rules: Vec<NamespaceRule>,
}

impl NamespaceFilter {
    /// Filter that matches every namespace at the global floor
    pub fn match_all() -> Self {
        Self::parse("*").unwrap_or_default()
    }

    /// Parse a comma-separated filter string such as `"app:*,app:db=none"`
    ///
    /// All whitespace is stripped first. An empty string yields an empty
    /// filter, which enables nothing.
    pub fn parse(raw: &str) -> Result<Self, ConfigError> {
        let stripped: String = raw.chars().filter(|c| !c.is_whitespace()).collect();

        let mut rules = Vec::new();
        if !stripped.is_empty() {
            for segment in stripped.split(',') {
                if let Some(rule) = NamespaceRule::parse(segment)? {
                    rules.push(rule);
                }
            }
        }

        Ok(Self {
            raw: raw.to_string(),
            rules,
        })
    }

    /// The filter string this was parsed from
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Rules in declaration order
    pub fn rules(&self) -> &[NamespaceRule] {
        &self.rules
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Decide whether `severity` is enabled for `namespace`
    ///
    /// Rules are scanned last-declared first. Any match enables the
    /// namespace; the first match carrying an explicit level replaces
    /// `floor` and ends the scan. A namespace no rule matches is disabled.
    pub fn is_enabled(&self, namespace: &str, severity: Severity, floor: Severity) -> bool {
        if severity == Severity::None {
            return false;
        }

        let mut matched = false;
        let mut effective = floor;

        for rule in self.rules.iter().rev() {
            if !rule.matches(namespace) {
                continue;
            }
            matched = true;
            if let Some(level) = rule.min_severity {
                effective = level;
                break;
            }
        }

        matched && severity >= effective
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn enabled(filter: &str, namespace: &str, severity: Severity, floor: Severity) -> bool {
        NamespaceFilter::parse(filter)
            .unwrap()
            .is_enabled(namespace, severity, floor)
    }

    #[test]
    fn test_parse_preserves_order() {
        let filter = NamespaceFilter::parse("a:*=warn, b , c=error").unwrap();
        let globs: Vec<&str> = filter.rules().iter().map(|r| r.glob()).collect();
        assert_eq!(globs, vec!["a:*", "b", "c"]);
        assert_eq!(filter.rules()[0].min_severity, Some(Severity::Warn));
        assert_eq!(filter.rules()[1].min_severity, None);
        assert_eq!(filter.rules()[2].min_severity, Some(Severity::Error));
    }

    #[test]
    fn test_empty_filter_enables_nothing() {
        let filter = NamespaceFilter::parse("").unwrap();
        assert!(filter.is_empty());
        assert!(!filter.is_enabled("", Severity::Error, Severity::Trace));

        let filter = NamespaceFilter::parse("  \t ").unwrap();
        assert!(filter.is_empty());
    }

    #[test]
    fn test_empty_pattern_is_skipped() {
        let filter = NamespaceFilter::parse("=info,app").unwrap();
        assert_eq!(filter.rules().len(), 1);
        assert_eq!(filter.rules()[0].glob(), "app");

        let filter = NamespaceFilter::parse(",,app,").unwrap();
        assert_eq!(filter.rules().len(), 1);
    }

    #[test]
    fn test_empty_level_is_bare_rule() {
        let filter = NamespaceFilter::parse("app=").unwrap();
        assert_eq!(filter.rules()[0].min_severity, None);
    }

    #[test]
    fn test_unknown_level_is_rejected() {
        let err = NamespaceFilter::parse("app:*=loud").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidNamespaceLevel { ref level, .. } if level == "loud"
        ));

        // Even when the pattern is empty, the level is validated
        assert!(NamespaceFilter::parse("=loud").is_err());
    }

    #[test]
    fn test_wildcard_matching() {
        let rule = NamespaceRule::parse("app:*:db").unwrap().unwrap();
        assert!(rule.matches("app:users:db"));
        assert!(rule.matches("app::db"));
        assert!(!rule.matches("app:users:db:pool"));
        assert!(!rule.matches("xapp:users:db"));

        let rule = NamespaceRule::parse("*").unwrap().unwrap();
        assert!(rule.matches(""));
        assert!(rule.matches("anything:at:all"));
    }

    #[test]
    fn test_pattern_is_literal_apart_from_star() {
        let rule = NamespaceRule::parse("svc.api").unwrap().unwrap();
        assert!(rule.matches("svc.api"));
        assert!(!rule.matches("svcXapi"));

        let rule = NamespaceRule::parse("a(b)+").unwrap().unwrap();
        assert!(rule.matches("a(b)+"));
    }

    #[test]
    fn test_floor_applies_to_bare_rule() {
        assert!(enabled("*", "x", Severity::Info, Severity::Info));
        assert!(!enabled("*", "x", Severity::Debug, Severity::Info));
    }

    #[test]
    fn test_unmatched_namespace_is_disabled() {
        assert!(!enabled("test:*", "default", Severity::Error, Severity::Trace));
    }

    #[test]
    fn test_explicit_level_overrides_floor() {
        assert!(enabled("test:*=debug", "test:sub", Severity::Debug, Severity::Info));
        assert!(!enabled("test:*=error", "test:sub", Severity::Warn, Severity::Info));
        assert!(enabled("*=trace", "x", Severity::Trace, Severity::Error));
    }

    #[test]
    fn test_last_explicit_match_wins() {
        let filter = "test:*=warn,test2:*,test:*=error,test2:*=none";
        assert!(!enabled(filter, "test:subtest", Severity::Warn, Severity::Info));
        assert!(enabled(filter, "test:subtest", Severity::Error, Severity::Info));
        for severity in Severity::EMITTABLE {
            assert!(!enabled(filter, "test2:subtest", severity, Severity::Info));
        }
    }

    #[test]
    fn test_silencing_child_namespace() {
        let filter = "ns1:*,ns1:subns1=none";
        assert!(enabled(filter, "ns1:subns2", Severity::Warn, Severity::Info));
        assert!(!enabled(filter, "ns1:subns1", Severity::Warn, Severity::Info));
        assert!(!enabled(filter, "ns1:subns1", Severity::Error, Severity::Info));
    }

    #[test]
    fn test_later_bare_rule_does_not_override_earlier_level() {
        // The trailing bare "*" only marks the namespace as matched; the
        // earlier explicit level still sets the threshold.
        let filter = "app=error,*";
        assert!(!enabled(filter, "app", Severity::Warn, Severity::Info));
        assert!(enabled(filter, "app", Severity::Error, Severity::Info));
        assert!(enabled(filter, "other", Severity::Info, Severity::Info));
    }

    #[test]
    fn test_none_is_never_enabled() {
        assert!(!enabled("*=trace", "x", Severity::None, Severity::Trace));
    }
}
