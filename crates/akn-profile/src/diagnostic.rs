//! Located findings against a profile document

use crate::line_index::Location;
use serde::Serialize;
use std::fmt;

/// How serious a finding is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Info,
}

impl Severity {
    fn rank(self) -> u8 {
        match self {
            Severity::Error => 2,
            Severity::Warning => 1,
            Severity::Info => 0,
        }
    }

    /// Whether this severity is at least as serious as `minimum`
    pub fn at_least(self, minimum: Severity) -> bool {
        self.rank() >= minimum.rank()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Info => "info",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "error" => Ok(Severity::Error),
            "warning" | "warn" => Ok(Severity::Warning),
            "info" => Ok(Severity::Info),
            other => Err(format!("unknown severity '{}'", other)),
        }
    }
}

/// A single finding.
///
/// `rule_id` is dot-namespaced by category (`vocabulary.unknown-element`,
/// `parse.yaml-syntax`, ...) and is stable for downstream tooling. `line` is
/// 1-based and `column` 0-based.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Diagnostic {
    pub rule_id: String,
    pub path: String,
    pub message: String,
    pub severity: Severity,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub column: Option<usize>,
}

impl Diagnostic {
    pub fn new(
        severity: Severity,
        rule_id: impl Into<String>,
        path: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            rule_id: rule_id.into(),
            path: path.into(),
            message: message.into(),
            severity,
            line: None,
            column: None,
        }
    }

    pub fn error(rule_id: impl Into<String>, path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(Severity::Error, rule_id, path, message)
    }

    pub fn warning(rule_id: impl Into<String>, path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, rule_id, path, message)
    }

    pub fn info(rule_id: impl Into<String>, path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(Severity::Info, rule_id, path, message)
    }

    #[must_use]
    pub fn at(mut self, location: Option<Location>) -> Self {
        if let Some(location) = location {
            self.line = Some(location.line);
            self.column = Some(location.column);
        }
        self
    }

    #[must_use]
    pub fn at_line(mut self, line: Option<usize>) -> Self {
        self.line = line;
        self
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }

    /// The rule category, the part of `rule_id` before the first dot
    pub fn category(&self) -> &str {
        self.rule_id.split('.').next().unwrap_or_default()
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.line {
            Some(line) => write!(
                f,
                "{} [{}] line {}: {}",
                self.severity, self.rule_id, line, self.message
            ),
            None => write!(f, "{} [{}] {}: {}", self.severity, self.rule_id, self.path, self.message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_ordering() {
        assert!(Severity::Error.at_least(Severity::Warning));
        assert!(Severity::Warning.at_least(Severity::Warning));
        assert!(!Severity::Info.at_least(Severity::Warning));
        assert_eq!("warn".parse::<Severity>().unwrap(), Severity::Warning);
        assert!("fatal".parse::<Severity>().is_err());
    }

    #[test]
    fn test_location_applied() {
        let diag = Diagnostic::error("vocabulary.unknown-element", "profile.elements.x", "unknown")
            .at(Some(Location { line: 4, column: 4 }));
        assert_eq!(diag.line, Some(4));
        assert_eq!(diag.column, Some(4));
        assert_eq!(diag.category(), "vocabulary");
        assert!(diag.is_error());
    }

    #[test]
    fn test_json_shape() {
        let diag = Diagnostic::info("identity.doctype-without-element-restriction", "profile.documentTypes[0]", "m");
        let json = serde_json::to_value(&diag).unwrap();
        assert_eq!(json["ruleId"], "identity.doctype-without-element-restriction");
        assert_eq!(json["severity"], "info");
        assert!(json.get("line").is_none());
    }
}
