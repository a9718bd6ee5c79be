//! Diagnostic summaries for display

use akn_profile::{Diagnostic, Severity};
use serde::Serialize;
use std::fmt::Write;

/// The outcome of validating one profile
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationReport {
    pub source: String,
    pub diagnostics: Vec<Diagnostic>,
    pub errors: usize,
    pub warnings: usize,
    pub infos: usize,
}

impl ValidationReport {
    pub fn new(source: impl Into<String>, diagnostics: Vec<Diagnostic>) -> Self {
        let count = |severity: Severity| diagnostics.iter().filter(|d| d.severity == severity).count();
        Self {
            source: source.into(),
            errors: count(Severity::Error),
            warnings: count(Severity::Warning),
            infos: count(Severity::Info),
            diagnostics,
        }
    }

    /// Whether the profile has no error-level findings
    pub fn is_valid(&self) -> bool {
        self.errors == 0
    }

    /// One line per diagnostic, `source:line:column: severity [rule] message`,
    /// followed by a summary line
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        for d in &self.diagnostics {
            let position = match (d.line, d.column) {
                (Some(line), Some(column)) => format!("{}:{}", line, column + 1),
                (Some(line), None) => line.to_string(),
                _ => d.path.clone(),
            };
            let _ = writeln!(
                out,
                "{}:{}: {} [{}] {}",
                self.source, position, d.severity, d.rule_id, d.message
            );
        }
        let _ = writeln!(
            out,
            "{}: {} errors, {} warnings, {} infos",
            self.source, self.errors, self.warnings, self.infos
        );
        out
    }
}
