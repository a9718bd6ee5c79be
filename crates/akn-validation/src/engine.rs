//! Validation engine

use crate::rules::{RuleCategory, RuleContext, default_categories};
use akn_profile::{Diagnostic, LineIndex, ProfileRestriction, Severity, parse_profile};
use akn_schema::SchemaModel;
use std::collections::HashSet;
use std::panic::{AssertUnwindSafe, catch_unwind};
use tracing::{debug, error, info};

/// Validation configuration
#[derive(Debug, Clone)]
pub struct ValidationConfig {
    /// Diagnostics below this severity are dropped
    pub minimum_severity: Severity,
    /// Drop repeated `(rule_id, path, message)` triples
    pub deduplicate: bool,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            minimum_severity: Severity::Info,
            deduplicate: true,
        }
    }
}

impl ValidationConfig {
    #[must_use]
    pub fn with_minimum_severity(mut self, severity: Severity) -> Self {
        self.minimum_severity = severity;
        self
    }

    #[must_use]
    pub fn with_deduplicate(mut self, deduplicate: bool) -> Self {
        self.deduplicate = deduplicate;
        self
    }
}

/// Runs every rule category over a profile
pub struct ValidationEngine {
    config: ValidationConfig,
    categories: Vec<Box<dyn RuleCategory>>,
}

impl ValidationEngine {
    /// Create an engine with all rule categories and default configuration
    pub fn new() -> Self {
        Self::with_config(ValidationConfig::default())
    }

    /// Create with specific configuration
    pub fn with_config(config: ValidationConfig) -> Self {
        Self {
            config,
            categories: default_categories(),
        }
    }

    /// Replace the rule categories, keeping their order for reporting
    #[must_use]
    pub fn with_categories(mut self, categories: Vec<Box<dyn RuleCategory>>) -> Self {
        self.categories = categories;
        self
    }

    pub fn config(&self) -> &ValidationConfig {
        &self.config
    }

    /// Validate an already parsed profile
    pub fn validate(
        &self,
        profile: &ProfileRestriction,
        schema: &SchemaModel,
        line_index: &LineIndex,
    ) -> Vec<Diagnostic> {
        let ctx = RuleContext::new(profile, schema, line_index);
        let mut all = Vec::new();

        for category in &self.categories {
            match catch_unwind(AssertUnwindSafe(|| category.check(&ctx))) {
                Ok(found) => {
                    debug!("{} rules reported {} diagnostics", category.name(), found.len());
                    all.extend(found);
                }
                Err(_) => error!(
                    "{} rules failed on profile '{}'; continuing with remaining categories",
                    category.name(),
                    profile.name
                ),
            }
        }

        let diagnostics = self.finish(all);
        info!(
            "Validated profile '{}': {} diagnostics ({} errors)",
            profile.name,
            diagnostics.len(),
            diagnostics.iter().filter(|d| d.is_error()).count()
        );
        diagnostics
    }

    /// Parse and validate profile text. When the text does not parse into a
    /// profile, only the parse diagnostics are returned.
    pub fn validate_text(&self, text: &str, schema: &SchemaModel) -> Vec<Diagnostic> {
        let outcome = parse_profile(text);
        match outcome.profile {
            Some(profile) => {
                let mut diagnostics = outcome.errors;
                diagnostics.extend(self.validate(&profile, schema, &outcome.line_index));
                diagnostics
            }
            None => {
                debug!("Profile did not parse, {} structural errors", outcome.errors.len());
                outcome.errors
            }
        }
    }

    fn finish(&self, diagnostics: Vec<Diagnostic>) -> Vec<Diagnostic> {
        let mut seen = HashSet::new();
        diagnostics
            .into_iter()
            .filter(|d| {
                !self.config.deduplicate || seen.insert((d.rule_id.clone(), d.path.clone(), d.message.clone()))
            })
            .filter(|d| d.severity.at_least(self.config.minimum_severity))
            .collect()
    }
}

impl Default for ValidationEngine {
    fn default() -> Self {
        Self::new()
    }
}
