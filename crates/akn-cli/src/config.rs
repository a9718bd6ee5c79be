//! Configuration file for `akn-profiler`
//!
//! ```yaml
//! schema: grammars/akomantoso30.xsd
//! expand:
//!   autoAddEid: true
//!   autoIdRequired: false
//! validation:
//!   minimumSeverity: warning
//! ```

use akn_cascade::ExpandOptions;
use akn_profile::Severity;
use anyhow::Context;
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct CliConfig {
    /// Grammar to load instead of the bundled one
    pub schema: Option<PathBuf>,
    pub expand: ExpandOptions,
    pub validation: ValidationSection,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct ValidationSection {
    pub minimum_severity: Option<Severity>,
}

impl CliConfig {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        let mut config: CliConfig = serde_yaml::from_str(&text)
            .with_context(|| format!("Invalid config file {}", path.display()))?;

        // A relative grammar path is taken from the config file's directory.
        if let (Some(schema), Some(dir)) = (&config.schema, path.parent()) {
            if schema.is_relative() {
                config.schema = Some(dir.join(schema));
            }
        }
        Ok(config)
    }
}
