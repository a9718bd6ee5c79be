#![deny(warnings)]
#![deny(rust_2018_idioms)]
#![deny(unsafe_op_in_unsafe_fn)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

//! # akn-validation
//!
//! Validation of application profiles against an Akoma Ntoso grammar.
//!
//! Six independent rule categories (vocabulary, structure, datatype,
//! identity, choice, strictness) cross-reference a parsed profile with the
//! schema model and report located diagnostics, always in that category
//! order.
//!
//! ```rust
//! use akn_validation::ValidationEngine;
//!
//! let schema = akn_schema::bundled().unwrap();
//! let text = "profile:\n  documentTypes: [fakeDocType]\n";
//! let diagnostics = ValidationEngine::new().validate_text(text, &schema);
//! assert_eq!(diagnostics[0].rule_id, "vocabulary.unknown-document-type");
//! ```

pub mod engine;
pub mod report;
pub mod rules;

pub use engine::{ValidationConfig, ValidationEngine};
pub use report::ValidationReport;
pub use rules::{RuleCategory, RuleContext};

use akn_profile::Diagnostic;
use akn_schema::SchemaModel;
use std::path::Path;
use thiserror::Error;

/// Errors that can occur around validation runs
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Schema error: {0}")]
    Schema(#[from] akn_schema::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Validate profile text with default settings
pub fn validate_profile(text: &str, schema: &SchemaModel) -> Vec<Diagnostic> {
    ValidationEngine::new().validate_text(text, schema)
}

/// Validate a profile file against the bundled grammar
pub fn validate_file(path: impl AsRef<Path>, config: ValidationConfig) -> Result<ValidationReport> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path)?;
    let schema = akn_schema::bundled()?;
    let diagnostics = ValidationEngine::with_config(config).validate_text(&text, &schema);
    Ok(ValidationReport::new(path.display().to_string(), diagnostics))
}
