#![deny(warnings)]
#![deny(rust_2018_idioms)]
#![deny(unsafe_op_in_unsafe_fn)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

//! # akn-profile
//!
//! The application profile document: a user-authored restriction of the
//! Akoma Ntoso grammar.
//!
//! Profile text is parsed into a [`ProfileRestriction`] together with a
//! [`LineIndex`] that maps every key path back to its source position, so
//! that [`Diagnostic`]s produced downstream can point at the offending line.

/// Located findings and their severities.
pub mod diagnostic;
/// Key path to source position index.
pub mod line_index;
/// Profile, element and attribute restrictions.
pub mod model;
/// Profile text parser and shape checks.
pub mod parser;
/// Canonical profile text writer.
pub mod writer;

pub use diagnostic::{Diagnostic, Severity};
pub use line_index::{LineIndex, Location};
pub use model::{AttributeRestriction, CHOICE_KEY, Cardinality, ElementRestriction, ProfileRestriction};
pub use parser::{ParseOutcome, parse_profile};
pub use writer::{tidy_layout, write_profile};

use std::path::Path;
use thiserror::Error;

/// Errors that can occur when reading or writing profile files
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Read and parse a profile file
pub fn read_profile(path: impl AsRef<Path>) -> Result<ParseOutcome> {
    let text = std::fs::read_to_string(path)?;
    Ok(parse_profile(&text))
}

/// Write a profile to a file in canonical form
pub fn save_profile(path: impl AsRef<Path>, profile: &ProfileRestriction) -> Result<()> {
    std::fs::write(path, profile.to_yaml()?)?;
    Ok(())
}
