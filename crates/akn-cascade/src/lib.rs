#![deny(warnings)]
#![deny(rust_2018_idioms)]
#![deny(unsafe_op_in_unsafe_fn)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

//! # akn-cascade
//!
//! Grammar-consistent edits of application profiles.
//!
//! Every operation takes profile text and returns new profile text:
//!
//! - [`expand_element`] adds an element and its whole mandatory subtree
//! - [`collapse_element`] removes an element and everything only it kept reachable
//! - [`reorder_profile`] sorts entries into canonical order
//! - [`generate_yaml`] scaffolds a minimal profile for one document type
//!
//! Documents without a top-level `profile` mapping pass through unchanged.

pub mod collapse;
pub mod document;
pub mod expand;
pub mod generator;
pub mod ordering;

pub use collapse::collapse_element;
pub use expand::{ExpandOptions, expand_element};
pub use generator::{GenerateOptions, generate_profile, generate_yaml};
pub use ordering::{
    compute_element_order, compute_profile_order, reorder_attributes, reorder_children, reorder_profile,
};

use thiserror::Error;

/// Errors that can occur during cascade operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("'{name}' is not an element of the grammar")]
    UnknownElement { name: String },

    #[error("'{name}' is not a valid document type. Valid: {}", .valid.join(", "))]
    UnknownDocumentType { name: String, valid: Vec<String> },

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
