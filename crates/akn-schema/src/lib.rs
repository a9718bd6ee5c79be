#![deny(warnings)]
#![deny(rust_2018_idioms)]
#![deny(unsafe_op_in_unsafe_fn)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

//! # akn-schema
//!
//! Schema model for Akoma Ntoso grammars.
//!
//! The loader flattens an XSD's type system once (extension and restriction
//! chains, group and attribute-group references, facets) into an immutable
//! [`SchemaModel`] answering structural queries: valid children and their
//! cardinalities, attributes, choice groups and enumerations.

pub mod choice;
pub mod content;
pub mod loader;
pub mod model;
pub mod registry;

pub use loader::SchemaLoader;
pub use model::{
    AttrInfo, Branch, ChildInfo, ChoiceGroup, ElementInfo, Pattern, SchemaModel, cardinality_label,
};
pub use registry::SchemaRegistry;

use once_cell::sync::OnceCell;
use std::sync::Arc;
use thiserror::Error;

/// The Akoma Ntoso 3.0 core grammar shipped with this crate
pub const BUNDLED_XSD: &str = include_str!("../schemas/akomantoso30-core.xsd");

/// Errors that can occur when loading grammars
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed grammar XML: {0}")]
    Xml(#[from] roxmltree::Error),

    #[error("Invalid grammar: {0}")]
    InvalidGrammar(String),

    #[error("Grammar not found: {0}")]
    NotFound(String),
}

pub type Result<T> = std::result::Result<T, Error>;

static BUNDLED: OnceCell<Arc<SchemaModel>> = OnceCell::new();

/// The process-wide handle for the bundled grammar, built on first use
pub fn bundled() -> Result<Arc<SchemaModel>> {
    BUNDLED
        .get_or_try_init(|| SchemaLoader::new().load_from_str(BUNDLED_XSD).map(Arc::new))
        .map(Arc::clone)
}
