//! Loading and dumping profile documents as generic YAML trees
//!
//! Cascade operations edit the document tree directly so that keys they do
//! not understand survive untouched.

use crate::Result;
use serde_yaml::{Mapping, Value};

pub(crate) const PROFILE_KEY: &str = "profile";
pub(crate) const ELEMENTS_KEY: &str = "elements";
pub(crate) const DOCUMENT_TYPES_KEY: &str = "documentTypes";
pub(crate) const CHILDREN_KEY: &str = "children";
pub(crate) const ATTRIBUTES_KEY: &str = "attributes";

/// A parsed document whose `profile` key holds a mapping
#[derive(Debug, Clone)]
pub struct ProfileDocument {
    root: Value,
}

impl ProfileDocument {
    /// Parse `text`. Returns `Ok(None)` when the text is YAML but not a
    /// profile document.
    pub fn load(text: &str) -> Result<Option<Self>> {
        let root: Value = serde_yaml::from_str(text)?;
        let is_profile = matches!(
            root.as_mapping().and_then(|m| m.get(PROFILE_KEY)),
            Some(Value::Mapping(_))
        );
        Ok(is_profile.then_some(Self { root }))
    }

    pub fn profile(&self) -> Option<&Mapping> {
        self.root.get(PROFILE_KEY).and_then(Value::as_mapping)
    }

    pub fn profile_mut(&mut self) -> Option<&mut Mapping> {
        self.root.get_mut(PROFILE_KEY).and_then(Value::as_mapping_mut)
    }

    /// The `elements` mapping, if present and well formed
    pub fn elements(&self) -> Option<&Mapping> {
        self.profile()?.get(ELEMENTS_KEY).and_then(Value::as_mapping)
    }

    /// The `elements` mapping, replacing a missing or malformed value with
    /// an empty mapping
    pub fn elements_mut(&mut self) -> Option<&mut Mapping> {
        let profile = self.profile_mut()?;
        if !matches!(profile.get(ELEMENTS_KEY), Some(Value::Mapping(_))) {
            profile.insert(Value::from(ELEMENTS_KEY), Value::Mapping(Mapping::new()));
        }
        profile.get_mut(ELEMENTS_KEY).and_then(Value::as_mapping_mut)
    }

    /// Scalar entries of `documentTypes`, in document order
    pub fn document_types(&self) -> Vec<String> {
        self.profile()
            .and_then(|p| p.get(DOCUMENT_TYPES_KEY))
            .and_then(Value::as_sequence)
            .map(|items| items.iter().filter_map(key_text).collect())
            .unwrap_or_default()
    }

    /// Serialize back to profile text
    pub fn dump(&self) -> Result<String> {
        let raw = serde_yaml::to_string(&self.root)?;
        Ok(akn_profile::tidy_layout(&raw))
    }
}

/// Text of a scalar mapping key or sequence item
pub(crate) fn key_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Names declared under a `children` mapping, the members of its `choice`
/// key included
pub(crate) fn child_references(entry: &Value) -> Vec<String> {
    let Some(children) = entry.get(CHILDREN_KEY).and_then(Value::as_mapping) else {
        return Vec::new();
    };
    let mut names = Vec::new();
    for (key, value) in children {
        match key_text(key).as_deref() {
            Some(akn_profile::CHOICE_KEY) => {
                if let Some(choice) = value.as_mapping() {
                    names.extend(choice.keys().filter_map(key_text));
                }
            }
            Some(name) => names.push(name.to_string()),
            None => {}
        }
    }
    names
}
