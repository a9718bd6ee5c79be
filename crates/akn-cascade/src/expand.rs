//! Cascade add
//!
//! Expanding an element gives it an entry and walks its mandatory-child
//! chain, so that every element the grammar forces into a document is
//! declared along with its mandatory attributes.

use crate::document::{ATTRIBUTES_KEY, CHILDREN_KEY, ProfileDocument, key_text};
use crate::ordering::apply_element_order;
use crate::{Error, Result};
use akn_schema::{AttrInfo, ElementInfo, SchemaModel};
use serde_yaml::{Mapping, Value};
use std::collections::HashSet;
use tracing::{debug, info};

/// Identity attributes that can be attached automatically
pub const IDENTITY_ATTRIBUTES: [&str; 3] = ["eId", "wId", "GUID"];

/// Cardinality recorded for every document type under the root entry
pub(crate) const DOCUMENT_TYPE_CARDINALITY: &str = "1..1";

/// Expansion options
#[derive(Debug, Clone, PartialEq, Eq, serde::Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ExpandOptions {
    /// Attach `eId` to every touched element that supports it
    pub auto_add_eid: bool,
    /// Attach `wId` to every touched element that supports it
    pub auto_add_wid: bool,
    /// Attach `GUID` to every touched element that supports it
    pub auto_add_guid: bool,
    /// Whether attached identity attributes are marked `required: true`
    pub auto_id_required: bool,
}

impl Default for ExpandOptions {
    fn default() -> Self {
        Self {
            auto_add_eid: false,
            auto_add_wid: false,
            auto_add_guid: false,
            auto_id_required: true,
        }
    }
}

impl ExpandOptions {
    #[must_use]
    pub fn with_eid(mut self, enabled: bool) -> Self {
        self.auto_add_eid = enabled;
        self
    }

    #[must_use]
    pub fn with_wid(mut self, enabled: bool) -> Self {
        self.auto_add_wid = enabled;
        self
    }

    #[must_use]
    pub fn with_guid(mut self, enabled: bool) -> Self {
        self.auto_add_guid = enabled;
        self
    }

    #[must_use]
    pub fn with_id_required(mut self, required: bool) -> Self {
        self.auto_id_required = required;
        self
    }

    fn identity_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        IDENTITY_ATTRIBUTES
            .into_iter()
            .zip([self.auto_add_eid, self.auto_add_wid, self.auto_add_guid])
            .filter_map(|(name, enabled)| enabled.then_some(name))
    }
}

/// `start` and every element on its mandatory-child chain, depth first in
/// grammar order
pub(crate) fn required_closure<'s>(schema: &'s SchemaModel, start: &'s str) -> Vec<&'s str> {
    fn walk<'s>(schema: &'s SchemaModel, name: &'s str, seen: &mut HashSet<&'s str>, out: &mut Vec<&'s str>) {
        if !seen.insert(name) || !schema.has_element(name) {
            return;
        }
        out.push(name);
        for child in schema.get_required_children(name) {
            walk(schema, &child.name, seen, out);
        }
    }

    let mut out = Vec::new();
    walk(schema, start, &mut HashSet::new(), &mut out);
    out
}

/// Add `element` and everything it requires to the profile in `text`
pub fn expand_element(
    text: &str,
    element: &str,
    schema: &SchemaModel,
    options: &ExpandOptions,
) -> Result<String> {
    if !schema.has_element(element) {
        return Err(Error::UnknownElement {
            name: element.to_string(),
        });
    }
    let Some(mut doc) = ProfileDocument::load(text)? else {
        debug!("Not a profile document, expand of <{}> skipped", element);
        return Ok(text.to_string());
    };
    let document_types = doc.document_types();
    let Some(elements) = doc.elements_mut() else {
        return Ok(text.to_string());
    };

    let before = elements.len();
    for name in required_closure(schema, element) {
        if let Some(info) = schema.get_element_info(name) {
            ensure_entry(elements, name, info, options);
        }
    }
    ensure_root(elements, &document_types, schema);
    apply_element_order(elements, schema);

    info!(
        "Expanded <{}>: {} entries added",
        element,
        elements.len().saturating_sub(before)
    );
    doc.dump()
}

fn required_attribute(attr: &AttrInfo) -> Value {
    let mut entry = Mapping::new();
    entry.insert(Value::from("required"), Value::Bool(true));
    if let Some(values) = attr.enum_values.as_ref().filter(|v| !v.is_empty()) {
        let values = values.iter().map(|v| Value::from(v.as_str())).collect();
        entry.insert(Value::from("values"), Value::Sequence(values));
    }
    Value::Mapping(entry)
}

fn identity_attribute(required: bool) -> Value {
    let mut entry = Mapping::new();
    entry.insert(Value::from("required"), Value::Bool(required));
    Value::Mapping(entry)
}

/// Get the mapping under `key`, creating it when missing or null. Any other
/// value is left alone and yields `None`.
fn section_mut<'m>(entry: &'m mut Mapping, key: &str) -> Option<&'m mut Mapping> {
    if matches!(entry.get(key), None | Some(Value::Null)) {
        entry.insert(Value::from(key), Value::Mapping(Mapping::new()));
    }
    entry.get_mut(key).and_then(Value::as_mapping_mut)
}

fn ensure_entry(elements: &mut Mapping, name: &str, info: &ElementInfo, options: &ExpandOptions) {
    let required_attrs: Vec<&AttrInfo> = info.attributes.iter().filter(|a| a.required).collect();
    let identity: Vec<&str> = options
        .identity_names()
        .filter(|id| info.attribute(id).is_some_and(|a| !a.required))
        .collect();
    let required_children: Vec<(&str, String)> = info
        .children
        .iter()
        .filter(|c| c.required())
        .map(|c| (c.name.as_str(), c.cardinality()))
        .collect();
    let needs_content = !required_attrs.is_empty() || !identity.is_empty() || !required_children.is_empty();

    if !elements.contains_key(name) {
        elements.insert(Value::from(name), Value::Null);
    }
    let Some(entry) = elements.get_mut(name) else {
        return;
    };
    if entry.is_null() {
        if !needs_content {
            return;
        }
        *entry = Value::Mapping(Mapping::new());
    }
    let Some(entry) = entry.as_mapping_mut() else {
        return;
    };

    if !required_attrs.is_empty() || !identity.is_empty() {
        if let Some(attributes) = section_mut(entry, ATTRIBUTES_KEY) {
            for attr in &required_attrs {
                if !attributes.contains_key(attr.name.as_str()) {
                    attributes.insert(Value::from(attr.name.as_str()), required_attribute(attr));
                }
            }
            for id in &identity {
                if !attributes.contains_key(*id) {
                    attributes.insert(Value::from(*id), identity_attribute(options.auto_id_required));
                }
            }
        }
    }

    if !required_children.is_empty() {
        if let Some(children) = section_mut(entry, CHILDREN_KEY) {
            for (child, cardinality) in required_children {
                if !children.contains_key(child) {
                    children.insert(Value::from(child), Value::from(cardinality));
                }
            }
        }
    }
}

/// Keep the grammar root declared, listing every document type that has an
/// entry of its own
fn ensure_root(elements: &mut Mapping, document_types: &[String], schema: &SchemaModel) {
    let Some(root) = schema.root_element() else {
        return;
    };
    let present: Vec<&str> = document_types
        .iter()
        .map(String::as_str)
        .filter(|dt| elements.contains_key(*dt))
        .collect();

    let mut entry = match elements.shift_remove(root) {
        Some(Value::Mapping(entry)) => entry,
        _ => Mapping::new(),
    };
    if !present.is_empty() {
        if let Some(children) = section_mut(&mut entry, CHILDREN_KEY) {
            for dt in present {
                if !children.contains_key(dt) {
                    children.insert(Value::from(dt), Value::from(DOCUMENT_TYPE_CARDINALITY));
                }
            }
        }
    }

    let mut reordered = Mapping::with_capacity(elements.len() + 1);
    let value = if entry.is_empty() {
        Value::Null
    } else {
        Value::Mapping(entry)
    };
    reordered.insert(Value::from(root), value);
    for (key, value) in elements.iter() {
        reordered.insert(key.clone(), value.clone());
    }
    *elements = reordered;
}

/// Names of all entries in `elements`
pub(crate) fn entry_names(elements: &Mapping) -> Vec<String> {
    elements.keys().filter_map(key_text).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn expand(text: &str, element: &str, options: &ExpandOptions) -> String {
        let schema = akn_schema::bundled().unwrap();
        expand_element(text, element, &schema, options).unwrap()
    }

    fn elements_of(text: &str) -> Mapping {
        let doc = ProfileDocument::load(text).unwrap().unwrap();
        doc.elements().cloned().unwrap()
    }

    #[test]
    fn test_required_closure_is_preorder() {
        let schema = akn_schema::bundled().unwrap();
        let closure = required_closure(&schema, "act");
        assert_eq!(&closure[..4], &["act", "meta", "identification", "FRBRWork"]);
        assert!(closure.contains(&"FRBRcountry"));
        assert!(closure.contains(&"body"));
        assert!(!closure.contains(&"preface"));
        assert!(required_closure(&schema, "missing").is_empty());
    }

    #[test]
    fn test_expand_adds_required_chain() {
        let out = expand("profile:\n  documentTypes: [act]\n", "act", &ExpandOptions::default());
        let elements = elements_of(&out);
        let names = entry_names(&elements);
        assert_eq!(names.first().map(String::as_str), Some("akomaNtoso"));
        assert!(names.iter().any(|n| n == "FRBRlanguage"));

        let act = elements.get("act").unwrap();
        assert_eq!(act["attributes"]["contains"]["required"], Value::Bool(true));
        assert_eq!(act["attributes"]["contains"]["values"][0], Value::from("originalVersion"));
        assert_eq!(act["children"]["meta"], Value::from("1..1"));
        assert!(act["attributes"].get("lang").is_none());

        let root = elements.get("akomaNtoso").unwrap();
        assert_eq!(root["children"]["act"], Value::from("1..1"));
    }

    #[test]
    fn test_expand_leaf_stays_bare() {
        let out = expand("profile:\n  elements:\n", "num", &ExpandOptions::default());
        assert!(out.contains("    num:\n"), "{}", out);
        assert!(out.contains("    akomaNtoso:\n"), "{}", out);
    }

    #[test]
    fn test_expand_existing_entry_is_completed() {
        let out = expand(
            "profile:\n  elements:\n    act:\n      profileNote: keep me\n      children:\n        preface: 0..1\n",
            "act",
            &ExpandOptions::default(),
        );
        let elements = elements_of(&out);
        let act = elements.get("act").unwrap();
        assert_eq!(act["profileNote"], Value::from("keep me"));
        assert_eq!(act["children"]["preface"], Value::from("0..1"));
        assert_eq!(act["children"]["body"], Value::from("1..1"));
        assert_eq!(act["attributes"]["name"]["required"], Value::Bool(true));
    }

    #[test]
    fn test_expand_identity_attributes() {
        let options = ExpandOptions::default().with_eid(true).with_id_required(false);
        let out = expand("profile:\n  elements:\n", "section", &options);
        let elements = elements_of(&out);
        let section = elements.get("section").unwrap();
        assert_eq!(section["attributes"]["eId"]["required"], Value::Bool(false));
        assert!(section["attributes"]["eId"].get("values").is_none());
        assert!(section["attributes"].get("wId").is_none());

        // act has no identity attributes
        let out = expand("profile:\n  elements:\n", "act", &options);
        let elements = elements_of(&out);
        assert!(elements.get("act").unwrap()["attributes"].get("eId").is_none());
    }

    #[test]
    fn test_grammar_required_identity_stays_required() {
        let options = ExpandOptions::default().with_eid(true).with_id_required(false);
        let out = expand("profile:\n  elements:\n", "TLCPerson", &options);
        let elements = elements_of(&out);
        assert_eq!(
            elements.get("TLCPerson").unwrap()["attributes"]["eId"]["required"],
            Value::Bool(true)
        );
    }

    #[test]
    fn test_expand_is_idempotent() {
        let options = ExpandOptions::default().with_guid(true);
        let once = expand("profile:\n  name: Test\n  documentTypes: [bill]\n", "bill", &options);
        let twice = expand(&once, "bill", &options);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_expand_unknown_element() {
        let schema = akn_schema::bundled().unwrap();
        let err = expand_element("profile:\n", "notAnElement", &schema, &ExpandOptions::default());
        assert!(matches!(err, Err(Error::UnknownElement { name }) if name == "notAnElement"));
    }

    #[test]
    fn test_expand_passthrough() {
        let text = "not_a_profile: true\n";
        assert_eq!(expand(text, "act", &ExpandOptions::default()), text);
    }
}
