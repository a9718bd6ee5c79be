//! Cascade remove
//!
//! Removing an element prunes every entry that is no longer reachable from
//! a retained root: the listed document types, the grammar root, and any
//! entry that had no parent inside the profile to begin with.

use crate::document::{CHILDREN_KEY, ProfileDocument, child_references, key_text};
use crate::expand::entry_names;
use crate::{Error, Result};
use akn_profile::CHOICE_KEY;
use akn_schema::SchemaModel;
use serde_yaml::{Mapping, Value};
use std::collections::{BTreeSet, HashMap, VecDeque};
use tracing::{debug, info};

/// Remove `element` and every entry only it kept reachable
pub fn collapse_element(text: &str, element: &str, schema: &SchemaModel) -> Result<String> {
    if !schema.has_element(element) {
        return Err(Error::UnknownElement {
            name: element.to_string(),
        });
    }
    let Some(mut doc) = ProfileDocument::load(text)? else {
        return Ok(text.to_string());
    };
    if !doc.elements().is_some_and(|e| e.contains_key(element)) {
        debug!("<{}> has no entry, nothing to collapse", element);
        return Ok(text.to_string());
    }
    let document_types = doc.document_types();
    let Some(elements) = doc.elements_mut() else {
        return Ok(text.to_string());
    };

    let had_parent = referenced_names(elements);
    elements.shift_remove(element);
    for (_, entry) in elements.iter_mut() {
        strip_reference(entry, element);
    }

    let mut roots: BTreeSet<String> = document_types.into_iter().collect();
    roots.extend(schema.root_element().map(str::to_string));
    roots.extend(
        entry_names(elements)
            .into_iter()
            .filter(|name| !had_parent.contains(name)),
    );

    // Marking runs over every surviving edge, so one sweep removes whole
    // orphaned chains.
    let unreachable = sweep(elements, &roots);
    for name in &unreachable {
        elements.shift_remove(name.as_str());
    }

    info!("Collapsed <{}>: {} orphaned entries removed", element, unreachable.len());
    doc.dump()
}

/// Names referenced as children by some entry other than themselves
fn referenced_names(elements: &Mapping) -> BTreeSet<String> {
    let mut names = BTreeSet::new();
    for (key, entry) in elements {
        let parent = key_text(key);
        for child in child_references(entry) {
            if parent.as_deref() != Some(child.as_str()) {
                names.insert(child);
            }
        }
    }
    names
}

/// Drop `name` from an entry's children and choice, removing sections
/// that end up empty
fn strip_reference(entry: &mut Value, name: &str) {
    let Some(fields) = entry.as_mapping_mut() else {
        return;
    };
    let Some(Value::Mapping(children)) = fields.get_mut(CHILDREN_KEY) else {
        return;
    };
    children.shift_remove(name);
    if let Some(Value::Mapping(choice)) = children.get_mut(CHOICE_KEY) {
        choice.shift_remove(name);
        if choice.is_empty() {
            children.shift_remove(CHOICE_KEY);
        }
    }
    if children.is_empty() {
        fields.shift_remove(CHILDREN_KEY);
    }
    if fields.is_empty() {
        *entry = Value::Null;
    }
}

/// Entries not reachable from `roots` over children and choice edges
fn sweep(elements: &Mapping, roots: &BTreeSet<String>) -> Vec<String> {
    let edges: HashMap<String, Vec<String>> = elements
        .iter()
        .filter_map(|(key, entry)| Some((key_text(key)?, child_references(entry))))
        .collect();

    let mut marked: BTreeSet<&str> = BTreeSet::new();
    let mut queue: VecDeque<&str> = roots
        .iter()
        .map(String::as_str)
        .filter(|name| edges.contains_key(*name))
        .collect();
    while let Some(name) = queue.pop_front() {
        if !marked.insert(name) {
            continue;
        }
        for child in edges.get(name).into_iter().flatten() {
            if edges.contains_key(child.as_str()) && !marked.contains(child.as_str()) {
                queue.push_back(child);
            }
        }
    }

    edges
        .keys()
        .filter(|name| !marked.contains(name.as_str()))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const PROFILE: &str = "profile:
  documentTypes: [act]
  elements:
    akomaNtoso:
      children:
        act: 1..1
    act:
      children:
        meta: 1..1
        body: 1..1
    body:
      children:
        section:
        article:
    section:
      children:
        num:
        choice:
          content:
          intro:
    article:
      children:
        num:
    num:
    content:
    intro:
    meta:
    TLCPerson:
";

    fn collapse(text: &str, element: &str) -> String {
        let schema = akn_schema::bundled().unwrap();
        collapse_element(text, element, &schema).unwrap()
    }

    fn names(text: &str) -> Vec<String> {
        let doc = ProfileDocument::load(text).unwrap().unwrap();
        entry_names(doc.elements().unwrap())
    }

    #[test]
    fn test_collapse_removes_orphaned_subtree() {
        let out = collapse(PROFILE, "body");
        assert_eq!(names(&out), vec!["akomaNtoso", "act", "meta", "TLCPerson"]);
        assert!(!out.contains("body"), "{}", out);
    }

    #[test]
    fn test_collapse_keeps_shared_child() {
        let out = collapse(PROFILE, "section");
        let kept = names(&out);
        assert!(kept.contains(&"num".to_string()));
        assert!(kept.contains(&"article".to_string()));
        assert!(!kept.contains(&"content".to_string()));
        assert!(!kept.contains(&"intro".to_string()));
    }

    #[test]
    fn test_collapse_strips_choice_member() {
        let out = collapse(PROFILE, "content");
        let doc = ProfileDocument::load(&out).unwrap().unwrap();
        let section = doc.elements().unwrap().get("section").unwrap();
        let choice = section["children"][CHOICE_KEY].as_mapping().unwrap();
        assert_eq!(choice.len(), 1);
        assert!(choice.contains_key("intro"));
    }

    #[test]
    fn test_collapse_leaves_parentless_entries() {
        let out = collapse(PROFILE, "meta");
        assert!(names(&out).contains(&"TLCPerson".to_string()));
        let doc = ProfileDocument::load(&out).unwrap().unwrap();
        let act = doc.elements().unwrap().get("act").unwrap();
        assert!(act["children"].get("meta").is_none());
    }

    #[test]
    fn test_single_sweep_removes_whole_chain() {
        let doc = ProfileDocument::load(PROFILE).unwrap().unwrap();
        let mut elements = doc.elements().unwrap().clone();
        elements.shift_remove("body");
        if let Some(Value::Mapping(act)) = elements.get_mut("act") {
            if let Some(Value::Mapping(children)) = act.get_mut(CHILDREN_KEY) {
                children.shift_remove("body");
            }
        }
        let roots: BTreeSet<String> = ["akomaNtoso", "act", "TLCPerson"].iter().map(|s| s.to_string()).collect();

        let mut unreachable = sweep(&elements, &roots);
        unreachable.sort();
        assert_eq!(unreachable, vec!["article", "content", "intro", "num", "section"]);
        for name in &unreachable {
            elements.shift_remove(name.as_str());
        }
        assert!(sweep(&elements, &roots).is_empty());
    }

    #[test]
    fn test_collapse_is_idempotent() {
        let once = collapse(PROFILE, "body");
        assert_eq!(collapse(&once, "body"), once);
    }

    #[test]
    fn test_collapse_unknown_element() {
        let schema = akn_schema::bundled().unwrap();
        assert!(matches!(
            collapse_element(PROFILE, "notAnElement", &schema),
            Err(Error::UnknownElement { .. })
        ));
    }
}
