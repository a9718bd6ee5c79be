//! Canonical ordering of profile entries
//!
//! Element entries are sorted topologically over the declared parent to
//! child edges, ties broken alphabetically, with the grammar root pinned
//! first. Within an entry, children and attributes follow the grammar's
//! declaration order with mandatory entries first.

use crate::Result;
use crate::document::{ATTRIBUTES_KEY, CHILDREN_KEY, ProfileDocument, child_references, key_text};
use akn_profile::{CHOICE_KEY, ProfileRestriction};
use akn_schema::SchemaModel;
use serde_yaml::{Mapping, Value};
use std::collections::{BTreeSet, HashMap};
use tracing::debug;

/// Canonical order of the entries of an `elements` mapping
pub fn compute_element_order(elements: &Mapping, schema: &SchemaModel) -> Vec<String> {
    let names: Vec<String> = elements.keys().filter_map(key_text).collect();
    let edges = elements
        .iter()
        .filter_map(|(key, entry)| Some((key_text(key)?, child_references(entry))))
        .collect::<Vec<_>>();
    topological_order(names, &edges, schema.root_element())
}

/// Canonical order of the elements of a typed profile
pub fn compute_profile_order(profile: &ProfileRestriction, schema: &SchemaModel) -> Vec<String> {
    let names: Vec<String> = profile.elements.keys().cloned().collect();
    let edges = profile
        .elements
        .iter()
        .map(|(name, restriction)| {
            (name.clone(), restriction.child_names().map(str::to_string).collect())
        })
        .collect::<Vec<_>>();
    topological_order(names, &edges, schema.root_element())
}

fn topological_order(
    names: Vec<String>,
    edges: &[(String, Vec<String>)],
    root: Option<&str>,
) -> Vec<String> {
    let present: BTreeSet<&str> = names.iter().map(String::as_str).collect();
    let mut in_degree: HashMap<&str, usize> = present.iter().map(|name| (*name, 0)).collect();
    let mut children_of: HashMap<&str, Vec<&str>> = HashMap::new();

    for (parent, children) in edges {
        for child in children {
            let Some(child) = present.get(child.as_str()).copied() else {
                continue;
            };
            children_of.entry(parent.as_str()).or_default().push(child);
            if let Some(degree) = in_degree.get_mut(child) {
                *degree += 1;
            }
        }
    }

    let mut ready: BTreeSet<&str> = in_degree
        .iter()
        .filter(|(_, degree)| **degree == 0)
        .map(|(name, _)| *name)
        .collect();
    let mut ordered: Vec<String> = Vec::with_capacity(present.len());

    let pinned = root.filter(|root| ready.contains(root));
    if let Some(root) = pinned {
        ready.remove(root);
    }
    let mut next = pinned.or_else(|| ready.pop_first());

    while let Some(current) = next {
        ordered.push(current.to_string());
        let mut children = children_of.get(current).cloned().unwrap_or_default();
        children.sort_unstable();
        for child in children {
            if let Some(degree) = in_degree.get_mut(child) {
                *degree = degree.saturating_sub(1);
                if *degree == 0 {
                    ready.insert(child);
                }
            }
        }
        next = ready.pop_first();
    }

    // Entries on a cycle never become ready.
    if ordered.len() < present.len() {
        let placed: BTreeSet<&str> = ordered.iter().map(String::as_str).collect();
        let leftovers: Vec<String> = present
            .iter()
            .filter(|name| !placed.contains(*name))
            .map(|name| name.to_string())
            .collect();
        debug!("{} elements on cycles appended alphabetically", leftovers.len());
        ordered.extend(leftovers);
    }
    ordered
}

/// Sort key: mandatory entries first, then optional, in grammar order.
/// Unknown keys sort last and keep their relative order.
fn grammar_rank(position: Option<(bool, usize)>) -> (u8, usize) {
    match position {
        Some((true, index)) => (0, index),
        Some((false, index)) => (1, index),
        None => (2, 0),
    }
}

fn sorted_by_rank(map: &Mapping, rank: impl Fn(&str) -> (u8, usize)) -> Mapping {
    let mut entries: Vec<(&Value, &Value)> = map.iter().collect();
    entries.sort_by_key(|(key, _)| key_text(key).map_or((2, 0), |name| rank(&name)));
    entries.into_iter().map(|(k, v)| (k.clone(), v.clone())).collect()
}

/// Reorder one element's `children` mapping into grammar order, with the
/// `choice` key last
pub fn reorder_children(children: &Mapping, element: &str, schema: &SchemaModel) -> Mapping {
    let Some(info) = schema.get_element_info(element) else {
        return children.clone();
    };
    let rank = |name: &str| {
        grammar_rank(
            info.children
                .iter()
                .position(|c| c.name == name)
                .map(|i| (info.children[i].required(), i)),
        )
    };

    let mut plain = Mapping::new();
    let mut choice = None;
    for (key, value) in children {
        if key.as_str() == Some(CHOICE_KEY) {
            choice = Some((key.clone(), value.clone()));
        } else {
            plain.insert(key.clone(), value.clone());
        }
    }

    let mut reordered = sorted_by_rank(&plain, rank);
    if let Some((key, value)) = choice {
        let value = match value {
            Value::Mapping(members) => Value::Mapping(sorted_by_rank(&members, rank)),
            other => other,
        };
        reordered.insert(key, value);
    }
    reordered
}

/// Reorder one element's `attributes` mapping into grammar order
pub fn reorder_attributes(attributes: &Mapping, element: &str, schema: &SchemaModel) -> Mapping {
    let Some(info) = schema.get_element_info(element) else {
        return attributes.clone();
    };
    sorted_by_rank(attributes, |name| {
        grammar_rank(
            info.attributes
                .iter()
                .position(|a| a.name == name)
                .map(|i| (info.attributes[i].required, i)),
        )
    })
}

/// Rebuild `elements` in the canonical element order
pub(crate) fn apply_element_order(elements: &mut Mapping, schema: &SchemaModel) {
    let order = compute_element_order(elements, schema);
    let mut reordered = Mapping::with_capacity(elements.len());
    for name in &order {
        if let Some(entry) = elements.get(name.as_str()) {
            reordered.insert(Value::from(name.as_str()), entry.clone());
        }
    }
    // Keys that are not scalars have no place in the order; keep them last.
    for (key, value) in elements.iter() {
        if key_text(key).is_none() {
            reordered.insert(key.clone(), value.clone());
        }
    }
    *elements = reordered;
}

/// Reorder the whole profile: elements, and the children and attributes
/// inside every element. Only positions change.
pub fn reorder_profile(text: &str, schema: &SchemaModel) -> Result<String> {
    let Some(mut doc) = ProfileDocument::load(text)? else {
        return Ok(text.to_string());
    };
    if doc.elements().is_none() {
        return Ok(text.to_string());
    }
    let Some(elements) = doc.elements_mut() else {
        return Ok(text.to_string());
    };

    for (key, entry) in elements.iter_mut() {
        let Some(name) = key_text(key) else {
            continue;
        };
        let Some(entry) = entry.as_mapping_mut() else {
            continue;
        };
        if let Some(Value::Mapping(children)) = entry.get_mut(CHILDREN_KEY) {
            *children = reorder_children(children, &name, schema);
        }
        if let Some(Value::Mapping(attributes)) = entry.get_mut(ATTRIBUTES_KEY) {
            *attributes = reorder_attributes(attributes, &name, schema);
        }
    }
    apply_element_order(elements, schema);
    debug!("Reordered {} elements", elements.len());
    doc.dump()
}
