//! Choice group extraction from resolved content models

use crate::content::{Occurs, Particle};
use crate::model::{Branch, ChoiceGroup};
use std::collections::BTreeSet;

/// Collect the choice groups of a content model.
///
/// Choices reached through sequences and group references each yield one
/// group; choices nested inside another choice are branches of it instead.
/// Group ids are numbered per declaring type, continuing from `counter`.
pub fn extract_choice_groups(
    type_name: &str,
    particle: &Particle,
    counter: &mut usize,
) -> Vec<ChoiceGroup> {
    let mut out = Vec::new();
    walk(type_name, particle, 1, counter, &mut out);
    out
}

fn walk(
    type_name: &str,
    particle: &Particle,
    enclosing_min: u32,
    counter: &mut usize,
    out: &mut Vec<ChoiceGroup>,
) {
    match particle {
        Particle::Sequence { occurs, items } => {
            let min = enclosing_min.saturating_mul(occurs.min);
            for item in items {
                walk(type_name, item, min, counter, out);
            }
        }
        // The reference's bounds apply to the group's own compositor.
        Particle::Group { occurs, inner, .. } => match inner.as_ref() {
            Particle::Choice {
                occurs: choice_occurs,
                items,
            } => {
                let combined = choice_occurs.times(*occurs);
                if let Some(group) = build_group(type_name, combined, items, enclosing_min, counter)
                {
                    out.push(group);
                }
            }
            other => walk(
                type_name,
                other,
                enclosing_min.saturating_mul(occurs.min),
                counter,
                out,
            ),
        },
        Particle::Choice { occurs, items } => {
            if let Some(group) = build_group(type_name, *occurs, items, enclosing_min, counter) {
                out.push(group);
            }
        }
        Particle::Element { .. } | Particle::Any => {}
    }
}

fn build_group(
    type_name: &str,
    occurs: Occurs,
    items: &[Particle],
    enclosing_min: u32,
    counter: &mut usize,
) -> Option<ChoiceGroup> {
    let mut branches = Vec::new();
    for item in items {
        let (elements, label) = match item {
            Particle::Element { name, .. } => {
                (BTreeSet::from([name.clone()]), Some(name.clone()))
            }
            Particle::Group { name, inner, .. } => (
                inner.element_names().into_iter().collect(),
                Some(name.clone()),
            ),
            Particle::Sequence { .. } | Particle::Choice { .. } => {
                let mut parts = Vec::new();
                label_parts(item, &mut parts);
                let label = if parts.is_empty() {
                    None
                } else {
                    Some(parts.join(" + "))
                };
                (item.element_names().into_iter().collect(), label)
            }
            Particle::Any => continue,
        };
        if elements.is_empty() {
            continue;
        }
        branches.push(Branch {
            branch_id: format!("branch_{}", branches.len()),
            label,
            elements,
        });
    }

    if branches.is_empty() {
        return None;
    }

    let group_id = format!("{}:choice_{}", type_name, *counter);
    *counter += 1;
    Some(ChoiceGroup::new(
        group_id,
        occurs.min.saturating_mul(enclosing_min),
        occurs.max,
        branches,
    ))
}

/// Element and group names of a nested compositor, in order
fn label_parts(particle: &Particle, out: &mut Vec<String>) {
    match particle {
        Particle::Element { name, .. } | Particle::Group { name, .. } => out.push(name.clone()),
        Particle::Sequence { items, .. } | Particle::Choice { items, .. } => {
            for item in items {
                label_parts(item, out);
            }
        }
        Particle::Any => {}
    }
}
