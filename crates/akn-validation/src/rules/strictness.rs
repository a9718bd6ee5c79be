//! A profile may tighten the grammar but never loosen it

use super::{RuleCategory, RuleContext, element_path};
use akn_profile::{Cardinality, Diagnostic, ElementRestriction};
use akn_schema::{ElementInfo, SchemaModel};
use std::collections::HashSet;

pub struct StrictnessRules;

impl RuleCategory for StrictnessRules {
    fn name(&self) -> &'static str {
        "strictness"
    }

    fn check(&self, ctx: &RuleContext<'_>) -> Vec<Diagnostic> {
        let mut out = Vec::new();
        for (name, restriction) in ctx.known_elements() {
            let Some(info) = ctx.schema.get_element_info(name) else {
                continue;
            };
            let path = element_path(name);
            required_children(ctx, name, &path, restriction, &mut out);
            required_attributes(ctx, name, &path, restriction, &mut out);
            child_cardinality(ctx, name, &path, info, restriction, &mut out);
            attribute_required(ctx, name, &path, info, restriction, &mut out);
            undeclared_children(ctx, name, &path, restriction, &mut out);
        }
        required_chain(ctx, &mut out);
        out
    }
}

fn required_children(
    ctx: &RuleContext<'_>,
    name: &str,
    path: &str,
    restriction: &ElementRestriction,
    out: &mut Vec<Diagnostic>,
) {
    if restriction.children.is_empty() {
        return;
    }
    let mut missing: Vec<&str> = ctx
        .schema
        .get_required_children(name)
        .into_iter()
        .map(|c| c.name.as_str())
        .filter(|child| !restriction.children.contains_key(*child))
        .collect();
    missing.sort_unstable();
    for child in missing {
        out.push(ctx.warning(
            "strictness.missing-required-child",
            format!("{}.children", path),
            format!(
                "<{}> is required by the XSD inside <{}> but is not listed in 'children'. The profile is loosening the schema.",
                child, name
            ),
        ));
    }
}

fn required_attributes(
    ctx: &RuleContext<'_>,
    name: &str,
    path: &str,
    restriction: &ElementRestriction,
    out: &mut Vec<Diagnostic>,
) {
    if restriction.attributes.is_empty() {
        return;
    }
    let mut missing: Vec<&str> = ctx
        .schema
        .get_required_attributes(name)
        .into_iter()
        .map(|a| a.name.as_str())
        .filter(|attr| !restriction.attributes.contains_key(*attr))
        .collect();
    missing.sort_unstable();
    for attr in missing {
        out.push(ctx.warning(
            "strictness.missing-required-attribute",
            format!("{}.attributes", path),
            format!(
                "'{}' is XSD-required on <{}> but is not listed under 'attributes'. The profile is loosening the schema.",
                attr, name
            ),
        ));
    }
}

fn child_cardinality(
    ctx: &RuleContext<'_>,
    name: &str,
    path: &str,
    info: &ElementInfo,
    restriction: &ElementRestriction,
    out: &mut Vec<Diagnostic>,
) {
    let declared = restriction
        .children
        .iter()
        .map(|(child, label)| (format!("{}.children.{}", path, child), child, label))
        .chain(
            restriction
                .exclusive_children
                .iter()
                .map(|(child, label)| (format!("{}.children.choice.{}", path, child), child, label)),
        );

    for (child_path, child, label) in declared {
        let Some(label) = label else {
            continue;
        };
        let Some(grammar) = info.child(child) else {
            continue;
        };
        let profile: Cardinality = match label.parse() {
            Ok(cardinality) => cardinality,
            Err(reason) => {
                out.push(ctx.error(
                    "strictness.invalid-cardinality",
                    child_path,
                    format!("Cardinality of <{}> inside <{}> is invalid: {}", child, name, reason),
                ));
                continue;
            }
        };

        if profile.min < grammar.min_occurs {
            out.push(ctx.error(
                "strictness.loosened-child-cardinality",
                child_path.clone(),
                format!(
                    "Profile sets min_occurs={} for <{}> inside <{}>, but the XSD requires at least {}. The profile is loosening the schema.",
                    profile.min, child, name, grammar.min_occurs
                ),
            ));
        }
        if let Some(grammar_max) = grammar.max_occurs {
            if profile.max.is_none_or(|max| max > grammar_max) {
                let shown = profile.max.map_or_else(|| "*".to_string(), |max| max.to_string());
                out.push(ctx.error(
                    "strictness.loosened-child-cardinality",
                    child_path,
                    format!(
                        "Profile sets max_occurs={} for <{}> inside <{}>, but the XSD allows at most {}. The profile is loosening the schema.",
                        shown, child, name, grammar_max
                    ),
                ));
            }
        }
    }
}

fn attribute_required(
    ctx: &RuleContext<'_>,
    name: &str,
    path: &str,
    info: &ElementInfo,
    restriction: &ElementRestriction,
    out: &mut Vec<Diagnostic>,
) {
    for (attr_name, rule) in &restriction.attributes {
        let Some(attr) = info.attribute(attr_name) else {
            continue;
        };
        if attr.required && !rule.required {
            out.push(ctx.error(
                "strictness.loosened-attribute-required",
                format!("{}.attributes.{}", path, attr_name),
                format!(
                    "'{}' is required by the XSD on <{}> but the profile does not mark it as required. The profile is loosening the schema.",
                    attr_name, name
                ),
            ));
        }
    }
}

fn undeclared_children(
    ctx: &RuleContext<'_>,
    name: &str,
    path: &str,
    restriction: &ElementRestriction,
    out: &mut Vec<Diagnostic>,
) {
    let referenced = restriction
        .children
        .keys()
        .map(|child| (child.as_str(), format!("{}.children.{}", path, child)))
        .chain(
            restriction
                .exclusive_children
                .keys()
                .map(|child| (child.as_str(), format!("{}.children.choice.{}", path, child))),
        )
        .chain(
            restriction
                .structure
                .iter()
                .enumerate()
                .map(|(i, entry)| (entry.as_str(), format!("{}.structure[{}]", path, i))),
        );

    let mut reported = HashSet::new();
    for (child, child_path) in referenced {
        if !ctx.schema.has_element(child) || ctx.profile.declares(child) || !reported.insert(child) {
            continue;
        }
        out.push(ctx.warning(
            "strictness.undeclared-child-element",
            child_path,
            format!(
                "'{}' is referenced by <{}> but has no element definition in the profile. Add it to 'elements' to keep the profile valid.",
                child, name
            ),
        ));
    }
}

fn required_chain(ctx: &RuleContext<'_>, out: &mut Vec<Diagnostic>) {
    for doc_type in &ctx.profile.document_types {
        if !ctx.schema.has_element(doc_type) {
            continue;
        }
        let mut missing = Vec::new();
        walk_required(ctx.schema, doc_type, ctx.profile, &mut HashSet::new(), &mut missing);
        missing.sort_unstable();
        for element in missing {
            out.push(ctx.error(
                "strictness.missing-required-element",
                "profile.elements",
                format!(
                    "<{}> is on the required-child chain of document type '{}' but is not declared in the profile's 'elements' section.",
                    element, doc_type
                ),
            ));
        }
    }
}

fn walk_required<'s>(
    schema: &'s SchemaModel,
    name: &'s str,
    profile: &akn_profile::ProfileRestriction,
    visited: &mut HashSet<&'s str>,
    missing: &mut Vec<&'s str>,
) {
    if !visited.insert(name) {
        return;
    }
    if !profile.declares(name) {
        missing.push(name);
    }
    for child in schema.get_required_children(name) {
        walk_required(schema, &child.name, profile, visited, missing);
    }
}
