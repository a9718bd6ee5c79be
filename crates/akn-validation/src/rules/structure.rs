//! Containment: declared children and structure chains

use super::{RuleCategory, RuleContext, element_path, sorted_list};
use akn_profile::Diagnostic;

pub struct StructureRules;

impl RuleCategory for StructureRules {
    fn name(&self) -> &'static str {
        "structure"
    }

    fn check(&self, ctx: &RuleContext<'_>) -> Vec<Diagnostic> {
        let mut out = Vec::new();
        for (name, restriction) in ctx.known_elements() {
            let path = element_path(name);
            let valid = ctx.schema.get_children(name);

            for child in restriction.children.keys() {
                if ctx.schema.has_element(child) && !valid.contains(&child.as_str()) {
                    out.push(ctx.error(
                        "structure.invalid-child",
                        format!("{}.children.{}", path, child),
                        format!(
                            "<{}> cannot contain <{}> according to the AKN schema. Valid children: {}",
                            name,
                            child,
                            sorted_list(valid.iter().copied())
                        ),
                    ));
                }
            }

            chain(ctx, name, &restriction.structure, &valid, &path, &mut out);
        }
        out
    }
}

/// `structure: [chapter, article]` reads as `<name>` contains `<chapter>`
/// contains `<article>`
fn chain(
    ctx: &RuleContext<'_>,
    name: &str,
    structure: &[String],
    valid: &[&str],
    path: &str,
    out: &mut Vec<Diagnostic>,
) {
    let Some(first) = structure.first() else {
        return;
    };
    if ctx.schema.has_element(first) && !valid.contains(&first.as_str()) {
        out.push(ctx.error(
            "structure.invalid-structure-root",
            format!("{}.structure[0]", path),
            format!(
                "<{}> is not a valid child of <{}>, so it cannot be the first level of the structure hierarchy",
                first, name
            ),
        ));
    }

    for (i, pair) in structure.windows(2).enumerate() {
        let (parent, child) = (&pair[0], &pair[1]);
        let Some(parent_info) = ctx.schema.get_element_info(parent) else {
            continue;
        };
        if ctx.schema.has_element(child) && !parent_info.has_child(child) {
            out.push(ctx.error(
                "structure.invalid-structure-chain",
                format!("{}.structure[{}]", path, i + 1),
                format!(
                    "<{}> cannot contain <{}> according to the AKN schema, so the structure chain '{} > {}' is invalid",
                    parent, child, parent, child
                ),
            ));
        }
    }
}
