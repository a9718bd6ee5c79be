//! Choice group rules
//!
//! The grammar's choice compositors come in two kinds. An exclusive group
//! (at most one selection per occurrence) must not have members of two
//! branches listed as always-present children; the profile expresses the
//! alternatives under `children.choice` instead. A free-mix group only
//! enumerates which members may appear. Either kind, when mandatory, needs
//! at least one member declared somewhere.

use super::{RuleCategory, RuleContext, element_path};
use akn_profile::{Diagnostic, ElementRestriction};
use akn_schema::ChoiceGroup;
use std::collections::BTreeSet;

/// Examples listed per branch in `required-group-empty` messages
const MAX_EXAMPLES: usize = 5;

pub struct ChoiceRules;

impl RuleCategory for ChoiceRules {
    fn name(&self) -> &'static str {
        "choice"
    }

    fn check(&self, ctx: &RuleContext<'_>) -> Vec<Diagnostic> {
        let mut out = Vec::new();
        for (name, restriction) in &ctx.profile.elements {
            let path = element_path(name);
            let groups = ctx.schema.get_choice_groups(name);

            if ctx.schema.has_element(name) {
                required_group_empty(ctx, name, &path, restriction, groups, &mut out);
            }
            incomplete_branches(ctx, name, &path, restriction, &mut out);
            if ctx.schema.has_element(name) {
                exclusive_conflict(ctx, name, &path, restriction, groups, &mut out);
                branch_invalid_child(ctx, name, &path, restriction, &mut out);
            }
            branch_overlap(ctx, name, &path, restriction, &mut out);
        }
        out
    }
}

fn branch_label(group: &ChoiceGroup, index: usize) -> &str {
    let branch = &group.branches[index];
    branch.label.as_deref().unwrap_or(&branch.branch_id)
}

fn required_group_empty(
    ctx: &RuleContext<'_>,
    name: &str,
    path: &str,
    restriction: &ElementRestriction,
    groups: &[ChoiceGroup],
    out: &mut Vec<Diagnostic>,
) {
    for group in groups.iter().filter(|g| g.required()) {
        if restriction.child_names().any(|child| group.contains(child)) {
            continue;
        }
        let available: Vec<String> = group
            .branches
            .iter()
            .enumerate()
            .map(|(i, branch)| {
                let examples: Vec<&str> = branch
                    .elements
                    .iter()
                    .take(MAX_EXAMPLES)
                    .map(String::as_str)
                    .collect();
                let more = branch.elements.len().saturating_sub(MAX_EXAMPLES);
                let suffix = if more > 0 {
                    format!(" (+{} more)", more)
                } else {
                    String::new()
                };
                format!("{}: {}{}", branch_label(group, i), examples.join(", "), suffix)
            })
            .collect();

        let children_path = format!("{}.children", path);
        let location = ctx
            .line_index
            .get(&children_path)
            .or_else(|| ctx.line_index.get(path));
        out.push(
            ctx.error(
                "choice.required-group-empty",
                children_path,
                format!(
                    "<{}> requires at least one child from a choice group but none are declared. Available: [{}]",
                    name,
                    available.join("; ")
                ),
            )
            .at(location),
        );
    }
}

fn incomplete_branches(
    ctx: &RuleContext<'_>,
    name: &str,
    path: &str,
    restriction: &ElementRestriction,
    out: &mut Vec<Diagnostic>,
) {
    let count = restriction.exclusive_children.len();
    if !restriction.declares_choice || count >= 2 {
        return;
    }
    let message = if count == 0 {
        format!(
            "<{}> has a 'choice:' with no children. Add at least 2 exclusive child elements.",
            name
        )
    } else {
        format!(
            "<{}> has a 'choice:' with only 1 child. A choice requires at least 2 exclusive children.",
            name
        )
    };
    out.push(ctx.error(
        "choice.incomplete-branches",
        format!("{}.children.choice", path),
        message,
    ));
}

fn exclusive_conflict(
    ctx: &RuleContext<'_>,
    name: &str,
    path: &str,
    restriction: &ElementRestriction,
    groups: &[ChoiceGroup],
    out: &mut Vec<Diagnostic>,
) {
    if restriction.children.is_empty() {
        return;
    }
    for group in groups.iter().filter(|g| g.exclusive) {
        let active: Vec<(usize, BTreeSet<&str>)> = group
            .branches
            .iter()
            .enumerate()
            .filter_map(|(i, branch)| {
                let present: BTreeSet<&str> = restriction
                    .children
                    .keys()
                    .map(String::as_str)
                    .filter(|child| branch.elements.contains(*child))
                    .collect();
                (!present.is_empty()).then_some((i, present))
            })
            .collect();
        let Some(((first, _), rest)) = active.split_first() else {
            continue;
        };
        for (index, members) in rest {
            let Some(child) = members.first() else {
                continue;
            };
            out.push(ctx.error(
                "choice.exclusive-branch-conflict",
                format!("{}.children.{}", path, child),
                format!(
                    "<{}> has an exclusive choice group: '{}' and '{}' cannot both appear in children. Use 'choice:' to express exclusive branches. Conflicting: {}",
                    name,
                    branch_label(group, *first),
                    branch_label(group, *index),
                    members.iter().copied().collect::<Vec<_>>().join(", ")
                ),
            ));
        }
    }
}

fn branch_invalid_child(
    ctx: &RuleContext<'_>,
    name: &str,
    path: &str,
    restriction: &ElementRestriction,
    out: &mut Vec<Diagnostic>,
) {
    let Some(info) = ctx.schema.get_element_info(name) else {
        return;
    };
    let choice_path = format!("{}.children.choice", path);
    let location = ctx.line_index.locate(&choice_path);
    for child in restriction.exclusive_children.keys() {
        if !info.has_child(child) {
            out.push(
                ctx.error(
                    "choice.branch-invalid-child",
                    format!("{}.{}", choice_path, child),
                    format!("<{}> is not a valid child of <{}> per the XSD.", child, name),
                )
                .at(location),
            );
        }
    }
}

fn branch_overlap(
    ctx: &RuleContext<'_>,
    name: &str,
    path: &str,
    restriction: &ElementRestriction,
    out: &mut Vec<Diagnostic>,
) {
    let choice_path = format!("{}.children.choice", path);
    let location = ctx.line_index.locate(&choice_path);
    for child in restriction.exclusive_children.keys() {
        if restriction.children.contains_key(child) {
            out.push(
                ctx.error(
                    "choice.branch-overlap",
                    format!("{}.{}", choice_path, child),
                    format!(
                        "<{}> appears in both 'children:' and 'choice:' of <{}>. An element cannot be both always-present and exclusive.",
                        child, name
                    ),
                )
                .at(location),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use akn_profile::parse_profile;

    fn check(text: &str) -> Vec<Diagnostic> {
        let schema = akn_schema::bundled().unwrap();
        let outcome = parse_profile(text);
        let profile = outcome.profile.expect("profile parses");
        ChoiceRules.check(&RuleContext::new(&profile, &schema, &outcome.line_index))
    }

    fn rule_ids(found: &[Diagnostic]) -> Vec<&str> {
        found.iter().map(|d| d.rule_id.as_str()).collect()
    }

    #[test]
    fn test_required_group_empty() {
        let found = check("profile:\n  elements:\n    section:\n      children:\n        num:\n");
        assert_eq!(rule_ids(&found), vec!["choice.required-group-empty"]);
        assert_eq!(found[0].path, "profile.elements.section.children");
        assert_eq!(found[0].line, Some(4));
        assert!(found[0].message.contains("intro + hierElements + wrapUp: "));
        assert!(found[0].message.contains("(+2 more)"));
        assert!(found[0].message.contains("; content: content]"));
    }

    #[test]
    fn test_required_group_empty_without_children_key() {
        let found = check("profile:\n  elements:\n    body:\n");
        assert_eq!(rule_ids(&found), vec!["choice.required-group-empty"]);
        assert_eq!(found[0].line, Some(3));
    }

    #[test]
    fn test_free_mix_group_satisfied_by_children() {
        let found = check("profile:\n  elements:\n    body:\n      children:\n        section:\n        chapter:\n");
        assert!(found.is_empty(), "{:?}", found);
    }

    #[test]
    fn test_group_satisfied_by_choice() {
        let found = check(
            "profile:\n  elements:\n    section:\n      children:\n        choice:\n          content:\n          paragraph:\n",
        );
        assert!(found.is_empty(), "{:?}", found);
    }

    #[test]
    fn test_incomplete_branches() {
        let empty = check("profile:\n  elements:\n    section:\n      children:\n        content:\n        choice:\n");
        assert_eq!(rule_ids(&empty), vec!["choice.incomplete-branches"]);
        assert!(empty[0].message.contains("no children"));
        assert_eq!(empty[0].line, Some(6));

        let single = check(
            "profile:\n  elements:\n    section:\n      children:\n        choice:\n          content:\n",
        );
        assert_eq!(rule_ids(&single), vec!["choice.incomplete-branches"]);
        assert!(single[0].message.contains("only 1 child"));
    }

    #[test]
    fn test_exclusive_branch_conflict() {
        let found = check(
            "profile:\n  elements:\n    section:\n      children:\n        num:\n        paragraph:\n        content:\n",
        );
        assert_eq!(rule_ids(&found), vec!["choice.exclusive-branch-conflict"]);
        assert_eq!(found[0].path, "profile.elements.section.children.content");
        assert_eq!(found[0].line, Some(7));
        assert!(found[0].message.contains("'intro + hierElements + wrapUp' and 'content'"));
    }

    #[test]
    fn test_same_branch_is_not_a_conflict() {
        let found = check(
            "profile:\n  elements:\n    section:\n      children:\n        intro:\n        paragraph:\n",
        );
        assert!(found.is_empty(), "{:?}", found);
    }

    #[test]
    fn test_branch_invalid_child_and_overlap() {
        let found = check(
            "profile:\n  elements:\n    section:\n      children:\n        content:\n        choice:\n          content:\n          meta:\n",
        );
        assert_eq!(
            rule_ids(&found),
            vec!["choice.branch-invalid-child", "choice.branch-overlap"]
        );
        assert_eq!(found[0].path, "profile.elements.section.children.choice.meta");
        assert_eq!(found[0].line, Some(6));
        assert_eq!(found[1].path, "profile.elements.section.children.choice.content");
    }
}
