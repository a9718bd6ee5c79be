//! Name existence: document types, elements, attributes

use super::{RuleCategory, RuleContext, element_path, sorted_list};
use akn_profile::Diagnostic;

pub struct VocabularyRules;

impl RuleCategory for VocabularyRules {
    fn name(&self) -> &'static str {
        "vocabulary"
    }

    fn check(&self, ctx: &RuleContext<'_>) -> Vec<Diagnostic> {
        let mut out = Vec::new();
        document_types(ctx, &mut out);
        elements(ctx, &mut out);
        out
    }
}

fn document_types(ctx: &RuleContext<'_>, out: &mut Vec<Diagnostic>) {
    let valid = ctx.schema.document_types();
    for (i, doc_type) in ctx.profile.document_types.iter().enumerate() {
        if !valid.contains(&doc_type.as_str()) {
            out.push(ctx.error(
                "vocabulary.unknown-document-type",
                format!("profile.documentTypes[{}]", i),
                format!(
                    "'{}' is not a valid AKN document type. Valid types: {}",
                    doc_type,
                    sorted_list(valid.iter().copied())
                ),
            ));
        }
    }
}

fn unknown_element(ctx: &RuleContext<'_>, name: &str, path: String) -> Diagnostic {
    ctx.error(
        "vocabulary.unknown-element",
        path,
        format!("'{}' is not a known AKN element", name),
    )
}

fn elements(ctx: &RuleContext<'_>, out: &mut Vec<Diagnostic>) {
    for (name, restriction) in &ctx.profile.elements {
        let path = element_path(name);
        let Some(info) = ctx.schema.get_element_info(name) else {
            out.push(unknown_element(ctx, name, path));
            continue;
        };

        for attr in restriction.attributes.keys() {
            if !info.has_attribute(attr) {
                out.push(ctx.error(
                    "vocabulary.unknown-attribute",
                    format!("{}.attributes.{}", path, attr),
                    format!(
                        "'{}' is not a valid attribute on <{}>. Known attributes: {}",
                        attr,
                        name,
                        sorted_list(info.attributes.iter().map(|a| a.name.as_str()))
                    ),
                ));
            }
        }

        for child in restriction.children.keys() {
            if !ctx.schema.has_element(child) {
                out.push(unknown_element(ctx, child, format!("{}.children.{}", path, child)));
            }
        }
        for child in restriction.exclusive_children.keys() {
            if !ctx.schema.has_element(child) {
                out.push(unknown_element(
                    ctx,
                    child,
                    format!("{}.children.choice.{}", path, child),
                ));
            }
        }
        for (i, entry) in restriction.structure.iter().enumerate() {
            if !ctx.schema.has_element(entry) {
                out.push(unknown_element(ctx, entry, format!("{}.structure[{}]", path, i)));
            }
        }
    }
}
