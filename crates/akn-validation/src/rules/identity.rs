//! Uniqueness and cross-reference consistency within the profile

use super::{RuleCategory, RuleContext, element_path};
use akn_profile::Diagnostic;
use std::collections::HashMap;

pub struct IdentityRules;

impl RuleCategory for IdentityRules {
    fn name(&self) -> &'static str {
        "identity"
    }

    fn check(&self, ctx: &RuleContext<'_>) -> Vec<Diagnostic> {
        let mut out = Vec::new();

        for (name, restriction) in &ctx.profile.elements {
            let mut first_seen: HashMap<&str, usize> = HashMap::new();
            for (i, entry) in restriction.structure.iter().enumerate() {
                if let Some(first) = first_seen.get(entry.as_str()) {
                    out.push(ctx.warning(
                        "identity.duplicate-structure-entry",
                        format!("{}.structure[{}]", element_path(name), i),
                        format!(
                            "'{}' appears more than once in the structure list of <{}> (first at index {})",
                            entry, name, first
                        ),
                    ));
                } else {
                    first_seen.insert(entry, i);
                }
            }
        }

        for (i, doc_type) in ctx.profile.document_types.iter().enumerate() {
            if !ctx.profile.declares(doc_type) {
                out.push(ctx.info(
                    "identity.doctype-without-element-restriction",
                    format!("profile.documentTypes[{}]", i),
                    format!(
                        "Document type '{}' is listed in documentTypes but has no corresponding entry under 'elements'. Consider adding element restrictions for <{}>.",
                        doc_type, doc_type
                    ),
                ));
            }
        }

        out
    }
}
