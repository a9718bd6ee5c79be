//! Generated and expanded profiles must pass validation

use akn_cascade::{ExpandOptions, GenerateOptions, expand_element, generate_yaml};
use akn_validation::ValidationEngine;

/// Generation leaves exclusive alternatives for the author to pick
const ALLOWED: &str = "choice.required-group-empty";

#[test]
fn test_generated_profiles_validate() -> anyhow::Result<()> {
    let schema = akn_schema::bundled()?;
    let engine = ValidationEngine::new();

    for doc_type in schema.document_types() {
        for comments in [true, false] {
            let options = GenerateOptions::default().with_comments(comments);
            let text = generate_yaml(&schema, doc_type, &options)?;
            let unexpected: Vec<_> = engine
                .validate_text(&text, &schema)
                .into_iter()
                .filter(|d| d.rule_id != ALLOWED)
                .collect();
            assert!(
                unexpected.is_empty(),
                "{} (comments: {}): {:?}\n{}",
                doc_type,
                comments,
                unexpected,
                text
            );
        }
    }
    Ok(())
}

#[test]
fn test_expanded_document_type_validates() -> anyhow::Result<()> {
    let schema = akn_schema::bundled()?;
    let text = "profile:\n  name: Expanded\n  version: '1.0'\n  documentTypes: [bill]\n";
    let expanded = expand_element(text, "bill", &schema, &ExpandOptions::default().with_eid(true))?;

    let found = ValidationEngine::new().validate_text(&expanded, &schema);
    assert!(
        found.iter().all(|d| d.rule_id == ALLOWED),
        "{:?}\n{}",
        found,
        expanded
    );
    Ok(())
}
