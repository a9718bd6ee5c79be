//! Scaffold generation
//!
//! Builds the smallest profile the grammar accepts for one document type:
//! the mandatory-child closure of the document type, each element with its
//! mandatory attributes and children, plus the grammar root.

use crate::expand::{DOCUMENT_TYPE_CARDINALITY, required_closure};
use crate::ordering::compute_profile_order;
use crate::{Error, Result};
use akn_profile::{AttributeRestriction, ElementRestriction, ProfileRestriction};
use akn_schema::{ElementInfo, SchemaModel};
use indexmap::IndexMap;
use std::collections::BTreeSet;
use std::fmt::Write;
use tracing::info;

/// Longest element documentation copied into a comment
const MAX_DOC_CHARS: usize = 100;
/// Optional children listed in an "Also available" comment
const MAX_AVAILABLE: usize = 15;

/// Generation options
#[derive(Debug, Clone, PartialEq, Eq, serde::Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GenerateOptions {
    /// List every grammar child, not only the mandatory ones
    pub include_optional_children: bool,
    /// List optional attributes as `required: false`
    pub include_optional_attributes: bool,
    /// Annotate the YAML with grammar facts
    pub comments: bool,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            include_optional_children: false,
            include_optional_attributes: false,
            comments: true,
        }
    }
}

impl GenerateOptions {
    #[must_use]
    pub fn with_optional_children(mut self, enabled: bool) -> Self {
        self.include_optional_children = enabled;
        self
    }

    #[must_use]
    pub fn with_optional_attributes(mut self, enabled: bool) -> Self {
        self.include_optional_attributes = enabled;
        self
    }

    #[must_use]
    pub fn with_comments(mut self, enabled: bool) -> Self {
        self.comments = enabled;
        self
    }
}

/// Build the minimum viable profile for `doc_type`
pub fn generate_profile(
    schema: &SchemaModel,
    doc_type: &str,
    options: &GenerateOptions,
) -> Result<ProfileRestriction> {
    let valid = schema.document_types();
    if !valid.contains(&doc_type) {
        return Err(Error::UnknownDocumentType {
            name: doc_type.to_string(),
            valid: valid.iter().map(|s| s.to_string()).collect(),
        });
    }

    let mut elements: IndexMap<String, ElementRestriction> = IndexMap::new();
    for name in required_closure(schema, doc_type) {
        if let Some(info) = schema.get_element_info(name) {
            elements.insert(name.to_string(), element_restriction(schema, info, options));
        }
    }

    if let Some(root) = schema.root_element().and_then(|r| schema.get_element_info(r)) {
        let mut restriction = ElementRestriction {
            attributes: attribute_restrictions(root, options),
            ..ElementRestriction::default()
        };
        restriction
            .children
            .insert(doc_type.to_string(), Some(DOCUMENT_TYPE_CARDINALITY.to_string()));
        elements.insert(root.xml_name.clone(), restriction);
    }

    let mut profile = ProfileRestriction::new(format!("Minimum viable profile ({})", doc_type), "1.0")
        .with_description(format!(
            "Minimum viable application profile for the {} document type.",
            doc_type
        ))
        .with_document_type(doc_type);

    profile.elements = elements;
    let order = compute_profile_order(&profile, schema);
    let mut unordered = std::mem::take(&mut profile.elements);
    for name in order {
        if let Some(restriction) = unordered.shift_remove(&name) {
            profile.elements.insert(name, restriction);
        }
    }

    info!(
        "Generated profile for '{}' with {} elements",
        doc_type,
        profile.elements.len()
    );
    Ok(profile)
}

fn attribute_restrictions(
    info: &ElementInfo,
    options: &GenerateOptions,
) -> IndexMap<String, AttributeRestriction> {
    info.attributes
        .iter()
        .filter(|a| a.required || options.include_optional_attributes)
        .map(|a| {
            let restriction = AttributeRestriction {
                required: a.required,
                values: a.enum_values.clone().unwrap_or_default(),
            };
            (a.name.clone(), restriction)
        })
        .collect()
}

fn element_restriction(
    schema: &SchemaModel,
    info: &ElementInfo,
    options: &GenerateOptions,
) -> ElementRestriction {
    let mut restriction = ElementRestriction {
        attributes: attribute_restrictions(info, options),
        ..ElementRestriction::default()
    };

    if !options.include_optional_children {
        for child in info.children.iter().filter(|c| c.required()) {
            restriction
                .children
                .insert(child.name.clone(), Some(child.cardinality()));
        }
        return restriction;
    }

    // Alternatives of an exclusive group cannot all be always-present.
    let exclusive: BTreeSet<&str> = schema
        .get_choice_groups(&info.xml_name)
        .iter()
        .filter(|g| g.exclusive && g.all_elements.len() >= 2)
        .flat_map(|g| g.all_elements.iter().map(String::as_str))
        .collect();
    for child in &info.children {
        let cardinality = Some(child.cardinality());
        if exclusive.contains(child.name.as_str()) {
            restriction.exclusive_children.insert(child.name.clone(), cardinality);
        } else {
            restriction.children.insert(child.name.clone(), cardinality);
        }
    }
    restriction.declares_choice = !restriction.exclusive_children.is_empty();
    restriction
}

/// Generate the profile for `doc_type` as YAML text
pub fn generate_yaml(schema: &SchemaModel, doc_type: &str, options: &GenerateOptions) -> Result<String> {
    let profile = generate_profile(schema, doc_type, options)?;
    if options.comments {
        commented_yaml(&profile, schema)
    } else {
        Ok(profile.to_yaml()?)
    }
}

/// Double-quoted YAML scalar, escaped with JSON string syntax
fn quoted(value: &str) -> Result<String> {
    Ok(serde_json::to_string(value)?)
}

fn truncated(doc: &str) -> String {
    if doc.chars().count() > MAX_DOC_CHARS {
        let head: String = doc.chars().take(MAX_DOC_CHARS).collect();
        format!("{}...", head)
    } else {
        doc.to_string()
    }
}

fn commented_yaml(profile: &ProfileRestriction, schema: &SchemaModel) -> Result<String> {
    let mut out = String::new();
    out.push_str("# Auto-generated AKN Application Profile\n");
    let _ = writeln!(
        out,
        "# Document type: {}",
        profile.document_types.first().map_or("generic", String::as_str)
    );
    out.push_str("# Generated from Akoma Ntoso 3.0 XSD\n\n");

    out.push_str("profile:\n");
    let _ = writeln!(out, "  name: {}", quoted(&profile.name)?);
    let _ = writeln!(out, "  version: {}", quoted(&profile.version)?);
    let _ = writeln!(out, "  description: {}", quoted(&profile.description)?);
    out.push('\n');

    if !profile.document_types.is_empty() {
        let _ = writeln!(
            out,
            "  # Valid document types: {}",
            schema.document_types().join(", ")
        );
        out.push_str("  documentTypes:\n");
        for doc_type in &profile.document_types {
            let _ = writeln!(out, "    - {}", doc_type);
        }
        out.push('\n');
    }

    out.push_str("  # Element restrictions (derived from XSD required-child chains)\n");
    out.push_str("  elements:\n");
    for (name, restriction) in &profile.elements {
        let info = schema.get_element_info(name);
        if let Some(info) = info.filter(|i| !i.doc.is_empty()) {
            let _ = writeln!(out, "    # {}", truncated(&info.doc));
        }
        let _ = writeln!(out, "    {}:", name);
        if let Some(info) = info {
            write_attributes(&mut out, info, restriction)?;
            write_children(&mut out, info, restriction)?;
        }
        out.push('\n');
    }
    Ok(out)
}

fn write_attributes(out: &mut String, info: &ElementInfo, restriction: &ElementRestriction) -> Result<()> {
    if restriction.attributes.is_empty() {
        return Ok(());
    }
    out.push_str("      attributes:\n");
    for (name, rule) in &restriction.attributes {
        let comment = info
            .attribute(name)
            .map(|attr| {
                let mut parts = vec![if attr.required {
                    "XSD-required".to_string()
                } else {
                    "optional in XSD".to_string()
                }];
                if let Some(pattern) = attr.pattern_str() {
                    parts.push(format!("pattern: {}", pattern));
                }
                if let Some(type_name) = &attr.type_name {
                    parts.push(format!("type: {}", type_name));
                }
                format!("  # {}", parts.join(", "))
            })
            .unwrap_or_default();
        let _ = writeln!(out, "        {}:{}", name, comment);
        if rule.required {
            out.push_str("          required: true\n");
        }
        if !rule.values.is_empty() {
            let values = rule.values.iter().map(|v| quoted(v)).collect::<Result<Vec<_>>>()?;
            let _ = writeln!(out, "          values: [{}]", values.join(", "));
        }
    }
    Ok(())
}

fn write_children(out: &mut String, info: &ElementInfo, restriction: &ElementRestriction) -> Result<()> {
    if restriction.children.is_empty() && restriction.exclusive_children.is_empty() {
        return Ok(());
    }
    let available: Vec<&str> = info
        .children
        .iter()
        .filter(|c| !c.required())
        .map(|c| c.name.as_str())
        .filter(|c| !restriction.children.contains_key(*c) && !restriction.exclusive_children.contains_key(*c))
        .collect();
    if !available.is_empty() {
        let shown: Vec<&str> = available.iter().copied().take(MAX_AVAILABLE).collect();
        let more = if available.len() > MAX_AVAILABLE { "..." } else { "" };
        let _ = writeln!(out, "      # Also available: {}{}", shown.join(", "), more);
    }

    out.push_str("      children:\n");
    let tag = |child: &str| {
        if info.child(child).is_some_and(|c| c.required()) {
            " # required"
        } else {
            ""
        }
    };
    for (child, cardinality) in &restriction.children {
        write_child(out, 8, child, cardinality.as_deref(), tag(child))?;
    }
    if !restriction.exclusive_children.is_empty() {
        let _ = writeln!(out, "        {}:", akn_profile::CHOICE_KEY);
        for (child, cardinality) in &restriction.exclusive_children {
            write_child(out, 10, child, cardinality.as_deref(), tag(child))?;
        }
    }
    Ok(())
}

fn write_child(out: &mut String, indent: usize, name: &str, cardinality: Option<&str>, tag: &str) -> Result<()> {
    let pad = " ".repeat(indent);
    match cardinality {
        Some(label) => {
            let _ = writeln!(out, "{}{}: {}{}", pad, name, quoted(label)?, tag);
        }
        None => {
            let _ = writeln!(out, "{}{}:{}", pad, name, tag);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use akn_profile::parse_profile;

    #[test]
    fn test_generate_act_profile() {
        let schema = akn_schema::bundled().unwrap();
        let profile = generate_profile(&schema, "act", &GenerateOptions::default()).unwrap();
        assert_eq!(profile.name, "Minimum viable profile (act)");
        assert_eq!(profile.version, "1.0");
        assert_eq!(profile.document_types, vec!["act"]);

        let names: Vec<&str> = profile.elements.keys().map(String::as_str).collect();
        assert_eq!(&names[..2], &["akomaNtoso", "act"]);
        assert!(names.contains(&"FRBRcountry"));
        assert!(!names.contains(&"preface"));

        let act = &profile.elements["act"];
        assert!(act.attributes["contains"].required);
        assert_eq!(act.attributes["contains"].values.len(), 3);
        assert!(!act.attributes.contains_key("lang"));
        assert_eq!(act.children.get("body"), Some(&Some("1..1".to_string())));
        assert_eq!(
            profile.elements["akomaNtoso"].children.get("act"),
            Some(&Some("1..1".to_string()))
        );
    }

    #[test]
    fn test_generate_with_optional_members() {
        let schema = akn_schema::bundled().unwrap();
        let options = GenerateOptions::default()
            .with_optional_children(true)
            .with_optional_attributes(true);
        let profile = generate_profile(&schema, "act", &options).unwrap();
        let act = &profile.elements["act"];
        assert!(act.children.contains_key("preface"));
        assert!(!act.attributes["lang"].required);

        let body = &profile.elements["body"];
        assert!(body.children.contains_key("section"));
        assert!(body.exclusive_children.is_empty());
    }

    #[test]
    fn test_unknown_document_type() {
        let schema = akn_schema::bundled().unwrap();
        let err = generate_profile(&schema, "notADocType", &GenerateOptions::default()).unwrap_err();
        assert!(err.to_string().contains("Valid: act, bill, doc, debate, components"), "{}", err);
    }

    #[test]
    fn test_commented_yaml_parses() {
        let schema = akn_schema::bundled().unwrap();
        let text = generate_yaml(&schema, "act", &GenerateOptions::default()).unwrap();
        assert!(text.starts_with("# Auto-generated AKN Application Profile\n# Document type: act\n"));
        assert!(text.contains("  # Valid document types: act, bill, doc, debate, components\n"));
        assert!(text.contains("        contains:  # XSD-required, type: versionType\n"));
        assert!(text.contains("values: [\"originalVersion\", \"singleVersion\", \"multipleVersions\"]"));
        assert!(text.contains("        meta: \"1..1\" # required\n"));

        let outcome = parse_profile(&text);
        assert!(outcome.is_ok(), "{:?}", outcome.errors);
        let parsed = outcome.profile.unwrap();
        let generated = generate_profile(&schema, "act", &GenerateOptions::default()).unwrap();
        assert_eq!(parsed.elements, generated.elements);
    }

    #[test]
    fn test_quoted_scalars_read_back() {
        for value in ["1..1", "line one\nline two", "say \"hi\"\t# not a comment"] {
            let text = format!("key: {}\n", quoted(value).unwrap());
            let parsed: serde_yaml::Value = serde_yaml::from_str(&text).unwrap();
            assert_eq!(parsed["key"].as_str(), Some(value), "{}", text);
        }
    }

    #[test]
    fn test_plain_yaml_matches_writer() {
        let schema = akn_schema::bundled().unwrap();
        let options = GenerateOptions::default().with_comments(false);
        let text = generate_yaml(&schema, "debate", &options).unwrap();
        assert!(!text.contains('#'));
        let parsed = parse_profile(&text).profile.unwrap();
        assert_eq!(parsed.document_types, vec!["debate"]);
    }
}
