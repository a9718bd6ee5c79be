//! Profile text parser
//!
//! Turns profile text into a [`ProfileRestriction`] plus a [`LineIndex`].
//! Structural problems (YAML syntax, wrong top-level shape, wrong value
//! types) are reported as `parse.*` diagnostics, in which case no profile is
//! produced.

use crate::diagnostic::Diagnostic;
use crate::line_index::{LineIndex, Location};
use crate::model::{AttributeRestriction, CHOICE_KEY, ElementRestriction, ProfileRestriction};
use indexmap::IndexMap;
use serde_yaml::{Mapping, Value};
use tracing::{debug, trace};

/// Result of parsing a profile document
#[derive(Debug, Clone)]
pub struct ParseOutcome {
    /// `None` when any structural error was found
    pub profile: Option<ProfileRestriction>,
    pub errors: Vec<Diagnostic>,
    /// Built regardless of whether parsing succeeded
    pub line_index: LineIndex,
}

impl ParseOutcome {
    pub fn is_ok(&self) -> bool {
        self.profile.is_some()
    }
}

/// Parse profile text
pub fn parse_profile(text: &str) -> ParseOutcome {
    let line_index = LineIndex::from_text(text);
    trace!("Indexed {} profile paths", line_index.len());

    let fail = |error: Diagnostic, line_index: LineIndex| ParseOutcome {
        profile: None,
        errors: vec![error],
        line_index,
    };

    let raw: Value = match serde_yaml::from_str(text) {
        Ok(value) => value,
        Err(e) => {
            let location = e
                .location()
                .map(|l| Location::new(l.line(), l.column().saturating_sub(1)));
            debug!("Profile is not valid YAML: {}", e);
            return fail(
                Diagnostic::error("parse.yaml-syntax", "", format!("YAML syntax error: {}", e)).at(location),
                line_index,
            );
        }
    };

    let Value::Mapping(root) = raw else {
        return fail(
            Diagnostic::error(
                "parse.not-a-mapping",
                "",
                "Profile must be a YAML mapping. Start with 'profile:' at the top of the file.",
            )
            .at_line(Some(1)),
            line_index,
        );
    };

    let profile_value = match root.get("profile") {
        None | Some(Value::Null) => {
            return fail(
                Diagnostic::error("parse.missing-profile-key", "", "Missing top-level 'profile' key")
                    .at_line(Some(1)),
                line_index,
            );
        }
        Some(value) => value,
    };

    let Value::Mapping(profile_map) = profile_value else {
        let location = line_index.get("profile");
        return fail(
            Diagnostic::error("parse.profile-not-mapping", "profile", "'profile' must be a mapping")
                .at(location),
            line_index,
        );
    };

    let mut shape = ShapeChecker {
        line_index: &line_index,
        errors: Vec::new(),
    };
    let profile = shape.profile(profile_map);
    let errors = shape.errors;

    if errors.is_empty() {
        debug!(
            "Parsed profile '{}' with {} element entries",
            profile.name,
            profile.elements.len()
        );
        ParseOutcome {
            profile: Some(profile),
            errors,
            line_index,
        }
    } else {
        ParseOutcome {
            profile: None,
            errors,
            line_index,
        }
    }
}

/// Converts the generic YAML tree, collecting every shape violation
struct ShapeChecker<'a> {
    line_index: &'a LineIndex,
    errors: Vec<Diagnostic>,
}

impl ShapeChecker<'_> {
    fn invalid(&mut self, path: &str, message: impl Into<String>) {
        let location = self.line_index.locate(path);
        self.errors
            .push(Diagnostic::error("parse.invalid-shape", path, message).at(location));
    }

    fn profile(&mut self, map: &Mapping) -> ProfileRestriction {
        let mut profile = ProfileRestriction::default();
        for (key, value) in map {
            let Some(key) = self.key(key, "profile") else {
                continue;
            };
            let path = format!("profile.{}", key);
            match key {
                "name" => profile.name = self.text(value, &path).unwrap_or_default(),
                "version" => profile.version = self.text(value, &path).unwrap_or_default(),
                "description" => profile.description = self.text(value, &path).unwrap_or_default(),
                "documentTypes" => profile.document_types = self.names(value, &path),
                "elements" => profile.elements = self.elements(value, &path),
                _ => trace!("Ignoring unknown profile key '{}'", key),
            }
        }
        profile
    }

    fn key<'v>(&mut self, key: &'v Value, parent: &str) -> Option<&'v str> {
        match key {
            Value::String(s) => Some(s.as_str()),
            other => {
                self.invalid(parent, format!("keys must be strings, found {}", describe(other)));
                None
            }
        }
    }

    /// Scalars are accepted as text, so `version: 1.0` reads as `"1.0"`
    fn text(&mut self, value: &Value, path: &str) -> Option<String> {
        match value {
            Value::Null => None,
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            other => {
                self.invalid(path, format!("expected a string, found {}", describe(other)));
                None
            }
        }
    }

    fn names(&mut self, value: &Value, path: &str) -> Vec<String> {
        match value {
            Value::Null => Vec::new(),
            Value::Sequence(items) => items
                .iter()
                .enumerate()
                .filter_map(|(i, item)| match item {
                    Value::String(s) => Some(s.clone()),
                    other => {
                        self.invalid(
                            &format!("{}[{}]", path, i),
                            format!("expected an element name, found {}", describe(other)),
                        );
                        None
                    }
                })
                .collect(),
            other => {
                self.invalid(path, format!("expected a list, found {}", describe(other)));
                Vec::new()
            }
        }
    }

    fn mapping<'v>(&mut self, value: &'v Value, path: &str) -> Option<&'v Mapping> {
        match value {
            Value::Null => None,
            Value::Mapping(map) => Some(map),
            other => {
                self.invalid(path, format!("expected a mapping, found {}", describe(other)));
                None
            }
        }
    }

    fn elements(&mut self, value: &Value, path: &str) -> IndexMap<String, ElementRestriction> {
        let mut elements = IndexMap::new();
        let Some(map) = self.mapping(value, path) else {
            return elements;
        };
        for (key, value) in map {
            let Some(name) = self.key(key, path) else {
                continue;
            };
            let entry_path = format!("{}.{}", path, name);
            let restriction = match self.mapping(value, &entry_path) {
                Some(entry) => self.element(entry, &entry_path),
                None => ElementRestriction::default(),
            };
            elements.insert(name.to_string(), restriction);
        }
        elements
    }

    fn element(&mut self, map: &Mapping, path: &str) -> ElementRestriction {
        let mut restriction = ElementRestriction::default();
        for (key, value) in map {
            let Some(key) = self.key(key, path) else {
                continue;
            };
            let field_path = format!("{}.{}", path, key);
            match key {
                "profileNote" => restriction.profile_note = self.text(value, &field_path),
                "attributes" => restriction.attributes = self.attributes(value, &field_path),
                "children" => self.children(value, &field_path, &mut restriction),
                "structure" => restriction.structure = self.names(value, &field_path),
                other => self.invalid(
                    &field_path,
                    format!(
                        "unknown key '{}'; expected profileNote, attributes, children or structure",
                        other
                    ),
                ),
            }
        }
        restriction
    }

    fn attributes(&mut self, value: &Value, path: &str) -> IndexMap<String, AttributeRestriction> {
        let mut attributes = IndexMap::new();
        let Some(map) = self.mapping(value, path) else {
            return attributes;
        };
        for (key, value) in map {
            let Some(name) = self.key(key, path) else {
                continue;
            };
            let attr_path = format!("{}.{}", path, name);
            let mut restriction = AttributeRestriction::default();
            if let Some(fields) = self.mapping(value, &attr_path) {
                for (field, value) in fields {
                    let Some(field) = self.key(field, &attr_path) else {
                        continue;
                    };
                    let field_path = format!("{}.{}", attr_path, field);
                    match (field, value) {
                        ("required", Value::Bool(b)) => restriction.required = *b,
                        ("required", Value::Null) => {}
                        ("required", other) => self.invalid(
                            &field_path,
                            format!("expected true or false, found {}", describe(other)),
                        ),
                        ("values", value) => restriction.values = self.values(value, &field_path),
                        (other, _) => self.invalid(
                            &field_path,
                            format!("unknown key '{}'; expected required or values", other),
                        ),
                    }
                }
            }
            attributes.insert(name.to_string(), restriction);
        }
        attributes
    }

    /// Attribute values may be any scalar; they are compared as text
    fn values(&mut self, value: &Value, path: &str) -> Vec<String> {
        match value {
            Value::Null => Vec::new(),
            Value::Sequence(items) => items
                .iter()
                .enumerate()
                .filter_map(|(i, item)| {
                    let item_path = format!("{}[{}]", path, i);
                    match item {
                        Value::Null => {
                            self.invalid(&item_path, "expected a value, found null");
                            None
                        }
                        other => self.text(other, &item_path),
                    }
                })
                .collect(),
            other => {
                self.invalid(path, format!("expected a list, found {}", describe(other)));
                Vec::new()
            }
        }
    }

    fn children(&mut self, value: &Value, path: &str, restriction: &mut ElementRestriction) {
        let Some(map) = self.mapping(value, path) else {
            return;
        };
        for (key, value) in map {
            let Some(name) = self.key(key, path) else {
                continue;
            };
            let child_path = format!("{}.{}", path, name);
            if name == CHOICE_KEY {
                restriction.declares_choice = true;
                if let Some(choice) = self.mapping(value, &child_path) {
                    for (key, value) in choice {
                        let Some(member) = self.key(key, &child_path) else {
                            continue;
                        };
                        let member_path = format!("{}.{}", child_path, member);
                        let cardinality = self.cardinality(value, &member_path);
                        restriction
                            .exclusive_children
                            .insert(member.to_string(), cardinality);
                    }
                }
            } else {
                let cardinality = self.cardinality(value, &child_path);
                restriction.children.insert(name.to_string(), cardinality);
            }
        }
    }

    fn cardinality(&mut self, value: &Value, path: &str) -> Option<String> {
        match value {
            Value::Null => None,
            Value::String(s) => Some(s.clone()),
            other => {
                self.invalid(
                    path,
                    format!("expected a cardinality such as \"1..1\", found {}", describe(other)),
                );
                None
            }
        }
    }
}

fn describe(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Sequence(_) => "a list",
        Value::Mapping(_) => "a mapping",
        Value::Tagged(_) => "a tagged value",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALID: &str = r#"profile:
  name: "Test profile"
  version: 1.0
  documentTypes:
    - act
  elements:
    act:
      attributes:
        contains:
          required: true
          values: [originalVersion]
      children:
        meta: "1..1"
        body:
    section:
      children:
        num:
        choice:
          intro:
          content: "1..1"
    meta:
"#;

    fn rule_ids(outcome: &ParseOutcome) -> Vec<&str> {
        outcome.errors.iter().map(|e| e.rule_id.as_str()).collect()
    }

    #[test]
    fn test_parse_valid_profile() {
        let outcome = parse_profile(VALID);
        assert!(outcome.errors.is_empty(), "{:?}", outcome.errors);
        let profile = outcome.profile.unwrap();
        assert_eq!(profile.name, "Test profile");
        assert_eq!(profile.version, "1.0");
        assert_eq!(profile.document_types, vec!["act"]);

        let act = profile.element("act").unwrap();
        assert!(act.attributes["contains"].required);
        assert_eq!(act.attributes["contains"].values, vec!["originalVersion"]);
        assert_eq!(act.children["meta"].as_deref(), Some("1..1"));
        assert_eq!(act.children["body"], None);

        let section = profile.element("section").unwrap();
        assert!(section.declares_choice);
        assert!(!section.children.contains_key("choice"));
        assert_eq!(section.exclusive_children.len(), 2);
        assert_eq!(section.exclusive_children["content"].as_deref(), Some("1..1"));

        assert!(profile.element("meta").unwrap().is_empty());
    }

    #[test]
    fn test_yaml_syntax_error() {
        let outcome = parse_profile("profile:\n  name: [unclosed\n");
        assert!(outcome.profile.is_none());
        assert_eq!(rule_ids(&outcome), vec!["parse.yaml-syntax"]);
        assert!(outcome.errors[0].line.is_some());
    }

    #[test]
    fn test_top_level_shapes() {
        assert_eq!(rule_ids(&parse_profile("- a\n- b\n")), vec!["parse.not-a-mapping"]);
        assert_eq!(rule_ids(&parse_profile("")), vec!["parse.not-a-mapping"]);
        assert_eq!(rule_ids(&parse_profile("other: 1\n")), vec!["parse.missing-profile-key"]);
        let outcome = parse_profile("profile: 3\n");
        assert_eq!(rule_ids(&outcome), vec!["parse.profile-not-mapping"]);
        assert_eq!(outcome.errors[0].line, Some(1));
    }

    #[test]
    fn test_invalid_shapes_are_located() {
        let text = "profile:\n  documentTypes: act\n  elements:\n    act:\n      children:\n        meta: 3\n      attributes:\n        name:\n          required: maybe\n";
        let outcome = parse_profile(text);
        assert!(outcome.profile.is_none());
        assert_eq!(outcome.errors.len(), 3);
        assert!(outcome.errors.iter().all(|e| e.rule_id == "parse.invalid-shape"));
        let paths: Vec<_> = outcome.errors.iter().map(|e| e.path.as_str()).collect();
        assert_eq!(
            paths,
            vec![
                "profile.documentTypes",
                "profile.elements.act.children.meta",
                "profile.elements.act.attributes.name.required",
            ]
        );
        assert_eq!(outcome.errors[1].line, Some(6));
    }

    #[test]
    fn test_unknown_element_key_rejected() {
        let outcome = parse_profile("profile:\n  elements:\n    act:\n      kids: {}\n");
        assert_eq!(rule_ids(&outcome), vec!["parse.invalid-shape"]);
        assert_eq!(outcome.errors[0].path, "profile.elements.act.kids");
    }

    #[test]
    fn test_line_index_survives_failure() {
        let outcome = parse_profile("profile: 3\n");
        assert_eq!(outcome.line_index.line("profile"), Some(1));
    }
}
