//! Attribute value restrictions against enumeration and pattern facets

use super::{RuleCategory, RuleContext, element_path, sorted_list};
use akn_profile::Diagnostic;

pub struct DatatypeRules;

impl RuleCategory for DatatypeRules {
    fn name(&self) -> &'static str {
        "datatype"
    }

    fn check(&self, ctx: &RuleContext<'_>) -> Vec<Diagnostic> {
        let mut out = Vec::new();
        for (name, restriction) in ctx.known_elements() {
            let Some(info) = ctx.schema.get_element_info(name) else {
                continue;
            };
            for (attr_name, rule) in &restriction.attributes {
                let Some(attr) = info.attribute(attr_name) else {
                    continue;
                };
                if rule.values.is_empty() {
                    continue;
                }
                let attr_path = format!("{}.attributes.{}", element_path(name), attr_name);

                match &attr.enum_values {
                    Some(allowed) => {
                        for (i, value) in rule.values.iter().enumerate() {
                            if !allowed.contains(value) {
                                out.push(ctx.error(
                                    "datatype.invalid-enum-value",
                                    format!("{}.values[{}]", attr_path, i),
                                    format!(
                                        "'{}' is not a valid value for attribute '{}' on <{}>. Allowed by XSD: {}",
                                        value,
                                        attr_name,
                                        name,
                                        sorted_list(allowed.iter().map(String::as_str))
                                    ),
                                ));
                            }
                        }
                    }
                    None => out.push(ctx.info(
                        "datatype.custom-enum-on-free-attribute",
                        format!("{}.values", attr_path),
                        format!(
                            "Attribute '{}' on <{}> is not enum-typed in the XSD. The profile adds a custom value restriction [{}]; this is valid but not verifiable against the schema.",
                            attr_name,
                            name,
                            rule.values.join(", ")
                        ),
                    )),
                }

                // Unparsable grammar patterns were dropped at load time.
                if let Some(pattern) = &attr.pattern {
                    for (i, value) in rule.values.iter().enumerate() {
                        if !pattern.is_match(value) {
                            out.push(ctx.error(
                                "datatype.pattern-mismatch",
                                format!("{}.values[{}]", attr_path, i),
                                format!(
                                    "'{}' does not match the XSD pattern /{}/ for attribute '{}' on <{}>",
                                    value,
                                    pattern.as_str(),
                                    attr_name,
                                    name
                                ),
                            ));
                        }
                    }
                }
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use akn_profile::{Severity, parse_profile};

    fn check(text: &str) -> Vec<Diagnostic> {
        let schema = akn_schema::bundled().unwrap();
        let outcome = parse_profile(text);
        let profile = outcome.profile.expect("profile parses");
        DatatypeRules.check(&RuleContext::new(&profile, &schema, &outcome.line_index))
    }

    fn contains_profile(values: &str) -> String {
        format!(
            "profile:\n  elements:\n    act:\n      attributes:\n        contains:\n          required: true\n          values: {}\n",
            values
        )
    }

    #[test]
    fn test_invalid_enum_value() {
        let found = check(&contains_profile("[originalVersion, notARealVersion]"));
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].rule_id, "datatype.invalid-enum-value");
        assert_eq!(found[0].path, "profile.elements.act.attributes.contains.values[1]");
        assert_eq!(found[0].line, Some(7));
        assert!(found[0].message.contains("notARealVersion"));
    }

    #[test]
    fn test_enum_subset_is_clean() {
        assert!(check(&contains_profile("[originalVersion, singleVersion]")).is_empty());
    }

    #[test]
    fn test_custom_values_on_free_attribute() {
        let found = check(
            "profile:\n  elements:\n    act:\n      attributes:\n        name:\n          required: true\n          values: [act, decree]\n",
        );
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].rule_id, "datatype.custom-enum-on-free-attribute");
        assert_eq!(found[0].severity, Severity::Info);
        assert_eq!(found[0].path, "profile.elements.act.attributes.name.values");
    }

    #[test]
    fn test_pattern_mismatch() {
        let found = check(
            "profile:\n  elements:\n    TLCPerson:\n      attributes:\n        eId:\n          required: true\n          values:\n            - person_1\n            - two words\n",
        );
        let ids: Vec<_> = found.iter().map(|d| d.rule_id.as_str()).collect();
        assert_eq!(
            ids,
            vec!["datatype.custom-enum-on-free-attribute", "datatype.pattern-mismatch"]
        );
        assert_eq!(found[1].path, "profile.elements.TLCPerson.attributes.eId.values[1]");
        assert_eq!(found[1].line, Some(9));
    }
}
