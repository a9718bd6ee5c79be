use akn_cascade::{
    Error, ExpandOptions, collapse_element, compute_element_order, expand_element, reorder_profile,
};
use serde_yaml::{Mapping, Value};

fn elements_of(text: &str) -> Mapping {
    let root: Value = serde_yaml::from_str(text).unwrap();
    root["profile"]["elements"].as_mapping().cloned().unwrap()
}

fn names(elements: &Mapping) -> Vec<String> {
    elements.keys().filter_map(|k| k.as_str().map(str::to_string)).collect()
}

fn create_test_profile() -> String {
    let schema = akn_schema::bundled().unwrap();
    let text = "profile:\n  name: Cascade\n  version: '1.0'\n  documentTypes:\n    - act\n";
    let text = expand_element(text, "act", &schema, &ExpandOptions::default()).unwrap();
    expand_element(&text, "section", &schema, &ExpandOptions::default()).unwrap()
}

#[test]
fn test_order_puts_parents_first() {
    let schema = akn_schema::bundled().unwrap();
    let elements = elements_of(&create_test_profile());
    let order = compute_element_order(&elements, &schema);
    assert_eq!(order.first().map(String::as_str), Some("akomaNtoso"));

    let index = |name: &str| order.iter().position(|n| n == name).unwrap();
    for (parent, entry) in &elements {
        let Some(children) = entry.get("children").and_then(Value::as_mapping) else {
            continue;
        };
        for child in children.keys().filter_map(Value::as_str) {
            if elements.contains_key(child) {
                assert!(index(parent.as_str().unwrap()) < index(child), "{:?} before {}", parent, child);
            }
        }
    }
}

#[test]
fn test_expanded_profile_is_in_canonical_order() {
    let schema = akn_schema::bundled().unwrap();
    let text = create_test_profile();
    let elements = elements_of(&text);
    assert_eq!(names(&elements), compute_element_order(&elements, &schema));
    assert_eq!(reorder_profile(&text, &schema).unwrap(), text);
}

#[test]
fn test_reorder_profile_only_moves_entries() {
    let schema = akn_schema::bundled().unwrap();
    let text = "profile:
  name: Shuffled
  elements:
    section:
      children:
        choice:
          content:
          intro:
        heading:
        num:
    act:
      attributes:
        lang:
          required: false
        contains:
          required: true
      children:
        body: 1..1
        meta: 1..1
    body:
      children:
        section:
    akomaNtoso:
      children:
        act: 1..1
";
    let once = reorder_profile(text, &schema).unwrap();
    let elements = elements_of(&once);
    assert_eq!(names(&elements), vec!["akomaNtoso", "act", "body", "section"]);

    let act = elements.get("act").unwrap();
    let attributes: Vec<_> = act["attributes"].as_mapping().unwrap().keys().filter_map(Value::as_str).collect();
    assert_eq!(attributes, vec!["contains", "lang"]);
    let children: Vec<_> = act["children"].as_mapping().unwrap().keys().filter_map(Value::as_str).collect();
    assert_eq!(children, vec!["meta", "body"]);

    let section = elements.get("section").unwrap();
    let children: Vec<_> = section["children"].as_mapping().unwrap().keys().filter_map(Value::as_str).collect();
    assert_eq!(children, vec!["num", "heading", "choice"]);

    let original: Value = serde_yaml::from_str(text).unwrap();
    let reordered: Value = serde_yaml::from_str(&once).unwrap();
    assert_eq!(original, reordered);

    assert_eq!(reorder_profile(&once, &schema).unwrap(), once);
}

#[test]
fn test_collapse_reverses_expand() {
    let schema = akn_schema::bundled().unwrap();
    let base = "profile:\n  name: Base\n  documentTypes: [act]\n";
    let expanded = expand_element(base, "act", &schema, &ExpandOptions::default()).unwrap();
    let collapsed = collapse_element(&expanded, "act", &schema).unwrap();

    let elements = elements_of(&collapsed);
    assert_eq!(names(&elements), vec!["akomaNtoso"]);
    assert_eq!(collapse_element(&collapsed, "act", &schema).unwrap(), collapsed);
}

#[test]
fn test_collapse_keeps_elements_reachable_elsewhere() {
    let schema = akn_schema::bundled().unwrap();
    let text = create_test_profile();
    let collapsed = collapse_element(&text, "section", &schema).unwrap();
    let kept = names(&elements_of(&collapsed));
    assert!(!kept.contains(&"section".to_string()));
    assert!(kept.contains(&"body".to_string()));
    assert!(kept.contains(&"FRBRthis".to_string()));
}

#[test]
fn test_unknown_names_are_typed_failures() {
    let schema = akn_schema::bundled().unwrap();
    let text = create_test_profile();
    assert!(matches!(
        expand_element(&text, "fakeElement", &schema, &ExpandOptions::default()),
        Err(Error::UnknownElement { .. })
    ));
    assert!(matches!(
        collapse_element(&text, "fakeElement", &schema),
        Err(Error::UnknownElement { .. })
    ));
}

#[test]
fn test_invalid_yaml_is_reported() {
    let schema = akn_schema::bundled().unwrap();
    assert!(matches!(
        reorder_profile("profile: [", &schema),
        Err(Error::Yaml(_))
    ));
}
