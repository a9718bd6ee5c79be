//! Schema model definitions

use regex::Regex;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Format a `min..max` label, `*` standing for unbounded.
pub fn cardinality_label(min: u32, max: Option<u32>) -> String {
    match max {
        Some(max) => format!("{}..{}", min, max),
        None => format!("{}..*", min),
    }
}

/// A pattern facet compiled for full-string matching
#[derive(Clone)]
pub struct Pattern {
    source: String,
    regex: Regex,
}

impl Pattern {
    /// Compile an XSD pattern. XSD patterns are implicitly anchored.
    pub fn compile(source: &str) -> std::result::Result<Self, regex::Error> {
        let regex = Regex::new(&format!("^(?:{})$", source))?;
        Ok(Self {
            source: source.to_string(),
            regex,
        })
    }

    /// The pattern as written in the grammar
    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub fn is_match(&self, value: &str) -> bool {
        self.regex.is_match(value)
    }
}

impl fmt::Debug for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Pattern").field(&self.source).finish()
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

/// An attribute declared (directly or through inheritance) on an element
#[derive(Debug, Clone, PartialEq)]
pub struct AttrInfo {
    pub name: String,
    pub required: bool,
    /// Grammar type of the attribute, without namespace prefix
    pub type_name: Option<String>,
    /// Enumeration facet, resolved through restriction chains
    pub enum_values: Option<Vec<String>>,
    /// Pattern facet; `None` when absent or not compilable
    pub pattern: Option<Pattern>,
    pub default: Option<String>,
}

impl AttrInfo {
    /// `1..1` for required attributes, `0..1` otherwise
    pub fn cardinality(&self) -> &'static str {
        if self.required { "1..1" } else { "0..1" }
    }

    pub fn is_enum(&self) -> bool {
        self.enum_values.as_ref().is_some_and(|v| !v.is_empty())
    }

    /// Pattern source, if the attribute carries one
    pub fn pattern_str(&self) -> Option<&str> {
        self.pattern.as_ref().map(Pattern::as_str)
    }
}

/// A child element allowed by an element's content model
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChildInfo {
    pub name: String,
    pub min_occurs: u32,
    /// `None` means unbounded
    pub max_occurs: Option<u32>,
    /// Ids of the choice groups this child is a member of
    pub choice_group_ids: Vec<String>,
}

impl ChildInfo {
    pub fn required(&self) -> bool {
        self.min_occurs >= 1
    }

    pub fn cardinality(&self) -> String {
        cardinality_label(self.min_occurs, self.max_occurs)
    }
}

/// One alternative of a choice compositor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Branch {
    pub branch_id: String,
    /// Element name, group name, or the parts of a nested compositor joined with ` + `
    pub label: Option<String>,
    pub elements: BTreeSet<String>,
}

/// A choice compositor found in an element's content model.
///
/// An exclusive group allows a single selection per occurrence, so members
/// of different branches cannot be mixed as always-present children. A
/// free-mix group repeats, and any combination of its members may co-occur.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChoiceGroup {
    /// `<typeName>:choice_<n>`, unique within the declaring type
    pub group_id: String,
    /// Effective minimum, multiplied through the enclosing compositors
    pub min_occurs: u32,
    pub max_occurs: Option<u32>,
    pub exclusive: bool,
    pub branches: Vec<Branch>,
    pub all_elements: BTreeSet<String>,
}

impl ChoiceGroup {
    pub fn new(
        group_id: impl Into<String>,
        min_occurs: u32,
        max_occurs: Option<u32>,
        branches: Vec<Branch>,
    ) -> Self {
        let all_elements = branches
            .iter()
            .flat_map(|b| b.elements.iter().cloned())
            .collect();
        Self {
            group_id: group_id.into(),
            min_occurs,
            max_occurs,
            exclusive: max_occurs == Some(1),
            branches,
            all_elements,
        }
    }

    pub fn required(&self) -> bool {
        self.min_occurs >= 1
    }

    pub fn contains(&self, name: &str) -> bool {
        self.all_elements.contains(name)
    }

    /// The branch holding `name`, if any
    pub fn branch_of(&self, name: &str) -> Option<&Branch> {
        self.branches.iter().find(|b| b.elements.contains(name))
    }

    pub fn cardinality(&self) -> String {
        cardinality_label(self.min_occurs, self.max_occurs)
    }
}

/// Everything the grammar says about one element
#[derive(Debug, Clone, PartialEq)]
pub struct ElementInfo {
    pub xml_name: String,
    pub display_name: String,
    pub type_name: Option<String>,
    /// Named types this element's type derives from, nearest first
    pub base_types: Vec<String>,
    pub children: Vec<ChildInfo>,
    pub attributes: Vec<AttrInfo>,
    pub choice_groups: Vec<ChoiceGroup>,
    pub doc: String,
}

impl ElementInfo {
    pub fn child(&self, name: &str) -> Option<&ChildInfo> {
        self.children.iter().find(|c| c.name == name)
    }

    pub fn attribute(&self, name: &str) -> Option<&AttrInfo> {
        self.attributes.iter().find(|a| a.name == name)
    }

    pub fn has_child(&self, name: &str) -> bool {
        self.child(name).is_some()
    }

    pub fn has_attribute(&self, name: &str) -> bool {
        self.attribute(name).is_some()
    }
}

/// The immutable element index built from a grammar.
///
/// Queries on unknown names return empty values rather than failing; existence
/// checking is left to the callers.
#[derive(Debug, Clone, Default)]
pub struct SchemaModel {
    pub(crate) elements: BTreeMap<String, ElementInfo>,
    pub(crate) enums: BTreeMap<String, Vec<String>>,
    pub(crate) root: Option<String>,
}

impl SchemaModel {
    pub fn has_element(&self, name: &str) -> bool {
        self.elements.contains_key(name)
    }

    pub fn get_element_info(&self, name: &str) -> Option<&ElementInfo> {
        self.elements.get(name)
    }

    /// Names of the valid children of `name`, in content-model order
    pub fn get_children(&self, name: &str) -> Vec<&str> {
        self.elements
            .get(name)
            .map(|info| info.children.iter().map(|c| c.name.as_str()).collect())
            .unwrap_or_default()
    }

    pub fn get_required_children(&self, name: &str) -> Vec<&ChildInfo> {
        self.elements
            .get(name)
            .map(|info| info.children.iter().filter(|c| c.required()).collect())
            .unwrap_or_default()
    }

    pub fn get_attributes(&self, name: &str) -> &[AttrInfo] {
        self.elements
            .get(name)
            .map(|info| info.attributes.as_slice())
            .unwrap_or_default()
    }

    pub fn get_required_attributes(&self, name: &str) -> Vec<&AttrInfo> {
        self.get_attributes(name)
            .iter()
            .filter(|a| a.required)
            .collect()
    }

    pub fn get_choice_groups(&self, name: &str) -> &[ChoiceGroup] {
        self.elements
            .get(name)
            .map(|info| info.choice_groups.as_slice())
            .unwrap_or_default()
    }

    /// Cardinality of the primary choice group of `name`: the first one that
    /// is mandatory or exclusive, otherwise the first one.
    pub fn get_choice_cardinality(&self, name: &str) -> Option<String> {
        let groups = self.get_choice_groups(name);
        let primary = groups
            .iter()
            .find(|g| g.required() || g.exclusive)
            .or_else(|| groups.first())?;
        Some(primary.cardinality())
    }

    /// Enumeration values of a named simple type
    pub fn get_enum_values(&self, type_name: &str) -> Option<&[String]> {
        self.enums.get(type_name).map(Vec::as_slice)
    }

    /// All element names in ascending order
    pub fn element_names(&self) -> impl Iterator<Item = &str> {
        self.elements.keys().map(String::as_str)
    }

    pub fn all_enums(&self) -> &BTreeMap<String, Vec<String>> {
        &self.enums
    }

    /// The grammar's top root element
    pub fn root_element(&self) -> Option<&str> {
        self.root.as_deref()
    }

    /// The valid children of the root element
    pub fn document_types(&self) -> Vec<&str> {
        match self.root_element() {
            Some(root) => self.get_children(root),
            None => Vec::new(),
        }
    }

    pub fn is_document_type(&self, name: &str) -> bool {
        self.document_types().contains(&name)
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Number of choice groups across all elements
    pub fn choice_group_count(&self) -> usize {
        self.elements.values().map(|e| e.choice_groups.len()).sum()
    }
}
