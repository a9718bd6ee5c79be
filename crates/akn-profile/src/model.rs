//! Profile document model

use indexmap::IndexMap;
use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// The key inside `children` that holds exclusive alternatives
pub const CHOICE_KEY: &str = "choice";

/// A `min..max` occurrence constraint, `*` meaning unbounded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cardinality {
    pub min: u32,
    pub max: Option<u32>,
}

impl Cardinality {
    pub fn new(min: u32, max: Option<u32>) -> Self {
        Self { min, max }
    }

    /// Whether this constraint stays within `outer`
    pub fn within(&self, outer: &Cardinality) -> bool {
        let max_ok = match (self.max, outer.max) {
            (_, None) => true,
            (Some(max), Some(outer_max)) => max <= outer_max,
            (None, Some(_)) => false,
        };
        self.min >= outer.min && max_ok
    }
}

impl fmt::Display for Cardinality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.max {
            Some(max) => write!(f, "{}..{}", self.min, max),
            None => write!(f, "{}..*", self.min),
        }
    }
}

impl FromStr for Cardinality {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (min, max) = s
            .trim()
            .split_once("..")
            .ok_or_else(|| format!("'{}' is not of the form min..max", s))?;
        let min: u32 = min
            .trim()
            .parse()
            .map_err(|_| format!("invalid minimum in '{}'", s))?;
        let max = match max.trim() {
            "*" => None,
            value => Some(
                value
                    .parse::<u32>()
                    .map_err(|_| format!("invalid maximum in '{}'", s))?,
            ),
        };
        if max.is_some_and(|max| max < min) {
            return Err(format!("maximum is below minimum in '{}'", s));
        }
        Ok(Cardinality { min, max })
    }
}

/// Restriction on one attribute of an element
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AttributeRestriction {
    pub required: bool,
    /// Allowed values; empty means unrestricted
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub values: Vec<String>,
}

impl AttributeRestriction {
    pub fn required() -> Self {
        Self {
            required: true,
            values: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_values(mut self, values: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.values = values.into_iter().map(Into::into).collect();
        self
    }
}

/// Restriction on one grammar element.
///
/// `children` holds always-present children and `exclusive_children` the
/// members of the `choice` key, of which a document instance carries exactly
/// one. Cardinalities are `min..max` labels, `None` deferring to the grammar.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ElementRestriction {
    pub profile_note: Option<String>,
    pub attributes: IndexMap<String, AttributeRestriction>,
    pub children: IndexMap<String, Option<String>>,
    pub exclusive_children: IndexMap<String, Option<String>>,
    pub structure: Vec<String>,
    /// Whether the document carries a `choice` key, even an empty one
    pub declares_choice: bool,
}

impl ElementRestriction {
    pub fn is_empty(&self) -> bool {
        self.profile_note.is_none()
            && self.attributes.is_empty()
            && self.children.is_empty()
            && self.exclusive_children.is_empty()
            && self.structure.is_empty()
            && !self.declares_choice
    }

    /// Every element name this entry refers to as a child
    pub fn child_names(&self) -> impl Iterator<Item = &str> {
        self.children
            .keys()
            .chain(self.exclusive_children.keys())
            .map(String::as_str)
    }
}

/// `children` as written: always-present children, then the `choice` key
struct ChildrenSection<'a>(&'a ElementRestriction);

impl Serialize for ChildrenSection<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let restriction = self.0;
        let mut map = serializer.serialize_map(None)?;
        for (child, cardinality) in &restriction.children {
            map.serialize_entry(child, cardinality)?;
        }
        if restriction.declares_choice || !restriction.exclusive_children.is_empty() {
            let members = (!restriction.exclusive_children.is_empty()).then_some(&restriction.exclusive_children);
            map.serialize_entry(CHOICE_KEY, &members)?;
        }
        map.end()
    }
}

impl Serialize for ElementRestriction {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        if let Some(note) = &self.profile_note {
            map.serialize_entry("profileNote", note)?;
        }
        if !self.attributes.is_empty() {
            map.serialize_entry("attributes", &self.attributes)?;
        }
        if !self.children.is_empty() || self.declares_choice || !self.exclusive_children.is_empty() {
            map.serialize_entry("children", &ChildrenSection(self))?;
        }
        if !self.structure.is_empty() {
            map.serialize_entry("structure", &self.structure)?;
        }
        map.end()
    }
}

/// Entries with no restriction are written as bare keys
fn serialize_elements<S: Serializer>(
    elements: &IndexMap<String, ElementRestriction>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.collect_map(
        elements
            .iter()
            .map(|(name, restriction)| (name, (!restriction.is_empty()).then_some(restriction))),
    )
}

/// A parsed application profile
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileRestriction {
    pub name: String,
    pub version: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub document_types: Vec<String>,
    #[serde(serialize_with = "serialize_elements")]
    pub elements: IndexMap<String, ElementRestriction>,
}

impl ProfileRestriction {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    #[must_use]
    pub fn with_document_type(mut self, name: impl Into<String>) -> Self {
        self.document_types.push(name.into());
        self
    }

    #[must_use]
    pub fn with_element(mut self, name: impl Into<String>, restriction: ElementRestriction) -> Self {
        self.elements.insert(name.into(), restriction);
        self
    }

    pub fn element(&self, name: &str) -> Option<&ElementRestriction> {
        self.elements.get(name)
    }

    pub fn declares(&self, name: &str) -> bool {
        self.elements.contains_key(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_cardinality() {
        assert_eq!("1..1".parse::<Cardinality>().unwrap(), Cardinality::new(1, Some(1)));
        assert_eq!(" 0..* ".parse::<Cardinality>().unwrap(), Cardinality::new(0, None));
        assert!("1".parse::<Cardinality>().is_err());
        assert!("a..b".parse::<Cardinality>().is_err());
        assert!("3..1".parse::<Cardinality>().is_err());
        assert_eq!(Cardinality::new(2, None).to_string(), "2..*");
    }

    #[test]
    fn test_cardinality_within() {
        let grammar = Cardinality::new(1, None);
        assert!(Cardinality::new(1, Some(3)).within(&grammar));
        assert!(!Cardinality::new(0, Some(3)).within(&grammar));
        let bounded = Cardinality::new(0, Some(1));
        assert!(!Cardinality::new(0, None).within(&bounded));
        assert!(!Cardinality::new(0, Some(2)).within(&bounded));
    }

    #[test]
    fn test_child_names_cover_choice() {
        let mut restriction = ElementRestriction::default();
        restriction.children.insert("num".to_string(), None);
        restriction
            .exclusive_children
            .insert("content".to_string(), Some("1..1".to_string()));
        let names: Vec<_> = restriction.child_names().collect();
        assert_eq!(names, vec!["num", "content"]);
        assert!(!restriction.is_empty());
        assert!(ElementRestriction::default().is_empty());
    }

    #[test]
    fn test_builders() {
        let profile = ProfileRestriction::new("House style", "1.0")
            .with_document_type("act")
            .with_element("act", ElementRestriction::default());
        assert!(profile.declares("act"));
        assert_eq!(profile.document_types, vec!["act"]);
        let attr = AttributeRestriction::required().with_values(["a", "b"]);
        assert_eq!(attr.values.len(), 2);
    }
}
