//! Grammar loader: flattens an XSD into a [`SchemaModel`]

use crate::choice::extract_choice_groups;
use crate::content::{Occurs, Particle};
use crate::model::{AttrInfo, ChildInfo, ChoiceGroup, ElementInfo, Pattern, SchemaModel};
use crate::{Error, Result};
use indexmap::IndexMap;
use roxmltree::{Document, Node};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::Path;
use tracing::{debug, info, trace, warn};

const XS_NS: &str = "http://www.w3.org/2001/XMLSchema";

/// Loads grammars from XSD text or files
#[derive(Debug, Clone, Default)]
pub struct SchemaLoader {
    root: Option<String>,
}

impl SchemaLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use `root` as the top root element instead of inferring it
    #[must_use]
    pub fn with_root(mut self, root: impl Into<String>) -> Self {
        self.root = Some(root.into());
        self
    }

    /// Load a grammar from an XSD file
    pub fn load_from_path(&self, path: impl AsRef<Path>) -> Result<SchemaModel> {
        let path = path.as_ref();
        debug!("Loading grammar from {}", path.display());
        let text = std::fs::read_to_string(path)?;
        self.load_from_str(&text)
    }

    /// Load a grammar from XSD text
    pub fn load_from_str(&self, xsd: &str) -> Result<SchemaModel> {
        let doc = Document::parse(xsd)?;
        let schema = doc.root_element();
        if !is_xs(schema, "schema") {
            return Err(Error::InvalidGrammar(format!(
                "expected xs:schema root, found '{}'",
                schema.tag_name().name()
            )));
        }

        let mut builder = Builder::new(Grammar::index(schema));
        let elements = builder.build_elements();
        let enums = builder.build_enums();

        let root = match &self.root {
            Some(root) if elements.contains_key(root) => Some(root.clone()),
            Some(root) => {
                return Err(Error::InvalidGrammar(format!(
                    "root element '{}' is not declared",
                    root
                )));
            }
            None => builder.infer_root(schema),
        };

        let model = SchemaModel {
            elements,
            enums,
            root,
        };
        info!(
            "Loaded grammar: {} elements, {} enumerations, {} choice groups, root {:?}",
            model.len(),
            model.enums.len(),
            model.choice_group_count(),
            model.root
        );
        Ok(model)
    }
}

fn is_xs(node: Node<'_, '_>, local: &str) -> bool {
    node.is_element() && node.tag_name().namespace() == Some(XS_NS) && node.tag_name().name() == local
}

fn xs_children<'a, 'i>(node: Node<'a, 'i>) -> impl Iterator<Item = Node<'a, 'i>> {
    node.children()
        .filter(|n| n.is_element() && n.tag_name().namespace() == Some(XS_NS))
}

fn xs_child<'a, 'i>(node: Node<'a, 'i>, local: &str) -> Option<Node<'a, 'i>> {
    xs_children(node).find(|n| n.tag_name().name() == local)
}

/// A type or element reference with its prefix resolved
enum QName<'a> {
    Builtin(&'a str),
    Named(&'a str),
}

impl<'a> QName<'a> {
    fn local(&self) -> &'a str {
        match self {
            QName::Builtin(name) | QName::Named(name) => *name,
        }
    }
}

fn resolve_qname<'a>(node: Node<'a, '_>, value: &'a str) -> QName<'a> {
    let (prefix, local) = match value.split_once(':') {
        Some((prefix, local)) => (Some(prefix), local),
        None => (None, value),
    };
    if node.lookup_namespace_uri(prefix) == Some(XS_NS) {
        QName::Builtin(local)
    } else {
        QName::Named(local)
    }
}

fn local_name(value: &str) -> &str {
    value.rsplit_once(':').map_or(value, |(_, local)| local)
}

fn parse_occurs(node: Node<'_, '_>) -> Occurs {
    let min = node
        .attribute("minOccurs")
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(1);
    let max = match node.attribute("maxOccurs").map(str::trim) {
        Some("unbounded") => None,
        Some(v) => Some(v.parse().unwrap_or(1)),
        None => Some(1),
    };
    Occurs::new(min, max)
}

/// First `xs:documentation` text under the node's annotation, whitespace-normalized
fn documentation(node: Node<'_, '_>) -> String {
    let Some(doc) = xs_child(node, "annotation").and_then(|a| xs_child(a, "documentation")) else {
        return String::new();
    };
    let text: Vec<&str> = doc
        .descendants()
        .filter(|n| n.is_text())
        .filter_map(|n| n.text())
        .collect();
    text.join(" ").split_whitespace().collect::<Vec<_>>().join(" ")
}

fn display_name(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Top-level declarations by name
struct Grammar<'a, 'i> {
    complex_types: HashMap<&'a str, Node<'a, 'i>>,
    simple_types: IndexMap<&'a str, Node<'a, 'i>>,
    groups: HashMap<&'a str, Node<'a, 'i>>,
    attribute_groups: HashMap<&'a str, Node<'a, 'i>>,
    elements: IndexMap<&'a str, Node<'a, 'i>>,
    attributes: HashMap<&'a str, Node<'a, 'i>>,
}

impl<'a, 'i> Grammar<'a, 'i> {
    fn index(schema: Node<'a, 'i>) -> Self {
        let mut grammar = Grammar {
            complex_types: HashMap::new(),
            simple_types: IndexMap::new(),
            groups: HashMap::new(),
            attribute_groups: HashMap::new(),
            elements: IndexMap::new(),
            attributes: HashMap::new(),
        };
        for node in xs_children(schema) {
            let Some(name) = node.attribute("name") else {
                continue;
            };
            match node.tag_name().name() {
                "complexType" => {
                    grammar.complex_types.insert(name, node);
                }
                "simpleType" => {
                    grammar.simple_types.insert(name, node);
                }
                "group" => {
                    grammar.groups.insert(name, node);
                }
                "attributeGroup" => {
                    grammar.attribute_groups.insert(name, node);
                }
                "element" => {
                    grammar.elements.insert(name, node);
                }
                "attribute" => {
                    grammar.attributes.insert(name, node);
                }
                _ => {}
            }
        }
        trace!(
            "Indexed {} complex types, {} simple types, {} groups, {} global elements",
            grammar.complex_types.len(),
            grammar.simple_types.len(),
            grammar.groups.len(),
            grammar.elements.len()
        );
        grammar
    }
}

/// A complex type with its inheritance chain flattened
#[derive(Debug, Clone)]
struct ResolvedType {
    content: Particle,
    attributes: IndexMap<String, AttrInfo>,
    choice_groups: Vec<ChoiceGroup>,
    base_types: Vec<String>,
    doc: String,
}

impl ResolvedType {
    fn empty() -> Self {
        Self {
            content: Particle::empty(),
            attributes: IndexMap::new(),
            choice_groups: Vec::new(),
            base_types: Vec::new(),
            doc: String::new(),
        }
    }
}

#[derive(Debug, Clone, Default)]
struct Facets {
    enums: Option<Vec<String>>,
    pattern: Option<Pattern>,
}

enum AttrDecl {
    Declared(AttrInfo),
    Prohibited(String),
}

struct Builder<'a, 'i> {
    grammar: Grammar<'a, 'i>,
    types: HashMap<String, ResolvedType>,
    facets: HashMap<String, Facets>,
    local_elements: IndexMap<String, Node<'a, 'i>>,
    resolving: HashSet<String>,
    resolving_simple: HashSet<String>,
    expanding_groups: HashSet<String>,
}

impl<'a, 'i> Builder<'a, 'i> {
    fn new(grammar: Grammar<'a, 'i>) -> Self {
        Self {
            grammar,
            types: HashMap::new(),
            facets: HashMap::new(),
            local_elements: IndexMap::new(),
            resolving: HashSet::new(),
            resolving_simple: HashSet::new(),
            expanding_groups: HashSet::new(),
        }
    }

    fn build_elements(&mut self) -> BTreeMap<String, ElementInfo> {
        let mut elements = BTreeMap::new();
        let globals: Vec<(&'a str, Node<'a, 'i>)> =
            self.grammar.elements.iter().map(|(n, node)| (*n, *node)).collect();
        for (name, node) in globals {
            let info = self.build_element(name, node);
            elements.insert(name.to_string(), info);
        }

        // Local declarations are discovered while resolving content models.
        loop {
            let pending: Vec<(String, Node<'a, 'i>)> = self
                .local_elements
                .iter()
                .filter(|(name, _)| !elements.contains_key(name.as_str()))
                .map(|(name, node)| (name.clone(), *node))
                .collect();
            if pending.is_empty() {
                break;
            }
            for (name, node) in pending {
                let info = self.build_element(&name, node);
                elements.insert(name, info);
            }
        }
        elements
    }

    fn build_element(&mut self, name: &str, node: Node<'a, 'i>) -> ElementInfo {
        let mut type_name = None;
        let resolved = match node.attribute("type").map(|t| resolve_qname(node, t)) {
            Some(QName::Named(t)) if self.grammar.complex_types.contains_key(t) => {
                type_name = Some(t.to_string());
                self.resolve_type(t)
            }
            Some(qname) => {
                type_name = Some(qname.local().to_string());
                ResolvedType::empty()
            }
            None => match xs_child(node, "complexType") {
                Some(inline) => self.resolve_complex(inline, name),
                None => ResolvedType::empty(),
            },
        };

        let mut doc = documentation(node);
        if doc.is_empty() {
            doc = resolved.doc.clone();
        }

        let children = resolved
            .content
            .occurrences()
            .into_iter()
            .map(|(child, occurs)| ChildInfo {
                choice_group_ids: resolved
                    .choice_groups
                    .iter()
                    .filter(|g| g.contains(&child))
                    .map(|g| g.group_id.clone())
                    .collect(),
                name: child,
                min_occurs: occurs.min,
                max_occurs: occurs.max,
            })
            .collect();

        trace!("Built element {} (type {:?})", name, type_name);
        ElementInfo {
            xml_name: name.to_string(),
            display_name: display_name(name),
            type_name,
            base_types: resolved.base_types,
            children,
            attributes: resolved.attributes.into_values().collect(),
            choice_groups: resolved.choice_groups,
            doc,
        }
    }

    fn resolve_type(&mut self, name: &str) -> ResolvedType {
        if let Some(cached) = self.types.get(name) {
            return cached.clone();
        }
        let Some(node) = self.grammar.complex_types.get(name).copied() else {
            return ResolvedType::empty();
        };
        if !self.resolving.insert(name.to_string()) {
            warn!("Circular type derivation through '{}'", name);
            return ResolvedType::empty();
        }
        let resolved = self.resolve_complex(node, name);
        self.resolving.remove(name);
        self.types.insert(name.to_string(), resolved.clone());
        resolved
    }

    /// Resolve a named or anonymous complex type; `label` prefixes its choice group ids
    fn resolve_complex(&mut self, node: Node<'a, 'i>, label: &str) -> ResolvedType {
        let doc = documentation(node);
        let derivation = xs_child(node, "complexContent")
            .map(|c| (c, false))
            .or_else(|| xs_child(node, "simpleContent").map(|c| (c, true)));

        let Some((content_node, simple)) = derivation else {
            let content = self.content_particle(node);
            let mut counter = 0;
            let choice_groups = extract_choice_groups(label, &content, &mut counter);
            let mut attributes = IndexMap::new();
            self.apply_attributes(node, &mut attributes);
            return ResolvedType {
                content,
                attributes,
                choice_groups,
                base_types: Vec::new(),
                doc,
            };
        };

        let Some(derive) = xs_children(content_node)
            .find(|n| matches!(n.tag_name().name(), "extension" | "restriction"))
        else {
            return ResolvedType {
                doc,
                ..ResolvedType::empty()
            };
        };
        let extension = derive.tag_name().name() == "extension";

        let mut base_types = Vec::new();
        let base = match derive.attribute("base").map(|b| resolve_qname(derive, b)) {
            Some(QName::Named(b)) if self.grammar.complex_types.contains_key(b) => {
                let base = self.resolve_type(b);
                base_types.push(b.to_string());
                base_types.extend(base.base_types.iter().cloned());
                base
            }
            _ => ResolvedType::empty(),
        };

        let mut attributes = base.attributes.clone();
        self.apply_attributes(derive, &mut attributes);

        if simple {
            return ResolvedType {
                content: Particle::empty(),
                attributes,
                choice_groups: Vec::new(),
                base_types,
                doc,
            };
        }

        let own = self.content_particle(derive);
        let mut counter = 0;
        let mut choice_groups = extract_choice_groups(label, &own, &mut counter);
        let content = if extension {
            choice_groups.extend(base.choice_groups.iter().cloned());
            Particle::Sequence {
                occurs: Occurs::ONCE,
                items: vec![base.content, own],
            }
        } else {
            own
        };

        ResolvedType {
            content,
            attributes,
            choice_groups,
            base_types,
            doc: if doc.is_empty() { base.doc } else { doc },
        }
    }

    /// The compositor directly under a type or derivation node
    fn content_particle(&mut self, node: Node<'a, 'i>) -> Particle {
        xs_children(node)
            .find(|n| matches!(n.tag_name().name(), "sequence" | "choice" | "all" | "group"))
            .and_then(|n| self.particle(n))
            .unwrap_or_else(Particle::empty)
    }

    fn particle(&mut self, node: Node<'a, 'i>) -> Option<Particle> {
        let occurs = parse_occurs(node);
        match node.tag_name().name() {
            "element" => {
                let name = if let Some(reference) = node.attribute("ref") {
                    local_name(reference).to_string()
                } else {
                    let name = node.attribute("name")?;
                    if !self.grammar.elements.contains_key(name)
                        && !self.local_elements.contains_key(name)
                    {
                        self.local_elements.insert(name.to_string(), node);
                    }
                    name.to_string()
                };
                Some(Particle::Element { name, occurs })
            }
            "sequence" | "all" => Some(Particle::Sequence {
                occurs,
                items: self.particles(node),
            }),
            "choice" => Some(Particle::Choice {
                occurs,
                items: self.particles(node),
            }),
            "group" => {
                let name = local_name(node.attribute("ref")?).to_string();
                let inner = self.group_particle(&name);
                Some(Particle::Group {
                    name,
                    occurs,
                    inner: Box::new(inner),
                })
            }
            "any" => Some(Particle::Any),
            _ => None,
        }
    }

    fn particles(&mut self, node: Node<'a, 'i>) -> Vec<Particle> {
        xs_children(node).filter_map(|n| self.particle(n)).collect()
    }

    fn group_particle(&mut self, name: &str) -> Particle {
        let Some(node) = self.grammar.groups.get(name).copied() else {
            debug!("Unknown group '{}'", name);
            return Particle::empty();
        };
        if !self.expanding_groups.insert(name.to_string()) {
            warn!("Circular group reference through '{}'", name);
            return Particle::empty();
        }
        let particle = self.content_particle(node);
        self.expanding_groups.remove(name);
        particle
    }

    /// Merge the attribute declarations of `node` into `attributes`
    fn apply_attributes(&mut self, node: Node<'a, 'i>, attributes: &mut IndexMap<String, AttrInfo>) {
        let mut decls = Vec::new();
        let mut visited = HashSet::new();
        self.collect_attributes(node, &mut decls, &mut visited);
        for decl in decls {
            match decl {
                AttrDecl::Declared(attr) => {
                    attributes.insert(attr.name.clone(), attr);
                }
                AttrDecl::Prohibited(name) => {
                    attributes.shift_remove(&name);
                }
            }
        }
    }

    fn collect_attributes(
        &mut self,
        node: Node<'a, 'i>,
        out: &mut Vec<AttrDecl>,
        visited: &mut HashSet<&'a str>,
    ) {
        for child in xs_children(node) {
            match child.tag_name().name() {
                "attribute" => {
                    if let Some(decl) = self.attribute_decl(child) {
                        out.push(decl);
                    }
                }
                "attributeGroup" => {
                    let Some(reference) = child.attribute("ref").map(local_name) else {
                        continue;
                    };
                    let Some(group) = self.grammar.attribute_groups.get(reference).copied() else {
                        debug!("Unknown attribute group '{}'", reference);
                        continue;
                    };
                    if visited.insert(reference) {
                        self.collect_attributes(group, out, visited);
                    }
                }
                _ => {}
            }
        }
    }

    fn attribute_decl(&mut self, node: Node<'a, 'i>) -> Option<AttrDecl> {
        let reference = node.attribute("ref");
        let name = match reference {
            Some(r) => local_name(r),
            None => node.attribute("name")?,
        };
        let usage = node.attribute("use").unwrap_or("optional");
        if usage == "prohibited" {
            return Some(AttrDecl::Prohibited(name.to_string()));
        }

        // A reference takes its type from the global declaration.
        let decl = reference
            .and_then(|_| self.grammar.attributes.get(name).copied())
            .unwrap_or(node);

        let (type_name, facets) = match decl.attribute("type").map(|t| resolve_qname(decl, t)) {
            Some(QName::Named(t)) => (Some(t.to_string()), self.simple_facets(t)),
            Some(QName::Builtin(t)) => (Some(t.to_string()), Facets::default()),
            None => match xs_child(decl, "simpleType") {
                Some(inline) => (None, self.simple_node_facets(inline, name)),
                None => (None, Facets::default()),
            },
        };

        Some(AttrDecl::Declared(AttrInfo {
            name: name.to_string(),
            required: usage == "required",
            type_name,
            enum_values: facets.enums,
            pattern: facets.pattern,
            default: node
                .attribute("default")
                .or_else(|| decl.attribute("default"))
                .map(str::to_string),
        }))
    }

    fn simple_facets(&mut self, name: &str) -> Facets {
        if let Some(cached) = self.facets.get(name) {
            return cached.clone();
        }
        let Some(node) = self.grammar.simple_types.get(name).copied() else {
            return Facets::default();
        };
        if !self.resolving_simple.insert(name.to_string()) {
            warn!("Circular simple type restriction through '{}'", name);
            return Facets::default();
        }
        let facets = self.simple_node_facets(node, name);
        self.resolving_simple.remove(name);
        self.facets.insert(name.to_string(), facets.clone());
        facets
    }

    /// Enumeration and pattern facets of a simple type, following its restriction base
    fn simple_node_facets(&mut self, node: Node<'a, 'i>, label: &str) -> Facets {
        let Some(restriction) = xs_child(node, "restriction") else {
            return Facets::default();
        };

        let inherited = match restriction.attribute("base").map(|b| resolve_qname(restriction, b)) {
            Some(QName::Named(base)) => self.simple_facets(base),
            Some(QName::Builtin(_)) => Facets::default(),
            None => match xs_child(restriction, "simpleType") {
                Some(inline) => self.simple_node_facets(inline, label),
                None => Facets::default(),
            },
        };

        let values: Vec<String> = xs_children(restriction)
            .filter(|n| n.tag_name().name() == "enumeration")
            .filter_map(|n| n.attribute("value"))
            .map(str::to_string)
            .collect();
        let patterns: Vec<&str> = xs_children(restriction)
            .filter(|n| n.tag_name().name() == "pattern")
            .filter_map(|n| n.attribute("value"))
            .collect();

        let pattern = if patterns.is_empty() {
            inherited.pattern
        } else {
            let source = patterns.join("|");
            match Pattern::compile(&source) {
                Ok(pattern) => Some(pattern),
                Err(e) => {
                    warn!("Ignoring pattern '{}' of type '{}': {}", source, label, e);
                    None
                }
            }
        };

        Facets {
            enums: if values.is_empty() {
                inherited.enums
            } else {
                Some(values)
            },
            pattern,
        }
    }

    fn build_enums(&mut self) -> BTreeMap<String, Vec<String>> {
        let names: Vec<&'a str> = self.grammar.simple_types.keys().copied().collect();
        names
            .into_iter()
            .filter_map(|name| {
                self.simple_facets(name)
                    .enums
                    .map(|values| (name.to_string(), values))
            })
            .collect()
    }

    /// The first global element that no content model refers to
    fn infer_root(&self, schema: Node<'a, 'i>) -> Option<String> {
        let referenced: HashSet<&str> = schema
            .descendants()
            .filter(|n| is_xs(*n, "element"))
            .filter_map(|n| n.attribute("ref"))
            .map(local_name)
            .collect();
        self.grammar
            .elements
            .keys()
            .find(|name| !referenced.contains(*name) && !self.local_elements.contains_key(**name))
            .map(|name| name.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIXTURE: &str = r#"<?xml version="1.0"?>
<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema" xmlns="urn:test" targetNamespace="urn:test">
  <xs:simpleType name="colour">
    <xs:restriction base="xs:string">
      <xs:enumeration value="red"/>
      <xs:enumeration value="green"/>
    </xs:restriction>
  </xs:simpleType>
  <xs:simpleType name="shade">
    <xs:restriction base="colour"/>
  </xs:simpleType>
  <xs:simpleType name="broken">
    <xs:restriction base="xs:string">
      <xs:pattern value="[a-z"/>
    </xs:restriction>
  </xs:simpleType>
  <xs:simpleType name="code">
    <xs:restriction base="xs:string">
      <xs:pattern value="[A-Z]{3}"/>
    </xs:restriction>
  </xs:simpleType>
  <xs:attributeGroup name="ids">
    <xs:attribute name="id" type="code" use="required"/>
    <xs:attribute name="note" type="xs:string"/>
  </xs:attributeGroup>
  <xs:complexType name="baseType">
    <xs:sequence>
      <xs:element ref="head"/>
    </xs:sequence>
    <xs:attributeGroup ref="ids"/>
    <xs:attribute name="tone" type="shade"/>
  </xs:complexType>
  <xs:complexType name="derivedType">
    <xs:complexContent>
      <xs:extension base="baseType">
        <xs:choice>
          <xs:element ref="left"/>
          <xs:element ref="right"/>
        </xs:choice>
        <xs:attribute name="odd" type="broken"/>
      </xs:extension>
    </xs:complexContent>
  </xs:complexType>
  <xs:complexType name="narrowType">
    <xs:complexContent>
      <xs:restriction base="baseType">
        <xs:sequence>
          <xs:element ref="head" minOccurs="0"/>
        </xs:sequence>
        <xs:attribute name="note" use="prohibited"/>
      </xs:restriction>
    </xs:complexContent>
  </xs:complexType>
  <xs:element name="top">
    <xs:annotation><xs:documentation>  The   top
      element. </xs:documentation></xs:annotation>
    <xs:complexType>
      <xs:sequence>
        <xs:element ref="derived" maxOccurs="unbounded"/>
        <xs:element name="local" type="xs:string" minOccurs="0"/>
      </xs:sequence>
    </xs:complexType>
  </xs:element>
  <xs:element name="derived" type="derivedType"/>
  <xs:element name="narrow" type="narrowType"/>
  <xs:element name="head" type="xs:string"/>
  <xs:element name="left" type="xs:string"/>
  <xs:element name="right" type="xs:string"/>
</xs:schema>"#;

    fn create_test_schema() -> SchemaModel {
        SchemaLoader::new().load_from_str(FIXTURE).unwrap()
    }

    #[test]
    fn test_extension_flattens_base() {
        let schema = create_test_schema();
        assert_eq!(schema.get_children("derived"), vec!["head", "left", "right"]);
        let info = schema.get_element_info("derived").unwrap();
        assert_eq!(info.type_name.as_deref(), Some("derivedType"));
        assert_eq!(info.base_types, vec!["baseType"]);
        let names: Vec<_> = info.attributes.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["id", "note", "tone", "odd"]);
    }

    #[test]
    fn test_restriction_replaces_content_and_prohibits() {
        let schema = create_test_schema();
        let info = schema.get_element_info("narrow").unwrap();
        assert_eq!(info.children[0].min_occurs, 0);
        assert!(!info.has_attribute("note"));
        assert!(info.has_attribute("id"));
    }

    #[test]
    fn test_facets_through_restriction_chain() {
        let schema = create_test_schema();
        let tone = schema.get_element_info("derived").unwrap().attribute("tone").unwrap();
        assert_eq!(tone.enum_values.as_deref(), Some(&["red".to_string(), "green".to_string()][..]));
        assert_eq!(schema.get_enum_values("shade").unwrap().len(), 2);
        let id = schema.get_element_info("derived").unwrap().attribute("id").unwrap();
        assert!(id.required);
        assert!(id.pattern.as_ref().unwrap().is_match("ABC"));
    }

    #[test]
    fn test_malformed_pattern_is_unconstrained() {
        let schema = create_test_schema();
        let odd = schema.get_element_info("derived").unwrap().attribute("odd").unwrap();
        assert!(odd.pattern.is_none());
        assert!(odd.enum_values.is_none());
    }

    #[test]
    fn test_choice_groups_and_membership() {
        let schema = create_test_schema();
        let groups = schema.get_choice_groups("derived");
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].group_id, "derivedType:choice_0");
        assert!(groups[0].exclusive);
        let left = schema.get_element_info("derived").unwrap().child("left").unwrap();
        assert_eq!(left.choice_group_ids, vec!["derivedType:choice_0"]);
        assert_eq!(left.min_occurs, 0);
        assert_eq!(schema.get_choice_cardinality("derived").as_deref(), Some("1..1"));
    }

    #[test]
    fn test_root_inference_and_local_elements() {
        let schema = create_test_schema();
        assert_eq!(schema.root_element(), Some("top"));
        assert_eq!(schema.document_types(), vec!["derived", "local"]);
        assert!(schema.has_element("local"));
        let top = schema.get_element_info("top").unwrap();
        assert_eq!(top.doc, "The top element.");
        assert_eq!(top.child("derived").unwrap().cardinality(), "1..*");
    }

    #[test]
    fn test_root_override() {
        let schema = SchemaLoader::new().with_root("narrow").load_from_str(FIXTURE).unwrap();
        assert_eq!(schema.root_element(), Some("narrow"));

        let result = SchemaLoader::new().with_root("missing").load_from_str(FIXTURE);
        match result.unwrap_err() {
            Error::InvalidGrammar(_) => (),
            e => panic!("Expected InvalidGrammar error, got {:?}", e),
        }
    }

    #[test]
    fn test_rejects_non_schema_documents() {
        match SchemaLoader::new().load_from_str("<root/>").unwrap_err() {
            Error::InvalidGrammar(_) => (),
            e => panic!("Expected InvalidGrammar error, got {:?}", e),
        }
        match SchemaLoader::new().load_from_str("<unclosed>").unwrap_err() {
            Error::Xml(_) => (),
            e => panic!("Expected Xml error, got {:?}", e),
        }
    }
}
