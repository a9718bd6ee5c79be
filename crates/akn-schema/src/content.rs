//! Content-model particles and occurrence accumulation

use indexmap::IndexMap;

/// `minOccurs`/`maxOccurs` of a particle, `None` meaning unbounded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Occurs {
    pub min: u32,
    pub max: Option<u32>,
}

impl Occurs {
    pub const ONCE: Occurs = Occurs {
        min: 1,
        max: Some(1),
    };

    pub fn new(min: u32, max: Option<u32>) -> Self {
        Self { min, max }
    }

    /// Occurrences of two particles that both appear
    fn add(self, other: Occurs) -> Occurs {
        let max = match (self.max, other.max) {
            (Some(a), Some(b)) => Some(a.saturating_add(b)),
            _ => None,
        };
        Occurs::new(self.min.saturating_add(other.min), max)
    }

    /// Occurrences of a particle nested inside a repeated compositor
    pub fn times(self, outer: Occurs) -> Occurs {
        let max = match (self.max, outer.max) {
            (Some(0), _) | (_, Some(0)) => Some(0),
            (Some(a), Some(b)) => Some(a.saturating_mul(b)),
            _ => None,
        };
        Occurs::new(self.min.saturating_mul(outer.min), max)
    }

    fn widest(self, other: Occurs) -> Occurs {
        let max = match (self.max, other.max) {
            (Some(a), Some(b)) => Some(a.max(b)),
            _ => None,
        };
        Occurs::new(self.min.min(other.min), max)
    }
}

/// A node of a resolved content model
#[derive(Debug, Clone, PartialEq)]
pub enum Particle {
    Element {
        name: String,
        occurs: Occurs,
    },
    Sequence {
        occurs: Occurs,
        items: Vec<Particle>,
    },
    Choice {
        occurs: Occurs,
        items: Vec<Particle>,
    },
    /// A named group reference, kept so choice branches can be labelled
    Group {
        name: String,
        occurs: Occurs,
        inner: Box<Particle>,
    },
    Any,
}

impl Particle {
    pub fn empty() -> Particle {
        Particle::Sequence {
            occurs: Occurs::ONCE,
            items: Vec::new(),
        }
    }

    /// Every element name reachable from this particle, in document order
    pub fn element_names(&self) -> Vec<String> {
        let mut out = Vec::new();
        self.collect_names(&mut out);
        out
    }

    fn collect_names(&self, out: &mut Vec<String>) {
        match self {
            Particle::Element { name, .. } => {
                if !out.contains(name) {
                    out.push(name.clone());
                }
            }
            Particle::Sequence { items, .. } | Particle::Choice { items, .. } => {
                for item in items {
                    item.collect_names(out);
                }
            }
            Particle::Group { inner, .. } => inner.collect_names(out),
            Particle::Any => {}
        }
    }

    /// Effective occurrences of every element reachable from this particle.
    ///
    /// Within a sequence occurrences add up. Across the branches of a choice
    /// the minimum is the smallest branch minimum (0 where a branch lacks the
    /// element) and the maximum the largest. Every compositor then multiplies
    /// by its own bounds.
    pub fn occurrences(&self) -> IndexMap<String, Occurs> {
        match self {
            Particle::Element { name, occurs } => {
                let mut map = IndexMap::new();
                map.insert(name.clone(), *occurs);
                map
            }
            Particle::Sequence { occurs, items } => {
                let mut map: IndexMap<String, Occurs> = IndexMap::new();
                for item in items {
                    for (name, occ) in item.occurrences() {
                        let merged = match map.get(&name) {
                            Some(existing) => existing.add(occ),
                            None => occ,
                        };
                        map.insert(name, merged);
                    }
                }
                scale(map, *occurs)
            }
            Particle::Choice { occurs, items } => {
                let branches: Vec<IndexMap<String, Occurs>> =
                    items.iter().map(Particle::occurrences).collect();
                let mut map: IndexMap<String, Occurs> = IndexMap::new();
                for branch in &branches {
                    for name in branch.keys() {
                        if map.contains_key(name) {
                            continue;
                        }
                        let mut combined: Option<Occurs> = None;
                        for other in &branches {
                            let occ = other.get(name).copied().unwrap_or(Occurs::new(0, Some(0)));
                            combined = Some(match combined {
                                Some(c) => c.widest(occ),
                                None => occ,
                            });
                        }
                        if let Some(combined) = combined {
                            map.insert(name.clone(), combined);
                        }
                    }
                }
                scale(map, *occurs)
            }
            Particle::Group { occurs, inner, .. } => scale(inner.occurrences(), *occurs),
            Particle::Any => IndexMap::new(),
        }
    }
}

fn scale(map: IndexMap<String, Occurs>, outer: Occurs) -> IndexMap<String, Occurs> {
    map.into_iter()
        .map(|(name, occ)| (name, occ.times(outer)))
        .collect()
}
