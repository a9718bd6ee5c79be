//! Source positions of profile keys
//!
//! Block mappings and sequences are indexed, as are flow lists and flow
//! mappings written on a single line.

use serde::Serialize;
use std::collections::HashMap;

/// A position in the document text: 1-based line, 0-based column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Location {
    pub line: usize,
    pub column: usize,
}

impl Location {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

/// Maps dotted key paths (`profile.elements.act.children.meta`,
/// `profile.documentTypes[0]`) to where they appear in the source.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LineIndex {
    entries: HashMap<String, Location>,
}

impl LineIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index every block mapping key and sequence item of a YAML text
    pub fn from_text(text: &str) -> Self {
        let mut index = LineIndex::new();
        Scanner::default().scan(text, &mut index);
        index
    }

    pub fn set(&mut self, path: impl Into<String>, location: Location) {
        self.entries.insert(path.into(), location);
    }

    pub fn get(&self, path: &str) -> Option<Location> {
        self.entries.get(path).copied()
    }

    pub fn line(&self, path: &str) -> Option<usize> {
        self.get(path).map(|l| l.line)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.entries.contains_key(path)
    }

    /// Location of `path`, falling back to the nearest enclosing key
    pub fn locate(&self, path: &str) -> Option<Location> {
        let mut current = path;
        loop {
            if let Some(location) = self.get(current) {
                return Some(location);
            }
            current = parent_path(current)?;
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// `a.b[2]` -> `a.b`, `a.b` -> `a`, `a` -> none
fn parent_path(path: &str) -> Option<&str> {
    if path.ends_with(']') {
        if let Some(open) = path.rfind('[') {
            return Some(&path[..open]);
        }
    }
    path.rfind('.').map(|dot| &path[..dot])
}

struct Frame {
    indent: usize,
    path: String,
    is_item: bool,
    next_item: usize,
}

/// Indentation-driven scanner over block-style YAML
#[derive(Default)]
struct Scanner {
    frames: Vec<Frame>,
    /// Indent of a key whose value is a block scalar still being read
    block_scalar: Option<usize>,
}

impl Scanner {
    fn scan(&mut self, text: &str, index: &mut LineIndex) {
        for (n, raw) in text.lines().enumerate() {
            let line = n + 1;
            let indent = raw.len() - raw.trim_start_matches(' ').len();
            let content = raw[indent..].trim_end();

            if content.is_empty() {
                continue;
            }
            if let Some(scalar_indent) = self.block_scalar {
                if indent > scalar_indent {
                    continue;
                }
                self.block_scalar = None;
            }
            if content.starts_with('#') {
                continue;
            }
            if indent == 0 && (content.starts_with("---") || content.starts_with("...")) {
                self.frames.clear();
                continue;
            }

            if is_item(content) {
                self.item(line, indent, content, index);
            } else {
                self.key(line, indent, content, index);
            }
        }
    }

    fn item(&mut self, line: usize, indent: usize, content: &str, index: &mut LineIndex) {
        // A sequence may sit at the same indent as its key.
        while let Some(top) = self.frames.last() {
            if top.indent > indent || (top.indent == indent && top.is_item) {
                self.frames.pop();
            } else {
                break;
            }
        }
        let Some(parent) = self.frames.last_mut() else {
            return;
        };
        let path = format!("{}[{}]", parent.path, parent.next_item);
        parent.next_item += 1;

        let rest = content[1..].trim_start();
        let offset = content.len() - rest.len();
        index.set(path.clone(), Location::new(line, indent + offset));
        self.frames.push(Frame {
            indent,
            path,
            is_item: true,
            next_item: 0,
        });

        if rest.starts_with('|') || rest.starts_with('>') {
            self.block_scalar = Some(indent);
        } else if !rest.is_empty() && !is_item(rest) && split_key(rest).is_some() {
            self.key(line, indent + offset, rest, index);
        }
    }

    fn key(&mut self, line: usize, indent: usize, content: &str, index: &mut LineIndex) {
        let Some((key, value, value_offset)) = split_key(content) else {
            return;
        };
        while self.frames.last().is_some_and(|top| top.indent >= indent) {
            self.frames.pop();
        }
        let path = match self.frames.last() {
            Some(parent) => format!("{}.{}", parent.path, key),
            None => key.to_string(),
        };
        index.set(path.clone(), Location::new(line, indent));

        let value = strip_comment(value);
        if value.starts_with('|') || value.starts_with('>') {
            self.block_scalar = Some(indent);
        } else if value.starts_with('[') {
            flow_items(&path, line, indent + value_offset, value, index);
        } else if value.starts_with('{') {
            flow_keys(&path, line, indent + value_offset, value, index);
        }
        self.frames.push(Frame {
            indent,
            path,
            is_item: false,
            next_item: 0,
        });
    }
}

fn is_item(content: &str) -> bool {
    content == "-" || content.starts_with("- ")
}

/// Split `key: value` into key, value and the value's offset in `content`
fn split_key(content: &str) -> Option<(&str, &str, usize)> {
    let (key, after) = if let Some(quote) = content.chars().next().filter(|c| *c == '"' || *c == '\'') {
        let close = content[1..].find(quote)? + 1;
        let key = &content[1..close];
        let after = content[close + 1..].trim_start();
        (key, after.strip_prefix(':')?)
    } else {
        let colon = content
            .match_indices(':')
            .map(|(i, _)| i)
            .find(|&i| content[i + 1..].is_empty() || content[i + 1..].starts_with(' '))?;
        let key = content[..colon].trim_end();
        if key.is_empty() || key.starts_with('{') || key.starts_with('[') {
            return None;
        }
        (key, &content[colon + 1..])
    };
    let value = after.trim_start();
    let offset = content.len() - value.len();
    Some((key, value, offset))
}

fn strip_comment(value: &str) -> &str {
    if value.starts_with('"') || value.starts_with('\'') {
        return value;
    }
    match value.find(" #") {
        Some(i) => value[..i].trim_end(),
        None if value.starts_with('#') => "",
        None => value,
    }
}

/// Record the items of an inline `[a, b]` list
fn flow_items(path: &str, line: usize, column: usize, value: &str, index: &mut LineIndex) {
    let Some(inner) = value.strip_prefix('[').and_then(|v| v.strip_suffix(']')) else {
        return;
    };
    let mut offset = 1;
    for (i, item) in inner.split(',').enumerate() {
        let leading = item.len() - item.trim_start().len();
        if !item.trim().is_empty() {
            index.set(format!("{}[{}]", path, i), Location::new(line, column + offset + leading));
        }
        offset += item.len() + 1;
    }
}

/// Record the keys of an inline `{a: 1, b: {c: 2}}` mapping.
///
/// Only single-line flows are indexed; keys of a flow spanning several lines
/// resolve to the enclosing key through [`LineIndex::locate`].
fn flow_keys(path: &str, line: usize, column: usize, value: &str, index: &mut LineIndex) {
    let Some(inner) = value.strip_prefix('{').and_then(|v| v.strip_suffix('}')) else {
        return;
    };
    for (offset, part) in split_flow(inner) {
        let trimmed = part.trim();
        let at = column + 1 + offset + (part.len() - part.trim_start().len());
        let Some((key, rest, value_offset)) = split_key(trimmed) else {
            continue;
        };
        let key_path = format!("{}.{}", path, key);
        index.set(key_path.clone(), Location::new(line, at));
        if rest.starts_with('{') {
            flow_keys(&key_path, line, at + value_offset, rest, index);
        } else if rest.starts_with('[') {
            flow_items(&key_path, line, at + value_offset, rest, index);
        }
    }
}

/// Split flow content on top-level commas, with each part's byte offset
fn split_flow(inner: &str) -> Vec<(usize, &str)> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut start = 0;
    for (i, c) in inner.char_indices() {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => {}
            None => match c {
                '"' | '\'' => quote = Some(c),
                '[' | '{' => depth += 1,
                ']' | '}' => depth = depth.saturating_sub(1),
                ',' if depth == 0 => {
                    parts.push((start, &inner[start..i]));
                    start = i + 1;
                }
                _ => {}
            },
        }
    }
    parts.push((start, &inner[start..]));
    parts
}
