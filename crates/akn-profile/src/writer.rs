//! Profile serialization
//!
//! Profiles are serialized with `serde_yaml`, then laid out the way people
//! edit them by hand: null values as bare keys and a blank line before the
//! `documentTypes` and `elements` sections and before each element entry.

use crate::model::ProfileRestriction;
use serde::Serialize;

/// Top-level sections preceded by a blank line
const SECTION_KEYS: [&str; 2] = ["documentTypes:", "elements:"];

#[derive(Serialize)]
struct ProfileFile<'a> {
    profile: &'a ProfileRestriction,
}

impl ProfileRestriction {
    /// Render the profile as YAML text that [`crate::parse_profile`] reads back
    ///
    /// # Errors
    ///
    /// Returns an error when serialization fails.
    pub fn to_yaml(&self) -> Result<String, serde_yaml::Error> {
        write_profile(self)
    }
}

/// Serialize `profile` under a top-level `profile` key
///
/// # Errors
///
/// Returns an error when serialization fails.
pub fn write_profile(profile: &ProfileRestriction) -> Result<String, serde_yaml::Error> {
    let raw = serde_yaml::to_string(&ProfileFile { profile })?;
    Ok(tidy_layout(&raw))
}

/// Apply the hand-edited profile layout to `serde_yaml` output.
///
/// Lines inside block scalars are copied unchanged.
pub fn tidy_layout(raw: &str) -> String {
    let mut out: Vec<&str> = Vec::new();
    let mut in_elements = false;
    let mut block_parent: Option<usize> = None;

    for line in raw.lines() {
        let indent = indent_of(line);
        if let Some(parent) = block_parent {
            if line.trim().is_empty() || indent > parent {
                out.push(line);
                continue;
            }
            block_parent = None;
        }
        if opens_block_scalar(line) {
            block_parent = Some(indent);
        }
        if !line.is_empty() && indent < 4 {
            in_elements = false;
        }
        let previous = out.last().copied().unwrap_or_default();

        if !out.is_empty() && indent == 2 && SECTION_KEYS.contains(&line.trim()) && !previous.is_empty() {
            out.push("");
        }
        if in_elements && indent == 4 && !line.trim_start().starts_with('-') {
            let key = line.trim_start();
            let is_key = key.ends_with(':') || key.contains(": ");
            if is_key && !previous.is_empty() && previous != "  elements:" {
                out.push("");
            }
        }
        if line == "  elements:" {
            in_elements = true;
        }
        out.push(bare_null(line));
    }

    let mut joined = out.join("\n");
    joined.push('\n');
    joined
}

/// `act: null` -> `act:`
fn bare_null(line: &str) -> &str {
    line.strip_suffix(" null")
        .filter(|l| l.ends_with(':'))
        .unwrap_or(line)
}

fn indent_of(line: &str) -> usize {
    line.len() - line.trim_start_matches(' ').len()
}

/// Whether the line ends in a `|` or `>` block scalar header
fn opens_block_scalar(line: &str) -> bool {
    let trimmed = line.trim_end();
    let Some((head, token)) = trimmed.rsplit_once(' ') else {
        return false;
    };
    let mut chars = token.chars();
    let is_header = matches!(chars.next(), Some('|' | '>'))
        && chars.all(|c| matches!(c, '-' | '+') || c.is_ascii_digit());
    let head = head.trim_end();
    is_header && (head.ends_with(':') || head.trim_start() == "-")
}
