//! Link-reference resolution.
//!
//! Scans the source for definition lines of the form
//! `[label]: url "optional title"` and builds a lookup table keyed by
//! normalized label. The scan has no side effects on the source; the main
//! grammar recognizes the same lines and elides them from the visible
//! document (they become [`Element::Reference`](crate::markdown::Element)
//! nodes, which render as nothing).
//!
//! Duplicate definitions for the same normalized label: the first one wins.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::collections::HashMap;

use super::extensions::Extensions;
use super::peg::preprocess;

static DEFINITION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"^ {0,3}\[([^\^\]\[][^\]\[]*)\]:[ \t]*<?([^ \t<>]+)>?(?:[ \t]+(?:"([^"]*)"|'([^']*)'|\(([^)]*)\)))?[ \t]*$"#,
    )
    .expect("reference definition pattern")
});

/// One resolved reference definition. The label is stored normalized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReferenceDef {
    pub label: String,
    pub url: String,
    /// Empty when the definition gave no title.
    pub title: String,
}

/// Document-ordered reference definitions with a normalized-label index.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ReferenceTable {
    defs: Vec<ReferenceDef>,
    index: HashMap<String, usize>,
}

impl ReferenceTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a definition. The first definition for a normalized label
    /// wins; later ones are kept in document order but never returned by
    /// lookup.
    pub fn insert(&mut self, def: ReferenceDef) {
        let label = def.label.clone();
        self.defs.push(def);
        let idx = self.defs.len() - 1;
        self.index.entry(label).or_insert(idx);
    }

    /// Look up a label, normalizing it first.
    pub fn lookup(&self, label: &str) -> Option<&ReferenceDef> {
        let key = normalize_label(label);
        self.index.get(&key).map(|&idx| &self.defs[idx])
    }

    /// All definitions in document order, duplicates included.
    pub fn definitions(&self) -> &[ReferenceDef] {
        &self.defs
    }

    pub fn is_empty(&self) -> bool {
        self.defs.is_empty()
    }

    pub fn len(&self) -> usize {
        self.defs.len()
    }
}

/// Normalize a reference label: lowercase, runs of whitespace collapsed to
/// one space, ends trimmed.
pub fn normalize_label(label: &str) -> String {
    label
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Scan source text for reference definitions.
pub fn resolve_references(text: &str, _extensions: Extensions) -> ReferenceTable {
    let text = preprocess(text);
    let mut table = ReferenceTable::new();
    for line in text.lines() {
        if let Some(def) = parse_definition_line(line) {
            table.insert(def);
        }
    }
    table
}

/// Recognize a single reference-definition line. Shared with the block
/// grammar, which uses it to elide definition lines from the document.
pub(crate) fn parse_definition_line(line: &str) -> Option<ReferenceDef> {
    let caps = DEFINITION.captures(line)?;
    let title = caps
        .get(3)
        .or_else(|| caps.get(4))
        .or_else(|| caps.get(5))
        .map(|m| m.as_str())
        .unwrap_or("");
    Some(ReferenceDef {
        label: normalize_label(&caps[1]),
        url: caps[2].to_string(),
        title: title.to_string(),
    })
}
