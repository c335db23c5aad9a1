//! Footnote resolution.
//!
//! Active only when [`Extensions::NOTES`] is set. A definition is a
//! `[^label]:` marker at up to three spaces of indentation, followed by the
//! rest of that line and any indented or lazy continuation lines. The
//! collected body is parsed with the same block grammar as the main
//! document, with the reference table available so links inside footnotes
//! resolve.
//!
//! The extent computation is shared with the main grammar so definition
//! blocks are elided from the visible document exactly as they were
//! consumed here. Duplicate labels: first definition wins, matching the
//! reference-table policy.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::collections::HashMap;

use super::ast::Element;
use super::extensions::Extensions;
use super::peg::{is_blank, parse_fragment, preprocess};
use super::references::{normalize_label, ReferenceTable};

static NOTE_DEFINITION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^ {0,3}\[\^([^\]\s]+)\]:[ \t]*(.*)$").expect("note definition pattern")
});

/// One resolved footnote. The label is stored normalized; the content is a
/// fully parsed block sequence.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NoteDef {
    pub label: String,
    pub content: Vec<Element>,
}

/// Document-ordered footnote definitions with a normalized-label index.
/// Document numbering is not taken from this order: markers are numbered by
/// order of first inline reference, at render time.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NoteTable {
    notes: Vec<NoteDef>,
    index: HashMap<String, usize>,
}

impl NoteTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a definition; the first definition for a label wins.
    pub fn insert(&mut self, label: String, content: Vec<Element>) {
        self.notes.push(NoteDef {
            label: label.clone(),
            content,
        });
        let idx = self.notes.len() - 1;
        self.index.entry(label).or_insert(idx);
    }

    /// Look up a label, normalizing it first.
    pub fn lookup(&self, label: &str) -> Option<&NoteDef> {
        let key = normalize_label(label);
        self.index.get(&key).map(|&idx| &self.notes[idx])
    }

    /// All definitions in document order, duplicates included.
    pub fn notes(&self) -> &[NoteDef] {
        &self.notes
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }
}

/// Scan source text for footnote definitions. Returns an empty table unless
/// the notes extension is enabled.
pub fn resolve_notes(
    text: &str,
    extensions: Extensions,
    references: &ReferenceTable,
) -> NoteTable {
    let mut table = NoteTable::new();
    if !extensions.contains(Extensions::NOTES) {
        return table;
    }
    let text = preprocess(text);
    let lines: Vec<&str> = text.lines().collect();
    let mut i = 0;
    while i < lines.len() {
        match definition_extent(&lines, i) {
            Some((label, body, next)) => {
                let content = parse_fragment(&body.join("\n"), extensions, references, &table);
                table.insert(label, content);
                i = next;
            }
            None => i += 1,
        }
    }
    table
}

/// Measure a footnote definition starting at `lines[start]`. Returns the
/// normalized label, the dedented body lines, and the index of the first
/// line past the definition. Shared with the block grammar's elision rule.
pub(crate) fn definition_extent(
    lines: &[&str],
    start: usize,
) -> Option<(String, Vec<String>, usize)> {
    let caps = NOTE_DEFINITION.captures(lines[start])?;
    let label = normalize_label(&caps[1]);
    let mut body = vec![caps[2].to_string()];
    let mut i = start + 1;
    let mut blanks = 0usize;
    while i < lines.len() {
        let line = lines[i];
        if is_blank(line) {
            blanks += 1;
            i += 1;
            continue;
        }
        if let Some(rest) = line.strip_prefix("    ") {
            for _ in 0..blanks {
                body.push(String::new());
            }
            blanks = 0;
            body.push(rest.to_string());
            i += 1;
        } else if blanks == 0 && !NOTE_DEFINITION.is_match(line) {
            // Lazy continuation of the first paragraph.
            body.push(line.to_string());
            i += 1;
        } else {
            break;
        }
    }
    Some((label, body, i))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markdown::references::resolve_references;

    fn notes_of(text: &str) -> NoteTable {
        let refs = resolve_references(text, Extensions::NOTES);
        resolve_notes(text, Extensions::NOTES, &refs)
    }

    #[test]
    fn disabled_extension_yields_empty_table() {
        let refs = ReferenceTable::new();
        let table = resolve_notes("[^a]: body\n", Extensions::NONE, &refs);
        assert!(table.is_empty());
    }

    #[test]
    fn single_line_definition() {
        let table = notes_of("[^a]: the body\n");
        let def = table.lookup("a").unwrap();
        assert_eq!(def.label, "a");
        assert_eq!(def.content.len(), 1);
        assert!(matches!(def.content[0], Element::Para(_)));
    }

    #[test]
    fn indented_continuation_joins_body() {
        let table = notes_of("[^a]: first\n    second\n");
        let def = table.lookup("a").unwrap();
        assert!(matches!(def.content[0], Element::Para(_)));
        assert_eq!(def.content.len(), 1);
    }

    #[test]
    fn blank_then_indent_starts_second_paragraph() {
        let table = notes_of("[^a]: first\n\n    second\n");
        let def = table.lookup("a").unwrap();
        assert_eq!(def.content.len(), 2);
    }

    #[test]
    fn definitions_keep_document_order() {
        let table = notes_of("[^b]: bee\n\n[^a]: aye\n");
        let labels: Vec<&str> = table.notes().iter().map(|n| n.label.as_str()).collect();
        assert_eq!(labels, vec!["b", "a"]);
    }

    #[test]
    fn duplicate_labels_first_wins() {
        let table = notes_of("[^x]: one\n\n[^x]: two\n");
        let def = table.lookup("x").unwrap();
        assert_eq!(super::super::ast::text_of(&def.content), "one");
    }

    #[test]
    fn links_inside_notes_resolve() {
        let text = "[site]: /url\n\n[^a]: see [site]\n";
        let table = notes_of(text);
        let def = table.lookup("a").unwrap();
        let tree = crate::markdown::ast::tree_string(&crate::markdown::Document {
            children: def.content.clone(),
        });
        assert!(tree.contains("link url=\"/url\""), "tree:\n{tree}");
    }
}
