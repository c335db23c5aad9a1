//! Grammar engine: ordered choice with packrat memoization.
//!
//!     Every rule with alternatives commits to the first alternative that
//!     succeeds; later alternatives are never attempted. That ordering is a
//!     correctness property of the grammar, not an optimization, and the
//!     block and inline modules are written so the rule order is visible as
//!     plain ordered `if`/`match` chains.
//!
//!     The inline grammar memoizes its failure-prone rules per (rule, byte
//!     position): re-invoking a rule at a position it already failed or
//!     matched returns the cached outcome instead of reparsing, which bounds
//!     total work to O(rules x input length) even on adversarial input such
//!     as thousands of unmatched emphasis delimiters.
//!
//!     Recursion depth is bounded explicitly. An attempt cut short by the
//!     depth limit fails closed (the input degrades to literal text) and is
//!     not memoized, so a deep failure cannot poison the same position when
//!     it is reached again through a shallower path.
//!
//! The grammar is total: parsing cannot fail, only degrade.

pub(crate) mod block;
pub(crate) mod inline;

use super::ast::Document;
use super::ast::Element;
use super::extensions::Extensions;
use super::notes::NoteTable;
use super::references::ReferenceTable;

/// Maximum nesting depth for both block recursion (quotes in quotes, lists
/// in lists) and inline rule recursion. Exceeding it falls back to literal
/// text rather than recursing further.
pub(crate) const MAX_NESTING: usize = 64;

/// Parse a whole document. The resolver tables must have been built from
/// the same source text; they are only read, never modified.
pub fn parse(
    text: &str,
    extensions: Extensions,
    references: &ReferenceTable,
    notes: &NoteTable,
) -> Document {
    let text = preprocess(text);
    let lines: Vec<&str> = text.lines().collect();
    let mut parser = block::BlockParser::new(extensions, references, notes);
    Document {
        children: parser.parse_blocks(&lines),
    }
}

/// Parse a fragment that is already preprocessed (footnote bodies, nested
/// content). Returns the block sequence without a document wrapper.
pub(crate) fn parse_fragment(
    text: &str,
    extensions: Extensions,
    references: &ReferenceTable,
    notes: &NoteTable,
) -> Vec<Element> {
    let lines: Vec<&str> = text.lines().collect();
    let mut parser = block::BlockParser::new(extensions, references, notes);
    parser.parse_blocks(&lines)
}

/// Normalize line endings to `\n` and expand tabs to 4-column stops. Runs
/// once, before any pass, so the resolvers and the grammar see identical
/// text.
pub(crate) fn preprocess(text: &str) -> String {
    let text = text.replace("\r\n", "\n").replace('\r', "\n");
    if !text.contains('\t') {
        return text;
    }
    let mut out = String::with_capacity(text.len());
    let mut col = 0usize;
    for ch in text.chars() {
        match ch {
            '\t' => {
                let width = 4 - col % 4;
                for _ in 0..width {
                    out.push(' ');
                }
                col += width;
            }
            '\n' => {
                out.push('\n');
                col = 0;
            }
            other => {
                out.push(other);
                col += 1;
            }
        }
    }
    out
}

/// True for lines containing nothing but whitespace.
pub(crate) fn is_blank(line: &str) -> bool {
    line.trim().is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preprocess_normalizes_line_endings() {
        assert_eq!(preprocess("a\r\nb\rc\n"), "a\nb\nc\n");
    }

    #[test]
    fn preprocess_expands_tabs_to_stops() {
        assert_eq!(preprocess("\tx"), "    x");
        assert_eq!(preprocess("ab\tx"), "ab  x");
        assert_eq!(preprocess("abcd\tx"), "abcd    x");
    }

    #[test]
    fn preprocess_resets_columns_per_line() {
        assert_eq!(preprocess("ab\n\tx"), "ab\n    x");
    }

    #[test]
    fn empty_input_parses_to_empty_document() {
        let refs = ReferenceTable::new();
        let notes = NoteTable::new();
        let doc = parse("", Extensions::NONE, &refs, &notes);
        assert!(doc.is_empty());
    }

    #[test]
    fn whitespace_only_input_parses_to_empty_document() {
        let refs = ReferenceTable::new();
        let notes = NoteTable::new();
        let doc = parse("   \n\n  \n", Extensions::NONE, &refs, &notes);
        assert!(doc.is_empty());
    }
}
