//! Block grammar.
//!
//!     Applied top-to-bottom on whole-document lines, and recursively on the
//!     stripped content of blockquotes and list items. The alternatives in
//!     `parse_blocks` are ordered choice: the first rule that matches a line
//!     wins, and the paragraph rule at the end matches anything, which is
//!     what makes the grammar total.

use once_cell::sync::Lazy;
use regex::Regex;

use super::inline;
use super::MAX_NESTING;
use crate::markdown::ast::{Element, HeadingLevel, Link};
use crate::markdown::extensions::Extensions;
use crate::markdown::notes::{self, NoteTable};
use crate::markdown::peg::is_blank;
use crate::markdown::references::{self, ReferenceTable};

static ATX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(#{1,6})(?:[ \t]+(.*))?$").expect("atx pattern"));
static SETEXT_H1: Lazy<Regex> = Lazy::new(|| Regex::new(r"^ {0,3}=+[ \t]*$").expect("setext h1"));
static SETEXT_H2: Lazy<Regex> = Lazy::new(|| Regex::new(r"^ {0,3}-+[ \t]*$").expect("setext h2"));
static HRULE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^ {0,3}(?:(?:\*[ \t]*){3,}|(?:-[ \t]*){3,}|(?:_[ \t]*){3,})$")
        .expect("hrule pattern")
});
static BULLET: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^( {0,3})[*+-][ \t]+(.*)$").expect("bullet pattern"));
static ORDERED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^( {0,3})\d+[.)][ \t]+(.*)$").expect("ordered pattern"));
static FENCE_OPEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^ {0,3}(`{3,}|~{3,})[ \t]*(.*?)[ \t]*$").expect("fence open"));
static FENCE_CLOSE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^ {0,3}(`{3,}|~{3,})[ \t]*$").expect("fence close"));
static BLOCKQUOTE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^ {0,3}> ?(.*)$").expect("blockquote pattern"));
static HTML_BLOCK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^ {0,3}<(?:!|/?[A-Za-z])").expect("html block pattern"));
static AUTOLINK_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^ {0,3}<(?:[A-Za-z][A-Za-z0-9+.-]*://[^<>\s]+|[^<>\s@]+@[^<>\s@]+\.[^<>\s@]+)>")
        .expect("autolink line pattern")
});
static STYLE_MARKUP: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)<[ \t]*/?[ \t]*style[ \t>/]|style[ \t]*=[ \t]*["']"#).expect("style markup")
});

/// True for raw HTML that carries styling: `<style>` elements and tags with
/// a `style=` attribute. Drives the `FILTER_STYLES` axis.
pub(crate) fn is_style_markup(html: &str) -> bool {
    STYLE_MARKUP.is_match(html)
}

pub(crate) struct BlockParser<'a> {
    extensions: Extensions,
    references: &'a ReferenceTable,
    notes: &'a NoteTable,
    depth: usize,
}

impl<'a> BlockParser<'a> {
    pub(crate) fn new(
        extensions: Extensions,
        references: &'a ReferenceTable,
        notes: &'a NoteTable,
    ) -> Self {
        Self {
            extensions,
            references,
            notes,
            depth: 0,
        }
    }

    /// Parse a line sequence into blocks. Ordered choice: the first rule
    /// that matches wins; the paragraph rule at the end matches anything.
    pub(crate) fn parse_blocks(&mut self, lines: &[&str]) -> Vec<Element> {
        let mut out = Vec::new();
        let mut i = 0;
        while i < lines.len() {
            let line = lines[i];
            if is_blank(line) {
                i += 1;
                continue;
            }
            if self.extensions.contains(Extensions::NOTES) {
                if let Some((_, _, next)) = notes::definition_extent(lines, i) {
                    // Consumed by the note resolver; elide from the document.
                    i = next;
                    continue;
                }
            }
            if let Some(def) = references::parse_definition_line(line) {
                out.push(Element::Reference(Link {
                    label: vec![Element::Str(def.label)],
                    url: def.url,
                    title: def.title,
                }));
                i += 1;
                continue;
            }
            if BLOCKQUOTE.is_match(line) {
                let (next, el) = self.blockquote(lines, i);
                out.push(el);
                i = next;
                continue;
            }
            if line.starts_with("    ") {
                let (next, el) = indented_verbatim(lines, i);
                out.push(el);
                i = next;
                continue;
            }
            if let Some((next, el)) = self.fenced_verbatim(lines, i) {
                out.push(el);
                i = next;
                continue;
            }
            if HRULE.is_match(line) {
                out.push(Element::HorizontalRule);
                i += 1;
                continue;
            }
            if let Some(el) = self.atx_heading(line) {
                out.push(el);
                i += 1;
                continue;
            }
            if let Some((next, el)) = self.setext_heading(lines, i) {
                out.push(el);
                i = next;
                continue;
            }
            if ORDERED.is_match(line) {
                let (next, el) = self.list(lines, i, true);
                out.push(el);
                i = next;
                continue;
            }
            if BULLET.is_match(line) {
                let (next, el) = self.list(lines, i, false);
                out.push(el);
                i = next;
                continue;
            }
            if let Some((next, maybe)) = self.html_block(lines, i) {
                if let Some(el) = maybe {
                    out.push(el);
                }
                i = next;
                continue;
            }
            let (next, el) = self.paragraph(lines, i);
            out.push(el);
            i = next;
        }
        out
    }

    fn inlines(&self, text: &str) -> Vec<Element> {
        inline::parse_inlines(text, self.extensions, self.references, self.notes)
    }

    /// Recursively parse nested content, falling back to literal text once
    /// the depth limit is reached.
    fn nested_blocks(&mut self, inner: &[String]) -> Vec<Element> {
        if self.depth >= MAX_NESTING {
            return vec![Element::Para(vec![Element::Str(inner.join("\n"))])];
        }
        let line_refs: Vec<&str> = inner.iter().map(String::as_str).collect();
        self.depth += 1;
        let out = self.parse_blocks(&line_refs);
        self.depth -= 1;
        out
    }

    fn atx_heading(&self, line: &str) -> Option<Element> {
        let caps = ATX.captures(line)?;
        let level = HeadingLevel::from_depth(caps[1].len());
        let text = caps.get(2).map(|m| m.as_str()).unwrap_or("");
        let text = text.trim_end().trim_end_matches('#').trim_end();
        Some(Element::Heading {
            level,
            content: self.inlines(text),
        })
    }

    fn setext_heading(&self, lines: &[&str], start: usize) -> Option<(usize, Element)> {
        if start + 1 >= lines.len() {
            return None;
        }
        let level = if SETEXT_H1.is_match(lines[start + 1]) {
            HeadingLevel::H1
        } else if SETEXT_H2.is_match(lines[start + 1]) {
            HeadingLevel::H2
        } else {
            return None;
        };
        let content = self.inlines(strip_nonindent(lines[start]).trim());
        Some((start + 2, Element::Heading { level, content }))
    }

    fn blockquote(&mut self, lines: &[&str], start: usize) -> (usize, Element) {
        let mut inner: Vec<String> = Vec::new();
        let mut i = start;
        while i < lines.len() {
            let line = lines[i];
            if let Some(caps) = BLOCKQUOTE.captures(line) {
                inner.push(caps[1].to_string());
                i += 1;
            } else if is_blank(line) {
                // A blank ends the quote unless the next line is quoted too.
                if i + 1 < lines.len() && BLOCKQUOTE.is_match(lines[i + 1]) {
                    inner.push(String::new());
                    i += 1;
                } else {
                    break;
                }
            } else {
                // Lazy continuation.
                inner.push(line.to_string());
                i += 1;
            }
        }
        let children = self.nested_blocks(&inner);
        (i, Element::BlockQuote(children))
    }

    fn fenced_verbatim(&self, lines: &[&str], start: usize) -> Option<(usize, Element)> {
        let caps = FENCE_OPEN.captures(lines[start])?;
        let fence = caps.get(1).map(|m| m.as_str()).unwrap_or("");
        let info = caps.get(2).map(|m| m.as_str()).unwrap_or("");
        if fence.starts_with('`') && info.contains('`') {
            // Not a fence; backticks in the info string mean inline code.
            return None;
        }
        let fence_char = fence.chars().next()?;
        let mut content: Vec<&str> = Vec::new();
        let mut i = start + 1;
        while i < lines.len() {
            if let Some(close) = FENCE_CLOSE.captures(lines[i]) {
                let run = close.get(1).map(|m| m.as_str()).unwrap_or("");
                if run.starts_with(fence_char) && run.len() >= fence.len() {
                    return Some((i + 1, Element::Verbatim(joined_verbatim(&content))));
                }
            }
            content.push(lines[i]);
            i += 1;
        }
        // Unclosed fence: the rest of the input is the block.
        Some((i, Element::Verbatim(joined_verbatim(&content))))
    }

    fn html_block(&self, lines: &[&str], start: usize) -> Option<(usize, Option<Element>)> {
        if !HTML_BLOCK.is_match(lines[start]) {
            return None;
        }
        // `<scheme://...>` and `<addr@host>` are autolinks, not tags; leave
        // them for the inline grammar.
        if AUTOLINK_LINE.is_match(lines[start]) {
            return None;
        }
        let mut raw: Vec<&str> = Vec::new();
        let mut i = start;
        while i < lines.len() && !is_blank(lines[i]) {
            raw.push(lines[i]);
            i += 1;
        }
        let text = joined_verbatim(&raw);
        let elide = self.extensions.contains(Extensions::FILTER_HTML)
            || (self.extensions.contains(Extensions::FILTER_STYLES) && is_style_markup(&text));
        if elide {
            Some((i, None))
        } else {
            Some((i, Some(Element::HtmlBlock(text))))
        }
    }

    fn list(&mut self, lines: &[&str], start: usize, ordered: bool) -> (usize, Element) {
        let marker: &Regex = if ordered { &ORDERED } else { &BULLET };
        let other: &Regex = if ordered { &BULLET } else { &ORDERED };
        let mut raw_items: Vec<Vec<String>> = Vec::new();
        let mut loose = false;
        let mut pending_blank = false;
        let mut base_indent = 0usize;
        let mut i = start;
        while i < lines.len() {
            let line = lines[i];
            if is_blank(line) {
                pending_blank = true;
                i += 1;
                continue;
            }
            if HRULE.is_match(line) {
                break;
            }
            if let Some(caps) = marker.captures(line) {
                let indent = caps[1].len();
                if raw_items.is_empty() {
                    base_indent = indent;
                }
                if indent > base_indent {
                    // Deeper marker: nested list inside the current item.
                    if let Some(item) = raw_items.last_mut() {
                        if pending_blank {
                            item.push(String::new());
                        }
                        item.push(strip_item_indent(line).unwrap_or(line).to_string());
                    }
                    pending_blank = false;
                    i += 1;
                    continue;
                }
                if pending_blank && !raw_items.is_empty() {
                    loose = true;
                }
                pending_blank = false;
                raw_items.push(vec![caps[2].to_string()]);
                i += 1;
                continue;
            }
            if other.is_match(line) && leading_spaces(line) <= base_indent {
                // The other list family at this level starts a new list.
                break;
            }
            if pending_blank {
                match strip_item_indent(line) {
                    Some(rest) => {
                        loose = true;
                        if let Some(item) = raw_items.last_mut() {
                            item.push(String::new());
                            item.push(rest.to_string());
                        }
                        pending_blank = false;
                        i += 1;
                    }
                    None => break,
                }
                continue;
            }
            if interrupts_list(line) {
                break;
            }
            // Indented or lazy continuation of the current item.
            if let Some(item) = raw_items.last_mut() {
                item.push(strip_item_indent(line).unwrap_or(line).to_string());
            }
            i += 1;
        }
        let tight = !loose;
        let mut items = Vec::new();
        for raw in &raw_items {
            let mut children = self.nested_blocks(raw);
            if tight {
                for child in &mut children {
                    if let Element::Para(content) = child {
                        *child = Element::Plain(std::mem::take(content));
                    }
                }
            }
            items.push(Element::ListItem(children));
        }
        let el = if ordered {
            Element::OrderedList { tight, items }
        } else {
            Element::BulletList { tight, items }
        };
        (i, el)
    }

    fn paragraph(&self, lines: &[&str], start: usize) -> (usize, Element) {
        let mut buf: Vec<&str> = vec![strip_nonindent(lines[start])];
        let mut i = start + 1;
        while i < lines.len() {
            let line = lines[i];
            if is_blank(line)
                || BLOCKQUOTE.is_match(line)
                || ATX.is_match(line)
                || HRULE.is_match(line)
                || FENCE_OPEN.is_match(line)
                || BULLET.is_match(line)
                || ORDERED.is_match(line)
            {
                break;
            }
            buf.push(strip_nonindent(line));
            i += 1;
        }
        let text = buf.join("\n");
        let content = self.inlines(text.trim_end());
        (i, Element::Para(content))
    }
}

fn indented_verbatim(lines: &[&str], start: usize) -> (usize, Element) {
    let mut content: Vec<&str> = Vec::new();
    let mut blanks = 0usize;
    let mut i = start;
    while i < lines.len() {
        let line = lines[i];
        if is_blank(line) {
            blanks += 1;
            i += 1;
            continue;
        }
        match line.strip_prefix("    ") {
            Some(rest) => {
                for _ in 0..blanks {
                    content.push("");
                }
                blanks = 0;
                content.push(rest);
                i += 1;
            }
            None => break,
        }
    }
    (i, Element::Verbatim(joined_verbatim(&content)))
}

fn joined_verbatim(lines: &[&str]) -> String {
    let mut text = lines.join("\n");
    text.push('\n');
    text
}

/// Strip up to three leading spaces (the non-indent allowance).
fn strip_nonindent(line: &str) -> &str {
    let mut rest = line;
    for _ in 0..3 {
        match rest.strip_prefix(' ') {
            Some(r) => rest = r,
            None => break,
        }
    }
    rest
}

/// Strip the two-to-four-space indentation that continues a list item.
fn strip_item_indent(line: &str) -> Option<&str> {
    for width in [4usize, 3, 2] {
        if let Some(rest) = line.strip_prefix(&"    "[..width]) {
            return Some(rest);
        }
    }
    None
}

fn leading_spaces(line: &str) -> usize {
    line.len() - line.trim_start_matches(' ').len()
}

fn interrupts_list(line: &str) -> bool {
    BLOCKQUOTE.is_match(line) || ATX.is_match(line) || FENCE_OPEN.is_match(line)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markdown::ast::tree_string;
    use crate::markdown::peg::parse;
    use crate::markdown::Document;

    fn parse_plain(text: &str) -> Document {
        let refs = ReferenceTable::new();
        let notes = NoteTable::new();
        parse(text, Extensions::NONE, &refs, &notes)
    }

    fn tree(text: &str) -> String {
        tree_string(&parse_plain(text))
    }

    #[test]
    fn atx_heading_levels() {
        let doc = parse_plain("# one\n\n### three\n");
        assert_eq!(doc.children.len(), 2);
        assert!(matches!(
            doc.children[0],
            Element::Heading {
                level: HeadingLevel::H1,
                ..
            }
        ));
        assert!(matches!(
            doc.children[1],
            Element::Heading {
                level: HeadingLevel::H3,
                ..
            }
        ));
    }

    #[test]
    fn atx_requires_space_after_hashes() {
        let doc = parse_plain("#tag\n");
        assert!(matches!(doc.children[0], Element::Para(_)));
    }

    #[test]
    fn atx_trailing_hashes_trimmed() {
        let t = tree("## title ##\n");
        assert!(t.contains("str \"title\""), "tree:\n{t}");
    }

    #[test]
    fn setext_headings() {
        let doc = parse_plain("one\n===\n\ntwo\n---\n");
        assert!(matches!(
            doc.children[0],
            Element::Heading {
                level: HeadingLevel::H1,
                ..
            }
        ));
        assert!(matches!(
            doc.children[1],
            Element::Heading {
                level: HeadingLevel::H2,
                ..
            }
        ));
    }

    #[test]
    fn hrule_variants() {
        for src in ["***\n", "---\n", "___\n", "* * *\n", "- - - -\n"] {
            let doc = parse_plain(src);
            assert_eq!(
                doc.children,
                vec![Element::HorizontalRule],
                "input: {src:?}"
            );
        }
    }

    #[test]
    fn hrule_beats_bullet_list() {
        let doc = parse_plain("* * *\n");
        assert_eq!(doc.children, vec![Element::HorizontalRule]);
    }

    #[test]
    fn blockquote_recurses() {
        let t = tree("> # quoted\n> text\n");
        assert!(t.starts_with("blockquote\n  heading 1\n"), "tree:\n{t}");
    }

    #[test]
    fn nested_blockquote() {
        let t = tree("> > inner\n");
        assert!(t.contains("blockquote\n  blockquote\n"), "tree:\n{t}");
    }

    #[test]
    fn indented_code_block() {
        let doc = parse_plain("    let x = 1;\n    let y = 2;\n");
        assert_eq!(
            doc.children,
            vec![Element::Verbatim("let x = 1;\nlet y = 2;\n".into())]
        );
    }

    #[test]
    fn fenced_code_block() {
        let doc = parse_plain("```\ncode *here*\n```\n");
        assert_eq!(doc.children, vec![Element::Verbatim("code *here*\n".into())]);
    }

    #[test]
    fn unclosed_fence_consumes_rest() {
        let doc = parse_plain("```\na\nb\n");
        assert_eq!(doc.children, vec![Element::Verbatim("a\nb\n".into())]);
    }

    #[test]
    fn tight_list_uses_plain() {
        let t = tree("- a\n- b\n");
        assert!(t.starts_with("bulletlist tight\n"), "tree:\n{t}");
        assert!(t.contains("plain\n"), "tree:\n{t}");
        assert!(!t.contains("para\n"), "tree:\n{t}");
    }

    #[test]
    fn loose_list_uses_para() {
        let t = tree("- a\n\n- b\n");
        assert!(t.starts_with("bulletlist loose\n"), "tree:\n{t}");
        assert!(t.contains("para\n"), "tree:\n{t}");
    }

    #[test]
    fn ordered_list_detected() {
        let t = tree("1. one\n2. two\n");
        assert!(t.starts_with("orderedlist tight\n"), "tree:\n{t}");
    }

    #[test]
    fn nested_list_inside_item() {
        let t = tree("- a\n  - b\n");
        let outer = t.find("bulletlist").unwrap();
        assert!(t[outer + 1..].contains("bulletlist"), "tree:\n{t}");
    }

    #[test]
    fn list_item_second_paragraph_makes_loose() {
        let t = tree("- a\n\n    second\n- b\n");
        assert!(t.starts_with("bulletlist loose\n"), "tree:\n{t}");
    }

    #[test]
    fn html_block_kept_by_default() {
        let doc = parse_plain("<div>\nhello\n</div>\n");
        assert_eq!(
            doc.children,
            vec![Element::HtmlBlock("<div>\nhello\n</div>\n".into())]
        );
    }

    #[test]
    fn html_block_elided_with_filter() {
        let refs = ReferenceTable::new();
        let notes = NoteTable::new();
        let doc = parse(
            "<div>\nx\n</div>\n",
            Extensions::FILTER_HTML,
            &refs,
            &notes,
        );
        assert!(doc.is_empty());
    }

    #[test]
    fn line_initial_autolink_is_not_an_html_block() {
        let doc = parse_plain("<http://example.com/>\n");
        match &doc.children[0] {
            Element::Para(children) => {
                assert!(matches!(children[0], Element::Link(_)), "doc: {doc:?}");
            }
            other => panic!("expected paragraph, got {other:?}"),
        }
        let refs = ReferenceTable::new();
        let notes = NoteTable::new();
        let doc = parse(
            "<me@example.com>\n",
            Extensions::FILTER_HTML,
            &refs,
            &notes,
        );
        assert_eq!(doc.children.len(), 1, "autolinks survive the filter");
    }

    #[test]
    fn style_block_elided_only_with_filter_styles() {
        let refs = ReferenceTable::new();
        let notes = NoteTable::new();
        let src = "<style>p { color: red }</style>\n";
        let kept = parse(src, Extensions::NONE, &refs, &notes);
        assert_eq!(kept.children.len(), 1);
        let dropped = parse(src, Extensions::FILTER_STYLES, &refs, &notes);
        assert!(dropped.is_empty());
        let plain_div = parse("<div>x</div>\n", Extensions::FILTER_STYLES, &refs, &notes);
        assert_eq!(plain_div.children.len(), 1);
    }

    #[test]
    fn reference_definition_becomes_reference_node() {
        let doc = parse_plain("[foo]: /url \"t\"\n");
        assert!(matches!(doc.children[0], Element::Reference(_)));
    }

    #[test]
    fn paragraph_is_the_fallback() {
        let doc = parse_plain("just some text\nacross two lines\n");
        assert_eq!(doc.children.len(), 1);
        assert!(matches!(doc.children[0], Element::Para(_)));
    }

    #[test]
    fn deep_nesting_falls_back_to_literal() {
        let mut src = String::new();
        for _ in 0..(MAX_NESTING + 8) {
            src.push('>');
            src.push(' ');
        }
        src.push_str("x\n");
        // Must terminate and produce a tree; the innermost content stays
        // literal once the depth limit is hit.
        let doc = parse_plain(&src);
        assert!(!doc.is_empty());
    }
}
