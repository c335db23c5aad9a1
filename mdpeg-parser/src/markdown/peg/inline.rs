//! Inline grammar.
//!
//!     A recursive-descent parser over one paragraph's worth of text. The
//!     dispatch in `inline` keys on the character at the current position;
//!     rules that can fail after consuming input (emphasis, code spans,
//!     links, quoted spans) go through `apply`, which memoizes the outcome
//!     per (rule, byte position). Without the memo, a run of N unmatched
//!     `*` delimiters costs O(N^2) reparses; with it, each rule is attempted
//!     at each position at most once.
//!
//!     Nothing here can fail the parse as a whole: when every rule declines
//!     a position, the character there becomes literal text and scanning
//!     moves on.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;

use super::block::is_style_markup;
use super::MAX_NESTING;
use crate::markdown::ast::{Element, Link};
use crate::markdown::extensions::Extensions;
use crate::markdown::notes::NoteTable;
use crate::markdown::references::ReferenceTable;

static AUTOLINK_URL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^<([A-Za-z][A-Za-z0-9+.-]*://[^<>\s]+)>").expect("autolink url"));
static AUTOLINK_EMAIL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^<([^<>\s@]+@[^<>\s@]+\.[^<>\s@]+)>").expect("autolink email")
});
static INLINE_HTML: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^<(?:!--(?s:.)*?--|/?[A-Za-z][^<>]*)>").expect("inline html"));
static ENTITY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^&(?:#[0-9]{1,8}|#[xX][0-9A-Fa-f]{1,8}|[A-Za-z][A-Za-z0-9]{1,31});")
        .expect("entity pattern")
});

/// Parse one stretch of inline text into a node sequence.
pub(crate) fn parse_inlines(
    src: &str,
    extensions: Extensions,
    references: &ReferenceTable,
    notes: &NoteTable,
) -> Vec<Element> {
    InlineParser::new(src, extensions, references, notes, 0).run()
}

/// Memoized rules. Only rules that can scan ahead and fail are listed;
/// rules that decide on a bounded prefix (escapes, entities, autolinks)
/// are cheap enough to re-run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Rule {
    StrongStar,
    StrongUnder,
    EmphStar,
    EmphUnder,
    Code,
    Link,
    Image,
    NoteRef,
    SingleQuoted,
    DoubleQuoted,
}

struct InlineParser<'a> {
    src: &'a str,
    extensions: Extensions,
    references: &'a ReferenceTable,
    notes: &'a NoteTable,
    memo: HashMap<(Rule, usize), Option<(usize, Element)>>,
    depth: usize,
    /// Set when an attempt was cut short by the depth limit. Such attempts
    /// are not memoized: their failure is an artifact of where they were
    /// reached from, not of the input.
    cutoff: bool,
}

impl<'a> InlineParser<'a> {
    fn new(
        src: &'a str,
        extensions: Extensions,
        references: &'a ReferenceTable,
        notes: &'a NoteTable,
        depth: usize,
    ) -> Self {
        Self {
            src,
            extensions,
            references,
            notes,
            memo: HashMap::new(),
            depth,
            cutoff: false,
        }
    }

    fn run(&mut self) -> Vec<Element> {
        let mut out = Vec::new();
        let mut pos = 0;
        while pos < self.src.len() {
            self.cutoff = false;
            match self.inline(pos) {
                Some((next, el)) if next > pos => {
                    push_node(&mut out, el);
                    pos = next;
                }
                _ => {
                    // Every rule declined; the character is literal text.
                    match self.char_at(pos) {
                        Some(ch) => {
                            push_node(&mut out, Element::Str(ch.to_string()));
                            pos += ch.len_utf8();
                        }
                        None => break,
                    }
                }
            }
        }
        out
    }

    fn rest(&self, pos: usize) -> &'a str {
        self.src.get(pos..).unwrap_or("")
    }

    fn char_at(&self, pos: usize) -> Option<char> {
        self.rest(pos).chars().next()
    }

    fn starts_with(&self, pos: usize, pat: &str) -> bool {
        self.rest(pos).starts_with(pat)
    }

    fn smart(&self) -> bool {
        self.extensions.contains(Extensions::SMART)
    }

    /// Ordered choice over the inline rules at `pos`, keyed on the current
    /// character. Returns `None` when nothing matches.
    fn inline(&mut self, pos: usize) -> Option<(usize, Element)> {
        let ch = self.char_at(pos)?;
        match ch {
            '\\' => self.escape(pos),
            '\n' => Some((pos + 1, Element::Space)),
            ' ' | '\t' => self.whitespace(pos),
            '*' => self
                .apply(Rule::StrongStar, pos)
                .or_else(|| self.apply(Rule::EmphStar, pos)),
            '_' => self
                .apply(Rule::StrongUnder, pos)
                .or_else(|| self.apply(Rule::EmphUnder, pos)),
            '`' => self.apply(Rule::Code, pos),
            '!' => self.apply(Rule::Image, pos),
            '[' => {
                if self.extensions.contains(Extensions::NOTES) && self.starts_with(pos, "[^") {
                    self.apply(Rule::NoteRef, pos)
                        .or_else(|| self.apply(Rule::Link, pos))
                } else {
                    self.apply(Rule::Link, pos)
                }
            }
            '<' => self.angle(pos),
            '&' => self.entity(pos),
            '.' if self.smart() => self.ellipsis(pos),
            '-' if self.smart() => self.dashes(pos),
            '\'' if self.smart() => self.apostrophe_or_quote(pos),
            '"' if self.smart() => self.apply(Rule::DoubleQuoted, pos),
            _ => self.str_run(pos),
        }
    }

    /// Run `rule` at `pos` through the memo table and the depth limit.
    fn apply(&mut self, rule: Rule, pos: usize) -> Option<(usize, Element)> {
        if let Some(cached) = self.memo.get(&(rule, pos)) {
            return cached.clone();
        }
        if self.depth >= MAX_NESTING {
            self.cutoff = true;
            return None;
        }
        let was_cut = self.cutoff;
        self.cutoff = false;
        self.depth += 1;
        let result = match rule {
            Rule::StrongStar => self.strong(pos, '*'),
            Rule::StrongUnder => self.strong(pos, '_'),
            Rule::EmphStar => self.emph(pos, '*'),
            Rule::EmphUnder => self.emph(pos, '_'),
            Rule::Code => self.code_span(pos),
            Rule::Link => self.link(pos),
            Rule::Image => self.image(pos),
            Rule::NoteRef => self.note_ref(pos),
            Rule::SingleQuoted => self.quoted(pos, '\'', Element::SingleQuoted),
            Rule::DoubleQuoted => self.quoted(pos, '"', Element::DoubleQuoted),
        };
        self.depth -= 1;
        if !self.cutoff {
            self.memo.insert((rule, pos), result.clone());
        }
        self.cutoff |= was_cut;
        result
    }

    fn escape(&self, pos: usize) -> Option<(usize, Element)> {
        let next = self.char_at(pos + 1)?;
        if next == '\n' {
            return Some((pos + 2, Element::LineBreak));
        }
        if next.is_ascii_punctuation() {
            return Some((pos + 2, Element::Str(next.to_string())));
        }
        Some((pos + 1, Element::Str("\\".to_string())))
    }

    /// A run of spaces and tabs. Two or more directly before a newline is a
    /// hard line break.
    fn whitespace(&self, pos: usize) -> Option<(usize, Element)> {
        let bytes = self.src.as_bytes();
        let mut end = pos;
        while end < bytes.len() && (bytes[end] == b' ' || bytes[end] == b'\t') {
            end += 1;
        }
        if end - pos >= 2 && bytes.get(end) == Some(&b'\n') {
            return Some((end + 1, Element::LineBreak));
        }
        Some((end, Element::Space))
    }

    fn strong(&mut self, pos: usize, delim: char) -> Option<(usize, Element)> {
        let opener = if delim == '*' { "**" } else { "__" };
        if !self.starts_with(pos, opener) {
            return None;
        }
        let first = self.char_at(pos + 2)?;
        if first.is_whitespace() {
            return None;
        }
        let mut children = Vec::new();
        let mut p = pos + 2;
        let mut prev_ws = false;
        while p < self.src.len() {
            if self.starts_with(p, opener) && !children.is_empty() && !prev_ws {
                return Some((p + 2, Element::Strong(children)));
            }
            match self.inline(p) {
                Some((next, el)) if next > p => {
                    prev_ws = matches!(el, Element::Space | Element::LineBreak);
                    push_node(&mut children, el);
                    p = next;
                }
                _ => {
                    let ch = self.char_at(p)?;
                    prev_ws = ch.is_whitespace();
                    push_node(&mut children, Element::Str(ch.to_string()));
                    p += ch.len_utf8();
                }
            }
        }
        None
    }

    fn emph(&mut self, pos: usize, delim: char) -> Option<(usize, Element)> {
        if self.char_at(pos)? != delim {
            return None;
        }
        let first = self.char_at(pos + 1)?;
        if first.is_whitespace() || first == delim {
            return None;
        }
        let strong_rule = if delim == '*' {
            Rule::StrongStar
        } else {
            Rule::StrongUnder
        };
        let mut children = Vec::new();
        let mut p = pos + 1;
        let mut prev_ws = false;
        while p < self.src.len() {
            if self.char_at(p) == Some(delim) {
                // A doubled delimiter here is nested strong, not our closer.
                if self.char_at(p + 1) == Some(delim) {
                    if let Some((next, el)) = self.apply(strong_rule, p) {
                        prev_ws = false;
                        push_node(&mut children, el);
                        p = next;
                        continue;
                    }
                }
                if !children.is_empty() && !prev_ws {
                    return Some((p + 1, Element::Emph(children)));
                }
                prev_ws = false;
                push_node(&mut children, Element::Str(delim.to_string()));
                p += 1;
                continue;
            }
            match self.inline(p) {
                Some((next, el)) if next > p => {
                    prev_ws = matches!(el, Element::Space | Element::LineBreak);
                    push_node(&mut children, el);
                    p = next;
                }
                _ => {
                    let ch = self.char_at(p)?;
                    prev_ws = ch.is_whitespace();
                    push_node(&mut children, Element::Str(ch.to_string()));
                    p += ch.len_utf8();
                }
            }
        }
        None
    }

    /// A code span opened by K backticks closes at the next run of exactly K
    /// backticks. Content keeps backtick runs of other lengths literally.
    fn code_span(&self, pos: usize) -> Option<(usize, Element)> {
        let bytes = self.src.as_bytes();
        let mut open_end = pos;
        while open_end < bytes.len() && bytes[open_end] == b'`' {
            open_end += 1;
        }
        let ticks = open_end - pos;
        if ticks == 0 {
            return None;
        }
        let mut p = open_end;
        while p < bytes.len() {
            if bytes[p] == b'`' {
                let mut run_end = p;
                while run_end < bytes.len() && bytes[run_end] == b'`' {
                    run_end += 1;
                }
                if run_end - p == ticks {
                    let content = self.src[open_end..p].trim().replace('\n', " ");
                    return Some((run_end, Element::Code(content)));
                }
                p = run_end;
            } else {
                p += 1;
            }
        }
        None
    }

    fn link(&mut self, pos: usize) -> Option<(usize, Element)> {
        let (next, link) = self.link_body(pos)?;
        Some((next, Element::Link(link)))
    }

    fn image(&mut self, pos: usize) -> Option<(usize, Element)> {
        if self.char_at(pos)? != '!' {
            return None;
        }
        let (next, link) = self.link_body(pos + 1)?;
        Some((next, Element::Image(link)))
    }

    /// The shared body of links and images: a bracketed label followed by an
    /// inline `(url "title")`, a `[reference]`, or nothing (shortcut form).
    /// Reference forms that fail to resolve decline the whole construct, so
    /// the brackets stay literal.
    fn link_body(&mut self, pos: usize) -> Option<(usize, Link)> {
        let label_end = self.matching_bracket(pos)?;
        let label_src = self.src[pos + 1..label_end].to_string();
        let after = label_end + 1;
        if self.char_at(after) == Some('(') {
            if let Some((next, url, title)) = self.url_and_title(after) {
                let label = self.sub_inlines(&label_src);
                return Some((next, Link { label, url, title }));
            }
        }
        if self.char_at(after) == Some('[') {
            if let Some(ref_end) = self.matching_bracket(after) {
                let ref_src = &self.src[after + 1..ref_end];
                let key = if ref_src.trim().is_empty() {
                    label_src.clone()
                } else {
                    ref_src.to_string()
                };
                let references = self.references;
                let def = references.lookup(&key)?;
                let url = def.url.clone();
                let title = def.title.clone();
                let label = self.sub_inlines(&label_src);
                return Some((ref_end + 1, Link { label, url, title }));
            }
        }
        let references = self.references;
        let def = references.lookup(&label_src)?;
        let url = def.url.clone();
        let title = def.title.clone();
        let label = self.sub_inlines(&label_src);
        Some((after, Link { label, url, title }))
    }

    fn note_ref(&mut self, pos: usize) -> Option<(usize, Element)> {
        if !self.starts_with(pos, "[^") {
            return None;
        }
        let end = self.matching_bracket(pos)?;
        let label = &self.src[pos + 2..end];
        let notes = self.notes;
        let def = notes.lookup(label)?;
        Some((
            end + 1,
            Element::Note {
                label: def.label.clone(),
                content: def.content.clone(),
            },
        ))
    }

    /// Find the `]` matching the `[` at `pos`, honoring nesting and
    /// backslash escapes.
    fn matching_bracket(&self, pos: usize) -> Option<usize> {
        if self.char_at(pos)? != '[' {
            return None;
        }
        let bytes = self.src.as_bytes();
        let mut depth = 0usize;
        let mut p = pos;
        while p < bytes.len() {
            match bytes[p] {
                b'\\' => p += 2,
                b'[' => {
                    depth += 1;
                    p += 1;
                }
                b']' => {
                    depth -= 1;
                    if depth == 0 {
                        return Some(p);
                    }
                    p += 1;
                }
                _ => p += 1,
            }
        }
        None
    }

    /// Consume `(url "title")` starting at the `(` at `pos`.
    fn url_and_title(&self, pos: usize) -> Option<(usize, String, String)> {
        let bytes = self.src.as_bytes();
        let mut depth = 0usize;
        let mut p = pos;
        let close = loop {
            if p >= bytes.len() {
                return None;
            }
            match bytes[p] {
                b'\\' => p += 2,
                b'(' => {
                    depth += 1;
                    p += 1;
                }
                b')' => {
                    depth -= 1;
                    if depth == 0 {
                        break p;
                    }
                    p += 1;
                }
                _ => p += 1,
            }
        };
        let inner = self.src[pos + 1..close].trim();
        let (url, title) = split_url_title(inner);
        Some((close + 1, url, title))
    }

    /// Parse a label's own inline content with a fresh parser sharing the
    /// same tables and depth.
    fn sub_inlines(&mut self, src: &str) -> Vec<Element> {
        InlineParser::new(src, self.extensions, self.references, self.notes, self.depth).run()
    }

    fn angle(&mut self, pos: usize) -> Option<(usize, Element)> {
        let rest = self.rest(pos);
        if let Some(caps) = AUTOLINK_URL.captures(rest) {
            let whole = caps.get(0)?;
            let url = caps.get(1)?.as_str().to_string();
            return Some((
                pos + whole.len(),
                Element::Link(Link {
                    label: vec![Element::Str(url.clone())],
                    url,
                    title: String::new(),
                }),
            ));
        }
        if let Some(caps) = AUTOLINK_EMAIL.captures(rest) {
            let whole = caps.get(0)?;
            let addr = caps.get(1)?.as_str().to_string();
            return Some((
                pos + whole.len(),
                Element::Link(Link {
                    label: vec![Element::Str(addr.clone())],
                    url: format!("mailto:{addr}"),
                    title: String::new(),
                }),
            ));
        }
        if let Some(m) = INLINE_HTML.find(rest) {
            let elide = self.extensions.contains(Extensions::FILTER_HTML)
                || (self.extensions.contains(Extensions::FILTER_STYLES)
                    && is_style_markup(m.as_str()));
            let el = if elide {
                // Zero-width: push_node drops empty strings.
                Element::Str(String::new())
            } else {
                Element::Html(m.as_str().to_string())
            };
            return Some((pos + m.end(), el));
        }
        None
    }

    /// HTML entities pass through as raw markup, exempt from filtering.
    fn entity(&self, pos: usize) -> Option<(usize, Element)> {
        let m = ENTITY.find(self.rest(pos))?;
        Some((pos + m.end(), Element::Html(m.as_str().to_string())))
    }

    fn ellipsis(&self, pos: usize) -> Option<(usize, Element)> {
        if self.starts_with(pos, "...") {
            Some((pos + 3, Element::Ellipsis))
        } else {
            None
        }
    }

    fn dashes(&self, pos: usize) -> Option<(usize, Element)> {
        if self.starts_with(pos, "---") {
            Some((pos + 3, Element::EmDash))
        } else if self.starts_with(pos, "--") {
            Some((pos + 2, Element::EnDash))
        } else {
            None
        }
    }

    fn apostrophe_or_quote(&mut self, pos: usize) -> Option<(usize, Element)> {
        let prev_alnum = self
            .src
            .get(..pos)
            .and_then(|s| s.chars().last())
            .map(char::is_alphanumeric)
            .unwrap_or(false);
        let next_alnum = self
            .char_at(pos + 1)
            .map(char::is_alphanumeric)
            .unwrap_or(false);
        if prev_alnum && next_alnum {
            return Some((pos + 1, Element::Apostrophe));
        }
        if prev_alnum {
            return None;
        }
        self.apply(Rule::SingleQuoted, pos)
    }

    fn quoted(
        &mut self,
        pos: usize,
        delim: char,
        wrap: fn(Vec<Element>) -> Element,
    ) -> Option<(usize, Element)> {
        if self.char_at(pos)? != delim {
            return None;
        }
        let first = self.char_at(pos + 1)?;
        if first.is_whitespace() {
            return None;
        }
        let mut children = Vec::new();
        let mut p = pos + 1;
        while p < self.src.len() {
            if self.char_at(p) == Some(delim) && !children.is_empty() {
                return Some((p + 1, wrap(children)));
            }
            match self.inline(p) {
                Some((next, el)) if next > p => {
                    push_node(&mut children, el);
                    p = next;
                }
                _ => {
                    let ch = self.char_at(p)?;
                    push_node(&mut children, Element::Str(ch.to_string()));
                    p += ch.len_utf8();
                }
            }
        }
        None
    }

    /// A maximal run of ordinary characters.
    fn str_run(&self, pos: usize) -> Option<(usize, Element)> {
        let rest = self.rest(pos);
        let mut end = 0;
        for ch in rest.chars() {
            if self.is_special(ch) {
                break;
            }
            end += ch.len_utf8();
        }
        if end == 0 {
            return None;
        }
        Some((pos + end, Element::Str(rest[..end].to_string())))
    }

    fn is_special(&self, ch: char) -> bool {
        match ch {
            '\\' | '\n' | ' ' | '\t' | '*' | '_' | '`' | '!' | '[' | ']' | '<' | '&' => true,
            '.' | '-' | '\'' | '"' => self.smart(),
            _ => false,
        }
    }
}

/// Append a node, merging adjacent literal text, dropping empty text, and
/// collapsing whitespace after whitespace.
fn push_node(out: &mut Vec<Element>, el: Element) {
    match el {
        Element::Str(s) if s.is_empty() => {}
        Element::Str(s) => {
            if let Some(Element::Str(prev)) = out.last_mut() {
                prev.push_str(&s);
            } else {
                out.push(Element::Str(s));
            }
        }
        Element::Space => match out.last() {
            Some(Element::Space) | Some(Element::LineBreak) => {}
            _ => out.push(Element::Space),
        },
        other => out.push(other),
    }
}

/// Split an inline link destination into URL and title. The URL may be
/// wrapped in `<...>`; the title, when present, is separated from it by
/// whitespace and delimited with `"..."`, `'...'`, or `(...)`, the same
/// shapes a reference definition line accepts.
fn split_url_title(inner: &str) -> (String, String) {
    let inner = inner.trim();
    let mut url = inner;
    let mut title = "";
    for (open, close) in [('"', '"'), ('\'', '\''), ('(', ')')] {
        if inner.len() >= 2 && inner.ends_with(close) {
            if let Some(start) = inner[..inner.len() - 1].rfind(open) {
                let before = inner[..start].trim_end();
                if !before.is_empty() && before.len() < start {
                    url = before;
                    title = &inner[start + 1..inner.len() - 1];
                    break;
                }
            }
        }
    }
    let url = url
        .strip_prefix('<')
        .and_then(|u| u.strip_suffix('>'))
        .unwrap_or(url);
    (url.to_string(), title.to_string())
}
