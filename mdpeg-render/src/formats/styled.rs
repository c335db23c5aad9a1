//! Styled-run backend
//!
//! Flattens a document into a sequence of text runs, each carrying fully
//! resolved visual attributes, for consumers that build rich text (GUI
//! text views, PDF layout) rather than markup. Adjacent runs with equal
//! attributes are merged; blocks are separated by a blank line in the base
//! style.
//!
//! Raw HTML has no visual counterpart here and is dropped. Footnote
//! markers are numbered in order of first reference and the referenced
//! bodies are appended after the last block.

use mdpeg_parser::{text_of, Document, Element};
use serde::Serialize;

use crate::styles::{StyleAttributes, StyleSheet};

/// One run of uniformly styled text.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StyledRun {
    pub text: String,
    pub style: StyleAttributes,
}

/// Render a document as styled runs using the given sheet.
pub fn write_styled(doc: &Document, sheet: &StyleSheet) -> Vec<StyledRun> {
    let mut renderer = StyledRenderer {
        sheet,
        runs: Vec::new(),
        notes_used: Vec::new(),
    };
    let base = sheet.base.clone();
    for el in &doc.children {
        renderer.block(el, &base);
    }
    renderer.finish()
}

struct StyledRenderer<'a> {
    sheet: &'a StyleSheet,
    runs: Vec<StyledRun>,
    /// Referenced notes in order of first reference: (label, body).
    notes_used: Vec<(String, Vec<Element>)>,
}

impl<'a> StyledRenderer<'a> {
    fn push(&mut self, text: &str, style: &StyleAttributes) {
        if text.is_empty() {
            return;
        }
        if let Some(last) = self.runs.last_mut() {
            if last.style == *style {
                last.text.push_str(text);
                return;
            }
        }
        self.runs.push(StyledRun {
            text: text.to_string(),
            style: style.clone(),
        });
    }

    /// Blank-line separation before a block, except at the very start.
    fn pad(&mut self) {
        let sheet = self.sheet;
        if !self.runs.is_empty() {
            self.push("\n\n", &sheet.base);
        }
    }

    fn block(&mut self, el: &Element, inherited: &StyleAttributes) {
        let sheet = self.sheet;
        match el {
            Element::Para(children) | Element::Plain(children) => {
                self.pad();
                self.inlines(children, inherited);
            }
            Element::Heading { level, content } => {
                self.pad();
                let style = inherited.merge(sheet.heading(level.depth()));
                self.inlines(content, &style);
            }
            Element::BlockQuote(children) => {
                let style = inherited.merge(&sheet.quote);
                for child in children {
                    self.block(child, &style);
                }
            }
            Element::Verbatim(text) => {
                self.pad();
                let style = inherited.merge(&sheet.code);
                self.push(text.trim_end_matches('\n'), &style);
            }
            Element::HtmlBlock(_) => {}
            Element::HorizontalRule => {
                self.pad();
                self.push(&"\u{2500}".repeat(24), inherited);
            }
            Element::BulletList { items, .. } => {
                for item in items {
                    self.pad();
                    self.push("\u{2022} ", inherited);
                    self.item(item, inherited);
                }
            }
            Element::OrderedList { items, .. } => {
                for (i, item) in items.iter().enumerate() {
                    self.pad();
                    self.push(&format!("{}. ", i + 1), inherited);
                    self.item(item, inherited);
                }
            }
            Element::ListItem(_) => self.item(el, inherited),
            Element::Reference(_) => {}
            other => self.inline(other, inherited),
        }
    }

    /// Item content directly after a marker: the leading paragraph joins
    /// the marker's line, further blocks separate as usual.
    fn item(&mut self, item: &Element, inherited: &StyleAttributes) {
        let children = match item {
            Element::ListItem(children) => children.as_slice(),
            other => std::slice::from_ref(other),
        };
        for (i, child) in children.iter().enumerate() {
            match child {
                Element::Plain(inlines) | Element::Para(inlines) if i == 0 => {
                    self.inlines(inlines, inherited)
                }
                other => self.block(other, inherited),
            }
        }
    }

    fn inlines(&mut self, children: &[Element], style: &StyleAttributes) {
        for el in children {
            self.inline(el, style);
        }
    }

    fn inline(&mut self, el: &Element, style: &StyleAttributes) {
        let sheet = self.sheet;
        match el {
            Element::Str(text) => self.push(text, style),
            Element::Raw(_) => unreachable!("raw node in a finished document"),
            Element::Space => self.push(" ", style),
            Element::LineBreak => self.push("\n", style),
            Element::Emph(children) => {
                let style = style.merge(&sheet.emph);
                self.inlines(children, &style);
            }
            Element::Strong(children) => {
                let style = style.merge(&sheet.strong);
                self.inlines(children, &style);
            }
            Element::Code(text) => {
                let style = style.merge(&sheet.code);
                self.push(text, &style);
            }
            Element::Html(_) => {}
            Element::Link(link) => {
                let mut style = style.merge(&sheet.link);
                style.link = Some(link.url.clone());
                self.inlines(&link.label, &style);
            }
            Element::Image(link) => {
                let mut style = style.merge(&sheet.link);
                style.link = Some(link.url.clone());
                self.push(&text_of(&link.label), &style);
            }
            Element::Ellipsis => self.push("\u{2026}", style),
            Element::EmDash => self.push("\u{2014}", style),
            Element::EnDash => self.push("\u{2013}", style),
            Element::Apostrophe => self.push("\u{2019}", style),
            Element::SingleQuoted(children) => {
                self.push("\u{2018}", style);
                self.inlines(children, style);
                self.push("\u{2019}", style);
            }
            Element::DoubleQuoted(children) => {
                self.push("\u{201c}", style);
                self.inlines(children, style);
                self.push("\u{201d}", style);
            }
            Element::Note { label, content } => {
                let number = match self.notes_used.iter().position(|(l, _)| l == label) {
                    Some(idx) => idx + 1,
                    None => {
                        self.notes_used.push((label.clone(), content.clone()));
                        self.notes_used.len()
                    }
                };
                let style = style.merge(&sheet.note);
                self.push(&format!("[{number}]"), &style);
            }
            Element::Reference(_) => {}
            other => self.block(other, style),
        }
    }

    fn finish(mut self) -> Vec<StyledRun> {
        if !self.notes_used.is_empty() {
            let sheet = self.sheet;
            let base = sheet.base.clone();
            let notes = std::mem::take(&mut self.notes_used);
            for (i, (_, content)) in notes.iter().enumerate() {
                self.pad();
                let marker = base.merge(&sheet.note);
                self.push(&format!("[{}] ", i + 1), &marker);
                for (j, el) in content.iter().enumerate() {
                    match el {
                        Element::Plain(inlines) | Element::Para(inlines) if j == 0 => {
                            self.inlines(inlines, &base)
                        }
                        other => self.block(other, &base),
                    }
                }
            }
        }
        self.runs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::styles::{FontStyle, FontWeight};
    use mdpeg_parser::Link;

    fn styled(children: Vec<Element>) -> Vec<StyledRun> {
        let doc = Document {
            children: vec![Element::Para(children)],
        };
        write_styled(&doc, &StyleSheet::default())
    }

    #[test]
    fn empty_document_has_no_runs() {
        assert!(write_styled(&Document::default(), &StyleSheet::default()).is_empty());
    }

    #[test]
    fn plain_text_is_one_base_run() {
        let runs = styled(vec![
            Element::Str("a".into()),
            Element::Space,
            Element::Str("b".into()),
        ]);
        assert_eq!(runs.len(), 1);
        assert_eq!(runs[0].text, "a b");
        assert_eq!(runs[0].style.font_weight, Some(FontWeight::Normal));
    }

    #[test]
    fn emphasis_splits_runs_and_inherits() {
        let runs = styled(vec![
            Element::Str("a ".into()),
            Element::Emph(vec![Element::Str("b".into())]),
        ]);
        assert_eq!(runs.len(), 2);
        assert_eq!(runs[1].text, "b");
        assert_eq!(runs[1].style.font_style, Some(FontStyle::Italic));
        // Unchanged attributes inherit from the base.
        assert_eq!(runs[1].style.font_weight, Some(FontWeight::Normal));
    }

    #[test]
    fn strong_inside_emph_accumulates() {
        let runs = styled(vec![Element::Emph(vec![Element::Strong(vec![
            Element::Str("x".into()),
        ])])]);
        assert_eq!(runs.len(), 1);
        assert_eq!(runs[0].style.font_style, Some(FontStyle::Italic));
        assert_eq!(runs[0].style.font_weight, Some(FontWeight::Bold));
    }

    #[test]
    fn links_carry_their_target() {
        let runs = styled(vec![Element::Link(Link {
            label: vec![Element::Str("here".into())],
            url: "/u".into(),
            title: String::new(),
        })]);
        assert_eq!(runs[0].style.link.as_deref(), Some("/u"));
        assert_eq!(runs[0].style.underline, Some(true));
    }

    #[test]
    fn blocks_separate_with_blank_line() {
        let doc = Document {
            children: vec![
                Element::Para(vec![Element::Str("one".into())]),
                Element::Para(vec![Element::Str("two".into())]),
            ],
        };
        let runs = write_styled(&doc, &StyleSheet::default());
        let text: String = runs.iter().map(|r| r.text.as_str()).collect();
        assert_eq!(text, "one\n\ntwo");
        // Same style throughout, so everything merges into one run.
        assert_eq!(runs.len(), 1);
    }

    #[test]
    fn note_markers_number_by_first_reference() {
        let note = |label: &str| Element::Note {
            label: label.into(),
            content: vec![Element::Para(vec![Element::Str(format!("{label} body"))])],
        };
        let doc = Document {
            children: vec![Element::Para(vec![
                note("b"),
                Element::Space,
                note("a"),
                Element::Space,
                note("b"),
            ])],
        };
        let runs = write_styled(&doc, &StyleSheet::default());
        let text: String = runs.iter().map(|r| r.text.as_str()).collect();
        assert!(text.starts_with("[1] [2] [1]"), "text: {text:?}");
        assert!(text.contains("[1] b body"), "text: {text:?}");
        assert!(text.contains("[2] a body"), "text: {text:?}");
    }
}
