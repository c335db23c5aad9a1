//! Groff mm backend
//!
//! Emits input for `groff -mm`. Requests (`.P`, `.H`, `.BL`, ...) must
//! start in column one, so the writer pads to a fresh line before each
//! macro, escapes backslashes as `\e`, and guards text lines that would
//! otherwise begin with a control character by prefixing `\&`.
//!
//! Raw HTML has no groff counterpart and is dropped. Footnotes use the mm
//! `\*F` marker with an `.FS`/`.FE` body, so groff numbers them itself.

use mdpeg_parser::{Document, Element};

use crate::error::FormatError;
use crate::format::Format;

/// The groff mm output format.
pub struct GroffMmFormat;

impl Format for GroffMmFormat {
    fn name(&self) -> &str {
        "groff-mm"
    }

    fn description(&self) -> &str {
        "groff input using the mm macro package"
    }

    fn render(&self, doc: &Document) -> Result<String, FormatError> {
        Ok(write_groff_mm(doc))
    }
}

/// Render a document as groff mm input.
pub fn write_groff_mm(doc: &Document) -> String {
    let mut writer = GroffWriter::default();
    for el in &doc.children {
        writer.block(el);
    }
    writer.out
}

fn escape(text: &str) -> String {
    text.replace('\\', "\\e")
}

#[derive(Default)]
struct GroffWriter {
    out: String,
}

impl GroffWriter {
    fn pad(&mut self, n: usize) {
        if self.out.is_empty() {
            return;
        }
        let have = self.out.chars().rev().take_while(|&c| c == '\n').count();
        for _ in have..n {
            self.out.push('\n');
        }
    }

    /// Emit a request on its own line.
    fn request(&mut self, req: &str) {
        self.pad(1);
        self.out.push_str(req);
        self.out.push('\n');
    }

    /// Emit text, guarding lines that would start with a control character.
    fn push_text(&mut self, text: &str) {
        for (i, line) in text.split('\n').enumerate() {
            if i > 0 {
                self.out.push('\n');
            }
            if (self.out.is_empty() || self.out.ends_with('\n'))
                && (line.starts_with('.') || line.starts_with('\''))
            {
                self.out.push_str("\\&");
            }
            self.out.push_str(line);
        }
    }

    fn block(&mut self, el: &Element) {
        match el {
            Element::Para(children) => {
                self.request(".P");
                self.inlines(children);
            }
            Element::Plain(children) => {
                self.pad(1);
                self.inlines(children);
            }
            Element::Heading { level, content } => {
                let mut title = GroffWriter::default();
                title.inlines(content);
                let title = title.out.replace('\n', " ").replace('"', "\\(dq");
                self.request(&format!(".H {} \"{}\"", level.depth(), title));
            }
            Element::BlockQuote(children) => {
                self.request(".DS I");
                for child in children {
                    self.block(child);
                }
                self.request(".DE");
            }
            Element::Verbatim(text) => {
                self.request(".VERBON 2");
                self.push_text(&escape(text));
                self.request(".VERBOFF");
            }
            Element::HtmlBlock(_) => {}
            Element::HorizontalRule => {
                self.pad(1);
                self.out.push_str("\\l'\\n(.lu'");
            }
            Element::BulletList { items, .. } => {
                self.request(".BL");
                for item in items {
                    self.block(item);
                }
                self.request(".LE 1");
            }
            Element::OrderedList { items, .. } => {
                self.request(".AL");
                for item in items {
                    self.block(item);
                }
                self.request(".LE 1");
            }
            Element::ListItem(children) => {
                self.request(".LI");
                for (i, child) in children.iter().enumerate() {
                    match child {
                        Element::Plain(inlines) | Element::Para(inlines) if i == 0 => {
                            self.inlines(inlines)
                        }
                        other => self.block(other),
                    }
                }
            }
            Element::Reference(_) => {}
            other => self.inline(other),
        }
    }

    fn inlines(&mut self, children: &[Element]) {
        for el in children {
            self.inline(el);
        }
    }

    fn inline(&mut self, el: &Element) {
        match el {
            Element::Str(text) => self.push_text(&escape(text)),
            Element::Raw(_) => unreachable!("raw node in a finished document"),
            Element::Space => self.out.push(' '),
            Element::LineBreak => self.request(".br"),
            Element::Emph(children) => self.font("\\fI", children),
            Element::Strong(children) => self.font("\\fB", children),
            Element::Code(text) => {
                self.out.push_str("\\fC");
                self.push_text(&escape(text));
                self.out.push_str("\\fR");
            }
            Element::Html(_) => {}
            Element::Link(link) => {
                self.inlines(&link.label);
                self.push_text(" (");
                self.push_text(&escape(&link.url));
                self.push_text(")");
            }
            Element::Image(link) => {
                self.push_text("[IMAGE: ");
                self.inlines(&link.label);
                self.push_text(" (");
                self.push_text(&escape(&link.url));
                self.push_text(")]");
            }
            Element::Ellipsis => self.push_text("..."),
            Element::EmDash => self.out.push_str("\\(em"),
            Element::EnDash => self.out.push_str("\\(en"),
            Element::Apostrophe => self.out.push('\''),
            Element::SingleQuoted(children) => {
                self.out.push_str("\\(oq");
                self.inlines(children);
                self.out.push_str("\\(cq");
            }
            Element::DoubleQuoted(children) => {
                self.out.push_str("\\(lq");
                self.inlines(children);
                self.out.push_str("\\(rq");
            }
            Element::Note { content, .. } => {
                self.out.push_str("\\*F");
                self.request(".FS");
                for el in content {
                    self.block(el);
                }
                self.request(".FE");
            }
            Element::Reference(_) => {}
            other => self.block(other),
        }
    }

    fn font(&mut self, open: &str, children: &[Element]) {
        self.out.push_str(open);
        self.inlines(children);
        self.out.push_str("\\fR");
    }
}
