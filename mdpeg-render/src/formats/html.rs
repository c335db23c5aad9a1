//! HTML backend
//!
//! Output spacing follows a padding discipline: every block asks for the
//! number of newlines it wants before itself via `pad`, which tops up
//! whatever the previous block already emitted. The document therefore
//! never starts or ends with blank lines and blocks are separated by
//! exactly one.
//!
//! Footnote markers are numbered in order of first reference, not
//! definition order; the referenced bodies are collected while walking the
//! tree and emitted as an ordered list after the last block.

use html_escape::{encode_double_quoted_attribute, encode_safe};
use mdpeg_parser::{text_of, Document, Element, Link};

use crate::error::FormatError;
use crate::format::Format;

/// The HTML output format.
pub struct HtmlFormat;

impl Format for HtmlFormat {
    fn name(&self) -> &str {
        "html"
    }

    fn description(&self) -> &str {
        "HTML fragment output"
    }

    fn render(&self, doc: &Document) -> Result<String, FormatError> {
        Ok(write_html(doc))
    }
}

/// Render a document as an HTML fragment.
pub fn write_html(doc: &Document) -> String {
    let mut writer = HtmlWriter::default();
    for el in &doc.children {
        writer.block(el);
    }
    writer.finish()
}

#[derive(Default)]
struct HtmlWriter {
    out: String,
    /// Padding already owed to the next block; lets a container satisfy
    /// its first child's pad request without emitting blank lines.
    credit: usize,
    /// Referenced notes in order of first reference: (label, body).
    notes_used: Vec<(String, Vec<Element>)>,
}

impl HtmlWriter {
    /// Ensure at least `n` newlines precede whatever comes next. No-op at
    /// the start of the document.
    fn pad(&mut self, n: usize) {
        let credit = std::mem::take(&mut self.credit);
        if self.out.is_empty() {
            return;
        }
        let have = self.out.chars().rev().take_while(|&c| c == '\n').count() + credit;
        for _ in have..n {
            self.out.push('\n');
        }
    }

    fn block(&mut self, el: &Element) {
        match el {
            Element::Para(children) => {
                self.pad(2);
                self.out.push_str("<p>");
                self.inlines(children);
                self.out.push_str("</p>");
            }
            Element::Plain(children) => {
                self.pad(2);
                self.inlines(children);
            }
            Element::Heading { level, content } => {
                self.pad(2);
                let depth = level.depth();
                self.out.push_str(&format!("<h{depth}>"));
                self.inlines(content);
                self.out.push_str(&format!("</h{depth}>"));
            }
            Element::BlockQuote(children) => {
                self.pad(2);
                self.out.push_str("<blockquote>");
                self.credit = 1;
                for child in children {
                    self.block(child);
                }
                self.pad(1);
                self.out.push_str("</blockquote>");
            }
            Element::Verbatim(text) => {
                self.pad(2);
                self.out.push_str("<pre><code>");
                self.out.push_str(&encode_safe(text));
                self.out.push_str("</code></pre>");
            }
            Element::HtmlBlock(html) => {
                self.pad(2);
                self.out.push_str(html.trim_end());
            }
            Element::HorizontalRule => {
                self.pad(2);
                self.out.push_str("<hr />");
            }
            Element::BulletList { items, .. } => {
                self.pad(2);
                self.out.push_str("<ul>");
                for item in items {
                    self.block(item);
                }
                self.pad(1);
                self.out.push_str("</ul>");
            }
            Element::OrderedList { items, .. } => {
                self.pad(2);
                self.out.push_str("<ol>");
                for item in items {
                    self.block(item);
                }
                self.pad(1);
                self.out.push_str("</ol>");
            }
            Element::ListItem(children) => {
                self.pad(1);
                self.out.push_str("<li>");
                self.credit = 2;
                for child in children {
                    match child {
                        Element::Plain(inlines) => self.inlines(inlines),
                        other => self.block(other),
                    }
                }
                self.credit = 0;
                self.out.push_str("</li>");
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
            Element::Str(text) => self.out.push_str(&encode_safe(text)),
            Element::Space => self.out.push(' '),
            Element::LineBreak => self.out.push_str("<br />\n"),
            Element::Emph(children) => {
                self.out.push_str("<em>");
                self.inlines(children);
                self.out.push_str("</em>");
            }
            Element::Strong(children) => {
                self.out.push_str("<strong>");
                self.inlines(children);
                self.out.push_str("</strong>");
            }
            Element::Code(text) => {
                self.out.push_str("<code>");
                self.out.push_str(&encode_safe(text));
                self.out.push_str("</code>");
            }
            Element::Html(html) => self.out.push_str(html),
            Element::Link(link) => self.link(link),
            Element::Image(link) => self.image(link),
            Element::Ellipsis => self.out.push_str("&hellip;"),
            Element::EmDash => self.out.push_str("&mdash;"),
            Element::EnDash => self.out.push_str("&ndash;"),
            Element::Apostrophe => self.out.push_str("&rsquo;"),
            Element::SingleQuoted(children) => {
                self.out.push_str("&lsquo;");
                self.inlines(children);
                self.out.push_str("&rsquo;");
            }
            Element::DoubleQuoted(children) => {
                self.out.push_str("&ldquo;");
                self.inlines(children);
                self.out.push_str("&rdquo;");
            }
            Element::Note { label, content } => self.note_marker(label, content),
            Element::Raw(_) => unreachable!("raw node in a finished document"),
            Element::Reference(_) => {}
            other => self.block(other),
        }
    }

    fn link(&mut self, link: &Link) {
        self.out.push_str(&format!(
            "<a href=\"{}\"",
            encode_double_quoted_attribute(&link.url)
        ));
        if !link.title.is_empty() {
            self.out.push_str(&format!(
                " title=\"{}\"",
                encode_double_quoted_attribute(&link.title)
            ));
        }
        self.out.push('>');
        self.inlines(&link.label);
        self.out.push_str("</a>");
    }

    fn image(&mut self, link: &Link) {
        self.out.push_str(&format!(
            "<img src=\"{}\" alt=\"{}\"",
            encode_double_quoted_attribute(&link.url),
            encode_double_quoted_attribute(&text_of(&link.label))
        ));
        if !link.title.is_empty() {
            self.out.push_str(&format!(
                " title=\"{}\"",
                encode_double_quoted_attribute(&link.title)
            ));
        }
        self.out.push_str(" />");
    }

    fn note_marker(&mut self, label: &str, content: &[Element]) {
        let number = match self.notes_used.iter().position(|(l, _)| l == label) {
            Some(idx) => idx + 1,
            None => {
                self.notes_used.push((label.to_string(), content.to_vec()));
                self.notes_used.len()
            }
        };
        self.out.push_str(&format!(
            "<a class=\"noteref\" id=\"fnref:{number}\" href=\"#fn:{number}\"><sup>{number}</sup></a>"
        ));
    }

    fn finish(mut self) -> String {
        if !self.notes_used.is_empty() {
            let notes = std::mem::take(&mut self.notes_used);
            self.pad(2);
            self.out.push_str("<hr />");
            self.pad(2);
            self.out.push_str("<ol class=\"notes\">");
            for (i, (_, content)) in notes.iter().enumerate() {
                let number = i + 1;
                self.pad(1);
                self.out.push_str(&format!("<li id=\"fn:{number}\">"));
                self.credit = 2;
                for el in content {
                    self.block(el);
                }
                self.credit = 0;
                self.out
                    .push_str(&format!(" <a href=\"#fnref:{number}\">&#8617;</a></li>"));
            }
            self.pad(1);
            self.out.push_str("</ol>");
        }
        self.out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_renders_empty() {
        assert_eq!(write_html(&Document::default()), "");
    }

    #[test]
    fn paragraph_wraps_and_escapes() {
        let doc = Document {
            children: vec![Element::Para(vec![Element::Str("a < b & c".into())])],
        };
        assert_eq!(write_html(&doc), "<p>a &lt; b &amp; c</p>");
    }

    #[test]
    fn blocks_are_separated_by_one_blank_line() {
        let doc = Document {
            children: vec![
                Element::Para(vec![Element::Str("one".into())]),
                Element::Para(vec![Element::Str("two".into())]),
            ],
        };
        assert_eq!(write_html(&doc), "<p>one</p>\n\n<p>two</p>");
    }

    #[test]
    fn double_quotes_in_text_are_escaped() {
        let doc = Document {
            children: vec![Element::Para(vec![Element::Str("say \"hi\"".into())])],
        };
        assert_eq!(write_html(&doc), "<p>say &quot;hi&quot;</p>");
    }

    #[test]
    #[should_panic(expected = "raw node")]
    fn raw_node_aborts_rendering() {
        let doc = Document {
            children: vec![Element::Para(vec![Element::Raw("leftover".into())])],
        };
        let _ = write_html(&doc);
    }

    #[test]
    fn link_title_is_optional() {
        let bare = Element::Link(Link {
            label: vec![Element::Str("x".into())],
            url: "/u".into(),
            title: String::new(),
        });
        let doc = Document {
            children: vec![Element::Para(vec![bare])],
        };
        assert_eq!(write_html(&doc), "<p><a href=\"/u\">x</a></p>");
    }

    #[test]
    fn image_alt_flattens_label() {
        let img = Element::Image(Link {
            label: vec![Element::Emph(vec![Element::Str("alt".into())])],
            url: "/i.png".into(),
            title: String::new(),
        });
        let doc = Document {
            children: vec![Element::Para(vec![img])],
        };
        assert_eq!(
            write_html(&doc),
            "<p><img src=\"/i.png\" alt=\"alt\" /></p>"
        );
    }

    #[test]
    fn reference_nodes_render_nothing() {
        let doc = Document {
            children: vec![Element::Reference(Link {
                label: vec![Element::Str("a".into())],
                url: "/u".into(),
                title: String::new(),
            })],
        };
        assert_eq!(write_html(&doc), "");
    }
}
