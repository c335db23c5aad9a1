//! LaTeX backend
//!
//! Produces body text for inclusion in a document that provides a preamble
//! with `hyperref` and `graphicx` loaded. Raw HTML has no LaTeX
//! counterpart and is dropped; footnotes become `\footnote{..}` at the
//! reference site, so LaTeX numbers them itself.

use mdpeg_parser::{Document, Element};

use crate::error::FormatError;
use crate::format::Format;

/// The LaTeX output format.
pub struct LatexFormat;

impl Format for LatexFormat {
    fn name(&self) -> &str {
        "latex"
    }

    fn description(&self) -> &str {
        "LaTeX body text"
    }

    fn render(&self, doc: &Document) -> Result<String, FormatError> {
        Ok(write_latex(doc))
    }
}

/// Render a document as LaTeX body text.
pub fn write_latex(doc: &Document) -> String {
    let mut writer = LatexWriter::default();
    for el in &doc.children {
        writer.block(el);
    }
    writer.out
}

/// Escape LaTeX special characters in ordinary text.
fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '\\' => out.push_str("\\textbackslash{}"),
            '{' => out.push_str("\\{"),
            '}' => out.push_str("\\}"),
            '#' | '$' | '%' | '&' | '_' => {
                out.push('\\');
                out.push(ch);
            }
            '~' => out.push_str("\\textasciitilde{}"),
            '^' => out.push_str("\\textasciicircum{}"),
            other => out.push(other),
        }
    }
    out
}

#[derive(Default)]
struct LatexWriter {
    out: String,
}

impl LatexWriter {
    fn pad(&mut self, n: usize) {
        if self.out.is_empty() {
            return;
        }
        let have = self.out.chars().rev().take_while(|&c| c == '\n').count();
        for _ in have..n {
            self.out.push('\n');
        }
    }

    fn block(&mut self, el: &Element) {
        match el {
            Element::Para(children) | Element::Plain(children) => {
                self.pad(2);
                self.inlines(children);
            }
            Element::Heading { level, content } => {
                self.pad(2);
                let command = match level.depth() {
                    1 => "section",
                    2 => "subsection",
                    3 => "subsubsection",
                    4 => "paragraph",
                    _ => "subparagraph",
                };
                self.out.push_str(&format!("\\{command}{{"));
                self.inlines(content);
                self.out.push('}');
            }
            Element::BlockQuote(children) => {
                self.pad(2);
                self.out.push_str("\\begin{quote}");
                for child in children {
                    self.block(child);
                }
                self.pad(1);
                self.out.push_str("\\end{quote}");
            }
            Element::Verbatim(text) => {
                self.pad(2);
                self.out.push_str("\\begin{verbatim}\n");
                self.out.push_str(text);
                self.out.push_str("\\end{verbatim}");
            }
            Element::HtmlBlock(_) => {}
            Element::HorizontalRule => {
                self.pad(2);
                self.out
                    .push_str("\\begin{center}\\rule{3in}{0.4pt}\\end{center}");
            }
            Element::BulletList { items, .. } => self.list("itemize", items),
            Element::OrderedList { items, .. } => self.list("enumerate", items),
            Element::ListItem(children) => {
                self.pad(1);
                self.out.push_str("\\item ");
                for (i, child) in children.iter().enumerate() {
                    match child {
                        Element::Para(inlines) | Element::Plain(inlines) if i == 0 => {
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

    fn list(&mut self, environment: &str, items: &[Element]) {
        self.pad(2);
        self.out.push_str(&format!("\\begin{{{environment}}}"));
        for item in items {
            self.block(item);
        }
        self.pad(1);
        self.out.push_str(&format!("\\end{{{environment}}}"));
    }

    fn inlines(&mut self, children: &[Element]) {
        for el in children {
            self.inline(el);
        }
    }

    fn inline(&mut self, el: &Element) {
        match el {
            Element::Str(text) => self.out.push_str(&escape(text)),
            Element::Raw(_) => unreachable!("raw node in a finished document"),
            Element::Space => self.out.push(' '),
            Element::LineBreak => self.out.push_str("\\\\\n"),
            Element::Emph(children) => self.wrap("\\emph{", children),
            Element::Strong(children) => self.wrap("\\textbf{", children),
            Element::Code(text) => {
                self.out.push_str("\\texttt{");
                self.out.push_str(&escape(text));
                self.out.push('}');
            }
            Element::Html(_) => {}
            Element::Link(link) => {
                self.out
                    .push_str(&format!("\\href{{{}}}{{", escape(&link.url)));
                self.inlines(&link.label);
                self.out.push('}');
            }
            Element::Image(link) => {
                self.out
                    .push_str(&format!("\\includegraphics{{{}}}", escape(&link.url)));
            }
            Element::Ellipsis => self.out.push_str("\\ldots{}"),
            Element::EmDash => self.out.push_str("---"),
            Element::EnDash => self.out.push_str("--"),
            Element::Apostrophe => self.out.push('\''),
            Element::SingleQuoted(children) => {
                self.out.push('`');
                self.inlines(children);
                self.out.push('\'');
            }
            Element::DoubleQuoted(children) => {
                self.out.push_str("``");
                self.inlines(children);
                self.out.push_str("''");
            }
            Element::Note { content, .. } => {
                self.out.push_str("\\footnote{");
                let mut body = LatexWriter::default();
                for el in content {
                    body.block(el);
                }
                self.out.push_str(body.out.trim());
                self.out.push('}');
            }
            Element::Reference(_) => {}
            other => self.block(other),
        }
    }

    fn wrap(&mut self, open: &str, children: &[Element]) {
        self.out.push_str(open);
        self.inlines(children);
        self.out.push('}');
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn para(children: Vec<Element>) -> Document {
        Document {
            children: vec![Element::Para(children)],
        }
    }

    #[test]
    fn empty_document_renders_empty() {
        assert_eq!(write_latex(&Document::default()), "");
    }

    #[test]
    fn emphasis_uses_emph() {
        let doc = para(vec![Element::Emph(vec![Element::Str("a".into())])]);
        assert_eq!(write_latex(&doc), "\\emph{a}");
    }

    #[test]
    fn special_characters_are_escaped() {
        let doc = para(vec![Element::Str("100% of $5 & #1_x".into())]);
        assert_eq!(write_latex(&doc), "100\\% of \\$5 \\& \\#1\\_x");
    }

    #[test]
    fn verbatim_is_not_escaped() {
        let doc = Document {
            children: vec![Element::Verbatim("a & b\n".into())],
        };
        assert_eq!(
            write_latex(&doc),
            "\\begin{verbatim}\na & b\n\\end{verbatim}"
        );
    }

    #[test]
    fn footnote_body_is_inlined() {
        let doc = para(vec![
            Element::Str("x".into()),
            Element::Note {
                label: "n".into(),
                content: vec![Element::Para(vec![Element::Str("body".into())])],
            },
        ]);
        assert_eq!(write_latex(&doc), "x\\footnote{body}");
    }

    #[test]
    fn smart_nodes_use_tex_ligatures() {
        let doc = para(vec![
            Element::Str("a".into()),
            Element::EmDash,
            Element::Str("b".into()),
            Element::Ellipsis,
        ]);
        assert_eq!(write_latex(&doc), "a---b\\ldots{}");
    }

    #[test]
    fn heading_depth_maps_to_sectioning() {
        use mdpeg_parser::HeadingLevel;
        let doc = Document {
            children: vec![Element::Heading {
                level: HeadingLevel::H2,
                content: vec![Element::Str("t".into())],
            }],
        };
        assert_eq!(write_latex(&doc), "\\subsection{t}");
    }
}
