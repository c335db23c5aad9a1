//! Plain-text tree rendering.
//!
//! Produces an indented, line-per-node view of a document, used by tests to
//! assert on structure without matching on the full node types, and handy
//! when debugging grammar changes.

use super::element::{Document, Element};

/// Render a document as an indented tree, one node per line.
pub fn tree_string(doc: &Document) -> String {
    let mut out = String::new();
    for child in &doc.children {
        write_element(&mut out, child, 0);
    }
    out
}

fn write_element(out: &mut String, el: &Element, depth: usize) {
    for _ in 0..depth {
        out.push_str("  ");
    }
    out.push_str(el.kind_name());
    match el {
        Element::Str(s) | Element::Code(s) | Element::Verbatim(s) | Element::Html(s)
        | Element::HtmlBlock(s) | Element::Raw(s) => {
            out.push_str(&format!(" {:?}", s));
        }
        Element::Heading { level, .. } => {
            out.push_str(&format!(" {}", level.depth()));
        }
        Element::BulletList { tight, .. } | Element::OrderedList { tight, .. } => {
            out.push_str(if *tight { " tight" } else { " loose" });
        }
        Element::Link(link) | Element::Image(link) | Element::Reference(link) => {
            out.push_str(&format!(" url={:?}", link.url));
        }
        Element::Note { label, .. } => {
            out.push_str(&format!(" label={:?}", label));
        }
        _ => {}
    }
    out.push('\n');
    for child in children_of(el) {
        write_element(out, child, depth + 1);
    }
}

fn children_of(el: &Element) -> &[Element] {
    match el {
        Element::Para(c)
        | Element::Plain(c)
        | Element::Heading { content: c, .. }
        | Element::BlockQuote(c)
        | Element::BulletList { items: c, .. }
        | Element::OrderedList { items: c, .. }
        | Element::ListItem(c)
        | Element::Emph(c)
        | Element::Strong(c)
        | Element::SingleQuoted(c)
        | Element::DoubleQuoted(c)
        | Element::Note { content: c, .. } => c,
        Element::Link(link) | Element::Image(link) => &link.label,
        _ => &[],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markdown::ast::element::{HeadingLevel, Link};

    #[test]
    fn renders_nested_structure() {
        let doc = Document {
            children: vec![Element::Para(vec![
                Element::Str("a".into()),
                Element::Emph(vec![Element::Str("b".into())]),
            ])],
        };
        let tree = tree_string(&doc);
        assert_eq!(tree, "para\n  str \"a\"\n  emph\n    str \"b\"\n");
    }

    #[test]
    fn annotates_headings_and_links() {
        let doc = Document {
            children: vec![Element::Heading {
                level: HeadingLevel::H2,
                content: vec![Element::Link(Link {
                    label: vec![Element::Str("x".into())],
                    url: "/u".into(),
                    title: String::new(),
                })],
            }],
        };
        let tree = tree_string(&doc);
        assert!(tree.starts_with("heading 2\n"));
        assert!(tree.contains("link url=\"/u\""));
    }
}
