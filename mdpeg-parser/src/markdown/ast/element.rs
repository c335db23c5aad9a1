//! Element tree node definitions.

use serde::Serialize;

/// Heading depth, H1 through H6.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum HeadingLevel {
    H1,
    H2,
    H3,
    H4,
    H5,
    H6,
}

impl HeadingLevel {
    /// Build a level from a 1-based depth, clamping out-of-range values.
    pub fn from_depth(depth: usize) -> Self {
        match depth {
            0 | 1 => HeadingLevel::H1,
            2 => HeadingLevel::H2,
            3 => HeadingLevel::H3,
            4 => HeadingLevel::H4,
            5 => HeadingLevel::H5,
            _ => HeadingLevel::H6,
        }
    }

    /// The 1-based depth of this level.
    pub fn depth(self) -> u8 {
        match self {
            HeadingLevel::H1 => 1,
            HeadingLevel::H2 => 2,
            HeadingLevel::H3 => 3,
            HeadingLevel::H4 => 4,
            HeadingLevel::H5 => 5,
            HeadingLevel::H6 => 6,
        }
    }
}

/// Link descriptor shared by links, images, and elided reference
/// definitions. The label subtree is owned here and nowhere else.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Link {
    pub label: Vec<Element>,
    pub url: String,
    /// Empty when the source gave no title.
    pub title: String,
}

/// One node of the document tree.
///
/// Block kinds come first, then inline kinds, then the structural kinds
/// (`Reference` renders as nothing in every backend; `Raw` never survives a
/// finished parse and reaching a renderer with one is an invariant
/// violation).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Element {
    Para(Vec<Element>),
    /// Paragraph content without paragraph wrapping; produced for the items
    /// of tight lists.
    Plain(Vec<Element>),
    Heading {
        level: HeadingLevel,
        content: Vec<Element>,
    },
    BlockQuote(Vec<Element>),
    Verbatim(String),
    HtmlBlock(String),
    HorizontalRule,
    BulletList {
        tight: bool,
        items: Vec<Element>,
    },
    OrderedList {
        tight: bool,
        items: Vec<Element>,
    },
    ListItem(Vec<Element>),

    Str(String),
    Space,
    LineBreak,
    Emph(Vec<Element>),
    Strong(Vec<Element>),
    Code(String),
    Html(String),
    Link(Link),
    Image(Link),
    Ellipsis,
    EmDash,
    EnDash,
    Apostrophe,
    SingleQuoted(Vec<Element>),
    DoubleQuoted(Vec<Element>),
    /// Footnote reference; `content` is the resolved note body, cloned from
    /// the note table at parse time. Numbering happens at render time, in
    /// order of first reference.
    Note {
        label: String,
        content: Vec<Element>,
    },

    Reference(Link),
    Raw(String),
}

impl Element {
    /// Stable lowercase name of this node's kind.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Element::Para(_) => "para",
            Element::Plain(_) => "plain",
            Element::Heading { .. } => "heading",
            Element::BlockQuote(_) => "blockquote",
            Element::Verbatim(_) => "verbatim",
            Element::HtmlBlock(_) => "htmlblock",
            Element::HorizontalRule => "hrule",
            Element::BulletList { .. } => "bulletlist",
            Element::OrderedList { .. } => "orderedlist",
            Element::ListItem(_) => "listitem",
            Element::Str(_) => "str",
            Element::Space => "space",
            Element::LineBreak => "linebreak",
            Element::Emph(_) => "emph",
            Element::Strong(_) => "strong",
            Element::Code(_) => "code",
            Element::Html(_) => "html",
            Element::Link(_) => "link",
            Element::Image(_) => "image",
            Element::Ellipsis => "ellipsis",
            Element::EmDash => "emdash",
            Element::EnDash => "endash",
            Element::Apostrophe => "apostrophe",
            Element::SingleQuoted(_) => "singlequoted",
            Element::DoubleQuoted(_) => "doublequoted",
            Element::Note { .. } => "note",
            Element::Reference(_) => "reference",
            Element::Raw(_) => "raw",
        }
    }

    /// The plain-text content of this node, formatting dropped. Used for
    /// image alt text and similar flattened contexts.
    pub fn text_content(&self) -> String {
        match self {
            Element::Str(s) | Element::Code(s) | Element::Verbatim(s) | Element::Raw(s) => {
                s.clone()
            }
            Element::Html(_) | Element::HtmlBlock(_) => String::new(),
            Element::Space => " ".to_string(),
            Element::LineBreak => "\n".to_string(),
            Element::Ellipsis => "\u{2026}".to_string(),
            Element::EmDash => "\u{2014}".to_string(),
            Element::EnDash => "\u{2013}".to_string(),
            Element::Apostrophe => "\u{2019}".to_string(),
            Element::HorizontalRule | Element::Reference(_) | Element::Note { .. } => String::new(),
            Element::Link(link) | Element::Image(link) => text_of(&link.label),
            Element::SingleQuoted(children) => format!("\u{2018}{}\u{2019}", text_of(children)),
            Element::DoubleQuoted(children) => format!("\u{201c}{}\u{201d}", text_of(children)),
            Element::Para(children)
            | Element::Plain(children)
            | Element::Heading {
                content: children, ..
            }
            | Element::BlockQuote(children)
            | Element::BulletList { items: children, .. }
            | Element::OrderedList { items: children, .. }
            | Element::ListItem(children)
            | Element::Emph(children)
            | Element::Strong(children) => text_of(children),
        }
    }
}

/// Concatenated plain text of a node sequence.
pub fn text_of(children: &[Element]) -> String {
    children.iter().map(Element::text_content).collect()
}

/// A parsed document: the ordered roots of the element tree. Immutable by
/// convention once the parser returns it.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Document {
    pub children: Vec<Element>,
}

impl Document {
    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn heading_level_clamps() {
        assert_eq!(HeadingLevel::from_depth(1), HeadingLevel::H1);
        assert_eq!(HeadingLevel::from_depth(6), HeadingLevel::H6);
        assert_eq!(HeadingLevel::from_depth(9), HeadingLevel::H6);
        assert_eq!(HeadingLevel::from_depth(0), HeadingLevel::H1);
        assert_eq!(HeadingLevel::H3.depth(), 3);
    }

    #[test]
    fn text_content_flattens_formatting() {
        let el = Element::Emph(vec![
            Element::Str("a".into()),
            Element::Space,
            Element::Strong(vec![Element::Str("b".into())]),
        ]);
        assert_eq!(el.text_content(), "a b");
    }

    #[test]
    fn link_text_uses_label() {
        let el = Element::Link(Link {
            label: vec![Element::Str("here".into())],
            url: "/x".into(),
            title: String::new(),
        });
        assert_eq!(el.text_content(), "here");
    }

    #[test]
    fn kind_names_are_stable() {
        assert_eq!(Element::HorizontalRule.kind_name(), "hrule");
        assert_eq!(Element::Para(vec![]).kind_name(), "para");
        assert_eq!(Element::Raw(String::new()).kind_name(), "raw");
    }
}
