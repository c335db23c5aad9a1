//! Style model for the styled-run backend
//!
//! A [`StyleSheet`] maps document structure to visual attributes. Every
//! attribute is optional; unset attributes inherit from the enclosing
//! context via [`StyleAttributes::merge`], so a sheet only has to state
//! what a construct changes, not the full appearance.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontWeight {
    Normal,
    Bold,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontStyle {
    Normal,
    Italic,
}

/// Vertical placement relative to the text baseline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Baseline {
    Normal,
    Superscript,
    Subscript,
}

/// An sRGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const BLACK: Color = Color { r: 0, g: 0, b: 0 };
    /// The traditional hyperlink blue.
    pub const LINK_BLUE: Color = Color { r: 0, g: 0, b: 238 };
}

/// One construct's visual attributes. `None` means "inherit".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StyleAttributes {
    pub font_weight: Option<FontWeight>,
    pub font_style: Option<FontStyle>,
    /// Size relative to the base font, 1.0 being unscaled.
    pub font_scale: Option<f32>,
    pub monospace: Option<bool>,
    pub underline: Option<bool>,
    pub baseline: Option<Baseline>,
    pub foreground: Option<Color>,
    /// Destination URL when this run is part of a link.
    pub link: Option<String>,
}

impl StyleAttributes {
    /// Overlay `child` onto `self`: attributes the child sets win,
    /// everything else inherits.
    pub fn merge(&self, child: &StyleAttributes) -> StyleAttributes {
        StyleAttributes {
            font_weight: child.font_weight.or(self.font_weight),
            font_style: child.font_style.or(self.font_style),
            font_scale: child.font_scale.or(self.font_scale),
            monospace: child.monospace.or(self.monospace),
            underline: child.underline.or(self.underline),
            baseline: child.baseline.or(self.baseline),
            foreground: child.foreground.or(self.foreground),
            link: child.link.clone().or_else(|| self.link.clone()),
        }
    }
}

/// Maps each document construct to the attributes it overlays.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StyleSheet {
    pub base: StyleAttributes,
    pub emph: StyleAttributes,
    pub strong: StyleAttributes,
    pub code: StyleAttributes,
    pub link: StyleAttributes,
    pub quote: StyleAttributes,
    /// Footnote markers and the appended note bodies.
    pub note: StyleAttributes,
    /// Indexed by heading depth minus one.
    pub headings: [StyleAttributes; 6],
}

impl Default for StyleSheet {
    fn default() -> Self {
        let heading = |scale: f32| StyleAttributes {
            font_weight: Some(FontWeight::Bold),
            font_scale: Some(scale),
            ..StyleAttributes::default()
        };
        StyleSheet {
            base: StyleAttributes {
                font_weight: Some(FontWeight::Normal),
                font_style: Some(FontStyle::Normal),
                font_scale: Some(1.0),
                monospace: Some(false),
                underline: Some(false),
                baseline: Some(Baseline::Normal),
                foreground: Some(Color::BLACK),
                link: None,
            },
            emph: StyleAttributes {
                font_style: Some(FontStyle::Italic),
                ..StyleAttributes::default()
            },
            strong: StyleAttributes {
                font_weight: Some(FontWeight::Bold),
                ..StyleAttributes::default()
            },
            code: StyleAttributes {
                monospace: Some(true),
                ..StyleAttributes::default()
            },
            link: StyleAttributes {
                underline: Some(true),
                foreground: Some(Color::LINK_BLUE),
                ..StyleAttributes::default()
            },
            quote: StyleAttributes {
                font_style: Some(FontStyle::Italic),
                ..StyleAttributes::default()
            },
            note: StyleAttributes {
                font_scale: Some(0.8),
                baseline: Some(Baseline::Superscript),
                ..StyleAttributes::default()
            },
            headings: [
                heading(2.0),
                heading(1.5),
                heading(1.17),
                heading(1.0),
                heading(0.83),
                heading(0.67),
            ],
        }
    }
}

impl StyleSheet {
    /// The heading overlay for a 1-based depth, clamped to the deepest one.
    pub fn heading(&self, depth: u8) -> &StyleAttributes {
        let idx = usize::from(depth.clamp(1, 6)) - 1;
        &self.headings[idx]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_prefers_child_attributes() {
        let base = StyleSheet::default().base;
        let merged = base.merge(&StyleAttributes {
            font_style: Some(FontStyle::Italic),
            ..StyleAttributes::default()
        });
        assert_eq!(merged.font_style, Some(FontStyle::Italic));
        assert_eq!(merged.font_weight, Some(FontWeight::Normal));
        assert_eq!(merged.foreground, Some(Color::BLACK));
    }

    #[test]
    fn merge_inherits_link_targets() {
        let with_link = StyleAttributes {
            link: Some("/u".into()),
            ..StyleAttributes::default()
        };
        let merged = with_link.merge(&StyleAttributes::default());
        assert_eq!(merged.link.as_deref(), Some("/u"));
    }

    #[test]
    fn heading_lookup_clamps() {
        let sheet = StyleSheet::default();
        assert_eq!(sheet.heading(1).font_scale, Some(2.0));
        assert_eq!(sheet.heading(6).font_scale, Some(0.67));
        assert_eq!(sheet.heading(0), sheet.heading(1));
        assert_eq!(sheet.heading(9), sheet.heading(6));
    }

    #[test]
    fn sheets_round_trip_through_serde() {
        let sheet = StyleSheet::default();
        let json = serde_json::to_string(&sheet).unwrap();
        let back: StyleSheet = serde_json::from_str(&json).unwrap();
        assert_eq!(back, sheet);
    }
}
