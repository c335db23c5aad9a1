//! Extension flags.
//!
//! Extensions are opt-in behaviors combined bitwise. `SMART` and `NOTES`
//! enable additional grammar rules; the two filter flags elide raw HTML at
//! parse time and are independent axes: `FILTER_STYLES` drops only
//! style-carrying markup and applies whether or not `FILTER_HTML` is set.

use serde::Serialize;
use std::ops::{BitOr, BitOrAssign};

/// A set of extension flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub struct Extensions(u32);

impl Extensions {
    /// The empty set.
    pub const NONE: Extensions = Extensions(0);
    /// Smart typography: curly quotes, dashes, ellipses, apostrophes.
    pub const SMART: Extensions = Extensions(1 << 0);
    /// Footnote definitions and references.
    pub const NOTES: Extensions = Extensions(1 << 1);
    /// Elide raw HTML blocks and inline HTML.
    pub const FILTER_HTML: Extensions = Extensions(1 << 2);
    /// Elide style-carrying HTML constructs, independently of `FILTER_HTML`.
    pub const FILTER_STYLES: Extensions = Extensions(1 << 3);
    /// Every defined flag.
    pub const ALL: Extensions = Extensions(0xff);

    pub const fn bits(self) -> u32 {
        self.0
    }

    /// True when every flag in `other` is set in `self`.
    pub const fn contains(self, other: Extensions) -> bool {
        self.0 & other.0 == other.0
    }

    pub const fn with(self, other: Extensions) -> Extensions {
        Extensions(self.0 | other.0)
    }
}

impl BitOr for Extensions {
    type Output = Extensions;

    fn bitor(self, rhs: Extensions) -> Extensions {
        self.with(rhs)
    }
}

impl BitOrAssign for Extensions {
    fn bitor_assign(&mut self, rhs: Extensions) {
        *self = self.with(rhs);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn none_contains_nothing() {
        assert!(!Extensions::NONE.contains(Extensions::SMART));
        assert!(Extensions::NONE.contains(Extensions::NONE));
    }

    #[test]
    fn combination_contains_each_member() {
        let exts = Extensions::SMART | Extensions::NOTES;
        assert!(exts.contains(Extensions::SMART));
        assert!(exts.contains(Extensions::NOTES));
        assert!(!exts.contains(Extensions::FILTER_HTML));
        assert!(exts.contains(Extensions::SMART | Extensions::NOTES));
    }

    #[test]
    fn all_contains_every_flag() {
        for flag in [
            Extensions::SMART,
            Extensions::NOTES,
            Extensions::FILTER_HTML,
            Extensions::FILTER_STYLES,
        ] {
            assert!(Extensions::ALL.contains(flag));
        }
    }

    #[test]
    fn or_assign_accumulates() {
        let mut exts = Extensions::NONE;
        exts |= Extensions::FILTER_STYLES;
        assert!(exts.contains(Extensions::FILTER_STYLES));
        assert!(!exts.contains(Extensions::FILTER_HTML));
    }
}
