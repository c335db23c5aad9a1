//! Concrete output backends.

pub mod groff;
pub mod html;
pub mod latex;
pub mod styled;
