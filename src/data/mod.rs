//! Data source for the SBS rate export.

pub mod source;

pub use source::*;
