//! Input/output helpers.
//!
//! - permissive CSV text parsing (`csv_text`)
//! - chart data exports (JSON/CSV) (`export`)

pub mod csv_text;
pub mod export;

pub use csv_text::*;
pub use export::*;
