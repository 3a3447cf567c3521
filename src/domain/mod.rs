//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - the fixed series catalog (`SeriesName`) and the active-series set
//! - typed rate rows (`RateRow`) and the inclusive `DateRange`
//! - chart-ready outputs (`ChartData`, `SeriesData`)
//! - SBS date normalization (`date`)

pub mod date;
pub mod types;

pub use date::*;
pub use types::*;
