//! `sbs-rates` library crate.
//!
//! The binary (`sbs`) is a thin wrapper around this library so that:
//!
//! - the CSV-to-series pipeline is testable without spawning processes
//! - front ends (TUI, ASCII plot, exports) share one implementation
//! - code stays easy to navigate as the project grows

pub mod app;
pub mod cli;
pub mod data;
pub mod domain;
pub mod error;
pub mod io;
pub mod plot;
pub mod report;
pub mod tui;
