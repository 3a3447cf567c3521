//! Terminal plotting for the non-interactive `sbs plot` command.

pub mod ascii;

pub use ascii::*;
