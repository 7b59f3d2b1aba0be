//! Pure, deterministic session logic.
//!
//! Nothing in this module performs I/O. File contents, model responses, and
//! user input arrive as values; decisions leave as values.

pub mod action;
pub mod directive;
pub mod parser;
pub mod path;
pub mod stage;
pub mod transcript;
