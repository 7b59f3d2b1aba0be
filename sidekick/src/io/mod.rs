//! Side-effecting operations: filesystem, console, model HTTP, config.
//!
//! Each seam that the driver depends on ([`console::Console`],
//! [`model::ModelClient`]) is a trait with the production implementation
//! beside it, so tests drive the loop with scripted doubles.

pub mod config;
pub mod console;
pub mod fs;
pub mod model;
pub mod prompt;
pub mod scan;
