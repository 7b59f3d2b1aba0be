//! Interactive coding agent for the terminal.
//!
//! A human converses with a language model that proposes file operations
//! against the working directory; every proposed operation is confirmed by
//! the human before it touches disk. The architecture enforces a strict
//! separation:
//!
//! - **[`core`]**: Pure, deterministic logic (transcript, staging, proposal
//!   parsing, path containment). No I/O, fully testable in isolation.
//! - **[`io`]**: Side-effecting operations (filesystem, model HTTP calls,
//!   console). Isolated behind trait seams to enable scripted doubles in
//!   tests.
//!
//! The [`repl`] module coordinates core logic with I/O to implement the
//! interactive loop.

pub mod core;
pub mod io;
pub mod logging;
pub mod repl;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
