//! The `@`-prefixed directive sub-language.
//!
//! Directives are handled locally, without contacting the model: they stage
//! context for the next query or print help. Parsing is pure; the driver
//! performs whatever reads the directive asks for.

use thiserror::Error;

/// A recognized directive, parsed but not yet executed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Directive {
    /// Stage the contents of a file (`@file <path>`, alias `@f`).
    File(String),
    /// Print the directive list (`@help`, aliases `@commands`, `@?`).
    Help,
    /// Stage a bounded overview of the working tree (`@scan`).
    Scan,
    /// Stage lines matching a query (`@search <query>`).
    Search(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DirectiveError {
    #[error("unknown directive '@{0}' (type '@help' for the list)")]
    Unknown(String),
    #[error("'@{name}' needs an argument, e.g. '@{name} {example}'")]
    MissingArgument {
        name: &'static str,
        example: &'static str,
    },
}

/// Parse a line whose first non-space character is `@`.
///
/// The directive name is case-insensitive; its argument is taken verbatim
/// after trimming.
pub fn parse(line: &str) -> Result<Directive, DirectiveError> {
    let rest = line
        .trim()
        .strip_prefix('@')
        .expect("caller routes only @-prefixed lines here");
    let (name, argument) = match rest.split_once(char::is_whitespace) {
        Some((name, argument)) => (name, argument.trim()),
        None => (rest, ""),
    };
    let name = name.to_ascii_lowercase();

    match name.as_str() {
        "file" | "f" => {
            if argument.is_empty() {
                return Err(DirectiveError::MissingArgument {
                    name: "file",
                    example: "README.md",
                });
            }
            Ok(Directive::File(argument.to_string()))
        }
        "help" | "commands" | "?" => Ok(Directive::Help),
        "scan" => Ok(Directive::Scan),
        "search" => {
            if argument.is_empty() {
                return Err(DirectiveError::MissingArgument {
                    name: "search",
                    example: "TODO",
                });
            }
            Ok(Directive::Search(argument.to_string()))
        }
        _ => Err(DirectiveError::Unknown(name)),
    }
}

/// Directive list shown by `@help`. Directives never contact the model; use
/// them to preload context before asking the actual question.
pub fn help_text() -> &'static str {
    "Directives (handled locally, no model call):\n\
     \x20 @file <path>     stage a file so the model sees its contents next turn\n\
     \x20 @scan            stage an overview of the working tree\n\
     \x20 @search <query>  stage lines matching <query> from the working tree\n\
     \x20 @help            show this message\n\
     Staged context is sent along with your next normal input."
}
