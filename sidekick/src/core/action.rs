//! Proposed file actions and their execution outcomes.
//!
//! Model output is reduced to a closed set of four action kinds at the
//! parser boundary; untyped model text never reaches the executor. Action
//! preconditions (file exists, anchor matches) are re-checked at execution
//! time, not proposal time, because the working directory may change in
//! between.

use thiserror::Error;

/// A structured file operation extracted from a model response, pending
/// user confirmation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProposedAction {
    Read { path: String },
    Create { path: String, content: String },
    Edit { path: String, change: EditChange },
    Delete { path: String },
}

/// The two edit forms the wire format can carry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditChange {
    /// Replace the whole file with `content`.
    Replace { content: String },
    /// Replace the first occurrence of `find` with `replace`.
    Patch { find: String, replace: String },
}

impl ProposedAction {
    /// Target path as given by the model, unvalidated.
    pub fn path(&self) -> &str {
        match self {
            Self::Read { path }
            | Self::Create { path, .. }
            | Self::Edit { path, .. }
            | Self::Delete { path } => path,
        }
    }

    /// One-line description for confirmation prompts and result turns.
    pub fn describe(&self) -> String {
        match self {
            Self::Read { path } => format!("read {path}"),
            Self::Create { path, content } => {
                format!("create {path} ({} bytes)", content.len())
            }
            Self::Edit { path, change } => match change {
                EditChange::Replace { content } => {
                    format!("edit {path} (replace, {} bytes)", content.len())
                }
                EditChange::Patch { .. } => format!("edit {path} (patch)"),
            },
            Self::Delete { path } => format!("delete {path}"),
        }
    }
}

/// User decision for one proposed action. Ephemeral, never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Accept,
    Decline,
}

/// Result of executing an accepted action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionOutcome {
    /// One-line summary, shown to the user and recorded for the model.
    pub summary: String,
    /// Payload the model needs to see (file contents for reads).
    pub content: Option<String>,
}

/// Why an action could not be executed. Caught at the executor boundary and
/// reported into the transcript; never crashes the session.
#[derive(Debug, Error)]
pub enum ActionError {
    #[error("'{0}' does not exist")]
    NotFound(String),
    #[error("'{0}' already exists; refusing to overwrite")]
    AlreadyExists(String),
    #[error("edit does not match the current contents of '{0}' (anchor text not found)")]
    Conflict(String),
    #[error("'{0}' resolves outside the working directory")]
    PathEscape(String),
    #[error("io error on '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}
