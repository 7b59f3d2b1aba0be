//! File Action Executor.
//!
//! Applies one accepted [`ProposedAction`] to the working directory.
//! Preconditions are checked here, at execution time, against the current
//! state of the filesystem: the directory may have changed since the model
//! proposed the action. Every failure maps to an [`ActionError`]; nothing in
//! this module panics or aborts the session.

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use similar::TextDiff;
use tracing::debug;

use crate::core::action::{ActionError, ActionOutcome, EditChange, ProposedAction};
use crate::core::path::resolve_within;

const GREEN: &str = "\x1b[32m";
const RED: &str = "\x1b[31m";
const RESET: &str = "\x1b[0m";

/// Execute one accepted action against `root`.
///
/// The target path is re-validated against the working-directory boundary
/// before anything else; an escaping path never reaches the filesystem.
pub fn execute(root: &Path, action: &ProposedAction) -> Result<ActionOutcome, ActionError> {
    let target = resolve_within(root, action.path())?;
    debug!(target = %target.display(), "executing action");

    match action {
        ProposedAction::Read { path } => read_file(&target, path),
        ProposedAction::Create { path, content } => create_file(&target, path, content),
        ProposedAction::Edit { path, change } => edit_file(&target, path, change),
        ProposedAction::Delete { path } => delete_file(&target, path),
    }
}

fn read_file(target: &Path, path: &str) -> Result<ActionOutcome, ActionError> {
    if !target.is_file() {
        return Err(ActionError::NotFound(path.to_string()));
    }
    let content = fs::read_to_string(target).map_err(io_error(path))?;
    Ok(ActionOutcome {
        summary: format!("read {path} ({} bytes)", content.len()),
        content: Some(content),
    })
}

fn create_file(target: &Path, path: &str, content: &str) -> Result<ActionOutcome, ActionError> {
    // symlink_metadata instead of exists(): a dangling symlink still occupies
    // the name.
    if fs::symlink_metadata(target).is_ok() {
        return Err(ActionError::AlreadyExists(path.to_string()));
    }
    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent).map_err(io_error(path))?;
    }
    fs::write(target, content).map_err(io_error(path))?;
    Ok(ActionOutcome {
        summary: format!("created {path} ({} bytes)", content.len()),
        content: None,
    })
}

fn edit_file(target: &Path, path: &str, change: &EditChange) -> Result<ActionOutcome, ActionError> {
    if !target.is_file() {
        return Err(ActionError::NotFound(path.to_string()));
    }
    let current = fs::read_to_string(target).map_err(io_error(path))?;
    let next = apply_change(&current, change).ok_or_else(|| ActionError::Conflict(path.to_string()))?;
    fs::write(target, &next).map_err(io_error(path))?;
    Ok(ActionOutcome {
        summary: format!("edited {path} (now {} bytes)", next.len()),
        content: None,
    })
}

fn delete_file(target: &Path, path: &str) -> Result<ActionOutcome, ActionError> {
    if !target.is_file() {
        return Err(ActionError::NotFound(path.to_string()));
    }
    fs::remove_file(target).map_err(io_error(path))?;
    Ok(ActionOutcome {
        summary: format!("deleted {path}"),
        content: None,
    })
}

/// Compute the edited content, or `None` when a patch anchor is missing.
fn apply_change(current: &str, change: &EditChange) -> Option<String> {
    match change {
        EditChange::Replace { content } => Some(content.clone()),
        EditChange::Patch { find, replace } => {
            if current.contains(find.as_str()) {
                Some(current.replacen(find.as_str(), replace, 1))
            } else {
                None
            }
        }
    }
}

fn io_error(path: &str) -> impl FnOnce(std::io::Error) -> ActionError {
    let path = path.to_string();
    move |source| match source.kind() {
        ErrorKind::NotFound => ActionError::NotFound(path),
        ErrorKind::AlreadyExists => ActionError::AlreadyExists(path),
        _ => ActionError::Io { path, source },
    }
}

/// Render a colored preview of what accepting `action` would change.
/// Returns `None` for actions whose one-line description already says it
/// all (read, delete) and when the current content cannot be read.
pub fn render_preview(root: &Path, action: &ProposedAction) -> Option<String> {
    let target = resolve_within(root, action.path()).ok()?;
    match action {
        ProposedAction::Create { path, content } => {
            if target.exists() {
                return None; // execution will refuse; nothing to preview
            }
            Some(format!(
                "new file {path}:\n{}",
                indent(&color_diff_lines(&unified_diff("", content, path)))
            ))
        }
        ProposedAction::Edit { path, change } => {
            let current = fs::read_to_string(&target).ok()?;
            let next = apply_change(&current, change)?;
            let diff = unified_diff(&current, &next, path);
            if diff.is_empty() {
                return Some("(no changes; content is identical)".to_string());
            }
            Some(indent(&color_diff_lines(&diff)))
        }
        ProposedAction::Read { .. } | ProposedAction::Delete { .. } => None,
    }
}

fn unified_diff(old: &str, new: &str, path: &str) -> String {
    TextDiff::from_lines(old, new)
        .unified_diff()
        .context_radius(3)
        .header(&format!("{path} (current)"), &format!("{path} (new)"))
        .to_string()
}

fn color_diff_lines(diff: &str) -> String {
    diff.lines()
        .map(|line| {
            if line.starts_with('+') && !line.starts_with("+++") {
                format!("{GREEN}{line}{RESET}")
            } else if line.starts_with('-') && !line.starts_with("---") {
                format!("{RED}{line}{RESET}")
            } else {
                line.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn indent(text: &str) -> String {
    text.lines()
        .map(|line| format!("  {line}"))
        .collect::<Vec<_>>()
        .join("\n")
}
