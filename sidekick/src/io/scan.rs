//! Working-tree overview and search for the `@scan` and `@search`
//! directives.
//!
//! Walks honor `.gitignore` and skip hidden entries, so dependency and
//! build directories stay out of the staged context. Output is bounded and
//! deterministically ordered.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use ignore::WalkBuilder;
use tracing::debug;

/// Skip files larger than this; they are almost never useful context.
const MAX_FILE_BYTES: u64 = 512 * 1024;

/// Produce a bounded overview of the tree under `root`: files grouped by
/// directory plus extension counts. At most `max_files` files are listed.
pub fn scan_overview(root: &Path, max_files: usize) -> Result<String> {
    let files = collect_files(root, max_files)?;
    debug!(files = files.len(), "scanned working tree");

    if files.is_empty() {
        return Ok("Working tree overview: no files found.".to_string());
    }

    let mut by_dir: BTreeMap<String, Vec<String>> = BTreeMap::new();
    let mut type_counts: BTreeMap<String, usize> = BTreeMap::new();
    for rel in &files {
        let dir = match rel.parent() {
            Some(parent) if parent.as_os_str().is_empty() => ".".to_string(),
            Some(parent) => parent.display().to_string(),
            None => ".".to_string(),
        };
        let name = rel
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        by_dir.entry(dir).or_default().push(name);

        let ext = rel
            .extension()
            .map(|e| format!(".{}", e.to_string_lossy()))
            .unwrap_or_else(|| "<no-ext>".to_string());
        *type_counts.entry(ext).or_default() += 1;
    }

    let mut out = format!("Working tree overview ({} files):\n", files.len());
    for (dir, mut names) in by_dir {
        names.sort();
        out.push_str(&format!("{dir}/\n"));
        for name in names {
            out.push_str(&format!("  {name}\n"));
        }
    }
    out.push_str("File types: ");
    let types: Vec<String> = type_counts
        .iter()
        .map(|(ext, count)| format!("{ext} ({count})"))
        .collect();
    out.push_str(&types.join(", "));
    Ok(out)
}

/// Search text files under `root` for lines containing `query`
/// (case-insensitive, literal). At most `max_matches` lines are reported.
pub fn search(root: &Path, query: &str, max_matches: usize) -> Result<String> {
    let files = collect_files(root, usize::MAX)?;
    let needle = query.to_lowercase();

    let mut matches = Vec::new();
    let mut truncated = false;
    'files: for rel in &files {
        let Ok(contents) = fs::read_to_string(root.join(rel)) else {
            continue; // unreadable or not valid UTF-8
        };
        for (idx, line) in contents.lines().enumerate() {
            if line.to_lowercase().contains(&needle) {
                if matches.len() == max_matches {
                    truncated = true;
                    break 'files;
                }
                matches.push(format!("{}:{}: {}", rel.display(), idx + 1, line.trim()));
            }
        }
    }

    if matches.is_empty() {
        return Ok(format!("No matches for '{query}'."));
    }
    let mut out = format!("Matches for '{query}' ({}):\n", matches.len());
    out.push_str(&matches.join("\n"));
    if truncated {
        out.push_str(&format!("\n[truncated at {max_matches} matches]"));
    }
    Ok(out)
}

/// Walk `root`, returning sorted root-relative paths of regular files that
/// pass the ignore rules and the size guard.
fn collect_files(root: &Path, max_files: usize) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    let walk = WalkBuilder::new(root)
        .hidden(true)
        .require_git(false)
        .follow_links(false)
        .build();

    for entry in walk {
        let entry = entry.context("walk working tree")?;
        if !entry.file_type().is_some_and(|t| t.is_file()) {
            continue;
        }
        if entry
            .metadata()
            .map(|m| m.len() > MAX_FILE_BYTES)
            .unwrap_or(true)
        {
            continue;
        }
        let rel = entry
            .path()
            .strip_prefix(root)
            .unwrap_or(entry.path())
            .to_path_buf();
        files.push(rel);
    }

    files.sort();
    files.truncate(max_files);
    Ok(files)
}
