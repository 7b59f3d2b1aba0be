//! System prompt rendering.

use std::path::Path;

use anyhow::{Context, Result};
use minijinja::{Environment, context};

const SYSTEM_TEMPLATE: &str = include_str!("prompts/system.md");

/// Render the system instruction for a session rooted at `workdir`.
/// Rendered once at startup; the result is reused for every model call.
pub fn system_prompt(workdir: &Path) -> Result<String> {
    let mut env = Environment::new();
    env.add_template("system", SYSTEM_TEMPLATE)
        .context("add system template")?;
    let rendered = env
        .get_template("system")
        .context("get system template")?
        .render(context! { workdir => workdir.display().to_string() })
        .context("render system template")?;
    Ok(rendered)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn prompt_names_every_tool_and_the_workdir() {
        let prompt = system_prompt(&PathBuf::from("/work/project")).expect("render");
        for tool in ["read_file", "create_file", "edit_file", "delete_file"] {
            assert!(prompt.contains(tool), "missing {tool}");
        }
        assert!(prompt.contains("/work/project"));
    }

    #[test]
    fn prompt_documents_the_wire_format() {
        let prompt = system_prompt(&PathBuf::from("/w")).expect("render");
        assert!(prompt.contains("<tool_call type="));
        assert!(prompt.contains("<parameter name="));
    }
}
