//! Console seam for the interactive loop.
//!
//! The driver talks to the user only through [`Console`], so tests can
//! script a whole session without a terminal.

use std::io::{BufRead, Write};

use anyhow::{Context, Result};

use crate::core::action::Decision;

/// Line-oriented user interface.
pub trait Console {
    /// Show `prompt` and read one line, without its trailing newline.
    /// Returns `None` on end of input.
    fn read_line(&mut self, prompt: &str) -> Result<Option<String>>;

    /// Normal output (responses, staged-context notices, summaries).
    fn say(&mut self, text: &str);

    /// Error output. Every error the session survives goes through here;
    /// nothing is swallowed silently.
    fn warn(&mut self, text: &str);
}

/// Production console over stdin/stdout/stderr.
#[derive(Debug, Default)]
pub struct StdioConsole;

impl StdioConsole {
    pub fn new() -> Self {
        Self
    }
}

impl Console for StdioConsole {
    fn read_line(&mut self, prompt: &str) -> Result<Option<String>> {
        let mut stdout = std::io::stdout();
        write!(stdout, "{prompt}").context("write prompt")?;
        stdout.flush().context("flush prompt")?;

        let mut line = String::new();
        let read = std::io::stdin()
            .lock()
            .read_line(&mut line)
            .context("read stdin")?;
        if read == 0 {
            return Ok(None);
        }
        while line.ends_with('\n') || line.ends_with('\r') {
            line.pop();
        }
        Ok(Some(line))
    }

    fn say(&mut self, text: &str) {
        println!("{text}");
    }

    fn warn(&mut self, text: &str) {
        eprintln!("error: {text}");
    }
}

/// Ask the user to accept or decline one proposed action.
///
/// Accepts exactly `y` or `n` (case-insensitive, trimmed); anything else
/// re-prompts. Blocks indefinitely: there is no timeout, which is the
/// intended behavior for an attended interactive session. End of input
/// declines, since declining never mutates anything.
pub fn confirm<C: Console>(console: &mut C, description: &str) -> Result<Decision> {
    let prompt = format!("apply {description}? [y/n] ");
    loop {
        let Some(answer) = console.read_line(&prompt)? else {
            return Ok(Decision::Decline);
        };
        match answer.trim().to_ascii_lowercase().as_str() {
            "y" => return Ok(Decision::Accept),
            "n" => return Ok(Decision::Decline),
            _ => console.say("please answer 'y' or 'n'"),
        }
    }
}
