//! Test-only scripted doubles for the driver's seams.

use std::cell::RefCell;
use std::collections::VecDeque;

use anyhow::Result;

use crate::core::transcript::Turn;
use crate::io::console::Console;
use crate::io::model::{ModelClient, ModelError, ModelRequest};

/// Model client that returns predetermined responses and records every
/// request's transcript, without any network traffic.
pub struct ScriptedClient {
    responses: RefCell<VecDeque<Result<String, ModelError>>>,
    captured: RefCell<Vec<Vec<Turn>>>,
}

impl ScriptedClient {
    pub fn new(responses: impl IntoIterator<Item = Result<String, ModelError>>) -> Self {
        Self {
            responses: RefCell::new(responses.into_iter().collect()),
            captured: RefCell::new(Vec::new()),
        }
    }

    /// Shorthand for a client whose every response succeeds.
    pub fn replying(texts: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self::new(texts.into_iter().map(|t| Ok(t.into())))
    }

    /// Transcripts as they were sent, one entry per completed call.
    pub fn captured_requests(&self) -> Vec<Vec<Turn>> {
        self.captured.borrow().clone()
    }
}

impl ModelClient for ScriptedClient {
    fn complete(&self, request: &ModelRequest<'_>) -> Result<String, ModelError> {
        self.captured.borrow_mut().push(request.turns.to_vec());
        self.responses
            .borrow_mut()
            .pop_front()
            .expect("scripted client exhausted")
    }
}

/// Console that replays scripted input lines and records everything shown.
#[derive(Debug, Default)]
pub struct ScriptedConsole {
    inputs: VecDeque<String>,
    /// Every prompt passed to `read_line`, in order.
    pub prompts: Vec<String>,
    pub said: Vec<String>,
    pub warned: Vec<String>,
}

impl ScriptedConsole {
    pub fn new(inputs: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            inputs: inputs.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Confirmation prompts shown so far, in order.
    pub fn confirmation_prompts(&self) -> Vec<&String> {
        self.prompts.iter().filter(|p| p.contains("[y/n]")).collect()
    }
}

impl Console for ScriptedConsole {
    fn read_line(&mut self, prompt: &str) -> Result<Option<String>> {
        self.prompts.push(prompt.to_string());
        Ok(self.inputs.pop_front())
    }

    fn say(&mut self, text: &str) {
        self.said.push(text.to_string());
    }

    fn warn(&mut self, text: &str) {
        self.warned.push(text.to_string());
    }
}

/// Build one wire-format tool-call block for scripted responses.
pub fn tool_call(tool_type: &str, params: &[(&str, &str)]) -> String {
    let mut block = format!("<tool_call type=\"{tool_type}\">\n");
    for (name, value) in params {
        block.push_str(&format!("<parameter name=\"{name}\">{value}</parameter>\n"));
    }
    block.push_str("</tool_call>");
    block
}
