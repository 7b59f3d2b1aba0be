//! The interactive driver: one line of input per iteration.
//!
//! Input routing, context staging, model turns, and per-action
//! confirmation/execution all happen here, as explicit steps:
//!
//! - `@`-prefixed lines run a directive and return to the prompt without
//!   advancing the conversation.
//! - `quit`/`q` (or end of input) ends the session; pending staged blocks
//!   are discarded, not flushed.
//! - Anything else non-empty becomes a user turn (staged blocks merged in,
//!   in order), is sent to the model, and every proposed action is
//!   confirmed with the user before it executes.
//!
//! A model failure aborts only the current turn: the transcript is rolled
//! back to its pre-turn state and the driver returns to the prompt.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::{debug, warn};

use crate::core::action::{ActionError, Decision, ProposedAction};
use crate::core::directive::{self, Directive};
use crate::core::parser::{self, ParsedItem};
use crate::core::stage::{StageBuffer, compose_user_turn};
use crate::core::transcript::{Role, Transcript};
use crate::io::config::AgentConfig;
use crate::io::console::{Console, confirm};
use crate::io::fs as file_ops;
use crate::io::model::{ModelClient, ModelRequest};
use crate::io::prompt::system_prompt;
use crate::io::scan;

const INPUT_PROMPT: &str = "you> ";

/// All state for one interactive session.
pub struct Session {
    root: PathBuf,
    config: AgentConfig,
    system: String,
    transcript: Transcript,
    stage: StageBuffer,
}

impl Session {
    /// Create a session rooted at `root`, which must be an absolute path.
    pub fn new(root: PathBuf, config: AgentConfig) -> Result<Self> {
        let system = system_prompt(&root)?;
        Ok(Self {
            root,
            config,
            system,
            transcript: Transcript::new(),
            stage: StageBuffer::new(),
        })
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn staged_len(&self) -> usize {
        self.stage.len()
    }
}

/// How the user's line was routed.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Input<'a> {
    Empty,
    Quit,
    Directive(&'a str),
    Query(&'a str),
}

fn route(line: &str) -> Input<'_> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Input::Empty;
    }
    if trimmed.eq_ignore_ascii_case("quit") || trimmed.eq_ignore_ascii_case("q") {
        return Input::Quit;
    }
    if trimmed.starts_with('@') {
        return Input::Directive(trimmed);
    }
    Input::Query(trimmed)
}

/// Outcome of one driver iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    Continue,
    Quit,
}

/// Run the session until `quit` or end of input.
pub fn run<M: ModelClient, C: Console>(
    session: &mut Session,
    client: &M,
    console: &mut C,
) -> Result<()> {
    loop {
        if tick(session, client, console)? == TickOutcome::Quit {
            return Ok(());
        }
    }
}

/// One driver iteration: read a line, route it, handle it fully.
pub fn tick<M: ModelClient, C: Console>(
    session: &mut Session,
    client: &M,
    console: &mut C,
) -> Result<TickOutcome> {
    let Some(line) = console.read_line(INPUT_PROMPT)? else {
        return Ok(TickOutcome::Quit);
    };

    match route(&line) {
        Input::Empty => Ok(TickOutcome::Continue),
        Input::Quit => {
            if !session.stage.is_empty() {
                debug!(blocks = session.stage.len(), "discarding staged blocks on quit");
                console.say(&format!(
                    "discarding {} staged block(s)",
                    session.stage.len()
                ));
            }
            Ok(TickOutcome::Quit)
        }
        Input::Directive(line) => {
            handle_directive(session, console, line);
            Ok(TickOutcome::Continue)
        }
        Input::Query(query) => {
            handle_query(session, client, console, query)?;
            Ok(TickOutcome::Continue)
        }
    }
}

/// Run one directive. Directives never advance the conversation; errors are
/// reported and the prompt returns.
fn handle_directive<C: Console>(session: &mut Session, console: &mut C, line: &str) {
    let directive = match directive::parse(line) {
        Ok(directive) => directive,
        Err(err) => {
            console.warn(&err.to_string());
            return;
        }
    };

    match directive {
        Directive::Help => console.say(directive::help_text()),
        Directive::File(path) => match fs::read_to_string(session.root.join(&path)) {
            Ok(content) => {
                session.stage.push(format!("@file {path}"), content);
                console.say(&format!(
                    "staged {path} ({} block(s) pending)",
                    session.stage.len()
                ));
            }
            Err(err) => console.warn(&format!("could not read '{path}': {err}")),
        },
        Directive::Scan => {
            match scan::scan_overview(&session.root, session.config.scan_file_limit) {
                Ok(overview) => {
                    session.stage.push("@scan", overview);
                    console.say(&format!(
                        "staged working-tree overview ({} block(s) pending)",
                        session.stage.len()
                    ));
                }
                Err(err) => console.warn(&format!("scan failed: {err:#}")),
            }
        }
        Directive::Search(query) => {
            match scan::search(&session.root, &query, session.config.search_match_limit) {
                Ok(results) => {
                    session.stage.push(format!("@search {query}"), results);
                    console.say(&format!(
                        "staged search results for '{query}' ({} block(s) pending)",
                        session.stage.len()
                    ));
                }
                Err(err) => console.warn(&format!("search failed: {err:#}")),
            }
        }
    }
}

/// Send one full model turn and walk its proposed actions.
fn handle_query<M: ModelClient, C: Console>(
    session: &mut Session,
    client: &M,
    console: &mut C,
    query: &str,
) -> Result<()> {
    let staged = session.stage.flush();
    let body = compose_user_turn(&staged, query);

    let checkpoint = session.transcript.len();
    session.transcript.push(Role::User, body);

    console.say("thinking...");
    let request = ModelRequest {
        system: &session.system,
        turns: session.transcript.turns(),
    };
    let raw = match client.complete(&request) {
        Ok(raw) => raw,
        Err(err) => {
            // Abort only this turn: restore the transcript exactly as it was.
            session.transcript.rollback_to(checkpoint);
            warn!(error = %err, "model call failed");
            console.warn(&format!("{err} (turn discarded)"));
            return Ok(());
        }
    };
    session.transcript.push(Role::Model, raw.clone());

    let parsed = parser::parse(&raw);
    if !parsed.display_text.is_empty() {
        console.say(&parsed.display_text);
    }

    for item in parsed.items {
        match item {
            ParsedItem::Malformed { reason } => {
                console.warn(&format!("unusable action proposal: {reason}"));
                session
                    .transcript
                    .push(Role::Tool, format!("proposal could not be parsed: {reason}"));
            }
            ParsedItem::Action(action) => {
                let record = handle_action(session, console, &action)?;
                session.transcript.push(Role::Tool, record);
            }
        }
    }
    Ok(())
}

/// Confirm and (on accept) execute one action, returning the result line
/// recorded for the model. Declines and failures are recorded too; the
/// remaining actions still get their own prompts afterwards.
fn handle_action<C: Console>(
    session: &Session,
    console: &mut C,
    action: &ProposedAction,
) -> Result<String> {
    if let Some(preview) = file_ops::render_preview(&session.root, action) {
        console.say(&preview);
    }

    let description = action.describe();
    let decision = confirm(console, &description).context("read confirmation")?;
    if decision == Decision::Decline {
        console.say(&format!("declined {description}"));
        return Ok(format!("{description}: user declined"));
    }

    match file_ops::execute(&session.root, action) {
        Ok(outcome) => {
            console.say(&outcome.summary);
            Ok(match outcome.content {
                Some(content) => format!("{}\n{content}", outcome.summary),
                None => outcome.summary,
            })
        }
        Err(err) => {
            if matches!(err, ActionError::PathEscape(_)) {
                warn!(path = action.path(), "blocked path escape");
            }
            console.warn(&err.to_string());
            Ok(format!("{description}: failed: {err}"))
        }
    }
}
