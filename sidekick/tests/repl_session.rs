//! End-to-end driver tests over scripted console and model doubles.
//!
//! Each test runs a whole session in a temp workspace: scripted input lines
//! are consumed one per iteration, and running out of input ends the
//! session the same way end-of-stdin does.

use std::fs;
use std::path::Path;

use sidekick::core::transcript::Role;
use sidekick::io::config::AgentConfig;
use sidekick::io::model::ModelError;
use sidekick::repl::{Session, run};
use sidekick::test_support::{ScriptedClient, ScriptedConsole, tool_call};

fn session_in(root: &Path) -> Session {
    Session::new(root.to_path_buf(), AgentConfig::default()).expect("session")
}

fn seed(root: &Path, rel: &str, contents: &str) {
    let path = root.join(rel);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("mkdir");
    }
    fs::write(path, contents).expect("write");
}

#[test]
fn staged_files_merge_into_one_turn_in_directive_order() {
    let temp = tempfile::tempdir().expect("tempdir");
    seed(temp.path(), "notes.txt", "note content");
    seed(temp.path(), "plan.txt", "plan content");

    let mut session = session_in(temp.path());
    let client = ScriptedClient::replying(["All noted."]);
    let mut console = ScriptedConsole::new([
        "@file notes.txt",
        "@file plan.txt",
        "summarize these",
        "q",
    ]);

    run(&mut session, &client, &mut console).expect("run");

    let requests = client.captured_requests();
    assert_eq!(requests.len(), 1, "one model call");
    let user_turn = &requests[0][0];
    assert_eq!(user_turn.role, Role::User);
    let notes = user_turn.content.find("note content").expect("notes staged");
    let plan = user_turn.content.find("plan content").expect("plan staged");
    let query = user_turn.content.find("summarize these").expect("query");
    assert!(notes < plan && plan < query, "directive order preserved");

    assert_eq!(session.staged_len(), 0, "buffer empty after flush");
    assert_eq!(session.transcript().len(), 2, "user turn + model turn");
}

#[test]
fn each_proposed_action_gets_its_own_prompt_in_proposal_order() {
    let temp = tempfile::tempdir().expect("tempdir");
    seed(temp.path(), "a.txt", "keep me");

    let response = format!(
        "Working on it.\n{}\n{}\n{}",
        tool_call("read_file", &[("file_path", "ghost.txt")]),
        tool_call("create_file", &[("file_path", "b.txt"), ("content", "fresh")]),
        tool_call("delete_file", &[("file_path", "a.txt")]),
    );

    let mut session = session_in(temp.path());
    let client = ScriptedClient::replying([response]);
    // Accept the failing read, accept the create, decline the delete.
    let mut console = ScriptedConsole::new(["go", "y", "y", "n"]);

    run(&mut session, &client, &mut console).expect("run");

    let prompts = console.confirmation_prompts();
    assert_eq!(prompts.len(), 3, "one prompt per proposed action");
    assert!(prompts[0].contains("read ghost.txt"));
    assert!(prompts[1].contains("create b.txt"));
    assert!(prompts[2].contains("delete a.txt"));

    // Every action produced a result turn, in order.
    let tool_turns: Vec<&str> = session
        .transcript()
        .turns()
        .iter()
        .filter(|t| t.role == Role::Tool)
        .map(|t| t.content.as_str())
        .collect();
    assert_eq!(tool_turns.len(), 3);
    assert!(tool_turns[0].contains("failed"), "read of missing file fails");
    assert!(tool_turns[1].contains("created b.txt"));
    assert!(tool_turns[2].contains("user declined"));

    assert_eq!(
        fs::read_to_string(temp.path().join("b.txt")).expect("created"),
        "fresh"
    );
    assert_eq!(
        fs::read_to_string(temp.path().join("a.txt")).expect("survived decline"),
        "keep me"
    );
}

#[test]
fn declining_never_mutates_and_a_second_identical_proposal_finds_it_so() {
    let temp = tempfile::tempdir().expect("tempdir");
    seed(temp.path(), "precious.txt", "unchanged");

    let delete = tool_call("delete_file", &[("file_path", "precious.txt")]);
    let mut session = session_in(temp.path());
    let client = ScriptedClient::replying([delete.clone(), delete]);
    let mut console = ScriptedConsole::new(["remove it", "n", "try again", "n"]);

    run(&mut session, &client, &mut console).expect("run");

    assert_eq!(console.confirmation_prompts().len(), 2);
    assert_eq!(
        fs::read_to_string(temp.path().join("precious.txt")).expect("still there"),
        "unchanged"
    );
}

#[test]
fn accepted_create_on_existing_path_is_refused_and_content_survives() {
    let temp = tempfile::tempdir().expect("tempdir");
    seed(temp.path(), "a.txt", "original bytes");

    let mut session = session_in(temp.path());
    let client = ScriptedClient::replying([tool_call(
        "create_file",
        &[("file_path", "a.txt"), ("content", "clobbered")],
    )]);
    let mut console = ScriptedConsole::new(["make a.txt", "y"]);

    run(&mut session, &client, &mut console).expect("run");

    assert_eq!(
        fs::read_to_string(temp.path().join("a.txt")).expect("read"),
        "original bytes"
    );
    let last_tool = session
        .transcript()
        .turns()
        .iter()
        .rev()
        .find(|t| t.role == Role::Tool)
        .expect("result turn");
    assert!(last_tool.content.contains("already exists"));
}

#[test]
fn escaping_path_is_blocked_even_when_accepted() {
    let temp = tempfile::tempdir().expect("tempdir");
    let root = temp.path().join("inner");
    fs::create_dir(&root).expect("mkdir");
    seed(temp.path(), "outside.txt", "safe");

    let mut session = session_in(&root);
    let client = ScriptedClient::replying([tool_call(
        "delete_file",
        &[("file_path", "../outside.txt")],
    )]);
    let mut console = ScriptedConsole::new(["clean up", "y"]);

    run(&mut session, &client, &mut console).expect("run");

    assert!(temp.path().join("outside.txt").exists(), "file untouched");
    let last_tool = session
        .transcript()
        .turns()
        .iter()
        .rev()
        .find(|t| t.role == Role::Tool)
        .expect("result turn");
    assert!(last_tool.content.contains("outside the working directory"));
}

#[test]
fn edit_on_missing_file_records_not_found_and_the_loop_continues() {
    let temp = tempfile::tempdir().expect("tempdir");

    let edit = tool_call("edit_file", &[("file_path", "a.py"), ("content", "body")]);
    let mut session = session_in(temp.path());
    let client = ScriptedClient::replying([edit, "Just prose this time.".to_string()]);
    let mut console = ScriptedConsole::new(["fix a.py", "y", "thanks anyway"]);

    run(&mut session, &client, &mut console).expect("run");

    let tool_turn = session
        .transcript()
        .turns()
        .iter()
        .find(|t| t.role == Role::Tool)
        .expect("result turn");
    assert!(tool_turn.content.contains("does not exist"));

    // The follow-up query still went through: two model calls total.
    assert_eq!(client.captured_requests().len(), 2);
}

#[test]
fn adapter_failure_discards_the_turn_and_keeps_the_transcript_intact() {
    let temp = tempfile::tempdir().expect("tempdir");
    seed(temp.path(), "notes.txt", "note content");

    let mut session = session_in(temp.path());
    let client = ScriptedClient::new([
        Err(ModelError::Transport("connection refused".to_string())),
        Ok("Recovered.".to_string()),
    ]);
    let mut console = ScriptedConsole::new(["@file notes.txt", "hello", "hello again"]);

    run(&mut session, &client, &mut console).expect("run");

    assert!(
        console.warned.iter().any(|w| w.contains("turn discarded")),
        "failure is visible"
    );
    // First turn rolled back; only the successful round remains.
    assert_eq!(session.transcript().len(), 2);
    assert_eq!(session.transcript().turns()[1].content, "Recovered.");
    // Staged content was consumed by the failed attempt, not resurrected.
    assert_eq!(session.staged_len(), 0);
}

#[test]
fn quit_discards_staged_blocks_without_flushing() {
    let temp = tempfile::tempdir().expect("tempdir");
    seed(temp.path(), "notes.txt", "note content");

    let mut session = session_in(temp.path());
    let client = ScriptedClient::replying(Vec::<String>::new());
    let mut console = ScriptedConsole::new(["@file notes.txt", "q"]);

    run(&mut session, &client, &mut console).expect("run");

    assert_eq!(session.staged_len(), 1, "staged, never flushed");
    assert!(session.transcript().is_empty(), "no model call happened");
    assert!(client.captured_requests().is_empty());
}

#[test]
fn empty_input_is_a_noop_that_preserves_the_stage() {
    let temp = tempfile::tempdir().expect("tempdir");
    seed(temp.path(), "notes.txt", "note content");

    let mut session = session_in(temp.path());
    let client = ScriptedClient::replying(["Done."]);
    let mut console = ScriptedConsole::new(["@file notes.txt", "", "   ", "now use it", "q"]);

    run(&mut session, &client, &mut console).expect("run");

    let requests = client.captured_requests();
    assert_eq!(requests.len(), 1);
    assert!(requests[0][0].content.contains("note content"));
}

#[test]
fn unknown_directive_is_reported_without_touching_state() {
    let temp = tempfile::tempdir().expect("tempdir");

    let mut session = session_in(temp.path());
    let client = ScriptedClient::replying(Vec::<String>::new());
    let mut console = ScriptedConsole::new(["@frobnicate", "q"]);

    run(&mut session, &client, &mut console).expect("run");

    assert!(
        console.warned.iter().any(|w| w.contains("frobnicate")),
        "error names the directive"
    );
    assert_eq!(session.staged_len(), 0);
    assert!(session.transcript().is_empty());
}

#[test]
fn malformed_proposal_is_reported_and_does_not_prompt() {
    let temp = tempfile::tempdir().expect("tempdir");
    seed(temp.path(), "a.txt", "text");

    let response = format!(
        "{}\n{}",
        tool_call("run_shell", &[("file_path", "x")]),
        tool_call("read_file", &[("file_path", "a.txt")]),
    );
    let mut session = session_in(temp.path());
    let client = ScriptedClient::replying([response]);
    let mut console = ScriptedConsole::new(["go", "y"]);

    run(&mut session, &client, &mut console).expect("run");

    // Only the well-formed action prompted; the malformed one was recorded
    // for the model to retry.
    assert_eq!(console.confirmation_prompts().len(), 1);
    assert!(console.warned.iter().any(|w| w.contains("run_shell")));
    let malformed_turn = session
        .transcript()
        .turns()
        .iter()
        .find(|t| t.role == Role::Tool && t.content.contains("could not be parsed"))
        .expect("malformed result turn");
    assert!(malformed_turn.content.contains("run_shell"));
}
