//! Extraction of proposed actions from raw model output.
//!
//! Responses are prose with zero or more embedded blocks of the form:
//!
//! ```text
//! <tool_call type="create_file">
//! <parameter name="file_path">notes.txt</parameter>
//! <parameter name="content">hello</parameter>
//! </tool_call>
//! ```
//!
//! A block that cannot be classified becomes a [`ParsedItem::Malformed`]
//! entry at its position; later blocks still parse. Partial understanding is
//! preferred over total failure.

use std::sync::LazyLock;

use regex::Regex;

use crate::core::action::{EditChange, ProposedAction};

static TOOL_CALL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?s)<tool_call\s+type="([^"]*)">(.*?)</tool_call>"#).unwrap()
});
static PARAM_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?s)<parameter\s+name="([^"]*)">(.*?)</parameter>"#).unwrap());
static BLANK_RUN_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n\s*\n\s*\n").unwrap());

/// One positional entry from a response: a usable action or an explanation
/// of why a block was unusable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedItem {
    Action(ProposedAction),
    Malformed { reason: String },
}

/// A model response split into prose and ordered action items.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedResponse {
    /// Prose with all tool-call blocks removed and blank runs collapsed.
    pub display_text: String,
    /// Items in the order the model proposed them.
    pub items: Vec<ParsedItem>,
}

/// Parse a raw model response. Never fails: prose-only responses yield an
/// empty item list.
pub fn parse(raw: &str) -> ParsedResponse {
    let items = TOOL_CALL_RE
        .captures_iter(raw)
        .map(|caps| classify(&caps[1], &caps[2]))
        .collect();

    let without_blocks = TOOL_CALL_RE.replace_all(raw, "");
    let display_text = BLANK_RUN_RE
        .replace_all(&without_blocks, "\n\n")
        .trim()
        .to_string();

    ParsedResponse {
        display_text,
        items,
    }
}

/// Map one block to an action. Paths are trimmed; content payloads are used
/// verbatim.
fn classify(tool_type: &str, body: &str) -> ParsedItem {
    let params: Vec<(String, String)> = PARAM_RE
        .captures_iter(body)
        .map(|caps| (caps[1].to_string(), caps[2].to_string()))
        .collect();
    let lookup = |name: &str| params.iter().find(|(k, _)| k == name).map(|(_, v)| v.as_str());

    if !matches!(
        tool_type,
        "read_file" | "create_file" | "edit_file" | "delete_file"
    ) {
        return ParsedItem::Malformed {
            reason: format!("unknown tool type \"{tool_type}\""),
        };
    }

    let path = match lookup("file_path") {
        Some(path) if !path.trim().is_empty() => path.trim().to_string(),
        _ => {
            return ParsedItem::Malformed {
                reason: format!("{tool_type} block is missing \"file_path\""),
            };
        }
    };

    match tool_type {
        "read_file" => ParsedItem::Action(ProposedAction::Read { path }),
        "create_file" => match lookup("content") {
            Some(content) => ParsedItem::Action(ProposedAction::Create {
                path,
                content: content.to_string(),
            }),
            None => ParsedItem::Malformed {
                reason: "create_file block is missing \"content\"".to_string(),
            },
        },
        "edit_file" => classify_edit(path, &lookup),
        "delete_file" => ParsedItem::Action(ProposedAction::Delete { path }),
        _ => unreachable!("tool type checked above"),
    }
}

fn classify_edit<'a>(
    path: String,
    lookup: &impl Fn(&str) -> Option<&'a str>,
) -> ParsedItem {
    let content = lookup("content");
    let find = lookup("find");
    let replace = lookup("replace");

    match (content, find, replace) {
        (Some(content), None, None) => ParsedItem::Action(ProposedAction::Edit {
            path,
            change: EditChange::Replace {
                content: content.to_string(),
            },
        }),
        (None, Some(find), Some(replace)) => ParsedItem::Action(ProposedAction::Edit {
            path,
            change: EditChange::Patch {
                find: find.to_string(),
                replace: replace.to_string(),
            },
        }),
        _ => ParsedItem::Malformed {
            reason: "edit_file block needs either \"content\" or \"find\" + \"replace\""
                .to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn block(tool_type: &str, params: &[(&str, &str)]) -> String {
        let mut body = format!("<tool_call type=\"{tool_type}\">\n");
        for (name, value) in params {
            body.push_str(&format!(
                "<parameter name=\"{name}\">{value}</parameter>\n"
            ));
        }
        body.push_str("</tool_call>");
        body
    }

    #[test]
    fn prose_only_response_has_no_items() {
        let parsed = parse("Sure, that function reverses a string.");
        assert!(parsed.items.is_empty());
        assert_eq!(
            parsed.display_text,
            "Sure, that function reverses a string."
        );
    }

    #[test]
    fn mixed_response_keeps_prose_and_action_order() {
        let raw = format!(
            "I'll read both files.\n\n{}\n\n{}\n\nThen I'll summarize.",
            block("read_file", &[("file_path", "a.txt")]),
            block("read_file", &[("file_path", "b.txt")]),
        );

        let parsed = parse(&raw);
        assert_eq!(parsed.items.len(), 2);
        assert_eq!(
            parsed.items[0],
            ParsedItem::Action(ProposedAction::Read {
                path: "a.txt".to_string()
            })
        );
        assert_eq!(
            parsed.items[1],
            ParsedItem::Action(ProposedAction::Read {
                path: "b.txt".to_string()
            })
        );
        assert!(parsed.display_text.contains("I'll read both files."));
        assert!(parsed.display_text.contains("Then I'll summarize."));
        assert!(!parsed.display_text.contains("tool_call"));
    }

    #[test]
    fn create_and_both_edit_forms_classify() {
        let raw = format!(
            "{}\n{}\n{}",
            block("create_file", &[("file_path", "n.txt"), ("content", "hi")]),
            block("edit_file", &[("file_path", "a.py"), ("content", "new body")]),
            block(
                "edit_file",
                &[("file_path", "b.py"), ("find", "old"), ("replace", "new")],
            ),
        );

        let parsed = parse(&raw);
        assert_eq!(
            parsed.items[0],
            ParsedItem::Action(ProposedAction::Create {
                path: "n.txt".to_string(),
                content: "hi".to_string(),
            })
        );
        assert_eq!(
            parsed.items[1],
            ParsedItem::Action(ProposedAction::Edit {
                path: "a.py".to_string(),
                change: EditChange::Replace {
                    content: "new body".to_string()
                },
            })
        );
        assert_eq!(
            parsed.items[2],
            ParsedItem::Action(ProposedAction::Edit {
                path: "b.py".to_string(),
                change: EditChange::Patch {
                    find: "old".to_string(),
                    replace: "new".to_string(),
                },
            })
        );
    }

    #[test]
    fn malformed_block_does_not_abort_later_blocks() {
        let raw = format!(
            "{}\n{}\n{}",
            block("run_shell", &[("file_path", "x")]),
            block("edit_file", &[("file_path", "a.py")]),
            block("delete_file", &[("file_path", "tmp.txt")]),
        );

        let parsed = parse(&raw);
        assert_eq!(parsed.items.len(), 3);
        assert!(matches!(
            &parsed.items[0],
            ParsedItem::Malformed { reason } if reason.contains("run_shell")
        ));
        assert!(matches!(
            &parsed.items[1],
            ParsedItem::Malformed { reason } if reason.contains("edit_file")
        ));
        assert_eq!(
            parsed.items[2],
            ParsedItem::Action(ProposedAction::Delete {
                path: "tmp.txt".to_string()
            })
        );
    }

    #[test]
    fn missing_path_is_malformed() {
        let parsed = parse(&block("read_file", &[]));
        assert!(matches!(
            &parsed.items[0],
            ParsedItem::Malformed { reason } if reason.contains("file_path")
        ));
    }

    #[test]
    fn content_payload_is_verbatim_including_whitespace() {
        let raw = block(
            "create_file",
            &[("file_path", "  spaced.txt  "), ("content", "  indented\nlines  ")],
        );
        let parsed = parse(&raw);
        assert_eq!(
            parsed.items[0],
            ParsedItem::Action(ProposedAction::Create {
                path: "spaced.txt".to_string(),
                content: "  indented\nlines  ".to_string(),
            })
        );
    }

    #[test]
    fn blank_runs_collapse_where_blocks_were_removed() {
        let raw = format!(
            "Before.\n\n{}\n\n\n\nAfter.",
            block("read_file", &[("file_path", "a.txt")]),
        );
        let parsed = parse(&raw);
        assert!(!parsed.display_text.contains("\n\n\n"));
        assert!(parsed.display_text.starts_with("Before."));
        assert!(parsed.display_text.ends_with("After."));
    }
}
