//! Append-only conversation transcript.
//!
//! The transcript is the single source of truth for a session: user turns,
//! model turns, and tool-result turns, in the order they happened. It is
//! resent to the model in full on every round, and it only ever grows.
//! The one exception is [`Transcript::rollback_to`], which discards the
//! tail of a model round that failed before completing.

/// Who produced a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// Human input, including any staged context merged into it.
    User,
    /// Raw model response, proposals included.
    Model,
    /// Outcome of executing (or declining) a proposed action.
    Tool,
}

/// One entry in the transcript.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Turn {
    /// Contiguous index assigned on append, starting at 0.
    pub seq: u64,
    pub role: Role,
    pub content: String,
}

/// Ordered session transcript. In-memory only; nothing is persisted.
#[derive(Debug, Default, Clone)]
pub struct Transcript {
    turns: Vec<Turn>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a turn and return its sequence index.
    pub fn push(&mut self, role: Role, content: impl Into<String>) -> u64 {
        let seq = self.turns.len() as u64;
        self.turns.push(Turn {
            seq,
            role,
            content: content.into(),
        });
        seq
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// Discard turns appended after `len`, restoring the transcript to the
    /// length it had before a failed model round. Grows nothing.
    pub fn rollback_to(&mut self, len: usize) {
        self.turns.truncate(len);
    }
}
