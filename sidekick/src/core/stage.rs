//! Staging buffer for context queued ahead of the next model turn.
//!
//! Directives like `@file` append blocks here. The buffer is owned by the
//! session and drained atomically by [`StageBuffer::flush`] when the next
//! real query is sent; blocks are never sent twice. Blocks still pending at
//! session exit are simply discarded.

/// Context content queued by a directive, waiting for the next query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedBlock {
    /// Where the content came from, e.g. `@file notes.txt`.
    pub source: String,
    pub content: String,
}

/// Ordered staging buffer. Duplicates are allowed: re-staging the same
/// source appends a second copy rather than deduplicating.
#[derive(Debug, Default)]
pub struct StageBuffer {
    blocks: Vec<StagedBlock>,
}

impl StageBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, source: impl Into<String>, content: impl Into<String>) {
        self.blocks.push(StagedBlock {
            source: source.into(),
            content: content.into(),
        });
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Take every pending block, leaving the buffer empty.
    pub fn flush(&mut self) -> Vec<StagedBlock> {
        std::mem::take(&mut self.blocks)
    }
}

/// Merge staged blocks and the user's query into one outgoing turn body.
/// Blocks appear in staging order, each labeled with its source, followed by
/// the query itself.
pub fn compose_user_turn(blocks: &[StagedBlock], query: &str) -> String {
    let mut body = String::new();
    for block in blocks {
        body.push_str(&format!("[context: {}]\n{}\n\n", block.source, block.content));
    }
    body.push_str(query);
    body
}
