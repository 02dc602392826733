// src/read_guard.rs
//! Read-before-write gate for agent-proposed edits.
//!
//! An agent must list a document's blocks before adding to it, and read
//! a specific block before updating or deleting it. The guard tracks
//! what has been read for the current document and answers with a
//! verdict naming the missing prerequisite call when a write is
//! premature. Switching documents resets everything.

use serde::Serialize;
use std::collections::HashSet;

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct GuardVerdict {
    pub allowed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl GuardVerdict {
    fn allow() -> Self {
        Self {
            allowed: true,
            error: None,
        }
    }

    fn deny(message: String) -> Self {
        Self {
            allowed: false,
            error: Some(message),
        }
    }
}

#[derive(Debug, Default)]
pub struct ReadWriteGuard {
    document_read: bool,
    read_blocks: HashSet<String>,
}

impl ReadWriteGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that the document's block listing was fetched.
    pub fn mark_document_read(&mut self) {
        self.document_read = true;
    }

    /// Record that an individual block's content was fetched.
    pub fn mark_block_read(&mut self, block_id: &str) {
        self.read_blocks.insert(block_id.to_string());
    }

    pub fn has_read_document(&self) -> bool {
        self.document_read
    }

    pub fn has_read_block(&self, block_id: &str) -> bool {
        self.read_blocks.contains(block_id)
    }

    /// Updates require the document listing plus the target block.
    pub fn can_edit(&self, block_id: &str) -> GuardVerdict {
        self.check_block(block_id, "edit")
    }

    /// Deletes have the same prerequisites as updates.
    pub fn can_delete(&self, block_id: &str) -> GuardVerdict {
        self.check_block(block_id, "delete")
    }

    /// Adds only require the document listing, since the new block does
    /// not exist yet.
    pub fn can_add(&self) -> GuardVerdict {
        if !self.document_read {
            return GuardVerdict::deny(
                "cannot add a block before listing the document; call list_blocks first"
                    .to_string(),
            );
        }
        GuardVerdict::allow()
    }

    fn check_block(&self, block_id: &str, action: &str) -> GuardVerdict {
        if !self.document_read {
            return GuardVerdict::deny(format!(
                "cannot {} block {} before listing the document; call list_blocks first",
                action, block_id
            ));
        }
        if !self.read_blocks.contains(block_id) {
            return GuardVerdict::deny(format!(
                "cannot {} block {} before reading it; call read_block first",
                action, block_id
            ));
        }
        GuardVerdict::allow()
    }

    /// Forget all reads. Used on document switch and after content is
    /// replaced wholesale.
    pub fn reset(&mut self) {
        log::debug!(
            "guard reset: clearing document flag and {} block reads",
            self.read_blocks.len()
        );
        self.document_read = false;
        self.read_blocks.clear();
    }

    /// The active document changed, so nothing previously read applies.
    pub fn on_document_change(&mut self) {
        self.reset();
    }
}
