use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Sentinel anchor for `add` diffs meaning "insert before the first block"
pub const START_ANCHOR: &str = "__start__";

/// Smallest addressable unit of document content
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Block {
    /// Unique within a document, stable across edits, never reused
    pub id: String,
    #[serde(rename = "type")]
    pub kind: BlockKind,
    pub content: String,
    /// Zero-based position; dense across the document (no gaps)
    pub order: usize,
    /// Heading depth (1-6) or list-item nesting depth (0 = top level)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<u8>,
    /// Fence info string for code blocks
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lang: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum BlockKind {
    Heading,
    Paragraph,
    ListItem,
    Code,
}

/// A named container of block content
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EditorDocument {
    pub id: String,
    pub name: String,
    /// Free-form classification: "lesson", "guide", "custom", ...
    #[serde(rename = "type")]
    pub doc_type: String,
    /// Raw markdown, the source of truth
    pub content: String,
    /// Derived cache, kept consistent with `content` after every mutation
    pub blocks: Vec<Block>,
    pub is_dirty: bool,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PendingAction {
    Update,
    Add,
    Delete,
}

/// A proposed, not-yet-applied edit against a document's blocks
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PendingDiff {
    pub id: String,
    /// Target block id, or [`START_ANCHOR`] for an insert at the start
    pub block_id: String,
    pub action: PendingAction,
    pub old_content: String,
    /// For `add`: a JSON [`AddPayload`], or plain text treated as a paragraph
    pub new_content: String,
    /// Human-readable rationale, for display only
    pub reason: String,
    /// Pre-allocated id so a later diff in the same batch can anchor on
    /// a block that is not committed yet
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_block_id: Option<String>,
}

impl PendingDiff {
    pub fn new(
        block_id: &str,
        action: PendingAction,
        old_content: &str,
        new_content: &str,
        reason: &str,
    ) -> Self {
        Self {
            id: new_diff_id(),
            block_id: block_id.to_string(),
            action,
            old_content: old_content.to_string(),
            new_content: new_content.to_string(),
            reason: reason.to_string(),
            new_block_id: None,
        }
    }
}

/// Structured payload carried in an `add` diff's `new_content`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddPayload {
    #[serde(rename = "type")]
    pub kind: BlockKind,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<u8>,
}

/// Language for the human-readable summary strings; has no effect on
/// parsing or diffing
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Zh,
}

pub fn new_block_id() -> String {
    format!("block-{}", Uuid::new_v4())
}

pub fn new_document_id() -> String {
    format!("doc-{}", Uuid::new_v4())
}

pub fn new_diff_id() -> String {
    format!("diff-{}", Uuid::new_v4())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_serialization_shape() {
        let block = Block {
            id: new_block_id(),
            kind: BlockKind::ListItem,
            content: "Item 1".to_string(),
            order: 0,
            level: Some(0),
            lang: None,
        };

        let json = serde_json::to_value(&block).unwrap();
        assert_eq!(json["type"], "list-item");
        assert_eq!(json["content"], "Item 1");
        // lang is absent, not null
        assert!(json.get("lang").is_none());
    }

    #[test]
    fn test_pending_diff_roundtrip() {
        let diff = PendingDiff::new("block-abc", PendingAction::Update, "old", "new", "clarity");
        let json = serde_json::to_string(&diff).unwrap();
        let parsed: PendingDiff = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed.block_id, "block-abc");
        assert_eq!(parsed.action, PendingAction::Update);
        assert!(parsed.new_block_id.is_none());
        assert!(parsed.id.starts_with("diff-"));
    }

    #[test]
    fn test_add_payload_decodes_kebab_case_type() {
        let payload: AddPayload =
            serde_json::from_str(r#"{"type":"list-item","content":"Step 1","level":1}"#).unwrap();
        assert_eq!(payload.kind, BlockKind::ListItem);
        assert_eq!(payload.level, Some(1));
    }

    #[test]
    fn test_language_tags() {
        assert_eq!(serde_json::to_value(Language::En).unwrap(), "en");
        assert_eq!(serde_json::to_value(Language::Zh).unwrap(), "zh");
        assert_eq!(Language::default(), Language::En);
    }

    #[test]
    fn test_id_prefixes_are_distinct() {
        assert!(new_block_id().starts_with("block-"));
        assert!(new_document_id().starts_with("doc-"));
        assert!(new_diff_id().starts_with("diff-"));
        assert_ne!(new_block_id(), new_block_id());
    }
}
