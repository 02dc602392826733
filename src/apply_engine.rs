// src/apply_engine.rs
//! Applies a batch of pending diffs to a document.
//!
//! Diffs are processed in array order. `add` diffs carry a JSON payload
//! describing the block; plain text payloads degrade to a paragraph.
//! Any anchor failure aborts the whole batch, and because the engine
//! works on an owned block vector, the caller's document is untouched
//! on error.
//!
//! Two entry points: [`apply_diffs`] parses markdown first (fresh block
//! ids, so diffs must come from that same parse), while
//! [`apply_diffs_to_blocks`] runs against an existing block cache and
//! is what the session uses so queued diffs keep resolving.

use thiserror::Error;

use crate::block_ops::{self, BlockOpError};
use crate::block_parser::{blocks_to_markdown, parse_markdown};
use crate::models::{
    AddPayload, Block, BlockKind, Language, PendingAction, PendingDiff, START_ANCHOR,
};

#[derive(Debug, Error)]
pub enum ApplyError {
    #[error(transparent)]
    Anchor(#[from] BlockOpError),
}

/// One successfully applied diff, described for the change log.
#[derive(Debug, Clone)]
pub struct AppliedChange {
    pub diff_id: String,
    pub action: PendingAction,
    pub description: String,
}

/// Result of applying a batch.
#[derive(Debug, Clone)]
pub struct ApplyOutcome {
    pub updated_markdown: String,
    pub blocks: Vec<Block>,
    pub summary: String,
    pub applied: Vec<AppliedChange>,
}

/// Parse `markdown` and apply `diffs` in order. The parse assigns fresh
/// block ids, so diffs must reference ids generated against this exact
/// content.
pub fn apply_diffs(
    markdown: &str,
    diffs: &[PendingDiff],
    language: Language,
) -> Result<ApplyOutcome, ApplyError> {
    let blocks = parse_markdown(markdown).blocks;
    apply_diffs_to_blocks(blocks, diffs, language)
}

/// Apply `diffs` in order to an existing block sequence. All-or-nothing:
/// on any error the partially mutated vector is dropped.
pub fn apply_diffs_to_blocks(
    blocks: Vec<Block>,
    diffs: &[PendingDiff],
    language: Language,
) -> Result<ApplyOutcome, ApplyError> {
    let mut blocks = blocks;
    let mut applied = Vec::with_capacity(diffs.len());

    for diff in diffs {
        let description = match diff.action {
            PendingAction::Update => {
                blocks = block_ops::update_block_content(&blocks, &diff.block_id, &diff.new_content);
                describe_update(&blocks, &diff.block_id, language)
            }
            PendingAction::Add => {
                let payload = decode_add_payload(&diff.new_content);
                let anchor = if diff.block_id == START_ANCHOR {
                    None
                } else {
                    Some(diff.block_id.as_str())
                };
                let insertion = block_ops::add_block(
                    &blocks,
                    anchor,
                    payload.kind,
                    &payload.content,
                    payload.level,
                    diff.new_block_id.clone(),
                )?;
                let description = describe_add(&insertion.new_block, language);
                blocks = insertion.blocks;
                description
            }
            PendingAction::Delete => {
                let description = describe_delete(&blocks, &diff.block_id, language);
                blocks = block_ops::delete_block(&blocks, &diff.block_id);
                description
            }
        };

        applied.push(AppliedChange {
            diff_id: diff.id.clone(),
            action: diff.action,
            description,
        });
    }

    let updated_markdown = blocks_to_markdown(&blocks);
    let summary = summarize(&applied, language);

    log::debug!(
        "apply: {} diffs applied, {} blocks, {} chars of markdown",
        applied.len(),
        blocks.len(),
        updated_markdown.len()
    );

    Ok(ApplyOutcome {
        updated_markdown,
        blocks,
        summary,
        applied,
    })
}

/// Decode an `add` payload. Malformed or plain-text payloads become a
/// paragraph carrying the raw text.
fn decode_add_payload(raw: &str) -> AddPayload {
    match serde_json::from_str::<AddPayload>(raw) {
        Ok(payload) => payload,
        Err(_) => AddPayload {
            kind: BlockKind::Paragraph,
            content: raw.to_string(),
            level: None,
        },
    }
}

fn kind_label(kind: BlockKind, language: Language) -> &'static str {
    match (kind, language) {
        (BlockKind::Heading, Language::En) => "heading",
        (BlockKind::Paragraph, Language::En) => "paragraph",
        (BlockKind::ListItem, Language::En) => "list item",
        (BlockKind::Code, Language::En) => "code block",
        (BlockKind::Heading, Language::Zh) => "标题",
        (BlockKind::Paragraph, Language::Zh) => "段落",
        (BlockKind::ListItem, Language::Zh) => "列表项",
        (BlockKind::Code, Language::Zh) => "代码块",
    }
}

fn describe_update(blocks: &[Block], block_id: &str, language: Language) -> String {
    let kind = blocks.iter().find(|b| b.id == block_id).map(|b| b.kind);
    match (kind, language) {
        (Some(kind), Language::En) => format!("Updated {} {}", kind_label(kind, language), block_id),
        (Some(kind), Language::Zh) => format!("已更新{} {}", kind_label(kind, language), block_id),
        (None, Language::En) => format!("Updated block {}", block_id),
        (None, Language::Zh) => format!("已更新块 {}", block_id),
    }
}

fn describe_add(block: &Block, language: Language) -> String {
    match language {
        Language::En => format!(
            "Added {} {} at position {}",
            kind_label(block.kind, language),
            block.id,
            block.order
        ),
        Language::Zh => format!(
            "已在位置 {} 新增{} {}",
            block.order,
            kind_label(block.kind, language),
            block.id
        ),
    }
}

fn describe_delete(blocks: &[Block], block_id: &str, language: Language) -> String {
    let kind = blocks.iter().find(|b| b.id == block_id).map(|b| b.kind);
    match (kind, language) {
        (Some(kind), Language::En) => format!("Deleted {} {}", kind_label(kind, language), block_id),
        (Some(kind), Language::Zh) => format!("已删除{} {}", kind_label(kind, language), block_id),
        (None, Language::En) => format!("Deleted block {}", block_id),
        (None, Language::Zh) => format!("已删除块 {}", block_id),
    }
}

fn summarize(applied: &[AppliedChange], language: Language) -> String {
    let updated = applied
        .iter()
        .filter(|c| c.action == PendingAction::Update)
        .count();
    let added = applied
        .iter()
        .filter(|c| c.action == PendingAction::Add)
        .count();
    let deleted = applied
        .iter()
        .filter(|c| c.action == PendingAction::Delete)
        .count();

    match language {
        Language::En => format!(
            "Applied {} change(s): {} updated, {} added, {} deleted.",
            applied.len(),
            updated,
            added,
            deleted
        ),
        Language::Zh => format!(
            "已应用 {} 项更改：更新 {} 项，新增 {} 项，删除 {} 项。",
            applied.len(),
            updated,
            added,
            deleted
        ),
    }
}
