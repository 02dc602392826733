// src/block_ops.rs
//! Pure, id-preserving transforms over a document's block sequence.
//!
//! Every operation takes the current blocks by reference and returns a
//! fresh vector with dense `order` values. Block ids survive updates and
//! reindexing; only `delete_block` removes them and only `add_block`
//! introduces new ones.

use thiserror::Error;

use crate::models::{new_block_id, Block, BlockKind};

#[derive(Debug, Error, PartialEq)]
pub enum BlockOpError {
    #[error("anchor block not found: {anchor}")]
    AnchorNotFound { anchor: String },
}

/// Result of a successful insert: the new sequence plus a copy of the
/// inserted block as it appears in that sequence.
#[derive(Debug, Clone)]
pub struct BlockInsertion {
    pub blocks: Vec<Block>,
    pub new_block: Block,
}

/// Replace the content of the block with `block_id`, leaving id, kind,
/// level and order untouched. Unknown ids are a silent no-op.
pub fn update_block_content(blocks: &[Block], block_id: &str, new_content: &str) -> Vec<Block> {
    blocks
        .iter()
        .map(|b| {
            if b.id == block_id {
                let mut updated = b.clone();
                updated.content = new_content.to_string();
                updated
            } else {
                b.clone()
            }
        })
        .collect()
}

/// Insert a new block after `after_block_id`, or at the start of the
/// document when the anchor is `None`.
///
/// A caller may pass `explicit_id` to pre-allocate the id (so later
/// operations in the same batch can anchor on it); otherwise a fresh id
/// is generated.
pub fn add_block(
    blocks: &[Block],
    after_block_id: Option<&str>,
    kind: BlockKind,
    content: &str,
    level: Option<u8>,
    explicit_id: Option<String>,
) -> Result<BlockInsertion, BlockOpError> {
    let insert_at = match after_block_id {
        None => 0,
        Some(anchor) => {
            let position = blocks.iter().position(|b| b.id == anchor).ok_or_else(|| {
                BlockOpError::AnchorNotFound {
                    anchor: anchor.to_string(),
                }
            })?;
            position + 1
        }
    };

    let new_block = Block {
        id: explicit_id.unwrap_or_else(new_block_id),
        kind,
        content: content.to_string(),
        order: insert_at,
        level,
        lang: None,
    };

    let mut result: Vec<Block> = blocks.to_vec();
    result.insert(insert_at, new_block);
    reindex(&mut result);

    log::debug!(
        "add_block: inserted {} at position {} ({} blocks total)",
        result[insert_at].id,
        insert_at,
        result.len()
    );

    let new_block = result[insert_at].clone();
    Ok(BlockInsertion {
        blocks: result,
        new_block,
    })
}

/// Remove the block with `block_id` and close the gap. Unknown ids are a
/// silent no-op.
pub fn delete_block(blocks: &[Block], block_id: &str) -> Vec<Block> {
    let mut result: Vec<Block> = blocks.iter().filter(|b| b.id != block_id).cloned().collect();
    reindex(&mut result);
    result
}

fn reindex(blocks: &mut [Block]) {
    for (i, block) in blocks.iter_mut().enumerate() {
        block.order = i;
    }
}
