// src/block_parser.rs
//! Markdown block parser.
//!
//! Lowers markdown into a flat, ordered sequence of typed [`Block`]s and
//! serializes a block sequence back to markdown. Every parse assigns fresh
//! block ids; the operations in `block_ops` are the id-preserving path.
//!
//! Node coverage is deliberately narrow: headings, paragraphs, list items
//! (one block per item, nesting depth in `level`) and fenced code. Container
//! nodes other than lists (blockquotes) are transparent, so their inner
//! paragraphs surface as ordinary paragraph blocks. Thematic breaks and raw
//! HTML are dropped. Inline formatting collapses to plain text, except
//! inline code which keeps its backticks.

use pulldown_cmark::{CodeBlockKind, Event, HeadingLevel, Parser, Tag, TagEnd};

use crate::models::{new_block_id, Block, BlockKind};

/// Result of a parse: the lowered blocks plus the source they came from
#[derive(Debug, Clone)]
pub struct ParseResult {
    pub blocks: Vec<Block>,
    pub markdown: String,
}

/// Text accumulated for one open list item
#[derive(Debug, Default)]
struct ItemState {
    text: String,
}

/// Parse markdown into an ordered block sequence.
///
/// Never fails: empty or whitespace-only input yields zero blocks, and any
/// trailing unstructured text degrades to a paragraph block.
pub fn parse_markdown(markdown: &str) -> ParseResult {
    let parser = Parser::new(markdown);

    let mut blocks: Vec<Block> = Vec::new();

    let mut current_text = String::new();
    let mut in_paragraph = false;
    let mut heading_level: Option<u8> = None;

    let mut in_code_block = false;
    let mut code_text = String::new();
    let mut code_lang: Option<String> = None;

    let mut list_depth: usize = 0;
    let mut item_stack: Vec<ItemState> = Vec::new();

    fn push_block(blocks: &mut Vec<Block>, kind: BlockKind, content: &str, level: Option<u8>, lang: Option<String>) {
        blocks.push(Block {
            id: new_block_id(),
            kind,
            content: content.to_string(),
            order: blocks.len(),
            level,
            lang,
        });
    }

    // An item's text becomes its block as soon as a nested container starts,
    // so children land after their parent in document order.
    fn flush_open_item(blocks: &mut Vec<Block>, item_stack: &mut [ItemState], list_depth: usize) {
        if let Some(item) = item_stack.last_mut() {
            let text = item.text.trim();
            if !text.is_empty() {
                let level = list_depth.saturating_sub(1) as u8;
                push_block(blocks, BlockKind::ListItem, text, Some(level), None);
            }
            item.text.clear();
        }
    }

    for event in parser {
        match event {
            Event::Start(tag) => match tag {
                Tag::Heading { level, .. } => {
                    let depth = match level {
                        HeadingLevel::H1 => 1,
                        HeadingLevel::H2 => 2,
                        HeadingLevel::H3 => 3,
                        HeadingLevel::H4 => 4,
                        HeadingLevel::H5 => 5,
                        HeadingLevel::H6 => 6,
                    };
                    heading_level = Some(depth);
                    current_text.clear();
                }
                Tag::Paragraph => {
                    if let Some(item) = item_stack.last_mut() {
                        // Loose list item: fold the paragraph into the item text
                        if !item.text.is_empty() && !item.text.ends_with(' ') {
                            item.text.push(' ');
                        }
                    } else {
                        in_paragraph = true;
                        current_text.clear();
                    }
                }
                Tag::List(_) => {
                    flush_open_item(&mut blocks, &mut item_stack, list_depth);
                    list_depth += 1;
                }
                Tag::Item => {
                    item_stack.push(ItemState::default());
                }
                Tag::CodeBlock(kind) => {
                    flush_open_item(&mut blocks, &mut item_stack, list_depth);
                    in_code_block = true;
                    code_text.clear();
                    code_lang = match kind {
                        CodeBlockKind::Fenced(info) if !info.is_empty() => Some(info.to_string()),
                        _ => None,
                    };
                }
                // Blockquotes are transparent; their paragraphs surface as
                // ordinary paragraph blocks
                _ => {}
            },
            Event::End(tag) => match tag {
                TagEnd::Heading(_) => {
                    if let Some(depth) = heading_level.take() {
                        push_block(&mut blocks, BlockKind::Heading, current_text.trim(), Some(depth), None);
                        current_text.clear();
                    }
                }
                TagEnd::Paragraph => {
                    if in_paragraph {
                        let text = current_text.trim();
                        if !text.is_empty() {
                            push_block(&mut blocks, BlockKind::Paragraph, text, None, None);
                        }
                        current_text.clear();
                        in_paragraph = false;
                    }
                }
                TagEnd::List(_) => {
                    list_depth = list_depth.saturating_sub(1);
                }
                TagEnd::Item => {
                    if let Some(item) = item_stack.pop() {
                        let text = item.text.trim();
                        if !text.is_empty() {
                            let level = list_depth.saturating_sub(1) as u8;
                            push_block(&mut blocks, BlockKind::ListItem, text, Some(level), None);
                        }
                    }
                }
                TagEnd::CodeBlock => {
                    if in_code_block {
                        push_block(&mut blocks, BlockKind::Code, &code_text, None, code_lang.take());
                        code_text.clear();
                        in_code_block = false;
                    }
                }
                _ => {}
            },
            Event::Text(text) => {
                if in_code_block {
                    code_text.push_str(&text);
                } else if let Some(item) = item_stack.last_mut() {
                    item.text.push_str(&text);
                } else {
                    current_text.push_str(&text);
                }
            }
            Event::Code(code) => {
                // Inline code keeps its backticks so re-serialization stays
                // equivalent markdown
                let inline = format!("`{}`", code);
                if in_code_block {
                    code_text.push_str(&inline);
                } else if let Some(item) = item_stack.last_mut() {
                    item.text.push_str(&inline);
                } else {
                    current_text.push_str(&inline);
                }
            }
            Event::SoftBreak | Event::HardBreak => {
                if in_code_block {
                    code_text.push('\n');
                } else if let Some(item) = item_stack.last_mut() {
                    item.text.push(' ');
                } else {
                    current_text.push(' ');
                }
            }
            // Rules, HTML and footnotes have no block representation
            _ => {}
        }
    }

    // Whatever is left over degrades to a paragraph rather than being lost
    let leftover = current_text.trim();
    if !leftover.is_empty() {
        push_block(&mut blocks, BlockKind::Paragraph, leftover, None, None);
    }

    log::debug!("parsed {} blocks from {} bytes of markdown", blocks.len(), markdown.len());

    ParseResult {
        blocks,
        markdown: markdown.to_string(),
    }
}

/// Serialize a block sequence back to markdown.
///
/// Blocks are emitted in `order`. Consecutive list items are separated by a
/// single newline so they stay one list; everything else gets a blank line.
pub fn blocks_to_markdown(blocks: &[Block]) -> String {
    let mut sorted: Vec<&Block> = blocks.iter().collect();
    sorted.sort_by_key(|b| b.order);

    let mut out = String::new();
    let mut prev_kind: Option<BlockKind> = None;

    for block in sorted {
        if prev_kind.is_some() {
            if prev_kind == Some(BlockKind::ListItem) && block.kind == BlockKind::ListItem {
                out.push('\n');
            } else {
                out.push_str("\n\n");
            }
        }

        match block.kind {
            BlockKind::Heading => {
                let depth = usize::from(block.level.unwrap_or(1)).clamp(1, 6);
                out.push_str(&"#".repeat(depth));
                out.push(' ');
                out.push_str(&block.content);
            }
            BlockKind::Paragraph => {
                out.push_str(&block.content);
            }
            BlockKind::ListItem => {
                let indent = "  ".repeat(usize::from(block.level.unwrap_or(0)));
                out.push_str(&indent);
                out.push_str("- ");
                out.push_str(&block.content);
            }
            BlockKind::Code => {
                out.push_str("```");
                if let Some(lang) = &block.lang {
                    out.push_str(lang);
                }
                out.push('\n');
                out.push_str(&block.content);
                if !block.content.is_empty() && !block.content.ends_with('\n') {
                    out.push('\n');
                }
                out.push_str("```");
            }
        }

        prev_kind = Some(block.kind);
    }

    out
}
