pub mod models;
pub mod block_parser;
pub mod block_ops;
pub mod diff_service;
pub mod document_manager;
pub mod read_guard;
pub mod apply_engine;
pub mod change_log;
pub mod config;
pub mod session;

pub use apply_engine::{apply_diffs, apply_diffs_to_blocks, ApplyError, ApplyOutcome, AppliedChange};
pub use block_ops::{add_block, delete_block, update_block_content, BlockInsertion, BlockOpError};
pub use block_parser::{blocks_to_markdown, parse_markdown, ParseResult};
pub use change_log::{ChangeLog, ChangeRecord};
pub use config::{ConfigError, EditorConfig};
pub use diff_service::{
    format_diff_for_display, generate_diff, generate_word_diff, ChangeKind, DiffChange, DiffResult,
};
pub use document_manager::{DocumentManager, NewDocument};
pub use models::{
    AddPayload, Block, BlockKind, EditorDocument, Language, PendingAction, PendingDiff,
    START_ANCHOR,
};
pub use read_guard::{GuardVerdict, ReadWriteGuard};
pub use session::EditorSession;
