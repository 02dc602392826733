// src/diff_service.rs
//! Text diffing for change previews.
//!
//! Two granularities: line diffs (with change counters, used for the
//! side-by-side preview) and word diffs (used for inline highlighting).
//! Both return flat change lists ordered as they appear in the text.

use serde::{Deserialize, Serialize};
use similar::{ChangeTag, TextDiff};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    Add,
    Remove,
    Unchanged,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DiffChange {
    #[serde(rename = "type")]
    pub kind: ChangeKind,
    pub value: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiffResult {
    pub changes: Vec<DiffChange>,
    pub additions: usize,
    pub deletions: usize,
    pub unchanged: usize,
}

/// Line-level diff from `old_text` to `new_text`. Counters count whole
/// lines, not characters.
pub fn generate_diff(old_text: &str, new_text: &str) -> DiffResult {
    let diff = TextDiff::from_lines(old_text, new_text);

    let mut changes = Vec::new();
    let mut additions = 0;
    let mut deletions = 0;
    let mut unchanged = 0;

    for change in diff.iter_all_changes() {
        let kind = match change.tag() {
            ChangeTag::Insert => {
                additions += 1;
                ChangeKind::Add
            }
            ChangeTag::Delete => {
                deletions += 1;
                ChangeKind::Remove
            }
            ChangeTag::Equal => {
                unchanged += 1;
                ChangeKind::Unchanged
            }
        };
        changes.push(DiffChange {
            kind,
            value: change.value().to_string(),
        });
    }

    log::debug!(
        "generate_diff: +{} -{} ={} lines",
        additions,
        deletions,
        unchanged
    );

    DiffResult {
        changes,
        additions,
        deletions,
        unchanged,
    }
}

/// Word-level diff for inline highlighting. Tokens include the
/// whitespace runs between words, so concatenating the removed and
/// unchanged values reproduces `old_text`, and the added and unchanged
/// values reproduce `new_text`.
pub fn generate_word_diff(old_text: &str, new_text: &str) -> Vec<DiffChange> {
    let diff = TextDiff::from_words(old_text, new_text);

    diff.iter_all_changes()
        .map(|change| DiffChange {
            kind: match change.tag() {
                ChangeTag::Insert => ChangeKind::Add,
                ChangeTag::Delete => ChangeKind::Remove,
                ChangeTag::Equal => ChangeKind::Unchanged,
            },
            value: change.value().to_string(),
        })
        .collect()
}

/// Render a line diff in unified style, one prefixed line per change.
pub fn format_diff_for_display(result: &DiffResult) -> String {
    result
        .changes
        .iter()
        .map(|change| {
            let prefix = match change.kind {
                ChangeKind::Add => "+ ",
                ChangeKind::Remove => "- ",
                ChangeKind::Unchanged => "  ",
            };
            format!("{}{}", prefix, change.value.trim_end_matches('\n'))
        })
        .collect::<Vec<String>>()
        .join("\n")
}
