// src/session.rs
//! Editing session: the composition point.
//!
//! Owns the document manager, the per-document pending-diff queues, the
//! read guard, the config, and the change log. Applying a diff runs it
//! through the apply engine against the active document's block cache
//! and commits the result; the queue is keyed per document, so
//! switching the active document swaps which queue is current and
//! resets the guard.

use std::collections::HashMap;

use crate::apply_engine::{apply_diffs_to_blocks, ApplyError};
use crate::change_log::ChangeLog;
use crate::config::EditorConfig;
use crate::document_manager::DocumentManager;
use crate::models::PendingDiff;
use crate::read_guard::ReadWriteGuard;

pub struct EditorSession {
    manager: DocumentManager,
    guard: ReadWriteGuard,
    config: EditorConfig,
    change_log: ChangeLog,
    pending: HashMap<String, Vec<PendingDiff>>,
}

impl EditorSession {
    pub fn new(manager: DocumentManager, config: EditorConfig) -> Self {
        let change_log = ChangeLog::new(config.history_limit);
        Self {
            manager,
            guard: ReadWriteGuard::new(),
            config,
            change_log,
            pending: HashMap::new(),
        }
    }

    pub fn manager(&self) -> &DocumentManager {
        &self.manager
    }

    pub fn manager_mut(&mut self) -> &mut DocumentManager {
        &mut self.manager
    }

    pub fn guard(&self) -> &ReadWriteGuard {
        &self.guard
    }

    pub fn guard_mut(&mut self) -> &mut ReadWriteGuard {
        &mut self.guard
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn change_log(&self) -> &ChangeLog {
        &self.change_log
    }

    /// Switch the active document. On success the guard resets, since
    /// reads against the previous document no longer count.
    pub fn set_active_document(&mut self, id: &str) -> bool {
        if self.manager.set_active_document(id) {
            self.guard.on_document_change();
            true
        } else {
            false
        }
    }

    /// Queue a diff against the active document. Returns false when no
    /// document is active.
    pub fn queue_diff(&mut self, diff: PendingDiff) -> bool {
        let Some(doc_id) = self.manager.active_document_id() else {
            log::warn!("queue_diff: no active document, diff {} dropped", diff.id);
            return false;
        };
        self.pending
            .entry(doc_id.to_string())
            .or_default()
            .push(diff);
        true
    }

    /// The active document's queue, oldest first.
    pub fn pending_diffs(&self) -> &[PendingDiff] {
        self.manager
            .active_document_id()
            .and_then(|id| self.pending.get(id))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Apply a single queued diff to the active document. `Ok(false)`
    /// when the id is not queued or no document is active; the diff
    /// leaves the queue only if it applied.
    pub fn apply_diff(&mut self, diff_id: &str) -> Result<bool, ApplyError> {
        let Some(doc_id) = self.manager.active_document_id().map(String::from) else {
            return Ok(false);
        };
        let Some(queue) = self.pending.get(&doc_id) else {
            return Ok(false);
        };
        let Some(position) = queue.iter().position(|d| d.id == diff_id) else {
            return Ok(false);
        };

        let diff = queue[position].clone();
        self.commit_batch(&doc_id, std::slice::from_ref(&diff))?;

        if let Some(queue) = self.pending.get_mut(&doc_id) {
            queue.remove(position);
        }
        Ok(true)
    }

    /// Remove a queued diff without applying it.
    pub fn reject_diff(&mut self, diff_id: &str) -> bool {
        let Some(doc_id) = self.manager.active_document_id() else {
            return false;
        };
        let Some(queue) = self.pending.get_mut(doc_id) else {
            return false;
        };
        let before = queue.len();
        queue.retain(|d| d.id != diff_id);
        queue.len() != before
    }

    /// Apply the whole active queue as one batch, in queue order.
    /// All-or-nothing: on error the document and the queue are left as
    /// they were, so the caller can repair and retry.
    pub fn apply_all_diffs(&mut self) -> Result<usize, ApplyError> {
        let Some(doc_id) = self.manager.active_document_id().map(String::from) else {
            return Ok(0);
        };
        let batch = match self.pending.get(&doc_id) {
            Some(queue) if !queue.is_empty() => queue.clone(),
            _ => return Ok(0),
        };

        self.commit_batch(&doc_id, &batch)?;

        let applied = batch.len();
        self.pending.remove(&doc_id);
        log::debug!("apply_all_diffs: {} diffs committed to {}", applied, doc_id);
        Ok(applied)
    }

    /// Drop every diff queued against the active document.
    pub fn reject_all_diffs(&mut self) -> usize {
        let Some(doc_id) = self.manager.active_document_id() else {
            return 0;
        };
        self.pending.remove(doc_id).map(|q| q.len()).unwrap_or(0)
    }

    /// Run a batch through the apply engine against the document's
    /// block cache and commit the result. The cache keeps block ids
    /// stable across applies, so later queued diffs still resolve.
    fn commit_batch(&mut self, doc_id: &str, batch: &[PendingDiff]) -> Result<(), ApplyError> {
        let blocks = match self.manager.document(doc_id) {
            Some(doc) => doc.blocks.clone(),
            None => return Ok(()),
        };

        let outcome = apply_diffs_to_blocks(blocks, batch, self.config.language)?;
        self.manager.update_document_blocks(doc_id, outcome.blocks);
        self.change_log.record(doc_id, &outcome.applied);
        log::debug!("{}", outcome.summary);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document_manager::NewDocument;
    use crate::models::{PendingAction, START_ANCHOR};

    fn session_with_doc(content: &str) -> (EditorSession, String) {
        let mut manager = DocumentManager::default();
        let id = manager.add_document(NewDocument {
            name: "Lesson".to_string(),
            doc_type: "lesson".to_string(),
            content: content.to_string(),
        });
        (EditorSession::new(manager, EditorConfig::default()), id)
    }

    #[test]
    fn test_queue_and_apply_single_diff() {
        let (mut session, doc_id) = session_with_doc("# Title\n\nOld body.");
        let block_id = session.manager().document(&doc_id).unwrap().blocks[1]
            .id
            .clone();

        let diff = PendingDiff::new(&block_id, PendingAction::Update, "Old body.", "New body.", "");
        let diff_id = diff.id.clone();
        assert!(session.queue_diff(diff));
        assert_eq!(session.pending_diffs().len(), 1);

        let applied = session.apply_diff(&diff_id).unwrap();
        assert!(applied);
        assert!(session.pending_diffs().is_empty());

        let doc = session.manager().document(&doc_id).unwrap();
        assert!(doc.content.contains("New body."));
        assert!(doc.is_dirty);
        assert_eq!(session.change_log().len(), 1);
    }

    #[test]
    fn test_apply_unknown_diff_id() {
        let (mut session, _) = session_with_doc("text");
        assert!(!session.apply_diff("diff-missing").unwrap());
    }

    #[test]
    fn test_queue_without_active_document() {
        let mut session = EditorSession::new(DocumentManager::default(), EditorConfig::default());
        let diff = PendingDiff::new("block-x", PendingAction::Update, "", "", "");
        assert!(!session.queue_diff(diff));
        assert!(session.pending_diffs().is_empty());
    }

    #[test]
    fn test_reject_diff_leaves_document_untouched() {
        let (mut session, doc_id) = session_with_doc("Original.");
        let block_id = session.manager().document(&doc_id).unwrap().blocks[0]
            .id
            .clone();

        let diff = PendingDiff::new(&block_id, PendingAction::Update, "Original.", "Changed.", "");
        let diff_id = diff.id.clone();
        session.queue_diff(diff);

        assert!(session.reject_diff(&diff_id));
        assert!(session.pending_diffs().is_empty());
        assert_eq!(
            session.manager().document(&doc_id).unwrap().content,
            "Original."
        );
        assert!(session.change_log().is_empty());
    }

    #[test]
    fn test_apply_all_processes_in_queue_order() {
        let (mut session, doc_id) = session_with_doc("");

        let mut first = PendingDiff::new(
            START_ANCHOR,
            PendingAction::Add,
            "",
            r#"{"type":"heading","content":"Plan","level":1}"#,
            "",
        );
        first.new_block_id = Some("block-plan".to_string());
        let second = PendingDiff::new(
            "block-plan",
            PendingAction::Add,
            "",
            "Intro paragraph.",
            "",
        );
        session.queue_diff(first);
        session.queue_diff(second);

        let applied = session.apply_all_diffs().unwrap();
        assert_eq!(applied, 2);

        let doc = session.manager().document(&doc_id).unwrap();
        assert_eq!(doc.content, "# Plan\n\nIntro paragraph.");
        assert_eq!(session.change_log().len(), 2);
    }

    #[test]
    fn test_failed_batch_keeps_queue_and_content() {
        let (mut session, doc_id) = session_with_doc("# Keep me");

        session.queue_diff(PendingDiff::new(
            START_ANCHOR,
            PendingAction::Add,
            "",
            "fine",
            "",
        ));
        session.queue_diff(PendingDiff::new(
            "block-bad-anchor",
            PendingAction::Add,
            "",
            "never lands",
            "",
        ));

        assert!(session.apply_all_diffs().is_err());
        // nothing committed, nothing dequeued
        assert_eq!(session.pending_diffs().len(), 2);
        assert_eq!(
            session.manager().document(&doc_id).unwrap().content,
            "# Keep me"
        );
        assert!(session.change_log().is_empty());
    }

    #[test]
    fn test_reject_all() {
        let (mut session, _) = session_with_doc("x");
        session.queue_diff(PendingDiff::new(START_ANCHOR, PendingAction::Add, "", "a", ""));
        session.queue_diff(PendingDiff::new(START_ANCHOR, PendingAction::Add, "", "b", ""));

        assert_eq!(session.reject_all_diffs(), 2);
        assert!(session.pending_diffs().is_empty());
    }

    #[test]
    fn test_queues_are_per_document() {
        let (mut session, first_id) = session_with_doc("first");
        let second_id = session.manager_mut().add_document(NewDocument {
            name: "Other".to_string(),
            doc_type: "guide".to_string(),
            content: "second".to_string(),
        });

        session.queue_diff(PendingDiff::new(START_ANCHOR, PendingAction::Add, "", "x", ""));
        assert_eq!(session.pending_diffs().len(), 1);

        assert!(session.set_active_document(&second_id));
        assert!(session.pending_diffs().is_empty());

        assert!(session.set_active_document(&first_id));
        assert_eq!(session.pending_diffs().len(), 1);
    }

    #[test]
    fn test_document_switch_resets_guard() {
        let (mut session, _first_id) = session_with_doc("first");
        let second_id = session.manager_mut().add_document(NewDocument {
            name: "Other".to_string(),
            doc_type: "guide".to_string(),
            content: "second".to_string(),
        });

        session.guard_mut().mark_document_read();
        session.guard_mut().mark_block_read("block-1");
        assert!(session.guard().can_add().allowed);

        assert!(session.set_active_document(&second_id));
        assert!(!session.guard().can_add().allowed);

        // failed switch does not reset
        session.guard_mut().mark_document_read();
        assert!(!session.set_active_document("doc-missing"));
        assert!(session.guard().can_add().allowed);
    }

    #[test]
    fn test_sequential_applies_keep_block_ids_stable() {
        let (mut session, doc_id) = session_with_doc("# A\n\nB paragraph.\n\nC paragraph.");
        let blocks = session.manager().document(&doc_id).unwrap().blocks.clone();

        let d1 = PendingDiff::new(&blocks[1].id, PendingAction::Update, "B paragraph.", "B2.", "");
        let d2 = PendingDiff::new(&blocks[2].id, PendingAction::Update, "C paragraph.", "C2.", "");
        let d1_id = d1.id.clone();
        let d2_id = d2.id.clone();
        session.queue_diff(d1);
        session.queue_diff(d2);

        // applying the first must not invalidate the second's target id
        assert!(session.apply_diff(&d1_id).unwrap());
        assert!(session.apply_diff(&d2_id).unwrap());

        let doc = session.manager().document(&doc_id).unwrap();
        assert!(doc.content.contains("B2."));
        assert!(doc.content.contains("C2."));
    }
}
