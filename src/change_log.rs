// src/change_log.rs
//! In-memory history of committed edits.
//!
//! Every applied diff is recorded with a monotonically increasing
//! sequence number. The log keeps only the newest entries, up to the
//! configured limit.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::apply_engine::AppliedChange;
use crate::models::PendingAction;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangeRecord {
    pub seq: u64,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub timestamp: DateTime<Utc>,
    pub doc_id: String,
    pub action: PendingAction,
    pub description: String,
}

#[derive(Debug)]
pub struct ChangeLog {
    records: Vec<ChangeRecord>,
    next_seq: u64,
    limit: usize,
}

impl ChangeLog {
    pub fn new(limit: usize) -> Self {
        Self {
            records: Vec::new(),
            next_seq: 1,
            limit,
        }
    }

    /// Append one record per applied change, oldest first, then drop
    /// entries from the front so at most `limit` remain.
    pub fn record(&mut self, doc_id: &str, changes: &[AppliedChange]) {
        let now = Utc::now();
        for change in changes {
            self.records.push(ChangeRecord {
                seq: self.next_seq,
                timestamp: now,
                doc_id: doc_id.to_string(),
                action: change.action,
                description: change.description.clone(),
            });
            self.next_seq += 1;
        }

        if self.records.len() > self.limit {
            let excess = self.records.len() - self.limit;
            self.records.drain(0..excess);
            log::debug!("change log truncated, dropped {} oldest entries", excess);
        }
    }

    /// All retained records, oldest first.
    pub fn records(&self) -> &[ChangeRecord] {
        &self.records
    }

    pub fn records_for(&self, doc_id: &str) -> Vec<&ChangeRecord> {
        self.records.iter().filter(|r| r.doc_id == doc_id).collect()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn change(description: &str) -> AppliedChange {
        AppliedChange {
            diff_id: "diff-test".to_string(),
            action: PendingAction::Update,
            description: description.to_string(),
        }
    }

    #[test]
    fn test_sequence_numbers_increase() {
        let mut log = ChangeLog::new(100);
        log.record("doc-1", &[change("first"), change("second")]);
        log.record("doc-1", &[change("third")]);

        let seqs: Vec<u64> = log.records().iter().map(|r| r.seq).collect();
        assert_eq!(seqs, vec![1, 2, 3]);
    }

    #[test]
    fn test_truncates_to_limit_keeping_newest() {
        let mut log = ChangeLog::new(3);
        for i in 0..5 {
            log.record("doc-1", &[change(&format!("edit {}", i))]);
        }

        assert_eq!(log.len(), 3);
        assert_eq!(log.records()[0].description, "edit 2");
        assert_eq!(log.records()[2].description, "edit 4");
        // sequence numbers keep counting past the truncation
        assert_eq!(log.records()[2].seq, 5);
    }

    #[test]
    fn test_records_for_filters_by_document() {
        let mut log = ChangeLog::new(100);
        log.record("doc-a", &[change("a1")]);
        log.record("doc-b", &[change("b1")]);
        log.record("doc-a", &[change("a2")]);

        let for_a = log.records_for("doc-a");
        assert_eq!(for_a.len(), 2);
        assert!(for_a.iter().all(|r| r.doc_id == "doc-a"));
        assert!(log.records_for("doc-c").is_empty());
    }

    #[test]
    fn test_empty_batch_records_nothing() {
        let mut log = ChangeLog::new(10);
        log.record("doc-1", &[]);
        assert!(log.is_empty());
    }

    #[test]
    fn test_record_serialization() {
        let mut log = ChangeLog::new(10);
        log.record("doc-1", &[change("tweak")]);

        let json = serde_json::to_value(&log.records()[0]).unwrap();
        assert_eq!(json["seq"], 1);
        assert_eq!(json["action"], "update");
        assert!(json["timestamp"].is_number());
    }
}
