// src/document_manager.rs
//! Document manager for multi-document support.
//!
//! Holds every open document with isolated state, tracks which one is
//! active, and keeps each document's block cache consistent with its
//! markdown content. Documents are kept in insertion order.

use chrono::Utc;

use crate::block_parser::{blocks_to_markdown, parse_markdown};
use crate::models::{new_document_id, Block, EditorDocument};

/// Input for creating a document. An empty name falls back to
/// "Untitled Document".
#[derive(Debug, Clone)]
pub struct NewDocument {
    pub name: String,
    pub doc_type: String,
    pub content: String,
}

/// The document manager state
pub struct DocumentManager {
    documents: Vec<EditorDocument>,
    active_document_id: Option<String>,
}

impl Default for DocumentManager {
    fn default() -> Self {
        Self {
            documents: Vec::new(),
            active_document_id: None,
        }
    }
}

impl DocumentManager {
    /// Build a manager from pre-existing documents. If `active_id` does
    /// not name one of them, the first document becomes active.
    pub fn new(initial: Vec<EditorDocument>, active_id: Option<String>) -> Self {
        let active_document_id = active_id
            .filter(|id| initial.iter().any(|d| &d.id == id))
            .or_else(|| initial.first().map(|d| d.id.clone()));

        Self {
            documents: initial,
            active_document_id,
        }
    }

    /// All documents, in insertion order.
    pub fn all_documents(&self) -> &[EditorDocument] {
        &self.documents
    }

    pub fn document(&self, id: &str) -> Option<&EditorDocument> {
        self.documents.iter().find(|d| d.id == id)
    }

    pub fn active_document(&self) -> Option<&EditorDocument> {
        self.active_document_id
            .as_deref()
            .and_then(|id| self.document(id))
    }

    pub fn active_document_id(&self) -> Option<&str> {
        self.active_document_id.as_deref()
    }

    /// Switch the active document. Returns false if `id` is unknown,
    /// leaving the current selection in place.
    pub fn set_active_document(&mut self, id: &str) -> bool {
        if self.documents.iter().any(|d| d.id == id) {
            log::debug!("set_active_document: {}", id);
            self.active_document_id = Some(id.to_string());
            true
        } else {
            false
        }
    }

    /// Create a document from markdown content and return its id. The
    /// first document added becomes active.
    pub fn add_document(&mut self, new: NewDocument) -> String {
        let id = new_document_id();
        let name = if new.name.trim().is_empty() {
            "Untitled Document".to_string()
        } else {
            new.name
        };
        let parsed = parse_markdown(&new.content);

        self.documents.push(EditorDocument {
            id: id.clone(),
            name,
            doc_type: new.doc_type,
            content: new.content,
            blocks: parsed.blocks,
            is_dirty: false,
            created_at: Utc::now(),
        });

        if self.active_document_id.is_none() {
            self.active_document_id = Some(id.clone());
        }

        log::debug!("add_document: {} ({} total)", id, self.documents.len());
        id
    }

    /// Remove a document. If it was active, the first remaining document
    /// becomes active. Returns false if `id` is unknown.
    pub fn remove_document(&mut self, id: &str) -> bool {
        let before = self.documents.len();
        self.documents.retain(|d| d.id != id);
        if self.documents.len() == before {
            return false;
        }

        if self.active_document_id.as_deref() == Some(id) {
            self.active_document_id = self.documents.first().map(|d| d.id.clone());
        }

        log::debug!("remove_document: {} ({} remain)", id, self.documents.len());
        true
    }

    /// Replace a document's markdown, re-deriving the block cache with
    /// fresh block ids. Marks the document dirty. Returns false if `id`
    /// is unknown.
    pub fn update_document_content(&mut self, id: &str, content: &str) -> bool {
        let Some(doc) = self.documents.iter_mut().find(|d| d.id == id) else {
            return false;
        };

        let parsed = parse_markdown(content);
        doc.content = content.to_string();
        doc.blocks = parsed.blocks;
        doc.is_dirty = true;
        true
    }

    /// Replace a document's block cache directly, regenerating the
    /// markdown from it. Marks the document dirty. Returns false if `id`
    /// is unknown.
    pub fn update_document_blocks(&mut self, id: &str, blocks: Vec<Block>) -> bool {
        let Some(doc) = self.documents.iter_mut().find(|d| d.id == id) else {
            return false;
        };

        doc.content = blocks_to_markdown(&blocks);
        doc.blocks = blocks;
        doc.is_dirty = true;
        true
    }

    pub fn mark_document_clean(&mut self, id: &str) -> bool {
        let Some(doc) = self.documents.iter_mut().find(|d| d.id == id) else {
            return false;
        };
        doc.is_dirty = false;
        true
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}
