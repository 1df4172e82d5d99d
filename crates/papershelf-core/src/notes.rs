//! Highlight notes attached to PDF documents.
//!
//! All notes live in one JSON document keyed by the PDF path, persisted to
//! `pdf_viewer_notes.json`. The file is rewritten atomically after every
//! change.

use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::NoteStoreError;

/// Storage key of the note blob; the file is named after it.
pub const STORAGE_KEY: &str = "pdf_viewer_notes";

pub type NoteId = u64;

/// A rectangle on one page, in percent of the page size.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HighlightArea {
    pub page_index: u32,
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl HighlightArea {
    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.left && x <= self.left + self.width && y >= self.top && y <= self.top + self.height
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: NoteId,
    pub content: String,
    pub highlight_areas: Vec<HighlightArea>,
    pub quote: String,
}

/// A text selection reported by the PDF view.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectionEvent {
    pub selected_text: String,
    pub highlight_areas: Vec<HighlightArea>,
}

/// Default location of the note file: `<data_dir>/papershelf/pdf_viewer_notes.json`.
pub fn default_path() -> Option<PathBuf> {
    dirs::data_dir().map(|d| d.join("papershelf").join(format!("{STORAGE_KEY}.json")))
}

/// Notes for every document, keyed by PDF path.
#[derive(Debug, Default)]
pub struct NoteStore {
    path: Option<PathBuf>,
    docs: BTreeMap<String, Vec<Note>>,
}

impl NoteStore {
    /// A store that never touches disk.
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Load the store from `path`. A missing or unreadable file yields an
    /// empty store; the next save overwrites it.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let docs = match std::fs::read_to_string(&path) {
            Ok(text) => match serde_json::from_str(&text) {
                Ok(docs) => docs,
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "note file is corrupt, starting empty");
                    BTreeMap::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "could not read note file, starting empty");
                BTreeMap::new()
            }
        };
        let count: usize = docs.values().map(Vec::len).sum();
        tracing::info!(path = %path.display(), notes = count, "loaded notes");
        Self {
            path: Some(path),
            docs,
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Highest id across all documents plus one.
    pub fn next_id(&self) -> NoteId {
        self.docs
            .values()
            .flatten()
            .map(|n| n.id)
            .max()
            .unwrap_or(0)
            + 1
    }

    pub fn notes_for(&self, document_key: &str) -> &[Note] {
        self.docs.get(document_key).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Append a note to a document and persist.
    pub fn add(
        &mut self,
        document_key: &str,
        content: String,
        quote: String,
        highlight_areas: Vec<HighlightArea>,
    ) -> Result<NoteId, NoteStoreError> {
        let id = self.next_id();
        self.docs
            .entry(document_key.to_string())
            .or_default()
            .push(Note {
                id,
                content,
                highlight_areas,
                quote,
            });
        self.save()?;
        Ok(id)
    }

    /// Remove a note from one document. Returns whether anything was removed.
    pub fn delete(&mut self, document_key: &str, id: NoteId) -> Result<bool, NoteStoreError> {
        let Some(notes) = self.docs.get_mut(document_key) else {
            return Ok(false);
        };
        let before = notes.len();
        notes.retain(|n| n.id != id);
        if notes.len() == before {
            return Ok(false);
        }
        self.save()?;
        Ok(true)
    }

    /// Write the whole store through a temp file in the same directory.
    pub fn save(&self) -> Result<(), NoteStoreError> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let dir = path.parent().unwrap_or_else(|| Path::new("."));
        std::fs::create_dir_all(dir)?;
        let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
        serde_json::to_writer(&mut tmp, &self.docs)?;
        tmp.flush()?;
        tmp.persist(path).map_err(|e| NoteStoreError::Io(e.error))?;
        tracing::debug!(path = %path.display(), "notes saved");
        Ok(())
    }
}

/// Per-document annotation state shown over a PDF tab.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Overlay {
    pub document_key: String,
    pub pending: Option<SelectionEvent>,
    pub message: String,
    pub focused_note: Option<NoteId>,
}

impl Overlay {
    pub fn new(document_key: impl Into<String>) -> Self {
        Self {
            document_key: document_key.into(),
            ..Self::default()
        }
    }

    /// Start a note for a selection, replacing any earlier pending one.
    pub fn select(&mut self, event: SelectionEvent) {
        self.pending = Some(event);
        self.message.clear();
    }

    pub fn cancel(&mut self) {
        self.pending = None;
        self.message.clear();
    }

    /// Turn the pending selection and draft message into a note.
    ///
    /// Does nothing (and returns `None`) without a selection or with an empty
    /// message.
    pub fn submit(&mut self, store: &mut NoteStore) -> Result<Option<NoteId>, NoteStoreError> {
        if self.message.is_empty() {
            return Ok(None);
        }
        let Some(selection) = self.pending.take() else {
            return Ok(None);
        };
        let content = std::mem::take(&mut self.message);
        let id = store.add(
            &self.document_key,
            content,
            selection.selected_text,
            selection.highlight_areas,
        )?;
        self.focused_note = Some(id);
        Ok(Some(id))
    }

    pub fn delete(&mut self, store: &mut NoteStore, id: NoteId) -> Result<bool, NoteStoreError> {
        let removed = store.delete(&self.document_key, id)?;
        if removed && self.focused_note == Some(id) {
            self.focused_note = None;
        }
        Ok(removed)
    }

    /// Areas to paint on `page`, paired with their note.
    pub fn highlights_on_page<'a>(
        &self,
        store: &'a NoteStore,
        page: u32,
    ) -> Vec<(NoteId, &'a HighlightArea)> {
        store
            .notes_for(&self.document_key)
            .iter()
            .flat_map(|n| {
                n.highlight_areas
                    .iter()
                    .filter(move |a| a.page_index == page)
                    .map(move |a| (n.id, a))
            })
            .collect()
    }

    /// Note whose highlight covers a point on `page`; focuses it in the sidebar.
    pub fn hit_test(&mut self, store: &NoteStore, page: u32, x: f64, y: f64) -> Option<NoteId> {
        let hit = self
            .highlights_on_page(store, page)
            .into_iter()
            .find(|(_, a)| a.contains(x, y))
            .map(|(id, _)| id)?;
        self.focused_note = Some(hit);
        Some(hit)
    }

    /// Focus a note and return the first area to scroll the document to.
    pub fn jump_to(&mut self, store: &NoteStore, id: NoteId) -> Option<HighlightArea> {
        let note = store
            .notes_for(&self.document_key)
            .iter()
            .find(|n| n.id == id)?;
        self.focused_note = Some(id);
        note.highlight_areas.first().copied()
    }
}
