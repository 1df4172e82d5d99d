use std::collections::BTreeMap;
use std::fmt;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

pub mod card;
pub mod chat;
pub mod config_file;
pub mod controller;
pub mod filter;
pub mod form;
pub mod notes;
pub mod payload;
pub mod repository;
pub mod sequence;
pub mod view_state;

// Re-export for convenience
pub use controller::{Applied, Library};
pub use filter::SortOrder;
pub use notes::{HighlightArea, Note, NoteStore, Overlay, SelectionEvent};
pub use payload::ErrorPayload;
pub use repository::{HttpRepository, PaperRepository};
pub use sequence::{RequestSequencer, RequestTicket, Resource};
pub use view_state::{SidebarFilter, StatusFilter, Tab, TabKind, ViewIntent, ViewMode, ViewState};

/// Backend-assigned paper identifier.
pub type PaperId = i64;

/// Collection membership as the backend exchanges it: name -> 0 | 1.
pub type Membership = BTreeMap<String, u8>;

/// Reading status of a paper.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReadingStatus {
    #[default]
    Unread,
    #[serde(rename = "In Progress")]
    InProgress,
    Completed,
}

impl ReadingStatus {
    pub const ALL: [ReadingStatus; 3] = [Self::Unread, Self::InProgress, Self::Completed];

    /// The exact string used on the wire and in the sidebar.
    pub fn label(self) -> &'static str {
        match self {
            Self::Unread => "Unread",
            Self::InProgress => "In Progress",
            Self::Completed => "Completed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|st| st.label() == s)
    }
}

impl fmt::Display for ReadingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Unknown status strings from the backend fall back to `Unread`.
fn lenient_status<'de, D>(deserializer: D) -> Result<ReadingStatus, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(match raw.as_deref() {
        None => ReadingStatus::default(),
        Some(s) => ReadingStatus::parse(s).unwrap_or_else(|| {
            tracing::warn!(status = s, "unknown reading status, treating as Unread");
            ReadingStatus::default()
        }),
    })
}

/// `null` lists from the backend are treated as empty.
fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    pub name: String,
}

impl Author {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// A paper as held in the canonical set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Paper {
    pub paper_id: PaperId,
    pub title: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub authors: Vec<Author>,
    #[serde(default)]
    pub r#abstract: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub keywords: Vec<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub collections: Vec<String>,
    #[serde(default, deserialize_with = "lenient_status")]
    pub status: ReadingStatus,
    #[serde(rename = "isFavourite", default)]
    pub is_favourite: bool,
    #[serde(default)]
    pub publication_date: Option<NaiveDate>,
    #[serde(rename = "addedDate")]
    pub added_date: NaiveDateTime,
    #[serde(default)]
    pub pdf_path: Option<String>,
    #[serde(default)]
    pub pdf_hash: Option<String>,
}

impl Paper {
    /// Build the local record for a freshly created paper.
    ///
    /// New papers start unread and not favourited; `added_date` is fixed here
    /// and never touched again.
    pub fn from_input(
        paper_id: PaperId,
        input: &PaperInput,
        pdf_path: Option<String>,
        added_date: NaiveDateTime,
    ) -> Self {
        Self {
            paper_id,
            title: input.title.clone(),
            authors: input.authors.clone(),
            r#abstract: input.r#abstract.clone(),
            keywords: input.keywords.clone(),
            collections: Vec::new(),
            status: ReadingStatus::Unread,
            is_favourite: false,
            publication_date: input.publication_date,
            added_date,
            pdf_path,
            pdf_hash: Some(input.pdf_hash.clone()).filter(|h| !h.is_empty()),
        }
    }

    pub fn author_names(&self) -> impl Iterator<Item = &str> {
        self.authors.iter().map(|a| a.name.as_str())
    }
}

/// A named collection papers can belong to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Collection {
    pub name: String,
    #[serde(default)]
    pub label: Option<String>,
}

impl Collection {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            label: None,
        }
    }

    pub fn display_label(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.name)
    }
}

/// Body of `POST /add-paper/`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PaperInput {
    pub title: String,
    pub r#abstract: Option<String>,
    pub publication_date: Option<NaiveDate>,
    pub pdf_filename: String,
    pub pdf_hash: String,
    pub authors: Vec<Author>,
    pub keywords: Vec<String>,
}

/// Response of `POST /add-paper/`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CreatedPaper {
    pub paper_id: PaperId,
    #[serde(default)]
    pub pdf_path: Option<String>,
}

/// Metadata returned by `POST /extract/`. Every field may be missing.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ExtractedMetadata {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub r#abstract: Option<String>,
    #[serde(default)]
    pub publication_date: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub authors: Vec<Author>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub pdf_hash: Option<String>,
    #[serde(default)]
    pub pdf_filename: Option<String>,
}

#[derive(Error, Debug)]
pub enum RepoError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("server error (HTTP {status}): {}", payload.display())]
    Server { status: u16, payload: ErrorPayload },
    #[error("unexpected response: {0}")]
    Decode(String),
}

impl RepoError {
    /// Text shown to the user: the server's own message when it sent one,
    /// otherwise a generic fallback.
    pub fn user_message(&self) -> String {
        match self {
            Self::Server { status, payload } => {
                let text = payload.display();
                if text.trim().is_empty() {
                    format!("Request failed (HTTP {status})")
                } else {
                    text
                }
            }
            Self::Network(e) => {
                let text = e.to_string();
                if text.is_empty() {
                    "Network or client error".to_string()
                } else {
                    text
                }
            }
            Self::Decode(msg) => format!("Unexpected response from server: {msg}"),
        }
    }
}

/// Required-field failures caught before anything is sent.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("a title is required")]
    MissingTitle,
    #[error("at least one author is required")]
    MissingAuthors,
    #[error("a PDF file must be selected")]
    MissingFile,
    #[error("publication date must be YYYY-MM-DD, got {0:?}")]
    InvalidDate(String),
}

#[derive(Error, Debug)]
pub enum NoteStoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("could not encode notes: {0}")]
    Json(#[from] serde_json::Error),
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paper_deserializes_backend_shape() {
        let json = r#"{
            "paper_id": 7,
            "title": "Attention Is All You Need",
            "authors": [{"name": "Ashish Vaswani"}],
            "abstract": null,
            "status": "In Progress",
            "keywords": ["transformers"],
            "isFavourite": true,
            "addedDate": "2024-03-01T10:20:30.123456",
            "publication_date": "2017-06-12",
            "pdf_path": "uploads\\attention.pdf"
        }"#;
        let p: Paper = serde_json::from_str(json).unwrap();
        assert_eq!(p.paper_id, 7);
        assert_eq!(p.status, ReadingStatus::InProgress);
        assert!(p.is_favourite);
        assert!(p.collections.is_empty());
        assert_eq!(p.publication_date, NaiveDate::from_ymd_opt(2017, 6, 12));
    }

    #[test]
    fn unknown_status_falls_back_to_unread() {
        let json = r#"{"paper_id": 1, "title": "x", "status": "Skimmed",
                       "addedDate": "2024-03-01T10:20:30"}"#;
        let p: Paper = serde_json::from_str(json).unwrap();
        assert_eq!(p.status, ReadingStatus::Unread);
    }

    #[test]
    fn null_lists_become_empty() {
        let json = r#"{"paper_id": 1, "title": "x", "keywords": null, "collections": null,
                       "addedDate": "2024-03-01T10:20:30"}"#;
        let p: Paper = serde_json::from_str(json).unwrap();
        assert!(p.keywords.is_empty());
        assert!(p.collections.is_empty());
    }

    #[test]
    fn status_serializes_to_wire_labels() {
        assert_eq!(
            serde_json::to_string(&ReadingStatus::InProgress).unwrap(),
            "\"In Progress\""
        );
        for st in ReadingStatus::ALL {
            assert_eq!(ReadingStatus::parse(st.label()), Some(st));
        }
    }

    #[test]
    fn server_error_without_payload_uses_fallback() {
        let err = RepoError::Server {
            status: 502,
            payload: ErrorPayload::Unknown(String::new()),
        };
        assert_eq!(err.user_message(), "Request failed (HTTP 502)");
    }

    #[test]
    fn server_error_with_detail_is_verbatim() {
        let err = RepoError::Server {
            status: 400,
            payload: ErrorPayload::Detail("Paper already exists".into()),
        };
        assert_eq!(err.user_message(), "Paper already exists");
    }
}
