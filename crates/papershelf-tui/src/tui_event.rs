use std::path::PathBuf;

use papershelf_core::controller::{FavouriteRequest, StatusRequest};
use papershelf_core::{
    Collection, CreatedPaper, ExtractedMetadata, Membership, Paper, PaperId, PaperInput,
    RepoError, RequestTicket,
};

/// Commands sent from the TUI to the backend.
#[derive(Debug)]
pub enum BackendCommand {
    LoadPapers { ticket: RequestTicket },
    LoadCollections { ticket: RequestTicket },
    CreatePaper { ticket: RequestTicket, input: PaperInput },
    DeletePaper { ticket: RequestTicket, paper_id: PaperId },
    SetFavourite { request: FavouriteRequest },
    SetStatus { request: StatusRequest },
    /// Re-fetch one paper.
    RefreshPaper { ticket: RequestTicket, paper_id: PaperId },
    /// Fetch membership to open the collection editor.
    FetchMembership { ticket: RequestTicket, paper_id: PaperId },
    /// Save membership, then re-fetch it.
    SaveCollections {
        ticket: RequestTicket,
        paper_id: PaperId,
        membership: Membership,
    },
    AddCollection { collection: Collection },
    DeleteCollection { name: String },
    Extract { ticket: RequestTicket, path: PathBuf },
    Ask {
        ticket: RequestTicket,
        paper_id: Option<PaperId>,
        query: String,
        top_k: u32,
    },
}

/// Results flowing back from the backend task to the TUI.
#[derive(Debug)]
pub enum BackendEvent {
    PapersLoaded {
        ticket: RequestTicket,
        result: Result<Vec<Paper>, RepoError>,
    },
    CollectionsLoaded {
        ticket: RequestTicket,
        result: Result<Vec<Collection>, RepoError>,
    },
    PaperCreated {
        ticket: RequestTicket,
        input: PaperInput,
        result: Result<CreatedPaper, RepoError>,
    },
    PaperDeleted {
        ticket: RequestTicket,
        paper_id: PaperId,
        result: Result<(), RepoError>,
    },
    FavouriteSet {
        request: FavouriteRequest,
        result: Result<(), RepoError>,
    },
    StatusSet {
        request: StatusRequest,
        result: Result<(), RepoError>,
    },
    PaperRefreshed {
        ticket: RequestTicket,
        paper_id: PaperId,
        result: Result<Paper, RepoError>,
    },
    MembershipLoaded {
        ticket: RequestTicket,
        paper_id: PaperId,
        result: Result<Membership, RepoError>,
    },
    CollectionsSaved {
        ticket: RequestTicket,
        paper_id: PaperId,
        outcome: SaveOutcome,
    },
    CollectionAdded {
        result: Result<Collection, RepoError>,
    },
    CollectionDeleted {
        name: String,
        result: Result<(), RepoError>,
    },
    /// Extraction failures carry a ready-to-show message (file read or HTTP).
    Extracted {
        ticket: RequestTicket,
        result: Result<ExtractedMetadata, String>,
    },
    Answered {
        ticket: RequestTicket,
        paper_id: Option<PaperId>,
        result: Result<String, RepoError>,
    },
}

/// How a membership save went: the save itself, then the re-fetch.
#[derive(Debug)]
pub enum SaveOutcome {
    /// Saved and re-fetched.
    Refreshed(Membership),
    /// Saved, but the re-fetch failed.
    Unrefreshed {
        submitted: Membership,
        error: RepoError,
    },
    /// The save was rejected; nothing was re-fetched.
    Failed(RepoError),
}
