//! The library controller: canonical paper set, collections and view state.
//!
//! Network calls are split into a `begin_*` step that issues a
//! [`RequestTicket`] and a `finish_*` step that applies the response. Local
//! state only changes in `finish_*`, after the backend confirmed, and only if
//! the ticket is still the latest for its resource.

use std::collections::{BTreeSet, HashMap, HashSet};

use crate::filter::{self, collate};
use crate::repository::member_names;
use crate::sequence::{RequestSequencer, RequestTicket, Resource};
use crate::view_state::{self, ViewIntent, ViewState};
use crate::{Collection, Membership, Paper, PaperId, ReadingStatus, RepoError};

/// Outcome of applying a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    /// The response changed (or confirmed) local state.
    Applied,
    /// A newer request for the same resource was issued; the response was dropped.
    Stale,
}

/// A favourite update waiting to be sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FavouriteRequest {
    pub ticket: RequestTicket,
    pub paper_id: PaperId,
    pub favourite: bool,
}

/// A status update waiting to be sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusRequest {
    pub ticket: RequestTicket,
    pub paper_id: PaperId,
    pub status: ReadingStatus,
}

#[derive(Debug, Default)]
pub struct Library {
    papers: Vec<Paper>,
    collections: Vec<Collection>,
    view: ViewState,
    sequencer: RequestSequencer,
    /// Favourite value each in-flight toggle is driving towards.
    favourite_targets: HashMap<PaperId, bool>,
    /// Favourite requests still unanswered per paper, stale ones included.
    favourite_pending: HashMap<PaperId, usize>,
    /// Papers where a superseded favourite request succeeded, so the
    /// server may hold a value the latest response does not describe.
    favourite_unsettled: HashSet<PaperId>,
    /// Re-fetches waiting to be sent.
    refreshes: Vec<(PaperId, RequestTicket)>,
}

impl Library {
    pub fn new(view: ViewState) -> Self {
        Self {
            view,
            ..Self::default()
        }
    }

    pub fn papers(&self) -> &[Paper] {
        &self.papers
    }

    pub fn paper(&self, id: PaperId) -> Option<&Paper> {
        self.papers.iter().find(|p| p.paper_id == id)
    }

    pub fn collections(&self) -> &[Collection] {
        &self.collections
    }

    pub fn view(&self) -> &ViewState {
        &self.view
    }

    pub fn is_in_flight(&self, resource: &Resource) -> bool {
        self.sequencer.is_in_flight(resource)
    }

    /// Run an intent through the reducer.
    pub fn dispatch(&mut self, intent: ViewIntent) {
        self.view = view_state::reduce(&self.view, intent);
    }

    /// What the papers list shows right now.
    pub fn display(&self) -> Vec<&Paper> {
        filter::derive_display(&self.papers, &self.view)
    }

    pub fn favourites(&self) -> Vec<&Paper> {
        filter::favourites(&self.papers)
    }

    pub fn favourite_count(&self) -> usize {
        self.papers.iter().filter(|p| p.is_favourite).count()
    }

    /// Distinct keywords across the library, in collation order.
    pub fn all_tags(&self) -> Vec<String> {
        let set: BTreeSet<&str> = self
            .papers
            .iter()
            .flat_map(|p| p.keywords.iter().map(String::as_str))
            .collect();
        let mut tags: Vec<String> = set.into_iter().map(str::to_string).collect();
        tags.sort_by(|a, b| collate(a, b));
        tags
    }

    /// Issue a ticket for an arbitrary resource (used for extraction and chat).
    pub fn issue(&mut self, resource: Resource) -> RequestTicket {
        self.sequencer.issue(resource)
    }

    /// Settle a ticket issued with [`issue`](Self::issue).
    pub fn accept(&mut self, ticket: &RequestTicket) -> Applied {
        if self.sequencer.accept(ticket) {
            Applied::Applied
        } else {
            Applied::Stale
        }
    }

    // ── Loading ─────────────────────────────────────────────────────

    pub fn begin_load(&mut self) -> RequestTicket {
        self.sequencer.issue(Resource::PaperList)
    }

    /// Apply the paper list. A failed load is logged and leaves the current
    /// set as it is (empty on first load).
    pub fn finish_load(
        &mut self,
        ticket: &RequestTicket,
        result: Result<Vec<Paper>, RepoError>,
    ) -> Applied {
        if !self.sequencer.accept(ticket) {
            return Applied::Stale;
        }
        match result {
            Ok(papers) => {
                let mut seen = BTreeSet::new();
                self.papers = papers
                    .into_iter()
                    .filter(|p| {
                        let fresh = seen.insert(p.paper_id);
                        if !fresh {
                            tracing::warn!(paper_id = p.paper_id, "duplicate paper id in list, keeping first");
                        }
                        fresh
                    })
                    .collect();
                self.favourite_targets.clear();
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to load papers");
            }
        }
        Applied::Applied
    }

    pub fn begin_load_collections(&mut self) -> RequestTicket {
        self.sequencer.issue(Resource::CollectionList)
    }

    pub fn finish_load_collections(
        &mut self,
        ticket: &RequestTicket,
        result: Result<Vec<Collection>, RepoError>,
    ) -> Applied {
        if !self.sequencer.accept(ticket) {
            return Applied::Stale;
        }
        match result {
            Ok(collections) => self.collections = collections,
            Err(e) => tracing::warn!(error = %e, "failed to load collections"),
        }
        Applied::Applied
    }

    // ── Adding and deleting papers ─────────────────────────────────

    /// Prepend a newly created paper. A paper with the same id is replaced.
    pub fn add_paper(&mut self, paper: Paper) {
        self.papers.retain(|p| p.paper_id != paper.paper_id);
        tracing::info!(paper_id = paper.paper_id, title = %paper.title, "paper added");
        self.papers.insert(0, paper);
    }

    pub fn begin_delete(&mut self, id: PaperId) -> Option<RequestTicket> {
        self.paper(id)?;
        Some(self.sequencer.issue(Resource::Delete(id)))
    }

    /// Remove the paper once the backend acknowledged the delete, closing
    /// its PDF tab if one is open.
    pub fn finish_delete(
        &mut self,
        ticket: &RequestTicket,
        id: PaperId,
        result: Result<(), RepoError>,
    ) -> Result<Applied, RepoError> {
        if !self.sequencer.accept(ticket) {
            return Ok(Applied::Stale);
        }
        result?;
        self.papers.retain(|p| p.paper_id != id);
        self.favourite_targets.remove(&id);
        self.favourite_pending.remove(&id);
        self.favourite_unsettled.remove(&id);
        self.refreshes.retain(|(paper_id, _)| *paper_id != id);
        self.dispatch(ViewIntent::PaperRemoved(id));
        Ok(Applied::Applied)
    }

    // ── Favourite ──────────────────────────────────────────────────

    /// Start a favourite toggle. A toggle issued while another is still in
    /// flight flips the in-flight target, so two quick toggles end where they
    /// started.
    pub fn begin_toggle_favourite(&mut self, id: PaperId) -> Option<FavouriteRequest> {
        let current = self.paper(id)?.is_favourite;
        let base = self.favourite_targets.get(&id).copied().unwrap_or(current);
        let favourite = !base;
        self.favourite_targets.insert(id, favourite);
        *self.favourite_pending.entry(id).or_default() += 1;
        let ticket = self.sequencer.issue(Resource::Favourite(id));
        Some(FavouriteRequest {
            ticket,
            paper_id: id,
            favourite,
        })
    }

    /// Apply a confirmed favourite update. Failures are background noise:
    /// they are logged and leave the paper as it was.
    ///
    /// Once every request for the paper has answered, a superseded request
    /// that succeeded queues a re-fetch (see [`take_refreshes`]), since the
    /// server may have applied it after the latest one.
    ///
    /// [`take_refreshes`]: Self::take_refreshes
    pub fn finish_favourite(
        &mut self,
        request: &FavouriteRequest,
        result: Result<(), RepoError>,
    ) -> Applied {
        let id = request.paper_id;
        if let Some(pending) = self.favourite_pending.get_mut(&id) {
            *pending = pending.saturating_sub(1);
        }
        let applied = if self.sequencer.accept(&request.ticket) {
            self.favourite_targets.remove(&id);
            match result {
                Ok(()) => {
                    if let Some(p) = self.paper_mut(id) {
                        p.is_favourite = request.favourite;
                    }
                }
                Err(e) => {
                    tracing::warn!(paper_id = id, error = %e, "failed to update favourite");
                }
            }
            Applied::Applied
        } else {
            if result.is_ok() {
                self.favourite_unsettled.insert(id);
            }
            Applied::Stale
        };
        self.settle_favourite(id);
        applied
    }

    fn settle_favourite(&mut self, id: PaperId) {
        if self.favourite_pending.get(&id).is_some_and(|n| *n > 0) {
            return;
        }
        self.favourite_pending.remove(&id);
        if self.favourite_unsettled.remove(&id)
            && let Some(ticket) = self.begin_refresh(id)
        {
            tracing::info!(paper_id = id, "favourite responses crossed, re-fetching paper");
            self.refreshes.push((id, ticket));
        }
    }

    /// Re-fetches queued since the last call, to be sent with
    /// `PaperRepository::get_paper` and settled with
    /// [`finish_refresh`](Self::finish_refresh).
    pub fn take_refreshes(&mut self) -> Vec<(PaperId, RequestTicket)> {
        std::mem::take(&mut self.refreshes)
    }

    pub fn begin_refresh(&mut self, id: PaperId) -> Option<RequestTicket> {
        self.paper(id)?;
        Some(self.sequencer.issue(Resource::Paper(id)))
    }

    /// Replace a paper with the backend's copy. Fields with a newer request
    /// still in flight keep their local value; that request settles them.
    pub fn finish_refresh(
        &mut self,
        ticket: &RequestTicket,
        id: PaperId,
        result: Result<Paper, RepoError>,
    ) -> Applied {
        if !self.sequencer.accept(ticket) {
            return Applied::Stale;
        }
        let mut fresh = match result {
            Ok(paper) => paper,
            Err(e) => {
                tracing::warn!(paper_id = id, error = %e, "failed to refresh paper");
                return Applied::Applied;
            }
        };
        let favourite_busy = self.favourite_pending.contains_key(&id);
        let status_busy = self.sequencer.is_in_flight(&Resource::Status(id));
        if let Some(p) = self.paper_mut(id) {
            if favourite_busy {
                fresh.is_favourite = p.is_favourite;
            }
            if status_busy {
                fresh.status = p.status;
            }
            fresh.paper_id = id;
            *p = fresh;
        }
        Applied::Applied
    }

    // ── Status ─────────────────────────────────────────────────────

    /// Start a status change. Returns `None` for unknown papers and for a
    /// status the paper already has with nothing in flight.
    pub fn begin_status(&mut self, id: PaperId, status: ReadingStatus) -> Option<StatusRequest> {
        let current = self.paper(id)?.status;
        let resource = Resource::Status(id);
        if current == status && !self.sequencer.is_in_flight(&resource) {
            return None;
        }
        let ticket = self.sequencer.issue(resource);
        Some(StatusRequest {
            ticket,
            paper_id: id,
            status,
        })
    }

    pub fn finish_status(
        &mut self,
        request: &StatusRequest,
        result: Result<(), RepoError>,
    ) -> Result<Applied, RepoError> {
        if !self.sequencer.accept(&request.ticket) {
            return Ok(Applied::Stale);
        }
        result?;
        if let Some(p) = self.paper_mut(request.paper_id) {
            p.status = request.status;
        }
        Ok(Applied::Applied)
    }

    // ── Collections ────────────────────────────────────────────────

    pub fn begin_collections(&mut self, id: PaperId) -> Option<RequestTicket> {
        self.paper(id)?;
        Some(self.sequencer.issue(Resource::Collections(id)))
    }

    /// Apply the membership re-fetched after a confirmed save.
    pub fn finish_collections(
        &mut self,
        ticket: &RequestTicket,
        id: PaperId,
        result: Result<Membership, RepoError>,
    ) -> Result<Applied, RepoError> {
        if !self.sequencer.accept(ticket) {
            return Ok(Applied::Stale);
        }
        let membership = result?;
        if let Some(p) = self.paper_mut(id) {
            p.collections = member_names(&membership);
        }
        Ok(Applied::Applied)
    }

    pub fn add_collection(&mut self, collection: Collection) {
        if !self.collections.iter().any(|c| c.name == collection.name) {
            self.collections.push(collection);
        }
    }

    /// Drop a deleted collection. Papers stay; only the membership goes.
    pub fn remove_collection(&mut self, name: &str) {
        self.collections.retain(|c| c.name != name);
        for p in &mut self.papers {
            p.collections.retain(|c| c != name);
        }
        self.dispatch(ViewIntent::CollectionRemoved(name.to_string()));
    }

    /// Membership map for a paper over all known collections.
    pub fn membership(&self, id: PaperId) -> Membership {
        let Some(paper) = self.paper(id) else {
            return Membership::new();
        };
        let mut map: Membership = self
            .collections
            .iter()
            .map(|c| (c.name.clone(), u8::from(paper.collections.contains(&c.name))))
            .collect();
        // Memberships the backend knows about but the collection list doesn't.
        for name in &paper.collections {
            map.entry(name.clone()).or_insert(1);
        }
        map
    }

    fn paper_mut(&mut self, id: PaperId) -> Option<&mut Paper> {
        self.papers.iter_mut().find(|p| p.paper_id == id)
    }
}
