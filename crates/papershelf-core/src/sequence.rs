//! Request sequencing so late responses cannot overwrite newer state.
//!
//! Every outgoing request takes a ticket for the logical resource it touches.
//! When the response arrives it is applied only if its ticket is still the
//! latest one issued for that resource.

use std::collections::{HashMap, HashSet};

use crate::PaperId;

/// A logical resource that requests are sequenced against.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Resource {
    PaperList,
    CollectionList,
    Favourite(PaperId),
    Status(PaperId),
    Collections(PaperId),
    Delete(PaperId),
    /// Re-fetch of a single paper.
    Paper(PaperId),
    CreatePaper,
    Extraction,
    Chat(Option<PaperId>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestTicket {
    pub resource: Resource,
    pub seq: u64,
}

#[derive(Debug, Default)]
pub struct RequestSequencer {
    next_seq: u64,
    latest: HashMap<Resource, u64>,
    in_flight: HashSet<Resource>,
}

impl RequestSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue a new ticket, superseding any earlier one for the same resource.
    pub fn issue(&mut self, resource: Resource) -> RequestTicket {
        self.next_seq += 1;
        let seq = self.next_seq;
        self.latest.insert(resource.clone(), seq);
        self.in_flight.insert(resource.clone());
        tracing::debug!(?resource, seq, "request issued");
        RequestTicket { resource, seq }
    }

    /// Whether `ticket` is still the newest for its resource.
    pub fn is_current(&self, ticket: &RequestTicket) -> bool {
        self.latest.get(&ticket.resource) == Some(&ticket.seq)
    }

    /// Settle a response. Returns `false` (and changes nothing) for a
    /// superseded ticket, which the caller must then discard.
    ///
    /// Settling the latest ticket forgets the resource entirely; any older
    /// ticket still out for it stays stale because no entry matches it.
    pub fn accept(&mut self, ticket: &RequestTicket) -> bool {
        if !self.is_current(ticket) {
            tracing::warn!(resource = ?ticket.resource, seq = ticket.seq, "discarding stale response");
            return false;
        }
        self.latest.remove(&ticket.resource);
        self.in_flight.remove(&ticket.resource);
        true
    }

    /// Whether the newest request for `resource` has not been answered yet.
    pub fn is_in_flight(&self, resource: &Resource) -> bool {
        self.in_flight.contains(resource)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn newer_ticket_supersedes_older() {
        let mut seq = RequestSequencer::new();
        let first = seq.issue(Resource::Status(1));
        let second = seq.issue(Resource::Status(1));
        assert!(!seq.is_current(&first));
        assert!(seq.accept(&second));
        // The older response arriving last is still stale.
        assert!(!seq.accept(&first));
    }

    #[test]
    fn resources_are_independent() {
        let mut seq = RequestSequencer::new();
        let a = seq.issue(Resource::Favourite(1));
        let b = seq.issue(Resource::Favourite(2));
        assert!(seq.accept(&a));
        assert!(seq.accept(&b));
    }

    #[test]
    fn in_flight_cleared_on_accept() {
        let mut seq = RequestSequencer::new();
        let t = seq.issue(Resource::Extraction);
        assert!(seq.is_in_flight(&Resource::Extraction));
        seq.accept(&t);
        assert!(!seq.is_in_flight(&Resource::Extraction));
    }

    #[test]
    fn settled_resources_are_forgotten() {
        let mut seq = RequestSequencer::new();
        let old = seq.issue(Resource::Delete(4));
        let new = seq.issue(Resource::Delete(4));
        assert!(seq.accept(&new));
        assert!(seq.latest.is_empty());
        assert!(seq.in_flight.is_empty());
        // Neither answer can be applied again.
        assert!(!seq.accept(&new));
        assert!(!seq.accept(&old));
    }

    #[test]
    fn stale_accept_leaves_newer_in_flight() {
        let mut seq = RequestSequencer::new();
        let old = seq.issue(Resource::PaperList);
        let _new = seq.issue(Resource::PaperList);
        assert!(!seq.accept(&old));
        assert!(seq.is_in_flight(&Resource::PaperList));
    }
}
