//! Repository trait and implementations for talking to the paper backend.

pub mod http;
pub mod mock;

pub use http::HttpRepository;
pub use mock::MockRepository;

use std::future::Future;
use std::pin::Pin;

use crate::{
    Collection, CreatedPaper, ExtractedMetadata, Membership, Paper, PaperId, PaperInput,
    ReadingStatus, RepoError,
};

/// Boxed future returned by every repository call.
pub type RepoFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, RepoError>> + Send + 'a>>;

/// CRUD access to the backend's papers, collections, metadata extraction
/// and chatbot endpoints. Every call may fail; none of them retry.
pub trait PaperRepository: Send + Sync {
    fn list_papers(&self) -> RepoFuture<'_, Vec<Paper>>;

    fn get_paper(&self, id: PaperId) -> RepoFuture<'_, Paper>;

    fn create_paper<'a>(&'a self, input: &'a PaperInput) -> RepoFuture<'a, CreatedPaper>;

    fn delete_paper(&self, id: PaperId) -> RepoFuture<'_, ()>;

    fn set_favourite(&self, id: PaperId, favourite: bool) -> RepoFuture<'_, ()>;

    fn set_status(&self, id: PaperId, status: ReadingStatus) -> RepoFuture<'_, ()>;

    fn paper_collections(&self, id: PaperId) -> RepoFuture<'_, Membership>;

    fn set_collections<'a>(
        &'a self,
        id: PaperId,
        membership: &'a Membership,
    ) -> RepoFuture<'a, ()>;

    fn list_collections(&self) -> RepoFuture<'_, Vec<Collection>>;

    fn add_collection<'a>(&'a self, collection: &'a Collection) -> RepoFuture<'a, Collection>;

    fn delete_collection<'a>(&'a self, name: &'a str) -> RepoFuture<'a, ()>;

    fn extract_metadata<'a>(
        &'a self,
        file_name: &'a str,
        bytes: Vec<u8>,
    ) -> RepoFuture<'a, ExtractedMetadata>;

    /// Ask the chatbot about a paper (or the whole library when `paper_id`
    /// is `None`).
    fn ask_chatbot<'a>(
        &'a self,
        query: &'a str,
        paper_id: Option<PaperId>,
        top_k: u32,
    ) -> RepoFuture<'a, String>;

    /// URL where the backend serves a stored PDF.
    fn pdf_url(&self, pdf_path: &str) -> String;
}

/// Names with membership flag set, in map order.
pub fn member_names(membership: &Membership) -> Vec<String> {
    membership
        .iter()
        .filter(|(_, flag)| **flag != 0)
        .map(|(name, _)| name.clone())
        .collect()
}
