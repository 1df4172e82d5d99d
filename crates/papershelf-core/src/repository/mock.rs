//! In-memory repository for tests.

use std::collections::HashSet;
use std::sync::Mutex;
use std::time::Duration;

use chrono::Utc;

use super::{PaperRepository, RepoFuture};
use crate::{
    Collection, CreatedPaper, ErrorPayload, ExtractedMetadata, Membership, Paper, PaperId,
    PaperInput, ReadingStatus, RepoError,
};

#[derive(Default)]
struct MockState {
    papers: Vec<Paper>,
    collections: Vec<Collection>,
    next_id: PaperId,
}

/// A hand-rolled [`PaperRepository`] that keeps papers in memory.
///
/// Supports:
/// - Failing a named operation (see [`fail`](MockRepository::fail)) with a
///   server error carrying a `detail` payload.
/// - Optional per-call latency.
/// - A call log, so tests can count network round trips.
pub struct MockRepository {
    state: Mutex<MockState>,
    failing: Mutex<HashSet<&'static str>>,
    calls: Mutex<Vec<&'static str>>,
    delay: Option<Duration>,
    pub extraction: ExtractedMetadata,
    pub chat_reply: String,
}

impl MockRepository {
    pub fn new(papers: Vec<Paper>) -> Self {
        let next_id = papers.iter().map(|p| p.paper_id).max().unwrap_or(0) + 1;
        Self {
            state: Mutex::new(MockState {
                papers,
                collections: Vec::new(),
                next_id,
            }),
            failing: Mutex::new(HashSet::new()),
            calls: Mutex::new(Vec::new()),
            delay: None,
            extraction: ExtractedMetadata::default(),
            chat_reply: String::new(),
        }
    }

    pub fn with_collections(self, collections: Vec<Collection>) -> Self {
        self.state.lock().unwrap().collections = collections;
        self
    }

    /// Set simulated network latency per call.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Make every call to `op` (e.g. `"set_favourite"`) fail.
    pub fn fail(&self, op: &'static str) {
        self.failing.lock().unwrap().insert(op);
    }

    pub fn recover(&self, op: &'static str) {
        self.failing.lock().unwrap().remove(op);
    }

    /// How many times `op` has been called.
    pub fn call_count(&self, op: &str) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| **c == op).count()
    }

    pub fn papers(&self) -> Vec<Paper> {
        self.state.lock().unwrap().papers.clone()
    }

    fn enter(&self, op: &'static str) -> Result<(), RepoError> {
        self.calls.lock().unwrap().push(op);
        if self.failing.lock().unwrap().contains(op) {
            return Err(RepoError::Server {
                status: 500,
                payload: ErrorPayload::Detail(format!("{op} failed")),
            });
        }
        Ok(())
    }

    async fn pause(&self) {
        if let Some(d) = self.delay {
            tokio::time::sleep(d).await;
        }
    }

    fn with_paper<T>(
        &self,
        id: PaperId,
        f: impl FnOnce(&mut Paper) -> T,
    ) -> Result<T, RepoError> {
        let mut state = self.state.lock().unwrap();
        match state.papers.iter_mut().find(|p| p.paper_id == id) {
            Some(p) => Ok(f(p)),
            None => Err(not_found()),
        }
    }
}

fn not_found() -> RepoError {
    RepoError::Server {
        status: 404,
        payload: ErrorPayload::Detail("Paper not found".into()),
    }
}

impl PaperRepository for MockRepository {
    fn list_papers(&self) -> RepoFuture<'_, Vec<Paper>> {
        Box::pin(async move {
            self.pause().await;
            self.enter("list_papers")?;
            Ok(self.papers())
        })
    }

    fn get_paper(&self, id: PaperId) -> RepoFuture<'_, Paper> {
        Box::pin(async move {
            self.pause().await;
            self.enter("get_paper")?;
            self.with_paper(id, |p| p.clone())
        })
    }

    fn create_paper<'a>(&'a self, input: &'a PaperInput) -> RepoFuture<'a, CreatedPaper> {
        Box::pin(async move {
            self.pause().await;
            self.enter("create_paper")?;
            let mut state = self.state.lock().unwrap();
            let id = state.next_id;
            state.next_id += 1;
            let pdf_path = format!("uploads/{}", input.pdf_filename);
            let paper = Paper::from_input(id, input, Some(pdf_path.clone()), Utc::now().naive_utc());
            state.papers.push(paper);
            Ok(CreatedPaper {
                paper_id: id,
                pdf_path: Some(pdf_path),
            })
        })
    }

    fn delete_paper(&self, id: PaperId) -> RepoFuture<'_, ()> {
        Box::pin(async move {
            self.pause().await;
            self.enter("delete_paper")?;
            let mut state = self.state.lock().unwrap();
            let before = state.papers.len();
            state.papers.retain(|p| p.paper_id != id);
            if state.papers.len() == before {
                return Err(not_found());
            }
            Ok(())
        })
    }

    fn set_favourite(&self, id: PaperId, favourite: bool) -> RepoFuture<'_, ()> {
        Box::pin(async move {
            self.pause().await;
            self.enter("set_favourite")?;
            self.with_paper(id, |p| p.is_favourite = favourite)
        })
    }

    fn set_status(&self, id: PaperId, status: ReadingStatus) -> RepoFuture<'_, ()> {
        Box::pin(async move {
            self.pause().await;
            self.enter("set_status")?;
            self.with_paper(id, |p| p.status = status)
        })
    }

    fn paper_collections(&self, id: PaperId) -> RepoFuture<'_, Membership> {
        Box::pin(async move {
            self.pause().await;
            self.enter("paper_collections")?;
            let state = self.state.lock().unwrap();
            let paper = state
                .papers
                .iter()
                .find(|p| p.paper_id == id)
                .ok_or_else(not_found)?;
            Ok(state
                .collections
                .iter()
                .map(|c| {
                    let member = paper.collections.contains(&c.name);
                    (c.name.clone(), u8::from(member))
                })
                .collect())
        })
    }

    fn set_collections<'a>(
        &'a self,
        id: PaperId,
        membership: &'a Membership,
    ) -> RepoFuture<'a, ()> {
        Box::pin(async move {
            self.pause().await;
            self.enter("set_collections")?;
            let known: Vec<String> = {
                let state = self.state.lock().unwrap();
                state.collections.iter().map(|c| c.name.clone()).collect()
            };
            self.with_paper(id, |p| {
                for (name, flag) in membership {
                    // Unknown collection names are ignored, as the backend does.
                    if !known.contains(name) {
                        continue;
                    }
                    let present = p.collections.contains(name);
                    if *flag != 0 && !present {
                        p.collections.push(name.clone());
                    } else if *flag == 0 && present {
                        p.collections.retain(|c| c != name);
                    }
                }
            })
        })
    }

    fn list_collections(&self) -> RepoFuture<'_, Vec<Collection>> {
        Box::pin(async move {
            self.pause().await;
            self.enter("list_collections")?;
            Ok(self.state.lock().unwrap().collections.clone())
        })
    }

    fn add_collection<'a>(&'a self, collection: &'a Collection) -> RepoFuture<'a, Collection> {
        Box::pin(async move {
            self.pause().await;
            self.enter("add_collection")?;
            self.state.lock().unwrap().collections.push(collection.clone());
            Ok(collection.clone())
        })
    }

    fn delete_collection<'a>(&'a self, name: &'a str) -> RepoFuture<'a, ()> {
        Box::pin(async move {
            self.pause().await;
            self.enter("delete_collection")?;
            let mut state = self.state.lock().unwrap();
            state.collections.retain(|c| c.name != name);
            for p in &mut state.papers {
                p.collections.retain(|c| c != name);
            }
            Ok(())
        })
    }

    fn extract_metadata<'a>(
        &'a self,
        file_name: &'a str,
        _bytes: Vec<u8>,
    ) -> RepoFuture<'a, ExtractedMetadata> {
        Box::pin(async move {
            self.pause().await;
            self.enter("extract_metadata")?;
            let mut meta = self.extraction.clone();
            meta.pdf_filename.get_or_insert_with(|| file_name.to_string());
            Ok(meta)
        })
    }

    fn ask_chatbot<'a>(
        &'a self,
        _query: &'a str,
        _paper_id: Option<PaperId>,
        _top_k: u32,
    ) -> RepoFuture<'a, String> {
        Box::pin(async move {
            self.pause().await;
            self.enter("ask_chatbot")?;
            Ok(self.chat_reply.clone())
        })
    }

    fn pdf_url(&self, pdf_path: &str) -> String {
        format!("mock://{}", pdf_path.replace('\\', "/"))
    }
}
