use papershelf_core::card::CollectionEditor;
use papershelf_core::chat::ChatSession;
use papershelf_core::{Applied, Paper};

use super::{App, InputMode};
use crate::tui_event::{BackendCommand, BackendEvent, SaveOutcome};

impl App {
    /// Apply a backend result to the UI state.
    pub fn handle_backend_event(&mut self, event: BackendEvent) {
        match event {
            BackendEvent::PapersLoaded { ticket, result } => {
                let count = result.as_ref().map(|p| p.len()).ok();
                if self.library.finish_load(&ticket, result) == Applied::Applied
                    && let Some(count) = count
                {
                    tracing::info!(count, "papers loaded");
                }
            }
            BackendEvent::CollectionsLoaded { ticket, result } => {
                self.library.finish_load_collections(&ticket, result);
            }
            BackendEvent::PaperCreated {
                ticket,
                input,
                result,
            } => {
                if self.library.accept(&ticket) == Applied::Stale {
                    return;
                }
                match result {
                    Ok(created) => {
                        let added = chrono::Utc::now().naive_utc();
                        let paper =
                            Paper::from_input(created.paper_id, &input, created.pdf_path, added);
                        self.library.add_paper(paper);
                        self.form = None;
                        self.input_mode = InputMode::Normal;
                        self.paper_cursor = 0;
                        self.status_message = Some(format!("Added \"{}\"", input.title));
                    }
                    Err(e) => self.report("add the paper", &e),
                }
            }
            BackendEvent::PaperDeleted {
                ticket,
                paper_id,
                result,
            } => match self.library.finish_delete(&ticket, paper_id, result) {
                Ok(Applied::Applied) => {
                    self.chats.remove(&Some(paper_id));
                    self.status_message = Some("Paper deleted".to_string());
                }
                Ok(Applied::Stale) => {}
                Err(e) => self.report("delete the paper", &e),
            },
            BackendEvent::FavouriteSet { request, result } => {
                self.library.finish_favourite(&request, result);
                for (paper_id, ticket) in self.library.take_refreshes() {
                    self.send(BackendCommand::RefreshPaper { ticket, paper_id });
                }
            }
            BackendEvent::PaperRefreshed {
                ticket,
                paper_id,
                result,
            } => {
                self.library.finish_refresh(&ticket, paper_id, result);
            }
            BackendEvent::StatusSet { request, result } => {
                if let Err(e) = self.library.finish_status(&request, result) {
                    self.report("update the reading status", &e);
                }
            }
            BackendEvent::MembershipLoaded {
                ticket,
                paper_id,
                result,
            } => {
                if self.library.accept(&ticket) == Applied::Stale {
                    return;
                }
                match result {
                    Ok(membership) => {
                        self.editor = Some(CollectionEditor::open(paper_id, &membership));
                    }
                    Err(e) => self.report("load collections", &e),
                }
            }
            BackendEvent::CollectionsSaved {
                ticket,
                paper_id,
                outcome,
            } => {
                let (result, refetch_error) = match outcome {
                    SaveOutcome::Refreshed(fresh) => (Ok(fresh), None),
                    // The save went through; show what was sent until the next load.
                    SaveOutcome::Unrefreshed { submitted, error } => (Ok(submitted), Some(error)),
                    SaveOutcome::Failed(e) => (Err(e), None),
                };
                match self.library.finish_collections(&ticket, paper_id, result) {
                    Ok(Applied::Applied) => {
                        self.editor = None;
                        self.status_message = Some(match refetch_error {
                            None => "Collections updated".to_string(),
                            Some(e) => {
                                tracing::warn!(paper_id, error = %e, "membership re-fetch failed");
                                format!("Collections saved; could not refresh: {}", e.user_message())
                            }
                        });
                    }
                    Ok(Applied::Stale) => {}
                    Err(e) => {
                        if let Some(editor) = self.editor.as_mut() {
                            editor.saving = false;
                        }
                        self.report("update collections", &e);
                    }
                }
            }
            BackendEvent::CollectionAdded { result } => match result {
                Ok(collection) => {
                    self.status_message =
                        Some(format!("Collection \"{}\" created", collection.name));
                    self.library.add_collection(collection);
                }
                Err(e) => self.report("create the collection", &e),
            },
            BackendEvent::CollectionDeleted { name, result } => match result {
                Ok(()) => {
                    self.library.remove_collection(&name);
                    self.status_message = Some(format!("Collection \"{name}\" deleted"));
                }
                Err(e) => self.report("delete the collection", &e),
            },
            BackendEvent::Extracted { ticket, result } => {
                self.library.accept(&ticket);
                let Some(form) = self.form.as_mut() else {
                    return;
                };
                // A form reopened since the request was sent ignores it.
                if form.extracting.as_ref() != Some(&ticket) {
                    return;
                }
                form.extracting = None;
                match result {
                    Ok(meta) => {
                        form.apply_extraction(meta);
                        self.status_message = Some("Metadata extracted".to_string());
                    }
                    Err(msg) => {
                        tracing::warn!(error = %msg, "metadata extraction failed");
                        self.status_message = Some(format!("Extraction failed: {msg}"));
                    }
                }
            }
            BackendEvent::Answered {
                ticket,
                paper_id,
                result,
            } => {
                if self.library.accept(&ticket) == Applied::Stale {
                    return;
                }
                self.chats
                    .entry(paper_id)
                    .or_insert_with(|| ChatSession::new(paper_id))
                    .receive(result);
            }
        }
        self.clamp();
    }
}
