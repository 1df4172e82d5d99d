use std::path::PathBuf;

use ratatui::layout::{Margin, Position};

use papershelf_core::config_file::{self, ChatConfig, ConfigFile, NotesConfig, ServerConfig};
use papershelf_core::form::{AddPaperForm, FormField};
use papershelf_core::view_state::LIST_TAB_ID;
use papershelf_core::{Collection, HighlightArea, Overlay, Resource, SelectionEvent, ViewIntent};

use super::{App, DeleteTarget, Focus, InputMode, SidebarEntry, TextTarget};
use crate::action::Action;
use crate::tui_event::BackendCommand;

impl App {
    /// Process a user action and update state. Returns true if the app should quit.
    pub fn update(&mut self, action: Action) -> bool {
        match action {
            Action::Tick => {
                self.tick = self.tick.wrapping_add(1);
                return false;
            }
            Action::Resize(_w, h) => {
                self.visible_rows = (h as usize).saturating_sub(6);
                return false;
            }
            Action::None => return false,
            _ => {}
        }

        if self.show_help {
            if matches!(action, Action::ToggleHelp | Action::Back | Action::Quit) {
                self.show_help = false;
            }
            return false;
        }

        if let Some(target) = self.confirm_delete.take() {
            if action == Action::Confirm {
                self.delete(target);
            }
            return false;
        }

        let quit = match self.input_mode {
            InputMode::Form => self.update_form(action),
            InputMode::TextInput => self.update_text(action),
            InputMode::Normal if self.editor.is_some() => self.update_editor(action),
            InputMode::Normal => self.update_normal(action),
        };
        self.clamp();
        quit
    }

    fn update_normal(&mut self, action: Action) -> bool {
        match action {
            Action::Quit => {
                self.should_quit = true;
                return true;
            }
            Action::ToggleHelp => self.show_help = true,
            Action::Back => self.status_message = None,
            Action::FocusNext | Action::FocusPrev => {
                let cycle = self.focus_cycle();
                let i = cycle.iter().position(|f| *f == self.focus).unwrap_or(0);
                let next = if action == Action::FocusNext {
                    (i + 1) % cycle.len()
                } else {
                    (i + cycle.len() - 1) % cycle.len()
                };
                self.focus = cycle[next];
            }
            Action::NextTab | Action::PrevTab => self.cycle_tab(action == Action::NextTab),
            Action::CloseTab => {
                let active = self.library.view().active_tab.clone();
                self.library.dispatch(ViewIntent::CloseTab(active));
            }
            Action::ToggleChat => {
                self.chat_open = !self.chat_open;
                if self.chat_open {
                    self.focus = Focus::Chat;
                }
            }
            Action::AddPaper => {
                self.form = Some(AddPaperForm::default());
                self.form_field = FormField::File;
                self.input_mode = InputMode::Form;
            }
            Action::Refresh => self.load(),
            Action::SaveConfig => self.save_config(),
            Action::StartSearch => {
                self.library
                    .dispatch(ViewIntent::ActivateTab(LIST_TAB_ID.to_string()));
                self.focus = Focus::Papers;
                self.text_buffer = self.library.view().search_query.clone();
                self.begin_text(TextTarget::Search);
            }
            Action::CycleSort => {
                let next = self.library.view().sort_order.next();
                self.library.dispatch(ViewIntent::SetSort(next));
            }
            Action::CycleViewMode => {
                let next = self.library.view().view_mode.next();
                self.library.dispatch(ViewIntent::SetViewMode(next));
            }
            Action::ToggleFavouritesOnly => {
                self.library.dispatch(ViewIntent::ToggleFavoritesOnly);
                self.paper_cursor = 0;
            }
            Action::NewCollection => {
                self.text_buffer.clear();
                self.begin_text(TextTarget::NewCollection);
            }
            Action::Click(column, row) => {
                if let Some((_, key)) = self.active_document() {
                    self.click_page(&key, column, row);
                }
            }
            _ => {
                if self.library.view().is_list_active() || self.focus == Focus::Chat {
                    match self.focus {
                        Focus::Sidebar => self.update_sidebar(action),
                        Focus::Chat => self.update_chat(action),
                        Focus::Papers | Focus::Notes => self.update_papers(action),
                    }
                } else {
                    self.update_document(action);
                }
            }
        }
        false
    }

    fn cycle_tab(&mut self, forward: bool) {
        let view = self.library.view();
        let len = view.tabs.len();
        let i = view
            .tabs
            .iter()
            .position(|t| t.id == view.active_tab)
            .unwrap_or(0);
        let next = if forward {
            (i + 1) % len
        } else {
            (i + len - 1) % len
        };
        let id = view.tabs[next].id.clone();
        self.library.dispatch(ViewIntent::ActivateTab(id));
        self.note_cursor = 0;
    }

    fn update_sidebar(&mut self, action: Action) {
        let entries = self.sidebar_entries();
        match action {
            Action::MoveDown => {
                self.sidebar_cursor = (self.sidebar_cursor + 1).min(entries.len().saturating_sub(1));
            }
            Action::MoveUp => self.sidebar_cursor = self.sidebar_cursor.saturating_sub(1),
            Action::GoTop => self.sidebar_cursor = 0,
            Action::GoBottom => self.sidebar_cursor = entries.len().saturating_sub(1),
            Action::Select => {
                let Some(entry) = entries.get(self.sidebar_cursor) else {
                    return;
                };
                let intent = match entry {
                    SidebarEntry::Status(s) => ViewIntent::SelectStatus(*s),
                    SidebarEntry::Favourites => {
                        if self.library.view().show_favorites_only {
                            self.focus = Focus::Papers;
                            return;
                        }
                        ViewIntent::ToggleFavoritesOnly
                    }
                    SidebarEntry::Collection(name) => ViewIntent::SelectCollection(name.clone()),
                    SidebarEntry::Tag(tag) => ViewIntent::SelectTag(tag.clone()),
                };
                self.library.dispatch(intent);
                self.paper_cursor = 0;
                self.focus = Focus::Papers;
            }
            Action::Delete => {
                if let Some(SidebarEntry::Collection(name)) = entries.get(self.sidebar_cursor) {
                    self.confirm_delete = Some(DeleteTarget::Collection(name.clone()));
                }
            }
            _ => {}
        }
    }

    fn update_papers(&mut self, action: Action) {
        let len = self.library.display().len();
        match action {
            Action::MoveDown => self.paper_cursor = (self.paper_cursor + 1).min(len.saturating_sub(1)),
            Action::MoveUp => self.paper_cursor = self.paper_cursor.saturating_sub(1),
            Action::GoTop => self.paper_cursor = 0,
            Action::GoBottom => self.paper_cursor = len.saturating_sub(1),
            Action::NextPage => {
                self.paper_cursor = (self.paper_cursor + self.visible_rows).min(len.saturating_sub(1));
            }
            Action::PrevPage => {
                self.paper_cursor = self.paper_cursor.saturating_sub(self.visible_rows);
            }
            Action::Select => {
                let Some(paper) = self.selected_paper() else {
                    return;
                };
                match &paper.pdf_path {
                    Some(path) => {
                        let intent = ViewIntent::OpenPdf {
                            paper_id: paper.paper_id,
                            title: paper.title.clone(),
                            pdf_path: path.clone(),
                        };
                        self.library.dispatch(intent);
                        self.focus = Focus::Notes;
                        self.note_cursor = 0;
                    }
                    None => {
                        self.status_message = Some("No PDF stored for this paper".to_string());
                    }
                }
            }
            Action::ToggleFavourite => {
                let Some(id) = self.selected_paper().map(|p| p.paper_id) else {
                    return;
                };
                if let Some(request) = self.library.begin_toggle_favourite(id) {
                    self.send(BackendCommand::SetFavourite { request });
                }
            }
            Action::SetStatus(status) => {
                let Some(id) = self.selected_paper().map(|p| p.paper_id) else {
                    return;
                };
                if let Some(request) = self.library.begin_status(id, status) {
                    self.send(BackendCommand::SetStatus { request });
                }
            }
            Action::Delete => {
                if let Some(id) = self.selected_paper().map(|p| p.paper_id) {
                    self.confirm_delete = Some(DeleteTarget::Paper(id));
                }
            }
            Action::EditCollections => {
                let Some(id) = self.selected_paper().map(|p| p.paper_id) else {
                    return;
                };
                let ticket = self.library.issue(Resource::Collections(id));
                self.send(BackendCommand::FetchMembership {
                    ticket,
                    paper_id: id,
                });
            }
            _ => {}
        }
    }

    /// Keys on a PDF tab.
    fn update_document(&mut self, action: Action) {
        let Some((_, key)) = self.active_document() else {
            return;
        };
        let notes_len = self.notes.notes_for(&key).len();
        match action {
            Action::NextPage => {
                let page = self.page(&key) + 1;
                self.pages.insert(key, page);
            }
            Action::PrevPage => {
                let page = self.page(&key).saturating_sub(1);
                self.pages.insert(key, page);
            }
            Action::MoveDown => {
                self.note_cursor = (self.note_cursor + 1).min(notes_len.saturating_sub(1));
            }
            Action::MoveUp => self.note_cursor = self.note_cursor.saturating_sub(1),
            Action::GoTop => self.note_cursor = 0,
            Action::GoBottom => self.note_cursor = notes_len.saturating_sub(1),
            Action::Select => {
                let Some(id) = self.notes.notes_for(&key).get(self.note_cursor).map(|n| n.id) else {
                    return;
                };
                let overlay = self
                    .overlays
                    .entry(key.clone())
                    .or_insert_with(|| Overlay::new(key.as_str()));
                if let Some(area) = overlay.jump_to(&self.notes, id) {
                    self.pages.insert(key, area.page_index);
                }
            }
            Action::Highlight => {
                self.overlay_mut(&key).cancel();
                self.text_buffer.clear();
                self.begin_text(TextTarget::NoteQuote);
            }
            Action::Delete => {
                if let Some(note) = self.notes.notes_for(&key).get(self.note_cursor) {
                    self.confirm_delete = Some(DeleteTarget::Note {
                        document_key: key.clone(),
                        id: note.id,
                    });
                }
            }
            _ => {}
        }
    }

    /// Focus the note whose highlight sits under a click on the page pane.
    fn click_page(&mut self, key: &str, column: u16, row: u16) {
        let pane = crate::view::page_area(self.screen, self.chat_open)
            .inner(Margin::new(1, 1));
        if !pane.contains(Position::new(column, row)) {
            return;
        }
        // Page coordinates are percentages of the page, measured at cell centres.
        let x = (f64::from(column - pane.x) + 0.5) / f64::from(pane.width) * 100.0;
        let y = (f64::from(row - pane.y) + 0.5) / f64::from(pane.height) * 100.0;
        let page = self.page(key);
        let overlay = self
            .overlays
            .entry(key.to_string())
            .or_insert_with(|| Overlay::new(key));
        let Some(id) = overlay.hit_test(&self.notes, page, x, y) else {
            return;
        };
        if let Some(i) = self.notes.notes_for(key).iter().position(|n| n.id == id) {
            self.note_cursor = i;
        }
        self.focus = Focus::Notes;
    }
    fn update_chat(&mut self, action: Action) {
        if action == Action::Select {
            if self.chat_session().waiting {
                self.status_message = Some("Waiting for the previous answer".to_string());
                return;
            }
            self.text_buffer.clear();
            self.begin_text(TextTarget::Chat);
        }
    }

    fn update_editor(&mut self, action: Action) -> bool {
        let Some(editor) = self.editor.as_mut() else {
            return false;
        };
        match action {
            Action::Quit => {
                self.should_quit = true;
                return true;
            }
            Action::MoveDown => editor.move_cursor(1),
            Action::MoveUp => editor.move_cursor(-1),
            Action::ToggleItem => editor.toggle_selected(),
            Action::Select => {
                if editor.saving {
                    return false;
                }
                let paper_id = editor.paper_id;
                let membership = editor.submission();
                editor.saving = true;
                match self.library.begin_collections(paper_id) {
                    Some(ticket) => self.send(BackendCommand::SaveCollections {
                        ticket,
                        paper_id,
                        membership,
                    }),
                    None => self.editor = None,
                }
            }
            Action::Back | Action::Cancel => self.editor = None,
            _ => {}
        }
        false
    }

    fn begin_text(&mut self, target: TextTarget) {
        self.text_target = Some(target);
        self.input_mode = InputMode::TextInput;
    }

    fn end_text(&mut self) {
        self.text_target = None;
        self.text_buffer.clear();
        self.input_mode = InputMode::Normal;
    }

    fn update_text(&mut self, action: Action) -> bool {
        let Some(target) = self.text_target else {
            self.input_mode = InputMode::Normal;
            return false;
        };
        match action {
            Action::Quit => {
                self.should_quit = true;
                return true;
            }
            Action::Input(c) => {
                self.text_buffer.push(c);
                self.text_changed(target);
            }
            Action::Backspace => {
                self.text_buffer.pop();
                self.text_changed(target);
            }
            Action::Cancel => {
                match target {
                    TextTarget::Search => {
                        self.library.dispatch(ViewIntent::SetSearch(String::new()));
                    }
                    TextTarget::NoteQuote | TextTarget::NoteMessage => {
                        if let Some((_, key)) = self.active_document() {
                            self.overlay_mut(&key).cancel();
                        }
                    }
                    TextTarget::NewCollection | TextTarget::Chat => {}
                }
                self.end_text();
            }
            Action::Submit => self.submit_text(target),
            _ => {}
        }
        false
    }

    fn text_changed(&mut self, target: TextTarget) {
        if target == TextTarget::Search {
            self.library
                .dispatch(ViewIntent::SetSearch(self.text_buffer.clone()));
            self.paper_cursor = 0;
        }
    }

    fn submit_text(&mut self, target: TextTarget) {
        let text = self.text_buffer.trim().to_string();
        match target {
            TextTarget::Search => {
                self.text_target = None;
                self.input_mode = InputMode::Normal;
                self.text_buffer.clear();
            }
            TextTarget::NewCollection => {
                if !text.is_empty() {
                    self.send(BackendCommand::AddCollection {
                        collection: Collection::new(text),
                    });
                }
                self.end_text();
            }
            TextTarget::NoteQuote => {
                let Some((_, key)) = self.active_document() else {
                    self.end_text();
                    return;
                };
                if text.is_empty() {
                    self.end_text();
                    return;
                }
                // The terminal view has no text layer, so a quote is anchored
                // to the whole current page.
                let page = self.page(&key);
                let event = SelectionEvent {
                    selected_text: text,
                    highlight_areas: vec![HighlightArea {
                        page_index: page,
                        left: 0.0,
                        top: 0.0,
                        width: 100.0,
                        height: 100.0,
                    }],
                };
                self.overlay_mut(&key).select(event);
                self.text_buffer.clear();
                self.text_target = Some(TextTarget::NoteMessage);
            }
            TextTarget::NoteMessage => {
                let Some((_, key)) = self.active_document() else {
                    self.end_text();
                    return;
                };
                let message = self.text_buffer.clone();
                let overlay = self
                    .overlays
                    .entry(key.clone())
                    .or_insert_with(|| Overlay::new(key.as_str()));
                overlay.message = message;
                match overlay.submit(&mut self.notes) {
                    Ok(Some(id)) => {
                        let count = self.notes.notes_for(&key).len();
                        self.note_cursor = count.saturating_sub(1);
                        tracing::info!(note_id = id, document = %key, "note added");
                        self.status_message = Some("Note added".to_string());
                        self.end_text();
                    }
                    // Empty note: keep the prompt open.
                    Ok(None) => {}
                    Err(e) => {
                        tracing::warn!(error = %e, "failed to save notes");
                        self.status_message = Some(format!("Failed to save notes: {e}"));
                        self.end_text();
                    }
                }
            }
            TextTarget::Chat => {
                let paper_id = self.chat_key();
                let top_k = self.settings.top_k;
                let session = self.chat_session();
                session.input = text;
                let query = session.send();
                self.end_text();
                if let Some(query) = query {
                    let ticket = self.library.issue(Resource::Chat(paper_id));
                    self.send(BackendCommand::Ask {
                        ticket,
                        paper_id,
                        query,
                        top_k,
                    });
                }
            }
        }
    }

    fn update_form(&mut self, action: Action) -> bool {
        let Some(form) = self.form.as_mut() else {
            self.input_mode = InputMode::Normal;
            return false;
        };
        match action {
            Action::Quit => {
                self.should_quit = true;
                return true;
            }
            Action::Input(c) => form.field_mut(self.form_field).push(c),
            Action::Backspace => {
                form.field_mut(self.form_field).pop();
            }
            Action::NextField => self.form_field = self.form_field.next(),
            Action::PrevField => self.form_field = self.form_field.prev(),
            Action::Cancel => {
                self.form = None;
                self.input_mode = InputMode::Normal;
            }
            Action::Extract => {
                if form.is_extracting() {
                    self.status_message = Some("Extraction already running".to_string());
                } else if !form.can_extract() {
                    self.status_message = Some("Select a PDF file first".to_string());
                } else {
                    let path = PathBuf::from(form.file_path.trim());
                    let ticket = self.library.issue(Resource::Extraction);
                    form.extracting = Some(ticket.clone());
                    self.status_message = Some("Extracting metadata...".to_string());
                    self.send(BackendCommand::Extract { ticket, path });
                }
            }
            Action::Submit => {
                if form.is_extracting() || self.library.is_in_flight(&Resource::CreatePaper) {
                    return false;
                }
                match form.to_input() {
                    Ok(input) => {
                        let ticket = self.library.issue(Resource::CreatePaper);
                        self.status_message = Some("Adding paper...".to_string());
                        self.send(BackendCommand::CreatePaper { ticket, input });
                    }
                    Err(e) => self.status_message = Some(format!("Cannot add paper: {e}")),
                }
            }
            _ => {}
        }
        false
    }

    fn delete(&mut self, target: DeleteTarget) {
        match target {
            DeleteTarget::Paper(id) => {
                if let Some(ticket) = self.library.begin_delete(id) {
                    self.send(BackendCommand::DeletePaper {
                        ticket,
                        paper_id: id,
                    });
                }
            }
            DeleteTarget::Collection(name) => {
                self.send(BackendCommand::DeleteCollection { name });
            }
            DeleteTarget::Note { document_key, id } => {
                let overlay = self
                    .overlays
                    .entry(document_key.clone())
                    .or_insert_with(|| Overlay::new(document_key.as_str()));
                if let Err(e) = overlay.delete(&mut self.notes, id) {
                    tracing::warn!(error = %e, "failed to save notes");
                    self.status_message = Some(format!("Failed to save notes: {e}"));
                }
            }
        }
        self.clamp();
    }

    fn save_config(&mut self) {
        let view = self.library.view();
        self.settings.sort = view.sort_order;
        self.settings.view_mode = view.view_mode;
        let config = ConfigFile {
            server: Some(ServerConfig {
                base_url: Some(self.settings.base_url.clone()),
                timeout_secs: Some(self.settings.timeout.as_secs()),
            }),
            display: Some(self.settings.display_config()),
            notes: Some(NotesConfig {
                path: self
                    .notes
                    .path()
                    .map(|p| p.display().to_string()),
            }),
            chat: Some(ChatConfig {
                top_k: Some(self.settings.top_k),
            }),
        };
        self.status_message = Some(match config_file::save_config(&config) {
            Ok(path) => format!("Config saved to {}", path.display()),
            Err(e) => e,
        });
    }
}
