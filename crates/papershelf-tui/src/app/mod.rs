mod events;
mod update;

#[cfg(test)]
mod tests;

use std::collections::HashMap;

use ratatui::layout::Rect;
use tokio::sync::mpsc;

use papershelf_core::card::CollectionEditor;
use papershelf_core::chat::ChatSession;
use papershelf_core::config_file::Settings;
use papershelf_core::form::{AddPaperForm, FormField};
use papershelf_core::notes::NoteId;
use papershelf_core::repository::http::pdf_url;
use papershelf_core::{
    Library, NoteStore, Overlay, Paper, PaperId, RepoError, StatusFilter, TabKind, ViewState,
};

use crate::theme::Theme;
use crate::tui_event::BackendCommand;

/// Input mode determines how keyboard input is interpreted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    /// A single-line prompt (see [`TextTarget`]).
    TextInput,
    /// The add-paper form.
    Form,
}

/// Pane that receives navigation keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Sidebar,
    Papers,
    Notes,
    Chat,
}

/// What the single-line prompt is editing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextTarget {
    Search,
    NewCollection,
    NoteQuote,
    NoteMessage,
    Chat,
}

impl TextTarget {
    pub fn prompt(self) -> &'static str {
        match self {
            Self::Search => "/",
            Self::NewCollection => "New collection: ",
            Self::NoteQuote => "Quote: ",
            Self::NoteMessage => "Note: ",
            Self::Chat => "Ask: ",
        }
    }
}

/// One row of the sidebar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SidebarEntry {
    Status(StatusFilter),
    Favourites,
    Collection(String),
    Tag(String),
}

/// Something waiting for a `y` before it is deleted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteTarget {
    Paper(PaperId),
    Collection(String),
    Note { document_key: String, id: NoteId },
}

pub struct App {
    pub library: Library,
    pub notes: NoteStore,
    /// Annotation state per PDF path.
    pub overlays: HashMap<String, Overlay>,
    /// Page cursor per PDF path.
    pub pages: HashMap<String, u32>,
    /// Chat transcripts, per paper or library-wide (`None`).
    pub chats: HashMap<Option<PaperId>, ChatSession>,
    pub chat_open: bool,

    pub form: Option<AddPaperForm>,
    pub form_field: FormField,
    pub editor: Option<CollectionEditor>,
    pub confirm_delete: Option<DeleteTarget>,

    pub focus: Focus,
    pub sidebar_cursor: usize,
    pub paper_cursor: usize,
    pub note_cursor: usize,

    pub input_mode: InputMode,
    pub text_target: Option<TextTarget>,
    pub text_buffer: String,

    pub status_message: Option<String>,
    pub show_help: bool,
    pub theme: Theme,
    pub settings: Settings,
    pub tick: usize,
    pub should_quit: bool,
    pub visible_rows: usize,
    /// Terminal area of the last draw, for mapping mouse clicks.
    pub screen: Rect,

    pub backend_cmd_tx: Option<mpsc::UnboundedSender<BackendCommand>>,
}

impl App {
    pub fn new(settings: Settings) -> Self {
        let view = ViewState {
            sort_order: settings.sort,
            view_mode: settings.view_mode,
            ..ViewState::default()
        };
        Self {
            library: Library::new(view),
            notes: NoteStore::in_memory(),
            overlays: HashMap::new(),
            pages: HashMap::new(),
            chats: HashMap::new(),
            chat_open: false,
            form: None,
            form_field: FormField::File,
            editor: None,
            confirm_delete: None,
            focus: Focus::Papers,
            sidebar_cursor: 0,
            paper_cursor: 0,
            note_cursor: 0,
            input_mode: InputMode::Normal,
            text_target: None,
            text_buffer: String::new(),
            status_message: None,
            show_help: false,
            theme: Theme::by_name(&settings.theme),
            settings,
            tick: 0,
            should_quit: false,
            visible_rows: 20,
            screen: Rect::default(),
            backend_cmd_tx: None,
        }
    }

    pub(crate) fn send(&mut self, cmd: BackendCommand) {
        match &self.backend_cmd_tx {
            Some(tx) => {
                if tx.send(cmd).is_err() {
                    tracing::error!("backend channel closed");
                    self.status_message = Some("Backend is not running".to_string());
                }
            }
            None => tracing::debug!(?cmd, "no backend attached, dropping command"),
        }
    }

    /// Fetch papers and collections.
    pub fn load(&mut self) {
        let ticket = self.library.begin_load();
        self.send(BackendCommand::LoadPapers { ticket });
        let ticket = self.library.begin_load_collections();
        self.send(BackendCommand::LoadCollections { ticket });
    }

    /// Show a user-facing failure as `Failed to <what>: <detail>`.
    pub(crate) fn report(&mut self, what: &str, err: &RepoError) {
        tracing::warn!(error = %err, "failed to {what}");
        self.status_message = Some(format!("Failed to {what}: {}", err.user_message()));
    }

    pub fn sidebar_entries(&self) -> Vec<SidebarEntry> {
        let mut entries: Vec<SidebarEntry> = StatusFilter::ENTRIES
            .into_iter()
            .map(SidebarEntry::Status)
            .collect();
        entries.push(SidebarEntry::Favourites);
        entries.extend(
            self.library
                .collections()
                .iter()
                .map(|c| SidebarEntry::Collection(c.name.clone())),
        );
        entries.extend(self.library.all_tags().into_iter().map(SidebarEntry::Tag));
        entries
    }

    pub fn selected_paper(&self) -> Option<&Paper> {
        self.library.display().get(self.paper_cursor).copied()
    }

    /// `(paper_id, pdf_path)` of the active PDF tab.
    pub fn active_document(&self) -> Option<(PaperId, String)> {
        match &self.library.view().active()?.kind {
            TabKind::Pdf { paper_id, pdf_path } => Some((*paper_id, pdf_path.clone())),
            TabKind::List => None,
        }
    }

    pub fn overlay_mut(&mut self, document_key: &str) -> &mut Overlay {
        self.overlays
            .entry(document_key.to_string())
            .or_insert_with(|| Overlay::new(document_key))
    }

    pub fn page(&self, document_key: &str) -> u32 {
        self.pages.get(document_key).copied().unwrap_or(0)
    }

    pub fn document_url(&self, pdf_path: &str) -> String {
        pdf_url(&self.settings.base_url, pdf_path)
    }

    /// Chat transcript key for the current context.
    pub fn chat_key(&self) -> Option<PaperId> {
        self.active_document().map(|(id, _)| id)
    }

    pub fn chat_session(&mut self) -> &mut ChatSession {
        let key = self.chat_key();
        self.chats.entry(key).or_insert_with(|| ChatSession::new(key))
    }

    /// Panes reachable with Tab, in order.
    pub fn focus_cycle(&self) -> Vec<Focus> {
        let mut panes = if self.library.view().is_list_active() {
            vec![Focus::Sidebar, Focus::Papers]
        } else {
            vec![Focus::Notes]
        };
        if self.chat_open {
            panes.push(Focus::Chat);
        }
        panes
    }

    /// Keep focus and cursors inside what is currently on screen.
    pub(crate) fn clamp(&mut self) {
        let cycle = self.focus_cycle();
        if !cycle.contains(&self.focus) {
            self.focus = if cycle.contains(&Focus::Papers) {
                Focus::Papers
            } else {
                cycle[0]
            };
        }
        let sidebar_len = self.sidebar_entries().len();
        self.sidebar_cursor = self.sidebar_cursor.min(sidebar_len.saturating_sub(1));
        let papers_len = self.library.display().len();
        self.paper_cursor = self.paper_cursor.min(papers_len.saturating_sub(1));
        let notes_len = self
            .active_document()
            .map(|(_, key)| self.notes.notes_for(&key).len())
            .unwrap_or(0);
        self.note_cursor = self.note_cursor.min(notes_len.saturating_sub(1));
    }

    /// Render the full UI.
    pub fn view(&mut self, f: &mut ratatui::Frame) {
        self.screen = f.area();
        crate::view::render(f, self);
    }
}
