//! UI state record and the pure reducer that drives it.
//!
//! The sidebar selection is a single enum, so at most one of status,
//! collection or tag can be selected at any time. Favourites-only mode is a
//! separate flag that the reducer keeps exclusive with the sidebar selection.

use crate::filter::SortOrder;
use crate::{PaperId, ReadingStatus};

/// Id of the permanent papers list tab.
pub const LIST_TAB_ID: &str = "papersList";

/// Label of the status sentinel that matches every paper.
pub const ALL_PAPERS: &str = "All Papers";

/// Status entry in the sidebar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusFilter {
    /// The "All Papers" sentinel.
    All,
    Only(ReadingStatus),
}

impl StatusFilter {
    pub const ENTRIES: [StatusFilter; 4] = [
        Self::All,
        Self::Only(ReadingStatus::Unread),
        Self::Only(ReadingStatus::InProgress),
        Self::Only(ReadingStatus::Completed),
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::All => ALL_PAPERS,
            Self::Only(st) => st.label(),
        }
    }

    pub fn matches(self, status: ReadingStatus) -> bool {
        match self {
            Self::All => true,
            Self::Only(st) => st == status,
        }
    }
}

/// The single active sidebar filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SidebarFilter {
    None,
    Status(StatusFilter),
    Collection(String),
    Tag(String),
}

/// Layout of the papers list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ViewMode {
    #[default]
    List,
    Compact,
    Grid,
}

impl ViewMode {
    pub fn next(self) -> Self {
        match self {
            Self::List => Self::Compact,
            Self::Compact => Self::Grid,
            Self::Grid => Self::List,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::List => "list",
            Self::Compact => "compact",
            Self::Grid => "grid",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "list" => Some(Self::List),
            "compact" => Some(Self::Compact),
            "grid" => Some(Self::Grid),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TabKind {
    List,
    Pdf { paper_id: PaperId, pdf_path: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tab {
    pub id: String,
    pub title: String,
    pub kind: TabKind,
}

impl Tab {
    pub fn list() -> Self {
        Self {
            id: LIST_TAB_ID.to_string(),
            title: "Papers".to_string(),
            kind: TabKind::List,
        }
    }

    /// Tab id used for a paper's PDF tab.
    pub fn pdf_id(paper_id: PaperId) -> String {
        paper_id.to_string()
    }

    pub fn paper_id(&self) -> Option<PaperId> {
        match &self.kind {
            TabKind::Pdf { paper_id, .. } => Some(*paper_id),
            TabKind::List => None,
        }
    }
}

/// Everything the user has selected, as one immutable record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewState {
    pub filter: SidebarFilter,
    pub show_favorites_only: bool,
    pub sort_order: SortOrder,
    pub view_mode: ViewMode,
    pub search_query: String,
    pub tabs: Vec<Tab>,
    pub active_tab: String,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            filter: SidebarFilter::Status(StatusFilter::All),
            show_favorites_only: false,
            sort_order: SortOrder::DateAdded,
            view_mode: ViewMode::List,
            search_query: String::new(),
            tabs: vec![Tab::list()],
            active_tab: LIST_TAB_ID.to_string(),
        }
    }
}

impl ViewState {
    pub fn selected_status(&self) -> Option<StatusFilter> {
        match self.filter {
            SidebarFilter::Status(s) => Some(s),
            _ => None,
        }
    }

    pub fn selected_collection(&self) -> Option<&str> {
        match &self.filter {
            SidebarFilter::Collection(c) => Some(c),
            _ => None,
        }
    }

    pub fn selected_tag(&self) -> Option<&str> {
        match &self.filter {
            SidebarFilter::Tag(t) => Some(t),
            _ => None,
        }
    }

    pub fn active(&self) -> Option<&Tab> {
        self.tabs.iter().find(|t| t.id == self.active_tab)
    }

    pub fn is_list_active(&self) -> bool {
        self.active_tab == LIST_TAB_ID
    }
}

/// Everything that can change a [`ViewState`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewIntent {
    SelectStatus(StatusFilter),
    SelectCollection(String),
    SelectTag(String),
    ToggleFavoritesOnly,
    SetSort(SortOrder),
    SetViewMode(ViewMode),
    SetSearch(String),
    OpenPdf {
        paper_id: PaperId,
        title: String,
        pdf_path: String,
    },
    ActivateTab(String),
    CloseTab(String),
    /// A paper left the canonical set; its PDF tab goes with it.
    PaperRemoved(PaperId),
    /// A collection was deleted; drop it from the selection if selected.
    CollectionRemoved(String),
}

/// Apply one intent to a state, producing the next state.
pub fn reduce(state: &ViewState, intent: ViewIntent) -> ViewState {
    let mut next = state.clone();
    match intent {
        ViewIntent::SelectStatus(status) => select(&mut next, SidebarFilter::Status(status)),
        ViewIntent::SelectCollection(name) => select(&mut next, SidebarFilter::Collection(name)),
        ViewIntent::SelectTag(tag) => select(&mut next, SidebarFilter::Tag(tag)),
        ViewIntent::ToggleFavoritesOnly => {
            next.show_favorites_only = !state.show_favorites_only;
            next.filter = if next.show_favorites_only {
                SidebarFilter::None
            } else {
                SidebarFilter::Status(StatusFilter::All)
            };
            next.active_tab = LIST_TAB_ID.to_string();
        }
        ViewIntent::SetSort(order) => next.sort_order = order,
        ViewIntent::SetViewMode(mode) => next.view_mode = mode,
        ViewIntent::SetSearch(query) => next.search_query = query,
        ViewIntent::OpenPdf {
            paper_id,
            title,
            pdf_path,
        } => {
            let id = Tab::pdf_id(paper_id);
            if !next.tabs.iter().any(|t| t.id == id) {
                next.tabs.push(Tab {
                    id: id.clone(),
                    title,
                    kind: TabKind::Pdf { paper_id, pdf_path },
                });
            }
            next.active_tab = id;
        }
        ViewIntent::ActivateTab(id) => {
            if next.tabs.iter().any(|t| t.id == id) {
                next.active_tab = id;
            }
        }
        ViewIntent::CloseTab(id) => close_tab(&mut next, &id),
        ViewIntent::PaperRemoved(paper_id) => close_tab(&mut next, &Tab::pdf_id(paper_id)),
        ViewIntent::CollectionRemoved(name) => {
            if next.selected_collection() == Some(name.as_str()) {
                next.filter = SidebarFilter::Status(StatusFilter::All);
            }
        }
    }
    next
}

fn select(state: &mut ViewState, filter: SidebarFilter) {
    state.filter = filter;
    state.show_favorites_only = false;
    state.active_tab = LIST_TAB_ID.to_string();
}

fn close_tab(state: &mut ViewState, id: &str) {
    if id == LIST_TAB_ID {
        return;
    }
    let Some(pos) = state.tabs.iter().position(|t| t.id == id) else {
        return;
    };
    state.tabs.remove(pos);
    if state.active_tab == id {
        // Most recently added remaining tab; the list tab is always first.
        state.active_tab = state
            .tabs
            .last()
            .map(|t| t.id.clone())
            .unwrap_or_else(|| LIST_TAB_ID.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open(state: &ViewState, id: PaperId) -> ViewState {
        reduce(
            state,
            ViewIntent::OpenPdf {
                paper_id: id,
                title: format!("Paper {id}"),
                pdf_path: format!("uploads/{id}.pdf"),
            },
        )
    }

    #[test]
    fn default_state_shows_all_papers_on_list_tab() {
        let s = ViewState::default();
        assert_eq!(s.selected_status(), Some(StatusFilter::All));
        assert_eq!(s.active_tab, LIST_TAB_ID);
        assert_eq!(s.tabs.len(), 1);
    }

    #[test]
    fn selecting_collection_clears_status_and_favourites() {
        let s = reduce(&ViewState::default(), ViewIntent::ToggleFavoritesOnly);
        let s = reduce(&s, ViewIntent::SelectCollection("ML".into()));
        assert_eq!(s.selected_collection(), Some("ML"));
        assert_eq!(s.selected_status(), None);
        assert_eq!(s.selected_tag(), None);
        assert!(!s.show_favorites_only);
    }

    #[test]
    fn selecting_tag_then_status_leaves_only_status() {
        let s = reduce(&ViewState::default(), ViewIntent::SelectTag("nlp".into()));
        assert_eq!(s.selected_tag(), Some("nlp"));
        let s = reduce(
            &s,
            ViewIntent::SelectStatus(StatusFilter::Only(ReadingStatus::Completed)),
        );
        assert_eq!(s.selected_tag(), None);
        assert_eq!(
            s.selected_status(),
            Some(StatusFilter::Only(ReadingStatus::Completed))
        );
    }

    #[test]
    fn selection_returns_focus_to_list_tab() {
        let s = open(&ViewState::default(), 3);
        assert_eq!(s.active_tab, "3");
        let s = reduce(&s, ViewIntent::SelectTag("rl".into()));
        assert_eq!(s.active_tab, LIST_TAB_ID);
    }

    #[test]
    fn favourites_toggle_on_clears_filters_and_off_resets_to_all() {
        let s = reduce(&ViewState::default(), ViewIntent::SelectTag("x".into()));
        let s = open(&s, 9);
        let on = reduce(&s, ViewIntent::ToggleFavoritesOnly);
        assert!(on.show_favorites_only);
        assert_eq!(on.filter, SidebarFilter::None);
        assert_eq!(on.active_tab, LIST_TAB_ID);
        let off = reduce(&on, ViewIntent::ToggleFavoritesOnly);
        assert!(!off.show_favorites_only);
        assert_eq!(off.selected_status(), Some(StatusFilter::All));
    }

    #[test]
    fn opening_same_pdf_twice_reuses_tab() {
        let s = open(&ViewState::default(), 4);
        let s = reduce(&s, ViewIntent::ActivateTab(LIST_TAB_ID.into()));
        let again = open(&s, 4);
        assert_eq!(again.tabs.len(), s.tabs.len());
        assert_eq!(again.tabs.iter().filter(|t| t.id == "4").count(), 1);
        assert_eq!(again.active_tab, "4");
    }

    #[test]
    fn closing_list_tab_is_noop() {
        let s = open(&ViewState::default(), 1);
        let closed = reduce(&s, ViewIntent::CloseTab(LIST_TAB_ID.into()));
        assert_eq!(closed, s);
    }

    #[test]
    fn closing_active_tab_activates_most_recent_remaining() {
        let s = open(&ViewState::default(), 1);
        let s = open(&s, 2);
        let s = open(&s, 3);
        let s = reduce(&s, ViewIntent::ActivateTab("2".into()));
        let s = reduce(&s, ViewIntent::CloseTab("2".into()));
        assert_eq!(s.active_tab, "3");
        let s = reduce(&s, ViewIntent::CloseTab("3".into()));
        assert_eq!(s.active_tab, "1");
        let s = reduce(&s, ViewIntent::CloseTab("1".into()));
        assert_eq!(s.active_tab, LIST_TAB_ID);
    }

    #[test]
    fn closing_inactive_tab_keeps_focus() {
        let s = open(&ViewState::default(), 1);
        let s = open(&s, 2);
        let s = reduce(&s, ViewIntent::CloseTab("1".into()));
        assert_eq!(s.active_tab, "2");
        assert_eq!(s.tabs.len(), 2);
    }

    #[test]
    fn removed_paper_closes_its_tab() {
        let s = open(&ViewState::default(), 5);
        let s = reduce(&s, ViewIntent::PaperRemoved(5));
        assert!(s.tabs.iter().all(|t| t.id != "5"));
        assert_eq!(s.active_tab, LIST_TAB_ID);
    }

    #[test]
    fn removed_collection_resets_selection() {
        let s = reduce(&ViewState::default(), ViewIntent::SelectCollection("Old".into()));
        let s = reduce(&s, ViewIntent::CollectionRemoved("Old".into()));
        assert_eq!(s.selected_status(), Some(StatusFilter::All));
    }

    #[test]
    fn activating_unknown_tab_is_ignored() {
        let s = ViewState::default();
        assert_eq!(reduce(&s, ViewIntent::ActivateTab("42".into())), s);
    }
}
