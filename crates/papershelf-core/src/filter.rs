//! Filter, search and sort over the canonical paper set.
//!
//! Everything here is pure: the same inputs always produce the same ordered
//! output, and the input slice is never modified.

use std::cmp::Ordering;

use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

use crate::Paper;
use crate::view_state::{SidebarFilter, ViewState};

/// Sort order for the papers list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    #[default]
    DateAdded,
    PublicationDate,
    Title,
    /// Produced for unrecognised sort keys; keeps input order.
    Unsorted,
}

impl SortOrder {
    pub fn next(self) -> Self {
        match self {
            Self::DateAdded => Self::PublicationDate,
            Self::PublicationDate => Self::Title,
            Self::Title | Self::Unsorted => Self::DateAdded,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::DateAdded => "Date Added",
            Self::PublicationDate => "Publication Date",
            Self::Title => "Title",
            Self::Unsorted => "Unsorted",
        }
    }

    /// Recognise a sort key: the display labels (`Date Added`) as well as
    /// the camelCase (`dateAdded`) and snake_case spellings, in any case.
    pub fn from_key(key: &str) -> Option<Self> {
        let folded: String = key
            .chars()
            .filter(|c| !matches!(c, ' ' | '_' | '-'))
            .flat_map(char::to_lowercase)
            .collect();
        match folded.as_str() {
            "dateadded" | "added" => Some(Self::DateAdded),
            "publicationdate" | "published" => Some(Self::PublicationDate),
            "title" => Some(Self::Title),
            _ => None,
        }
    }

    /// Like [`from_key`](Self::from_key), but unknown keys keep input order.
    pub fn parse(key: &str) -> Self {
        Self::from_key(key).unwrap_or_else(|| {
            tracing::debug!(key, "unknown sort key");
            Self::Unsorted
        })
    }
}

/// Keep the papers that pass the sidebar filter.
pub fn apply_filter<'a>(papers: &[&'a Paper], filter: &SidebarFilter) -> Vec<&'a Paper> {
    papers
        .iter()
        .copied()
        .filter(|p| match filter {
            SidebarFilter::None => true,
            SidebarFilter::Status(s) => s.matches(p.status),
            SidebarFilter::Collection(c) => p.collections.iter().any(|x| x == c),
            SidebarFilter::Tag(t) => p.keywords.iter().any(|x| x == t),
        })
        .collect()
}

/// Case-insensitive substring search across title, authors, abstract,
/// keywords and status. Any one field matching keeps the paper.
pub fn search<'a>(papers: &[&'a Paper], query: &str) -> Vec<&'a Paper> {
    if query.is_empty() {
        return papers.to_vec();
    }
    let needle = query.to_lowercase();
    let hit = |s: &str| s.to_lowercase().contains(&needle);
    papers
        .iter()
        .copied()
        .filter(|p| {
            hit(&p.title)
                || p.author_names().any(hit)
                || p.r#abstract.as_deref().is_some_and(hit)
                || p.keywords.iter().any(|k| hit(k))
                || hit(p.status.label())
        })
        .collect()
}

/// Stable sort by the requested order.
pub fn sort<'a>(papers: &[&'a Paper], order: SortOrder) -> Vec<&'a Paper> {
    let mut out = papers.to_vec();
    match order {
        SortOrder::DateAdded => out.sort_by(|a, b| b.added_date.cmp(&a.added_date)),
        SortOrder::PublicationDate => out.sort_by(|a, b| {
            // Newest first, undated papers last.
            match (a.publication_date, b.publication_date) {
                (Some(x), Some(y)) => y.cmp(&x),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            }
        }),
        SortOrder::Title => out.sort_by(|a, b| collate(&a.title, &b.title)),
        SortOrder::Unsorted => {}
    }
    out
}

/// Locale-aware string comparison: accents and case are ignored at the
/// primary level, with the raw strings as a deterministic tiebreak.
pub fn collate(a: &str, b: &str) -> Ordering {
    collation_key(a)
        .cmp(&collation_key(b))
        .then_with(|| a.cmp(b))
}

fn collation_key(s: &str) -> String {
    s.nfkd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
        .collect()
}

/// Papers marked as favourite, in canonical order.
pub fn favourites(papers: &[Paper]) -> Vec<&Paper> {
    papers.iter().filter(|p| p.is_favourite).collect()
}

/// The display list for a given state.
///
/// In favourites-only mode the sidebar filter is bypassed: the favourites
/// subset is searched and kept in canonical order.
pub fn derive_display<'a>(papers: &'a [Paper], view: &ViewState) -> Vec<&'a Paper> {
    if view.show_favorites_only {
        return search(&favourites(papers), &view.search_query);
    }
    let all: Vec<&Paper> = papers.iter().collect();
    let filtered = apply_filter(&all, &view.filter);
    let searched = search(&filtered, &view.search_query);
    sort(&searched, view.sort_order)
}
