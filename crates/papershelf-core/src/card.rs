//! Presentation helpers for a single paper card, and the per-card
//! collection membership editor.

use std::collections::BTreeMap;

use chrono::Datelike;

use crate::{Membership, Paper, PaperId, ReadingStatus};

/// Number of keyword chips shown on a card.
pub const CARD_KEYWORDS: usize = 3;

pub fn status_icon(status: ReadingStatus) -> &'static str {
    match status {
        ReadingStatus::Unread => "⏳",
        ReadingStatus::InProgress => "📖",
        ReadingStatus::Completed => "✅",
    }
}

/// Short label used on the status buttons.
pub fn status_action(status: ReadingStatus) -> &'static str {
    match status {
        ReadingStatus::Unread => "Unread",
        ReadingStatus::InProgress => "Reading",
        ReadingStatus::Completed => "Read",
    }
}

pub fn favourite_glyph(favourite: bool) -> &'static str {
    if favourite { "★" } else { "☆" }
}

/// `d.m.yyyy` without zero padding, or `N/A`.
pub fn format_date<D: Datelike>(date: Option<D>) -> String {
    match date {
        Some(d) => format!("{}.{}.{}", d.day(), d.month(), d.year()),
        None => "N/A".to_string(),
    }
}

/// `Published: … | Added on: …`, skipping the publication part when unknown.
pub fn date_line(paper: &Paper) -> String {
    let added = format!("Added on: {}", format_date(Some(paper.added_date)));
    match paper.publication_date {
        Some(d) => format!("Published: {} | {added}", format_date(Some(d))),
        None => added,
    }
}

pub fn author_line(paper: &Paper) -> String {
    paper.author_names().collect::<Vec<_>>().join(", ")
}

pub fn top_keywords(paper: &Paper) -> &[String] {
    &paper.keywords[..paper.keywords.len().min(CARD_KEYWORDS)]
}

/// Draft of a paper's collection membership while the editor is open.
///
/// Nothing here touches the canonical set; the caller sends
/// [`submission`](Self::submission) and re-fetches membership on success.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionEditor {
    pub paper_id: PaperId,
    pub draft: BTreeMap<String, bool>,
    pub cursor: usize,
    pub saving: bool,
}

impl CollectionEditor {
    pub fn open(paper_id: PaperId, membership: &Membership) -> Self {
        Self {
            paper_id,
            draft: membership
                .iter()
                .map(|(name, flag)| (name.clone(), *flag != 0))
                .collect(),
            cursor: 0,
            saving: false,
        }
    }

    pub fn toggle(&mut self, name: &str) {
        if let Some(flag) = self.draft.get_mut(name) {
            *flag = !*flag;
        }
    }

    pub fn toggle_selected(&mut self) {
        if let Some(name) = self.draft.keys().nth(self.cursor).cloned() {
            self.toggle(&name);
        }
    }

    pub fn move_cursor(&mut self, delta: isize) {
        let len = self.draft.len();
        if len == 0 {
            return;
        }
        self.cursor = (self.cursor as isize + delta).rem_euclid(len as isize) as usize;
    }

    pub fn submission(&self) -> Membership {
        self.draft
            .iter()
            .map(|(name, on)| (name.clone(), u8::from(*on)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::{added_on, paper};
    use crate::Author;
    use chrono::NaiveDate;

    #[test]
    fn dates_are_unpadded_day_month_year() {
        assert_eq!(format_date(NaiveDate::from_ymd_opt(2024, 3, 7)), "7.3.2024");
        assert_eq!(format_date(None::<NaiveDate>), "N/A");
    }

    #[test]
    fn date_line_skips_missing_publication() {
        let p = added_on(paper(1, "x"), 2024, 1, 5);
        assert_eq!(date_line(&p), "Added on: 5.1.2024");
        let mut q = p.clone();
        q.publication_date = NaiveDate::from_ymd_opt(2020, 12, 31);
        assert_eq!(date_line(&q), "Published: 31.12.2020 | Added on: 5.1.2024");
    }

    #[test]
    fn card_shows_three_keywords_and_joined_authors() {
        let mut p = paper(1, "x");
        p.keywords = vec!["a".into(), "b".into(), "c".into(), "d".into()];
        p.authors = vec![Author::new("Ada"), Author::new("Alan")];
        assert_eq!(top_keywords(&p), ["a", "b", "c"]);
        assert_eq!(author_line(&p), "Ada, Alan");
        let empty = paper(2, "y");
        assert!(top_keywords(&empty).is_empty());
    }

    #[test]
    fn editor_round_trips_membership_flags() {
        let membership: Membership = [("Bio".to_string(), 0), ("ML".to_string(), 1)]
            .into_iter()
            .collect();
        let mut ed = CollectionEditor::open(3, &membership);
        ed.toggle("Bio");
        ed.toggle("Unknown");
        let out = ed.submission();
        assert_eq!(out.get("Bio"), Some(&1));
        assert_eq!(out.get("ML"), Some(&1));
        assert_eq!(out.len(), 2);
    }

    #[test]
    fn editor_cursor_wraps() {
        let membership: Membership = [("A".to_string(), 0), ("B".to_string(), 0)]
            .into_iter()
            .collect();
        let mut ed = CollectionEditor::open(1, &membership);
        ed.move_cursor(-1);
        assert_eq!(ed.cursor, 1);
        ed.toggle_selected();
        assert_eq!(ed.draft.get("B"), Some(&true));
    }
}
