use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, List, ListItem, ListState};

use papershelf_core::{SidebarFilter, StatusFilter};

use crate::app::{App, Focus, SidebarEntry};
use crate::view::truncate;

pub fn render(f: &mut Frame, area: Rect, app: &App) {
    let theme = &app.theme;
    let view = app.library.view();
    let width = (area.width as usize).saturating_sub(6);

    let entries = app.sidebar_entries();
    let mut section = "";
    let mut items = Vec::with_capacity(entries.len());
    let mut selected_row = None;

    for (i, entry) in entries.iter().enumerate() {
        let heading = match entry {
            SidebarEntry::Status(_) | SidebarEntry::Favourites => "Library",
            SidebarEntry::Collection(_) => "Collections",
            SidebarEntry::Tag(_) => "Tags",
        };
        if heading != section {
            section = heading;
            items.push(ListItem::new(Line::from(Span::styled(
                heading,
                Style::default()
                    .fg(theme.active)
                    .add_modifier(Modifier::BOLD),
            ))));
        }
        if i == app.sidebar_cursor {
            selected_row = Some(items.len());
        }

        let (label, active) = match entry {
            SidebarEntry::Status(s) => {
                let active = !view.show_favorites_only
                    && view.filter == SidebarFilter::Status(*s);
                let label = match s {
                    StatusFilter::All => s.label().to_string(),
                    StatusFilter::Only(st) => {
                        format!("{} {}", papershelf_core::card::status_icon(*st), st.label())
                    }
                };
                (label, active)
            }
            SidebarEntry::Favourites => (
                format!("\u{2605} Favourites ({})", app.library.favourite_count()),
                view.show_favorites_only,
            ),
            SidebarEntry::Collection(name) => (
                name.clone(),
                view.selected_collection() == Some(name.as_str()),
            ),
            SidebarEntry::Tag(tag) => (format!("#{tag}"), view.selected_tag() == Some(tag.as_str())),
        };

        let marker = if active { "\u{25B8} " } else { "  " };
        let style = if active {
            Style::default().fg(theme.active).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(theme.text)
        };
        items.push(ListItem::new(Line::from(vec![
            Span::styled(marker, style),
            Span::styled(truncate(&label, width), style),
        ])));
    }

    let border = if app.focus == Focus::Sidebar {
        theme.focused_border_style()
    } else {
        theme.border_style()
    };
    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(border)
                .title(" Browse "),
        )
        .highlight_style(theme.highlight_style());

    let mut state = ListState::default();
    if app.focus == Focus::Sidebar {
        state.select(selected_row);
    }
    f.render_stateful_widget(list, area, &mut state);
}
