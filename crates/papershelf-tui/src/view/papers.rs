use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{Block, Borders, Cell, List, ListItem, ListState, Paragraph, Row, Table};

use papershelf_core::card::{
    author_line, date_line, favourite_glyph, status_action, status_icon, top_keywords,
};
use papershelf_core::{Paper, ReadingStatus, Resource, SidebarFilter, ViewMode};

use crate::app::{App, Focus};
use crate::theme::Theme;
use crate::view::{spinner_char, truncate};

const GRID_COLUMNS: usize = 3;

pub fn render(f: &mut Frame, area: Rect, app: &App) {
    let [header, body] =
        Layout::vertical([Constraint::Length(1), Constraint::Min(3)]).areas(area);
    render_header(f, header, app);

    let papers = app.library.display();
    let theme = &app.theme;
    let border = if app.focus == Focus::Papers {
        theme.focused_border_style()
    } else {
        theme.border_style()
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border)
        .title(format!(
            " Sort: {} (s) \u{2502} View: {} (v) ",
            app.library.view().sort_order.label(),
            app.library.view().view_mode.label()
        ));

    if papers.is_empty() {
        let msg = if app.library.is_in_flight(&Resource::PaperList) {
            format!(" {} Loading papers...", spinner_char(app.tick))
        } else if app.library.papers().is_empty() {
            " No papers yet. Press a to add one.".to_string()
        } else {
            " No papers match.".to_string()
        };
        let p = Paragraph::new(Span::styled(msg, Style::default().fg(theme.dim))).block(block);
        f.render_widget(p, body);
        return;
    }

    let width = (body.width as usize).saturating_sub(4);
    match app.library.view().view_mode {
        ViewMode::List => render_list(f, body, app, &papers, block, width, false),
        ViewMode::Compact => render_list(f, body, app, &papers, block, width, true),
        ViewMode::Grid => render_grid(f, body, app, &papers, block),
    }
}

fn render_header(f: &mut Frame, area: Rect, app: &App) {
    let theme = &app.theme;
    let view = app.library.view();

    let scope = if view.show_favorites_only {
        "Favourites".to_string()
    } else {
        match &view.filter {
            SidebarFilter::None => "Papers".to_string(),
            SidebarFilter::Status(s) => s.label().to_string(),
            SidebarFilter::Collection(c) => format!("Collection: {c}"),
            SidebarFilter::Tag(t) => format!("Tag: #{t}"),
        }
    };

    let mut spans = vec![
        Span::styled(" Papers ", theme.header_style()),
        Span::styled(
            format!(" {scope}"),
            Style::default().fg(theme.text).add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!("  {} shown", app.library.display().len()),
            Style::default().fg(theme.dim),
        ),
    ];
    if !view.search_query.is_empty() {
        spans.push(Span::styled(
            format!("  [search: {}]", view.search_query),
            Style::default().fg(theme.active),
        ));
    }
    if app.library.is_in_flight(&Resource::PaperList) {
        spans.push(Span::styled(
            format!("  {}", spinner_char(app.tick)),
            Style::default().fg(theme.spinner),
        ));
    }
    f.render_widget(Paragraph::new(Line::from(spans)), area);
}

/// Title line shared by every layout: favourite star, status icon, title.
fn title_spans<'a>(paper: &'a Paper, theme: &Theme, width: usize) -> Vec<Span<'a>> {
    vec![
        Span::styled(
            favourite_glyph(paper.is_favourite),
            Style::default().fg(theme.favourite_color(paper.is_favourite)),
        ),
        Span::raw(" "),
        Span::styled(
            status_icon(paper.status),
            Style::default().fg(theme.status_color(paper.status)),
        ),
        Span::raw(" "),
        Span::styled(
            truncate(&paper.title, width.saturating_sub(6)),
            Style::default().fg(theme.text).add_modifier(Modifier::BOLD),
        ),
    ]
}

fn card_lines<'a>(paper: &'a Paper, theme: &Theme, width: usize) -> Vec<Line<'a>> {
    let dim = Style::default().fg(theme.dim);
    let mut lines = vec![Line::from(title_spans(paper, theme, width))];

    let authors = author_line(paper);
    if !authors.is_empty() {
        lines.push(Line::from(Span::styled(
            format!("    {}", truncate(&authors, width.saturating_sub(4))),
            Style::default().fg(theme.text),
        )));
    }
    lines.push(Line::from(Span::styled(format!("    {}", date_line(paper)), dim)));
    lines.push(status_buttons(paper, theme));

    let mut chips: Vec<Span> = vec![Span::raw("    ")];
    for kw in top_keywords(paper) {
        chips.push(Span::styled(format!("#{kw} "), Style::default().fg(theme.active)));
    }
    if !paper.collections.is_empty() {
        chips.push(Span::styled(format!("[{}]", paper.collections.join(", ")), dim));
    }
    if chips.len() > 1 {
        lines.push(Line::from(chips));
    }
    lines
}

/// `1 Unread  2 Reading  3 Read`, with the paper's current status lit.
fn status_buttons<'a>(paper: &Paper, theme: &Theme) -> Line<'a> {
    let mut spans = vec![Span::raw("    ")];
    for (key, status) in ReadingStatus::ALL.into_iter().enumerate() {
        let style = if status == paper.status {
            Style::default()
                .fg(theme.status_color(status))
                .add_modifier(Modifier::BOLD | Modifier::REVERSED)
        } else {
            Style::default().fg(theme.dim)
        };
        spans.push(Span::styled(format!("{} {}", key + 1, status_action(status)), style));
        spans.push(Span::raw("  "));
    }
    Line::from(spans)
}

fn render_list(
    f: &mut Frame,
    area: Rect,
    app: &App,
    papers: &[&Paper],
    block: Block,
    width: usize,
    compact: bool,
) {
    let theme = &app.theme;
    let items: Vec<ListItem> = papers
        .iter()
        .map(|paper| {
            if compact {
                let mut spans = title_spans(paper, theme, width / 2);
                spans.push(Span::styled(
                    format!("  {}", truncate(&author_line(paper), width / 2)),
                    Style::default().fg(theme.dim),
                ));
                ListItem::new(Line::from(spans))
            } else {
                let mut lines = card_lines(paper, theme, width);
                lines.push(Line::from(""));
                ListItem::new(Text::from(lines))
            }
        })
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_style(theme.highlight_style());
    let mut state = ListState::default();
    state.select(Some(app.paper_cursor));
    f.render_stateful_widget(list, area, &mut state);
}

fn render_grid(f: &mut Frame, area: Rect, app: &App, papers: &[&Paper], block: Block) {
    let theme = &app.theme;
    let cell_width = (area.width as usize).saturating_sub(2) / GRID_COLUMNS;
    let rows_visible = (area.height as usize).saturating_sub(2) / 5;
    let cursor_row = app.paper_cursor / GRID_COLUMNS;
    let first_row = cursor_row.saturating_sub(rows_visible.saturating_sub(1));

    let rows: Vec<Row> = papers
        .chunks(GRID_COLUMNS)
        .enumerate()
        .skip(first_row)
        .map(|(row_idx, chunk)| {
            let cells = chunk.iter().enumerate().map(|(col, paper)| {
                let idx = row_idx * GRID_COLUMNS + col;
                let cell = Cell::from(Text::from(card_lines(paper, theme, cell_width)));
                if idx == app.paper_cursor {
                    cell.style(theme.highlight_style())
                } else {
                    cell
                }
            });
            Row::new(cells).height(5)
        })
        .collect();

    let widths = [Constraint::Ratio(1, GRID_COLUMNS as u32); GRID_COLUMNS];
    let table = Table::new(rows, widths).block(block).column_spacing(1);
    f.render_widget(table, area);
}
