use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap};

use papershelf_core::card::{author_line, date_line};
use papershelf_core::PaperId;

use crate::app::{App, Focus};
use crate::view::truncate;

/// A PDF tab: document info and page cursor on the left, the note sidebar
/// on the right.
pub fn render(f: &mut Frame, area: Rect, app: &App, paper_id: PaperId, pdf_path: &str) {
    let [doc, notes] = split(area);
    render_document(f, doc, app, paper_id, pdf_path);
    render_notes(f, notes, app, pdf_path);
}

/// Page pane and note sidebar.
pub fn split(area: Rect) -> [Rect; 2] {
    Layout::horizontal([Constraint::Percentage(55), Constraint::Percentage(45)]).areas(area)
}

fn render_document(f: &mut Frame, area: Rect, app: &App, paper_id: PaperId, pdf_path: &str) {
    let theme = &app.theme;
    let page = app.page(pdf_path);
    let dim = Style::default().fg(theme.dim);

    let mut lines = Vec::new();
    if let Some(paper) = app.library.paper(paper_id) {
        lines.push(Line::from(Span::styled(
            paper.title.clone(),
            Style::default().fg(theme.text).add_modifier(Modifier::BOLD),
        )));
        lines.push(Line::from(Span::styled(author_line(paper), Style::default().fg(theme.text))));
        lines.push(Line::from(Span::styled(date_line(paper), dim)));
        lines.push(Line::from(""));
    }
    lines.push(Line::from(vec![
        Span::styled("URL  ", dim),
        Span::styled(app.document_url(pdf_path), Style::default().fg(theme.active)),
    ]));
    lines.push(Line::from(vec![
        Span::styled("Page ", dim),
        Span::styled(
            format!("{}", page + 1),
            Style::default().fg(theme.text).add_modifier(Modifier::BOLD),
        ),
        Span::styled("  (n/p, click a highlight to find its note)", dim),
    ]));
    lines.push(Line::from(""));

    let highlights = app
        .overlays
        .get(pdf_path)
        .map(|o| o.highlights_on_page(&app.notes, page))
        .unwrap_or_default();
    let focused = app.overlays.get(pdf_path).and_then(|o| o.focused_note);
    if highlights.is_empty() {
        lines.push(Line::from(Span::styled("No highlights on this page.", dim)));
    } else {
        lines.push(Line::from(Span::styled(
            format!("Highlights on this page: {}", highlights.len()),
            Style::default().fg(theme.highlight),
        )));
        for (id, a) in highlights {
            let style = if focused == Some(id) {
                Style::default().fg(theme.highlight).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(theme.highlight)
            };
            lines.push(Line::from(Span::styled(
                format!(
                    "  \u{258C} note {id} at {:.0}%,{:.0}% ({:.0}\u{00D7}{:.0})",
                    a.left, a.top, a.width, a.height
                ),
                style,
            )));
        }
    }

    if let Some(pending) = app.overlays.get(pdf_path).and_then(|o| o.pending.as_ref()) {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            format!("Adding note for \"{}\"", truncate(&pending.selected_text, 60)),
            Style::default().fg(theme.active),
        )));
    }

    let title = app
        .library
        .view()
        .active()
        .map(|t| format!(" {} ", t.title))
        .unwrap_or_default();
    let p = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(theme.border_style())
                .title(title),
        );
    f.render_widget(p, area);
}

fn render_notes(f: &mut Frame, area: Rect, app: &App, pdf_path: &str) {
    let theme = &app.theme;
    let notes = app.notes.notes_for(pdf_path);
    let width = (area.width as usize).saturating_sub(6);
    let focused = app.overlays.get(pdf_path).and_then(|o| o.focused_note);

    let items: Vec<ListItem> = notes
        .iter()
        .map(|note| {
            let pages: Vec<String> = note
                .highlight_areas
                .iter()
                .map(|a| (a.page_index + 1).to_string())
                .collect();
            let marker = if focused == Some(note.id) { "\u{25B8}" } else { " " };
            ListItem::new(Text::from(vec![
                Line::from(vec![
                    Span::styled(
                        format!("{marker} #{} ", note.id),
                        Style::default().fg(theme.active).add_modifier(Modifier::BOLD),
                    ),
                    Span::styled(
                        format!("p. {}", pages.join(", ")),
                        Style::default().fg(theme.dim),
                    ),
                ]),
                Line::from(Span::styled(
                    format!("  \u{201C}{}\u{201D}", truncate(&note.quote, width)),
                    Style::default().fg(theme.highlight),
                )),
                Line::from(Span::styled(
                    format!("  {}", truncate(&note.content, width)),
                    Style::default().fg(theme.text),
                )),
            ]))
        })
        .collect();

    let border = if app.focus == Focus::Notes {
        theme.focused_border_style()
    } else {
        theme.border_style()
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border)
        .title(format!(" Notes ({}) h: add ", notes.len()));

    if items.is_empty() {
        let p = Paragraph::new(Span::styled(
            " No notes yet.",
            Style::default().fg(theme.dim),
        ))
        .block(block);
        f.render_widget(p, area);
        return;
    }

    let list = List::new(items)
        .block(block)
        .highlight_style(theme.highlight_style());
    let mut state = ListState::default();
    state.select(Some(app.note_cursor));
    f.render_stateful_widget(list, area, &mut state);
}
