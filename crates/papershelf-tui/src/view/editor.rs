use ratatui::Frame;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

use papershelf_core::card::CollectionEditor;

use crate::app::App;
use crate::view::{centered_rect, spinner_char, truncate};

/// One row per collection plus padding, at least 7 rows, never taller than the screen.
fn popup_height(collections: usize, screen_height: u16) -> u16 {
    u16::try_from(collections)
        .unwrap_or(u16::MAX)
        .saturating_add(6)
        .max(7)
        .min(screen_height)
}

/// Checkbox popup for a paper's collection membership.
pub fn render(f: &mut Frame, app: &App, editor: &CollectionEditor) {
    let theme = &app.theme;
    let area = f.area();
    let height = popup_height(editor.draft.len(), area.height);
    let popup = centered_rect(area.width.min(48), height, area);

    let title = app
        .library
        .paper(editor.paper_id)
        .map(|p| format!(" Collections: {} ", truncate(&p.title, 28)))
        .unwrap_or_else(|| " Collections ".to_string());

    let mut lines = vec![Line::from("")];
    if editor.draft.is_empty() {
        lines.push(Line::from(Span::styled(
            "  No collections. Press Esc, then C to create one.",
            Style::default().fg(theme.dim),
        )));
    }
    for (i, (name, on)) in editor.draft.iter().enumerate() {
        let check = if *on { "[x]" } else { "[ ]" };
        let style = if i == editor.cursor {
            theme.highlight_style().fg(theme.active)
        } else {
            Style::default().fg(theme.text)
        };
        lines.push(Line::from(Span::styled(format!("  {check} {name}"), style)));
    }
    lines.push(Line::from(""));
    if editor.saving {
        lines.push(Line::from(Span::styled(
            format!("  {} Saving...", spinner_char(app.tick)),
            Style::default().fg(theme.spinner),
        )));
    } else {
        lines.push(Line::from(vec![
            Span::styled(
                "  Space",
                Style::default().fg(theme.active).add_modifier(Modifier::BOLD),
            ),
            Span::styled(": toggle  ", Style::default().fg(theme.dim)),
            Span::styled(
                "Enter",
                Style::default().fg(theme.active).add_modifier(Modifier::BOLD),
            ),
            Span::styled(": save  ", Style::default().fg(theme.dim)),
            Span::styled(
                "Esc",
                Style::default().fg(theme.active).add_modifier(Modifier::BOLD),
            ),
            Span::styled(": close", Style::default().fg(theme.dim)),
        ]));
    }

    let paragraph = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme.active))
            .title(title),
    );
    f.render_widget(Clear, popup);
    f.render_widget(paragraph, popup);
}
