use ratatui::Frame;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

use crate::app::{App, DeleteTarget};
use crate::view::{centered_rect, truncate};

/// Render the delete confirmation dialog as a centered popup.
pub fn render(f: &mut Frame, app: &App, target: &DeleteTarget) {
    let theme = &app.theme;
    let area = f.area();
    let popup = centered_rect(area.width.min(52), 5, area);

    let prompt = match target {
        DeleteTarget::Paper(id) => {
            let title = app
                .library
                .paper(*id)
                .map(|p| p.title.as_str())
                .unwrap_or("this paper");
            format!("  Delete \"{}\"?", truncate(title, 36))
        }
        DeleteTarget::Collection(name) => format!("  Delete collection \"{}\"?", truncate(name, 26)),
        DeleteTarget::Note { id, .. } => format!("  Delete note #{id}?"),
    };

    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            prompt,
            Style::default().fg(theme.text).add_modifier(Modifier::BOLD),
        )),
        Line::from(vec![
            Span::styled(
                "  y",
                Style::default().fg(theme.error).add_modifier(Modifier::BOLD),
            ),
            Span::styled(": delete   ", Style::default().fg(theme.dim)),
            Span::styled(
                "any key",
                Style::default()
                    .fg(theme.active)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(": cancel", Style::default().fg(theme.dim)),
        ]),
    ];

    let paragraph = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme.error))
            .title(" Confirm Delete "),
    );

    f.render_widget(Clear, popup);
    f.render_widget(paragraph, popup);
}
