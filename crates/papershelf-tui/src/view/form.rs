use ratatui::Frame;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};

use papershelf_core::form::{AddPaperForm, FormField};

use crate::app::App;
use crate::view::{centered_rect, spinner_char, truncate};

/// Render the add-paper form as a centered popup.
pub fn render(f: &mut Frame, app: &App, form: &AddPaperForm) {
    let theme = &app.theme;
    let area = f.area();
    let popup = centered_rect(area.width.min(80), area.height.min(22), area);
    let value_width = (popup.width as usize).saturating_sub(24);

    let mut lines = vec![Line::from("")];
    for field in FormField::ALL {
        let current = field == app.form_field;
        let label_style = if current {
            Style::default()
                .fg(theme.active)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(theme.text)
        };
        let value = form.field(field);
        let mut spans = vec![
            Span::styled(
                format!(" {} {:<18}", if current { "\u{25B8}" } else { " " }, field.label()),
                label_style,
            ),
            Span::styled(truncate(value, value_width), Style::default().fg(theme.text)),
        ];
        if current {
            spans.push(Span::styled("\u{2588}", Style::default().fg(theme.active)));
        }
        lines.push(Line::from(spans));
        if current && !field.hint().is_empty() {
            lines.push(Line::from(Span::styled(
                format!("{:22}{}", "", field.hint()),
                Style::default().fg(theme.dim),
            )));
        }
    }

    lines.push(Line::from(""));
    if form.is_extracting() {
        lines.push(Line::from(Span::styled(
            format!(" {} Extracting metadata...", spinner_char(app.tick)),
            Style::default().fg(theme.spinner),
        )));
    } else if let Some(name) = form.file_name() {
        lines.push(Line::from(Span::styled(
            format!(" Selected: {name}"),
            Style::default().fg(theme.dim),
        )));
    }
    if let Some(msg) = &app.status_message {
        lines.push(Line::from(Span::styled(
            format!(" {msg}"),
            Style::default().fg(theme.error),
        )));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(vec![
        key(" Tab", theme),
        Span::styled(": next  ", Style::default().fg(theme.dim)),
        key("Ctrl+e", theme),
        Span::styled(": extract  ", Style::default().fg(theme.dim)),
        key("Enter", theme),
        Span::styled(": add  ", Style::default().fg(theme.dim)),
        key("Esc", theme),
        Span::styled(": cancel", Style::default().fg(theme.dim)),
    ]));

    let paragraph = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(theme.active))
                .title(" Add New Paper "),
        )
        .wrap(Wrap { trim: false });

    f.render_widget(Clear, popup);
    f.render_widget(paragraph, popup);
}

fn key<'a>(k: &'a str, theme: &crate::theme::Theme) -> Span<'a> {
    Span::styled(
        k,
        Style::default()
            .fg(theme.active)
            .add_modifier(Modifier::BOLD),
    )
}
