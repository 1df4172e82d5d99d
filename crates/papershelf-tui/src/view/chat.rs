use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};

use papershelf_core::chat::{GREETING, Sender};

use crate::app::{App, Focus};
use crate::view::spinner_char;

/// Chat panel for the current context: the open paper, or the whole library
/// from the list tab.
pub fn render(f: &mut Frame, area: Rect, app: &App) {
    let theme = &app.theme;
    let key = app.chat_key();
    let session = app.chats.get(&key);

    let mut lines = Vec::new();
    match session {
        Some(session) => {
            for msg in &session.messages {
                let (who, style) = match msg.sender {
                    Sender::Bot => ("bot", Style::default().fg(theme.active)),
                    Sender::User => ("you", Style::default().fg(theme.text)),
                };
                lines.push(Line::from(vec![
                    Span::styled(format!("{who}: "), style.add_modifier(Modifier::BOLD)),
                    Span::styled(msg.text.clone(), style),
                ]));
                lines.push(Line::from(""));
            }
            if session.waiting {
                lines.push(Line::from(Span::styled(
                    format!("{} thinking...", spinner_char(app.tick)),
                    Style::default().fg(theme.spinner),
                )));
            }
        }
        None => lines.push(Line::from(vec![
            Span::styled("bot: ", Style::default().fg(theme.active).add_modifier(Modifier::BOLD)),
            Span::styled(GREETING, Style::default().fg(theme.active)),
        ])),
    }

    // Keep the newest lines in view.
    let inner_height = area.height.saturating_sub(2) as usize;
    let scroll = lines.len().saturating_sub(inner_height) as u16;

    let title = match key.and_then(|id| app.library.paper(id)) {
        Some(_) => " Chat: this paper (Enter) ",
        None => " Chat: library (Enter) ",
    };
    let border = if app.focus == Focus::Chat {
        theme.focused_border_style()
    } else {
        theme.border_style()
    };
    let p = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .scroll((scroll, 0))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(border)
                .title(title),
        );
    f.render_widget(p, area);
}
