use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::app::App;
use crate::view::truncate;

const TAB_TITLE_WIDTH: usize = 24;

/// One-line tab strip; the active tab is drawn in the header colours.
pub fn render(f: &mut Frame, area: Rect, app: &App) {
    let theme = &app.theme;
    let view = app.library.view();

    let mut spans = vec![Span::styled(" papershelf ", theme.header_style()), Span::raw(" ")];
    for tab in &view.tabs {
        let title = format!(" {} ", truncate(&tab.title, TAB_TITLE_WIDTH));
        let style = if tab.id == view.active_tab {
            Style::default()
                .fg(theme.active)
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
        } else {
            Style::default().fg(theme.dim)
        };
        spans.push(Span::styled(title, style));
        spans.push(Span::styled("\u{2502}", theme.border_style()));
    }
    f.render_widget(Paragraph::new(Line::from(spans)), area);
}
