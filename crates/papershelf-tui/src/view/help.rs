use ratatui::Frame;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};

use crate::theme::Theme;
use crate::view::centered_rect;

/// Render the help overlay as a centered popup.
pub fn render(f: &mut Frame, theme: &Theme) {
    let area = f.area();
    let popup = centered_rect(area.width.min(66), area.height.min(44), area);

    let lines = vec![
        Line::from(Span::styled(
            " Keyboard Shortcuts ",
            Style::default()
                .fg(theme.header_fg)
                .bg(theme.header_bg)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        section_header("Navigation", theme),
        key_line("j / \u{2193}", "Move down", theme),
        key_line("k / \u{2191}", "Move up", theme),
        key_line("g / G", "Go to top / bottom", theme),
        key_line("Tab / S-Tab", "Next / previous pane", theme),
        key_line("Enter", "Open paper / apply filter / jump to note", theme),
        key_line("] / [", "Next / previous tab", theme),
        key_line("w", "Close tab", theme),
        Line::from(""),
        section_header("Library", theme),
        key_line("/", "Search title, authors, abstract", theme),
        key_line("s", "Cycle sort order", theme),
        key_line("v", "Cycle list / compact / grid", theme),
        key_line("F", "Favourites only", theme),
        key_line("r", "Reload from server", theme),
        Line::from(""),
        section_header("Paper", theme),
        key_line("f", "Toggle favourite", theme),
        key_line("1 / 2 / 3", "Unread / Reading / Read", theme),
        key_line("c", "Edit collections", theme),
        key_line("C", "New collection", theme),
        key_line("d", "Delete (paper, collection, note)", theme),
        key_line("a", "Add paper", theme),
        Line::from(""),
        section_header("PDF", theme),
        key_line("n / p", "Next / previous page", theme),
        key_line("h", "Add a note on this page", theme),
        key_line("click", "Select the note under a highlight", theme),
        Line::from(""),
        section_header("Global", theme),
        key_line("t", "Toggle chat panel", theme),
        key_line("Ctrl+s", "Save settings", theme),
        key_line("?", "Toggle this help", theme),
        key_line("q / Ctrl+c", "Quit", theme),
    ];

    let paragraph = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(theme.active))
                .title(" Help "),
        )
        .wrap(Wrap { trim: false });

    f.render_widget(Clear, popup);
    f.render_widget(paragraph, popup);
}

fn section_header<'a>(title: &'a str, theme: &Theme) -> Line<'a> {
    Line::from(Span::styled(
        format!("  {title}"),
        Style::default()
            .fg(theme.active)
            .add_modifier(Modifier::BOLD),
    ))
}

fn key_line<'a>(key: &'a str, desc: &'a str, theme: &Theme) -> Line<'a> {
    Line::from(vec![
        Span::styled(format!("    {key:<14}"), Style::default().fg(theme.text)),
        Span::styled(desc, Style::default().fg(theme.dim)),
    ])
}
