pub mod chat;
pub mod confirm;
pub mod editor;
pub mod form;
pub mod help;
pub mod papers;
pub mod pdf;
pub mod sidebar;
pub mod tabs;

use ratatui::Frame;
use ratatui::layout::{Constraint, Flex, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::app::{App, InputMode};

/// Spinner frames for animated progress indication.
const SPINNER_FRAMES: &[char] = &[
    '\u{280B}', '\u{2819}', '\u{2839}', '\u{2838}', '\u{283C}', '\u{2834}', '\u{2826}', '\u{2827}',
    '\u{2807}', '\u{280F}',
];

const SIDEBAR_WIDTH: u16 = 28;
const CHAT_WIDTH: u16 = 44;

/// Get the current spinner character based on a tick counter.
pub fn spinner_char(tick: usize) -> char {
    SPINNER_FRAMES[tick % SPINNER_FRAMES.len()]
}

/// Truncate a string to fit in `max_width` columns, appending "\u{2026}" if truncated.
pub fn truncate(s: &str, max_width: usize) -> String {
    if max_width == 0 {
        return String::new();
    }
    if s.chars().count() <= max_width {
        return s.to_string();
    }
    let mut truncated: String = s.chars().take(max_width.saturating_sub(1)).collect();
    truncated.push('\u{2026}');
    truncated
}

/// Create a centered rectangle of the given width (columns) and height (rows).
pub fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let vertical = Layout::vertical([Constraint::Length(height)])
        .flex(Flex::Center)
        .split(area);
    Layout::horizontal([Constraint::Length(width)])
        .flex(Flex::Center)
        .split(vertical[0])[0]
}

/// Panes of the screen: tab bar, main area, chat column (when open), footer.
struct ScreenLayout {
    tabs: Rect,
    main: Rect,
    chat: Option<Rect>,
    footer: Rect,
}

fn screen_layout(screen: Rect, chat_open: bool) -> ScreenLayout {
    let [tabs, body, footer] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(5),
        Constraint::Length(1),
    ])
    .areas(screen);
    let (main, chat) = if chat_open {
        let [main, chat] =
            Layout::horizontal([Constraint::Min(30), Constraint::Length(CHAT_WIDTH)]).areas(body);
        (main, Some(chat))
    } else {
        (body, None)
    };
    ScreenLayout {
        tabs,
        main,
        chat,
        footer,
    }
}

/// Where a PDF tab draws the current page, borders included.
pub fn page_area(screen: Rect, chat_open: bool) -> Rect {
    let [page, _] = pdf::split(screen_layout(screen, chat_open).main);
    page
}

/// Draw the whole screen: tab bar, panes, footer, then any popup on top.
pub fn render(f: &mut Frame, app: &App) {
    let layout = screen_layout(f.area(), app.chat_open);

    tabs::render(f, layout.tabs, app);

    match app.active_document() {
        None => {
            let [side, list] =
                Layout::horizontal([Constraint::Length(SIDEBAR_WIDTH), Constraint::Min(20)])
                    .areas(layout.main);
            sidebar::render(f, side, app);
            papers::render(f, list, app);
        }
        Some((paper_id, pdf_path)) => pdf::render(f, layout.main, app, paper_id, &pdf_path),
    }
    if let Some(area) = layout.chat {
        chat::render(f, area, app);
    }

    render_footer(f, layout.footer, app);

    if let Some(form) = &app.form {
        form::render(f, app, form);
    }
    if let Some(editor) = &app.editor {
        editor::render(f, app, editor);
    }
    if let Some(target) = &app.confirm_delete {
        confirm::render(f, app, target);
    }
    if app.show_help {
        help::render(f, &app.theme);
    }
}

fn render_footer(f: &mut Frame, area: Rect, app: &App) {
    let theme = &app.theme;

    if app.input_mode == InputMode::TextInput
        && let Some(target) = app.text_target
    {
        let line = Line::from(vec![
            Span::styled(
                format!(" {}", target.prompt()),
                Style::default()
                    .fg(theme.active)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(&app.text_buffer, Style::default().fg(theme.text)),
            Span::styled("\u{2588}", Style::default().fg(theme.active)),
        ]);
        f.render_widget(Paragraph::new(line), area);
        return;
    }

    let line = match &app.status_message {
        Some(msg) => Line::from(Span::styled(
            format!(" {msg}"),
            Style::default().fg(theme.text),
        )),
        None => {
            let hints: &[(&str, &str)] = if app.active_document().is_some() {
                &[("n/p", "page"), ("h", "note"), ("d", "delete"), ("w", "close"), ("t", "chat"), ("?", "help")]
            } else {
                &[
                    ("Enter", "open"),
                    ("f", "fav"),
                    ("1-3", "status"),
                    ("c", "collections"),
                    ("a", "add"),
                    ("/", "search"),
                    ("?", "help"),
                ]
            };
            let mut spans = Vec::new();
            for (key, desc) in hints {
                spans.push(Span::styled(
                    format!(" {key}"),
                    Style::default()
                        .fg(theme.active)
                        .add_modifier(Modifier::BOLD),
                ));
                spans.push(Span::styled(format!(" {desc} "), theme.footer_style()));
            }
            Line::from(spans)
        }
    };
    f.render_widget(Paragraph::new(line).style(theme.footer_style()), area);
}
