use ratatui::style::{Color, Modifier, Style};

use papershelf_core::ReadingStatus;

/// Color theme for the TUI.
pub struct Theme {
    pub unread: Color,
    pub in_progress: Color,
    pub completed: Color,
    pub favourite: Color,
    pub highlight: Color,
    pub error: Color,

    pub header_fg: Color,
    pub header_bg: Color,
    pub border: Color,
    pub text: Color,
    pub dim: Color,
    pub highlight_bg: Color,
    pub active: Color,
    pub spinner: Color,
    pub footer_fg: Color,
    pub footer_bg: Color,
}

impl Theme {
    /// Hacker-green terminal theme.
    pub fn hacker() -> Self {
        Self {
            unread: Color::DarkGray,
            in_progress: Color::Yellow,
            completed: Color::Rgb(0, 210, 0),
            favourite: Color::Rgb(255, 215, 0),
            highlight: Color::Yellow,
            error: Color::Red,

            header_fg: Color::Black,
            header_bg: Color::Rgb(0, 210, 0),
            border: Color::DarkGray,
            text: Color::White,
            dim: Color::DarkGray,
            highlight_bg: Color::Rgb(30, 50, 30),
            active: Color::Cyan,
            spinner: Color::Cyan,
            footer_fg: Color::DarkGray,
            footer_bg: Color::Reset,
        }
    }

    /// Modern theme: white text, electric blue accents, dark blue header.
    pub fn modern() -> Self {
        Self {
            unread: Color::Rgb(120, 120, 140),
            in_progress: Color::Rgb(255, 200, 0),
            completed: Color::Rgb(0, 200, 80),
            favourite: Color::Rgb(255, 215, 0),
            highlight: Color::Rgb(255, 230, 80),
            error: Color::Rgb(255, 80, 80),

            header_fg: Color::White,
            header_bg: Color::Rgb(30, 60, 120),
            border: Color::Rgb(60, 60, 80),
            text: Color::White,
            dim: Color::Rgb(120, 120, 140),
            highlight_bg: Color::Rgb(30, 40, 80),
            active: Color::Rgb(60, 140, 255),
            spinner: Color::Rgb(60, 140, 255),
            footer_fg: Color::Rgb(120, 120, 140),
            footer_bg: Color::Reset,
        }
    }

    /// Theme by name; anything unknown falls back to `hacker`.
    pub fn by_name(name: &str) -> Self {
        match name {
            "modern" => Self::modern(),
            _ => Self::hacker(),
        }
    }

    pub fn status_color(&self, status: ReadingStatus) -> Color {
        match status {
            ReadingStatus::Unread => self.unread,
            ReadingStatus::InProgress => self.in_progress,
            ReadingStatus::Completed => self.completed,
        }
    }

    pub fn favourite_color(&self, favourite: bool) -> Color {
        if favourite { self.favourite } else { self.dim }
    }

    pub fn header_style(&self) -> Style {
        Style::default()
            .fg(self.header_fg)
            .bg(self.header_bg)
            .add_modifier(Modifier::BOLD)
    }

    pub fn highlight_style(&self) -> Style {
        Style::default()
            .bg(self.highlight_bg)
            .add_modifier(Modifier::BOLD)
    }

    pub fn border_style(&self) -> Style {
        Style::default().fg(self.border)
    }

    pub fn focused_border_style(&self) -> Style {
        Style::default().fg(self.active)
    }

    pub fn footer_style(&self) -> Style {
        Style::default().fg(self.footer_fg).bg(self.footer_bg)
    }
}
