use ratatui::crossterm::event::{
    Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};

use papershelf_core::ReadingStatus;

use crate::action::Action;
use crate::app::InputMode;

/// Map a crossterm terminal event to a TUI action, respecting input mode.
pub fn map_event(event: &Event, input_mode: &InputMode) -> Action {
    match event {
        Event::Key(key) if key.kind == KeyEventKind::Press => {
            // Ctrl+C always quits regardless of mode
            if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
                return Action::Quit;
            }

            match input_mode {
                InputMode::Normal => map_key_normal(key),
                InputMode::TextInput => map_key_text_input(key),
                InputMode::Form => map_key_form(key),
            }
        }
        Event::Mouse(mouse) => map_mouse(mouse),
        Event::Resize(w, h) => Action::Resize(*w, *h),
        _ => Action::None,
    }
}

fn map_mouse(mouse: &MouseEvent) -> Action {
    match mouse.kind {
        MouseEventKind::ScrollDown => Action::MoveDown,
        MouseEventKind::ScrollUp => Action::MoveUp,
        MouseEventKind::Down(MouseButton::Left) => Action::Click(mouse.column, mouse.row),
        _ => Action::None,
    }
}

fn map_key_normal(key: &KeyEvent) -> Action {
    match key.code {
        KeyCode::Char('q') => Action::Quit,
        KeyCode::Char('j') | KeyCode::Down => Action::MoveDown,
        KeyCode::Char('k') | KeyCode::Up => Action::MoveUp,
        KeyCode::Char('g') | KeyCode::Home => Action::GoTop,
        KeyCode::Char('G') | KeyCode::End => Action::GoBottom,
        KeyCode::Enter => Action::Select,
        KeyCode::Esc => Action::Back,
        KeyCode::Tab => Action::FocusNext,
        KeyCode::BackTab => Action::FocusPrev,
        KeyCode::Char(']') => Action::NextTab,
        KeyCode::Char('[') => Action::PrevTab,
        KeyCode::Char('w') => Action::CloseTab,
        KeyCode::Char('s') if key.modifiers.contains(KeyModifiers::CONTROL) => Action::SaveConfig,
        KeyCode::Char('s') => Action::CycleSort,
        KeyCode::Char('v') => Action::CycleViewMode,
        KeyCode::Char('f') => Action::ToggleFavourite,
        KeyCode::Char('F') => Action::ToggleFavouritesOnly,
        KeyCode::Char('1') => Action::SetStatus(ReadingStatus::Unread),
        KeyCode::Char('2') => Action::SetStatus(ReadingStatus::InProgress),
        KeyCode::Char('3') => Action::SetStatus(ReadingStatus::Completed),
        KeyCode::Char('d') | KeyCode::Char('x') | KeyCode::Delete => Action::Delete,
        KeyCode::Char('y') => Action::Confirm,
        KeyCode::Char('c') => Action::EditCollections,
        KeyCode::Char('C') => Action::NewCollection,
        KeyCode::Char(' ') => Action::ToggleItem,
        KeyCode::Char('/') => Action::StartSearch,
        KeyCode::Char('a') => Action::AddPaper,
        KeyCode::Char('r') => Action::Refresh,
        KeyCode::Char('n') | KeyCode::PageDown => Action::NextPage,
        KeyCode::Char('p') | KeyCode::PageUp => Action::PrevPage,
        KeyCode::Char('h') => Action::Highlight,
        KeyCode::Char('t') => Action::ToggleChat,
        KeyCode::Char('?') => Action::ToggleHelp,
        _ => Action::None,
    }
}

fn map_key_text_input(key: &KeyEvent) -> Action {
    match key.code {
        KeyCode::Esc => Action::Cancel,
        KeyCode::Enter => Action::Submit,
        KeyCode::Char(c) => Action::Input(c),
        KeyCode::Backspace => Action::Backspace,
        _ => Action::None,
    }
}

fn map_key_form(key: &KeyEvent) -> Action {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Esc => Action::Cancel,
        KeyCode::Char('e') if ctrl => Action::Extract,
        KeyCode::Char('s') if ctrl => Action::Submit,
        KeyCode::Enter => Action::Submit,
        KeyCode::Tab | KeyCode::Down => Action::NextField,
        KeyCode::BackTab | KeyCode::Up => Action::PrevField,
        KeyCode::Char(c) => Action::Input(c),
        KeyCode::Backspace => Action::Backspace,
        _ => Action::None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(code: KeyCode, modifiers: KeyModifiers) -> Event {
        Event::Key(KeyEvent::new(code, modifiers))
    }

    #[test]
    fn ctrl_c_quits_in_every_mode() {
        let ev = press(KeyCode::Char('c'), KeyModifiers::CONTROL);
        for mode in [InputMode::Normal, InputMode::TextInput, InputMode::Form] {
            assert_eq!(map_event(&ev, &mode), Action::Quit);
        }
    }

    #[test]
    fn letters_are_text_in_text_modes() {
        let ev = press(KeyCode::Char('q'), KeyModifiers::NONE);
        assert_eq!(map_event(&ev, &InputMode::Normal), Action::Quit);
        assert_eq!(map_event(&ev, &InputMode::TextInput), Action::Input('q'));
        assert_eq!(map_event(&ev, &InputMode::Form), Action::Input('q'));
    }

    #[test]
    fn number_keys_set_status() {
        let ev = press(KeyCode::Char('2'), KeyModifiers::NONE);
        assert_eq!(
            map_event(&ev, &InputMode::Normal),
            Action::SetStatus(ReadingStatus::InProgress)
        );
    }

    #[test]
    fn left_click_carries_position() {
        let ev = Event::Mouse(MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column: 12,
            row: 7,
            modifiers: KeyModifiers::NONE,
        });
        assert_eq!(map_event(&ev, &InputMode::Normal), Action::Click(12, 7));
    }

    #[test]
    fn form_shortcuts() {
        let ev = press(KeyCode::Char('e'), KeyModifiers::CONTROL);
        assert_eq!(map_event(&ev, &InputMode::Form), Action::Extract);
        let ev = press(KeyCode::Tab, KeyModifiers::NONE);
        assert_eq!(map_event(&ev, &InputMode::Form), Action::NextField);
    }
}
