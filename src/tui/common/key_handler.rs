use crate::tui::common::text_input::TextInput;
use crate::tui::table_ui::TuiTableState;
use crossterm::event::{KeyCode, KeyEvent};

/// Result of offering a key to the shared table handler
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyHandlerResult {
    Handled,
    NotHandled,
}

/// Navigation and colour keys every table view understands
pub fn handle_table_keys<T: TuiTableState>(app: &mut T, key_event: &KeyEvent) -> KeyHandlerResult {
    match key_event.code {
        KeyCode::Char('j') | KeyCode::Down => {
            app.next();
            KeyHandlerResult::Handled
        }
        KeyCode::Char('k') | KeyCode::Up => {
            app.previous();
            KeyHandlerResult::Handled
        }
        KeyCode::Char('C') => {
            app.next_color();
            KeyHandlerResult::Handled
        }
        _ => KeyHandlerResult::NotHandled,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputResult {
    Continue,
    Submit,
    Cancel,
}

/// Editing keys of an open text prompt
pub fn handle_input_keys(input: &mut TextInput, key_event: &KeyEvent) -> InputResult {
    match key_event.code {
        KeyCode::Enter => InputResult::Submit,
        KeyCode::Esc => InputResult::Cancel,
        KeyCode::Char(c) => {
            input.enter_char(c);
            InputResult::Continue
        }
        KeyCode::Backspace => {
            input.delete_char();
            InputResult::Continue
        }
        KeyCode::Left => {
            input.move_cursor_left();
            InputResult::Continue
        }
        KeyCode::Right => {
            input.move_cursor_right();
            InputResult::Continue
        }
        _ => InputResult::Continue,
    }
}

/// Answer to a yes/no prompt; `None` while the key means neither
#[must_use]
pub const fn confirm_answer(key_event: &KeyEvent) -> Option<bool> {
    match key_event.code {
        KeyCode::Char('y' | 'Y') | KeyCode::Enter => Some(true),
        KeyCode::Char('n' | 'N') | KeyCode::Esc => Some(false),
        _ => None,
    }
}
