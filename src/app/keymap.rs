//! Key bindings of the calendar view.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::grid::GridCommand;
use crate::types::Direction;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyAction {
    Grid(GridCommand),
    /// Digit on the focused cell. Fills a multi-cell selection, otherwise
    /// goes to direct entry.
    Digit(char),
    Quit,
    Help,
    Back,
    PrevMonth,
    NextMonth,
    Today,
    Yearly,
    Fetch,
    Upload,
    Verify,
}

fn arrow(code: KeyCode) -> Option<Direction> {
    match code {
        KeyCode::Up => Some(Direction::Up),
        KeyCode::Down | KeyCode::Enter => Some(Direction::Down),
        KeyCode::Left => Some(Direction::Left),
        KeyCode::Right => Some(Direction::Right),
        _ => None,
    }
}

pub fn map_key(key: KeyEvent) -> Option<KeyAction> {
    let shift = key.modifiers.contains(KeyModifiers::SHIFT);

    if key.modifiers.contains(KeyModifiers::CONTROL) {
        let command = match key.code {
            KeyCode::Char('c') => GridCommand::Copy,
            KeyCode::Char('v') => GridCommand::Paste,
            KeyCode::Char('z') if shift => GridCommand::Redo,
            KeyCode::Char('Z') => GridCommand::Redo,
            KeyCode::Char('z') => GridCommand::Undo,
            KeyCode::Char('y') => GridCommand::Redo,
            KeyCode::Char('a') => GridCommand::ToggleAbsence,
            _ => return None,
        };
        return Some(KeyAction::Grid(command));
    }

    if let Some(dir) = arrow(key.code) {
        let command = if shift {
            GridCommand::Extend(dir)
        } else {
            GridCommand::Navigate(dir)
        };
        return Some(KeyAction::Grid(command));
    }

    let action = match key.code {
        KeyCode::Char(c) if c.is_ascii_digit() => KeyAction::Digit(c),
        KeyCode::Delete | KeyCode::Backspace => KeyAction::Grid(GridCommand::Clear),
        KeyCode::Char('q') => KeyAction::Quit,
        KeyCode::Char('?') => KeyAction::Help,
        KeyCode::Esc => KeyAction::Back,
        KeyCode::Char('[') => KeyAction::PrevMonth,
        KeyCode::Char(']') => KeyAction::NextMonth,
        KeyCode::Char('t') => KeyAction::Today,
        KeyCode::Char('y') => KeyAction::Yearly,
        KeyCode::Char('s') => KeyAction::Fetch,
        KeyCode::Char('u') => KeyAction::Upload,
        KeyCode::Char('v') => KeyAction::Verify,
        _ => return None,
    };
    Some(action)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent::new(code, modifiers)
    }

    #[test]
    fn arrows_move_and_shift_extends() {
        assert_eq!(
            map_key(key(KeyCode::Left, KeyModifiers::NONE)),
            Some(KeyAction::Grid(GridCommand::Navigate(Direction::Left)))
        );
        assert_eq!(
            map_key(key(KeyCode::Down, KeyModifiers::SHIFT)),
            Some(KeyAction::Grid(GridCommand::Extend(Direction::Down)))
        );
        assert_eq!(
            map_key(key(KeyCode::Enter, KeyModifiers::NONE)),
            Some(KeyAction::Grid(GridCommand::Navigate(Direction::Down)))
        );
    }

    #[test]
    fn control_chords() {
        let ctrl = KeyModifiers::CONTROL;
        assert_eq!(
            map_key(key(KeyCode::Char('c'), ctrl)),
            Some(KeyAction::Grid(GridCommand::Copy))
        );
        assert_eq!(
            map_key(key(KeyCode::Char('z'), ctrl)),
            Some(KeyAction::Grid(GridCommand::Undo))
        );
        assert_eq!(
            map_key(key(KeyCode::Char('z'), ctrl | KeyModifiers::SHIFT)),
            Some(KeyAction::Grid(GridCommand::Redo))
        );
        assert_eq!(
            map_key(key(KeyCode::Char('a'), ctrl)),
            Some(KeyAction::Grid(GridCommand::ToggleAbsence))
        );
        assert_eq!(map_key(key(KeyCode::Char('q'), ctrl)), None);
    }

    #[test]
    fn plain_keys() {
        let none = KeyModifiers::NONE;
        assert_eq!(map_key(key(KeyCode::Char('7'), none)), Some(KeyAction::Digit('7')));
        assert_eq!(
            map_key(key(KeyCode::Backspace, none)),
            Some(KeyAction::Grid(GridCommand::Clear))
        );
        assert_eq!(map_key(key(KeyCode::Char('?'), KeyModifiers::SHIFT)), Some(KeyAction::Help));
        assert_eq!(map_key(key(KeyCode::Char(']'), none)), Some(KeyAction::NextMonth));
        assert_eq!(map_key(key(KeyCode::Char('x'), none)), None);
    }
}
