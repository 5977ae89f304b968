mod keymap;
mod state;

use crossterm::event::KeyEvent;

use crate::types::CellPos;

pub use state::App;

/// Possible input events the app reacts to.
pub enum AppEvent {
    Tick,
    KeyPress(KeyEvent),
    Pointer(PointerEvent),
}

/// Left-button mouse input, already resolved to grid cells.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PointerEvent {
    Down { pos: CellPos, shift: bool },
    Drag(CellPos),
    Up,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AppView {
    Calendar,
    Yearly,
    Help,
}
