//! Grid-level commands, one per keyboard binding of the calendar.

use crate::errors::GridResult;
use crate::types::{Direction, Hours};

use super::Grid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GridCommand {
    Navigate(Direction),
    Extend(Direction),
    /// Bulk fill of a multi-cell selection.
    Digit(Hours),
    Clear,
    Copy,
    Paste,
    Undo,
    Redo,
    ToggleAbsence,
}

impl Grid {
    /// Run one command to completion. Commands whose precondition is not met
    /// return `Ok(())` without touching anything.
    pub fn execute(&mut self, command: GridCommand) -> GridResult<()> {
        log::trace!("Grid command {command:?}");
        match command {
            GridCommand::Navigate(dir) => self.navigate(dir),
            GridCommand::Extend(dir) => self.extend_selection(dir),
            GridCommand::Digit(digit) => self.fill_selection(digit)?,
            GridCommand::Clear => self.clear_selection_values()?,
            GridCommand::Copy => self.copy(),
            GridCommand::Paste => self.paste()?,
            GridCommand::Undo => {
                self.undo()?;
            }
            GridCommand::Redo => {
                self.redo()?;
            }
            GridCommand::ToggleAbsence => self.toggle_absence()?,
        }
        Ok(())
    }
}
