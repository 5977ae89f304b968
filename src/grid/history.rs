//! Undo/redo stacks of change-sets.

use crate::types::ChangeSet;

#[derive(Debug, Default)]
pub struct History {
    undo_stack: Vec<ChangeSet>,
    redo_stack: Vec<ChangeSet>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a batch as one undoable step. Empty batches are dropped and
    /// leave the redo stack intact.
    pub fn record(&mut self, changes: ChangeSet) -> bool {
        if changes.is_empty() {
            return false;
        }
        self.undo_stack.push(changes);
        self.redo_stack.clear();
        true
    }

    /// Pop the last batch for undo; the caller restores each `previous`.
    pub fn undo(&mut self) -> Option<&ChangeSet> {
        let entry = self.undo_stack.pop()?;
        self.redo_stack.push(entry);
        self.redo_stack.last()
    }

    /// Pop from the redo stack; the caller re-applies each `next`.
    pub fn redo(&mut self) -> Option<&ChangeSet> {
        let entry = self.redo_stack.pop()?;
        self.undo_stack.push(entry);
        self.undo_stack.last()
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }
}
