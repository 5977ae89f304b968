//! Active cell and rectangular selection.

use crate::grid::coords::{Bounds, normalize_range, row_of};
use crate::types::{CellPos, ColIndex, Direction, Project, ProjectId, Selection};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SelectionState {
    #[default]
    Idle,
    Focused,
    Dragging,
    Extended,
}

#[derive(Debug, Clone, Default)]
pub struct SelectionEngine {
    active: Option<CellPos>,
    selection: Option<Selection>,
    state: SelectionState,
}

/// Offset `row`/`col` by `dir`, or `None` when the step leaves the grid.
fn step(
    row: usize,
    col: ColIndex,
    dir: Direction,
    row_count: usize,
    col_count: usize,
) -> Option<(usize, ColIndex)> {
    let (dr, dc) = dir.delta();
    let row = row.checked_add_signed(dr)?;
    let col = col.checked_add_signed(dc)?;
    (row < row_count && col < col_count).then_some((row, col))
}

impl SelectionEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active(&self) -> Option<&CellPos> {
        self.active.as_ref()
    }

    #[cfg(test)]
    pub fn selection(&self) -> Option<&Selection> {
        self.selection.as_ref()
    }

    pub fn state(&self) -> SelectionState {
        self.state
    }

    pub fn focus(&mut self, pos: CellPos, extend_held: bool) {
        if !extend_held || self.selection.is_none() {
            self.selection = Some(Selection::single(pos.clone()));
            self.state = SelectionState::Focused;
        }
        self.active = Some(pos);
    }

    pub fn begin_drag(&mut self, pos: CellPos) {
        self.selection = Some(Selection::single(pos.clone()));
        self.active = Some(pos);
        self.state = SelectionState::Dragging;
    }

    pub fn drag_to(&mut self, pos: CellPos) {
        if self.state != SelectionState::Dragging {
            return;
        }
        if let Some(selection) = self.selection.as_mut() {
            selection.end = pos;
        }
    }

    pub fn end_drag(&mut self) {
        if self.state != SelectionState::Dragging {
            return;
        }
        self.state = if self.is_multi_cell() {
            SelectionState::Extended
        } else {
            SelectionState::Focused
        };
    }

    /// Move focus one cell and collapse the selection onto it.
    /// No-op without an active cell or at the grid edge.
    pub fn navigate(&mut self, dir: Direction, projects: &[Project], day_count: usize) {
        let Some(active) = self.active.as_ref() else {
            return;
        };
        let Ok(row) = row_of(projects, &active.project) else {
            return;
        };
        let Some((row, col)) = step(row, active.col, dir, projects.len(), day_count) else {
            return;
        };
        self.focus(CellPos::new(projects[row].id.clone(), col), false);
    }

    /// Move the selection end one cell, keeping the anchor. Focus follows the end.
    pub fn extend(&mut self, dir: Direction, projects: &[Project], day_count: usize) {
        let Some(selection) = self.selection.as_mut() else {
            return;
        };
        let Ok(row) = row_of(projects, &selection.end.project) else {
            return;
        };
        let Some((row, col)) = step(row, selection.end.col, dir, projects.len(), day_count)
        else {
            return;
        };
        let next = CellPos::new(projects[row].id.clone(), col);
        selection.end = next.clone();
        self.active = Some(next);
        self.state = SelectionState::Extended;
    }

    /// True iff the corners differ. Compared by identity, so this holds even
    /// while the project list is being swapped.
    pub fn is_multi_cell(&self) -> bool {
        self.selection
            .as_ref()
            .is_some_and(|selection| selection.start != selection.end)
    }

    pub fn is_selected(&self, projects: &[Project], project: &ProjectId, col: ColIndex) -> bool {
        self.selection.as_ref().is_some_and(|selection| {
            crate::grid::coords::is_within_selection(selection, projects, project, col)
        })
    }

    /// Normalized rectangle, or `None` with no selection or stale corners.
    pub fn bounds(&self, projects: &[Project]) -> Option<Bounds> {
        let selection = self.selection.as_ref()?;
        normalize_range(selection, projects).ok()
    }

    /// Drop selection and focus if any column is at or past `day_count`.
    pub fn retain_columns(&mut self, day_count: usize) {
        let stale = |pos: &CellPos| pos.col >= day_count;
        let selection_stale = self
            .selection
            .as_ref()
            .is_some_and(|selection| stale(&selection.start) || stale(&selection.end));
        if selection_stale || self.active.as_ref().is_some_and(stale) {
            self.clear();
        }
    }

    pub fn clear(&mut self) {
        self.active = None;
        self.selection = None;
        self.state = SelectionState::Idle;
    }
}
