//! The calendar grid engine: a project x day matrix of hour values with
//! selection, clipboard and undo on top.
//!
//! `Grid` owns the in-memory state for one displayed month and writes cell
//! values and absence marks through to the injected `KeyValueStore` after
//! every mutation.

pub mod absence;
mod clipboard;
mod commands;
pub mod coords;
mod history;
pub mod input;
mod selection;
pub mod summary;
pub mod values;

use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::db::KeyValueStore;
use crate::errors::{GridError, GridResult};
use crate::remote::{ReportItem, ReportKind, ReportResponse};
use crate::types::{
    AbsenceKind, CellPos, Change, ChangeSet, ColIndex, Direction, Hours, Project, ProjectId,
};

use absence::{ABSENCE_KEY, AbsenceBook, next_absence};
use clipboard::Clipboard;
use coords::{day_index_to_date, days_in_month, row_of};
use history::History;
use values::{CELLS_KEY, CellValues};

pub use commands::GridCommand;
pub use selection::SelectionState;

/// Called after every commit, undo and redo with the change-set and the
/// distinct dates it touched.
pub type CommitHook = Box<dyn FnMut(&ChangeSet, &[NaiveDate])>;

pub struct Grid {
    store: Box<dyn KeyValueStore>,
    values: CellValues,
    absence: AbsenceBook,
    projects: Vec<Project>,
    year: i32,
    month: u32,
    days: Vec<NaiveDate>,
    selection: selection::SelectionEngine,
    history: History,
    clipboard: Clipboard,
    on_commit: Option<CommitHook>,
}

fn load_json<T: DeserializeOwned + Default>(
    store: &dyn KeyValueStore,
    key: &str,
) -> GridResult<T> {
    match store.load(key)? {
        Some(raw) => Ok(serde_json::from_str(&raw)?),
        None => Ok(T::default()),
    }
}

fn save_json<T: Serialize>(store: &mut dyn KeyValueStore, key: &str, value: &T) -> GridResult<()> {
    let raw = serde_json::to_string(value)?;
    store.save(key, &raw)?;
    Ok(())
}

impl Grid {
    /// Load persisted values and marks and show `month` of `year`.
    pub fn open(
        store: Box<dyn KeyValueStore>,
        projects: Vec<Project>,
        year: i32,
        month: u32,
    ) -> GridResult<Self> {
        let values = load_json(store.as_ref(), CELLS_KEY)?;
        let absence = load_json(store.as_ref(), ABSENCE_KEY)?;
        Ok(Self {
            store,
            values,
            absence,
            projects,
            year,
            month,
            days: days_in_month(year, month),
            selection: selection::SelectionEngine::new(),
            history: History::new(),
            clipboard: Clipboard::default(),
            on_commit: None,
        })
    }

    pub fn set_commit_hook(&mut self, hook: CommitHook) {
        self.on_commit = Some(hook);
    }

    // ---------------------------
    // Layout
    // ---------------------------

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn days(&self) -> &[NaiveDate] {
        &self.days
    }

    pub fn projects(&self) -> &[Project] {
        &self.projects
    }

    /// Replace the visible rows. Selection and clipboard refer to rows by
    /// project and are dropped so nothing can point at a missing project.
    pub fn set_projects(&mut self, projects: Vec<Project>) {
        self.projects = projects;
        self.selection.clear();
        self.clipboard.clear();
    }

    /// Show another month. History holds month-relative columns, so it is
    /// reset; a selection survives only when its columns still exist.
    pub fn set_month(&mut self, year: i32, month: u32) {
        self.year = year;
        self.month = month;
        self.days = days_in_month(year, month);
        self.history.clear();
        self.selection.retain_columns(self.days.len());
        log::debug!("Grid now showing {year}-{month:02}");
    }

    // ---------------------------
    // Values and aggregates
    // ---------------------------

    pub fn get_value(&self, project: &ProjectId, date: NaiveDate) -> Hours {
        self.values.get(project, date)
    }

    /// Write one value outside undo history.
    pub fn set_value(
        &mut self,
        project: &ProjectId,
        date: NaiveDate,
        value: Hours,
    ) -> GridResult<()> {
        self.values.set(project, date, value);
        self.persist_values()
    }

    pub fn row_sum(&self, project: &ProjectId) -> Hours {
        self.values.row_sum(project, &self.days)
    }

    pub fn column_sum(&self, date: NaiveDate) -> Hours {
        self.values.column_sum(date, &self.projects)
    }

    pub fn total_sum(&self) -> Hours {
        self.values.total_sum(&self.projects, &self.days)
    }

    pub fn values(&self) -> &CellValues {
        &self.values
    }

    /// Bulk-set values from a remote report listing, outside undo history.
    pub fn apply_remote_reports(&mut self, response: &ReportResponse) -> GridResult<usize> {
        let written = self.values.merge_remote(response);
        self.persist_values()?;
        log::info!("Merged {} remote cells", written.len());
        Ok(written.len())
    }

    /// Project ids referenced by presence reports in `response`, in first-seen order.
    pub fn reported_projects(response: &ReportResponse) -> Vec<ProjectId> {
        let mut seen = Vec::new();
        for day in response.values() {
            for report in day.reports.iter().filter(|r| r.kind == ReportKind::Presence) {
                if !seen.contains(&report.project_id) {
                    seen.push(report.project_id.clone());
                }
            }
        }
        seen
    }

    /// Non-zero hours of `date` per visible project, in row order.
    pub fn day_items(&self, date: NaiveDate) -> Vec<ReportItem> {
        self.projects
            .iter()
            .map(|p| ReportItem {
                project_id: p.id.clone(),
                hours: self.values.get(&p.id, date),
            })
            .filter(|item| item.hours > 0)
            .collect()
    }

    // ---------------------------
    // Selection
    // ---------------------------

    pub fn active(&self) -> Option<&CellPos> {
        self.selection.active()
    }

    #[cfg(test)]
    pub fn selection(&self) -> Option<&crate::types::Selection> {
        self.selection.selection()
    }

    pub fn selection_state(&self) -> SelectionState {
        self.selection.state()
    }

    pub fn focus(&mut self, pos: CellPos, extend_held: bool) {
        self.selection.focus(pos, extend_held);
    }

    pub fn begin_drag(&mut self, pos: CellPos) {
        self.selection.begin_drag(pos);
    }

    pub fn drag_to(&mut self, pos: CellPos) {
        self.selection.drag_to(pos);
    }

    pub fn end_drag(&mut self) {
        self.selection.end_drag();
    }

    pub fn navigate(&mut self, dir: Direction) {
        self.selection.navigate(dir, &self.projects, self.days.len());
    }

    pub fn extend_selection(&mut self, dir: Direction) {
        self.selection.extend(dir, &self.projects, self.days.len());
    }

    pub fn is_selected(&self, project: &ProjectId, col: ColIndex) -> bool {
        self.selection.is_selected(&self.projects, project, col)
    }

    pub fn is_multi_selected(&self) -> bool {
        self.selection.is_multi_cell()
    }

    /// Date under the active cell.
    pub fn active_date(&self) -> Option<NaiveDate> {
        let active = self.selection.active()?;
        self.days.get(active.col).copied()
    }

    // ---------------------------
    // Change sets and history
    // ---------------------------

    /// Record `changes` as one undo step and apply their `next` values.
    /// An empty batch does nothing.
    pub fn record_and_apply(&mut self, changes: ChangeSet) -> GridResult<()> {
        if !self.history.record(changes.clone()) {
            return Ok(());
        }
        log::debug!("Committing {} cell change(s)", changes.len());
        self.apply(&changes, |change| change.next)
    }

    /// Restore the previous values of the most recent change-set.
    pub fn undo(&mut self) -> GridResult<bool> {
        let Some(changes) = self.history.undo().cloned() else {
            return Ok(false);
        };
        log::debug!("Undoing {} cell change(s)", changes.len());
        self.apply(&changes, |change| change.previous)?;
        Ok(true)
    }

    pub fn redo(&mut self) -> GridResult<bool> {
        let Some(changes) = self.history.redo().cloned() else {
            return Ok(false);
        };
        log::debug!("Redoing {} cell change(s)", changes.len());
        self.apply(&changes, |change| change.next)?;
        Ok(true)
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    fn apply(&mut self, changes: &ChangeSet, pick: impl Fn(&Change) -> Hours) -> GridResult<()> {
        let mut dates = BTreeSet::new();
        for change in changes {
            let date = day_index_to_date(&self.days, change.col)?;
            self.values.set(&change.project, date, pick(change));
            dates.insert(date);
        }
        self.persist_values()?;

        if let Some(hook) = self.on_commit.as_mut() {
            let dates: Vec<NaiveDate> = dates.into_iter().collect();
            hook(changes, &dates);
        }
        Ok(())
    }

    fn persist_values(&mut self) -> GridResult<()> {
        save_json(self.store.as_mut(), CELLS_KEY, &self.values)
    }

    /// One change per selected cell, row-major, each set to `next`.
    fn selection_changes(&self, next: Hours) -> ChangeSet {
        let Some(bounds) = self.selection.bounds(&self.projects) else {
            return Vec::new();
        };
        bounds
            .cells()
            .filter_map(|(row, col)| {
                let project = &self.projects[row].id;
                let date = *self.days.get(col)?;
                Some(Change {
                    project: project.clone(),
                    col,
                    previous: self.values.get(project, date),
                    next,
                })
            })
            .collect()
    }

    // ---------------------------
    // Bulk edits
    // ---------------------------

    /// Fill every selected cell with `digit`. Single-cell selections are
    /// edited through direct input instead, so they are left alone.
    pub fn fill_selection(&mut self, digit: Hours) -> GridResult<()> {
        if self.selection.active().is_none()
            || !self.is_multi_selected()
            || !(0..=9).contains(&digit)
        {
            return Ok(());
        }
        let changes = self.selection_changes(digit);
        self.record_and_apply(changes)
    }

    pub fn clear_selection_values(&mut self) -> GridResult<()> {
        let changes = self.selection_changes(0);
        self.record_and_apply(changes)
    }

    /// Commit a directly typed value on one cell. Unchanged values are not recorded.
    pub fn commit_input(&mut self, pos: &CellPos, value: Hours) -> GridResult<()> {
        let Some(date) = self.days.get(pos.col).copied() else {
            return Ok(());
        };
        if row_of(&self.projects, &pos.project).is_err() {
            return Ok(());
        }
        let previous = self.values.get(&pos.project, date);
        if previous == value {
            return Ok(());
        }
        self.record_and_apply(vec![Change {
            project: pos.project.clone(),
            col: pos.col,
            previous,
            next: value,
        }])
    }

    // ---------------------------
    // Clipboard
    // ---------------------------

    pub fn copy(&mut self) {
        let Some(bounds) = self.selection.bounds(&self.projects) else {
            return;
        };
        let (projects, days, values) = (&self.projects, &self.days, &self.values);
        self.clipboard.capture(bounds, |row, col| {
            days.get(col)
                .map(|date| values.get(&projects[row].id, *date))
                .unwrap_or(0)
        });
        log::debug!("Copied {}x{} block", bounds.rows(), bounds.cols());
    }

    pub fn clipboard_rows(&self) -> &[Vec<Hours>] {
        self.clipboard.rows()
    }

    /// Replay the clipboard anchored at the active cell, clipped to the grid.
    pub fn paste(&mut self) -> GridResult<()> {
        if self.clipboard.is_empty() {
            return Ok(());
        }
        let Some(active) = self.selection.active() else {
            return Ok(());
        };
        let Ok(row) = row_of(&self.projects, &active.project) else {
            return Ok(());
        };
        let changes: ChangeSet = self
            .clipboard
            .placements(row, active.col, self.projects.len(), self.days.len())
            .into_iter()
            .map(|(r, c, next)| {
                let project = self.projects[r].id.clone();
                let previous = self.values.get(&project, self.days[c]);
                Change {
                    project,
                    col: c,
                    previous,
                    next,
                }
            })
            .collect();
        self.record_and_apply(changes)
    }

    // ---------------------------
    // Absence
    // ---------------------------

    pub fn absence_for(&self, date: NaiveDate) -> Option<AbsenceKind> {
        self.absence.get(date)
    }

    pub fn set_absence(&mut self, date: NaiveDate, mark: Option<AbsenceKind>) -> GridResult<()> {
        self.absence.set(date, mark);
        save_json(self.store.as_mut(), ABSENCE_KEY, &self.absence)
    }

    pub fn absence_book(&self) -> &AbsenceBook {
        &self.absence
    }

    /// Advance the active day's mark one step and apply the result to every
    /// selected column.
    pub fn toggle_absence(&mut self) -> GridResult<()> {
        let Some(active) = self.selection.active() else {
            return Ok(());
        };
        let Some(active_date) = self.days.get(active.col).copied() else {
            return Ok(());
        };
        let mark = next_absence(self.absence.get(active_date));
        let (col_min, col_max) = match self.selection.bounds(&self.projects) {
            Some(bounds) => (bounds.col_min, bounds.col_max),
            None => (active.col, active.col),
        };
        for col in col_min..=col_max {
            let date = day_index_to_date(&self.days, col)?;
            self.absence.set(date, mark);
        }
        log::debug!(
            "Absence {} on columns {col_min}..={col_max}",
            mark.map(AbsenceKind::label).unwrap_or("cleared")
        );
        save_json(self.store.as_mut(), ABSENCE_KEY, &self.absence)
    }

    pub fn store(&self) -> &dyn KeyValueStore {
        self.store.as_ref()
    }

    pub fn store_mut(&mut self) -> &mut dyn KeyValueStore {
        self.store.as_mut()
    }
}

/// `UnknownProject` for an id that is not among the visible rows.
pub fn ensure_visible(projects: &[Project], id: &ProjectId) -> GridResult<()> {
    if projects.iter().any(|project| &project.id == id) {
        Ok(())
    } else {
        Err(GridError::UnknownProject(id.clone()))
    }
}
