//! Coordinate model: day sequences, project rows and selection rectangles.
//!
//! Selections store project ids, not row numbers. Every consumer resolves
//! rows against the current project list at read time, so reordering the
//! list never leaves a dangling index behind.

use chrono::{Datelike, NaiveDate};

use crate::errors::{GridError, GridResult};
use crate::types::{ColIndex, Project, ProjectId, Selection};

/// Every date of `month` (1-12) in `year`, in order. Empty for an invalid month.
pub fn days_in_month(year: i32, month: u32) -> Vec<NaiveDate> {
    let Some(first) = NaiveDate::from_ymd_opt(year, month, 1) else {
        return Vec::new();
    };
    first
        .iter_days()
        .take_while(|date| date.month() == month)
        .collect()
}

pub fn day_index_to_date(days: &[NaiveDate], index: ColIndex) -> GridResult<NaiveDate> {
    days.get(index).copied().ok_or(GridError::IndexOutOfRange {
        index,
        len: days.len(),
    })
}

pub fn row_of(projects: &[Project], id: &ProjectId) -> GridResult<usize> {
    projects
        .iter()
        .position(|project| &project.id == id)
        .ok_or_else(|| GridError::UnknownProject(id.clone()))
}

/// A normalized, inclusive rectangle in (row, column) space.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bounds {
    pub row_min: usize,
    pub row_max: usize,
    pub col_min: usize,
    pub col_max: usize,
}

impl Bounds {
    pub fn new(r1: usize, c1: usize, r2: usize, c2: usize) -> Self {
        Self {
            row_min: r1.min(r2),
            row_max: r1.max(r2),
            col_min: c1.min(c2),
            col_max: c1.max(c2),
        }
    }

    pub fn contains(&self, row: usize, col: usize) -> bool {
        row >= self.row_min && row <= self.row_max && col >= self.col_min && col <= self.col_max
    }

    pub fn rows(&self) -> usize {
        self.row_max - self.row_min + 1
    }

    pub fn cols(&self) -> usize {
        self.col_max - self.col_min + 1
    }

    /// Iterate over all cells in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = (usize, usize)> {
        let Bounds {
            row_min,
            row_max,
            col_min,
            col_max,
        } = *self;
        (row_min..=row_max).flat_map(move |r| (col_min..=col_max).map(move |c| (r, c)))
    }
}

pub fn normalize_range(selection: &Selection, projects: &[Project]) -> GridResult<Bounds> {
    let start_row = row_of(projects, &selection.start.project)?;
    let end_row = row_of(projects, &selection.end.project)?;
    Ok(Bounds::new(
        start_row,
        selection.start.col,
        end_row,
        selection.end.col,
    ))
}

/// False for a project that is not in the list.
pub fn is_within_selection(
    selection: &Selection,
    projects: &[Project],
    project: &ProjectId,
    col: ColIndex,
) -> bool {
    let Ok(bounds) = normalize_range(selection, projects) else {
        return false;
    };
    match row_of(projects, project) {
        Ok(row) => bounds.contains(row, col),
        Err(_) => false,
    }
}
