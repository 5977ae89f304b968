//! Rectangular value snapshot taken from a selection.

use crate::grid::coords::Bounds;
use crate::types::Hours;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Clipboard {
    rows: Vec<Vec<Hours>>,
}

impl Clipboard {
    /// Capture `bounds` in row-major order using `read(row, col)`.
    pub fn capture(&mut self, bounds: Bounds, mut read: impl FnMut(usize, usize) -> Hours) {
        self.rows = (bounds.row_min..=bounds.row_max)
            .map(|row| {
                (bounds.col_min..=bounds.col_max)
                    .map(|col| read(row, col))
                    .collect()
            })
            .collect();
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> &[Vec<Hours>] {
        &self.rows
    }

    /// `(row, col, value)` for every clipboard value landing inside a
    /// `row_count` x `col_count` grid when anchored at (`row`, `col`).
    /// Out-of-bounds targets are skipped.
    pub fn placements(
        &self,
        row: usize,
        col: usize,
        row_count: usize,
        col_count: usize,
    ) -> Vec<(usize, usize, Hours)> {
        let mut out = Vec::new();
        for (r_off, values) in self.rows.iter().enumerate() {
            for (c_off, value) in values.iter().enumerate() {
                let (r, c) = (row + r_off, col + c_off);
                if r < row_count && c < col_count {
                    out.push((r, c, *value));
                }
            }
        }
        out
    }

    pub fn clear(&mut self) {
        self.rows.clear();
    }
}
