//! Direct numeric entry on a single focused cell.

use crate::types::{CellPos, Hours};

/// Drop one leading zero from multi-digit text, parse (garbage reads as 0)
/// and clamp to `[0, max]`.
pub fn normalize_input(text: &str, max: Hours) -> Hours {
    let text = match text.strip_prefix('0') {
        Some(rest) if !rest.is_empty() => rest,
        _ => text,
    };
    text.parse::<Hours>().unwrap_or(0).clamp(0, max)
}

/// Text buffer of the cell being typed into. The first digit after focus
/// replaces the cell's text, later ones append.
#[derive(Debug, Clone, Default)]
pub struct CellEditor {
    target: Option<CellPos>,
    text: String,
}

impl CellEditor {
    /// Feed one digit typed on `pos` and return the value to commit.
    pub fn type_digit(&mut self, pos: &CellPos, digit: char, max: Hours) -> Hours {
        if self.target.as_ref() != Some(pos) {
            self.target = Some(pos.clone());
            self.text.clear();
        }
        self.text.push(digit);
        let value = normalize_input(&self.text, max);
        self.text = value.to_string();
        value
    }

    /// Next digit starts fresh text.
    pub fn reset(&mut self) {
        self.target = None;
        self.text.clear();
    }

    pub fn editing(&self) -> Option<&CellPos> {
        self.target.as_ref()
    }
}
