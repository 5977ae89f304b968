//! Local-only absence marks per day.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::types::AbsenceKind;

pub const ABSENCE_KEY: &str = "absence";

/// Marks are keyed by ISO date, `YYYY-MM-DD`.
pub fn date_key(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// sick -> child-care -> vacation -> unpaid -> none -> sick
pub fn next_absence(current: Option<AbsenceKind>) -> Option<AbsenceKind> {
    match current {
        None => Some(AbsenceKind::Sick),
        Some(AbsenceKind::Sick) => Some(AbsenceKind::ChildCare),
        Some(AbsenceKind::ChildCare) => Some(AbsenceKind::Vacation),
        Some(AbsenceKind::Vacation) => Some(AbsenceKind::Unpaid),
        Some(AbsenceKind::Unpaid) => None,
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AbsenceBook {
    marks: BTreeMap<String, AbsenceKind>,
}

impl AbsenceBook {
    pub fn get(&self, date: NaiveDate) -> Option<AbsenceKind> {
        self.marks.get(&date_key(date)).copied()
    }

    /// `None` removes the mark.
    pub fn set(&mut self, date: NaiveDate, mark: Option<AbsenceKind>) {
        match mark {
            Some(kind) => {
                self.marks.insert(date_key(date), kind);
            }
            None => {
                self.marks.remove(&date_key(date));
            }
        }
    }

    /// Marks in `[start, end]`, ordered by date.
    pub fn between(&self, start: NaiveDate, end: NaiveDate) -> Vec<(NaiveDate, AbsenceKind)> {
        self.marks
            .range(date_key(start)..=date_key(end))
            .filter_map(|(key, kind)| {
                NaiveDate::parse_from_str(key, "%Y-%m-%d")
                    .ok()
                    .map(|date| (date, *kind))
            })
            .collect()
    }
}
