//! Hour values keyed by (project, date).

use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::remote::{ReportKind, ReportResponse};
use crate::types::{Hours, Project, ProjectId};

pub const CELLS_KEY: &str = "cellValues";

/// `<project id or "null">_<YYYY-MM-DD>`
pub fn cell_key(project: &ProjectId, date: NaiveDate) -> String {
    format!(
        "{}_{}",
        project.as_deref().unwrap_or("null"),
        date.format("%Y-%m-%d")
    )
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CellValues {
    values: HashMap<String, Hours>,
}

impl CellValues {
    pub fn get(&self, project: &ProjectId, date: NaiveDate) -> Hours {
        self.values
            .get(&cell_key(project, date))
            .copied()
            .unwrap_or(0)
    }

    /// Upsert. Values are stored as given.
    pub fn set(&mut self, project: &ProjectId, date: NaiveDate, value: Hours) {
        self.values.insert(cell_key(project, date), value);
    }

    pub fn row_sum(&self, project: &ProjectId, days: &[NaiveDate]) -> Hours {
        days.iter().map(|date| self.get(project, *date)).sum()
    }

    pub fn column_sum(&self, date: NaiveDate, projects: &[Project]) -> Hours {
        projects
            .iter()
            .map(|project| self.get(&project.id, date))
            .sum()
    }

    pub fn total_sum(&self, projects: &[Project], days: &[NaiveDate]) -> Hours {
        projects
            .iter()
            .map(|project| self.row_sum(&project.id, days))
            .sum()
    }

    /// Hours logged on `date` across every project ever written, listed or not.
    pub fn day_total(&self, date: NaiveDate) -> Hours {
        let suffix = format!("_{}", date.format("%Y-%m-%d"));
        self.values
            .iter()
            .filter(|(key, _)| key.ends_with(&suffix))
            .map(|(_, value)| *value)
            .sum()
    }

    /// Bulk-set one value per (project, date) found in a remote report
    /// listing. Several presence reports for the same project and day are
    /// summed, not overwritten. Cells absent from the listing are untouched.
    /// Returns the cells that were written.
    pub fn merge_remote(&mut self, response: &ReportResponse) -> Vec<(ProjectId, NaiveDate)> {
        let mut sums: BTreeMap<(ProjectId, NaiveDate), f64> = BTreeMap::new();
        for (raw_date, day) in response {
            let Ok(date) = NaiveDate::parse_from_str(raw_date, "%Y-%m-%d") else {
                log::warn!("Skipping remote day with unparsable date '{raw_date}'");
                continue;
            };
            for report in &day.reports {
                if report.kind != ReportKind::Presence {
                    continue;
                }
                *sums.entry((report.project_id.clone(), date)).or_insert(0.0) +=
                    report.total_hours;
            }
        }

        let mut written = Vec::with_capacity(sums.len());
        for ((project, date), hours) in sums {
            self.set(&project, date, hours.round() as Hours);
            written.push((project, date));
        }
        written
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::remote::{Report, ReportDay};

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, day).unwrap()
    }

    fn a() -> ProjectId {
        Some("A".to_string())
    }

    fn b() -> ProjectId {
        Some("B".to_string())
    }

    fn report(project: &str, hours: f64, kind: ReportKind) -> Report {
        Report {
            id: format!("r-{project}-{hours}"),
            project_id: Some(project.to_string()),
            total_hours: hours,
            kind,
            ..Report::default()
        }
    }

    #[test]
    fn unset_cells_read_zero() {
        let values = CellValues::default();
        assert_eq!(values.get(&a(), d(1)), 0);
        assert_eq!(values.get(&None, d(1)), 0);
    }

    #[test]
    fn set_overwrites_and_keeps_out_of_range_values() {
        let mut values = CellValues::default();
        values.set(&a(), d(1), 4);
        values.set(&a(), d(1), 15);
        assert_eq!(values.get(&a(), d(1)), 15);
        values.set(&a(), d(1), -3);
        assert_eq!(values.get(&a(), d(1)), -3);
    }

    #[test]
    fn default_project_key_uses_null() {
        assert_eq!(cell_key(&None, d(2)), "null_2026-03-02");
        assert_eq!(cell_key(&a(), d(12)), "A_2026-03-12");
    }

    #[test]
    fn sums_agree() {
        let projects = vec![Project::new("A", "a"), Project::new("B", "b")];
        let days = vec![d(1), d(2), d(3)];
        let mut values = CellValues::default();
        values.set(&a(), d(1), 4);
        values.set(&a(), d(2), 4);
        values.set(&b(), d(1), 8);

        assert_eq!(values.row_sum(&a(), &days), 8);
        assert_eq!(values.row_sum(&b(), &days), 8);
        assert_eq!(values.column_sum(d(1), &projects), 12);
        assert_eq!(values.total_sum(&projects, &days), 16);

        let by_rows: Hours = projects.iter().map(|p| values.row_sum(&p.id, &days)).sum();
        let by_cols: Hours = days.iter().map(|day| values.column_sum(*day, &projects)).sum();
        assert_eq!(by_rows, 16);
        assert_eq!(by_cols, 16);
    }

    #[test]
    fn merge_sums_same_day_same_project() {
        let mut response = ReportResponse::new();
        response.insert(
            "2026-03-02".to_string(),
            ReportDay {
                reports: vec![
                    report("A", 3.0, ReportKind::Presence),
                    report("A", 4.0, ReportKind::Presence),
                    report("B", 1.0, ReportKind::Presence),
                    report("B", 8.0, ReportKind::Absence),
                ],
                ..ReportDay::default()
            },
        );
        let mut values = CellValues::default();
        values.set(&a(), d(2), 1);
        values.set(&a(), d(3), 6);

        let written = values.merge_remote(&response);
        assert_eq!(values.get(&a(), d(2)), 7);
        assert_eq!(values.get(&b(), d(2)), 1);
        assert_eq!(values.get(&a(), d(3)), 6);
        assert_eq!(written.len(), 2);
    }

    #[test]
    fn serializes_as_flat_object() {
        let mut values = CellValues::default();
        values.set(&a(), d(1), 4);
        let raw = serde_json::to_string(&values).unwrap();
        assert_eq!(raw, r#"{"A_2026-03-01":4}"#);
        let back: CellValues = serde_json::from_str(&raw).unwrap();
        assert_eq!(back, values);
    }
}
