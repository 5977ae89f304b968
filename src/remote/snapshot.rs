//! What the payroll service last said about the displayed month.

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;

use super::ReportResponse;
use crate::types::Hours;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DayStatus {
    Verified,
    Reported,
    /// Reported hours differ from the grid's column sum.
    Mismatch,
    Unreported,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RemoteSnapshot {
    pub reported: BTreeSet<NaiveDate>,
    pub verified: BTreeSet<NaiveDate>,
    pub worked_hours: BTreeMap<NaiveDate, f64>,
    pub report_ids: BTreeMap<NaiveDate, Vec<String>>,
}

impl RemoteSnapshot {
    pub fn from_response(response: &ReportResponse) -> Self {
        let mut snapshot = Self::default();
        for (raw, day) in response {
            let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") else {
                continue;
            };
            if day.reports.is_empty() {
                continue;
            }
            snapshot.reported.insert(date);
            if day.verified {
                snapshot.verified.insert(date);
            }
            snapshot.worked_hours.insert(date, day.worked_hours);
            snapshot
                .report_ids
                .insert(date, day.reports.iter().map(|r| r.id.clone()).collect());
        }
        snapshot
    }

    pub fn is_verified(&self, date: NaiveDate) -> bool {
        self.verified.contains(&date)
    }

    pub fn status(&self, date: NaiveDate, local_sum: Hours) -> DayStatus {
        if self.verified.contains(&date) {
            return DayStatus::Verified;
        }
        match self.worked_hours.get(&date) {
            Some(worked) if *worked != 0.0 && worked.round() as Hours != local_sum => {
                DayStatus::Mismatch
            }
            _ if self.reported.contains(&date) => DayStatus::Reported,
            _ => DayStatus::Unreported,
        }
    }

    /// Reported days in `days` that are not verified yet.
    pub fn unverified_reported(&self, days: &[NaiveDate]) -> Vec<NaiveDate> {
        days.iter()
            .copied()
            .filter(|d| self.reported.contains(d) && !self.verified.contains(d))
            .collect()
    }
}
