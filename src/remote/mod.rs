//! Payroll service: wire types, the service contract, the blocking HTTP
//! client and the background worker that keeps it off the UI thread.

mod client;
mod snapshot;
mod timeline;
mod worker;

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::{Hours, ProjectId};

pub use client::PayrollClient;
pub use snapshot::{DayStatus, RemoteSnapshot};
pub use timeline::{LunchBreak, TimelineSettings};
pub use worker::{RemoteJob, RemoteOutcome, RemoteWorker};

#[derive(Error, Debug)]
pub enum RemoteError {
    #[error("Not authenticated: configure remote.refresh_token or remote.access_token")]
    NotAuthenticated,

    #[error("Network error: {0}")]
    Network(String),

    #[error("HTTP {0}: {1}")]
    Http(u16, String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

pub type RemoteResult<T> = Result<T, RemoteError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportKind {
    #[default]
    Presence,
    Absence,
    #[serde(other)]
    Other,
}

/// One report row as listed by the activities endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Report {
    pub id: String,
    pub project_id: ProjectId,
    pub activity: String,
    pub comment: String,
    pub date: String,
    pub start_time: String,
    pub end_time: String,
    pub hours: f64,
    pub minutes: f64,
    pub total_hours: f64,
    #[serde(rename = "type")]
    pub kind: ReportKind,
    pub time_code: String,
    pub verified: bool,
    pub attested: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ReportDay {
    pub reports: Vec<Report>,
    pub absence_hours: f64,
    pub worked_hours: f64,
    pub verified: bool,
}

/// `YYYY-MM-DD` -> the day's reports.
pub type ReportResponse = BTreeMap<String, ReportDay>;

/// Hours to report for one project on one day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportItem {
    pub project_id: ProjectId,
    pub hours: Hours,
}

/// Body item of the presence upload endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadItem {
    pub project_id: ProjectId,
    pub start_time: String,
    pub end_time: String,
    pub comment: String,
    pub time_code: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RemoteProject {
    pub id: String,
    pub name: String,
}

/// Contract of the payroll service as the rest of the crate sees it.
pub trait RemoteService: Send {
    /// Exchange the refresh token for an access token.
    fn refresh_access_token(&mut self) -> RemoteResult<()>;

    /// Reports for every day in `[start, end]`.
    fn list_reports(&self, start: NaiveDate, end: NaiveDate) -> RemoteResult<ReportResponse>;

    /// Lay `items` out on `date` and submit them as presence reports.
    fn report_hours(&self, date: NaiveDate, items: &[ReportItem]) -> RemoteResult<usize>;

    fn delete_reports(&self, ids: &[String]) -> RemoteResult<()>;

    fn verify_days(&self, dates: &[NaiveDate]) -> RemoteResult<()>;

    fn get_projects(&self) -> RemoteResult<Vec<RemoteProject>>;
}

/// Replace whatever is reported on `date` with `items`. The new timeline is
/// posted first and the previous report ids are deleted only once that
/// succeeded, so a failed post leaves the day as it was. An empty `items`
/// clears the day. Verified days are refused.
pub fn replace_day(
    service: &dyn RemoteService,
    date: NaiveDate,
    items: &[ReportItem],
) -> RemoteResult<usize> {
    let listing = service.list_reports(date, date)?;
    let key = date.format("%Y-%m-%d").to_string();
    let previous: Vec<String> = match listing.get(&key) {
        Some(day) if day.verified => {
            return Err(RemoteError::InvalidInput(format!("{key} is verified")));
        }
        Some(day) => day.reports.iter().map(|r| r.id.clone()).collect(),
        None => Vec::new(),
    };
    let blocks = if items.iter().any(|item| item.hours > 0) {
        service.report_hours(date, items)?
    } else {
        0
    };
    if !previous.is_empty() {
        log::info!("Replacing {} report(s) on {key}", previous.len());
        service.delete_reports(&previous)?;
    }
    Ok(blocks)
}

/// Delete every report in `[start, end]` on days that are not verified.
/// Returns (deleted ids, skipped verified dates).
pub fn drop_days(
    service: &dyn RemoteService,
    start: NaiveDate,
    end: NaiveDate,
) -> RemoteResult<(Vec<String>, Vec<String>)> {
    let listing = service.list_reports(start, end)?;
    let mut ids = Vec::new();
    let mut skipped = Vec::new();
    for (date, day) in &listing {
        if day.reports.is_empty() {
            continue;
        }
        if day.verified {
            skipped.push(date.clone());
            continue;
        }
        ids.extend(day.reports.iter().map(|r| r.id.clone()));
    }
    if !ids.is_empty() {
        service.delete_reports(&ids)?;
    }
    Ok((ids, skipped))
}

#[cfg(test)]
pub(crate) mod fake {
    //! In-memory service used by tests across the crate.

    use std::sync::{Arc, Mutex};

    use super::*;

    #[derive(Debug, Default)]
    pub struct Calls {
        pub deleted: Vec<Vec<String>>,
        pub reported: Vec<(NaiveDate, Vec<ReportItem>)>,
        pub verified: Vec<Vec<NaiveDate>>,
        pub refreshed: usize,
    }

    #[derive(Default, Clone)]
    pub struct FakeService {
        pub listing: ReportResponse,
        pub projects: Vec<RemoteProject>,
        pub calls: Arc<Mutex<Calls>>,
        pub fail: bool,
        /// Fail only the presence post.
        pub fail_post: bool,
    }

    impl FakeService {
        fn check(&self) -> RemoteResult<()> {
            if self.fail {
                Err(RemoteError::Http(500, "boom".into()))
            } else {
                Ok(())
            }
        }
    }

    impl RemoteService for FakeService {
        fn refresh_access_token(&mut self) -> RemoteResult<()> {
            self.calls.lock().unwrap().refreshed += 1;
            self.check()
        }

        fn list_reports(&self, start: NaiveDate, end: NaiveDate) -> RemoteResult<ReportResponse> {
            self.check()?;
            let (start, end) = (start.to_string(), end.to_string());
            Ok(self
                .listing
                .iter()
                .filter(|(date, _)| **date >= start && **date <= end)
                .map(|(date, day)| (date.clone(), day.clone()))
                .collect())
        }

        fn report_hours(&self, date: NaiveDate, items: &[ReportItem]) -> RemoteResult<usize> {
            self.check()?;
            if self.fail_post {
                return Err(RemoteError::Http(500, "post rejected".into()));
            }
            self.calls.lock().unwrap().reported.push((date, items.to_vec()));
            Ok(items.len())
        }

        fn delete_reports(&self, ids: &[String]) -> RemoteResult<()> {
            self.check()?;
            self.calls.lock().unwrap().deleted.push(ids.to_vec());
            Ok(())
        }

        fn verify_days(&self, dates: &[NaiveDate]) -> RemoteResult<()> {
            self.check()?;
            self.calls.lock().unwrap().verified.push(dates.to_vec());
            Ok(())
        }

        fn get_projects(&self) -> RemoteResult<Vec<RemoteProject>> {
            self.check()?;
            Ok(self.projects.clone())
        }
    }

    pub fn report(id: &str, project: Option<&str>, hours: f64) -> Report {
        Report {
            id: id.to_string(),
            project_id: project.map(str::to_string),
            total_hours: hours,
            ..Report::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::fake::{FakeService, report};
    use super::*;

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, day).unwrap()
    }

    #[test]
    fn parses_activities_listing() {
        let raw = r#"{
            "2026-03-02": {
                "reports": [{
                    "id": "r1",
                    "projectId": "p1",
                    "activity": "Dev",
                    "date": "2026-03-02",
                    "startTime": "2026-03-02T08:00:00.000",
                    "endTime": "2026-03-02T12:00:00.000",
                    "hours": 4,
                    "minutes": 0,
                    "totalHours": 4,
                    "type": "presence",
                    "timeCode": "normal",
                    "verified": false,
                    "errors": []
                }, {
                    "id": "r2",
                    "projectId": null,
                    "totalHours": 8,
                    "type": "sick-leave"
                }],
                "absenceHours": 0,
                "workedHours": 4,
                "verified": false
            },
            "2026-03-03": { "reports": [], "absenceHours": 0, "workedHours": 0, "verified": true }
        }"#;
        let listing: ReportResponse = serde_json::from_str(raw).unwrap();
        let day = &listing["2026-03-02"];
        assert_eq!(day.reports[0].project_id.as_deref(), Some("p1"));
        assert_eq!(day.reports[0].kind, ReportKind::Presence);
        assert_eq!(day.reports[1].kind, ReportKind::Other);
        assert_eq!(day.reports[1].project_id, None);
        assert_eq!(day.worked_hours, 4.0);
        assert!(listing["2026-03-03"].verified);
    }

    #[test]
    fn upload_item_serializes_camel_case() {
        let item = UploadItem {
            project_id: None,
            start_time: "2026-03-02T08:00:00.000".into(),
            end_time: "2026-03-02T12:00:00.000".into(),
            comment: String::new(),
            time_code: "normal".into(),
        };
        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["projectId"], serde_json::Value::Null);
        assert_eq!(json["timeCode"], "normal");
        assert_eq!(json["startTime"], "2026-03-02T08:00:00.000");
    }

    fn reported_day() -> FakeService {
        let mut service = FakeService::default();
        service.listing.insert(
            "2026-03-02".into(),
            ReportDay {
                reports: vec![report("r1", Some("p1"), 4.0), report("r2", None, 4.0)],
                ..ReportDay::default()
            },
        );
        service
    }

    #[test]
    fn replace_day_posts_then_deletes_previous() {
        let service = reported_day();
        let items = vec![ReportItem { project_id: Some("p1".into()), hours: 8 }];
        assert_eq!(replace_day(&service, date(2), &items).unwrap(), 1);

        let calls = service.calls.lock().unwrap();
        assert_eq!(calls.reported.len(), 1);
        assert_eq!(calls.deleted, vec![vec!["r1".to_string(), "r2".to_string()]]);
    }

    #[test]
    fn failed_post_keeps_previous_reports() {
        let service = FakeService { fail_post: true, ..reported_day() };
        let items = vec![ReportItem { project_id: None, hours: 8 }];
        let err = replace_day(&service, date(2), &items).unwrap_err();
        assert!(matches!(err, RemoteError::Http(500, _)));
        assert!(service.calls.lock().unwrap().deleted.is_empty());
    }

    #[test]
    fn empty_day_clears_previous_reports() {
        let service = reported_day();
        let items = vec![ReportItem { project_id: None, hours: 0 }];
        assert_eq!(replace_day(&service, date(2), &items).unwrap(), 0);

        let calls = service.calls.lock().unwrap();
        assert!(calls.reported.is_empty());
        assert_eq!(calls.deleted.len(), 1);
    }

    #[test]
    fn replace_day_refuses_verified_day() {
        let mut service = FakeService::default();
        service.listing.insert(
            "2026-03-02".into(),
            ReportDay { verified: true, ..ReportDay::default() },
        );
        let err = replace_day(&service, date(2), &[]).unwrap_err();
        assert!(matches!(err, RemoteError::InvalidInput(_)));
        assert!(service.calls.lock().unwrap().reported.is_empty());
    }

    #[test]
    fn drop_skips_verified_days() {
        let mut service = FakeService::default();
        service.listing.insert(
            "2026-03-02".into(),
            ReportDay { reports: vec![report("r1", None, 8.0)], ..ReportDay::default() },
        );
        service.listing.insert(
            "2026-03-03".into(),
            ReportDay {
                reports: vec![report("r2", None, 8.0)],
                verified: true,
                ..ReportDay::default()
            },
        );
        let (deleted, skipped) = drop_days(&service, date(1), date(31)).unwrap();
        assert_eq!(deleted, vec!["r1".to_string()]);
        assert_eq!(skipped, vec!["2026-03-03".to_string()]);
    }

    #[test]
    fn drop_with_nothing_to_delete_makes_no_call() {
        let service = FakeService::default();
        let (deleted, _) = drop_days(&service, date(1), date(31)).unwrap();
        assert!(deleted.is_empty());
        assert!(service.calls.lock().unwrap().deleted.is_empty());
    }
}
