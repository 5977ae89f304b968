//! Background thread that owns the payroll client.
//!
//! The UI thread sends `RemoteJob`s and drains `RemoteOutcome`s on each tick;
//! it never blocks on the network. Jobs run one at a time in submission order.

use std::io;
use std::sync::mpsc;

use chrono::NaiveDate;

use super::{RemoteProject, RemoteService, ReportItem, ReportResponse, replace_day};

#[derive(Debug, Clone)]
pub enum RemoteJob {
    FetchMonth { start: NaiveDate, end: NaiveDate },
    UploadDay { date: NaiveDate, items: Vec<ReportItem> },
    Verify { dates: Vec<NaiveDate> },
    FetchProjects,
}

impl RemoteJob {
    pub fn label(&self) -> &'static str {
        match self {
            RemoteJob::FetchMonth { .. } => "fetch",
            RemoteJob::UploadDay { .. } => "upload",
            RemoteJob::Verify { .. } => "verify",
            RemoteJob::FetchProjects => "projects",
        }
    }
}

#[derive(Debug)]
pub enum RemoteOutcome {
    Month {
        start: NaiveDate,
        response: ReportResponse,
    },
    Uploaded {
        date: NaiveDate,
        blocks: usize,
    },
    Verified {
        dates: Vec<NaiveDate>,
    },
    Projects(Vec<RemoteProject>),
    Failed {
        job: &'static str,
        error: String,
    },
}

/// Job label of the token refresh the worker runs on its own at start.
const REFRESH: &str = "refresh";

impl RemoteOutcome {
    /// False for outcomes nobody submitted a job for.
    pub fn answers_job(&self) -> bool {
        !matches!(self, RemoteOutcome::Failed { job: REFRESH, .. })
    }
}

pub struct RemoteWorker {
    job_tx: mpsc::Sender<RemoteJob>,
    outcome_rx: mpsc::Receiver<RemoteOutcome>,
}

fn run_job(service: &dyn RemoteService, job: RemoteJob) -> RemoteOutcome {
    let label = job.label();
    let result = match job {
        RemoteJob::FetchMonth { start, end } => service
            .list_reports(start, end)
            .map(|response| RemoteOutcome::Month { start, response }),
        RemoteJob::UploadDay { date, items } => replace_day(service, date, &items)
            .map(|blocks| RemoteOutcome::Uploaded { date, blocks }),
        RemoteJob::Verify { dates } => service
            .verify_days(&dates)
            .map(|()| RemoteOutcome::Verified { dates }),
        RemoteJob::FetchProjects => service.get_projects().map(RemoteOutcome::Projects),
    };
    result.unwrap_or_else(|e| {
        log::error!("Remote {label} failed: {e}");
        RemoteOutcome::Failed {
            job: label,
            error: e.to_string(),
        }
    })
}

impl RemoteWorker {
    /// Start the worker thread. With `refresh_first`, the access token is
    /// refreshed once before the first job.
    pub fn spawn(mut service: Box<dyn RemoteService>, refresh_first: bool) -> io::Result<Self> {
        let (job_tx, job_rx) = mpsc::channel::<RemoteJob>();
        let (outcome_tx, outcome_rx) = mpsc::channel::<RemoteOutcome>();

        std::thread::Builder::new()
            .name("remote-worker".to_string())
            .spawn(move || {
                if refresh_first {
                    if let Err(e) = service.refresh_access_token() {
                        log::error!("Token refresh failed: {e}");
                        let _ = outcome_tx.send(RemoteOutcome::Failed {
                            job: REFRESH,
                            error: e.to_string(),
                        });
                    }
                }
                for job in job_rx {
                    log::debug!("Remote job {}", job.label());
                    if outcome_tx.send(run_job(service.as_ref(), job)).is_err() {
                        break;
                    }
                }
                log::debug!("Remote worker stopped");
            })?;

        Ok(Self { job_tx, outcome_rx })
    }

    /// Queue a job. False when the worker thread is gone.
    pub fn submit(&self, job: RemoteJob) -> bool {
        self.job_tx.send(job).is_ok()
    }

    /// Every outcome that has arrived so far.
    pub fn poll(&self) -> Vec<RemoteOutcome> {
        self.outcome_rx.try_iter().collect()
    }

    #[cfg(test)]
    pub fn wait(&self, timeout: std::time::Duration) -> Option<RemoteOutcome> {
        self.outcome_rx.recv_timeout(timeout).ok()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::remote::ReportDay;
    use crate::remote::fake::{FakeService, report};

    const TIMEOUT: Duration = Duration::from_secs(5);

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, day).unwrap()
    }

    #[test]
    fn fetch_runs_off_thread() {
        let mut service = FakeService::default();
        service.listing.insert(
            "2026-03-02".into(),
            ReportDay { reports: vec![report("r1", None, 8.0)], ..ReportDay::default() },
        );
        let worker = RemoteWorker::spawn(Box::new(service), false).unwrap();
        assert!(worker.submit(RemoteJob::FetchMonth { start: date(1), end: date(31) }));

        match worker.wait(TIMEOUT) {
            Some(RemoteOutcome::Month { start, response }) => {
                assert_eq!(start, date(1));
                assert_eq!(response.len(), 1);
            }
            other => panic!("unexpected outcome {other:?}"),
        }
    }

    #[test]
    fn jobs_complete_in_order() {
        let service = FakeService::default();
        let calls = service.calls.clone();
        let worker = RemoteWorker::spawn(Box::new(service), true).unwrap();
        worker.submit(RemoteJob::Verify { dates: vec![date(2)] });
        worker.submit(RemoteJob::FetchProjects);

        assert!(matches!(worker.wait(TIMEOUT), Some(RemoteOutcome::Verified { .. })));
        assert!(matches!(worker.wait(TIMEOUT), Some(RemoteOutcome::Projects(_))));
        let calls = calls.lock().unwrap();
        assert_eq!(calls.refreshed, 1);
        assert_eq!(calls.verified, vec![vec![date(2)]]);
    }

    #[test]
    fn failures_come_back_as_outcomes() {
        let service = FakeService { fail: true, ..FakeService::default() };
        let worker = RemoteWorker::spawn(Box::new(service), false).unwrap();
        worker.submit(RemoteJob::UploadDay { date: date(2), items: Vec::new() });
        match worker.wait(TIMEOUT) {
            Some(RemoteOutcome::Failed { job, error }) => {
                assert_eq!(job, "upload");
                assert!(error.contains("500"));
            }
            other => panic!("unexpected outcome {other:?}"),
        }
    }

    #[test]
    fn poll_is_non_blocking() {
        let worker = RemoteWorker::spawn(Box::new(FakeService::default()), false).unwrap();
        assert!(worker.poll().is_empty());
    }

    #[test]
    fn startup_refresh_failure_is_unrequested() {
        let service = FakeService { fail: true, ..FakeService::default() };
        let worker = RemoteWorker::spawn(Box::new(service), true).unwrap();
        let outcome = worker.wait(TIMEOUT).unwrap();
        assert!(matches!(outcome, RemoteOutcome::Failed { job: "refresh", .. }));
        assert!(!outcome.answers_job());
    }
}
