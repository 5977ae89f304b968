use std::collections::BTreeSet;
use std::sync::mpsc;

use chrono::{Datelike, Local, NaiveDate};
use crossterm::event::{KeyCode, KeyEvent};

use crate::config::Config;
use crate::db;
use crate::grid::input::CellEditor;
use crate::grid::summary::{YearSummary, yearly_summary};
use crate::grid::{Grid, GridCommand};
use crate::holidays::{Holiday, HolidayProvider};
use crate::remote::{
    DayStatus, RemoteJob, RemoteOutcome, RemoteProject, RemoteSnapshot, RemoteWorker,
};
use crate::types::{ChangeSet, Hours, ProjectId};

use super::keymap::{KeyAction, map_key};
use super::{AppEvent, AppView, PointerEvent};

/// The top-level application state.
pub struct App {
    pub running: bool,
    pub view: AppView,
    view_history: Vec<AppView>,
    pub grid: Grid,
    pub status: Option<String>,
    /// Last remote listing of the displayed month.
    pub snapshot: RemoteSnapshot,
    /// Days edited locally since their last upload.
    pub dirty_days: BTreeSet<NaiveDate>,
    /// Holidays of the displayed year.
    pub holidays: Vec<Holiday>,
    pub yearly: Option<YearSummary>,
    /// Remote jobs submitted and not answered yet.
    pub pending: usize,
    max_hours: Hours,
    editor: CellEditor,
    holiday_source: Box<dyn HolidayProvider>,
    remote: Option<RemoteWorker>,
    remote_projects: Vec<RemoteProject>,
    commits: mpsc::Receiver<Vec<NaiveDate>>,
}

impl App {
    pub fn new(
        mut grid: Grid,
        config: &Config,
        holiday_source: Box<dyn HolidayProvider>,
        remote: Option<RemoteWorker>,
    ) -> Self {
        let (commit_tx, commits) = mpsc::channel();
        grid.set_commit_hook(Box::new(move |_: &ChangeSet, dates: &[NaiveDate]| {
            let _ = commit_tx.send(dates.to_vec());
        }));
        let holidays = holiday_source.holidays_for_year(grid.year());

        let mut app = Self {
            running: true,
            view: AppView::Calendar,
            view_history: Vec::new(),
            grid,
            status: None,
            snapshot: RemoteSnapshot::default(),
            dirty_days: BTreeSet::new(),
            holidays,
            yearly: None,
            pending: 0,
            max_hours: config.max_hours,
            editor: CellEditor::default(),
            holiday_source,
            remote,
            remote_projects: Vec::new(),
            commits,
        };

        if app.remote.is_some() {
            app.submit(RemoteJob::FetchProjects);
            app.fetch_month();
        }
        app
    }

    /// Central update function - process an event and mutate state.
    pub fn update(&mut self, event: AppEvent) {
        match event {
            AppEvent::Tick => self.poll_remote(),
            AppEvent::KeyPress(key) => self.handle_key(key),
            AppEvent::Pointer(pointer) => self.handle_pointer(pointer),
        }
        for dates in self.commits.try_iter() {
            self.dirty_days.extend(dates);
        }
    }

    pub fn has_remote(&self) -> bool {
        self.remote.is_some()
    }

    pub fn holiday_on(&self, date: NaiveDate) -> Option<&Holiday> {
        self.holidays.iter().find(|h| h.date == date)
    }

    pub fn day_status(&self, date: NaiveDate) -> DayStatus {
        self.snapshot.status(date, self.grid.column_sum(date))
    }

    /// Cell currently receiving typed digits, if any.
    pub fn editing(&self) -> Option<(&ProjectId, usize)> {
        self.editor.editing().map(|pos| (&pos.project, pos.col))
    }

    fn handle_key(&mut self, key: KeyEvent) {
        match self.view {
            AppView::Help => {
                if matches!(key.code, KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('?')) {
                    self.go_back();
                }
                return;
            }
            AppView::Yearly => {
                match key.code {
                    KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('y') => self.go_back(),
                    KeyCode::Char('[') => self.show_year(self.yearly_year() - 1),
                    KeyCode::Char(']') => self.show_year(self.yearly_year() + 1),
                    _ => {}
                }
                return;
            }
            AppView::Calendar => {}
        }

        let Some(action) = map_key(key) else {
            return;
        };
        if !matches!(action, KeyAction::Digit(_)) {
            self.editor.reset();
        }

        match action {
            KeyAction::Grid(command) => self.run_command(command),
            KeyAction::Digit(c) => self.type_digit(c),
            KeyAction::Quit => self.running = false,
            KeyAction::Help => self.navigate_to(AppView::Help),
            KeyAction::Back => self.status = None,
            KeyAction::PrevMonth => self.shift_month(-1),
            KeyAction::NextMonth => self.shift_month(1),
            KeyAction::Today => {
                let today = Local::now().date_naive();
                self.show_month(today.year(), today.month());
            }
            KeyAction::Yearly => {
                self.show_year(self.grid.year());
                self.navigate_to(AppView::Yearly);
            }
            KeyAction::Fetch => {
                if self.fetch_month() {
                    self.status = Some("Fetching reports...".into());
                }
            }
            KeyAction::Upload => self.upload_active_day(),
            KeyAction::Verify => self.verify_month(),
        }
    }

    fn handle_pointer(&mut self, pointer: PointerEvent) {
        if self.view != AppView::Calendar {
            return;
        }
        match pointer {
            PointerEvent::Down { pos, shift } => {
                self.editor.reset();
                if shift {
                    self.grid.focus(pos, true);
                } else {
                    self.grid.begin_drag(pos);
                }
            }
            PointerEvent::Drag(pos) => self.grid.drag_to(pos),
            PointerEvent::Up => self.grid.end_drag(),
        }
    }

    fn run_command(&mut self, command: GridCommand) {
        if let Err(e) = self.grid.execute(command) {
            log::error!("{command:?} failed: {e}");
            self.status = Some(format!("Error: {e}"));
        }
    }

    fn type_digit(&mut self, c: char) {
        if self.grid.is_multi_selected() {
            let digit = c.to_digit(10).map(Hours::from).unwrap_or(0);
            self.run_command(GridCommand::Digit(digit));
            return;
        }
        let Some(pos) = self.grid.active().cloned() else {
            return;
        };
        if let Some(date) = self.grid.active_date() {
            if self.snapshot.is_verified(date) {
                self.editor.reset();
                self.status = Some(format!("{date} is verified and locked"));
                return;
            }
        }
        let value = self.editor.type_digit(&pos, c, self.max_hours);
        if let Err(e) = self.grid.commit_input(&pos, value) {
            log::error!("Input on {pos:?} failed: {e}");
            self.status = Some(format!("Error: {e}"));
        }
    }

    fn shift_month(&mut self, delta: i32) {
        let index = self.grid.year() * 12 + self.grid.month() as i32 - 1 + delta;
        self.show_month(index.div_euclid(12), index.rem_euclid(12) as u32 + 1);
    }

    fn show_month(&mut self, year: i32, month: u32) {
        if year == self.grid.year() && month == self.grid.month() {
            return;
        }
        if year != self.grid.year() {
            self.holidays = self.holiday_source.holidays_for_year(year);
        }
        self.grid.set_month(year, month);
        self.snapshot = RemoteSnapshot::default();
        self.status = None;
        if self.remote.is_some() {
            self.fetch_month();
        }
    }

    fn yearly_year(&self) -> i32 {
        self.yearly
            .as_ref()
            .map(|summary| summary.year)
            .unwrap_or_else(|| self.grid.year())
    }

    fn show_year(&mut self, year: i32) {
        let holidays = self.holiday_source.holiday_dates(year);
        self.yearly = Some(yearly_summary(year, self.grid.values(), &holidays));
    }

    fn navigate_to(&mut self, view: AppView) {
        if self.view != view {
            self.view_history.push(self.view);
            self.view = view;
        }
    }

    fn go_back(&mut self) {
        self.view = self.view_history.pop().unwrap_or(AppView::Calendar);
    }

    // ---------------------------
    // Remote
    // ---------------------------

    /// Queue a job on the worker. False when nothing was sent.
    fn submit(&mut self, job: RemoteJob) -> bool {
        let Some(worker) = &self.remote else {
            self.status = Some("Remote service not configured".into());
            return false;
        };
        let label = job.label();
        if !worker.submit(job) {
            log::error!("Remote worker is gone, {label} dropped");
            self.status = Some(format!("Remote worker stopped, {label} not sent"));
            return false;
        }
        self.pending += 1;
        true
    }

    fn fetch_month(&mut self) -> bool {
        let (Some(start), Some(end)) = (
            self.grid.days().first().copied(),
            self.grid.days().last().copied(),
        ) else {
            return false;
        };
        self.submit(RemoteJob::FetchMonth { start, end })
    }

    fn upload_active_day(&mut self) {
        let Some(date) = self.grid.active_date() else {
            self.status = Some("Focus a day to upload".into());
            return;
        };
        if self.snapshot.is_verified(date) {
            self.status = Some(format!("{date} is verified and locked"));
            return;
        }
        let items = self.grid.day_items(date);
        let status = if !items.is_empty() {
            format!("Uploading {date}...")
        } else if self.snapshot.report_ids.contains_key(&date) {
            format!("Clearing reports on {date}...")
        } else {
            self.status = Some(format!("Nothing to upload for {date}"));
            return;
        };
        if self.submit(RemoteJob::UploadDay { date, items }) {
            self.status = Some(status);
        }
    }

    fn verify_month(&mut self) {
        let dates = self.snapshot.unverified_reported(self.grid.days());
        if dates.is_empty() {
            self.status = Some("No reported days left to verify".into());
            return;
        }
        let count = dates.len();
        if self.submit(RemoteJob::Verify { dates }) {
            self.status = Some(format!("Verifying {count} day(s)..."));
        }
    }

    fn poll_remote(&mut self) {
        let outcomes = match &self.remote {
            Some(worker) => worker.poll(),
            None => return,
        };
        for outcome in outcomes {
            self.handle_outcome(outcome);
        }
    }

    fn handle_outcome(&mut self, outcome: RemoteOutcome) {
        if outcome.answers_job() {
            self.pending = self.pending.saturating_sub(1);
        }
        match outcome {
            RemoteOutcome::Month { start, response } => {
                if self.grid.days().first() != Some(&start) {
                    log::debug!("Dropping listing for {start}, month changed");
                    return;
                }
                if let Err(e) = self.grid.apply_remote_reports(&response) {
                    log::error!("Merging remote reports failed: {e}");
                    self.status = Some(format!("Error: {e}"));
                    return;
                }
                self.snapshot = RemoteSnapshot::from_response(&response);
                self.adopt_projects(&Grid::reported_projects(&response));
                self.status = Some(format!(
                    "Fetched {} reported day(s), {} verified",
                    self.snapshot.reported.len(),
                    self.snapshot.verified.len()
                ));
            }
            RemoteOutcome::Uploaded { date, blocks } => {
                self.dirty_days.remove(&date);
                self.status = Some(format!("Uploaded {date} as {blocks} block(s)"));
                self.fetch_month();
            }
            RemoteOutcome::Verified { dates } => {
                self.status = Some(format!("Verified {} day(s)", dates.len()));
                self.fetch_month();
            }
            RemoteOutcome::Projects(projects) => {
                log::info!("Known remote projects: {}", projects.len());
                self.remote_projects = projects;
            }
            RemoteOutcome::Failed { job, error } => {
                self.status = Some(format!("Remote {job} failed: {error}"));
            }
        }
    }

    /// Add rows for projects the service reported hours on.
    fn adopt_projects(&mut self, referenced: &[ProjectId]) {
        let mut projects = match db::load_projects(self.grid.store()) {
            Ok(projects) => projects,
            Err(e) => {
                log::error!("Could not load projects: {e}");
                return;
            }
        };
        let added = db::append_missing(&mut projects, referenced, &self.remote_projects);
        if added == 0 {
            return;
        }
        if let Err(e) = db::save_projects(&projects, self.grid.store_mut()) {
            log::error!("Could not save projects: {e}");
            return;
        }
        log::info!("Added {added} project(s) from remote reports");
        self.grid.set_projects(db::visible_projects(&projects));
    }

    #[cfg(test)]
    fn settle(&mut self) {
        let outcome = self
            .remote
            .as_ref()
            .and_then(|worker| worker.wait(std::time::Duration::from_secs(5)));
        if let Some(outcome) = outcome {
            self.handle_outcome(outcome);
        }
    }
}

#[cfg(test)]
mod tests {
    use crossterm::event::KeyModifiers;

    use super::*;
    use crate::db::init_in_memory;
    use crate::remote::ReportDay;
    use crate::remote::fake::{FakeService, report};
    use crate::types::{CellPos, Project};

    struct NoHolidays;

    impl HolidayProvider for NoHolidays {
        fn holidays_for_year(&self, _year: i32) -> Vec<Holiday> {
            Vec::new()
        }
    }

    fn app_with(month: u32, remote: Option<RemoteWorker>) -> App {
        let mut store = init_in_memory();
        let projects = vec![Project::default_project(), Project::new("a", "Alpha")];
        db::save_projects(&projects, &mut store).unwrap();
        let grid = Grid::open(Box::new(store), projects, 2026, month).unwrap();
        App::new(grid, &Config::default(), Box::new(NoHolidays), remote)
    }

    fn press(app: &mut App, code: KeyCode) {
        app.update(AppEvent::KeyPress(KeyEvent::new(code, KeyModifiers::NONE)));
    }

    fn chord(app: &mut App, c: char) {
        app.update(AppEvent::KeyPress(KeyEvent::new(
            KeyCode::Char(c),
            KeyModifiers::CONTROL,
        )));
    }

    fn click(app: &mut App, project: ProjectId, col: usize) {
        app.update(AppEvent::Pointer(PointerEvent::Down {
            pos: CellPos::new(project, col),
            shift: false,
        }));
        app.update(AppEvent::Pointer(PointerEvent::Up));
    }

    fn day(app: &App, col: usize) -> NaiveDate {
        app.grid.days()[col]
    }

    #[test]
    fn typed_digits_build_a_clamped_value() {
        let mut app = app_with(3, None);
        click(&mut app, None, 0);
        press(&mut app, KeyCode::Char('1'));
        press(&mut app, KeyCode::Char('2'));
        press(&mut app, KeyCode::Char('3'));
        let first = day(&app, 0);
        assert_eq!(app.grid.get_value(&None, first), 12);
        assert!(app.dirty_days.contains(&first));

        chord(&mut app, 'z');
        assert_eq!(app.grid.get_value(&None, first), 1);
    }

    #[test]
    fn moving_away_restarts_the_text() {
        let mut app = app_with(3, None);
        click(&mut app, None, 0);
        press(&mut app, KeyCode::Char('4'));
        press(&mut app, KeyCode::Right);
        press(&mut app, KeyCode::Left);
        press(&mut app, KeyCode::Char('6'));
        assert_eq!(app.grid.get_value(&None, day(&app, 0)), 6);
    }

    #[test]
    fn digit_fills_a_dragged_range() {
        let mut app = app_with(3, None);
        app.update(AppEvent::Pointer(PointerEvent::Down {
            pos: CellPos::new(None, 0),
            shift: false,
        }));
        app.update(AppEvent::Pointer(PointerEvent::Drag(CellPos::new(
            Some("a".into()),
            1,
        ))));
        app.update(AppEvent::Pointer(PointerEvent::Up));
        press(&mut app, KeyCode::Char('5'));

        assert_eq!(app.grid.total_sum(), 20);
        assert_eq!(app.dirty_days.len(), 2);
    }

    #[test]
    fn verified_day_refuses_input() {
        let mut app = app_with(3, None);
        let first = day(&app, 0);
        app.snapshot.verified.insert(first);
        click(&mut app, None, 0);
        press(&mut app, KeyCode::Char('4'));
        assert_eq!(app.grid.get_value(&None, first), 0);
        assert!(app.status.as_deref().unwrap_or_default().contains("verified"));
    }

    #[test]
    fn month_keys_cross_the_year() {
        let mut app = app_with(12, None);
        press(&mut app, KeyCode::Char(']'));
        assert_eq!((app.grid.year(), app.grid.month()), (2027, 1));
        press(&mut app, KeyCode::Char('['));
        press(&mut app, KeyCode::Char('['));
        assert_eq!((app.grid.year(), app.grid.month()), (2026, 11));
    }

    #[test]
    fn views_stack_and_unwind() {
        let mut app = app_with(3, None);
        press(&mut app, KeyCode::Char('y'));
        assert_eq!(app.view, AppView::Yearly);
        assert_eq!(app.yearly.as_ref().map(|s| s.year), Some(2026));
        press(&mut app, KeyCode::Char(']'));
        assert_eq!(app.yearly.as_ref().map(|s| s.year), Some(2027));
        press(&mut app, KeyCode::Esc);
        assert_eq!(app.view, AppView::Calendar);

        press(&mut app, KeyCode::Char('?'));
        assert_eq!(app.view, AppView::Help);
        press(&mut app, KeyCode::Char('q'));
        assert_eq!(app.view, AppView::Calendar);
        assert!(app.running);
        press(&mut app, KeyCode::Char('q'));
        assert!(!app.running);
    }

    #[test]
    fn remote_keys_need_a_service() {
        let mut app = app_with(3, None);
        press(&mut app, KeyCode::Char('s'));
        assert_eq!(app.status.as_deref(), Some("Remote service not configured"));
        assert_eq!(app.pending, 0);
    }

    #[test]
    fn startup_fetch_merges_reports_and_projects() {
        let mut service = FakeService::default();
        service.projects = vec![RemoteProject { id: "b".into(), name: "Beta".into() }];
        service.listing.insert(
            "2026-03-02".into(),
            ReportDay {
                reports: vec![report("r1", Some("b"), 6.0)],
                worked_hours: 6.0,
                verified: true,
                ..ReportDay::default()
            },
        );
        let worker = RemoteWorker::spawn(Box::new(service), false).unwrap();
        let mut app = app_with(3, Some(worker));
        assert_eq!(app.pending, 2);

        app.settle();
        app.settle();
        assert_eq!(app.pending, 0);

        let date = NaiveDate::from_ymd_opt(2026, 3, 2).unwrap();
        assert_eq!(app.grid.get_value(&Some("b".into()), date), 6);
        assert!(app.grid.projects().iter().any(|p| p.name == "Beta"));
        assert_eq!(app.day_status(date), DayStatus::Verified);
    }

    #[test]
    fn upload_sends_the_day_and_refetches() {
        let service = FakeService::default();
        let calls = service.calls.clone();
        let worker = RemoteWorker::spawn(Box::new(service), false).unwrap();
        let mut app = app_with(3, Some(worker));
        app.settle();
        app.settle();

        click(&mut app, Some("a".into()), 1);
        press(&mut app, KeyCode::Char('7'));
        let date = day(&app, 1);
        assert!(app.dirty_days.contains(&date));

        press(&mut app, KeyCode::Char('u'));
        app.settle();
        assert!(!app.dirty_days.contains(&date));
        assert_eq!(app.pending, 1);
        app.settle();

        let calls = calls.lock().unwrap();
        assert_eq!(calls.reported.len(), 1);
        assert_eq!(calls.reported[0].0, date);
        assert_eq!(calls.reported[0].1[0].hours, 7);
    }

    #[test]
    fn upload_of_a_zeroed_day_clears_it_remotely() {
        let mut service = FakeService::default();
        service.listing.insert(
            "2026-03-02".into(),
            ReportDay {
                reports: vec![report("r1", Some("a"), 4.0)],
                worked_hours: 4.0,
                ..ReportDay::default()
            },
        );
        let calls = service.calls.clone();
        let worker = RemoteWorker::spawn(Box::new(service), false).unwrap();
        let mut app = app_with(3, Some(worker));
        app.settle();
        app.settle();

        click(&mut app, Some("a".into()), 1);
        press(&mut app, KeyCode::Delete);
        assert_eq!(app.day_status(day(&app, 1)), DayStatus::Mismatch);
        press(&mut app, KeyCode::Char('u'));
        app.settle();

        let calls = calls.lock().unwrap();
        assert!(calls.reported.is_empty());
        assert_eq!(calls.deleted, vec![vec!["r1".to_string()]]);
    }

    #[test]
    fn empty_unreported_day_is_not_uploaded() {
        let worker = RemoteWorker::spawn(Box::new(FakeService::default()), false).unwrap();
        let mut app = app_with(3, Some(worker));
        app.settle();
        app.settle();
        click(&mut app, None, 4);
        press(&mut app, KeyCode::Char('u'));
        assert_eq!(app.pending, 0);
        assert!(app.status.as_deref().unwrap_or_default().starts_with("Nothing to upload"));
    }

    #[test]
    fn failed_refresh_leaves_pending_jobs_counted() {
        let service = FakeService { fail: true, ..FakeService::default() };
        let worker = RemoteWorker::spawn(Box::new(service), true).unwrap();
        let mut app = app_with(3, Some(worker));
        assert_eq!(app.pending, 2);

        app.settle();
        let status = app.status.clone().unwrap_or_default();
        assert!(status.starts_with("Remote refresh failed"));
        assert_eq!(app.pending, 2);
        app.settle();
        app.settle();
        assert_eq!(app.pending, 0);
    }
}
