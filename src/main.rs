mod app;
mod cli;
mod config;
mod db;
mod errors;
mod event;
mod grid;
mod holidays;
mod logging;
mod remote;
mod tui;
mod types;
mod ui;

use anyhow::Result;
use chrono::{Datelike, Local};
use clap::Parser;

use crate::config::Config;
use crate::remote::{PayrollClient, RemoteWorker};

/// Background worker for the payroll service, when credentials are configured.
fn start_remote(config: &Config) -> Option<RemoteWorker> {
    if !config.remote.has_credentials() {
        log::info!("No payroll credentials, running offline");
        return None;
    }
    let client = match PayrollClient::from_config(&config.remote) {
        Ok(client) => client,
        Err(e) => {
            log::error!("Payroll client unavailable: {e}");
            return None;
        }
    };
    let refresh_first = client.needs_refresh();
    match RemoteWorker::spawn(Box::new(client), refresh_first) {
        Ok(worker) => Some(worker),
        Err(e) => {
            log::error!("Could not start the remote worker: {e}");
            None
        }
    }
}

fn main() -> Result<()> {
    let cli_opts = cli::Cli::parse();
    let mut config = Config::load(cli_opts.config.as_deref())?;
    if let Some(db_path) = cli_opts.db {
        config.database = db_path;
    }
    if let Err(e) = logging::init(&config.logging) {
        eprintln!("Logging disabled: {e}");
    }

    if let Some(command) = cli_opts.command {
        return cli::run(command, &config, cli_opts.config.as_deref());
    }

    let store = db::init(&config.database)?;
    let projects = db::visible_projects(&db::load_projects(&store)?);
    let today = Local::now().date_naive();
    let grid = grid::Grid::open(Box::new(store), projects, today.year(), today.month())?;
    let holidays = holidays::HolidayDirectory::new(&config.holidays_dir);
    let mut app = app::App::new(grid, &config, Box::new(holidays), start_remote(&config));

    let mut terminal = tui::init()?;
    let result = event::run(&mut app, &mut terminal);

    tui::restore()?;

    result
}
