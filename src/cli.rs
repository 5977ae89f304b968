/// CLI argument parsing and command handling.
use std::path::{Path, PathBuf};

use anyhow::Result;
use chrono::{Datelike, Local, NaiveDate};
use clap::{Parser, Subcommand};

use crate::config::Config;
use crate::errors::AppError;
use crate::grid::Grid;
use crate::remote::{self, PayrollClient, RemoteError, RemoteService};
use crate::types::{AbsenceKind, Hours, project_label};
use crate::{db, grid};

#[derive(Parser)]
#[command(
    name = "timegrid",
    version,
    about = "Timegrid - A terminal timesheet grid mirrored against a payroll service"
)]
pub struct Cli {
    /// Config file (default: <config dir>/timegrid/timegrid.yaml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Database file, overrides the configured one
    #[arg(long, global = true)]
    pub db: Option<String>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Set the hours of one cell
    Set {
        /// Project id, `default` for the ordinary-hours project
        project: String,
        date: String,
        hours: Hours,
    },
    /// Print a month grid with sums
    Show {
        #[arg(long)]
        year: Option<i32>,
        #[arg(long)]
        month: Option<u32>,
    },
    /// Show or set the absence mark of a day
    Absence {
        date: String,
        /// sick, child-care, vacation, unpaid or none
        kind: Option<String>,
    },
    Projects {
        #[command(subcommand)]
        command: ProjectCommand,
    },
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
    /// Fetch a month of reports from the payroll service into the grid
    Sync {
        #[arg(long)]
        year: Option<i32>,
        #[arg(long)]
        month: Option<u32>,
    },
    /// Replace the remote reports of a day with the local hours
    Upload { date: String },
    /// Lock days remotely
    Verify {
        #[arg(required = true)]
        dates: Vec<String>,
    },
    /// Delete the remote reports of a day unless it is verified
    Drop { date: String },
    /// List remote reports between two dates
    Reports { start: String, end: Option<String> },
    /// List the organization's remote projects
    RemoteProjects,
}

#[derive(Subcommand, Debug)]
pub enum ProjectCommand {
    List,
    Add {
        id: String,
        name: String,
    },
    Archive {
        id: String,
        /// Bring an archived project back
        #[arg(long)]
        undo: bool,
    },
    Remove {
        id: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    Init,
    Show,
}

/// Execute a CLI command against the configured store.
pub fn run(command: Command, config: &Config, config_path: Option<&Path>) -> Result<()> {
    log::info!("CLI command {command:?}");
    match command {
        Command::Set {
            project,
            date,
            hours,
        } => handle_set(&project, &date, hours, config)?,
        Command::Show { year, month } => handle_show(year, month, config)?,
        Command::Absence { date, kind } => handle_absence(&date, kind, config)?,
        Command::Projects { command } => handle_projects(command, config)?,
        Command::Config {
            command: ConfigCommand::Init,
        } => {
            let path = Config::write_default(config_path)?;
            println!("Config file: {}", path.display());
        }
        Command::Config {
            command: ConfigCommand::Show,
        } => print!("{}", config.to_yaml()?),
        Command::Sync { year, month } => handle_sync(year, month, config)?,
        Command::Upload { date } => handle_upload(&date, config)?,
        Command::Verify { dates } => handle_verify(&dates, config)?,
        Command::Drop { date } => handle_drop(&date, config)?,
        Command::Reports { start, end } => handle_reports(&start, end.as_deref(), config)?,
        Command::RemoteProjects => handle_remote_projects(config)?,
    }
    Ok(())
}

pub fn parse_date(raw: &str) -> Result<NaiveDate, AppError> {
    if raw == "today" {
        return Ok(Local::now().date_naive());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| AppError::InvalidDate(raw.to_string()))
}

fn resolve_month(year: Option<i32>, month: Option<u32>) -> Result<(i32, u32), AppError> {
    let today = Local::now().date_naive();
    let month = month.unwrap_or(today.month());
    if !(1..=12).contains(&month) {
        return Err(AppError::InvalidMonth(month));
    }
    Ok((year.unwrap_or(today.year()), month))
}

fn open_grid(config: &Config, year: i32, month: u32, all_projects: bool) -> Result<Grid> {
    let store = db::init(&config.database)?;
    let projects = db::load_projects(&store)?;
    let rows = if all_projects {
        projects
    } else {
        db::visible_projects(&projects)
    };
    Ok(Grid::open(Box::new(store), rows, year, month)?)
}

fn handle_set(project: &str, date: &str, hours: Hours, config: &Config) -> Result<()> {
    let date = parse_date(date)?;
    if !(0..=config.max_hours).contains(&hours) {
        return Err(AppError::InvalidHours {
            value: hours,
            max: config.max_hours,
        }
        .into());
    }
    let mut grid = open_grid(config, date.year(), date.month(), true)?;
    let id = db::parse_project_id(project);
    grid::ensure_visible(grid.projects(), &id)?;
    grid.set_value(&id, date, hours)?;
    println!("{} {date} = {hours}", project_label(&id));
    Ok(())
}

/// Month grid as plain text: one row per project, a column-sum row, the total.
pub fn month_table(grid: &Grid) -> String {
    let days = grid.days();
    let row = |label: &str, cells: Vec<String>, sum: String| {
        let cells: String = cells.iter().map(|cell| format!("{cell:>3}")).collect();
        format!("{label:<20}{cells}{sum:>6}\n")
    };

    let mut out = row(
        &format!("{}-{:02}", grid.year(), grid.month()),
        days.iter().map(|date| date.day().to_string()).collect(),
        "Sum".to_string(),
    );

    let marked = match (days.first(), days.last()) {
        (Some(first), Some(last)) => !grid.absence_book().between(*first, *last).is_empty(),
        _ => false,
    };
    if marked {
        let marks = days
            .iter()
            .map(|date| {
                let mark = grid.absence_for(*date).map(AbsenceKind::symbol);
                mark.unwrap_or(".").to_string()
            })
            .collect();
        out.push_str(row("Absence", marks, String::new()).trim_end());
        out.push('\n');
    }

    for project in grid.projects() {
        let name: String = project.name.chars().take(19).collect();
        out.push_str(&row(
            &name,
            days.iter().map(|date| grid.get_value(&project.id, *date).to_string()).collect(),
            grid.row_sum(&project.id).to_string(),
        ));
    }

    out.push_str(&row(
        "Sum",
        days.iter().map(|date| grid.column_sum(*date).to_string()).collect(),
        grid.total_sum().to_string(),
    ));
    out
}

fn handle_show(year: Option<i32>, month: Option<u32>, config: &Config) -> Result<()> {
    let (year, month) = resolve_month(year, month)?;
    let grid = open_grid(config, year, month, false)?;
    print!("{}", month_table(&grid));
    Ok(())
}

fn handle_absence(date: &str, kind: Option<String>, config: &Config) -> Result<()> {
    let date = parse_date(date)?;
    let mut grid = open_grid(config, date.year(), date.month(), false)?;
    match kind.as_deref() {
        None => {
            let label = grid.absence_for(date).map(AbsenceKind::label).unwrap_or("none");
            println!("{date}: {label}");
        }
        Some("none") => {
            grid.set_absence(date, None)?;
            println!("{date}: none");
        }
        Some(raw) => {
            let kind = AbsenceKind::parse(raw).ok_or_else(|| AppError::InvalidAbsence(raw.into()))?;
            grid.set_absence(date, Some(kind))?;
            println!("{date}: {}", kind.label());
        }
    }
    Ok(())
}

fn handle_projects(command: ProjectCommand, config: &Config) -> Result<()> {
    let mut store = db::init(&config.database)?;
    let mut projects = db::load_projects(&store)?;
    match command {
        ProjectCommand::List => {
            for project in &projects {
                let archived = if project.archived { "  (archived)" } else { "" };
                println!("{:<38} {}{archived}", project_label(&project.id), project.name);
            }
            return Ok(());
        }
        ProjectCommand::Add { id, name } => db::add_project(&mut projects, &id, &name)?,
        ProjectCommand::Archive { id, undo } => db::set_archived(&mut projects, &id, !undo)?,
        ProjectCommand::Remove { id } => {
            let removed = db::remove_project(&mut projects, &id)?;
            println!("Removed '{}'", removed.name);
        }
    }
    db::save_projects(&projects, &mut store)?;
    Ok(())
}

/// Client with a usable access token.
fn connect(config: &Config) -> Result<PayrollClient> {
    if !config.remote.has_credentials() {
        return Err(RemoteError::NotAuthenticated.into());
    }
    let mut client = PayrollClient::from_config(&config.remote)?;
    client.ensure_token()?;
    Ok(client)
}

fn handle_sync(year: Option<i32>, month: Option<u32>, config: &Config) -> Result<()> {
    let (year, month) = resolve_month(year, month)?;
    let client = connect(config)?;
    let mut grid = open_grid(config, year, month, false)?;
    let (Some(start), Some(end)) = (grid.days().first().copied(), grid.days().last().copied())
    else {
        return Ok(());
    };

    let response = client.list_reports(start, end)?;
    let written = grid.apply_remote_reports(&response)?;

    let mut projects = db::load_projects(grid.store())?;
    let referenced = Grid::reported_projects(&response);
    let remote_projects = client.get_projects().unwrap_or_else(|e| {
        log::warn!("Could not fetch remote project names: {e}");
        Vec::new()
    });
    let added = db::append_missing(&mut projects, &referenced, &remote_projects);
    if added > 0 {
        db::save_projects(&projects, grid.store_mut())?;
    }

    let snapshot = remote::RemoteSnapshot::from_response(&response);
    println!(
        "Synced {year}-{month:02}: {written} cell(s), {} reported day(s), {} verified, {added} project(s) added",
        snapshot.reported.len(),
        snapshot.verified.len()
    );
    Ok(())
}

fn handle_upload(date: &str, config: &Config) -> Result<()> {
    let date = parse_date(date)?;
    let grid = open_grid(config, date.year(), date.month(), false)?;
    let items = grid.day_items(date);
    if items.is_empty() {
        println!("Nothing to upload on {date}, use `timegrid drop {date}` to clear reported hours");
        return Ok(());
    }
    let client = connect(config)?;
    let blocks = remote::replace_day(&client, date, &items)?;
    println!("Uploaded {date}: {blocks} block(s)");
    Ok(())
}

fn handle_verify(dates: &[String], config: &Config) -> Result<()> {
    let dates = dates
        .iter()
        .map(|d| parse_date(d))
        .collect::<Result<Vec<_>, _>>()?;
    let client = connect(config)?;
    client.verify_days(&dates)?;
    println!("Verified {} day(s)", dates.len());
    Ok(())
}

fn handle_drop(date: &str, config: &Config) -> Result<()> {
    let date = parse_date(date)?;
    let client = connect(config)?;
    let (deleted, skipped) = remote::drop_days(&client, date, date)?;
    for day in skipped {
        eprintln!("{day} is verified, can't drop");
    }
    if deleted.is_empty() {
        println!("Nothing to delete");
    } else {
        println!("Deleted {} report(s)", deleted.len());
    }
    Ok(())
}

fn handle_reports(start: &str, end: Option<&str>, config: &Config) -> Result<()> {
    let start = parse_date(start)?;
    let end = end.map(parse_date).transpose()?.unwrap_or(start);
    let client = connect(config)?;
    let listing = client.list_reports(start, end)?;
    for (date, day) in &listing {
        println!("{date}{}", if day.verified { "  verified" } else { "" });
        for report in &day.reports {
            let time = |s: &str| s.get(11..16).unwrap_or(s).to_string();
            println!(
                "  {}  {:<24} {} -> {}  {}",
                report.id,
                report.activity,
                time(&report.start_time),
                time(&report.end_time),
                project_label(&report.project_id)
            );
        }
    }
    Ok(())
}

fn handle_remote_projects(config: &Config) -> Result<()> {
    let client = connect(config)?;
    for project in client.get_projects()? {
        println!("{:<38} {}", project.id, project.name);
    }
    Ok(())
}
