#![allow(dead_code)]
use assert_cmd::{Command, cargo_bin_cmd};
use std::fs;
use std::path::{Path, PathBuf};

pub fn timegrid() -> Command {
    cargo_bin_cmd!("timegrid")
}

/// Write a config under `dir` that keeps the database, holidays and log
/// file inside it. Returns the config path.
pub fn setup_config(dir: &Path) -> PathBuf {
    let path = dir.join("timegrid.yaml");
    let yaml = format!(
        "database: {}\nholidays_dir: {}\nlogging:\n  level: debug\n  file: {}\n",
        dir.join("timegrid.sqlite").display(),
        dir.join("holidays").display(),
        dir.join("timegrid.log").display(),
    );
    fs::write(&path, yaml).expect("write config");
    path
}

/// `timegrid --config <path> <args>`
pub fn run_with(config: &Path) -> Command {
    let mut cmd = timegrid();
    cmd.arg("--config").arg(config);
    cmd
}
