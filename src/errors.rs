//! Error types.
//! The grid engine reports `GridError`, storage reports `StoreError`, and the
//! CLI/terminal layers fold everything into `AppError`.

use std::io;
use thiserror::Error;

use crate::remote::RemoteError;
use crate::types::{Hours, ProjectId};

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Db(#[from] rusqlite::Error),
}

#[derive(Error, Debug)]
pub enum GridError {
    #[error("Unknown project: {}", crate::types::project_label(.0))]
    UnknownProject(ProjectId),

    #[error("Day index {index} out of range (month has {len} days)")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("Store failure: {0}")]
    Store(#[from] StoreError),

    #[error("Stored data could not be encoded: {0}")]
    Encoding(#[from] serde_json::Error),
}

pub type GridResult<T> = Result<T, GridError>;

#[derive(Error, Debug)]
pub enum AppError {
    // ---------------------------
    // IO
    // ---------------------------
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    // ---------------------------
    // Engine / remote
    // ---------------------------
    #[error("Grid error: {0}")]
    Grid(#[from] GridError),

    #[error("Remote service error: {0}")]
    Remote(#[from] RemoteError),

    // ---------------------------
    // Parsing errors
    // ---------------------------
    #[error("Invalid date: {0}")]
    InvalidDate(String),

    #[error("Invalid month: {0}")]
    InvalidMonth(u32),

    #[error("Invalid absence kind: {0}")]
    InvalidAbsence(String),

    #[error("Hours must be between 0 and {max}, got {value}")]
    InvalidHours { value: Hours, max: Hours },

    // ---------------------------
    // Config errors
    // ---------------------------
    #[error("Configuration error: {0}")]
    Config(#[from] serde_yaml::Error),

    #[error("Project error: {0}")]
    Project(String),
}

pub type AppResult<T> = Result<T, AppError>;
