use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::errors::AppResult;
use crate::remote::{LunchBreak, TimelineSettings};
use crate::types::Hours;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_database")]
    pub database: String,
    /// Directory holding `<year>.json` holiday files.
    #[serde(default = "default_holidays_dir")]
    pub holidays_dir: String,
    /// Upper bound for directly typed cell values.
    #[serde(default = "default_max_hours")]
    pub max_hours: Hours,
    #[serde(default)]
    pub remote: RemoteConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteConfig {
    #[serde(default = "default_api_root")]
    pub api_root: String,
    #[serde(default)]
    pub client_id: String,
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub organization_id: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default = "default_day_start_hour")]
    pub day_start_hour: Hours,
    #[serde(default = "default_lunch")]
    pub lunch: Option<LunchBreak>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_file")]
    pub file: String,
}

fn app_dir(base: Option<PathBuf>) -> PathBuf {
    base.unwrap_or_else(|| PathBuf::from(".")).join("timegrid")
}

fn default_database() -> String {
    crate::db::default_db_path()
}
fn default_holidays_dir() -> String {
    app_dir(dirs::config_dir())
        .join("holidays")
        .to_string_lossy()
        .into_owned()
}
fn default_max_hours() -> Hours {
    12
}
fn default_api_root() -> String {
    "https://api.payzlip.se".to_string()
}
fn default_day_start_hour() -> Hours {
    8
}
fn default_lunch() -> Option<LunchBreak> {
    Some(LunchBreak::default())
}
fn default_log_level() -> String {
    "info".to_string()
}
fn default_log_file() -> String {
    app_dir(dirs::data_local_dir())
        .join("timegrid.log")
        .to_string_lossy()
        .into_owned()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database: default_database(),
            holidays_dir: default_holidays_dir(),
            max_hours: default_max_hours(),
            remote: RemoteConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            api_root: default_api_root(),
            client_id: String::new(),
            user_id: String::new(),
            organization_id: String::new(),
            refresh_token: None,
            access_token: None,
            day_start_hour: default_day_start_hour(),
            lunch: default_lunch(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: default_log_file(),
        }
    }
}

impl RemoteConfig {
    pub fn timeline(&self) -> TimelineSettings {
        TimelineSettings {
            day_start_hour: self.day_start_hour,
            lunch: self.lunch,
        }
    }

    /// Some token is present, so remote commands can be attempted.
    pub fn has_credentials(&self) -> bool {
        self.access_token.is_some() || self.refresh_token.is_some()
    }
}

impl Config {
    /// `<config dir>/timegrid/timegrid.yaml`
    pub fn config_file() -> PathBuf {
        app_dir(dirs::config_dir()).join("timegrid.yaml")
    }

    /// Load from `path` (or the standard location). A missing file yields defaults.
    pub fn load(path: Option<&Path>) -> AppResult<Self> {
        let path = path.map(Path::to_path_buf).unwrap_or_else(Self::config_file);
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(&path)?;
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(&content)?)
    }

    pub fn to_yaml(&self) -> AppResult<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Write the defaults to `path` (or the standard location), creating
    /// parent directories. Returns the written path.
    pub fn write_default(path: Option<&Path>) -> AppResult<PathBuf> {
        let path = path.map(Path::to_path_buf).unwrap_or_else(Self::config_file);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, Self::default().to_yaml()?)?;
        Ok(path)
    }
}
