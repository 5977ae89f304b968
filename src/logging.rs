//! Log setup. The terminal UI owns stdout and stderr, so records go to a file.

use std::fs::{self, OpenOptions};
use std::path::Path;

use anyhow::Result;
use env_logger::{Builder, Env, Target};

use crate::config::LoggingConfig;

/// Initialise `env_logger` once. `RUST_LOG` wins over the configured level.
pub fn init(config: &LoggingConfig) -> Result<()> {
    let path = Path::new(&config.file);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let file = OpenOptions::new().create(true).append(true).open(path)?;

    Builder::from_env(Env::default().default_filter_or(config.level.as_str()))
        .target(Target::Pipe(Box::new(file)))
        .format_timestamp_millis()
        .try_init()?;

    log::info!("timegrid {} starting", env!("CARGO_PKG_VERSION"));
    Ok(())
}
