use anyhow::{Context, Result};
use directories::ProjectDirs;
use std::path::PathBuf;

/// Overrides the platform data directory.
pub const DATA_DIR_ENV: &str = "THALI_DATA_DIR";

pub struct Config {
    pub data_dir: PathBuf,
    pub db_path: PathBuf,
    pub reminders_path: PathBuf,
}

impl Config {
    pub fn load() -> Result<Self> {
        let data_dir = match std::env::var_os(DATA_DIR_ENV) {
            Some(dir) if !dir.is_empty() => PathBuf::from(dir),
            _ => ProjectDirs::from("", "", "thali")
                .context("Could not determine home directory")?
                .data_dir()
                .to_path_buf(),
        };
        Self::from_data_dir(data_dir)
    }

    pub fn from_data_dir(data_dir: PathBuf) -> Result<Self> {
        std::fs::create_dir_all(&data_dir)
            .with_context(|| format!("Failed to create data directory: {}", data_dir.display()))?;

        Ok(Config {
            db_path: data_dir.join("thali.db"),
            reminders_path: data_dir.join("reminders.json"),
            data_dir,
        })
    }
}
