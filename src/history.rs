// src/history.rs

use crate::session::Mode;
use chrono::{DateTime, Local, NaiveDate};
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/**
 * Daily append-only log of completed periods.
 */
#[derive(Debug, Clone)]
pub struct SessionLog {
    dir: PathBuf,
}

impl SessionLog {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn default_dir() -> PathBuf {
        dirs::data_local_dir()
            .map(|dir| dir.join("rest-reminder"))
            .unwrap_or_else(|| PathBuf::from("."))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, date: NaiveDate) -> PathBuf {
        self.dir
            .join(format!("session_log_{}.txt", date.format("%Y-%m-%d")))
    }

    pub fn record(&self, mode: Mode, at: DateTime<Local>) -> io::Result<()> {
        fs::create_dir_all(&self.dir)?;
        let mut file: fs::File = OpenOptions::new()
            .append(true)
            .create(true)
            .open(self.path_for(at.date_naive()))?;
        writeln!(
            file,
            "[{}] Finished {} session.",
            at.format("%Y-%m-%d %H:%M:%S"),
            mode
        )
    }

    pub fn read(&self, date: NaiveDate) -> io::Result<Vec<String>> {
        match fs::read_to_string(self.path_for(date)) {
            Ok(data) => Ok(data.lines().map(str::to_string).collect()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(e),
        }
    }
}
