use std::{
    collections::VecDeque,
    sync::{Arc, Mutex},
};

use chrono::Local;
use log::{Level, LevelFilter, Metadata, Record, SetLoggerError};
use serde::{Deserialize, Serialize};

pub static LOG: Mutex<Option<Arc<Mutex<dyn Repository>>>> = Mutex::new(None);

#[allow(clippy::missing_errors_doc)]
pub trait Repository: Send + Sync + 'static {
    fn read_entries(&self) -> Result<VecDeque<Entry>, Error>;
    fn write_entry(&self, entry: Entry) -> Result<(), Error>;
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("{0}")]
    Unknown(String),
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub time: String,
    #[serde(with = "LevelDef")]
    pub level: Level,
    pub message: String,
}

impl Entry {
    #[must_use]
    pub fn new(level: Level, message: String) -> Self {
        Self {
            time: Local::now().format("%b %d %H:%M:%S").to_string(),
            level,
            message,
        }
    }
}

#[derive(Serialize, Deserialize)]
#[serde(remote = "Level")]
pub enum LevelDef {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

static LOGGER: Logger = Logger;

/// Installs the logger. Entries are printed to stderr and, if a repository is
/// given, also written to it.
///
/// # Errors
///
/// Returns an error if the logger has already been initialized.
pub fn init(
    storage: Option<Arc<Mutex<dyn Repository>>>,
    level: LevelFilter,
) -> Result<(), SetLoggerError> {
    if let Ok(mut log) = LOG.lock() {
        *log = storage;
    }
    log::set_logger(&LOGGER).map(|()| log::set_max_level(level))
}

/// Most recent entries of the installed repository, newest first.
///
/// # Errors
///
/// Returns an error if no repository is installed or it cannot be read.
pub fn entries() -> Result<VecDeque<Entry>, Error> {
    let log = LOG
        .lock()
        .map_err(|err| Error::Unknown(err.to_string()))?;
    match log.as_ref() {
        Some(repository) => repository
            .lock()
            .map_err(|err| Error::Unknown(err.to_string()))?
            .read_entries(),
        None => Err(Error::Unknown("no log repository".to_string())),
    }
}

struct Logger;

impl log::Log for Logger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let entry = Entry::new(record.level(), record.args().to_string());

        eprintln!("{} {:<5} {}", entry.time, entry.level, entry.message);

        if let Ok(log) = LOG.lock() {
            if let Some(repository) = log.as_ref() {
                if let Ok(repository) = repository.lock() {
                    let _ = repository.write_entry(entry);
                }
            }
        }
    }

    fn flush(&self) {}
}
