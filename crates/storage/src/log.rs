use std::{collections::VecDeque, fs, io, path::PathBuf};

use gifmatch_app::log;

/// Log entries kept in a JSON file, newest first.
pub struct Log {
    path: PathBuf,
}

impl Log {
    pub const MAX_ENTRIES: usize = 100;

    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl log::Repository for Log {
    fn read_entries(&self) -> Result<VecDeque<log::Entry>, log::Error> {
        match fs::read_to_string(&self.path) {
            Ok(content) => serde_json::from_str(&content).map_err(|err| err.to_string()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(VecDeque::new()),
            Err(err) => Err(err.to_string()),
        }
        .map_err(log::Error::Unknown)
    }

    fn write_entry(&self, entry: log::Entry) -> Result<(), log::Error> {
        let mut entries = self.read_entries()?;
        entries.push_front(entry);
        entries.truncate(Self::MAX_ENTRIES);
        serde_json::to_string(&entries)
            .map_err(|err| err.to_string())
            .and_then(|content| fs::write(&self.path, content).map_err(|err| err.to_string()))
            .map_err(log::Error::Unknown)
    }
}

#[cfg(test)]
mod tests {
    use ::log::Level;
    use pretty_assertions::assert_eq;

    use super::*;
    use gifmatch_app::log::Repository;

    #[test]
    fn test_read_entries_missing_file() {
        let dir = tempfile::tempdir().unwrap();

        assert_eq!(
            Log::new(dir.path().join("log.json")).read_entries(),
            Ok(VecDeque::new())
        );
    }

    #[test]
    fn test_write_entry() {
        let dir = tempfile::tempdir().unwrap();
        let log = Log::new(dir.path().join("log.json"));

        for i in 0..105 {
            log.write_entry(log::Entry::new(Level::Info, format!("entry {i}")))
                .unwrap();
        }

        let entries = log.read_entries().unwrap();

        assert_eq!(entries.len(), Log::MAX_ENTRIES);
        assert_eq!(entries[0].message, "entry 104");
        assert_eq!(entries[99].message, "entry 5");
    }

    #[test]
    fn test_read_entries_malformed_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("log.json");
        fs::write(&path, "{").unwrap();

        assert!(Log::new(path).read_entries().is_err());
    }
}
