use std::{fs, io, path::PathBuf};

use gifmatch_app::{Settings, SettingsError, SettingsRepository};

/// Settings kept in a JSON file. A missing file yields the default settings.
pub struct SettingsFile {
    path: PathBuf,
}

impl SettingsFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl SettingsRepository for SettingsFile {
    fn read_settings(&self) -> Result<Settings, SettingsError> {
        let settings: Settings = match fs::read_to_string(&self.path) {
            Ok(content) => serde_json::from_str(&content)?,
            Err(err) if err.kind() == io::ErrorKind::NotFound => Settings::default(),
            Err(err) => return Err(err.into()),
        };
        settings.match_policy()?;
        Ok(settings)
    }

    fn write_settings(&self, settings: &Settings) -> Result<(), SettingsError> {
        fs::write(&self.path, serde_json::to_string_pretty(settings)?)?;
        Ok(())
    }
}
