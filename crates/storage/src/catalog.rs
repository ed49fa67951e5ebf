use std::{fs, io, path::PathBuf};

use gifmatch_domain::{
    ExerciseID, ExerciseRecord, ExerciseRepository, Name, NameError, ReadError, StorageError,
    UpdateError,
};
use log::debug;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Exercise catalog kept in a JSON file containing an array of exercises.
pub struct JsonCatalog {
    path: PathBuf,
}

impl JsonCatalog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn read_entries(&self) -> Result<Vec<ExerciseEntry>, Error> {
        let content = fs::read_to_string(&self.path)?;
        Ok(serde_json::from_str(&content)?)
    }

    fn write_entries(&self, entries: &[ExerciseEntry]) -> Result<(), Error> {
        fs::write(&self.path, serde_json::to_string_pretty(entries)?)?;
        Ok(())
    }
}

impl ExerciseRepository for JsonCatalog {
    async fn read_exercises(&self) -> Result<Vec<ExerciseRecord>, ReadError> {
        let exercises = self
            .read_entries()?
            .into_iter()
            .map(ExerciseRecord::try_from)
            .collect::<Result<Vec<_>, _>>()
            .map_err(Error::from)?;
        debug!(
            "read {} exercises from {}",
            exercises.len(),
            self.path.display()
        );
        Ok(exercises)
    }

    async fn update_gif_url(&self, id: ExerciseID, gif_url: String) -> Result<(), UpdateError> {
        let mut entries = self.read_entries()?;
        let entry = entries
            .iter_mut()
            .find(|e| ExerciseID::from(e.id) == id)
            .ok_or(UpdateError::NotFound)?;
        entry.gif_url = Some(gif_url);
        self.write_entries(&entries)?;
        Ok(())
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
struct ExerciseEntry {
    id: Uuid,
    name: String,
    #[serde(default)]
    muscle_group: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    gif_url: Option<String>,
}

impl TryFrom<ExerciseEntry> for ExerciseRecord {
    type Error = NameError;

    fn try_from(value: ExerciseEntry) -> Result<Self, Self::Error> {
        Ok(ExerciseRecord {
            id: value.id.into(),
            name: Name::new(&value.name)?,
            muscle_group: value.muscle_group,
            gif_url: value.gif_url,
        })
    }
}

#[derive(thiserror::Error, Debug)]
enum Error {
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error("invalid exercise name: {0}")]
    Name(#[from] NameError),
}

impl From<Error> for StorageError {
    fn from(value: Error) -> Self {
        StorageError::Other(Box::new(value))
    }
}

impl From<Error> for ReadError {
    fn from(value: Error) -> Self {
        ReadError::Storage(value.into())
    }
}

impl From<Error> for UpdateError {
    fn from(value: Error) -> Self {
        UpdateError::Storage(value.into())
    }
}
