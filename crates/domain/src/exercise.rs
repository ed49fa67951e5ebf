use derive_more::{Deref, Display};
use uuid::Uuid;

use crate::{Name, ReadError, UpdateError, normalize_exercise_name};

#[allow(async_fn_in_trait)]
pub trait ExerciseRepository {
    async fn read_exercises(&self) -> Result<Vec<ExerciseRecord>, ReadError>;
    async fn update_gif_url(&self, id: ExerciseID, gif_url: String) -> Result<(), UpdateError>;
}

/// Entry of the external exercise catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExerciseRecord {
    pub id: ExerciseID,
    pub name: Name,
    pub muscle_group: String,
    pub gif_url: Option<String>,
}

impl ExerciseRecord {
    #[must_use]
    pub fn has_muscle_group(&self, muscle_group: &str) -> bool {
        let muscle_group = normalize_exercise_name(muscle_group);
        !muscle_group.is_empty() && normalize_exercise_name(&self.muscle_group) == muscle_group
    }
}

#[derive(Deref, Debug, Display, Default, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct ExerciseID(Uuid);

impl ExerciseID {
    #[must_use]
    pub fn nil() -> Self {
        Self(Uuid::nil())
    }

    #[must_use]
    pub fn is_nil(&self) -> bool {
        self.0.is_nil()
    }
}

impl From<Uuid> for ExerciseID {
    fn from(value: Uuid) -> Self {
        Self(value)
    }
}

impl From<u128> for ExerciseID {
    fn from(value: u128) -> Self {
        Self(Uuid::from_bytes(value.to_be_bytes()))
    }
}

/// Catalog entries whose muscle group equals the given one after normalization.
#[must_use]
pub fn exercises_for_muscle_group<'a>(
    exercises: &'a [ExerciseRecord],
    muscle_group: &str,
) -> Vec<&'a ExerciseRecord> {
    exercises
        .iter()
        .filter(|e| e.has_muscle_group(muscle_group))
        .collect()
}
