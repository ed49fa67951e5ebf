use derive_more::{AsRef, Deref, Display};

/// Display name of a catalog exercise.
///
/// Surrounding whitespace is removed and inner runs of whitespace are
/// collapsed, so names typed with stray spaces compare equal.
#[derive(AsRef, Deref, Debug, Display, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct Name(String);

impl Name {
    pub const MAX_CHARS: usize = 128;

    pub fn new(name: &str) -> Result<Self, NameError> {
        let name = name.split_whitespace().collect::<Vec<_>>().join(" ");

        match name.chars().count() {
            0 => Err(NameError::Empty),
            chars if chars > Self::MAX_CHARS => Err(NameError::TooLong(chars)),
            _ => Ok(Name(name)),
        }
    }
}

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum NameError {
    #[error("Name must not be empty")]
    Empty,
    #[error("Name must have at most {max} characters ({0} > {max})", max = Name::MAX_CHARS)]
    TooLong(usize),
}
