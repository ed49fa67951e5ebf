use std::{path::PathBuf, time::Duration};

use gifmatch_domain::{MatchPolicy, MatchPolicyError, Pacing};
use log::LevelFilter;

#[allow(clippy::missing_errors_doc)]
pub trait SettingsRepository {
    fn read_settings(&self) -> Result<Settings, SettingsError>;
    fn write_settings(&self, settings: &Settings) -> Result<(), SettingsError>;
}

#[derive(thiserror::Error, Debug)]
pub enum SettingsError {
    #[error("invalid match policy: {0}")]
    Policy(#[from] MatchPolicyError),
    #[error("failed to access settings: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed settings: {0}")]
    Format(#[from] serde_json::Error),
}

#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    pub high_threshold: u8,
    pub medium_threshold: u8,
    pub muscle_group_boost: u8,
    pub min_similarity: u8,
    pub request_delay_secs: u64,
    pub rate_limit_delay_secs: u64,
    pub retry_delay_secs: u64,
    pub max_attempts: u32,
    pub catalog: PathBuf,
    pub asset_dir: PathBuf,
    pub asset_base_url: String,
    #[serde(with = "LevelFilterDef")]
    pub log_level: LevelFilter,
    pub log_file: Option<PathBuf>,
}

impl Settings {
    pub fn match_policy(&self) -> Result<MatchPolicy, SettingsError> {
        Ok(MatchPolicy::new(
            self.high_threshold,
            self.medium_threshold,
            self.muscle_group_boost,
            self.min_similarity,
        )?)
    }

    #[must_use]
    pub fn pacing(&self) -> Pacing {
        Pacing {
            request_delay: Duration::from_secs(self.request_delay_secs),
            rate_limit_delay: Duration::from_secs(self.rate_limit_delay_secs),
            retry_delay: Duration::from_secs(self.retry_delay_secs),
            max_attempts: self.max_attempts.max(1),
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            high_threshold: MatchPolicy::DEFAULT_HIGH_THRESHOLD,
            medium_threshold: MatchPolicy::DEFAULT_MEDIUM_THRESHOLD,
            muscle_group_boost: MatchPolicy::DEFAULT_MUSCLE_GROUP_BOOST,
            min_similarity: MatchPolicy::DEFAULT_MIN_SIMILARITY,
            request_delay_secs: Pacing::DEFAULT_REQUEST_DELAY.as_secs(),
            rate_limit_delay_secs: Pacing::DEFAULT_RATE_LIMIT_DELAY.as_secs(),
            retry_delay_secs: Pacing::DEFAULT_RETRY_DELAY.as_secs(),
            max_attempts: Pacing::DEFAULT_MAX_ATTEMPTS,
            catalog: PathBuf::from("exercises.json"),
            asset_dir: PathBuf::from("exercise-gifs"),
            asset_base_url: "exercise-gifs".to_string(),
            log_level: LevelFilter::Info,
            log_file: None,
        }
    }
}

#[derive(serde::Serialize, serde::Deserialize)]
#[serde(remote = "LevelFilter")]
enum LevelFilterDef {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}
