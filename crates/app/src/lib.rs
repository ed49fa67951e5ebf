#![warn(clippy::pedantic)]

pub mod log;
pub mod settings;

pub use settings::{Settings, SettingsError, SettingsRepository};
