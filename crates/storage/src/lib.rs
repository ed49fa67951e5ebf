#![warn(clippy::pedantic)]

mod assets;
mod catalog;
pub mod log;
mod settings;
mod vision;

pub use assets::DirectoryAssets;
pub use catalog::JsonCatalog;
pub use settings::SettingsFile;
pub use vision::VisionReports;
