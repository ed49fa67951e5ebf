use std::{fs, path::PathBuf};

use gifmatch_domain::{AssetRepository, StorageError, UpdateError};
use log::debug;

/// Stores assets as files of a directory that is served under a base URL.
pub struct DirectoryAssets {
    root: PathBuf,
    base_url: String,
}

impl DirectoryAssets {
    pub fn new(root: impl Into<PathBuf>, base_url: &str) -> Self {
        Self {
            root: root.into(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    #[must_use]
    pub fn url(&self, name: &str) -> String {
        if self.base_url.is_empty() {
            name.to_string()
        } else {
            format!("{}/{name}", self.base_url)
        }
    }
}

impl AssetRepository for DirectoryAssets {
    async fn store_asset(&self, name: &str, content: &[u8]) -> Result<String, UpdateError> {
        if name.is_empty() || name == "." || name == ".." || name.contains(['/', '\\']) {
            return Err(UpdateError::Other(
                format!("invalid asset name: {name:?}").into(),
            ));
        }

        fs::create_dir_all(&self.root)
            .and_then(|()| fs::write(self.root.join(name), content))
            .map_err(|err| StorageError::Other(Box::new(err)))?;

        debug!("stored {} bytes as {name}", content.len());

        Ok(self.url(name))
    }
}
