use crate::UpdateError;

#[allow(async_fn_in_trait)]
pub trait AssetRepository {
    /// Stores the content under the given name, replacing an existing asset,
    /// and returns its public URL.
    async fn store_asset(&self, name: &str, content: &[u8]) -> Result<String, UpdateError>;
}
