use crate::BoardResult;

use async_trait::async_trait;

/// Loads the board's customization script before any data is fetched.
#[async_trait]
pub trait CustomizationLoader: Send + Sync {
    async fn load(&self, url: &str) -> BoardResult<()>;
}

/// For hosts where hooks are compiled in and nothing needs loading.
pub struct NoCustomization;

#[async_trait]
impl CustomizationLoader for NoCustomization {
    async fn load(&self, _url: &str) -> BoardResult<()> {
        Ok(())
    }
}
