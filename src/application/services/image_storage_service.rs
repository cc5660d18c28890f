use async_trait::async_trait;

use crate::{application::error::ApplicationError, domain::models::file::RawFile};

#[async_trait]
pub trait ImageStorageService: Send + Sync {
    /// Stores the image under a name derived from `slug` and returns its public path.
    async fn save(&self, slug: &str, image: &RawFile) -> Result<String, ApplicationError>;
    async fn delete(&self, public_path: &str) -> Result<(), ApplicationError>;
}
