use std::sync::Arc;

use axum::extract::FromRef;

use crate::{
    adapters::share_sessions::ShareSessions,
    application::{repositories::meal_repository::MealRepository, services::ImageStorageService},
    domain::config::app::AppConfig,
    services::MemoryPreviewStore,
};

#[derive(Clone, FromRef)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub meal_repository: Arc<dyn MealRepository>,
    pub image_storage: Arc<dyn ImageStorageService>,
    pub previews: Arc<MemoryPreviewStore>,
    pub share_sessions: Arc<ShareSessions>,
}
