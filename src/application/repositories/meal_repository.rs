use async_trait::async_trait;

use crate::{
    application::{dto::meal_dto::MealDTO, error::ApplicationError},
    domain::models::meal::Meal,
};

#[async_trait]
pub trait MealRepository: Send + Sync {
    async fn get_all(&self) -> Result<Vec<Meal>, ApplicationError>;
    /// Fails with `ApplicationError::NotFound` when no meal carries `slug`.
    async fn get_by_slug(&self, slug: &str) -> Result<Meal, ApplicationError>;
    async fn create_meal(&self, meal: MealDTO) -> Result<Meal, ApplicationError>;
    async fn slug_exists(&self, slug: &str) -> Result<bool, ApplicationError>;
    async fn count(&self) -> Result<u64, ApplicationError>;
}
