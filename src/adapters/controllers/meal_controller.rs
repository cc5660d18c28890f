use std::sync::Arc;

use axum::{
    extract::{Path, State},
    response::Html,
};
use tracing::info;

use crate::{
    adapters::views::{
        pages::{CommunityPage, HomePage, MealDetailPage, MealsPage},
        render_page,
    },
    application::{error::ApplicationError, repositories::meal_repository::MealRepository},
};

pub struct MealController;

impl MealController {
    pub async fn home() -> Result<Html<String>, ApplicationError> {
        render_page(&HomePage)
    }

    pub async fn community() -> Result<Html<String>, ApplicationError> {
        render_page(&CommunityPage)
    }

    pub async fn list_meals(
        State(meal_repo): State<Arc<dyn MealRepository>>,
    ) -> Result<Html<String>, ApplicationError> {
        let meals = meal_repo.get_all().await?;
        info!("Listing {} meals", meals.len());
        render_page(&MealsPage { meals })
    }

    pub async fn meal_detail(
        State(meal_repo): State<Arc<dyn MealRepository>>,
        Path(slug): Path<String>,
    ) -> Result<Html<String>, ApplicationError> {
        let meal = meal_repo.get_by_slug(&slug).await?;
        render_page(&MealDetailPage::new(&meal))
    }
}
