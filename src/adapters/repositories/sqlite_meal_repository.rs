use std::path::Path;

use async_trait::async_trait;
use sqlx::{query, query_as, query_scalar, SqlitePool};
use tracing::info;

use crate::{
    application::{
        dto::meal_dto::MealDTO, error::ApplicationError,
        repositories::meal_repository::MealRepository,
    },
    domain::models::meal::Meal,
};

const SCHEMA: &str = r#"
    CREATE TABLE IF NOT EXISTS meals (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        slug TEXT NOT NULL UNIQUE,
        title TEXT NOT NULL,
        image TEXT NOT NULL,
        summary TEXT NOT NULL,
        instructions TEXT NOT NULL,
        creator TEXT NOT NULL,
        creator_email TEXT NOT NULL
    )
"#;

pub struct SqliteMealRepository {
    pool: SqlitePool,
}

impl SqliteMealRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn init_schema(&self) -> Result<(), ApplicationError> {
        query(SCHEMA)
            .execute(&self.pool)
            .await
            .map_err(|e| ApplicationError::DatabaseError(e.to_string()))?;
        Ok(())
    }

    /// Loads a JSON array of meals into an empty table. Returns how many were inserted.
    pub async fn seed_from_file(&self, path: &Path) -> Result<usize, ApplicationError> {
        if self.count().await? > 0 {
            info!("Meals table already populated, skipping seed");
            return Ok(0);
        }

        let raw = tokio::fs::read(path).await.map_err(|e| {
            ApplicationError::InternalError(format!(
                "Failed to read seed file {}: {}",
                path.display(),
                e
            ))
        })?;
        let meals: Vec<Meal> = serde_json::from_slice(&raw).map_err(|e| {
            ApplicationError::InternalError(format!("Invalid seed file {}: {}", path.display(), e))
        })?;

        let total = meals.len();
        for meal in meals {
            self.create_meal(MealDTO::from(meal)).await?;
        }
        info!("Seeded {} meals from {}", total, path.display());
        Ok(total)
    }
}

#[async_trait]
impl MealRepository for SqliteMealRepository {
    async fn get_all(&self) -> Result<Vec<Meal>, ApplicationError> {
        let query = "SELECT * FROM meals ORDER BY id";
        let meals: Vec<MealDTO> = query_as::<_, MealDTO>(query)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| ApplicationError::DatabaseError(e.to_string()))?;
        Ok(meals.into_iter().map(Meal::from).collect())
    }

    async fn get_by_slug(&self, slug: &str) -> Result<Meal, ApplicationError> {
        let query = "SELECT * FROM meals WHERE slug = ?";
        let meal: MealDTO = query_as::<_, MealDTO>(query)
            .bind(slug)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| match e {
                sqlx::Error::RowNotFound => ApplicationError::NotFound,
                e => ApplicationError::DatabaseError(e.to_string()),
            })?;
        Ok(meal.into())
    }

    async fn create_meal(&self, meal: MealDTO) -> Result<Meal, ApplicationError> {
        let mut meal = meal;
        meal.sanitize();
        let Some(slug) = meal.slug.as_deref() else {
            return Err(ApplicationError::BadRequest(
                "Meal is missing a slug".to_string(),
            ));
        };

        let query = r#"
            INSERT INTO meals (slug, title, image, summary, instructions, creator, creator_email)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            RETURNING *
        "#;
        let created: MealDTO = query_as::<_, MealDTO>(query)
            .bind(slug)
            .bind(meal.title.as_deref().unwrap_or_default())
            .bind(meal.image.as_deref().unwrap_or_default())
            .bind(meal.summary.as_deref().unwrap_or_default())
            .bind(meal.instructions.as_deref().unwrap_or_default())
            .bind(meal.creator.as_deref().unwrap_or_default())
            .bind(meal.creator_email.as_deref().unwrap_or_default())
            .fetch_one(&self.pool)
            .await
            .map_err(|e| ApplicationError::DatabaseError(e.to_string()))?;
        info!("Created meal {}", slug);
        Ok(created.into())
    }

    async fn slug_exists(&self, slug: &str) -> Result<bool, ApplicationError> {
        let query = "SELECT EXISTS(SELECT 1 FROM meals WHERE slug = ?)";
        let exists: i64 = query_scalar(query)
            .bind(slug)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| ApplicationError::DatabaseError(e.to_string()))?;
        Ok(exists != 0)
    }

    async fn count(&self) -> Result<u64, ApplicationError> {
        let query = "SELECT COUNT(*) FROM meals";
        let count: i64 = query_scalar(query)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| ApplicationError::DatabaseError(e.to_string()))?;
        Ok(count as u64)
    }
}
