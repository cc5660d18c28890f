use sqlx::{sqlite::SqliteRow, FromRow, Row};

use crate::application::dto::meal_dto::MealDTO;

impl FromRow<'_, SqliteRow> for MealDTO {
    fn from_row(row: &SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(MealDTO {
            id: Some(row.try_get("id")?),
            slug: Some(row.try_get("slug")?),
            title: Some(row.try_get("title")?),
            image: Some(row.try_get("image")?),
            summary: Some(row.try_get("summary")?),
            instructions: Some(row.try_get("instructions")?),
            creator: Some(row.try_get("creator")?),
            creator_email: Some(row.try_get("creator_email")?),
        })
    }
}
