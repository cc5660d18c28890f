use serde::{Deserialize, Serialize};

use crate::domain::models::meal::Meal;

/// Meal fields as submitted on the share form, before a slug and image exist.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MealDTO {
    #[serde(skip)]
    pub id: Option<i64>,
    #[serde(default)]
    pub slug: Option<String>,
    pub title: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    pub summary: Option<String>,
    pub instructions: Option<String>,
    pub creator: Option<String>,
    pub creator_email: Option<String>,
}

impl MealDTO {
    /// Trims every field and treats blank values as missing.
    pub fn sanitize(&mut self) {
        for field in [
            &mut self.slug,
            &mut self.title,
            &mut self.image,
            &mut self.summary,
            &mut self.instructions,
            &mut self.creator,
            &mut self.creator_email,
        ] {
            *field = field
                .take()
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty());
        }
    }

    /// Names of the text fields a visitor must fill in, in form order.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        [
            ("title", &self.title),
            ("summary", &self.summary),
            ("instructions", &self.instructions),
            ("creator", &self.creator),
            ("creator_email", &self.creator_email),
        ]
        .into_iter()
        .filter(|(_, value)| value.is_none())
        .map(|(name, _)| name)
        .collect()
    }

    pub fn has_valid_email(&self) -> bool {
        self.creator_email
            .as_deref()
            .and_then(|email| email.split_once('@'))
            .is_some_and(|(local, domain)| !local.is_empty() && domain.contains('.'))
    }
}

impl From<Meal> for MealDTO {
    fn from(value: Meal) -> Self {
        MealDTO {
            id: Some(value.id),
            slug: Some(value.slug),
            title: Some(value.title),
            image: Some(value.image),
            summary: Some(value.summary),
            instructions: Some(value.instructions),
            creator: Some(value.creator),
            creator_email: Some(value.creator_email),
        }
    }
}

impl From<MealDTO> for Meal {
    fn from(value: MealDTO) -> Self {
        Meal {
            id: value.id.unwrap_or(0),
            slug: value.slug.unwrap_or_default(),
            title: value.title.unwrap_or_default(),
            image: value.image.unwrap_or_default(),
            summary: value.summary.unwrap_or_default(),
            instructions: value.instructions.unwrap_or_default(),
            creator: value.creator.unwrap_or_default(),
            creator_email: value.creator_email.unwrap_or_default(),
        }
    }
}
