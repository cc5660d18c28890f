use askama::Template;

use crate::{application::dto::meal_dto::MealDTO, domain::models::meal::Meal};

#[derive(Template)]
#[template(path = "home.html")]
pub struct HomePage;

#[derive(Template)]
#[template(path = "community.html")]
pub struct CommunityPage;

#[derive(Template)]
#[template(path = "meals.html")]
pub struct MealsPage {
    pub meals: Vec<Meal>,
}

#[derive(Template)]
#[template(path = "meal_detail.html")]
pub struct MealDetailPage<'a> {
    pub meal: &'a Meal,
    pub instructions: Vec<&'a str>,
}

impl<'a> MealDetailPage<'a> {
    pub fn new(meal: &'a Meal) -> Self {
        Self {
            meal,
            instructions: meal.instruction_lines(),
        }
    }
}

/// Text field values echoed back into the share form after a failed submit.
#[derive(Debug, Clone, Default)]
pub struct ShareFormValues {
    pub title: String,
    pub summary: String,
    pub instructions: String,
    pub creator: String,
    pub creator_email: String,
}

impl From<&MealDTO> for ShareFormValues {
    fn from(dto: &MealDTO) -> Self {
        Self {
            title: dto.title.clone().unwrap_or_default(),
            summary: dto.summary.clone().unwrap_or_default(),
            instructions: dto.instructions.clone().unwrap_or_default(),
            creator: dto.creator.clone().unwrap_or_default(),
            creator_email: dto.creator_email.clone().unwrap_or_default(),
        }
    }
}

#[derive(Template)]
#[template(path = "share.html")]
pub struct SharePage {
    pub image_input: String,
    pub form: ShareFormValues,
    pub errors: Vec<String>,
}

#[derive(Template)]
#[template(path = "error.html")]
pub struct ErrorPage<'a> {
    pub heading: &'a str,
    pub message: &'a str,
}
