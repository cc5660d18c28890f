use askama::Template;
use axum::response::Html;

use crate::application::error::ApplicationError;

pub mod file_input_surface;
pub mod pages;

pub fn render_page<T: Template>(page: &T) -> Result<Html<String>, ApplicationError> {
    Ok(Html(page.render()?))
}
