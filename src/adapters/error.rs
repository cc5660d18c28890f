use askama::Template;
use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use tracing::{error, warn};

use crate::{adapters::views::pages::ErrorPage, application::error::ApplicationError};

impl IntoResponse for ApplicationError {
    fn into_response(self) -> Response {
        let (status, heading, message) = match self {
            ApplicationError::NotFound => {
                warn!("Resource not found");
                (
                    StatusCode::NOT_FOUND,
                    "Not found",
                    "We could not find the requested page or meal.",
                )
            }
            ApplicationError::BadRequest(ref msg) => {
                warn!("Bad request: {}", msg);
                (
                    StatusCode::BAD_REQUEST,
                    "Bad request",
                    "The request could not be processed.",
                )
            }
            ApplicationError::PayloadTooLarge => {
                warn!("Upload too large");
                (
                    StatusCode::PAYLOAD_TOO_LARGE,
                    "Upload too large",
                    "The uploaded files are too large.",
                )
            }
            ApplicationError::InternalError(ref msg) => {
                error!("Internal server error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An error occurred!",
                    "Something went wrong. Please try again later.",
                )
            }
            ApplicationError::DatabaseError(ref msg) => {
                error!("Database error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An error occurred!",
                    "Something went wrong. Please try again later.",
                )
            }
        };

        match (ErrorPage { heading, message }).render() {
            Ok(body) => (status, Html(body)).into_response(),
            Err(e) => {
                error!("Failed to render error page: {}", e);
                (status, message).into_response()
            }
        }
    }
}
