use std::sync::Arc;

use axum::{
    extract::{multipart::MultipartError, Multipart, Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    Extension, Form,
};
use tracing::{info, warn};

use crate::{
    adapters::{
        share_sessions::{ShareSessionId, ShareSessions},
        views::{
            file_input_surface::SurfaceEvent,
            pages::{ShareFormValues, SharePage},
            render_page,
        },
    },
    application::{
        dto::meal_dto::MealDTO, error::ApplicationError,
        repositories::meal_repository::MealRepository, services::ImageStorageService,
    },
    domain::models::{file::RawFile, meal::slugify},
};

const SHARE_PAGE: &str = "/meals/share";
const UPLOAD_FIELD: &str = "files";
const FALLBACK_MIME: &str = "application/octet-stream";

pub struct ShareController;

impl ShareController {
    /// GET /meals/share
    pub async fn share_page(
        State(sessions): State<Arc<ShareSessions>>,
        Extension(session): Extension<ShareSessionId>,
    ) -> Result<Response, ApplicationError> {
        let page = Self::page(&sessions, session, ShareFormValues::default(), Vec::new())?;
        Ok(page.into_response())
    }

    /// POST /meals/share/files
    pub async fn upload_files(
        State(sessions): State<Arc<ShareSessions>>,
        Extension(session): Extension<ShareSessionId>,
        mut multipart: Multipart,
    ) -> Result<Redirect, ApplicationError> {
        let mut candidates = Vec::new();
        while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
            if field.name() != Some(UPLOAD_FIELD) {
                continue;
            }
            let name = field.file_name().unwrap_or_default().to_string();
            let mime_type = field
                .content_type()
                .unwrap_or(FALLBACK_MIME)
                .to_string();
            let content = field.bytes().await.map_err(multipart_error)?;

            // An empty picker still submits one nameless, empty part.
            if name.is_empty() && content.is_empty() {
                continue;
            }
            candidates.push(RawFile::new(name, mime_type, content));
        }

        info!(
            "Share session {} submitted {} candidate files",
            session.0,
            candidates.len()
        );
        sessions.with_surface(session, |surface| {
            surface.dispatch(SurfaceEvent::Change(candidates));
        });
        Ok(Redirect::to(SHARE_PAGE))
    }

    /// POST /meals/share/files/{index}/remove
    pub async fn remove_file(
        State(sessions): State<Arc<ShareSessions>>,
        Extension(session): Extension<ShareSessionId>,
        Path(index): Path<usize>,
    ) -> Redirect {
        sessions.with_surface(session, |surface| {
            surface.dispatch(SurfaceEvent::Remove(index));
        });
        Redirect::to(SHARE_PAGE)
    }

    /// POST /meals/share
    pub async fn share_meal(
        State(sessions): State<Arc<ShareSessions>>,
        State(meal_repo): State<Arc<dyn MealRepository>>,
        State(image_storage): State<Arc<dyn ImageStorageService>>,
        Extension(session): Extension<ShareSessionId>,
        Form(body): Form<MealDTO>,
    ) -> Result<Response, ApplicationError> {
        let mut meal = body;
        meal.sanitize();

        let image = sessions.with_surface(session, |surface| {
            surface
                .controller()
                .files()
                .first()
                .map(|selected| selected.file.clone())
        });

        let mut errors: Vec<String> = meal
            .missing_fields()
            .into_iter()
            .map(|field| format!("Please fill in the {} field", field.replace('_', " ")))
            .collect();
        if meal.creator_email.is_some() && !meal.has_valid_email() {
            errors.push("Please enter a valid email address".to_string());
        }
        if image.is_none() {
            errors.push("Please select an image".to_string());
        }

        let Some(image) = image.filter(|_| errors.is_empty()) else {
            warn!("Rejected meal submission: {}", errors.join("; "));
            let page = Self::page(&sessions, session, ShareFormValues::from(&meal), errors)?;
            return Ok((StatusCode::BAD_REQUEST, page).into_response());
        };

        let title = meal.title.as_deref().unwrap_or_default();
        let slug = unique_slug(meal_repo.as_ref(), title).await?;
        let image_path = image_storage.save(&slug, &image).await?;
        meal.slug = Some(slug);
        meal.image = Some(image_path.clone());

        let created = match meal_repo.create_meal(meal).await {
            Ok(created) => created,
            Err(e) => {
                // `save` only ever returns a freshly created file.
                if let Err(cleanup) = image_storage.delete(&image_path).await {
                    warn!("Failed to remove orphaned image {}: {:?}", image_path, cleanup);
                }
                return Err(e);
            }
        };

        sessions.end(session);
        info!("Meal {} shared by {}", created.slug, created.creator);
        Ok(Redirect::to("/meals").into_response())
    }

    fn page(
        sessions: &ShareSessions,
        session: ShareSessionId,
        form: ShareFormValues,
        errors: Vec<String>,
    ) -> Result<Html<String>, ApplicationError> {
        let image_input = sessions.with_surface(session, |surface| surface.render())?;
        render_page(&SharePage {
            image_input,
            form,
            errors,
        })
    }
}

/// Slug of `title`, suffixed with `-2`, `-3`, ... until no meal uses it.
async fn unique_slug(
    meal_repo: &dyn MealRepository,
    title: &str,
) -> Result<String, ApplicationError> {
    let base = match slugify(title) {
        slug if slug.is_empty() => "meal".to_string(),
        slug => slug,
    };

    let mut candidate = base.clone();
    let mut suffix = 2;
    while meal_repo.slug_exists(&candidate).await? {
        candidate = format!("{}-{}", base, suffix);
        suffix += 1;
    }
    Ok(candidate)
}

fn multipart_error(error: MultipartError) -> ApplicationError {
    if error.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApplicationError::PayloadTooLarge
    } else {
        ApplicationError::BadRequest(error.body_text())
    }
}
