use axum::{
    extract::DefaultBodyLimit,
    http::HeaderValue,
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};
use tracing::warn;

use crate::adapters::{
    controllers::{
        health_controller::HealthController, meal_controller::MealController,
        preview_controller::PreviewController, share_controller::ShareController,
    },
    middleware::share_session,
    state::AppState,
};

pub fn router(state: AppState) -> Router {
    let config = state.config.clone();

    // Routes that keep per-visitor upload state behind the share_session cookie
    let share_routes = Router::new()
        .route(
            "/meals/share",
            get(ShareController::share_page).post(ShareController::share_meal),
        )
        .route(
            "/meals/share/files",
            post(ShareController::upload_files)
                .layer(DefaultBodyLimit::max(config.upload_body_limit)),
        )
        .route(
            "/meals/share/files/{index}/remove",
            post(ShareController::remove_file),
        )
        .route_layer(middleware::from_fn(share_session));

    let public_routes = Router::new()
        .route("/", get(MealController::home))
        .route("/community", get(MealController::community))
        .route("/meals", get(MealController::list_meals))
        .route("/meals/{slug}", get(MealController::meal_detail))
        .route("/previews/{preview_id}", get(PreviewController::get_preview))
        .route("/health", get(HealthController::health_check))
        .nest_service("/images", ServeDir::new(&config.images_dir));

    Router::new()
        .merge(share_routes)
        .merge(public_routes)
        .layer(cors_layer(config.cors_allowed_origins.as_deref()))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn cors_layer(allowed_origins: Option<&[String]>) -> CorsLayer {
    match allowed_origins {
        Some(origins) => {
            let origins: Vec<HeaderValue> = origins
                .iter()
                .filter_map(|origin| match origin.parse() {
                    Ok(value) => Some(value),
                    Err(_) => {
                        warn!("Ignoring invalid CORS origin: {}", origin);
                        None
                    }
                })
                .collect();
            CorsLayer::new()
                .allow_origin(origins)
                .allow_methods(Any)
                .allow_headers(Any)
        }
        // Allow all origins if not specified (only for development)
        None => CorsLayer::permissive(),
    }
}
