use axum::{
    body::Body,
    extract::Request,
    http::{header, HeaderMap, HeaderValue},
    middleware::Next,
    response::Response,
};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::adapters::share_sessions::{ShareSessionId, SHARE_SESSION_COOKIE};

/// Attaches a [`ShareSessionId`] to the request, issuing a fresh
/// `share_session` cookie when the visitor has none.
pub async fn share_session(mut request: Request<Body>, next: Next) -> Response {
    let (id, issued) = match session_from_cookies(request.headers()) {
        Some(id) => (id, false),
        None => {
            let id = ShareSessionId(Uuid::new_v4());
            debug!("Issuing share session {}", id.0);
            (id, true)
        }
    };

    request.extensions_mut().insert(id);
    let mut response = next.run(request).await;

    if issued {
        let cookie = format!(
            "{}={}; Path=/; HttpOnly; SameSite=Lax",
            SHARE_SESSION_COOKIE, id.0
        );
        match HeaderValue::from_str(&cookie) {
            Ok(value) => {
                response.headers_mut().append(header::SET_COOKIE, value);
            }
            Err(e) => warn!("Failed to build share session cookie: {}", e),
        }
    }

    response
}

fn session_from_cookies(headers: &HeaderMap) -> Option<ShareSessionId> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|cookies| cookies.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SHARE_SESSION_COOKIE)
        .and_then(|(_, value)| Uuid::parse_str(value.trim()).ok())
        .map(ShareSessionId)
}
