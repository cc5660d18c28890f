use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::header,
    response::{IntoResponse, Response},
};
use uuid::Uuid;

use crate::{application::error::ApplicationError, services::MemoryPreviewStore};

/// Preview bytes and mime type come from the uploader; responses must never be
/// sniffed or run script.
const PREVIEW_CSP: &str = "default-src 'none'; img-src 'self'; style-src 'unsafe-inline'; sandbox";

pub struct PreviewController;

impl PreviewController {
    /// GET /previews/{id}
    pub async fn get_preview(
        State(previews): State<Arc<MemoryPreviewStore>>,
        Path(preview_id): Path<Uuid>,
    ) -> Result<Response, ApplicationError> {
        let preview = previews.get(&preview_id).ok_or(ApplicationError::NotFound)?;
        Ok((
            [
                (header::CONTENT_TYPE, preview.mime_type),
                (header::CACHE_CONTROL, "no-store".to_string()),
                (header::X_CONTENT_TYPE_OPTIONS, "nosniff".to_string()),
                (header::CONTENT_SECURITY_POLICY, PREVIEW_CSP.to_string()),
                (header::CONTENT_DISPOSITION, "inline".to_string()),
            ],
            preview.content,
        )
            .into_response())
    }
}
