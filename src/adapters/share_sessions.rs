use std::{
    collections::HashMap,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
    time::{Duration, Instant},
};

use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::{
    adapters::views::file_input_surface::{FileInputSurface, SurfaceOptions},
    application::{selection::FileSelectionController, services::PreviewService},
    domain::{
        config::selection::{PreviewMode, SelectionOptions},
        models::file::{FileCategory, SelectedFile},
    },
};

pub const SHARE_SESSION_COOKIE: &str = "share_session";
pub const SHARE_UPLOAD_ACTION: &str = "/meals/share/files";

const IMAGE_PLACEHOLDER: &str = "<p class=\"file-input__hint\">No image picked yet.</p>";
const COVER_OVERLAY: &str = "<span class=\"file-input__overlay-hint\">Pick another image to replace this one</span>";

/// Session id carried by the `share_session` cookie.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ShareSessionId(pub Uuid);

struct ShareSession {
    surface: FileInputSurface,
    last_seen: Instant,
}

/// One image input surface per visitor of the share page. Dropping a session
/// tears its controller down, which revokes any preview it still holds.
pub struct ShareSessions {
    previews: Arc<dyn PreviewService>,
    max_image_size: u64,
    sessions: Mutex<HashMap<ShareSessionId, ShareSession>>,
}

impl ShareSessions {
    pub fn new(previews: Arc<dyn PreviewService>, max_image_size: u64) -> Self {
        Self {
            previews,
            max_image_size,
            sessions: Mutex::new(HashMap::new()),
        }
    }

    /// Runs `f` against the session's surface, creating the session on first use.
    pub fn with_surface<R>(&self, id: ShareSessionId, f: impl FnOnce(&mut FileInputSurface) -> R) -> R {
        let mut sessions = self.sessions();
        let session = sessions.entry(id).or_insert_with(|| {
            debug!("Opening share session {}", id.0);
            ShareSession {
                surface: self.new_surface(id),
                last_seen: Instant::now(),
            }
        });
        session.last_seen = Instant::now();
        f(&mut session.surface)
    }

    /// Ends a session. Returns whether it existed.
    pub fn end(&self, id: ShareSessionId) -> bool {
        let removed = self.sessions().remove(&id);
        let existed = removed.is_some();
        drop(removed);
        if existed {
            debug!("Closed share session {}", id.0);
        }
        existed
    }

    /// Drops every session idle for at least `ttl`. Returns how many were dropped.
    pub fn evict_idle(&self, ttl: Duration) -> usize {
        let now = Instant::now();
        let expired: Vec<ShareSession> = {
            let mut sessions = self.sessions();
            let stale: Vec<ShareSessionId> = sessions
                .iter()
                .filter(|(_, session)| now.duration_since(session.last_seen) >= ttl)
                .map(|(id, _)| *id)
                .collect();
            stale
                .into_iter()
                .filter_map(|id| sessions.remove(&id))
                .collect()
        };

        let count = expired.len();
        drop(expired);
        if count > 0 {
            info!("Evicted {} idle share sessions", count);
        }
        count
    }

    pub fn len(&self) -> usize {
        self.sessions().len()
    }

    /// Periodically evicts sessions idle for longer than `ttl`.
    pub fn spawn_eviction(self: Arc<Self>, ttl: Duration) -> JoinHandle<()> {
        let period = (ttl / 4).max(Duration::from_secs(1));
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            loop {
                interval.tick().await;
                self.evict_idle(ttl);
            }
        })
    }

    fn new_surface(&self, id: ShareSessionId) -> FileInputSurface {
        let options = SelectionOptions {
            max_files: 1,
            max_size: self.max_image_size,
            accepted_type: FileCategory::Image,
        };
        let session = id.0;
        let controller = FileSelectionController::new(options, Arc::clone(&self.previews))
            .on_files_changed(move |files: &[SelectedFile]| {
                debug!("Share session {} now holds {} files", session, files.len());
            })
            .on_files_rejected(move |files: &[SelectedFile]| {
                for file in files {
                    warn!(
                        "Share session {} rejected {}: {}",
                        session,
                        file.name(),
                        file.validation_error.as_deref().unwrap_or_default()
                    );
                }
            });

        FileInputSurface::new(
            controller,
            SurfaceOptions {
                preview_mode: PreviewMode::ImageCover,
                prevent_open_file_dialog: false,
                label: "Meal image".to_string(),
                input_name: "files".to_string(),
                action: SHARE_UPLOAD_ACTION.to_string(),
            },
        )
        .with_children(IMAGE_PLACEHOLDER)
        .with_overlay(COVER_OVERLAY)
    }

    fn sessions(&self) -> MutexGuard<'_, HashMap<ShareSessionId, ShareSession>> {
        self.sessions.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
