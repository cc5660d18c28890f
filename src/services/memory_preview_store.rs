use std::{
    collections::HashMap,
    sync::{Mutex, MutexGuard, PoisonError},
};

use bytes::Bytes;
use tracing::debug;
use uuid::Uuid;

use crate::{
    application::services::PreviewService,
    domain::models::file::{PreviewHandle, RawFile},
};

#[derive(Debug, Clone)]
pub struct PreviewContent {
    pub mime_type: String,
    pub content: Bytes,
}

/// Keeps preview bytes in memory and hands out `{base_path}/{id}` URIs that
/// stay resolvable until revoked.
pub struct MemoryPreviewStore {
    base_path: String,
    entries: Mutex<HashMap<Uuid, PreviewContent>>,
}

impl MemoryPreviewStore {
    pub fn new(base_path: impl Into<String>) -> Self {
        Self {
            base_path: base_path.into().trim_end_matches('/').to_string(),
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn get(&self, id: &Uuid) -> Option<PreviewContent> {
        self.entries().get(id).cloned()
    }

    pub fn len(&self) -> usize {
        self.entries().len()
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<Uuid, PreviewContent>> {
        // The map holds plain data, so a poisoned lock is still consistent.
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl PreviewService for MemoryPreviewStore {
    fn allocate(&self, file: &RawFile) -> PreviewHandle {
        let id = Uuid::new_v4();
        self.entries().insert(
            id,
            PreviewContent {
                mime_type: file.mime_type.clone(),
                content: file.content.clone(),
            },
        );
        debug!("Allocated preview {} for {}", id, file.name);
        PreviewHandle::new(id, format!("{}/{}", self.base_path, id))
    }

    fn revoke(&self, handle: PreviewHandle) {
        if self.entries().remove(&handle.id()).is_some() {
            debug!("Revoked preview {}", handle.id());
        }
    }
}
