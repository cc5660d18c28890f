use crate::domain::models::file::{PreviewHandle, RawFile};

/// Allocator/revoker pair for preview handles.
///
/// `revoke` takes the handle by value, so a handle can only ever be revoked once.
pub trait PreviewService: Send + Sync {
    fn allocate(&self, file: &RawFile) -> PreviewHandle;
    fn revoke(&self, handle: PreviewHandle);
}
