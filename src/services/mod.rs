mod error;
mod local_image_storage;
mod memory_preview_store;

pub use error::StorageError;
pub use local_image_storage::LocalImageStorage;
pub use memory_preview_store::{MemoryPreviewStore, PreviewContent};
