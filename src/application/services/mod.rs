pub mod image_storage_service;
pub mod preview_service;

pub use image_storage_service::ImageStorageService;
pub use preview_service::PreviewService;
