use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use tokio::{fs::OpenOptions, io::AsyncWriteExt};
use tracing::{debug, info, warn};

use crate::{
    application::{error::ApplicationError, services::ImageStorageService},
    domain::models::file::RawFile,
    services::error::StorageError,
};

const MAX_NAME_ATTEMPTS: usize = 100;

pub struct LocalImageStorage {
    root: PathBuf,
    public_prefix: String,
}

impl LocalImageStorage {
    pub fn new(root: impl Into<PathBuf>, public_prefix: &str) -> Self {
        Self {
            root: root.into(),
            public_prefix: public_prefix.trim_end_matches('/').to_string(),
        }
    }

    fn extension_for(image: &RawFile) -> Result<&'static str, StorageError> {
        let from_mime = match image.mime_type.to_ascii_lowercase().as_str() {
            "image/png" => Some("png"),
            "image/jpeg" | "image/jpg" => Some("jpg"),
            "image/gif" => Some("gif"),
            "image/webp" => Some("webp"),
            "image/avif" => Some("avif"),
            _ => None,
        };

        from_mime
            .or_else(|| {
                let extension = Path::new(&image.name)
                    .extension()?
                    .to_str()?
                    .to_ascii_lowercase();
                match extension.as_str() {
                    "png" => Some("png"),
                    "jpg" | "jpeg" => Some("jpg"),
                    "gif" => Some("gif"),
                    "webp" => Some("webp"),
                    "avif" => Some("avif"),
                    _ => None,
                }
            })
            .ok_or_else(|| StorageError::UnsupportedType(image.mime_type.clone()))
    }

    /// Maps a public path back to a file inside the root, refusing anything
    /// that would escape it.
    fn resolve(&self, public_path: &str) -> Result<PathBuf, StorageError> {
        let relative = public_path
            .strip_prefix(&self.public_prefix)
            .and_then(|rest| rest.strip_prefix('/'))
            .ok_or_else(|| StorageError::InvalidPath(public_path.to_string()))?;

        let relative = Path::new(relative);
        let is_plain = relative
            .components()
            .all(|component| matches!(component, Component::Normal(_)));
        if !is_plain || relative.as_os_str().is_empty() {
            return Err(StorageError::InvalidPath(public_path.to_string()));
        }

        Ok(self.root.join(relative))
    }
}

#[async_trait]
impl ImageStorageService for LocalImageStorage {
    /// Never replaces an existing file: a taken name gets a `-2`, `-3`, ...
    /// suffix, so the returned path always names a file this call created.
    async fn save(&self, slug: &str, image: &RawFile) -> Result<String, ApplicationError> {
        let extension = Self::extension_for(image)?;

        tokio::fs::create_dir_all(&self.root)
            .await
            .map_err(StorageError::from)?;

        for attempt in 1..=MAX_NAME_ATTEMPTS {
            let file_name = match attempt {
                1 => format!("{}.{}", slug, extension),
                n => format!("{}-{}.{}", slug, n, extension),
            };
            let path = self.root.join(&file_name);

            let mut file = match OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&path)
                .await
            {
                Ok(file) => file,
                Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                    debug!("Image name {} already taken", file_name);
                    continue;
                }
                Err(e) => return Err(StorageError::from(e).into()),
            };

            let written = async {
                file.write_all(&image.content).await?;
                file.flush().await
            }
            .await;
            if let Err(e) = written {
                drop(file);
                if let Err(cleanup) = tokio::fs::remove_file(&path).await {
                    warn!("Failed to remove partial image {}: {}", file_name, cleanup);
                }
                return Err(StorageError::from(e).into());
            }

            info!("Stored image {} ({} bytes)", file_name, image.size());
            return Ok(format!("{}/{}", self.public_prefix, file_name));
        }

        Err(StorageError::NameExhausted(slug.to_string()).into())
    }

    async fn delete(&self, public_path: &str) -> Result<(), ApplicationError> {
        let path = self.resolve(public_path)?;

        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StorageError::NotFound(public_path.to_string()).into())
            }
            Err(e) => Err(StorageError::from(e).into()),
        }
    }
}
