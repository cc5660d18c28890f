use bytes::Bytes;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A candidate file handed over by a picker or a drop, not yet validated.
#[derive(Debug, Clone)]
pub struct RawFile {
    pub name: String,
    pub mime_type: String,
    pub content: Bytes,
}

impl RawFile {
    pub fn new(name: impl Into<String>, mime_type: impl Into<String>, content: Bytes) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            content,
        }
    }

    pub fn validate_size(&self, max_size: u64) -> bool {
        self.size() <= max_size
    }

    pub fn size(&self) -> u64 {
        self.content.len() as u64
    }

    pub fn category(&self) -> FileCategory {
        FileCategory::from_mime(&self.mime_type)
    }

    /// Identity used when reconciling an externally supplied file list.
    pub fn same_file(&self, other: &RawFile) -> bool {
        self.name == other.name && self.mime_type == other.mime_type && self.size() == other.size()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileCategory {
    Audio,
    #[default]
    Image,
    Text,
    Video,
}

impl FileCategory {
    /// Unknown top-level types fall back to `Image`.
    pub fn from_mime(mime_type: &str) -> Self {
        let top_level = mime_type
            .split('/')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();

        match top_level.as_str() {
            "audio" => FileCategory::Audio,
            "image" => FileCategory::Image,
            "text" | "application" => FileCategory::Text,
            "video" => FileCategory::Video,
            _ => FileCategory::Image,
        }
    }

    /// Value for the `accept` attribute of a file input.
    pub fn accept_attribute(&self) -> &'static str {
        match self {
            FileCategory::Audio => "audio/*",
            FileCategory::Image => "image/*",
            FileCategory::Text => "text/*,application/*",
            FileCategory::Video => "video/*",
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            FileCategory::Audio => "icon-audio",
            FileCategory::Image => "icon-image",
            FileCategory::Text => "icon-document",
            FileCategory::Video => "icon-video",
        }
    }
}

/// Revocable reference to a file's bytes. Deliberately not `Clone`: the entry
/// holding it is the only owner, and revoking consumes it.
#[derive(Debug, PartialEq, Eq)]
pub struct PreviewHandle {
    id: Uuid,
    uri: String,
}

impl PreviewHandle {
    pub fn new(id: Uuid, uri: String) -> Self {
        Self { id, uri }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn uri(&self) -> &str {
        &self.uri
    }
}

#[derive(Debug)]
pub struct SelectedFile {
    pub file: RawFile,
    pub preview: Option<PreviewHandle>,
    pub validation_error: Option<String>,
}

impl SelectedFile {
    pub fn accepted(file: RawFile, preview: Option<PreviewHandle>) -> Self {
        Self {
            file,
            preview,
            validation_error: None,
        }
    }

    pub fn rejected(file: RawFile, reason: String) -> Self {
        Self {
            file,
            preview: None,
            validation_error: Some(reason),
        }
    }

    pub fn name(&self) -> &str {
        &self.file.name
    }

    pub fn size(&self) -> u64 {
        self.file.size()
    }

    pub fn mime_type(&self) -> &str {
        &self.file.mime_type
    }

    pub fn category(&self) -> FileCategory {
        self.file.category()
    }

    pub fn preview_uri(&self) -> Option<&str> {
        self.preview.as_ref().map(PreviewHandle::uri)
    }
}
