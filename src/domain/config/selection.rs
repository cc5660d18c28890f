use serde::{Deserialize, Serialize};

use crate::domain::models::file::FileCategory;

pub const DEFAULT_MAX_SIZE: u64 = 5 * 1024 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PreviewMode {
    #[default]
    #[serde(rename = "default")]
    Default,
    #[serde(rename = "imageCover")]
    ImageCover,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectionOptions {
    #[serde(rename = "maxFiles", default = "default_max_files")]
    pub max_files: usize,
    #[serde(rename = "maxSize", default = "default_max_size")]
    pub max_size: u64,
    #[serde(rename = "acceptedType", default)]
    pub accepted_type: FileCategory,
}

fn default_max_files() -> usize {
    1
}

fn default_max_size() -> u64 {
    DEFAULT_MAX_SIZE
}

impl Default for SelectionOptions {
    fn default() -> Self {
        Self {
            max_files: default_max_files(),
            max_size: default_max_size(),
            accepted_type: FileCategory::default(),
        }
    }
}

impl SelectionOptions {
    /// Zero limits are meaningless; they collapse to the smallest usable value.
    pub fn sanitize(&mut self) {
        self.max_files = self.max_files.max(1);
        self.max_size = self.max_size.max(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_allow_one_image_of_five_mebibytes() {
        let options = SelectionOptions::default();
        assert_eq!(options.max_files, 1);
        assert_eq!(options.max_size, 5_242_880);
        assert_eq!(options.accepted_type, FileCategory::Image);
    }

    #[test]
    fn missing_fields_deserialize_to_defaults() {
        let options: SelectionOptions = serde_json::from_str(r#"{"maxFiles": 3}"#).unwrap();
        assert_eq!(options.max_files, 3);
        assert_eq!(options.max_size, DEFAULT_MAX_SIZE);
        assert_eq!(options.accepted_type, FileCategory::Image);
    }

    #[test]
    fn sanitize_clamps_zero_limits() {
        let mut options = SelectionOptions {
            max_files: 0,
            max_size: 0,
            accepted_type: FileCategory::Video,
        };
        options.sanitize();
        assert_eq!(options.max_files, 1);
        assert_eq!(options.max_size, 1);
    }
}
