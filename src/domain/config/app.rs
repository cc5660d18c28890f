use std::{env, fmt::Display, path::PathBuf, str::FromStr};

use thiserror::Error;
use tracing::info;

use super::selection::DEFAULT_MAX_SIZE;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid {key} value '{value}': {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    pub database_url: String,
    pub images_dir: PathBuf,
    pub seed_file: Option<PathBuf>,
    pub cors_allowed_origins: Option<Vec<String>>,
    pub max_image_size: u64,
    pub upload_body_limit: usize,
    pub share_session_ttl_secs: u64,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from any key lookup; `from_env` passes the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let cors_allowed_origins = lookup("CORS_ALLOWED_ORIGINS").map(|origins| {
            origins
                .split(',')
                .map(|origin| origin.trim().to_string())
                .filter(|origin| !origin.is_empty())
                .collect()
        });

        Ok(Self {
            port: try_load(&lookup, "PORT", "8080")?,
            database_url: try_load(&lookup, "DATABASE_URL", "sqlite://meals.db?mode=rwc")?,
            images_dir: try_load(&lookup, "IMAGES_DIR", "public/images")?,
            seed_file: lookup("MEALS_SEED_FILE").map(PathBuf::from),
            cors_allowed_origins,
            max_image_size: try_load(&lookup, "MAX_IMAGE_SIZE", &DEFAULT_MAX_SIZE.to_string())?,
            upload_body_limit: try_load(&lookup, "UPLOAD_BODY_LIMIT", "26214400")?,
            share_session_ttl_secs: try_load(&lookup, "SHARE_SESSION_TTL_SECS", "1800")?,
        })
    }
}

fn try_load<F, T>(lookup: &F, key: &'static str, default: &str) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: Display,
{
    let value = lookup(key).unwrap_or_else(|| {
        info!("{key} not set, using default: {default}");
        default.to_string()
    });

    match value.parse() {
        Ok(parsed) => Ok(parsed),
        Err(e) => Err(ConfigError::Invalid {
            key,
            reason: e.to_string(),
            value,
        }),
    }
}
