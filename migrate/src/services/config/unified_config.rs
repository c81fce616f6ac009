//! Unified configuration for the migration tool
//!
//! One value describing both services, the shared transport and the migration
//! run. It is built once at startup and handed to each client constructor.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use url::Url;

use super::ConfigError;

/// Top-level configuration for a migration run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Source Gallery 2 installation
    pub gallery: GalleryConfig,

    /// Destination Koken installation
    pub koken: KokenConfig,

    /// HTTP settings shared by both clients
    pub transport: TransportConfig,

    /// Migration run behaviour
    pub migration: MigrationOptions,
}

/// Gallery 2 endpoint and credentials
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GalleryConfig {
    /// URL of the Gallery `main.php` entry point
    pub base_url: String,

    pub username: Option<String>,

    #[serde(skip_serializing)]
    pub password: Option<String>,

    /// Send requests to localhost with the configured host as virtual host
    pub local: bool,
}

/// Koken endpoint and credentials
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct KokenConfig {
    /// URL of the Koken installation root (the directory holding `api.php`)
    pub base_url: String,

    pub email: Option<String>,

    #[serde(skip_serializing)]
    pub password: Option<String>,

    /// Send requests to localhost with the configured host as virtual host
    pub local: bool,

    /// Relative photo paths given to `upload_photo_from_file` resolve against this
    pub upload_base_dir: PathBuf,
}

impl Default for KokenConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            email: None,
            password: None,
            local: false,
            upload_base_dir: PathBuf::from("."),
        }
    }
}

/// HTTP transport configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TransportConfig {
    /// Whole-request timeout in seconds
    pub request_timeout_secs: u64,

    /// Connection establishment timeout in seconds
    pub connect_timeout_secs: u64,

    /// User agent string
    pub user_agent: String,

    /// Verbose HTTP logging
    pub http_debug: bool,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            request_timeout_secs: 120,
            connect_timeout_secs: 15,
            user_agent: "gallery-migrate/0.1".to_string(),
            http_debug: false,
        }
    }
}

/// Migration run options
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MigrationOptions {
    /// Photos of one album processed at the same time once the album exists
    pub photo_concurrency: usize,

    /// Caption identifying the Gallery root container album
    pub root_album_caption: String,
}

impl Default for MigrationOptions {
    fn default() -> Self {
        Self {
            photo_concurrency: 1,
            root_album_caption: crate::services::client::types::ROOT_ALBUM_CAPTION.to_string(),
        }
    }
}

impl AppConfig {
    /// Settings shared by every command. Service URLs are checked by
    /// `validate_gallery` and `validate_koken`.
    pub fn validate_settings(&self) -> Result<(), ConfigError> {
        if self.transport.request_timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                field: "transport.request_timeout_secs",
                message: "must be greater than 0".to_string(),
            });
        }

        if self.migration.photo_concurrency == 0 {
            return Err(ConfigError::Invalid {
                field: "migration.photo_concurrency",
                message: "must be greater than 0".to_string(),
            });
        }

        Ok(())
    }

    pub fn validate_gallery(&self) -> Result<(), ConfigError> {
        parse_service_url("gallery.base_url", &self.gallery.base_url).map(|_| ())
    }

    pub fn validate_koken(&self) -> Result<(), ConfigError> {
        parse_service_url("koken.base_url", &self.koken.base_url).map(|_| ())
    }

    /// Everything a full migration run needs
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_gallery()?;
        self.validate_koken()?;
        self.validate_settings()
    }
}

fn parse_service_url(field: &'static str, raw: &str) -> Result<Url, ConfigError> {
    if raw.trim().is_empty() {
        return Err(ConfigError::Invalid {
            field,
            message: "must be set".to_string(),
        });
    }

    let url = Url::parse(raw).map_err(|e| ConfigError::Invalid {
        field,
        message: format!("'{}' is not a valid URL: {}", raw, e),
    })?;

    match url.scheme() {
        "http" | "https" if url.host_str().is_some() => Ok(url),
        _ => Err(ConfigError::Invalid {
            field,
            message: format!("'{}' must be an absolute http(s) URL", raw),
        }),
    }
}
