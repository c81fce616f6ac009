use thiserror::Error;

use crate::services::client::ClientError;
use crate::services::config::ConfigError;

/// Errors that abort a migration run before any destination writes happen
#[derive(Debug, Error)]
pub enum MigrationError {
    #[error("Authentication error ({service}): {source}")]
    Authentication {
        service: &'static str,
        #[source]
        source: ClientError,
    },

    #[error("Failed to list source albums: {source}")]
    AlbumListing {
        #[source]
        source: ClientError,
    },

    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigError),

    #[error("Client error: {0}")]
    Client(#[from] ClientError),
}

pub type MigrationResult<T> = Result<T, MigrationError>;

