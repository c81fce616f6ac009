//! Gallery to Koken album migration
//!
//! The orchestrator is generic over an [`AlbumSource`] and an
//! [`AlbumTarget`]; the concrete Gallery and Koken clients implement both in
//! `implementations`.
//!
//! # Architecture
//!
//! - **Album step**: resolve the album record, list its images, skip the root
//!   container, create the destination album
//! - **Photo step**: fetch, upload and attach each image, with bounded
//!   concurrency inside one album
//! - **Progress**: every outcome is emitted as a [`MigrationEvent`] and
//!   collected in a [`MigrationReport`]
//!
//! # Usage
//!
//! ```no_run
//! # async fn run(config: migrate::services::config::AppConfig) {
//! let report = migrate::migrate_albums(&config).await.unwrap();
//! println!("{}", report.summary());
//! # }
//! ```

pub mod implementations;
pub mod orchestrator;
pub mod progress;
pub mod steps;
pub mod traits;
pub mod types;

#[cfg(test)]
mod orchestrator_test;

use std::sync::Arc;

pub use orchestrator::MigrationOrchestrator;
pub use progress::*;
pub use traits::{AlbumSource, AlbumTarget};
pub use types::*;

use crate::services::client::MigrationClient;
use crate::services::config::AppConfig;
use crate::services::errors::MigrationResult;

/// Migrate every album described by `config`, logging progress through tracing
pub async fn migrate_albums(config: &AppConfig) -> MigrationResult<MigrationReport> {
    migrate_albums_with_events(config, Arc::new(LoggingEventHandler)).await
}

pub async fn migrate_albums_with_events(
    config: &AppConfig,
    events: Arc<dyn MigrationEventHandler>,
) -> MigrationResult<MigrationReport> {
    config.validate()?;
    let clients = MigrationClient::from_config(config)?;

    MigrationOrchestrator::new(clients.gallery, clients.koken)
        .with_options(config.migration.clone())
        .with_event_handler(events)
        .migrate_albums()
        .await
}
