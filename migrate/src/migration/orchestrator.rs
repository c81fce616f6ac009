//! Drives a source and a target through a full album migration

use std::sync::Arc;
use std::time::Instant;

use tracing::{info, instrument, warn};

use super::progress::{LoggingEventHandler, MigrationEvent, MigrationEventHandler};
use super::steps::{album, StepContext};
use super::traits::{AlbumSource, AlbumTarget};
use super::types::MigrationReport;
use crate::services::client::records;
use crate::services::client::types::ALBUM_RECORD;
use crate::services::config::MigrationOptions;
use crate::services::errors::{MigrationError, MigrationResult};

/// Migrates every album of `source` into `target`.
///
/// Only authentication and the initial album listing abort a run. Any other
/// failure skips the album or photo it belongs to and is recorded in the
/// returned [`MigrationReport`]. Albums are processed one at a time since the
/// source keeps the download prefix of the album listed last.
pub struct MigrationOrchestrator<S, T> {
    source: S,
    target: T,
    options: MigrationOptions,
    events: Arc<dyn MigrationEventHandler>,
}

impl<S, T> MigrationOrchestrator<S, T>
where
    S: AlbumSource,
    T: AlbumTarget,
{
    pub fn new(source: S, target: T) -> Self {
        Self {
            source,
            target,
            options: MigrationOptions::default(),
            events: Arc::new(LoggingEventHandler),
        }
    }

    pub fn with_options(mut self, options: MigrationOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_event_handler(mut self, events: Arc<dyn MigrationEventHandler>) -> Self {
        self.events = events;
        self
    }

    pub fn target(&self) -> &T {
        &self.target
    }

    #[instrument(skip(self), err)]
    pub async fn migrate_albums(&self) -> MigrationResult<MigrationReport> {
        let started = Instant::now();

        self.source
            .authenticate()
            .await
            .map_err(|source| MigrationError::Authentication {
                service: "Gallery",
                source,
            })?;
        self.target
            .authenticate()
            .await
            .map_err(|source| MigrationError::Authentication {
                service: "Koken",
                source,
            })?;

        let albums = self
            .source
            .list_albums()
            .await
            .map_err(|source| MigrationError::AlbumListing { source })?;
        let indices = records::record_indices(&albums, ALBUM_RECORD);

        let mut report = MigrationReport::new(indices.len());
        self.events.handle_event(MigrationEvent::Started {
            albums: indices.len(),
        });

        let ctx = StepContext {
            source: &self.source,
            target: &self.target,
            options: &self.options,
            events: self.events.as_ref(),
        };

        for index in indices {
            album::migrate_album(&ctx, &albums, index, &mut report).await;
        }

        match self.target.refresh_system_caches().await {
            Ok(()) => {
                report.caches_refreshed = true;
                self.events.handle_event(MigrationEvent::CachesRefreshed);
            }
            Err(e) => {
                warn!("Cache refresh failed: {}", e);
                self.events.handle_event(MigrationEvent::Warning {
                    message: format!("Cache refresh failed: {}", e),
                });
                report.refresh_error = Some(e.to_string());
            }
        }

        report.duration = started.elapsed();
        self.events.handle_event(MigrationEvent::Completed {
            albums_created: report.albums_created.len(),
            photos_migrated: report.photos_migrated,
            failures: report.failure_count(),
        });
        info!("{}", report.summary());

        Ok(report)
    }
}
