//! Migration progress events and event handling

use tracing::{debug, info, warn};

/// Events that can occur during migration
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MigrationEvent {
    Started { albums: usize },
    AlbumSkipped { title: String, reason: String },
    AlbumFailed { title: String, reason: String },
    AlbumCreated { title: String, id: u64 },
    PhotoMigrated { album: String, filename: String, id: u64 },
    PhotoFailed { album: String, filename: String, reason: String },
    CachesRefreshed,
    Warning { message: String },
    Completed { albums_created: usize, photos_migrated: usize, failures: usize },
}

/// Event handler for migration events
pub trait MigrationEventHandler: Send + Sync {
    fn handle_event(&self, event: MigrationEvent);
}

/// Renders events as tracing output
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingEventHandler;

impl MigrationEventHandler for LoggingEventHandler {
    fn handle_event(&self, event: MigrationEvent) {
        match event {
            MigrationEvent::Started { albums } => {
                info!("Migration started: {} albums in source", albums);
            }
            MigrationEvent::AlbumSkipped { title, reason } => {
                info!("Skipping album '{}': {}", title, reason);
            }
            MigrationEvent::AlbumFailed { title, reason } => {
                warn!("Album '{}' not migrated: {}", title, reason);
            }
            MigrationEvent::AlbumCreated { title, id } => {
                info!("Album '{}' created as {}", title, id);
            }
            MigrationEvent::PhotoMigrated {
                album,
                filename,
                id,
            } => {
                debug!("Photo '{}' in '{}' migrated as {}", filename, album, id);
            }
            MigrationEvent::PhotoFailed {
                album,
                filename,
                reason,
            } => {
                warn!("Photo '{}' in '{}' not migrated: {}", filename, album, reason);
            }
            MigrationEvent::CachesRefreshed => {
                info!("Destination caches refreshed");
            }
            MigrationEvent::Warning { message } => {
                warn!("{}", message);
            }
            MigrationEvent::Completed {
                albums_created,
                photos_migrated,
                failures,
            } => {
                if failures == 0 {
                    info!(
                        "Migration completed: {} albums, {} photos",
                        albums_created, photos_migrated
                    );
                } else {
                    warn!(
                        "Migration completed with {} failures: {} albums, {} photos",
                        failures, albums_created, photos_migrated
                    );
                }
            }
        }
    }
}
