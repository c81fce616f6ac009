//! Orchestrator behaviour against in-memory services

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use bytes::Bytes;

use super::progress::{MigrationEvent, MigrationEventHandler};
use super::traits::{AlbumSource, AlbumTarget};
use super::types::FailureScope;
use super::MigrationOrchestrator;
use crate::services::client::{
    AlbumImages, ClientError, ClientResult, DestinationAlbum, DestinationPhoto, Properties,
};
use crate::services::config::MigrationOptions;
use crate::services::errors::MigrationError;

#[derive(Default)]
struct FakeGallery {
    auth_error: Option<ClientError>,
    listing_error: Option<ClientError>,
    albums: Properties,
    album_images: HashMap<String, Properties>,
    broken_images: Vec<String>,
}

impl FakeGallery {
    fn album(mut self, index: u32, name: &str, title: &str, summary: Option<&str>) -> Self {
        self.albums.insert(format!("album.name.{}", index), name);
        self.albums.insert(format!("album.title.{}", index), title);
        if let Some(summary) = summary {
            self.albums.insert(format!("album.summary.{}", index), summary);
        }
        self
    }

    /// Images as (remote path, file name) pairs
    fn images(mut self, name: &str, caption: &str, images: &[(&str, &str)]) -> Self {
        let mut properties = Properties::new();
        properties.insert("baseurl", format!("http://gallery.test/d/{}/", name));
        properties.insert("album.caption", caption);
        for (i, (path, filename)) in images.iter().enumerate() {
            properties.insert(format!("image.name.{}", i + 1), *path);
            properties.insert(format!("image.title.{}", i + 1), *filename);
        }
        self.album_images.insert(name.to_string(), properties);
        self
    }
}

#[async_trait]
impl AlbumSource for FakeGallery {
    async fn authenticate(&self) -> ClientResult<()> {
        match &self.auth_error {
            Some(e) => Err(e.clone()),
            None => Ok(()),
        }
    }

    async fn list_albums(&self) -> ClientResult<Properties> {
        match &self.listing_error {
            Some(e) => Err(e.clone()),
            None => Ok(self.albums.clone()),
        }
    }

    async fn list_album_images(&self, name_id: &str) -> ClientResult<Option<AlbumImages>> {
        Ok(self
            .album_images
            .get(name_id)
            .cloned()
            .and_then(|properties| AlbumImages::from_properties(name_id, properties)))
    }

    async fn fetch_image_bytes(&self, relative_path: &str) -> ClientResult<Bytes> {
        if self.broken_images.iter().any(|path| path == relative_path) {
            return Err(ClientError::NetworkError {
                message: format!("HTTP 500 for {}", relative_path),
            });
        }
        Ok(Bytes::from(format!("bytes of {}", relative_path)))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Call {
    CreateAlbum(String, Option<String>),
    Upload(String),
    Attach(u64, u64),
    Refresh,
}

struct FakeKoken {
    auth_error: Option<ClientError>,
    album_ids: HashMap<String, u64>,
    refresh_error: Option<ClientError>,
    next_photo_id: AtomicU64,
    calls: Mutex<Vec<Call>>,
}

impl FakeKoken {
    fn new(album_ids: &[(&str, u64)]) -> Self {
        Self {
            auth_error: None,
            album_ids: album_ids
                .iter()
                .map(|(title, id)| (title.to_string(), *id))
                .collect(),
            refresh_error: None,
            next_photo_id: AtomicU64::new(100),
            calls: Mutex::new(Vec::new()),
        }
    }

    fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn count(&self, matches: impl Fn(&Call) -> bool) -> usize {
        self.calls().iter().filter(|call| matches(call)).count()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl AlbumTarget for FakeKoken {
    async fn authenticate(&self) -> ClientResult<()> {
        match &self.auth_error {
            Some(e) => Err(e.clone()),
            None => Ok(()),
        }
    }

    async fn create_album(
        &self,
        title: &str,
        summary: Option<&str>,
    ) -> ClientResult<Option<DestinationAlbum>> {
        self.record(Call::CreateAlbum(
            title.to_string(),
            summary.map(str::to_string),
        ));
        Ok(self.album_ids.get(title).map(|id| DestinationAlbum {
            id: *id,
            title: title.to_string(),
            summary: summary.map(str::to_string),
        }))
    }

    async fn upload_photo_bytes(
        &self,
        _data: Bytes,
        filename: &str,
    ) -> ClientResult<Option<DestinationPhoto>> {
        self.record(Call::Upload(filename.to_string()));
        Ok(Some(DestinationPhoto {
            id: self.next_photo_id.fetch_add(1, Ordering::SeqCst),
            filename: filename.to_string(),
        }))
    }

    async fn attach_photo_to_album(&self, photo_id: u64, album_id: u64) -> ClientResult<()> {
        self.record(Call::Attach(photo_id, album_id));
        Ok(())
    }

    async fn refresh_system_caches(&self) -> ClientResult<()> {
        self.record(Call::Refresh);
        match &self.refresh_error {
            Some(e) => Err(e.clone()),
            None => Ok(()),
        }
    }
}

#[derive(Default)]
struct EventRecorder(Mutex<Vec<MigrationEvent>>);

impl MigrationEventHandler for EventRecorder {
    fn handle_event(&self, event: MigrationEvent) {
        self.0.lock().unwrap().push(event);
    }
}

#[tokio::test]
async fn test_single_album_end_to_end() {
    let gallery = FakeGallery::default()
        .album(1, "vacation", "Vacation", Some("Trip"))
        .images("vacation", "Vacation", &[("11", "a.jpg"), ("12", "b.jpg")]);
    let koken = FakeKoken::new(&[("Vacation", 42)]);
    let events = Arc::new(EventRecorder::default());

    let orchestrator =
        MigrationOrchestrator::new(gallery, koken).with_event_handler(events.clone());
    let report = orchestrator.migrate_albums().await.unwrap();

    assert_eq!(
        orchestrator.target().calls(),
        vec![
            Call::CreateAlbum("Vacation".to_string(), Some("Trip".to_string())),
            Call::Upload("a.jpg".to_string()),
            Call::Attach(100, 42),
            Call::Upload("b.jpg".to_string()),
            Call::Attach(101, 42),
            Call::Refresh,
        ]
    );
    assert_eq!(report.albums_found, 1);
    assert_eq!(report.albums_created.len(), 1);
    assert_eq!(report.albums_created[0].id, 42);
    assert_eq!(report.photos_migrated, 2);
    assert!(report.is_clean());

    let events = events.0.lock().unwrap();
    assert_eq!(events.first(), Some(&MigrationEvent::Started { albums: 1 }));
    assert!(events.contains(&MigrationEvent::AlbumCreated {
        title: "Vacation".to_string(),
        id: 42
    }));
    assert_eq!(
        events.last(),
        Some(&MigrationEvent::Completed {
            albums_created: 1,
            photos_migrated: 2,
            failures: 0
        })
    );
}

#[tokio::test]
async fn test_root_album_is_skipped() {
    let gallery = FakeGallery::default()
        .album(1, "7", "Gallery", None)
        .images("7", "Gallery", &[]);
    let koken = FakeKoken::new(&[("Gallery", 1)]);

    let orchestrator = MigrationOrchestrator::new(gallery, koken);
    let report = orchestrator.migrate_albums().await.unwrap();

    assert_eq!(orchestrator.target().calls(), vec![Call::Refresh]);
    assert_eq!(report.albums_skipped, vec!["Gallery".to_string()]);
    assert_eq!(report.failure_count(), 0);
}

#[tokio::test]
async fn test_album_without_id_uploads_nothing_and_run_continues() {
    let gallery = FakeGallery::default()
        .album(1, "broken", "Broken", None)
        .images("broken", "Broken", &[("21", "x.jpg")])
        .album(2, "vacation", "Vacation", None)
        .images("vacation", "Vacation", &[("11", "a.jpg")]);
    let koken = FakeKoken::new(&[("Vacation", 42)]);

    let orchestrator = MigrationOrchestrator::new(gallery, koken);
    let report = orchestrator.migrate_albums().await.unwrap();
    let koken = orchestrator.target();

    assert_eq!(koken.count(|call| matches!(call, Call::Upload(name) if name == "x.jpg")), 0);
    assert_eq!(koken.count(|call| matches!(call, Call::Attach(_, 42))), 1);
    assert_eq!(koken.count(|call| *call == Call::Refresh), 1);
    assert_eq!(report.photos_migrated, 1);
    assert_eq!(
        report.failures[0].scope,
        FailureScope::Album {
            title: "Broken".to_string()
        }
    );
    assert_eq!(report.failures[0].reason, "no album id returned");
}

#[tokio::test]
async fn test_failed_photo_fetch_skips_only_that_photo() {
    let mut gallery = FakeGallery::default()
        .album(1, "vacation", "Vacation", None)
        .images(
            "vacation",
            "Vacation",
            &[("11", "a.jpg"), ("12", "b.jpg"), ("13", "c.jpg")],
        );
    gallery.broken_images.push("12".to_string());
    let koken = FakeKoken::new(&[("Vacation", 42)]);

    let orchestrator = MigrationOrchestrator::new(gallery, koken);
    let report = orchestrator.migrate_albums().await.unwrap();

    assert_eq!(report.photos_migrated, 2);
    assert_eq!(report.failure_count(), 1);
    assert_eq!(
        report.failures[0].scope,
        FailureScope::Photo {
            album: "Vacation".to_string(),
            filename: "b.jpg".to_string()
        }
    );
    assert!(report.failures[0].reason.starts_with("fetch failed"));

    let koken = orchestrator.target();
    assert_eq!(koken.count(|call| matches!(call, Call::Upload(_))), 2);
    assert_eq!(koken.count(|call| matches!(call, Call::Attach(_, 42))), 2);
}

#[tokio::test]
async fn test_album_records_without_name_or_listing_fail_individually() {
    let mut gallery = FakeGallery::default()
        .album(2, "gone", "Gone", None)
        .album(3, "vacation", "Vacation", None)
        .images("vacation", "Vacation", &[("11", "a.jpg")]);
    gallery.albums.insert("album.title.1", "Nameless");
    let koken = FakeKoken::new(&[("Vacation", 42)]);

    let orchestrator = MigrationOrchestrator::new(gallery, koken);
    let report = orchestrator.migrate_albums().await.unwrap();

    assert_eq!(report.albums_found, 3);
    assert_eq!(report.album_failures().count(), 2);
    assert_eq!(report.albums_created.len(), 1);
    assert_eq!(report.photos_migrated, 1);
    assert_eq!(
        report.failures[0].scope,
        FailureScope::Album {
            title: "Nameless".to_string()
        }
    );
}

#[tokio::test]
async fn test_authentication_failure_is_fatal() {
    let gallery = FakeGallery::default().album(1, "vacation", "Vacation", None);
    let mut koken = FakeKoken::new(&[("Vacation", 42)]);
    koken.auth_error = Some(ClientError::AuthenticationFailed {
        service: "Koken",
        message: "no session cookie set".to_string(),
    });

    let orchestrator = MigrationOrchestrator::new(gallery, koken);
    let err = orchestrator.migrate_albums().await.unwrap_err();

    assert!(matches!(
        err,
        MigrationError::Authentication {
            service: "Koken",
            ..
        }
    ));
    assert!(orchestrator.target().calls().is_empty());
}

#[tokio::test]
async fn test_album_listing_failure_is_fatal() {
    let gallery = FakeGallery {
        listing_error: Some(ClientError::NetworkError {
            message: "connection refused".to_string(),
        }),
        ..Default::default()
    };
    let koken = FakeKoken::new(&[]);

    let orchestrator = MigrationOrchestrator::new(gallery, koken);
    let err = orchestrator.migrate_albums().await.unwrap_err();

    assert!(matches!(
        err,
        MigrationError::AlbumListing {
            source: ClientError::NetworkError { .. }
        }
    ));
    assert!(orchestrator.target().calls().is_empty());
}

#[tokio::test]
async fn test_refresh_failure_is_recorded_not_fatal() {
    let gallery = FakeGallery::default();
    let mut koken = FakeKoken::new(&[]);
    koken.refresh_error = Some(ClientError::NetworkError {
        message: "timed out".to_string(),
    });

    let report = MigrationOrchestrator::new(gallery, koken)
        .migrate_albums()
        .await
        .unwrap();

    assert!(!report.caches_refreshed);
    assert!(report.refresh_error.unwrap().contains("timed out"));
}

#[tokio::test]
async fn test_concurrent_photos_keep_listing_order() {
    let gallery = FakeGallery::default()
        .album(1, "vacation", "Vacation", None)
        .images(
            "vacation",
            "Vacation",
            &[("11", "a.jpg"), ("12", "b.jpg"), ("13", "c.jpg"), ("14", "d.jpg")],
        );
    let koken = FakeKoken::new(&[("Vacation", 42)]);
    let events = Arc::new(EventRecorder::default());

    let report = MigrationOrchestrator::new(gallery, koken)
        .with_options(MigrationOptions {
            photo_concurrency: 2,
            ..Default::default()
        })
        .with_event_handler(events.clone())
        .migrate_albums()
        .await
        .unwrap();

    assert_eq!(report.photos_migrated, 4);

    let migrated: Vec<String> = events
        .0
        .lock()
        .unwrap()
        .iter()
        .filter_map(|event| match event {
            MigrationEvent::PhotoMigrated { filename, .. } => Some(filename.clone()),
            _ => None,
        })
        .collect();
    assert_eq!(migrated, vec!["a.jpg", "b.jpg", "c.jpg", "d.jpg"]);
}
