//! Photo step: fetch, upload and attach each image of a created album.

use std::pin::pin;

use futures::stream::{self, StreamExt};
use tracing::debug;

use super::StepContext;
use crate::migration::progress::MigrationEvent;
use crate::migration::traits::{AlbumSource, AlbumTarget};
use crate::migration::types::{MigrationFailure, MigrationReport};
use crate::services::client::{AlbumImages, DestinationAlbum, DestinationPhoto, SourceAlbum};

struct PhotoOutcome {
    filename: String,
    result: Result<DestinationPhoto, String>,
}

/// Photos complete in listing order; up to `photo_concurrency` are in flight.
pub async fn migrate_photos<S, T>(
    ctx: &StepContext<'_, S, T>,
    album: &SourceAlbum,
    images: &AlbumImages,
    destination: &DestinationAlbum,
    report: &mut MigrationReport,
) where
    S: AlbumSource,
    T: AlbumTarget,
{
    let indices = images.image_indices();
    debug!("Album {} has {} images", album.title, indices.len());

    let mut outcomes = pin!(stream::iter(indices)
        .map(|index| migrate_photo(ctx, images, destination.id, index))
        .buffered(ctx.options.photo_concurrency.max(1)));

    while let Some(outcome) = outcomes.next().await {
        match outcome.result {
            Ok(photo) => {
                ctx.events.handle_event(MigrationEvent::PhotoMigrated {
                    album: album.title.clone(),
                    filename: outcome.filename,
                    id: photo.id,
                });
                report.photos_migrated += 1;
            }
            Err(reason) => {
                ctx.events.handle_event(MigrationEvent::PhotoFailed {
                    album: album.title.clone(),
                    filename: outcome.filename.clone(),
                    reason: reason.clone(),
                });
                report
                    .failures
                    .push(MigrationFailure::photo(&album.title, outcome.filename, reason));
            }
        }
    }
}

async fn migrate_photo<S, T>(
    ctx: &StepContext<'_, S, T>,
    images: &AlbumImages,
    album_id: u64,
    index: u32,
) -> PhotoOutcome
where
    S: AlbumSource,
    T: AlbumTarget,
{
    let image = match images.image(index) {
        Ok(image) => image,
        Err(e) => {
            return PhotoOutcome {
                filename: images.image_label(index),
                result: Err(e.to_string()),
            }
        }
    };

    let result = async {
        let data = ctx
            .source
            .fetch_image_bytes(&image.remote_path)
            .await
            .map_err(|e| format!("fetch failed: {}", e))?;

        let photo = ctx
            .target
            .upload_photo_bytes(data, &image.filename)
            .await
            .map_err(|e| format!("upload failed: {}", e))?
            .ok_or_else(|| "no content id returned".to_string())?;

        ctx.target
            .attach_photo_to_album(photo.id, album_id)
            .await
            .map_err(|e| format!("attach to album {} failed: {}", album_id, e))?;

        Ok::<_, String>(photo)
    }
    .await;

    PhotoOutcome {
        filename: image.filename,
        result,
    }
}
