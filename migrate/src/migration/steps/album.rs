//! Album step: resolve the source record, list its images, create the
//! destination album, then hand the images to the photo step.

use tracing::{debug, instrument};

use super::{photo, StepContext};
use crate::migration::progress::MigrationEvent;
use crate::migration::traits::{AlbumSource, AlbumTarget};
use crate::migration::types::{MigrationFailure, MigrationReport};
use crate::services::client::{AlbumImages, DestinationAlbum, Properties, SourceAlbum};

/// What happened to one album before its photos were processed
enum Prepared {
    Ready {
        album: SourceAlbum,
        images: AlbumImages,
        destination: DestinationAlbum,
    },
    Root(SourceAlbum),
}

/// Migrate the album stored under `index` of the listing, recording every
/// outcome in `report`. Never fails the run.
#[instrument(skip(ctx, albums, report))]
pub async fn migrate_album<S, T>(
    ctx: &StepContext<'_, S, T>,
    albums: &Properties,
    index: u32,
    report: &mut MigrationReport,
) where
    S: AlbumSource,
    T: AlbumTarget,
{
    match prepare_album(ctx, albums, index).await {
        Ok(Prepared::Ready {
            album,
            images,
            destination,
        }) => {
            ctx.events.handle_event(MigrationEvent::AlbumCreated {
                title: album.title.clone(),
                id: destination.id,
            });
            report.albums_created.push(destination.clone());
            photo::migrate_photos(ctx, &album, &images, &destination, report).await;
        }
        Ok(Prepared::Root(album)) => {
            ctx.events.handle_event(MigrationEvent::AlbumSkipped {
                title: album.title.clone(),
                reason: "root container album".to_string(),
            });
            report.albums_skipped.push(album.title);
        }
        Err((title, reason)) => {
            ctx.events.handle_event(MigrationEvent::AlbumFailed {
                title: title.clone(),
                reason: reason.clone(),
            });
            report.failures.push(MigrationFailure::album(title, reason));
        }
    }
}

/// On failure returns the album label and the reason
async fn prepare_album<S, T>(
    ctx: &StepContext<'_, S, T>,
    albums: &Properties,
    index: u32,
) -> Result<Prepared, (String, String)>
where
    S: AlbumSource,
    T: AlbumTarget,
{
    let album = SourceAlbum::from_record(albums, index)
        .map_err(|e| (SourceAlbum::label(albums, index), e.to_string()))?;
    let fail = |reason: String| (album.title.clone(), reason);

    debug!("Listing images of album {} ({})", album.title, album.name_id);
    let images = ctx
        .source
        .list_album_images(&album.name_id)
        .await
        .map_err(|e| fail(format!("image listing failed: {}", e)))?
        .ok_or_else(|| fail("image listing has no base URL".to_string()))?;

    if images.is_root(&ctx.options.root_album_caption) {
        return Ok(Prepared::Root(album));
    }

    let destination = ctx
        .target
        .create_album(&album.title, album.summary.as_deref())
        .await
        .map_err(|e| fail(format!("album creation failed: {}", e)))?
        .ok_or_else(|| fail("no album id returned".to_string()))?;

    Ok(Prepared::Ready {
        album,
        images,
        destination,
    })
}
