//! Seams between the orchestrator and the two services

use async_trait::async_trait;
use bytes::Bytes;

use crate::services::client::{
    AlbumImages, ClientResult, DestinationAlbum, DestinationPhoto, Properties,
};

/// Read side of a migration
#[async_trait]
pub trait AlbumSource: Send + Sync {
    async fn authenticate(&self) -> ClientResult<()>;

    /// Raw album listing with `album.<field>.<n>` records
    async fn list_albums(&self) -> ClientResult<Properties>;

    /// Image listing of one album; `None` when it cannot be downloaded from
    async fn list_album_images(&self, name_id: &str) -> ClientResult<Option<AlbumImages>>;

    /// Bytes of an image of the album listed last
    async fn fetch_image_bytes(&self, relative_path: &str) -> ClientResult<Bytes>;
}

/// Write side of a migration
#[async_trait]
pub trait AlbumTarget: Send + Sync {
    async fn authenticate(&self) -> ClientResult<()>;

    async fn create_album(
        &self,
        title: &str,
        summary: Option<&str>,
    ) -> ClientResult<Option<DestinationAlbum>>;

    async fn upload_photo_bytes(
        &self,
        data: Bytes,
        filename: &str,
    ) -> ClientResult<Option<DestinationPhoto>>;

    async fn attach_photo_to_album(&self, photo_id: u64, album_id: u64) -> ClientResult<()>;

    async fn refresh_system_caches(&self) -> ClientResult<()>;
}
