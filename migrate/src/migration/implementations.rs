//! `AlbumSource`/`AlbumTarget` for the concrete Gallery and Koken clients

use async_trait::async_trait;
use bytes::Bytes;

use super::traits::{AlbumSource, AlbumTarget};
use crate::services::client::{
    AlbumImages, ClientResult, DestinationAlbum, DestinationPhoto, GalleryClient, KokenClient,
    Properties,
};

#[async_trait]
impl AlbumSource for GalleryClient {
    async fn authenticate(&self) -> ClientResult<()> {
        GalleryClient::authenticate(self).await
    }

    async fn list_albums(&self) -> ClientResult<Properties> {
        GalleryClient::list_albums(self).await
    }

    async fn list_album_images(&self, name_id: &str) -> ClientResult<Option<AlbumImages>> {
        GalleryClient::list_album_images(self, name_id).await
    }

    async fn fetch_image_bytes(&self, relative_path: &str) -> ClientResult<Bytes> {
        GalleryClient::fetch_image_bytes(self, relative_path).await
    }
}

#[async_trait]
impl AlbumTarget for KokenClient {
    async fn authenticate(&self) -> ClientResult<()> {
        KokenClient::authenticate(self).await
    }

    async fn create_album(
        &self,
        title: &str,
        summary: Option<&str>,
    ) -> ClientResult<Option<DestinationAlbum>> {
        KokenClient::create_album(self, title, summary).await
    }

    async fn upload_photo_bytes(
        &self,
        data: Bytes,
        filename: &str,
    ) -> ClientResult<Option<DestinationPhoto>> {
        KokenClient::upload_photo_from_bytes(self, data, filename).await
    }

    async fn attach_photo_to_album(&self, photo_id: u64, album_id: u64) -> ClientResult<()> {
        KokenClient::attach_photo_to_album(self, photo_id, album_id).await
    }

    async fn refresh_system_caches(&self) -> ClientResult<()> {
        KokenClient::refresh_system_caches(self).await
    }
}
