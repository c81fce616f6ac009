use std::path::Path;

use bytes::Bytes;
use futures::stream::BoxStream;
use tokio::sync::RwLock;
use tracing::{debug, instrument};

use super::errors::{ClientError, ClientResult};
use super::properties::Properties;
use super::transport::{HttpTransport, TransportOptions};
use super::types::{AlbumImages, Credentials};
use crate::services::config::{GalleryConfig, TransportConfig};

/// Client for a Gallery 2 installation speaking the GalleryRemote protocol
pub struct GalleryClient {
    pub(crate) transport: HttpTransport,
    /// `main.php` entry point
    pub(crate) url: String,
    pub(crate) credentials: Credentials,
    auth_token: RwLock<Option<String>>,
    /// Download prefix of the most recently listed album
    album_base_url: RwLock<Option<String>>,
}

impl GalleryClient {
    pub fn new(config: &GalleryConfig, transport: &TransportConfig) -> ClientResult<Self> {
        let url = url::Url::parse(&config.base_url).map_err(|e| ClientError::InvalidUrl {
            url: config.base_url.clone(),
            message: e.to_string(),
        })?;

        let transport = HttpTransport::new(
            transport,
            &url,
            TransportOptions {
                local_routing: config.local,
                follow_redirects: true,
                ..Default::default()
            },
        )?;

        Ok(Self {
            transport,
            url: config.base_url.clone(),
            credentials: Credentials::new(config.username.as_deref(), config.password.as_deref()),
            auth_token: RwLock::new(None),
            album_base_url: RwLock::new(None),
        })
    }

    /// Log in unless a token is already held
    #[instrument(skip(self), err)]
    pub async fn authenticate(&self) -> ClientResult<()> {
        let mut token = self.auth_token.write().await;
        if token.is_some() {
            debug!("Gallery auth token already held");
            return Ok(());
        }

        *token = Some(super::auth::gallery_login_impl(self).await?);
        Ok(())
    }

    async fn token(&self) -> ClientResult<String> {
        self.authenticate().await?;
        self.auth_token
            .read()
            .await
            .clone()
            .ok_or_else(|| ClientError::AuthenticationFailed {
                service: "Gallery",
                message: "no auth token held".to_string(),
            })
    }

    /// All albums as raw `album.<field>.<n>` properties
    pub async fn list_albums(&self) -> ClientResult<Properties> {
        let token = self.token().await?;
        super::api::fetch_albums_impl(self, &token).await
    }

    /// Images (and sub-albums) of one album. Replaces the stored download
    /// prefix; `None` when the response has no `baseurl`. The previous album's
    /// prefix is dropped even when the listing fails.
    pub async fn list_album_images(&self, name_id: &str) -> ClientResult<Option<AlbumImages>> {
        let mut base_url = self.album_base_url.write().await;
        *base_url = None;

        let token = self.token().await?;
        let images = super::api::fetch_album_images_impl(self, &token, name_id).await?;

        *base_url = images.as_ref().map(|images| images.base_url.clone());
        Ok(images)
    }

    pub async fn album_base_url(&self) -> Option<String> {
        self.album_base_url.read().await.clone()
    }

    /// Stream one image of the most recently listed album
    pub async fn fetch_image_stream(
        &self,
        relative_path: &str,
    ) -> ClientResult<BoxStream<'static, ClientResult<Bytes>>> {
        let base_url = self
            .album_base_url()
            .await
            .ok_or_else(|| ClientError::PreconditionFailed {
                message: "image fetched before any album image listing".to_string(),
            })?;

        super::api::fetch_image_stream_impl(self, &base_url, relative_path).await
    }

    pub async fn fetch_image_bytes(&self, relative_path: &str) -> ClientResult<Bytes> {
        let stream = self.fetch_image_stream(relative_path).await?;
        super::api::collect_image_stream(stream).await
    }

    /// Download an album's images into `output_dir`; returns the number written
    pub async fn fetch_album_image_files(
        &self,
        name_id: &str,
        output_dir: &Path,
    ) -> ClientResult<usize> {
        super::api::fetch_album_image_files_impl(self, name_id, output_dir).await
    }
}
