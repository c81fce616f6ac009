// HTTP clients for the two gallery services
//
// This module provides:
// - GalleryClient: read side, Gallery 2 GalleryRemote protocol
// - KokenClient: write side, Koken admin API
// - The properties codec and record grouping the Gallery responses need
// - A shared transport with optional localhost routing

pub mod api;
pub mod auth;
pub mod errors;
pub mod gallery_client;
pub mod koken_client;
pub mod properties;
pub mod records;
pub mod transport;
pub mod types;


pub use errors::{ClientError, ClientResult};
pub use gallery_client::GalleryClient;
pub use koken_client::KokenClient;
pub use properties::Properties;
pub use transport::HttpTransport;
pub use types::{
    AlbumImages, Credentials, DestinationAlbum, DestinationPhoto, SourceAlbum, SourceImage,
    ROOT_ALBUM_CAPTION,
};

use crate::services::config::AppConfig;

/// Both service clients built from one configuration
pub struct MigrationClient {
    pub gallery: GalleryClient,
    pub koken: KokenClient,
}

impl MigrationClient {
    pub fn from_config(config: &AppConfig) -> ClientResult<Self> {
        Ok(Self {
            gallery: GalleryClient::new(&config.gallery, &config.transport)?,
            koken: KokenClient::new(&config.koken, &config.transport)?,
        })
    }

    /// Log in to both services, Gallery first
    pub async fn authenticate(&self) -> ClientResult<()> {
        self.gallery.authenticate().await?;
        self.koken.authenticate().await
    }
}
