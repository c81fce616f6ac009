//! GalleryRemote protocol operations
//!
//! Every call is a form-encoded POST to the Gallery `main.php` entry point
//! carrying `g2_controller=remote:GalleryRemote`; responses are properties text.

use std::path::{Path, PathBuf};

use bytes::{Bytes, BytesMut};
use futures::stream::BoxStream;
use futures::StreamExt;
use tokio::io::AsyncWriteExt;
use tracing::{debug, error, info, instrument, warn};

use crate::services::client::errors::{ClientError, ClientResult};
use crate::services::client::properties::{self, Properties};
use crate::services::client::types::AlbumImages;
use crate::services::client::GalleryClient;

/// Protocol version for login and album listing
pub const LOGIN_PROTOCOL: &str = "2.0";

/// Protocol version that supports `albums_too` on image listings
pub const IMAGES_PROTOCOL: &str = "2.4";

const CONTROLLER: &str = "remote:GalleryRemote";

/// Form body of one GalleryRemote command
#[derive(Debug, Clone)]
pub struct RemoteCommand {
    fields: Vec<(String, String)>,
}

impl RemoteCommand {
    pub fn new(cmd: &str, protocol_version: &str) -> Self {
        Self {
            fields: vec![
                ("g2_controller".to_string(), CONTROLLER.to_string()),
                ("g2_form[cmd]".to_string(), cmd.to_string()),
                (
                    "g2_form[protocol_version]".to_string(),
                    protocol_version.to_string(),
                ),
            ],
        }
    }

    /// Add `g2_form[<name>]=<value>`
    pub fn field(mut self, name: &str, value: &str) -> Self {
        self.fields
            .push((format!("g2_form[{}]", name), value.to_string()));
        self
    }

    pub fn auth_token(self, token: &str) -> Self {
        self.field("g2_authToken", token)
    }

    pub fn fields(&self) -> &[(String, String)] {
        &self.fields
    }
}

/// Send a command and decode the properties response. A non-zero `status`
/// is logged but left for the caller to interpret.
pub async fn post_remote_command(
    client: &GalleryClient,
    command: RemoteCommand,
) -> ClientResult<Properties> {
    let response = client
        .transport
        .post(&client.url)?
        .form(command.fields())
        .send()
        .await?
        .error_for_status()?;

    let body = response.bytes().await?;
    let decoded = properties::decode_bytes(&body)?;

    if let Some(status) = decoded.get("status").filter(|status| *status != "0") {
        warn!(
            "GalleryRemote returned status {}: {}",
            status,
            decoded.get("status_text").unwrap_or("")
        );
    }

    Ok(decoded)
}

#[instrument(skip(client, token), err)]
pub async fn fetch_albums_impl(client: &GalleryClient, token: &str) -> ClientResult<Properties> {
    let command = RemoteCommand::new("fetch-albums", LOGIN_PROTOCOL).auth_token(token);
    let albums = post_remote_command(client, command).await?;
    debug!("fetch-albums returned {} properties", albums.len());
    Ok(albums)
}

#[instrument(skip(client, token), err)]
pub async fn fetch_album_images_impl(
    client: &GalleryClient,
    token: &str,
    name_id: &str,
) -> ClientResult<Option<AlbumImages>> {
    let command = RemoteCommand::new("fetch-album-images", IMAGES_PROTOCOL)
        .field("albums_too", "yes")
        .field("set_albumName", name_id)
        .auth_token(token);

    let response = post_remote_command(client, command).await?;

    match AlbumImages::from_properties(name_id, response) {
        Some(images) => Ok(Some(images)),
        None => {
            error!("No base URL found for album: {}", name_id);
            Ok(None)
        }
    }
}

/// Streamed GET of `base_url + relative_path`
pub async fn fetch_image_stream_impl(
    client: &GalleryClient,
    base_url: &str,
    relative_path: &str,
) -> ClientResult<BoxStream<'static, ClientResult<Bytes>>> {
    let url = format!("{}{}", base_url, relative_path);
    debug!("Fetching image {}", url);

    let response = client.transport.get(&url)?.send().await?;
    if !response.status().is_success() {
        return Err(ClientError::NetworkError {
            message: format!("Image fetch of {} failed: HTTP {}", url, response.status()),
        });
    }

    Ok(response
        .bytes_stream()
        .map(|chunk| chunk.map_err(ClientError::from))
        .boxed())
}

/// Drain an image stream into one buffer
pub async fn collect_image_stream(
    mut stream: BoxStream<'static, ClientResult<Bytes>>,
) -> ClientResult<Bytes> {
    let mut buffer = BytesMut::new();
    while let Some(chunk) = stream.next().await {
        buffer.extend_from_slice(&chunk?);
    }
    Ok(buffer.freeze())
}

/// Download every image of an album into `output_dir`, returning the number
/// of files written. Images that cannot be resolved or downloaded are skipped.
#[instrument(skip(client), err)]
pub async fn fetch_album_image_files_impl(
    client: &GalleryClient,
    name_id: &str,
    output_dir: &Path,
) -> ClientResult<usize> {
    let images = client
        .list_album_images(name_id)
        .await?
        .ok_or_else(|| ClientError::NotFound {
            what: format!("image listing for album {}", name_id),
        })?;

    tokio::fs::create_dir_all(output_dir).await?;

    let mut written = 0;
    for index in images.image_indices() {
        let image = match images.image(index) {
            Ok(image) => image,
            Err(e) => {
                warn!("Skipping image {}: {}", images.image_label(index), e);
                continue;
            }
        };

        let Some(target) = local_image_path(output_dir, &image.filename) else {
            warn!("Skipping image with unusable file name: {}", image.filename);
            continue;
        };

        let result = async {
            let stream = client.fetch_image_stream(&image.remote_path).await?;
            write_stream_to_file(stream, &target).await
        }
        .await;

        match result {
            Ok(size) => {
                debug!("Wrote {} ({} bytes)", target.display(), size);
                written += 1;
            }
            Err(e) => {
                warn!("Failed to download {}: {}", image.filename, e);
                // Partial file, if any, is useless
                let _ = tokio::fs::remove_file(&target).await;
            }
        }
    }

    info!(
        "Downloaded {} images of album {} to {}",
        written,
        name_id,
        output_dir.display()
    );
    Ok(written)
}

/// Target path for a downloaded image; directory parts of the title are dropped
pub fn local_image_path(output_dir: &Path, filename: &str) -> Option<PathBuf> {
    Path::new(filename)
        .file_name()
        .map(|name| output_dir.join(name))
}

async fn write_stream_to_file(
    mut stream: BoxStream<'static, ClientResult<Bytes>>,
    path: &Path,
) -> ClientResult<u64> {
    let mut file = tokio::fs::File::create(path).await?;
    let mut size = 0u64;

    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        file.write_all(&chunk).await?;
        size += chunk.len() as u64;
    }

    file.flush().await?;
    Ok(size)
}
