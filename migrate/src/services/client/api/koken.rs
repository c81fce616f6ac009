//! Koken API operations
//!
//! Koken has no documented API; these calls mirror what its admin web
//! interface sends. Created resources are identified by the trailing number
//! of the redirect `Location`, so redirects are never followed.

use std::path::Path;

use bytes::Bytes;
use reqwest::header::LOCATION;
use reqwest::multipart::{Form, Part};
use reqwest::{Body, Response};
use tracing::{debug, error, info, instrument, warn};

use crate::services::client::errors::{ClientError, ClientResult};
use crate::services::client::types::{DestinationAlbum, DestinationPhoto, KokenAlbumContent};
use crate::services::client::KokenClient;

/// Trailing decimal id of a `Location` value, e.g. `/albums/42` → 42
pub fn id_from_location(location: &str) -> Option<u64> {
    let rest = location.trim_end_matches(|c: char| c.is_ascii_digit());
    let digits = &location[rest.len()..];
    if digits.is_empty() {
        return None;
    }
    digits.parse().ok()
}

/// Id carried by a redirect response, if it is one
pub fn redirect_id(response: &Response) -> Option<u64> {
    if !response.status().is_redirection() {
        return None;
    }
    response
        .headers()
        .get(LOCATION)
        .and_then(|value| value.to_str().ok())
        .and_then(id_from_location)
}

#[instrument(skip(client), err)]
pub async fn create_album_impl(
    client: &KokenClient,
    title: &str,
    summary: Option<&str>,
) -> ClientResult<Option<DestinationAlbum>> {
    let response = client
        .transport
        .post(&client.api_url("albums"))?
        .form(&[
            ("title", title),
            ("album_type", "0"),
            ("visibility", "public"),
        ])
        .send()
        .await?;

    let Some(id) = redirect_id(&response) else {
        error!(
            "Album creation for '{}' returned HTTP {} without an album id",
            title,
            response.status()
        );
        return Ok(None);
    };

    info!("Created Koken album {} ({})", id, title);

    let summary = summary.filter(|summary| !summary.is_empty());
    if let Some(summary) = summary {
        if let Err(e) = update_album_summary_impl(client, id, summary).await {
            warn!("Failed to set description of album {}: {}", id, e);
        }
    }

    Ok(Some(DestinationAlbum {
        id,
        title: title.to_string(),
        summary: summary.map(str::to_string),
    }))
}

async fn update_album_summary_impl(
    client: &KokenClient,
    album_id: u64,
    summary: &str,
) -> ClientResult<()> {
    client
        .transport
        .post(&client.api_url(&format!("albums/{}", album_id)))?
        .form(&[
            ("summary", summary),
            ("description", summary),
            ("_method", "PUT"),
        ])
        .send()
        .await?
        .error_for_status()?;
    Ok(())
}

#[instrument(skip(client, data), fields(size = data.len()), err)]
pub async fn upload_photo_impl(
    client: &KokenClient,
    data: Bytes,
    filename: &str,
) -> ClientResult<Option<DestinationPhoto>> {
    let mime = mime_guess::from_path(filename).first_or_octet_stream();
    let length = data.len() as u64;

    let part = Part::stream_with_length(Body::from(data), length)
        .file_name(filename.to_string())
        .mime_str(mime.as_ref())?;

    let form = Form::new()
        .text("name", filename.to_string())
        .text("visibility", "public")
        .text("max_download", "none")
        .text("license", "all")
        .text(
            "upload_session_start",
            chrono::Utc::now().timestamp().to_string(),
        )
        .part("file", part);

    let response = client
        .transport
        .post(&client.api_url("content"))?
        .multipart(form)
        .send()
        .await?;

    match redirect_id(&response) {
        Some(id) => {
            debug!("Uploaded {} as Koken content {}", filename, id);
            Ok(Some(DestinationPhoto {
                id,
                filename: filename.to_string(),
            }))
        }
        None => {
            error!(
                "Upload of {} returned HTTP {} without a content id",
                filename,
                response.status()
            );
            Ok(None)
        }
    }
}

#[instrument(skip(client), err)]
pub async fn upload_photo_from_file_impl(
    client: &KokenClient,
    path: &Path,
) -> ClientResult<Option<DestinationPhoto>> {
    let candidate = client.upload_base_dir.join(path);

    let is_file = tokio::fs::metadata(&candidate)
        .await
        .map(|metadata| metadata.is_file())
        .unwrap_or(false);
    if !is_file {
        error!("File not found: {}", candidate.display());
        return Err(ClientError::NotFound {
            what: candidate.display().to_string(),
        });
    }

    let real_path = tokio::fs::canonicalize(&candidate).await?;
    let filename = real_path
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| ClientError::NotFound {
            what: format!("file name of {}", real_path.display()),
        })?
        .to_string();

    let data = tokio::fs::read(&real_path).await?;
    upload_photo_impl(client, Bytes::from(data), &filename).await
}

/// Attach existing content to an album. Only transport errors surface.
#[instrument(skip(client), err)]
pub async fn attach_photo_impl(
    client: &KokenClient,
    photo_id: u64,
    album_id: u64,
) -> ClientResult<()> {
    let response = client
        .transport
        .post(&client.api_url(&format!("albums/{}/content/{}", album_id, photo_id)))?
        .send()
        .await?;

    debug!(
        "Attached content {} to album {} (HTTP {})",
        photo_id,
        album_id,
        response.status()
    );
    Ok(())
}

/// Same requests as the "Clear System Caches" button in the admin settings
#[instrument(skip(client), err)]
pub async fn refresh_system_caches_impl(client: &KokenClient) -> ClientResult<()> {
    let mut first_error = None;

    for route in ["update/migrate/schema", "system/clear_caches"] {
        let result = async {
            client
                .transport
                .post(&client.api_url(route))?
                .send()
                .await?;
            Ok::<_, ClientError>(())
        }
        .await;

        if let Err(e) = result {
            warn!("Cache refresh request {} failed: {}", route, e);
            first_error.get_or_insert(e);
        }
    }

    match first_error {
        Some(e) => Err(e),
        None => {
            info!("Koken system caches cleared");
            Ok(())
        }
    }
}

/// Set an album's published date to the capture time of its first photo
#[instrument(skip(client), err)]
pub async fn reset_album_published_date_impl(
    client: &KokenClient,
    album_id: u64,
) -> ClientResult<i64> {
    let body = client
        .transport
        .get(&client.api_url(&format!("albums/{}/content/limit:1", album_id)))?
        .send()
        .await?
        .error_for_status()?
        .bytes()
        .await?;

    let listing: KokenAlbumContent = serde_json::from_slice(&body)?;
    let timestamp = listing
        .content
        .first()
        .map(|item| item.captured_on.timestamp)
        .ok_or_else(|| ClientError::NotFound {
            what: format!("photos in album {}", album_id),
        })?;

    client
        .transport
        .post(&client.api_url(&format!("albums/{}", album_id)))?
        .form(&[
            ("published_on", timestamp.to_string()),
            ("_method", "PUT".to_string()),
        ])
        .send()
        .await?
        .error_for_status()?;

    info!("Album {} published date set to {}", album_id, timestamp);
    Ok(timestamp)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_from_location() {
        assert_eq!(id_from_location("/koken/api.php?/albums/42"), Some(42));
        assert_eq!(id_from_location("http://host/api.php?/content/100"), Some(100));
        assert_eq!(id_from_location("7"), Some(7));
        assert_eq!(id_from_location("/albums/42/"), None);
        assert_eq!(id_from_location("/albums"), None);
        assert_eq!(id_from_location(""), None);
    }
}
