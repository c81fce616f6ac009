use std::path::Path;

use anyhow::{bail, Context, Result};
use tracing::info;

use migrate::services::client::{GalleryClient, KokenClient};
use migrate::services::config::AppConfig;

fn gallery(config: &AppConfig) -> Result<GalleryClient> {
    config.validate_gallery()?;
    GalleryClient::new(&config.gallery, &config.transport).context("Failed to create Gallery client")
}

fn koken(config: &AppConfig) -> Result<KokenClient> {
    config.validate_koken()?;
    KokenClient::new(&config.koken, &config.transport).context("Failed to create Koken client")
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub async fn run_migration(config: &AppConfig) -> Result<()> {
    let report = migrate::migrate_albums(config)
        .await
        .context("Migration aborted")?;

    println!("{}", report.summary());
    for failure in &report.failures {
        println!("  skipped {}: {}", failure.scope, failure.reason);
    }
    if let Some(error) = &report.refresh_error {
        println!("  cache refresh failed: {}", error);
    }
    Ok(())
}

pub async fn gallery_login(config: &AppConfig) -> Result<()> {
    gallery(config)?
        .authenticate()
        .await
        .context("Gallery login failed")?;
    info!("Gallery login succeeded");
    Ok(())
}

pub async fn gallery_albums(config: &AppConfig) -> Result<()> {
    let albums = gallery(config)?
        .list_albums()
        .await
        .context("Failed to list albums")?;
    print_json(&albums)
}

pub async fn gallery_album_images(config: &AppConfig, album: &str) -> Result<()> {
    let Some(images) = gallery(config)?
        .list_album_images(album)
        .await
        .context("Failed to list album images")?
    else {
        bail!("No base URL found for album {}", album);
    };
    print_json(&images.properties)
}

pub async fn gallery_download(config: &AppConfig, album: &str, output: &Path) -> Result<()> {
    let written = gallery(config)?
        .fetch_album_image_files(album, output)
        .await
        .with_context(|| format!("Failed to download album {}", album))?;
    println!("downloaded {} images to {}", written, output.display());
    Ok(())
}

pub async fn koken_create_album(
    config: &AppConfig,
    title: &str,
    description: Option<&str>,
) -> Result<()> {
    match koken(config)?
        .create_album(title, description)
        .await
        .context("Failed to create album")?
    {
        Some(album) => {
            println!("created album: {}", album.id);
            Ok(())
        }
        None => bail!("Koken returned no album id for {}", title),
    }
}

pub async fn koken_upload_photo(config: &AppConfig, path: &Path) -> Result<()> {
    match koken(config)?
        .upload_photo_from_file(path)
        .await
        .with_context(|| format!("Failed to upload {}", path.display()))?
    {
        Some(photo) => {
            println!("uploaded photo: {}", photo.id);
            Ok(())
        }
        None => bail!("Koken returned no content id for {}", path.display()),
    }
}

pub async fn koken_reset_album_date(config: &AppConfig, album_id: u64) -> Result<()> {
    let timestamp = koken(config)?
        .reset_album_published_date(album_id)
        .await
        .with_context(|| format!("Failed to reset published date of album {}", album_id))?;
    println!("album {} published_on set to {}", album_id, timestamp);
    Ok(())
}
