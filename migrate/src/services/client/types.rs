use std::fmt;

use serde::{Deserialize, Serialize};

use super::errors::{ClientError, ClientResult};
use super::properties::Properties;
use super::records;

/// Caption Gallery gives its top-level container album
pub const ROOT_ALBUM_CAPTION: &str = "Gallery";

/// Record kind of album entries in GalleryRemote responses
pub const ALBUM_RECORD: &str = "album";

/// Record kind of image entries in GalleryRemote responses
pub const IMAGE_RECORD: &str = "image";

/// Username/password pair for either service. The password never appears in
/// debug output.
#[derive(Clone, Default)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: Option<&str>, password: Option<&str>) -> Self {
        Self {
            username: username.unwrap_or_default().to_string(),
            password: password.unwrap_or_default().to_string(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Album record from a Gallery `fetch-albums` response
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceAlbum {
    pub index: u32,
    /// Opaque album name sent back as `set_albumName`
    pub name_id: String,
    pub title: String,
    pub summary: Option<String>,
}

impl SourceAlbum {
    /// Build the album stored under `album.*.<index>`. The name is required;
    /// a missing title falls back to the name.
    pub fn from_record(properties: &Properties, index: u32) -> ClientResult<Self> {
        let name_id = records::field(properties, ALBUM_RECORD, "name", index)
            .filter(|name| !name.is_empty())
            .ok_or_else(|| ClientError::MissingField {
                key: format!("{}.name.{}", ALBUM_RECORD, index),
            })?;

        let title = records::field(properties, ALBUM_RECORD, "title", index)
            .filter(|title| !title.is_empty())
            .unwrap_or(name_id);

        let summary = records::field(properties, ALBUM_RECORD, "summary", index)
            .filter(|summary| !summary.is_empty())
            .map(str::to_string);

        Ok(Self {
            index,
            name_id: name_id.to_string(),
            title: title.to_string(),
            summary,
        })
    }

    /// Display label used in logs when the record is unusable
    pub fn label(properties: &Properties, index: u32) -> String {
        records::field(properties, ALBUM_RECORD, "title", index)
            .or_else(|| records::field(properties, ALBUM_RECORD, "name", index))
            .map(str::to_string)
            .unwrap_or_else(|| format!("album #{}", index))
    }
}

/// Image record from a Gallery `fetch-album-images` response
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceImage {
    pub index: u32,
    /// Display name, also used as the destination file name
    pub filename: String,
    /// Path appended to the album's base URL to download the image
    pub remote_path: String,
}

impl SourceImage {
    pub fn from_record(properties: &Properties, index: u32) -> ClientResult<Self> {
        let filename = records::field(properties, IMAGE_RECORD, "title", index)
            .filter(|title| !title.is_empty())
            .ok_or_else(|| ClientError::MissingField {
                key: format!("{}.title.{}", IMAGE_RECORD, index),
            })?;

        let remote_path = records::field(properties, IMAGE_RECORD, "name", index)
            .filter(|name| !name.is_empty())
            .ok_or_else(|| ClientError::MissingField {
                key: format!("{}.name.{}", IMAGE_RECORD, index),
            })?;

        Ok(Self {
            index,
            filename: filename.to_string(),
            remote_path: remote_path.to_string(),
        })
    }

    pub fn label(properties: &Properties, index: u32) -> String {
        records::field(properties, IMAGE_RECORD, "title", index)
            .or_else(|| records::field(properties, IMAGE_RECORD, "name", index))
            .map(str::to_string)
            .unwrap_or_else(|| format!("image #{}", index))
    }
}

/// Decoded `fetch-album-images` response for one album
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AlbumImages {
    pub name_id: String,
    /// Download prefix for this album's images. Never valid for another album.
    pub base_url: String,
    pub caption: Option<String>,
    pub properties: Properties,
}

impl AlbumImages {
    /// Returns `None` when the response carries no `baseurl`
    pub fn from_properties(name_id: &str, properties: Properties) -> Option<Self> {
        let base_url = properties.get("baseurl")?.to_string();
        let caption = properties.get("album.caption").map(str::to_string);

        Some(Self {
            name_id: name_id.to_string(),
            base_url,
            caption,
            properties,
        })
    }

    pub fn is_root(&self, root_caption: &str) -> bool {
        self.caption.as_deref() == Some(root_caption)
    }

    /// Indices of entries carrying an `image.name`. Sub-album entries of the
    /// listing have none and are left out.
    pub fn image_indices(&self) -> Vec<u32> {
        records::indices_for(&self.properties, &format!("{}.name", IMAGE_RECORD))
            .into_iter()
            .collect()
    }

    pub fn image(&self, index: u32) -> ClientResult<SourceImage> {
        SourceImage::from_record(&self.properties, index)
    }

    pub fn image_label(&self, index: u32) -> String {
        SourceImage::label(&self.properties, index)
    }
}

/// Album created on Koken
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DestinationAlbum {
    pub id: u64,
    pub title: String,
    pub summary: Option<String>,
}

/// Photo uploaded to Koken
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DestinationPhoto {
    pub id: u64,
    pub filename: String,
}

/// `albums/<id>/content` listing, reduced to what the published-date backfill reads
#[derive(Deserialize, Debug, Clone)]
pub struct KokenAlbumContent {
    #[serde(default)]
    pub content: Vec<KokenContentItem>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct KokenContentItem {
    pub id: Option<u64>,
    pub captured_on: KokenDate,
}

#[derive(Deserialize, Debug, Clone)]
pub struct KokenDate {
    pub timestamp: i64,
    pub datetime: Option<String>,
}
