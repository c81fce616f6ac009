use std::path::{Path, PathBuf};
use std::sync::Arc;

use bytes::Bytes;
use reqwest::cookie::{CookieStore, Jar};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use tokio::sync::Mutex;
use tracing::{debug, instrument};
use url::Url;

use super::errors::{ClientError, ClientResult};
use super::transport::{HttpTransport, TransportOptions};
use super::types::{Credentials, DestinationAlbum, DestinationPhoto};
use crate::services::config::{KokenConfig, TransportConfig};

/// Cookie Koken uses for its admin session
pub const SESSION_COOKIE: &str = "koken_session_ci";

/// Header selecting cookie authentication on every API request
pub const AUTH_HEADER: &str = "x-koken-auth";

/// Client for a Koken installation's admin API
pub struct KokenClient {
    pub(crate) transport: HttpTransport,
    /// Installation root, the directory holding `api.php`
    pub(crate) url: String,
    pub(crate) credentials: Credentials,
    pub(crate) upload_base_dir: PathBuf,
    cookies: Arc<Jar>,
    login: Mutex<()>,
}

impl KokenClient {
    pub fn new(config: &KokenConfig, transport: &TransportConfig) -> ClientResult<Self> {
        let url = Url::parse(&config.base_url).map_err(|e| ClientError::InvalidUrl {
            url: config.base_url.clone(),
            message: e.to_string(),
        })?;

        let cookies = Arc::new(Jar::default());
        let mut default_headers = HeaderMap::new();
        default_headers.insert(
            HeaderName::from_static(AUTH_HEADER),
            HeaderValue::from_static("cookie"),
        );

        let transport = HttpTransport::new(
            transport,
            &url,
            TransportOptions {
                local_routing: config.local,
                follow_redirects: false,
                default_headers,
                cookies: Some(cookies.clone()),
            },
        )?;

        Ok(Self {
            transport,
            url: config.base_url.trim_end_matches('/').to_string(),
            credentials: Credentials::new(config.email.as_deref(), config.password.as_deref()),
            upload_base_dir: config.upload_base_dir.clone(),
            cookies,
            login: Mutex::new(()),
        })
    }

    /// `<base>/api.php?/<route>`
    pub fn api_url(&self, route: &str) -> String {
        format!("{}/api.php?/{}", self.url, route)
    }

    /// Whether the jar holds a session cookie for the API endpoint
    pub fn has_session_cookie(&self) -> ClientResult<bool> {
        let api = self.transport.route(Url::parse(&self.api_url("sessions"))?)?;
        let prefix = format!("{}=", SESSION_COOKIE);

        Ok(self
            .cookies
            .cookies(&api)
            .and_then(|header| header.to_str().map(str::to_string).ok())
            .map(|header| {
                header
                    .split(';')
                    .any(|cookie| cookie.trim_start().starts_with(&prefix))
            })
            .unwrap_or(false))
    }

    /// Log in unless a session cookie is already held
    #[instrument(skip(self), err)]
    pub async fn authenticate(&self) -> ClientResult<()> {
        let _guard = self.login.lock().await;
        if self.has_session_cookie()? {
            debug!("Koken session already established");
            return Ok(());
        }
        super::auth::koken_login_impl(self).await
    }

    /// Create a public album; `None` when Koken returned no album id
    pub async fn create_album(
        &self,
        title: &str,
        summary: Option<&str>,
    ) -> ClientResult<Option<DestinationAlbum>> {
        self.authenticate().await?;
        super::api::create_album_impl(self, title, summary).await
    }

    pub async fn upload_photo_from_bytes(
        &self,
        data: Bytes,
        filename: &str,
    ) -> ClientResult<Option<DestinationPhoto>> {
        self.authenticate().await?;
        super::api::upload_photo_impl(self, data, filename).await
    }

    /// Upload a local file; relative paths resolve against the upload base directory
    pub async fn upload_photo_from_file(
        &self,
        path: &Path,
    ) -> ClientResult<Option<DestinationPhoto>> {
        self.authenticate().await?;
        super::api::upload_photo_from_file_impl(self, path).await
    }

    pub async fn attach_photo_to_album(&self, photo_id: u64, album_id: u64) -> ClientResult<()> {
        self.authenticate().await?;
        super::api::attach_photo_impl(self, photo_id, album_id).await
    }

    pub async fn refresh_system_caches(&self) -> ClientResult<()> {
        self.authenticate().await?;
        super::api::refresh_system_caches_impl(self).await
    }

    /// Returns the capture timestamp applied as the published date
    pub async fn reset_album_published_date(&self, album_id: u64) -> ClientResult<i64> {
        self.authenticate().await?;
        super::api::reset_album_published_date_impl(self, album_id).await
    }
}
