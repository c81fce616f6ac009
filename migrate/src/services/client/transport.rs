//! Shared HTTP transport for both gallery clients.
//!
//! Wraps a `reqwest::Client` with the uniform timeout and user agent from
//! [`TransportConfig`], and optionally routes every request to `localhost`
//! while presenting the configured hostname as the `Host` header. That lets
//! the tool run on the web server itself and reach a name-based virtual host
//! without DNS changes.

use std::sync::Arc;
use std::time::Duration;

use reqwest::cookie::Jar;
use reqwest::header::{HeaderMap, HOST};
use reqwest::{redirect, Client, Method, RequestBuilder};
use tracing::debug;
use url::Url;

use super::errors::{ClientError, ClientResult};
use crate::services::config::TransportConfig;

/// Host every locally routed request is sent to
pub const LOCAL_HOST: &str = "localhost";

/// Per-client transport options decided at construction
#[derive(Debug, Clone, Default)]
pub struct TransportOptions {
    /// Route to localhost, sending the service host as virtual host
    pub local_routing: bool,
    /// Follow HTTP redirects (disabled where ids are read from `Location`)
    pub follow_redirects: bool,
    /// Headers added to every request
    pub default_headers: HeaderMap,
    /// Cookie jar shared across requests
    pub cookies: Option<Arc<Jar>>,
}

/// HTTP client with optional local routing
#[derive(Clone)]
pub struct HttpTransport {
    client: Client,
    virtual_host: Option<String>,
}

impl HttpTransport {
    /// Build a transport for the service at `service_url`
    pub fn new(
        config: &TransportConfig,
        service_url: &Url,
        options: TransportOptions,
    ) -> ClientResult<Self> {
        let mut builder = Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .default_headers(options.default_headers)
            .connection_verbose(config.http_debug);

        if !options.follow_redirects {
            builder = builder.redirect(redirect::Policy::none());
        }

        if let Some(jar) = options.cookies {
            builder = builder.cookie_provider(jar);
        }

        let client = builder.build().map_err(|e| ClientError::NetworkError {
            message: format!("Failed to create HTTP client: {}", e),
        })?;

        let virtual_host = if options.local_routing {
            let host = virtual_host_of(service_url).ok_or_else(|| ClientError::InvalidUrl {
                url: service_url.to_string(),
                message: "local routing needs a URL with a host".to_string(),
            })?;
            debug!("Routing requests for {} through {}", host, LOCAL_HOST);
            Some(host)
        } else {
            None
        };

        Ok(Self {
            client,
            virtual_host,
        })
    }

    pub fn is_local(&self) -> bool {
        self.virtual_host.is_some()
    }

    /// The URL a request for `url` is actually sent to
    pub fn route(&self, url: Url) -> ClientResult<Url> {
        if self.virtual_host.is_some() {
            route_to_localhost(&url)
        } else {
            Ok(url)
        }
    }

    pub fn request(&self, method: Method, url: &str) -> ClientResult<RequestBuilder> {
        let parsed = Url::parse(url).map_err(|e| ClientError::InvalidUrl {
            url: url.to_string(),
            message: e.to_string(),
        })?;
        let routed = self.route(parsed)?;

        let mut builder = self.client.request(method, routed);
        if let Some(host) = &self.virtual_host {
            builder = builder.header(HOST, host.as_str());
        }
        Ok(builder)
    }

    pub fn get(&self, url: &str) -> ClientResult<RequestBuilder> {
        self.request(Method::GET, url)
    }

    pub fn post(&self, url: &str) -> ClientResult<RequestBuilder> {
        self.request(Method::POST, url)
    }
}

/// Replace host and port of `url` with [`LOCAL_HOST`]
pub fn route_to_localhost(url: &Url) -> ClientResult<Url> {
    let mut routed = url.clone();
    routed
        .set_host(Some(LOCAL_HOST))
        .map_err(|e| ClientError::InvalidUrl {
            url: url.to_string(),
            message: e.to_string(),
        })?;
    routed.set_port(None).map_err(|_| ClientError::InvalidUrl {
        url: url.to_string(),
        message: "cannot clear port".to_string(),
    })?;
    Ok(routed)
}

/// `host[:port]` of `url`, as sent in a `Host` header
pub fn virtual_host_of(url: &Url) -> Option<String> {
    let host = url.host_str()?;
    Some(match url.port() {
        Some(port) => format!("{}:{}", host, port),
        None => host.to_string(),
    })
}
