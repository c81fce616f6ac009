use tracing::{error, info, instrument};

use crate::services::client::api::{post_remote_command, RemoteCommand, LOGIN_PROTOCOL};
use crate::services::client::errors::{ClientError, ClientResult};
use crate::services::client::GalleryClient;

/// Log in with the configured username and password and return the auth token
#[instrument(skip(client), err)]
pub async fn gallery_login_impl(client: &GalleryClient) -> ClientResult<String> {
    info!(
        "Logging in to Gallery at {} as {}",
        client.url, client.credentials.username
    );

    let command = RemoteCommand::new("login", LOGIN_PROTOCOL)
        .field("uname", &client.credentials.username)
        .field("password", &client.credentials.password);

    let response = post_remote_command(client, command).await?;

    match response.get("auth_token").filter(|token| !token.is_empty()) {
        Some(token) => {
            info!("Gallery login successful");
            Ok(token.to_string())
        }
        None => {
            let message = response
                .get("status_text")
                .map(|text| format!("no auth token returned ({})", text))
                .unwrap_or_else(|| "no auth token returned".to_string());
            error!("Gallery login failed: {}", message);
            Err(ClientError::AuthenticationFailed {
                service: "Gallery",
                message,
            })
        }
    }
}
