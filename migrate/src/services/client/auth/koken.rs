use tracing::{error, info, instrument};

use crate::services::client::errors::{ClientError, ClientResult};
use crate::services::client::KokenClient;

/// Post the configured email and password to `sessions`. Succeeds only if the
/// server set a session cookie.
#[instrument(skip(client), err)]
pub async fn koken_login_impl(client: &KokenClient) -> ClientResult<()> {
    info!(
        "Logging in to Koken at {} as {}",
        client.url, client.credentials.username
    );

    let response = client
        .transport
        .post(&client.api_url("sessions"))?
        .form(&[
            ("email", client.credentials.username.as_str()),
            ("password", client.credentials.password.as_str()),
        ])
        .send()
        .await?;

    let status = response.status();
    if client.has_session_cookie()? {
        info!("Koken login successful");
        return Ok(());
    }

    error!("Koken login returned HTTP {} without a session cookie", status);
    Err(ClientError::AuthenticationFailed {
        service: "Koken",
        message: format!("no session cookie set (HTTP {})", status),
    })
}
