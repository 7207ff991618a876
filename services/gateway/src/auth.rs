//! OAuth2 client-credentials handshake against the platform's login service.

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tracing::{debug, info, instrument};

/// Bearer token presented on the WebSocket handshake.
///
/// Obtained once at startup and never refreshed.
#[derive(Clone, Debug)]
pub struct AccessToken(SecretString);

impl AccessToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(SecretString::from(token.into()))
    }

    pub fn secret(&self) -> &str {
        self.0.expose_secret()
    }

    /// Value for an `Authorization` header.
    pub fn bearer_header(&self) -> String {
        format!("Bearer {}", self.0.expose_secret())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("token request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("token endpoint returned HTTP {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },
    #[error("token endpoint returned malformed JSON: {source}. Response text was: {body}")]
    MalformedResponse {
        #[source]
        source: serde_json::Error,
        body: String,
    },
    #[error("'access_token' missing from token response: {error} - {description}")]
    MissingToken { error: String, description: String },
}

#[derive(Deserialize, Debug)]
struct TokenResponse {
    access_token: Option<String>,
    token_type: Option<String>,
    expires_in: Option<u64>,
    error: Option<String>,
    error_description: Option<String>,
}

/// Exchanges client credentials for a bearer token.
pub struct Authenticator {
    http: reqwest::Client,
    auth_url: String,
    client_id: String,
    client_secret: SecretString,
}

impl Authenticator {
    pub fn new(auth_url: String, client_id: String, client_secret: SecretString) -> Self {
        Self {
            http: reqwest::Client::new(),
            auth_url,
            client_id,
            client_secret,
        }
    }

    /// Performs a single `grant_type=client_credentials` request.
    ///
    /// Any non-2xx status, unparsable body or missing `access_token` is an
    /// error; nothing is retried.
    #[instrument(name = "authenticate", skip(self), fields(url = %self.auth_url))]
    pub async fn fetch_token(&self) -> Result<AccessToken, AuthError> {
        info!("Requesting access token");
        let response = self
            .http
            .post(&self.auth_url)
            .basic_auth(&self.client_id, Some(self.client_secret.expose_secret()))
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await?;

        let status = response.status();
        debug!(%status, headers = ?response.headers(), "Token endpoint responded");
        let body = response.text().await?;

        if !status.is_success() {
            return Err(AuthError::Status { status, body });
        }

        let parsed: TokenResponse = serde_json::from_str(&body)
            .map_err(|source| AuthError::MalformedResponse { source, body })?;

        match parsed.access_token {
            Some(token) => {
                info!(
                    token_type = parsed.token_type.as_deref().unwrap_or("unknown"),
                    expires_in = ?parsed.expires_in,
                    "Access token received"
                );
                Ok(AccessToken::new(token))
            }
            None => Err(AuthError::MissingToken {
                error: parsed.error.unwrap_or_else(|| "Unknown error".to_string()),
                description: parsed
                    .error_description
                    .unwrap_or_else(|| "No description".to_string()),
            }),
        }
    }
}
