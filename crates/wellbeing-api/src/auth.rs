// Wellbeing authentication handshake
//
// Two steps: an unauthenticated GET hands out a long-lived client token,
// which is then used as the bearer for the credential login that yields
// the short-lived access token.

use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use tracing::debug;

use crate::error::Error;
use crate::models::TokenResponse;
use crate::transport::Endpoints;

/// Username/password pair for the Wellbeing account.
///
/// Captured once per client; changing it requires a new client.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub username: String,
    pub password: SecretString,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: SecretString::from(password.into()),
        }
    }
}

#[derive(Serialize)]
struct LoginRequest<'a> {
    #[serde(rename = "Username")]
    username: &'a str,
    password: &'a str,
}

/// Fetch the bootstrap client token.
///
/// `GET {client_token_url}` → `{accessToken}`
pub async fn fetch_client_token(
    http: &reqwest::Client,
    endpoints: &Endpoints,
) -> Result<SecretString, Error> {
    let url = endpoints.client_token_url.clone();
    debug!("fetching client token from {}", url);

    let resp = http
        .get(url)
        .send()
        .await
        .map_err(|e| Error::AuthBootstrap {
            message: format!("client token endpoint unreachable: {e}"),
        })?;

    let status = resp.status();
    if !status.is_success() {
        return Err(Error::AuthBootstrap {
            message: format!("client token endpoint returned HTTP {status}"),
        });
    }

    let body = resp.text().await.map_err(|e| Error::AuthBootstrap {
        message: format!("failed to read client token body: {e}"),
    })?;

    extract_token(&body).ok_or_else(|| Error::AuthBootstrap {
        message: "response has no accessToken field".into(),
    })
}

/// Exchange credentials for an access token.
///
/// `POST {base}/Users/Login` with `{"Username", "password"}` and the
/// client token as bearer. Any non-2xx answer is a rejection; the error
/// body is not inspected.
pub async fn login(
    http: &reqwest::Client,
    endpoints: &Endpoints,
    credentials: &Credentials,
    client_token: &SecretString,
) -> Result<SecretString, Error> {
    let url = endpoints.api_url(&["Users", "Login"])?;
    debug!(username = %credentials.username, "logging in at {}", url);

    let body = LoginRequest {
        username: &credentials.username,
        password: credentials.password.expose_secret(),
    };

    let resp = http
        .post(url)
        .bearer_auth(client_token.expose_secret())
        .json(&body)
        .send()
        .await?;

    let status = resp.status();
    if !status.is_success() {
        return Err(Error::InvalidCredentials {
            message: format!("login failed (HTTP {status})"),
        });
    }

    let text = resp.text().await?;
    let token = extract_token(&text).ok_or_else(|| Error::InvalidCredentials {
        message: "login response has no accessToken field".into(),
    })?;

    debug!("login successful");
    Ok(token)
}

fn extract_token(body: &str) -> Option<SecretString> {
    serde_json::from_str::<TokenResponse>(body)
        .ok()
        .and_then(|r| r.access_token)
        .filter(|t| !t.is_empty())
        .map(SecretString::from)
}
