// Authenticated Wellbeing HTTP client
//
// Wraps `reqwest::Client` with the bearer access token and a single
// refresh-and-retry step: when a response comes back with one of the
// refresh status codes, the client logs in again with the client token it
// bootstrapped with, swaps in the new access token, and re-issues the
// failed request exactly once.

use std::sync::Arc;

use arc_swap::ArcSwap;
use reqwest::{Method, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, error, trace};
use url::Url;

use crate::auth::{self, Credentials};
use crate::error::Error;
use crate::transport::{Endpoints, TransportConfig};

/// Statuses that trigger a re-login before the request is reported failed.
pub const REFRESH_STATUS_CODES: [u16; 9] = [400, 401, 403, 408, 429, 500, 502, 503, 504];

fn needs_refresh(status: StatusCode) -> bool {
    REFRESH_STATUS_CODES.contains(&status.as_u16())
}

/// HTTP client holding a live Wellbeing session.
///
/// The access token is swapped atomically on refresh; a request already in
/// flight keeps the header it was built with.
pub struct AuthenticatedClient {
    http: reqwest::Client,
    endpoints: Endpoints,
    /// Captured at connect time. Refreshes reuse these, so rotating the
    /// password mid-session means building a new client.
    credentials: Credentials,
    client_token: SecretString,
    access_token: ArcSwap<SecretString>,
}

impl std::fmt::Debug for AuthenticatedClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthenticatedClient")
            .field("base_url", &self.endpoints.base_url.as_str())
            .field("username", &self.credentials.username)
            .finish_non_exhaustive()
    }
}

impl AuthenticatedClient {
    /// Bootstrap a client token, log in, and return a ready client.
    pub async fn connect(
        credentials: Credentials,
        endpoints: Endpoints,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Self::connect_with_client(http, credentials, endpoints).await
    }

    /// Same as [`connect`](Self::connect) with a pre-built `reqwest::Client`.
    pub async fn connect_with_client(
        http: reqwest::Client,
        credentials: Credentials,
        endpoints: Endpoints,
    ) -> Result<Self, Error> {
        let client_token = auth::fetch_client_token(&http, &endpoints).await?;
        let access_token = auth::login(&http, &endpoints, &credentials, &client_token).await?;

        Ok(Self {
            http,
            endpoints,
            credentials,
            client_token,
            access_token: ArcSwap::from_pointee(access_token),
        })
    }

    /// The endpoint layout this client talks to.
    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    // ── Request helpers ──────────────────────────────────────────────

    /// Send a GET request and decode the JSON body.
    pub(crate) async fn get<T: DeserializeOwned>(&self, url: Url) -> Result<T, Error> {
        debug!("GET {}", url);
        let resp = self.execute(Method::GET, url, None::<&()>).await?;
        Self::handle_response(resp).await
    }

    /// Send a PUT request with a JSON body.
    ///
    /// An empty success body decodes as `null`.
    pub(crate) async fn put(
        &self,
        url: Url,
        body: &(impl Serialize + Sync),
    ) -> Result<serde_json::Value, Error> {
        debug!("PUT {}", url);
        let resp = self.execute(Method::PUT, url, Some(body)).await?;
        let status = resp.status();
        let url = resp.url().to_string();
        if !status.is_success() {
            return Err(Error::Http {
                status: status.as_u16(),
                url,
            });
        }
        let text = resp.text().await?;
        if text.trim().is_empty() {
            return Ok(serde_json::Value::Null);
        }
        serde_json::from_str(&text).map_err(|e| Error::Deserialization {
            message: e.to_string(),
            body: text,
        })
    }

    /// Issue a request, refreshing the session and retrying once if the
    /// response status is in [`REFRESH_STATUS_CODES`].
    ///
    /// If the refresh login fails, the original response is returned so the
    /// caller reports the original status.
    async fn execute<B>(
        &self,
        method: Method,
        url: Url,
        body: Option<&B>,
    ) -> Result<reqwest::Response, Error>
    where
        B: Serialize + ?Sized + Sync,
    {
        let token = self.access_token.load_full();
        let resp = self.send(method.clone(), url.clone(), body, &token).await?;

        let status = resp.status();
        if !needs_refresh(status) {
            return Ok(resp);
        }

        debug!(%status, %url, "request failed, refreshing access token");
        let fresh = match self.refresh().await {
            Ok(token) => token,
            Err(e) => {
                error!(error = %e, "access token refresh failed");
                return Ok(resp);
            }
        };

        trace!(%url, "retrying request with refreshed token");
        self.send(method, url, body, &fresh).await
    }

    /// Log in again with the original client token and swap the result in
    /// as the default bearer for all future requests.
    async fn refresh(&self) -> Result<Arc<SecretString>, Error> {
        let token = auth::login(
            &self.http,
            &self.endpoints,
            &self.credentials,
            &self.client_token,
        )
        .await?;
        let token = Arc::new(token);
        self.access_token.store(Arc::clone(&token));
        debug!("access token refreshed");
        Ok(token)
    }

    async fn send<B>(
        &self,
        method: Method,
        url: Url,
        body: Option<&B>,
        token: &SecretString,
    ) -> Result<reqwest::Response, Error>
    where
        B: Serialize + ?Sized + Sync,
    {
        let mut builder = self
            .http
            .request(method, url)
            .bearer_auth(token.expose_secret());
        if let Some(body) = body {
            builder = builder.json(body);
        }
        Ok(builder.send().await?)
    }

    async fn handle_response<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, Error> {
        let status = resp.status();
        if !status.is_success() {
            return Err(Error::Http {
                status: status.as_u16(),
                url: resp.url().to_string(),
            });
        }

        let body = resp.text().await?;
        serde_json::from_str(&body).map_err(|e| {
            let preview: String = body.chars().take(200).collect();
            Error::Deserialization {
                message: format!("{e} (body preview: {preview:?})"),
                body: body.clone(),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn refresh_codes_cover_auth_and_server_errors() {
        for code in [401, 403, 500, 503] {
            assert!(needs_refresh(StatusCode::from_u16(code).expect("valid status")));
        }
        for code in [200, 204, 404, 409, 501] {
            assert!(!needs_refresh(StatusCode::from_u16(code).expect("valid status")));
        }
    }
}
