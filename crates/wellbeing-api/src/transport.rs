// Shared transport configuration and endpoint layout.
//
// The bootstrap token URL and the API base URL are plain values handed to
// constructors, so tests can point the client at a mock server.

use std::time::Duration;

use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use url::Url;

use crate::error::Error;

/// Public endpoint that hands out the bootstrap client token.
pub const DEFAULT_CLIENT_TOKEN_URL: &str =
    "https://electrolux-wellbeing-client.vercel.app/api/mu52m5PR9X";

/// Root of the Wellbeing REST API.
pub const DEFAULT_BASE_URL: &str = "https://api.delta.electrolux.com/api";

/// Where the client sends its requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    /// Unauthenticated GET returning `{accessToken}`.
    pub client_token_url: Url,
    /// Base for `/Users/Login`, `/Domains/Appliances`, `/Appliances/{id}`.
    pub base_url: Url,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            client_token_url: Url::parse(DEFAULT_CLIENT_TOKEN_URL)
                .expect("default client token URL is valid"),
            base_url: Url::parse(DEFAULT_BASE_URL).expect("default base URL is valid"),
        }
    }
}

impl Endpoints {
    /// Build endpoints from raw URL strings.
    pub fn new(client_token_url: &str, base_url: &str) -> Result<Self, Error> {
        Ok(Self {
            client_token_url: Url::parse(client_token_url)?,
            base_url: Url::parse(base_url)?,
        })
    }

    /// Append path segments to the base URL.
    ///
    /// Each segment is percent-encoded on its own, so an appliance id can
    /// never break out of its path position.
    pub fn api_url(&self, segments: &[&str]) -> Result<Url, Error> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| Error::InvalidUrl(url::ParseError::RelativeUrlWithCannotBeABaseBase))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }
}

/// Shared transport configuration for building HTTP clients.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    pub timeout: Duration,
    pub user_agent: String,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            user_agent: concat!("wellbeing/", env!("CARGO_PKG_VERSION")).to_owned(),
        }
    }
}

impl TransportConfig {
    /// Build a `reqwest::Client` from this config.
    ///
    /// Every request carries `Content-Type: application/json`, including
    /// the bodiless bootstrap GET.
    pub fn build_client(&self) -> Result<reqwest::Client, Error> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        reqwest::Client::builder()
            .timeout(self.timeout)
            .user_agent(self.user_agent.as_str())
            .default_headers(headers)
            .build()
            .map_err(|e| Error::ClientBuild(e.to_string()))
    }
}
