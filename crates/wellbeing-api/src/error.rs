use thiserror::Error;

/// Top-level error type for the `wellbeing-api` crate.
///
/// Covers the bootstrap token fetch, login, transport and response decoding.
/// `wellbeing-core` maps these into bridge-level errors.
#[derive(Debug, Error)]
pub enum Error {
    // ── Authentication ──────────────────────────────────────────────
    /// The public client-token endpoint was unreachable or returned a
    /// body without a usable token.
    #[error("Client token bootstrap failed: {message}")]
    AuthBootstrap { message: String },

    /// The login endpoint rejected the credentials (any non-2xx), or
    /// answered without an access token.
    #[error("Login rejected: {message}")]
    InvalidCredentials { message: String },

    // ── HTTP ────────────────────────────────────────────────────────
    /// Non-success status from an authenticated endpoint.
    #[error("HTTP {status} from {url}")]
    Http { status: u16, url: String },

    /// HTTP transport error (connection refused, DNS failure, timeout, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// The `reqwest::Client` could not be constructed.
    #[error("Failed to build HTTP client: {0}")]
    ClientBuild(String),

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}
