// ── Core error types ──
//
// Bridge-level errors. Consumers see auth, fetch and command failures,
// never raw JSON decode problems. The `From<wellbeing_api::Error>` impl
// translates transport-layer errors into these variants.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Startup errors (fatal) ───────────────────────────────────────
    #[error("Could not obtain a client token: {message}")]
    AuthBootstrap { message: String },

    #[error("Wellbeing rejected the credentials: {message}")]
    InvalidCredentials { message: String },

    // ── Connection errors ────────────────────────────────────────────
    #[error("Cannot reach the Wellbeing API at {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    #[error("Wellbeing API request timed out")]
    Timeout,

    #[error("Not connected to the Wellbeing API")]
    NotConnected,

    // ── Recoverable per-appliance errors ─────────────────────────────
    #[error("Could not fetch appliance {pnc_id}: {message}")]
    ApplianceFetch { pnc_id: String, message: String },

    #[error("Command {field} failed for appliance {pnc_id}: {message}")]
    Command {
        pnc_id: String,
        field: String,
        message: String,
    },

    #[error("Unknown appliance: {pnc_id}")]
    UnknownAppliance { pnc_id: String },

    // ── API errors (wrapped, not exposed raw) ────────────────────────
    #[error("API error: {message}")]
    Api {
        message: String,
        /// HTTP status code (if applicable).
        status: Option<u16>,
    },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    // ── Internal errors ──────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Re-tag a generic error as a per-appliance fetch failure.
    pub(crate) fn into_fetch(self, pnc_id: &str) -> Self {
        match self {
            err @ (Self::ApplianceFetch { .. } | Self::NotConnected) => err,
            other => Self::ApplianceFetch {
                pnc_id: pnc_id.to_owned(),
                message: other.to_string(),
            },
        }
    }

    /// Re-tag a generic error as a failed command.
    pub(crate) fn into_command(self, pnc_id: &str, field: &str) -> Self {
        match self {
            err @ (Self::Command { .. } | Self::NotConnected) => err,
            other => Self::Command {
                pnc_id: pnc_id.to_owned(),
                field: field.to_owned(),
                message: other.to_string(),
            },
        }
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<wellbeing_api::Error> for CoreError {
    fn from(err: wellbeing_api::Error) -> Self {
        match err {
            wellbeing_api::Error::AuthBootstrap { message } => CoreError::AuthBootstrap { message },
            wellbeing_api::Error::InvalidCredentials { message } => {
                CoreError::InvalidCredentials { message }
            }
            wellbeing_api::Error::Http { status, url } => CoreError::Api {
                message: format!("HTTP {status} from {url}"),
                status: Some(status),
            },
            wellbeing_api::Error::Transport(ref e) => {
                if e.is_timeout() {
                    CoreError::Timeout
                } else if e.is_connect() {
                    CoreError::ConnectionFailed {
                        url: e
                            .url()
                            .map(ToString::to_string)
                            .unwrap_or_else(|| "<unknown>".into()),
                        reason: e.to_string(),
                    }
                } else {
                    CoreError::Api {
                        message: e.to_string(),
                        status: e.status().map(|s| s.as_u16()),
                    }
                }
            }
            wellbeing_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            wellbeing_api::Error::ClientBuild(msg) => CoreError::Config {
                message: format!("Cannot build HTTP client: {msg}"),
            },
            wellbeing_api::Error::Deserialization { message, body: _ } => {
                CoreError::Internal(format!("Deserialization error: {message}"))
            }
        }
    }
}
