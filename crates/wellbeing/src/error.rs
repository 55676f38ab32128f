//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` into user-facing errors with
//! actionable help text.

use miette::Diagnostic;
use thiserror::Error;

use wellbeing_config::ConfigError;
use wellbeing_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not reach the Wellbeing API at {url}")]
    #[diagnostic(
        code(wellbeing::connection_failed),
        help(
            "Check your network connection.\n\
             Reason: {reason}"
        )
    )]
    ConnectionFailed { url: String, reason: String },

    #[error("Request timed out")]
    #[diagnostic(
        code(wellbeing::timeout),
        help("Increase the timeout with --timeout or try again later.")
    )]
    Timeout,

    // ── Authentication ───────────────────────────────────────────────
    #[error("Authentication failed: {message}")]
    #[diagnostic(
        code(wellbeing::auth_failed),
        help(
            "Verify your Wellbeing account e-mail and password.\n\
             Run: wellbeing config set-password"
        )
    )]
    AuthFailed { message: String },

    #[error("No Wellbeing credentials configured")]
    #[diagnostic(
        code(wellbeing::no_credentials),
        help(
            "Configure an account with: wellbeing config init --username <EMAIL>\n\
             Or set WELLBEING_USERNAME and WELLBEING_PASSWORD."
        )
    )]
    NoCredentials,

    // ── Appliances ───────────────────────────────────────────────────
    #[error("Appliance '{pnc_id}' not found")]
    #[diagnostic(
        code(wellbeing::not_found),
        help("Run: wellbeing appliances to see available appliances")
    )]
    NotFound { pnc_id: String },

    #[error("Command {field} failed for '{pnc_id}': {message}")]
    #[diagnostic(code(wellbeing::command_failed))]
    CommandFailed {
        pnc_id: String,
        field: String,
        message: String,
    },

    // ── API ──────────────────────────────────────────────────────────
    #[error("API error: {message}")]
    #[diagnostic(code(wellbeing::api_error))]
    ApiError { message: String },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(wellbeing::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Configuration error: {message}")]
    #[diagnostic(
        code(wellbeing::config),
        help("Check the config file at: {path}")
    )]
    Config { message: String, path: String },

    // ── IO / Serialization ───────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::AuthFailed { .. } | Self::NoCredentials => exit_code::AUTH,
            Self::NotFound { .. } => exit_code::NOT_FOUND,
            Self::Timeout => exit_code::TIMEOUT,
            Self::Validation { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::AuthBootstrap { message } | CoreError::InvalidCredentials { message } => {
                CliError::AuthFailed { message }
            }

            CoreError::ConnectionFailed { url, reason } => CliError::ConnectionFailed { url, reason },

            CoreError::Timeout => CliError::Timeout,

            CoreError::NotConnected => CliError::ConnectionFailed {
                url: "(not connected)".into(),
                reason: "no Wellbeing session".into(),
            },

            CoreError::UnknownAppliance { pnc_id } => CliError::NotFound { pnc_id },

            CoreError::Command {
                pnc_id,
                field,
                message,
            } => CliError::CommandFailed {
                pnc_id,
                field,
                message,
            },

            CoreError::ApplianceFetch { pnc_id, message } => CliError::ApiError {
                message: format!("{pnc_id}: {message}"),
            },

            CoreError::Api { message, status: _ } | CoreError::Internal(message) => {
                CliError::ApiError { message }
            }

            CoreError::Config { .. } => CliError::NoCredentials,
        }
    }
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { field, reason } => CliError::Validation { field, reason },
            ConfigError::Io(e) => CliError::Io(e),
            other => CliError::Config {
                message: other.to_string(),
                path: wellbeing_config::config_path().display().to_string(),
            },
        }
    }
}
