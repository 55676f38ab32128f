// ── Runtime bridge configuration ──
//
// Describes *how* the bridge talks to the Wellbeing cloud and how it
// labels accessories. Carries credential data but never touches disk.
// The CLI builds a `BridgeConfig` from `wellbeing-config` and hands it in.

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use wellbeing_api::{Credentials, Endpoints, TransportConfig};

use crate::error::CoreError;

/// Manufacturer reported in the accessory information service.
pub const DEFAULT_MANUFACTURER: &str = "AEG";

/// Prefix combined with the digits of the vendor model name ("PUREA9" -> "AX9").
pub const DEFAULT_MODEL_PREFIX: &str = "AX";

/// Configuration for one bridge instance.
#[derive(Debug, Clone)]
pub struct BridgeConfig {
    /// Wellbeing account e-mail.
    pub username: Option<String>,
    /// Wellbeing account password.
    pub password: Option<SecretString>,
    /// Bootstrap and API base URLs.
    pub endpoints: Endpoints,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Requested poll interval in seconds. Clamped to at least 5 s.
    pub poll_time_secs: Option<u64>,
    pub manufacturer: String,
    pub model_prefix: String,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            username: None,
            password: None,
            endpoints: Endpoints::default(),
            timeout: TransportConfig::default().timeout,
            poll_time_secs: None,
            manufacturer: DEFAULT_MANUFACTURER.into(),
            model_prefix: DEFAULT_MODEL_PREFIX.into(),
        }
    }
}

impl BridgeConfig {
    /// `true` when the username or password is missing or empty.
    pub fn needs_configuration(&self) -> bool {
        let no_user = self.username.as_deref().is_none_or(str::is_empty);
        let no_pass = self
            .password
            .as_ref()
            .is_none_or(|p| p.expose_secret().is_empty());
        no_user || no_pass
    }

    /// Credentials for the token client.
    pub fn credentials(&self) -> Result<Credentials, CoreError> {
        match (&self.username, &self.password) {
            (Some(username), Some(password))
                if !username.is_empty() && !password.expose_secret().is_empty() =>
            {
                Ok(Credentials {
                    username: username.clone(),
                    password: password.clone(),
                })
            }
            _ => Err(CoreError::Config {
                message: "username and password are required".into(),
            }),
        }
    }

    /// Transport settings derived from this config.
    pub fn transport(&self) -> TransportConfig {
        TransportConfig {
            timeout: self.timeout,
            ..TransportConfig::default()
        }
    }
}
