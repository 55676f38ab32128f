//! Configuration for the Wellbeing bridge.
//!
//! A single TOML file merged with `WELLBEING_*` environment variables,
//! password resolution (env + keyring + plaintext), and translation to
//! `wellbeing_core::BridgeConfig`.

use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use wellbeing_api::Endpoints;
use wellbeing_api::transport::{DEFAULT_BASE_URL, DEFAULT_CLIENT_TOKEN_URL};
use wellbeing_core::BridgeConfig;
use wellbeing_core::config::{DEFAULT_MANUFACTURER, DEFAULT_MODEL_PREFIX};

/// Keyring service name; the account is the Wellbeing username.
pub const KEYRING_SERVICE: &str = "wellbeing";

/// Env var checked before the keyring.
pub const PASSWORD_ENV: &str = "WELLBEING_PASSWORD";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("keyring error: {0}")]
    Keyring(#[from] keyring::Error),

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config ─────────────────────────────────────────────────────

/// Contents of `config.toml`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Config {
    /// Wellbeing account e-mail.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,

    /// Plaintext password. Prefer the keyring or an env var.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,

    /// Environment variable name containing the password.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password_env: Option<String>,

    /// Poll interval in seconds. Values below 5 are raised to 5.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub poll_time: Option<u64>,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    #[serde(default = "default_manufacturer")]
    pub manufacturer: String,

    #[serde(default = "default_model_prefix")]
    pub model_prefix: String,

    #[serde(default = "default_client_token_url")]
    pub client_token_url: String,

    #[serde(default = "default_base_url")]
    pub base_url: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            username: None,
            password: None,
            password_env: None,
            poll_time: None,
            timeout: default_timeout(),
            manufacturer: default_manufacturer(),
            model_prefix: default_model_prefix(),
            client_token_url: default_client_token_url(),
            base_url: default_base_url(),
        }
    }
}

fn default_timeout() -> u64 {
    30
}
fn default_manufacturer() -> String {
    DEFAULT_MANUFACTURER.into()
}
fn default_model_prefix() -> String {
    DEFAULT_MODEL_PREFIX.into()
}
fn default_client_token_url() -> String {
    DEFAULT_CLIENT_TOKEN_URL.into()
}
fn default_base_url() -> String {
    DEFAULT_BASE_URL.into()
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("com", "wellbeing", "wellbeing").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("wellbeing");
    p
}

// ── Loading / saving ────────────────────────────────────────────────

/// Load the config from the canonical path + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load the config from `path` + environment. A missing file is not an
/// error; defaults and env vars still apply.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("WELLBEING_"));

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Serialize config to TOML at the canonical path.
pub fn save_config(cfg: &Config) -> Result<PathBuf, ConfigError> {
    let path = config_path();
    save_config_to(cfg, &path)?;
    Ok(path)
}

pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Password resolution ─────────────────────────────────────────────

/// Resolve the account password.
///
/// Order: env var named by `password_env`, then `WELLBEING_PASSWORD`,
/// then the system keyring, then the plaintext `password` field.
pub fn resolve_password(cfg: &Config) -> Option<SecretString> {
    resolve_password_with(
        cfg,
        |name| std::env::var(name).ok(),
        |username| {
            keyring::Entry::new(KEYRING_SERVICE, username)
                .and_then(|entry| entry.get_password())
                .ok()
        },
    )
}

fn resolve_password_with(
    cfg: &Config,
    env: impl Fn(&str) -> Option<String>,
    keyring: impl Fn(&str) -> Option<String>,
) -> Option<SecretString> {
    // 1. Configured env var
    if let Some(ref env_name) = cfg.password_env {
        if let Some(val) = env(env_name) {
            return Some(SecretString::from(val));
        }
    }

    // 2. Well-known env var
    if let Some(val) = env(PASSWORD_ENV) {
        return Some(SecretString::from(val));
    }

    // 3. System keyring
    if let Some(username) = cfg.username.as_deref().filter(|u| !u.is_empty()) {
        if let Some(secret) = keyring(username) {
            return Some(SecretString::from(secret));
        }
    }

    // 4. Plaintext in config
    cfg.password.clone().map(SecretString::from)
}

/// Store the password for `username` in the system keyring.
pub fn store_password(username: &str, password: &str) -> Result<(), ConfigError> {
    let entry = keyring::Entry::new(KEYRING_SERVICE, username)?;
    entry.set_password(password)?;
    Ok(())
}

// ── Translation ─────────────────────────────────────────────────────

/// Build a `BridgeConfig`. Missing credentials are left empty so the
/// bridge can report that it needs configuration.
pub fn to_bridge_config(cfg: &Config) -> Result<BridgeConfig, ConfigError> {
    if cfg.timeout == 0 {
        return Err(ConfigError::Validation {
            field: "timeout".into(),
            reason: "must be at least 1 second".into(),
        });
    }

    let endpoints = Endpoints::new(&cfg.client_token_url, &cfg.base_url).map_err(|e| {
        ConfigError::Validation {
            field: "client_token_url/base_url".into(),
            reason: e.to_string(),
        }
    })?;

    Ok(BridgeConfig {
        username: cfg.username.clone().filter(|u| !u.is_empty()),
        password: resolve_password(cfg),
        endpoints,
        timeout: Duration::from_secs(cfg.timeout),
        poll_time_secs: cfg.poll_time,
        manufacturer: cfg.manufacturer.clone(),
        model_prefix: cfg.model_prefix.clone(),
    })
}
