//! Config subcommand handlers.

use wellbeing_config::{self as config, Config};

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::error::CliError;
use crate::output;

const REDACTED: &str = "********";

// ── Helpers ─────────────────────────────────────────────────────────

fn prompt_password() -> Result<String, CliError> {
    let password = rpassword::prompt_password("Wellbeing password: ").map_err(|e| {
        CliError::Validation {
            field: "password".into(),
            reason: format!("prompt failed: {e}"),
        }
    })?;
    if password.is_empty() {
        return Err(CliError::Validation {
            field: "password".into(),
            reason: "password cannot be empty".into(),
        });
    }
    Ok(password)
}

/// Store in the keyring, or return the password for the config file.
fn stash_password(username: &str, password: String, plaintext: bool) -> Result<Option<String>, CliError> {
    if plaintext {
        return Ok(Some(password));
    }
    config::store_password(username, &password)?;
    eprintln!("✓ Password stored in system keyring");
    Ok(None)
}

fn redacted(cfg: &Config) -> Config {
    Config {
        password: cfg.password.as_ref().map(|_| REDACTED.into()),
        ..cfg.clone()
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Init {
            username,
            poll_time,
            plaintext,
        } => {
            if username.trim().is_empty() {
                return Err(CliError::Validation {
                    field: "username".into(),
                    reason: "username cannot be empty".into(),
                });
            }
            let password = stash_password(&username, prompt_password()?, plaintext)?;

            let cfg = Config {
                username: Some(username),
                password,
                poll_time,
                ..Config::default()
            };
            let path = config::save_config(&cfg)?;
            eprintln!("✓ Config written to {}", path.display());
            Ok(())
        }

        ConfigCommand::Show => {
            let cfg = redacted(&config::load_config()?);
            let out = output::render_single(
                &global.output,
                &cfg,
                |c| toml::to_string_pretty(c).unwrap_or_default(),
                |c| c.username.clone().unwrap_or_default(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ConfigCommand::Path => {
            output::print_output(&config::config_path().display().to_string(), false);
            Ok(())
        }

        ConfigCommand::SetPassword { plaintext } => {
            let mut cfg = config::load_config()?;
            let username = global
                .username
                .clone()
                .or_else(|| cfg.username.clone())
                .filter(|u| !u.is_empty())
                .ok_or(CliError::NoCredentials)?;

            if let Some(password) = stash_password(&username, prompt_password()?, plaintext)? {
                cfg.username = Some(username);
                cfg.password = Some(password);
                let path = config::save_config(&cfg)?;
                eprintln!("✓ Password saved to {}", path.display());
            }
            Ok(())
        }
    }
}
