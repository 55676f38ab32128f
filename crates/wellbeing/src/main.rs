//! `wellbeing`: bridge Electrolux/AEG Wellbeing air purifiers.
//!
//! `run` mirrors every appliance on the account into a console accessory
//! host and polls until interrupted. The one-shot commands (`appliances`,
//! `status`, `set`) open a session, do one thing and exit.

mod cli;
mod commands;
mod error;
mod output;
mod sink;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use wellbeing_core::{BridgeConfig, Poller};

use crate::cli::{Cli, Command, GlobalOpts};
use crate::error::CliError;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    init_tracing(cli.global.verbose);

    if let Err(err) = run(cli).await {
        let code = err.exit_code();
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(code);
    }
}

fn init_tracing(verbosity: u8) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        // Config commands don't need a session
        Command::Config(args) => commands::config_cmd::handle(args, &cli.global),

        Command::Completions(args) => {
            use clap::CommandFactory;
            use clap_complete::generate;

            let mut cmd = Cli::command();
            generate(args.shell, &mut cmd, "wellbeing", &mut std::io::stdout());
            Ok(())
        }

        Command::Run => commands::run::handle(build_bridge_config(&cli.global)?, &cli.global).await,

        cmd => {
            let poller = Poller::new(build_bridge_config(&cli.global)?);
            tracing::debug!(command = ?cmd, "dispatching command");
            commands::dispatch(cmd, &poller, &cli.global).await
        }
    }
}

/// Config file and `WELLBEING_*` env, then CLI flag overrides.
fn build_bridge_config(global: &GlobalOpts) -> Result<BridgeConfig, CliError> {
    let mut cfg = wellbeing_config::load_config()?;
    if let Some(ref username) = global.username {
        cfg.username = Some(username.clone());
    }
    if let Some(poll_time) = global.poll_time {
        cfg.poll_time = Some(poll_time);
    }
    if let Some(timeout) = global.timeout {
        cfg.timeout = timeout;
    }
    Ok(wellbeing_config::to_bridge_config(&cfg)?)
}
