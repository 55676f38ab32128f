//! Command dispatch: bridges CLI args -> core poller -> output formatting.

pub mod appliances;
pub mod config_cmd;
pub mod run;
pub mod set;
pub mod status;

use wellbeing_core::Poller;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Connect and dispatch a one-shot, session-bound command.
pub async fn dispatch(cmd: Command, poller: &Poller, global: &GlobalOpts) -> Result<(), CliError> {
    if poller.config().needs_configuration() {
        return Err(CliError::NoCredentials);
    }
    poller.connect().await?;

    match cmd {
        Command::Appliances => appliances::handle(poller, global).await,
        Command::Status(args) => status::handle(poller, args, global).await,
        Command::Set(args) => set::handle(poller, args, global).await,
        // Run, Config and Completions are handled before dispatch
        Command::Run | Command::Config(_) | Command::Completions(_) => unreachable!(),
    }
}
