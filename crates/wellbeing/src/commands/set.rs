//! `wellbeing set PNC_ID --mode/--fan-speed/--lock/--ionizer`

use tracing::debug;

use wellbeing_core::{ApplianceCommand, Poller, WorkMode};

use crate::cli::{GlobalOpts, ModeArg, SetArgs};
use crate::error::CliError;

impl From<ModeArg> for WorkMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Off => WorkMode::Off,
            ModeArg::Auto => WorkMode::Auto,
            ModeArg::Manual => WorkMode::Manual,
        }
    }
}

/// Commands in send order: mode first, so a fan speed lands on a running
/// appliance.
fn commands_for(args: &SetArgs) -> Vec<ApplianceCommand> {
    let mut commands = Vec::new();
    if let Some(mode) = args.mode {
        commands.push(ApplianceCommand::WorkMode(mode.into()));
    }
    if let Some(speed) = args.fan_speed {
        commands.push(ApplianceCommand::FanSpeed(speed));
    }
    if let Some(lock) = args.lock {
        commands.push(ApplianceCommand::SafetyLock(lock.is_on()));
    }
    if let Some(ionizer) = args.ionizer {
        commands.push(ApplianceCommand::Ionizer(ionizer.is_on()));
    }
    commands
}

pub async fn handle(poller: &Poller, args: SetArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let appliance = poller.try_find_appliance(&args.pnc_id).await?;

    for command in commands_for(&args) {
        let response = poller.try_send_command(&appliance.id, &command).await?;
        debug!(pnc_id = %appliance.id, %response, "command accepted");
        if !global.quiet {
            eprintln!(
                "{} {} was set to: {}",
                appliance.display_name,
                command.field(),
                command.value()
            );
        }
    }
    Ok(())
}
