//! `wellbeing run`: the long-running bridge.

use std::sync::Arc;

use tracing::info;

use wellbeing_core::{AccessorySink, Bridge, BridgeConfig, StartOutcome};

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;
use crate::sink::ConsoleSink;

pub async fn handle(config: BridgeConfig, global: &GlobalOpts) -> Result<(), CliError> {
    let sink = Arc::new(ConsoleSink::new(
        global.output.clone(),
        output::should_color(&global.color),
        global.quiet,
    ));
    let host: Arc<dyn AccessorySink> = Arc::<ConsoleSink>::clone(&sink);
    let bridge = Bridge::new(config, host);

    match bridge.start().await? {
        StartOutcome::NeedsConfiguration => return Err(CliError::NoCredentials),
        StartOutcome::Started { appliances } => {
            if !global.quiet {
                eprintln!("Bridging {appliances} appliance(s), press Ctrl-C to stop");
            }
        }
    }

    tokio::signal::ctrl_c().await?;
    info!("interrupt received, stopping");
    bridge.shutdown().await;
    info!(registered = sink.registered_count(), "bridge stopped");
    Ok(())
}
