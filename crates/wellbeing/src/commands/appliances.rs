//! `wellbeing appliances`

use tabled::Tabled;

use wellbeing_core::{ApplianceIdentity, Poller};

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

#[derive(Tabled)]
struct ApplianceRow {
    #[tabled(rename = "PNC ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Model")]
    model: String,
}

fn row(a: &ApplianceIdentity) -> ApplianceRow {
    ApplianceRow {
        id: a.id.clone(),
        name: a.display_name.clone(),
        model: a.model_name.clone(),
    }
}

pub async fn handle(poller: &Poller, global: &GlobalOpts) -> Result<(), CliError> {
    let appliances = poller.try_list_appliances().await?;
    let out = output::render_list(&global.output, &appliances, row, |a| a.id.clone());
    output::print_output(&out, global.quiet);
    Ok(())
}
