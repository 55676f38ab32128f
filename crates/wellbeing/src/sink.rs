//! Console accessory host used by `wellbeing run`.
//!
//! Registrations are kept in memory for the lifetime of the process; every
//! state push prints one line in the selected output format.

use dashmap::DashSet;
use tracing::info;
use uuid::Uuid;

use wellbeing_core::{AccessoryInfo, AccessoryState, AccessorySink};

use crate::cli::OutputFormat;
use crate::output;

pub struct ConsoleSink {
    registered: DashSet<Uuid>,
    format: OutputFormat,
    color: bool,
    quiet: bool,
}

impl ConsoleSink {
    pub fn new(format: OutputFormat, color: bool, quiet: bool) -> Self {
        Self {
            registered: DashSet::new(),
            format,
            color,
            quiet,
        }
    }

    pub fn registered_count(&self) -> usize {
        self.registered.len()
    }

    fn summary(&self, state: &AccessoryState) -> String {
        let name = state.name.as_deref().unwrap_or(&state.pnc_id);
        let purifier = &state.purifier;

        let mut parts = vec![format!(
            "{name}: {}",
            output::paint_active(purifier.active.unwrap_or(false), self.color)
        )];
        if let Some(target) = purifier.target_state {
            parts.push(format!("mode={target}"));
        }
        if let Some(speed) = purifier.rotation_speed {
            parts.push(format!("fan={speed:.0}%"));
        }
        if let Some(aq) = &state.air_quality {
            parts.push(format!(
                "air={} pm2.5={}",
                output::paint_quality(aq.air_quality, self.color),
                aq.pm2_5_density
            ));
        }
        if let Some(temp) = state.temperature {
            parts.push(format!("temp={temp}°C"));
        }
        if let Some(humidity) = state.humidity {
            parts.push(format!("rh={humidity}%"));
        }
        if let Some(co2) = state.carbon_dioxide {
            parts.push(format!("co2={co2}ppm"));
        }
        if let Some(life) = purifier.filter_life_level {
            parts.push(format!("filter={life}%"));
        }
        parts.join(" ")
    }
}

impl AccessorySink for ConsoleSink {
    fn is_registered(&self, uuid: &Uuid) -> bool {
        self.registered.contains(uuid)
    }

    fn register(&self, info: AccessoryInfo) {
        info!(
            uuid = %info.uuid,
            model = %info.model,
            services = ?info.services,
            "registered {}",
            info.name
        );
        self.registered.insert(info.uuid);
    }

    fn update(&self, state: &AccessoryState) {
        let line = match self.format {
            OutputFormat::Table | OutputFormat::Plain => self.summary(state),
            // One document per update so the stream stays line-parseable
            OutputFormat::Json | OutputFormat::JsonCompact | OutputFormat::Yaml => {
                output::render_json_compact(state)
            }
        };
        output::print_output(&line, self.quiet);
    }
}
