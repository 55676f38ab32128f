//! `wellbeing status [PNC_ID]`

use std::fmt::Write as _;

use serde::Serialize;
use tabled::Tabled;
use tracing::warn;

use wellbeing_core::{AccessoryState, ApplianceSnapshot, Poller, ServiceKind, mapper};

use crate::cli::{GlobalOpts, StatusArgs};
use crate::error::CliError;
use crate::output;

/// Accessory state plus the services the appliance would expose.
#[derive(Debug, Serialize)]
struct StatusView {
    #[serde(flatten)]
    state: AccessoryState,
    services: Vec<ServiceKind>,
}

impl StatusView {
    fn from_snapshot(snapshot: &ApplianceSnapshot) -> Self {
        Self {
            state: mapper::accessory_state(snapshot),
            services: mapper::services_for(&mapper::compute_feature_set(snapshot)),
        }
    }
}

#[derive(Tabled)]
struct StatusRow {
    #[tabled(rename = "PNC ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Power")]
    power: String,
    #[tabled(rename = "Mode")]
    mode: String,
    #[tabled(rename = "Fan")]
    fan: String,
    #[tabled(rename = "Air")]
    air: String,
    #[tabled(rename = "PM2.5")]
    pm25: String,
    #[tabled(rename = "Temp")]
    temp: String,
    #[tabled(rename = "Filter")]
    filter: String,
}

fn dash<T: ToString>(value: Option<T>) -> String {
    value.map_or_else(|| "-".into(), |v| v.to_string())
}

fn row(view: &StatusView, color: bool) -> StatusRow {
    let s = &view.state;
    let p = &s.purifier;
    StatusRow {
        id: s.pnc_id.clone(),
        name: dash(s.name.as_deref()),
        power: p
            .active
            .map_or_else(|| "-".into(), |a| output::paint_active(a, color)),
        mode: dash(p.target_state),
        fan: dash(p.rotation_speed.map(|r| format!("{r:.0}%"))),
        air: s
            .air_quality
            .as_ref()
            .map_or_else(|| "-".into(), |aq| output::paint_quality(aq.air_quality, color)),
        pm25: dash(s.air_quality.as_ref().map(|aq| aq.pm2_5_density)),
        temp: dash(s.temperature.map(|t| format!("{t}°C"))),
        filter: dash(p.filter_life_level.map(|f| format!("{f}%"))),
    }
}

fn detail(view: &StatusView, color: bool) -> String {
    let s = &view.state;
    let p = &s.purifier;
    let mut out = String::new();

    let _ = writeln!(out, "{}", s.name.as_deref().unwrap_or(&s.pnc_id));
    let _ = writeln!(out, "  PNC ID:        {}", s.pnc_id);
    let _ = writeln!(out, "  Firmware:      {}", dash(s.firmware_revision.as_deref()));
    let _ = writeln!(
        out,
        "  Power:         {}",
        p.active
            .map_or_else(|| "-".into(), |a| output::paint_active(a, color))
    );
    let _ = writeln!(out, "  Current state: {}", dash(p.current_state));
    let _ = writeln!(out, "  Target state:  {}", dash(p.target_state));
    let _ = writeln!(
        out,
        "  Fan:           {}",
        dash(p.rotation_speed.map(|r| format!("{r:.0}%")))
    );
    let _ = writeln!(out, "  Child lock:    {}", dash(p.lock_physical_controls));
    let _ = writeln!(out, "  Ionizer:       {}", dash(p.swing_mode));
    let _ = writeln!(
        out,
        "  Filter:        {} ({})",
        dash(p.filter_life_level.map(|f| format!("{f}%"))),
        dash(p.filter_change)
    );
    if let Some(aq) = &s.air_quality {
        let _ = writeln!(
            out,
            "  Air quality:   {} (PM2.5 {}, PM10 {}, VOC {})",
            output::paint_quality(aq.air_quality, color),
            aq.pm2_5_density,
            dash(aq.pm10_density),
            dash(aq.voc_density.map(|v| format!("{v:.1}")))
        );
    }
    let _ = writeln!(out, "  Temperature:   {}", dash(s.temperature.map(|t| format!("{t}°C"))));
    let _ = writeln!(out, "  Humidity:      {}", dash(s.humidity.map(|h| format!("{h}%"))));
    let _ = writeln!(out, "  CO2:           {}", dash(s.carbon_dioxide.map(|c| format!("{c} ppm"))));
    let _ = writeln!(out, "  Light:         {}", dash(s.ambient_light.map(|l| format!("{l} lux"))));
    let _ = writeln!(
        out,
        "  Filter door:   {}",
        dash(s.filter_door_open.map(|open| if open { "open" } else { "closed" }))
    );
    let services: Vec<String> = view.services.iter().map(ToString::to_string).collect();
    let _ = write!(out, "  Services:      {}", services.join(", "));
    out
}

pub async fn handle(poller: &Poller, args: StatusArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let color = output::should_color(&global.color);
    if let Some(pnc_id) = args.pnc_id {
        poller.try_find_appliance(&pnc_id).await?;
        let snapshot = poller.try_fetch_snapshot(&pnc_id).await?;
        let view = StatusView::from_snapshot(&snapshot);
        let out = output::render_single(
            &global.output,
            &view,
            |v| detail(v, color),
            |v| v.state.pnc_id.clone(),
        );
        output::print_output(&out, global.quiet);
        return Ok(());
    }

    let appliances = poller.try_list_appliances().await?;
    let snapshots = poller.poll_all(&appliances).await;
    let views: Vec<StatusView> = appliances
        .iter()
        .zip(snapshots)
        .filter_map(|(identity, snapshot)| {
            let snapshot = snapshot.filter(ApplianceSnapshot::has_name);
            if snapshot.is_none() {
                warn!("no appliance data returned by API for {}", identity.id);
            }
            snapshot
        })
        .map(|snapshot| StatusView::from_snapshot(&snapshot))
        .collect();

    let out = output::render_list(
        &global.output,
        &views,
        |v| row(v, color),
        |v| v.state.pnc_id.clone(),
    );
    output::print_output(&out, global.quiet);
    Ok(())
}
