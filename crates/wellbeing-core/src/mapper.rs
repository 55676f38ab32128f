// ── Vendor-to-accessory state mapping ──
//
// Pure functions between the Wellbeing twin and the accessory
// characteristics, in both directions. Nothing here performs I/O.

use std::collections::BTreeSet;

use strum::IntoEnumIterator;
use wellbeing_api::ApplianceData;

use crate::model::{
    AccessoryInfo, AccessoryState, AirQuality, AirQualityState, ApplianceCommand,
    ApplianceIdentity, ApplianceSnapshot, CharacteristicWrite, CurrentPurifierState, Feature,
    FilterChangeIndication, OperatingState, PurifierState, ServiceKind, TargetPurifierState,
    WorkMode, accessory_uuid,
};

/// Percent per vendor fan step. Fans have speeds 1..=9.
pub const FAN_SPEED_MULTIPLIER: f64 = 100.0 / 9.0;

/// Filter life (percent) below which a change is requested.
pub const FILTER_CHANGE_THRESHOLD: f64 = 5.0;

/// Assumed µg/m³ per ppb (benzene at 20 °C).
pub const TVOC_UGM3_PER_PPB: f64 = 3.243;

/// Empirical scale applied after the ppb conversion.
pub const TVOC_SCALE_DIVISOR: f64 = 10.0;

/// Upper bound of the VOC density characteristic.
pub const VOC_DENSITY_MAX: f64 = 1000.0;

// ── Forward projection ─────────────────────────────────────────────

/// Rename the reported twin into a snapshot. Unknown vendor fields are
/// dropped; absent fields stay absent.
pub fn project_snapshot(pnc_id: &str, data: &ApplianceData) -> ApplianceSnapshot {
    let info = &data.appliance_data;
    let r = data.reported();

    ApplianceSnapshot {
        pnc_id: pnc_id.to_owned(),
        name: info.appliance_name.clone(),
        model_name: info.model_name.clone(),
        firmware_version: r.firmware_version.clone(),
        work_mode: r.work_mode.as_deref().map(WorkMode::from),
        filter_rfid: r.filter_rfid.clone(),
        filter_life: r.filter_life,
        fan_speed: r.fan_speed,
        ui_light: r.ui_light,
        safety_lock: r.safety_lock,
        ionizer: r.ionizer,
        sleep: r.sleep,
        scheduler: r.scheduler,
        filter_type: r.filter_type,
        version: r.version,
        door_open: r.door_open,
        pm1: r.pm1,
        pm25: r.pm25,
        pm10: r.pm10,
        tvoc: r.tvoc,
        co2: r.co2,
        temp: r.temp,
        humidity: r.humidity,
        env_light_level: r.env_light_level,
        rssi: r.rssi,
    }
}

/// Features whose snapshot value is present. Identity fields (pnc id, name,
/// model name) are not features and never appear in the set.
pub fn compute_feature_set(snapshot: &ApplianceSnapshot) -> BTreeSet<Feature> {
    Feature::iter().filter(|f| snapshot.has(*f)).collect()
}

/// PM2.5 (µg/m³) to air quality. NaN falls through to `Poor`.
pub fn air_quality_level(pm25: f64) -> AirQuality {
    if pm25 < 6.0 {
        AirQuality::Excellent
    } else if pm25 < 12.0 {
        AirQuality::Good
    } else if pm25 < 36.0 {
        AirQuality::Fair
    } else if pm25 < 50.0 {
        AirQuality::Inferior
    } else {
        AirQuality::Poor
    }
}

/// Unclamped TVOC conversion, ppb to µg/m³.
pub fn tvoc_ppb_to_ugm3(ppb: f64) -> f64 {
    ppb * TVOC_UGM3_PER_PPB / TVOC_SCALE_DIVISOR
}

/// TVOC ppb to the VOC density characteristic, capped at 1000 µg/m³.
pub fn tvoc_to_density(ppb: f64) -> f64 {
    tvoc_ppb_to_ugm3(ppb).min(VOC_DENSITY_MAX)
}

pub fn fan_speed_to_percent(speed: u8) -> f64 {
    f64::from(speed) * FAN_SPEED_MULTIPLIER
}

/// Percent to vendor fan step, flooring. Lossy: a round trip may land one
/// step low.
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::as_conversions
)]
pub fn percent_to_fan_speed(percent: f64) -> u8 {
    let step = (percent.trunc() / FAN_SPEED_MULTIPLIER).floor();
    // Saturating cast; NaN becomes 0.
    step.clamp(0.0, f64::from(u8::MAX)) as u8
}

pub fn derive_operating_state(mode: &WorkMode) -> OperatingState {
    let is_active = !mode.is_off();
    OperatingState {
        is_active,
        current: if is_active {
            CurrentPurifierState::PurifyingAir
        } else {
            CurrentPurifierState::Inactive
        },
        target: if *mode == WorkMode::Auto {
            TargetPurifierState::Auto
        } else {
            TargetPurifierState::Manual
        },
    }
}

pub fn filter_change_indication(filter_life: f64) -> FilterChangeIndication {
    if filter_life < FILTER_CHANGE_THRESHOLD {
        FilterChangeIndication::ChangeFilter
    } else {
        FilterChangeIndication::FilterOk
    }
}

/// `prefix` plus the first run of digits in `model` ("PUREA9" -> "AX9").
/// Models without digits are returned unchanged.
pub fn fix_model_name(prefix: &str, model: &str) -> String {
    let digits: String = model
        .chars()
        .skip_while(|c| !c.is_ascii_digit())
        .take_while(char::is_ascii_digit)
        .collect();
    if digits.is_empty() {
        model.to_owned()
    } else {
        format!("{prefix}{digits}")
    }
}

/// Project a snapshot onto every characteristic it can drive.
pub fn accessory_state(snapshot: &ApplianceSnapshot) -> AccessoryState {
    let operating = snapshot.work_mode.as_ref().map(derive_operating_state);

    let purifier = PurifierState {
        active: operating.map(|o| o.is_active),
        current_state: operating.map(|o| o.current),
        target_state: operating.map(|o| o.target),
        rotation_speed: snapshot.fan_speed.map(fan_speed_to_percent),
        lock_physical_controls: snapshot.safety_lock,
        swing_mode: snapshot.ionizer,
        filter_life_level: snapshot.filter_life,
        filter_change: snapshot.filter_life.map(filter_change_indication),
    };

    let air_quality = snapshot.pm25.map(|pm25| AirQualityState {
        air_quality: air_quality_level(pm25),
        pm2_5_density: pm25,
        pm10_density: snapshot.pm10,
        voc_density: snapshot.tvoc.map(tvoc_to_density),
    });

    AccessoryState {
        pnc_id: snapshot.pnc_id.clone(),
        name: snapshot.name.clone(),
        firmware_revision: snapshot.firmware_version.clone(),
        purifier,
        air_quality,
        temperature: snapshot.temp,
        humidity: snapshot.humidity,
        carbon_dioxide: snapshot.co2,
        ambient_light: snapshot.env_light_level,
        filter_door_open: snapshot.door_open,
    }
}

/// Services to register for an appliance with `features`. The purifier
/// service is always present.
pub fn services_for(features: &BTreeSet<Feature>) -> Vec<ServiceKind> {
    let optional = [
        (Feature::Pm25, ServiceKind::AirQualitySensor),
        (Feature::Temp, ServiceKind::TemperatureSensor),
        (Feature::Co2, ServiceKind::CarbonDioxideSensor),
        (Feature::Humidity, ServiceKind::HumiditySensor),
        (Feature::EnvLightLevel, ServiceKind::LightSensor),
        (Feature::DoorOpen, ServiceKind::ContactSensor),
    ];

    std::iter::once(ServiceKind::AirPurifier)
        .chain(
            optional
                .into_iter()
                .filter(|(feature, _)| features.contains(feature))
                .map(|(_, service)| service),
        )
        .collect()
}

/// Registration record for an appliance, using its first snapshot for the
/// firmware revision and service list.
pub fn accessory_info(
    identity: &ApplianceIdentity,
    snapshot: Option<&ApplianceSnapshot>,
    manufacturer: &str,
    model_prefix: &str,
) -> AccessoryInfo {
    let features = snapshot.map(compute_feature_set).unwrap_or_default();
    AccessoryInfo {
        uuid: accessory_uuid(&identity.id),
        pnc_id: identity.id.clone(),
        name: identity.display_name.clone(),
        manufacturer: manufacturer.to_owned(),
        model: fix_model_name(model_prefix, &identity.model_name),
        serial_number: identity.id.clone(),
        firmware_revision: snapshot.and_then(|s| s.firmware_version.clone()),
        services: services_for(&features),
    }
}

// ── Reverse projection ─────────────────────────────────────────────

/// Translate a characteristic write into a vendor command.
///
/// Active, lock and swing writes that match the `current` value produce
/// no command. Target state and rotation speed are always sent.
pub fn command_for(
    write: CharacteristicWrite,
    current: Option<&PurifierState>,
) -> Option<ApplianceCommand> {
    let unchanged = |now: Option<bool>, wanted: bool| now == Some(wanted);

    match write {
        CharacteristicWrite::Active(on) => {
            if unchanged(current.and_then(|c| c.active), on) {
                return None;
            }
            let mode = if on { WorkMode::Auto } else { WorkMode::Off };
            Some(ApplianceCommand::WorkMode(mode))
        }
        CharacteristicWrite::TargetState(target) => {
            let mode = match target {
                TargetPurifierState::Manual => WorkMode::Manual,
                TargetPurifierState::Auto => WorkMode::Auto,
            };
            Some(ApplianceCommand::WorkMode(mode))
        }
        CharacteristicWrite::RotationSpeed(percent) => {
            Some(ApplianceCommand::FanSpeed(percent_to_fan_speed(percent)))
        }
        CharacteristicWrite::LockPhysicalControls(on) => {
            if unchanged(current.and_then(|c| c.lock_physical_controls), on) {
                return None;
            }
            Some(ApplianceCommand::SafetyLock(on))
        }
        CharacteristicWrite::SwingMode(on) => {
            if unchanged(current.and_then(|c| c.swing_mode), on) {
                return None;
            }
            Some(ApplianceCommand::Ionizer(on))
        }
    }
}

/// Record an accepted write in the cached purifier state, as the host
/// does with its own characteristic value.
pub fn apply_write(state: &mut PurifierState, write: CharacteristicWrite) {
    match write {
        CharacteristicWrite::Active(on) => state.active = Some(on),
        CharacteristicWrite::TargetState(target) => state.target_state = Some(target),
        CharacteristicWrite::RotationSpeed(percent) => state.rotation_speed = Some(percent),
        CharacteristicWrite::LockPhysicalControls(on) => state.lock_physical_controls = Some(on),
        CharacteristicWrite::SwingMode(on) => state.swing_mode = Some(on),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn data(reported: serde_json::Value) -> ApplianceData {
        serde_json::from_value(json!({
            "applianceData": { "applianceName": "Bedroom", "modelName": "PUREA9" },
            "twin": { "properties": { "reported": reported } }
        }))
        .expect("valid appliance body")
    }

    #[test]
    fn air_quality_boundaries() {
        let cases = [
            (0.0, AirQuality::Excellent),
            (5.99, AirQuality::Excellent),
            (6.0, AirQuality::Good),
            (11.99, AirQuality::Good),
            (12.0, AirQuality::Fair),
            (35.99, AirQuality::Fair),
            (36.0, AirQuality::Inferior),
            (49.99, AirQuality::Inferior),
            (50.0, AirQuality::Poor),
            (500.0, AirQuality::Poor),
        ];
        for (pm25, expected) in cases {
            assert_eq!(air_quality_level(pm25), expected, "pm25 = {pm25}");
        }
        assert_eq!(air_quality_level(f64::NAN), AirQuality::Poor);
    }

    #[test]
    fn tvoc_conversion_and_clamp() {
        assert!(tvoc_to_density(0.0).abs() < f64::EPSILON);
        assert!((tvoc_ppb_to_ugm3(4000.0) - 1297.2).abs() < 1e-9);
        assert!((tvoc_to_density(1500.0) - 486.45).abs() < 1e-9);
        for ppb in [3086.0, 3100.0, 4000.0, 1e9] {
            assert!(tvoc_to_density(ppb) <= VOC_DENSITY_MAX, "ppb = {ppb}");
        }
        assert!((tvoc_to_density(4000.0) - VOC_DENSITY_MAX).abs() < f64::EPSILON);
    }

    #[test]
    fn fan_speed_round_trip_within_one_step() {
        for speed in 1..=9u8 {
            let back = percent_to_fan_speed(fan_speed_to_percent(speed));
            assert!(speed.abs_diff(back) <= 1, "speed {speed} came back as {back}");
        }
        assert_eq!(percent_to_fan_speed(100.0), 9);
        assert_eq!(percent_to_fan_speed(0.0), 0);
        assert_eq!(percent_to_fan_speed(-20.0), 0);
        assert_eq!(percent_to_fan_speed(f64::NAN), 0);
        assert_eq!(percent_to_fan_speed(1e6), u8::MAX);
    }

    #[test]
    fn operating_state_from_work_mode() {
        let off = derive_operating_state(&WorkMode::Off);
        assert!(!off.is_active);
        assert_eq!(off.current, CurrentPurifierState::Inactive);
        assert_eq!(off.target, TargetPurifierState::Manual);

        let auto = derive_operating_state(&WorkMode::Auto);
        assert!(auto.is_active);
        assert_eq!(auto.current, CurrentPurifierState::PurifyingAir);
        assert_eq!(auto.target, TargetPurifierState::Auto);

        let manual = derive_operating_state(&WorkMode::Manual);
        assert!(manual.is_active);
        assert_eq!(manual.target, TargetPurifierState::Manual);

        let other = derive_operating_state(&WorkMode::Other("Quiet".into()));
        assert!(other.is_active);
        assert_eq!(other.target, TargetPurifierState::Manual);
    }

    #[test]
    fn projection_keeps_absent_fields_absent() {
        let snapshot = project_snapshot(
            "pnc-1",
            &data(json!({ "Workmode": "Auto", "Fanspeed": 0, "SafetyLock": false, "Bogus": 1 })),
        );

        assert_eq!(snapshot.pnc_id, "pnc-1");
        assert_eq!(snapshot.name.as_deref(), Some("Bedroom"));
        assert_eq!(snapshot.work_mode, Some(WorkMode::Auto));
        assert_eq!(snapshot.fan_speed, Some(0));
        assert_eq!(snapshot.safety_lock, Some(false));
        assert_eq!(snapshot.temp, None);
        assert_eq!(snapshot.pm25, None);
    }

    #[test]
    fn feature_set_only_contains_present_fields() {
        let snapshot = project_snapshot(
            "pnc-1",
            &data(json!({ "Workmode": "Off", "PM2_5": 0, "Temp": 21.5, "DoorOpen": 0 })),
        );
        let features = compute_feature_set(&snapshot);

        assert_eq!(
            features,
            BTreeSet::from([Feature::WorkMode, Feature::DoorOpen, Feature::Pm25, Feature::Temp])
        );
        for feature in &features {
            assert!(snapshot.has(*feature));
        }
        assert!(compute_feature_set(&ApplianceSnapshot::default()).is_empty());
    }

    #[test]
    fn identity_fields_are_not_features() {
        let snapshot = ApplianceSnapshot {
            pnc_id: "pnc-1".into(),
            name: Some("Bedroom".into()),
            model_name: Some("PUREA9".into()),
            ..ApplianceSnapshot::default()
        };
        assert!(compute_feature_set(&snapshot).is_empty());
    }

    #[test]
    fn model_name_fix() {
        assert_eq!(fix_model_name("AX", "PUREA9"), "AX9");
        assert_eq!(fix_model_name("AX", "WELLA7"), "AX7");
        assert_eq!(fix_model_name("AX", "PURE12X3"), "AX12");
        assert_eq!(fix_model_name("AX", "UNKNOWN"), "UNKNOWN");
    }

    #[test]
    fn services_always_include_purifier() {
        assert_eq!(services_for(&BTreeSet::new()), vec![ServiceKind::AirPurifier]);

        let features = BTreeSet::from([
            Feature::DoorOpen,
            Feature::Pm25,
            Feature::Humidity,
            Feature::Rssi,
        ]);
        assert_eq!(
            services_for(&features),
            vec![
                ServiceKind::AirPurifier,
                ServiceKind::AirQualitySensor,
                ServiceKind::HumiditySensor,
                ServiceKind::ContactSensor,
            ]
        );
    }

    #[test]
    fn accessory_state_groups_by_feature() {
        let snapshot = project_snapshot(
            "pnc-1",
            &data(json!({
                "FrmVer_NIU": "1.2.0",
                "Workmode": "Manual",
                "Fanspeed": 9,
                "FilterLife": 3,
                "Ionizer": true,
                "PM2_5": 40,
                "TVOC": 4000,
                "CO2": 600
            })),
        );
        let state = accessory_state(&snapshot);

        assert_eq!(state.firmware_revision.as_deref(), Some("1.2.0"));
        assert_eq!(state.purifier.active, Some(true));
        assert_eq!(state.purifier.target_state, Some(TargetPurifierState::Manual));
        assert!(
            state
                .purifier
                .rotation_speed
                .is_some_and(|p| (p - 100.0).abs() < 1e-9)
        );
        assert_eq!(
            state.purifier.filter_change,
            Some(FilterChangeIndication::ChangeFilter)
        );
        assert_eq!(state.purifier.swing_mode, Some(true));
        assert_eq!(state.purifier.lock_physical_controls, None);

        let aq = state.air_quality.expect("pm25 present");
        assert_eq!(aq.air_quality, AirQuality::Inferior);
        assert_eq!(aq.pm10_density, None);
        assert_eq!(aq.voc_density, Some(VOC_DENSITY_MAX));

        assert_eq!(state.carbon_dioxide, Some(600.0));
        assert_eq!(state.temperature, None);
    }

    #[test]
    fn accessory_info_uses_fixed_model_and_pnc_serial() {
        let identity = ApplianceIdentity {
            id: "pnc-1".into(),
            display_name: "Bedroom".into(),
            model_name: "PUREA9".into(),
        };
        let snapshot = project_snapshot("pnc-1", &data(json!({ "FrmVer_NIU": "1.2.0", "Temp": 20 })));

        let info = accessory_info(&identity, Some(&snapshot), "AEG", "AX");

        assert_eq!(info.uuid, accessory_uuid("pnc-1"));
        assert_eq!(info.model, "AX9");
        assert_eq!(info.serial_number, "pnc-1");
        assert_eq!(info.firmware_revision.as_deref(), Some("1.2.0"));
        assert_eq!(
            info.services,
            vec![ServiceKind::AirPurifier, ServiceKind::TemperatureSensor]
        );
    }

    #[test]
    fn active_write_maps_to_work_mode_only_when_changed() {
        let current = PurifierState {
            active: Some(true),
            ..PurifierState::default()
        };

        assert_eq!(command_for(CharacteristicWrite::Active(true), Some(&current)), None);
        assert_eq!(
            command_for(CharacteristicWrite::Active(false), Some(&current)),
            Some(ApplianceCommand::WorkMode(WorkMode::Off))
        );
        assert_eq!(
            command_for(CharacteristicWrite::Active(true), None),
            Some(ApplianceCommand::WorkMode(WorkMode::Auto))
        );
    }

    #[test]
    fn toggle_writes_skip_unchanged_values() {
        let current = PurifierState {
            lock_physical_controls: Some(false),
            swing_mode: Some(true),
            ..PurifierState::default()
        };

        assert_eq!(
            command_for(CharacteristicWrite::LockPhysicalControls(false), Some(&current)),
            None
        );
        assert_eq!(
            command_for(CharacteristicWrite::LockPhysicalControls(true), Some(&current)),
            Some(ApplianceCommand::SafetyLock(true))
        );
        assert_eq!(command_for(CharacteristicWrite::SwingMode(true), Some(&current)), None);
        assert_eq!(
            command_for(CharacteristicWrite::SwingMode(false), Some(&current)),
            Some(ApplianceCommand::Ionizer(false))
        );
    }

    #[test]
    fn target_and_speed_writes_are_always_sent() {
        let current = PurifierState {
            target_state: Some(TargetPurifierState::Auto),
            rotation_speed: Some(fan_speed_to_percent(5)),
            ..PurifierState::default()
        };

        assert_eq!(
            command_for(
                CharacteristicWrite::TargetState(TargetPurifierState::Auto),
                Some(&current)
            ),
            Some(ApplianceCommand::WorkMode(WorkMode::Auto))
        );
        assert_eq!(
            command_for(
                CharacteristicWrite::TargetState(TargetPurifierState::Manual),
                Some(&current)
            ),
            Some(ApplianceCommand::WorkMode(WorkMode::Manual))
        );
        assert_eq!(
            command_for(CharacteristicWrite::RotationSpeed(60.0), Some(&current)),
            Some(ApplianceCommand::FanSpeed(5))
        );
    }
}
