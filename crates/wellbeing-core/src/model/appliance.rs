// ── Appliance domain types ──
//
// Identity comes from the account listing and never changes within a
// session. Snapshots are rebuilt on every poll and thrown away after
// mapping.

use std::fmt;

use serde::{Serialize, Serializer};
use strum::{AsRefStr, Display, EnumIter, IntoStaticStr};
use wellbeing_api::ApplianceEntry;

/// An appliance registered to the account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApplianceIdentity {
    /// Vendor product number id (`pncId`).
    pub id: String,
    pub display_name: String,
    pub model_name: String,
}

impl From<ApplianceEntry> for ApplianceIdentity {
    fn from(entry: ApplianceEntry) -> Self {
        Self {
            id: entry.pnc_id,
            display_name: entry.appliance_name,
            model_name: entry.model_name,
        }
    }
}

/// Vendor operating mode.
///
/// Unrecognized strings are kept verbatim and count as "not off".
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum WorkMode {
    Off,
    Auto,
    Manual,
    Other(String),
}

impl WorkMode {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Off => "PowerOff",
            Self::Auto => "Auto",
            Self::Manual => "Manual",
            Self::Other(raw) => raw,
        }
    }

    pub fn is_off(&self) -> bool {
        matches!(self, Self::Off)
    }
}

impl From<&str> for WorkMode {
    fn from(raw: &str) -> Self {
        match raw {
            "PowerOff" | "Off" => Self::Off,
            "Auto" => Self::Auto,
            "Manual" => Self::Manual,
            other => Self::Other(other.to_owned()),
        }
    }
}

impl fmt::Display for WorkMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for WorkMode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Optional snapshot fields. A feature is supported by an appliance when
/// its snapshot carries a value for it.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Display,
    AsRefStr,
    IntoStaticStr,
    EnumIter,
    Serialize,
)]
#[strum(serialize_all = "camelCase")]
#[serde(rename_all = "camelCase")]
pub enum Feature {
    FirmwareVersion,
    WorkMode,
    FilterRfid,
    FilterLife,
    FanSpeed,
    UiLight,
    SafetyLock,
    Ionizer,
    Sleep,
    Scheduler,
    FilterType,
    Version,
    DoorOpen,
    Pm1,
    Pm25,
    Pm10,
    Tvoc,
    Co2,
    Temp,
    Humidity,
    EnvLightLevel,
    Rssi,
}

/// Point-in-time telemetry of one appliance.
///
/// Every telemetry field is optional; `None` means the model does not
/// report it, never zero or false.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ApplianceSnapshot {
    pub pnc_id: String,
    pub name: Option<String>,
    pub model_name: Option<String>,
    pub firmware_version: Option<String>,
    pub work_mode: Option<WorkMode>,
    pub filter_rfid: Option<String>,
    pub filter_life: Option<f64>,
    pub fan_speed: Option<u8>,
    pub ui_light: Option<bool>,
    pub safety_lock: Option<bool>,
    pub ionizer: Option<bool>,
    pub sleep: Option<bool>,
    pub scheduler: Option<bool>,
    pub filter_type: Option<i64>,
    pub version: Option<i64>,
    pub door_open: Option<bool>,
    pub pm1: Option<f64>,
    pub pm25: Option<f64>,
    pub pm10: Option<f64>,
    pub tvoc: Option<f64>,
    pub co2: Option<f64>,
    pub temp: Option<f64>,
    pub humidity: Option<f64>,
    pub env_light_level: Option<f64>,
    pub rssi: Option<f64>,
}

impl ApplianceSnapshot {
    /// Whether the snapshot carries a value for `feature`.
    pub fn has(&self, feature: Feature) -> bool {
        match feature {
            Feature::FirmwareVersion => self.firmware_version.is_some(),
            Feature::WorkMode => self.work_mode.is_some(),
            Feature::FilterRfid => self.filter_rfid.is_some(),
            Feature::FilterLife => self.filter_life.is_some(),
            Feature::FanSpeed => self.fan_speed.is_some(),
            Feature::UiLight => self.ui_light.is_some(),
            Feature::SafetyLock => self.safety_lock.is_some(),
            Feature::Ionizer => self.ionizer.is_some(),
            Feature::Sleep => self.sleep.is_some(),
            Feature::Scheduler => self.scheduler.is_some(),
            Feature::FilterType => self.filter_type.is_some(),
            Feature::Version => self.version.is_some(),
            Feature::DoorOpen => self.door_open.is_some(),
            Feature::Pm1 => self.pm1.is_some(),
            Feature::Pm25 => self.pm25.is_some(),
            Feature::Pm10 => self.pm10.is_some(),
            Feature::Tvoc => self.tvoc.is_some(),
            Feature::Co2 => self.co2.is_some(),
            Feature::Temp => self.temp.is_some(),
            Feature::Humidity => self.humidity.is_some(),
            Feature::EnvLightLevel => self.env_light_level.is_some(),
            Feature::Rssi => self.rssi.is_some(),
        }
    }

    /// A snapshot without a name is treated as a failed fetch.
    pub fn has_name(&self) -> bool {
        self.name.as_deref().is_some_and(|n| !n.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn work_mode_parses_vendor_strings() {
        assert_eq!(WorkMode::from("PowerOff"), WorkMode::Off);
        assert_eq!(WorkMode::from("Auto"), WorkMode::Auto);
        assert_eq!(WorkMode::from("Manual"), WorkMode::Manual);
        assert_eq!(WorkMode::from("Quiet"), WorkMode::Other("Quiet".into()));
        assert_eq!(WorkMode::Other("Quiet".into()).to_string(), "Quiet");
        assert!(!WorkMode::from("Quiet").is_off());
    }

    #[test]
    fn feature_names_are_camel_case() {
        assert_eq!(Feature::Pm25.as_ref(), "pm25");
        assert_eq!(Feature::EnvLightLevel.to_string(), "envLightLevel");
        assert_eq!(Feature::FilterRfid.as_ref(), "filterRfid");
    }
}
