// ── Accessory-side types ──
//
// The characteristic vocabulary of a HomeKit-style air purifier and its
// companion sensors. Numeric `hap_value()`s follow the HAP enumerations.

use serde::Serialize;
use strum::Display;
use uuid::Uuid;

/// Air quality category derived from PM2.5.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display, Serialize)]
pub enum AirQuality {
    Excellent,
    Good,
    Fair,
    Inferior,
    Poor,
}

impl AirQuality {
    pub fn hap_value(self) -> u8 {
        match self {
            Self::Excellent => 1,
            Self::Good => 2,
            Self::Fair => 3,
            Self::Inferior => 4,
            Self::Poor => 5,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize)]
pub enum CurrentPurifierState {
    Inactive,
    PurifyingAir,
}

impl CurrentPurifierState {
    pub fn hap_value(self) -> u8 {
        match self {
            Self::Inactive => 0,
            Self::PurifyingAir => 2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize)]
pub enum TargetPurifierState {
    Manual,
    Auto,
}

impl TargetPurifierState {
    pub fn hap_value(self) -> u8 {
        match self {
            Self::Manual => 0,
            Self::Auto => 1,
        }
    }
}

/// Active / current / target triple derived from the work mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OperatingState {
    pub is_active: bool,
    pub current: CurrentPurifierState,
    pub target: TargetPurifierState,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize)]
pub enum FilterChangeIndication {
    FilterOk,
    ChangeFilter,
}

/// Characteristics of the air purifier service.
///
/// Each field is `None` when the backing snapshot field is absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PurifierState {
    pub active: Option<bool>,
    pub current_state: Option<CurrentPurifierState>,
    pub target_state: Option<TargetPurifierState>,
    /// Percent, 0..=100.
    pub rotation_speed: Option<f64>,
    pub lock_physical_controls: Option<bool>,
    /// Mirrors the ionizer.
    pub swing_mode: Option<bool>,
    pub filter_life_level: Option<f64>,
    pub filter_change: Option<FilterChangeIndication>,
}

/// Characteristics of the air quality sensor service.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AirQualityState {
    pub air_quality: AirQuality,
    pub pm2_5_density: f64,
    pub pm10_density: Option<f64>,
    /// µg/m³, converted from the reported ppb.
    pub voc_density: Option<f64>,
}

/// Everything the sink needs to refresh one accessory.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AccessoryState {
    pub pnc_id: String,
    pub name: Option<String>,
    pub firmware_revision: Option<String>,
    pub purifier: PurifierState,
    pub air_quality: Option<AirQualityState>,
    pub temperature: Option<f64>,
    pub humidity: Option<f64>,
    pub carbon_dioxide: Option<f64>,
    pub ambient_light: Option<f64>,
    pub filter_door_open: Option<bool>,
}

/// Services an accessory exposes, chosen from its feature set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display, Serialize)]
pub enum ServiceKind {
    AirPurifier,
    AirQualitySensor,
    TemperatureSensor,
    CarbonDioxideSensor,
    HumiditySensor,
    LightSensor,
    ContactSensor,
}

impl ServiceKind {
    /// Explicit service name, when the host should not use its default.
    pub fn display_name(self) -> Option<&'static str> {
        match self {
            Self::ContactSensor => Some("Filter Door"),
            _ => None,
        }
    }
}

/// Registration record handed to the sink once per appliance.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AccessoryInfo {
    pub uuid: Uuid,
    pub pnc_id: String,
    pub name: String,
    pub manufacturer: String,
    pub model: String,
    pub serial_number: String,
    pub firmware_revision: Option<String>,
    pub services: Vec<ServiceKind>,
}

/// Stable accessory UUID for an appliance id.
pub fn accessory_uuid(pnc_id: &str) -> Uuid {
    Uuid::new_v5(&Uuid::NAMESPACE_OID, pnc_id.as_bytes())
}

/// A characteristic write coming from the accessory host.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum CharacteristicWrite {
    Active(bool),
    TargetState(TargetPurifierState),
    /// Percent, 0..=100.
    RotationSpeed(f64),
    LockPhysicalControls(bool),
    SwingMode(bool),
}
