// ── Domain model ──
//
// Canonical types shared by the poller, the mapper and the bridge.

pub mod accessory;
pub mod appliance;
pub mod command;

pub use accessory::{
    AccessoryInfo, AccessoryState, AirQuality, AirQualityState, CharacteristicWrite,
    CurrentPurifierState, FilterChangeIndication, OperatingState, PurifierState, ServiceKind,
    TargetPurifierState, accessory_uuid,
};
pub use appliance::{ApplianceIdentity, ApplianceSnapshot, Feature, WorkMode};
pub use command::ApplianceCommand;
