//! Polling, state mapping and accessory lifecycle for the Wellbeing bridge.
//!
//! - **[`Poller`]** owns the authenticated session from `wellbeing-api`,
//!   fetches appliance snapshots concurrently and sends single-field
//!   commands. Its non-`try_` methods never return errors, so a poll cycle
//!   cannot fail.
//!
//! - **[`mapper`]** is the pure translation layer between the vendor
//!   twin and accessory characteristics, in both directions.
//!
//! - **[`Bridge`]** drives the whole lifecycle against an injected
//!   [`AccessorySink`]: connect, discover, register, poll on a timer, and
//!   route characteristic writes back as commands.

pub mod bridge;
pub mod config;
pub mod error;
pub mod mapper;
pub mod model;
pub mod poller;

// ── Primary re-exports ──────────────────────────────────────────────
pub use bridge::{AccessorySink, Bridge, StartOutcome};
pub use config::BridgeConfig;
pub use error::CoreError;
pub use poller::{PollInterval, Poller, effective_poll_interval};

pub use model::{
    AccessoryInfo, AccessoryState, AirQuality, AirQualityState, ApplianceCommand,
    ApplianceIdentity, ApplianceSnapshot, CharacteristicWrite, CurrentPurifierState, Feature,
    FilterChangeIndication, OperatingState, PurifierState, ServiceKind, TargetPurifierState,
    WorkMode,
};
