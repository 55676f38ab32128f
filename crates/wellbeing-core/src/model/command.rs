// ── Appliance commands ──
//
// A command is always a single vendor field and one value.

use serde::Serialize;
use serde_json::Value;

use super::appliance::WorkMode;

/// Single-field write sent to `PUT /Appliances/{pncId}/Commands`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum ApplianceCommand {
    WorkMode(WorkMode),
    /// Vendor fan step, 1..=9 on current models.
    FanSpeed(u8),
    SafetyLock(bool),
    Ionizer(bool),
}

impl ApplianceCommand {
    /// Vendor field name.
    pub fn field(&self) -> &'static str {
        match self {
            Self::WorkMode(_) => "WorkMode",
            Self::FanSpeed(_) => "FanSpeed",
            Self::SafetyLock(_) => "SafetyLock",
            Self::Ionizer(_) => "Ionizer",
        }
    }

    /// JSON value for the field. Toggles are sent as `0`/`1`.
    pub fn value(&self) -> Value {
        match self {
            Self::WorkMode(mode) => Value::from(mode.as_str()),
            Self::FanSpeed(speed) => Value::from(*speed),
            Self::SafetyLock(on) | Self::Ionizer(on) => Value::from(u8::from(*on)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use serde_json::json;

    #[test]
    fn commands_serialize_to_vendor_pairs() {
        let fan = ApplianceCommand::FanSpeed(5);
        assert_eq!((fan.field(), fan.value()), ("FanSpeed", json!(5)));

        let mode = ApplianceCommand::WorkMode(WorkMode::Auto);
        assert_eq!((mode.field(), mode.value()), ("WorkMode", json!("Auto")));

        let lock = ApplianceCommand::SafetyLock(true);
        assert_eq!((lock.field(), lock.value()), ("SafetyLock", json!(1)));

        let ionizer = ApplianceCommand::Ionizer(false);
        assert_eq!((ionizer.field(), ionizer.value()), ("Ionizer", json!(0)));
    }
}
