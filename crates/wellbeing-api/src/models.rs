// Wire types for the Wellbeing REST API.
//
// Field names follow the vendor schema verbatim via `serde(rename)`.
// Everything in the reported twin is optional: a missing field means the
// appliance model does not expose it.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// `{accessToken}` body returned by both the bootstrap and login endpoints.
#[derive(Debug, Deserialize)]
pub(crate) struct TokenResponse {
    #[serde(rename = "accessToken")]
    pub access_token: Option<String>,
}

/// Entry from `GET /Domains/Appliances`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplianceEntry {
    pub pnc_id: String,
    pub appliance_name: String,
    pub model_name: String,
}

/// Body of `GET /Appliances/{pncId}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplianceData {
    #[serde(default)]
    pub appliance_data: ApplianceInfo,
    #[serde(default)]
    pub twin: Twin,
}

impl ApplianceData {
    /// Shortcut to `twin.properties.reported`.
    pub fn reported(&self) -> &ReportedState {
        &self.twin.properties.reported
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplianceInfo {
    pub appliance_name: Option<String>,
    pub model_name: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Twin {
    #[serde(default)]
    pub properties: TwinProperties,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TwinProperties {
    #[serde(default)]
    pub reported: ReportedState,
}

/// The reported half of the device twin.
///
/// Unrecognized vendor fields are ignored during deserialization. Each known
/// field decodes on its own: a value of an unexpected type becomes `None`
/// without failing the rest of the body.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReportedState {
    #[serde(rename = "FrmVer_NIU", default, deserialize_with = "flexible_string")]
    pub firmware_version: Option<String>,
    #[serde(rename = "Workmode", default, deserialize_with = "flexible_string")]
    pub work_mode: Option<String>,
    #[serde(rename = "FilterRFID", default, deserialize_with = "flexible_string")]
    pub filter_rfid: Option<String>,
    #[serde(rename = "FilterLife", default, deserialize_with = "flexible_f64")]
    pub filter_life: Option<f64>,
    #[serde(rename = "Fanspeed", default, deserialize_with = "flexible_u8")]
    pub fan_speed: Option<u8>,
    #[serde(rename = "UILight", default, deserialize_with = "flexible_bool")]
    pub ui_light: Option<bool>,
    #[serde(rename = "SafetyLock", default, deserialize_with = "flexible_bool")]
    pub safety_lock: Option<bool>,
    #[serde(rename = "Ionizer", default, deserialize_with = "flexible_bool")]
    pub ionizer: Option<bool>,
    #[serde(rename = "Sleep", default, deserialize_with = "flexible_bool")]
    pub sleep: Option<bool>,
    #[serde(rename = "Scheduler", default, deserialize_with = "flexible_bool")]
    pub scheduler: Option<bool>,
    #[serde(rename = "FilterType", default, deserialize_with = "flexible_i64")]
    pub filter_type: Option<i64>,
    #[serde(rename = "$version", default, deserialize_with = "flexible_i64")]
    pub version: Option<i64>,
    #[serde(rename = "DoorOpen", default, deserialize_with = "flexible_bool")]
    pub door_open: Option<bool>,
    #[serde(rename = "PM1", default, deserialize_with = "flexible_f64")]
    pub pm1: Option<f64>,
    #[serde(rename = "PM2_5", default, deserialize_with = "flexible_f64")]
    pub pm25: Option<f64>,
    #[serde(rename = "PM10", default, deserialize_with = "flexible_f64")]
    pub pm10: Option<f64>,
    #[serde(rename = "TVOC", default, deserialize_with = "flexible_f64")]
    pub tvoc: Option<f64>,
    #[serde(rename = "CO2", default, deserialize_with = "flexible_f64")]
    pub co2: Option<f64>,
    #[serde(rename = "Temp", default, deserialize_with = "flexible_f64")]
    pub temp: Option<f64>,
    #[serde(rename = "Humidity", default, deserialize_with = "flexible_f64")]
    pub humidity: Option<f64>,
    #[serde(rename = "EnvLightLvl", default, deserialize_with = "flexible_f64")]
    pub env_light_level: Option<f64>,
    #[serde(rename = "RSSI", default, deserialize_with = "flexible_f64")]
    pub rssi: Option<f64>,
}

/// Accept `true`/`false`, `0`/`1` and `"on"`/`"off"`.
///
/// Anything else (including `null`) decodes as absent.
fn flexible_bool<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Value>::deserialize(deserializer)?;
    Ok(match raw {
        Some(Value::Bool(b)) => Some(b),
        Some(Value::Number(n)) => n.as_f64().map(|v| v != 0.0),
        Some(Value::String(s)) => match s.to_ascii_lowercase().as_str() {
            "on" | "true" | "1" => Some(true),
            "off" | "false" | "0" => Some(false),
            _ => None,
        },
        _ => None,
    })
}

/// Any JSON number, truncated toward zero and saturated into `u8`.
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::as_conversions
)]
fn flexible_u8<'de, D>(deserializer: D) -> Result<Option<u8>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Value>::deserialize(deserializer)?;
    Ok(match raw {
        Some(Value::Number(n)) => n.as_u64().map_or_else(
            // Saturating cast; negative and NaN become 0.
            || n.as_f64().map(|v| v.trunc().clamp(0.0, f64::from(u8::MAX)) as u8),
            |v| Some(u8::try_from(v).unwrap_or(u8::MAX)),
        ),
        _ => None,
    })
}

/// Any JSON number, truncated toward zero and saturated into `i64`.
#[allow(clippy::cast_possible_truncation, clippy::as_conversions)]
fn flexible_i64<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Value>::deserialize(deserializer)?;
    Ok(match raw {
        Some(Value::Number(n)) => n.as_i64().or_else(|| {
            n.as_u64()
                .map(|_| i64::MAX)
                .or_else(|| n.as_f64().map(|v| v.trunc() as i64))
        }),
        _ => None,
    })
}

fn flexible_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Value>::deserialize(deserializer)?;
    Ok(match raw {
        Some(Value::Number(n)) => n.as_f64(),
        _ => None,
    })
}

fn flexible_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Value>::deserialize(deserializer)?;
    Ok(match raw {
        Some(Value::String(s)) => Some(s),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    use serde_json::json;

    #[test]
    fn reported_state_maps_vendor_names_and_drops_unknown_fields() {
        let raw = json!({
            "FrmVer_NIU": "1.0.0",
            "Workmode": "Auto",
            "Fanspeed": 3,
            "PM2_5": 4,
            "$version": 12,
            "SafetyLock": 1,
            "Ionizer": false,
            "SomethingNew": "ignored"
        });

        let reported: ReportedState = serde_json::from_value(raw).expect("valid twin");

        assert_eq!(reported.firmware_version.as_deref(), Some("1.0.0"));
        assert_eq!(reported.work_mode.as_deref(), Some("Auto"));
        assert_eq!(reported.fan_speed, Some(3));
        assert_eq!(reported.pm25, Some(4.0));
        assert_eq!(reported.version, Some(12));
        assert_eq!(reported.safety_lock, Some(true));
        assert_eq!(reported.ionizer, Some(false));
        assert_eq!(reported.temp, None);
        assert_eq!(reported.door_open, None);
    }

    #[test]
    fn mistyped_field_decodes_as_absent_without_losing_the_rest() {
        let raw = json!({
            "twin": { "properties": { "reported": {
                "Workmode": "Manual",
                "Fanspeed": 3.0,
                "FilterType": "HEPA",
                "FilterRFID": 42,
                "$version": 7.9,
                "PM2_5": 11,
                "Temp": "warm"
            }}}
        });

        let data: ApplianceData = serde_json::from_value(raw).expect("body decodes");
        let reported = data.reported();

        assert_eq!(reported.work_mode.as_deref(), Some("Manual"));
        assert_eq!(reported.fan_speed, Some(3));
        assert_eq!(reported.filter_type, None);
        assert_eq!(reported.filter_rfid, None);
        assert_eq!(reported.version, Some(7));
        assert_eq!(reported.pm25, Some(11.0));
        assert_eq!(reported.temp, None);
    }

    #[test]
    fn fan_speed_saturates_into_u8() {
        let high: ReportedState =
            serde_json::from_value(json!({ "Fanspeed": 300 })).expect("valid twin");
        assert_eq!(high.fan_speed, Some(u8::MAX));

        let fractional: ReportedState =
            serde_json::from_value(json!({ "Fanspeed": 4.7 })).expect("valid twin");
        assert_eq!(fractional.fan_speed, Some(4));

        let negative: ReportedState =
            serde_json::from_value(json!({ "Fanspeed": -2 })).expect("valid twin");
        assert_eq!(negative.fan_speed, Some(0));

        let null: ReportedState =
            serde_json::from_value(json!({ "Fanspeed": null })).expect("valid twin");
        assert_eq!(null.fan_speed, None);
    }

    #[test]
    fn appliance_data_tolerates_missing_twin() {
        let data: ApplianceData =
            serde_json::from_value(json!({ "applianceData": { "applianceName": "Bedroom" } }))
                .expect("valid body");
        assert_eq!(data.appliance_data.appliance_name.as_deref(), Some("Bedroom"));
        assert_eq!(data.reported(), &ReportedState::default());
    }
}
