use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;

use crate::decoding::Reading;

/// Entry of `/app/member/appHome/list`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Home {
    pub hid: i64,
    #[serde(default, alias = "homeName")]
    pub name: Option<String>,
}

/// Hub entry of `/app/device/getDeviceByHid`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HubDescriptor {
    pub mid: i64,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default, rename = "subDevices")]
    pub sub_devices: Vec<SubDeviceDescriptor>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubDeviceDescriptor {
    pub addr: i64,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
}

/// Payload of `/app/device/getDeviceStatus`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HubStatus {
    #[serde(default, rename = "subDeviceStatus")]
    pub sub_device_status: Vec<RawStatusEntry>,
    /// Fields this crate does not interpret, kept for diagnostics
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// One `D<addr>` status entry; an absent or empty value means offline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawStatusEntry {
    pub id: String,
    #[serde(default)]
    pub value: Option<String>,
    /// Epoch milliseconds
    #[serde(default, rename = "time")]
    pub timestamp: Option<i64>,
}

impl RawStatusEntry {
    /// Sub-device address for ids of the form `D<addr>`
    pub fn address(&self) -> Option<i64> {
        self.id.strip_prefix('D')?.parse().ok()
    }

    /// The raw payload, or `None` when the device reported nothing
    pub fn raw_value(&self) -> Option<&str> {
        self.value.as_deref().filter(|v| !v.is_empty())
    }
}

/// A hub together with the home it was listed under
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Hub {
    pub home_id: i64,
    #[serde(flatten)]
    pub descriptor: HubDescriptor,
}

/// Stable identity of a sub-device across polls
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct SensorKey {
    pub home_id: i64,
    pub hub_id: i64,
    pub address: i64,
}

impl fmt::Display for SensorKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}_{}", self.home_id, self.hub_id, self.address)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SensorRecord {
    pub key: SensorKey,
    pub hub_name: String,
    pub sub_device_name: Option<String>,
    pub model: Option<String>,
    pub last_raw_status: RawStatusEntry,
    pub decoded: Option<Reading>,
}

impl SensorRecord {
    pub fn display_name(&self) -> String {
        self.sub_device_name
            .clone()
            .unwrap_or_else(|| format!("addr_{}", self.key.address))
    }
}

/// Result of one poll cycle; replaces the previous one wholesale
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PollResult {
    pub hubs: Vec<Hub>,
    pub status: HashMap<i64, HubStatus>,
    pub sensors: BTreeMap<SensorKey, SensorRecord>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn status_entry_address_and_value() {
        let entry: RawStatusEntry =
            serde_json::from_value(json!({"id": "D07", "value": "10#E1", "time": 1700000000000i64}))
                .unwrap();
        assert_eq!(entry.address(), Some(7));
        assert_eq!(entry.raw_value(), Some("10#E1"));
        assert_eq!(entry.timestamp, Some(1_700_000_000_000));

        let offline: RawStatusEntry =
            serde_json::from_value(json!({"id": "D1", "value": ""})).unwrap();
        assert_eq!(offline.raw_value(), None);

        let other: RawStatusEntry = serde_json::from_value(json!({"id": "connected"})).unwrap();
        assert_eq!(other.address(), None);
        assert_eq!(other.raw_value(), None);
    }

    #[test]
    fn hub_descriptor_defaults_missing_lists() {
        let hub: HubDescriptor = serde_json::from_value(json!({"mid": 5})).unwrap();
        assert!(hub.sub_devices.is_empty());
        assert_eq!(hub.name, None);

        let status: HubStatus = serde_json::from_value(json!({"online": true})).unwrap();
        assert!(status.sub_device_status.is_empty());
        assert_eq!(status.extra.get("online"), Some(&json!(true)));
    }

    #[test]
    fn sensor_key_display() {
        let key = SensorKey {
            home_id: 1,
            hub_id: 22,
            address: 3,
        };
        assert_eq!(key.to_string(), "1_22_3");
    }
}
