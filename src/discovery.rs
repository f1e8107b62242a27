//! Home Assistant MQTT discovery documents.

use serde::{Deserialize, Serialize};

use crate::errors::Error;
use crate::lamp::Lamp;
use crate::topics::Topics;
use crate::types::{Availability, PowerState};

type Result<T> = std::result::Result<T, Error>;

/// Identifier shared by every entity this bridge exposes.
pub const PRODUCT_ID: &str = "dali2mqtt";
/// Display name of the device grouping every lamp in the hub.
pub const DEVICE_NAME: &str = "DALI Lights";

/// Identity block nesting all lamps under one hub device.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct DeviceInfo {
    #[serde(rename = "ids")]
    pub identifiers: String,
    pub name: String,
    #[serde(rename = "sw")]
    pub sw_version: String,
    #[serde(rename = "mdl")]
    pub model: String,
    #[serde(rename = "mf")]
    pub manufacturer: String,
}

/// Discovery document for one lamp, using Home Assistant's abbreviated keys.
///
/// The document is a pure function of the lamp's fields and the base topic;
/// publishing it (retained, on [`Topics::discovery`]) is up to the caller.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use dali_lamps_rs::{Address, DiscoveryConfig, Lamp, MemoryBus};
///
/// let bus = Arc::new(MemoryBus::new("MemoryBus").with_ballast(3, 86, 254, 0));
/// let lamp = Lamp::new(bus, "Hall", Address::Short(3));
/// let config = DiscoveryConfig::generate(&lamp, "dali2mqtt");
///
/// assert_eq!(config.unique_id, "MemoryBus_A3");
/// assert_eq!(config.brightness_command_topic, "dali2mqtt/hall/light/brightness/set");
/// assert_eq!(config.to_json().unwrap(), config.to_json().unwrap());
/// ```
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct DiscoveryConfig {
    pub name: String,
    #[serde(rename = "obj_id")]
    pub object_id: String,
    #[serde(rename = "uniq_id")]
    pub unique_id: String,
    #[serde(rename = "stat_t")]
    pub state_topic: String,
    #[serde(rename = "cmd_t")]
    pub command_topic: String,
    #[serde(rename = "pl_off")]
    pub payload_off: PowerState,
    #[serde(rename = "bri_stat_t")]
    pub brightness_state_topic: String,
    #[serde(rename = "bri_cmd_t")]
    pub brightness_command_topic: String,
    #[serde(rename = "bri_scl")]
    pub brightness_scale: u8,
    pub on_cmd_type: String,
    #[serde(rename = "avty_t")]
    pub availability_topic: String,
    #[serde(rename = "pl_avail")]
    pub payload_available: Availability,
    #[serde(rename = "pl_not_avail")]
    pub payload_not_available: Availability,
    pub device: DeviceInfo,
}

impl DiscoveryConfig {
    const ON_COMMAND_TYPE: &'static str = "brightness";

    pub fn generate(lamp: &Lamp, base_topic: &str) -> Self {
        let topics = Topics::new(base_topic);
        let device = lamp.device_name();

        DiscoveryConfig {
            name: lamp.friendly_name().to_string(),
            object_id: format!("dali_light_{device}"),
            unique_id: format!("{}_{}", lamp.driver_name(), lamp.address()),
            state_topic: topics.state(device),
            command_topic: topics.command(device),
            payload_off: PowerState::Off,
            brightness_state_topic: topics.brightness_state(device),
            brightness_command_topic: topics.brightness_command(device),
            brightness_scale: lamp.max_level(),
            on_cmd_type: Self::ON_COMMAND_TYPE.to_string(),
            availability_topic: topics.availability(),
            payload_available: Availability::Online,
            payload_not_available: Availability::Offline,
            device: DeviceInfo {
                identifiers: PRODUCT_ID.to_string(),
                name: DEVICE_NAME.to_string(),
                sw_version: format!("{PRODUCT_ID} {}", env!("CARGO_PKG_VERSION")),
                model: lamp.driver_name().to_string(),
                manufacturer: PRODUCT_ID.to_string(),
            },
        }
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).map_err(Error::JsonDump)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::{Value, json};

    use super::*;
    use crate::address::Address;
    use crate::driver::MemoryBus;

    fn lamp() -> Lamp {
        let bus = Arc::new(MemoryBus::new("SyncHassebDALIUSBDriver").with_ballast(7, 86, 200, 0));
        Lamp::new(bus, "Kitchen Ceiling Light", Address::Short(7))
    }

    #[test]
    fn test_document_fields() {
        let json = DiscoveryConfig::generate(&lamp(), "dali2mqtt").to_json().unwrap();
        let value: Value = serde_json::from_str(&json).unwrap();

        assert_eq!(
            value,
            json!({
                "name": "Kitchen Ceiling Light",
                "obj_id": "dali_light_kitchen-ceiling-light",
                "uniq_id": "SyncHassebDALIUSBDriver_A7",
                "stat_t": "dali2mqtt/kitchen-ceiling-light/light/status",
                "cmd_t": "dali2mqtt/kitchen-ceiling-light/light/switch",
                "pl_off": "OFF",
                "bri_stat_t": "dali2mqtt/kitchen-ceiling-light/light/brightness/status",
                "bri_cmd_t": "dali2mqtt/kitchen-ceiling-light/light/brightness/set",
                "bri_scl": 200,
                "on_cmd_type": "brightness",
                "avty_t": "dali2mqtt/status",
                "pl_avail": "online",
                "pl_not_avail": "offline",
                "device": {
                    "ids": "dali2mqtt",
                    "name": "DALI Lights",
                    "sw": format!("dali2mqtt {}", env!("CARGO_PKG_VERSION")),
                    "mdl": "SyncHassebDALIUSBDriver",
                    "mf": "dali2mqtt",
                },
            })
        );
    }

    #[test]
    fn test_generation_is_deterministic() {
        let lamp = lamp();
        let first = DiscoveryConfig::generate(&lamp, "base").to_json().unwrap();
        let second = DiscoveryConfig::generate(&lamp, "base").to_json().unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_group_unique_id() {
        let bus = Arc::new(MemoryBus::new("MemoryBus"));
        let group = Lamp::new(bus, "Upstairs", Address::Group(2));
        let config = DiscoveryConfig::generate(&group, "dali2mqtt");
        assert_eq!(config.unique_id, "MemoryBus_G2");
        assert_eq!(config.brightness_scale, 254);
    }
}
