//! Bridge configuration.

use serde::{Deserialize, Serialize};

use crate::address::Address;

/// Settings shared by every lamp exposed through the broker.
///
/// Every field has a default, so a partial (or empty) document deserializes.
///
/// # Examples
///
/// ```
/// use dali_lamps_rs::BridgeConfig;
///
/// let config: BridgeConfig = serde_json::from_str(r#"{"base_topic": "house/dali"}"#).unwrap();
/// assert_eq!(config.base_topic, "house/dali");
/// assert_eq!(config.ha_discovery_prefix, "homeassistant");
/// assert_eq!(config.max_lamps, 64);
/// ```
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct BridgeConfig {
    /// Prefix of every lamp and bridge topic
    pub base_topic: String,
    /// Prefix Home Assistant listens on for discovery documents
    pub ha_discovery_prefix: String,
    /// Number of short addresses queried during a scan
    pub max_lamps: u8,
}

impl BridgeConfig {
    pub const DEFAULT_BASE_TOPIC: &'static str = "dali2mqtt";
    pub const DEFAULT_HA_DISCOVERY_PREFIX: &'static str = "homeassistant";
}

impl Default for BridgeConfig {
    fn default() -> Self {
        BridgeConfig {
            base_topic: Self::DEFAULT_BASE_TOPIC.to_string(),
            ha_discovery_prefix: Self::DEFAULT_HA_DISCOVERY_PREFIX.to_string(),
            max_lamps: Address::SHORT_COUNT,
        }
    }
}
