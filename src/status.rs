//! Lamp status snapshots.

use serde::{Deserialize, Serialize};

use crate::address::Address;
use crate::lamp::Lamp;

/// A serializable snapshot of a lamp's cached state.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use dali_lamps_rs::{Address, Lamp, LampStatus, MemoryBus};
///
/// let bus = Arc::new(MemoryBus::new("MemoryBus"));
/// let status = LampStatus::from(&Lamp::new(bus, "Hall", Address::Short(1)));
/// let json = serde_json::to_string(&status).unwrap();
/// assert!(!json.contains("min_physical_level"));
/// assert!(json.contains(r#""level":0"#));
/// ```
#[serde_with::skip_serializing_none]
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct LampStatus {
    pub device_name: String,
    pub friendly_name: String,
    pub address: Address,
    pub level: u8,
    pub min_level: u8,
    pub max_level: u8,
    pub min_physical_level: Option<u8>,
    pub associated_lamps: Option<Vec<String>>,
}

impl From<&Lamp> for LampStatus {
    fn from(lamp: &Lamp) -> Self {
        LampStatus {
            device_name: lamp.device_name().to_string(),
            friendly_name: lamp.friendly_name().to_string(),
            address: lamp.address(),
            level: lamp.level(),
            min_level: lamp.min_level(),
            max_level: lamp.max_level(),
            min_physical_level: lamp.min_physical_level(),
            associated_lamps: lamp.associated_lamps().map(<[String]>::to_vec),
        }
    }
}
