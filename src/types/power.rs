//! On/off payloads for light state topics.

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Power state of a lamp as published on its state topic.
#[derive(
    Debug, Display, EnumString, AsRefStr, Serialize, Deserialize, Clone, Copy, PartialEq, Eq,
)]
#[strum(serialize_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum PowerState {
    /// The lamp is lit at some level
    On,
    /// The lamp is at level 0
    Off,
}

impl PowerState {
    pub fn from_level(level: u8) -> Self {
        if level == 0 {
            PowerState::Off
        } else {
            PowerState::On
        }
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    #[test]
    fn test_payload_text() {
        assert_eq!(PowerState::On.to_string(), "ON");
        assert_eq!(PowerState::Off.as_ref(), "OFF");
        assert_eq!(PowerState::from_str("OFF").unwrap(), PowerState::Off);
        assert!(PowerState::from_str("off").is_err());
    }

    #[test]
    fn test_from_level() {
        assert_eq!(PowerState::from_level(0), PowerState::Off);
        assert_eq!(PowerState::from_level(1), PowerState::On);
    }
}
