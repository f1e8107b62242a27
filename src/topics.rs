//! MQTT topic layout.
//!
//! Every per-lamp topic is `<base>/<device>/light/...`, so two lamps share
//! a topic only if they share a device name.

/// The kind of inbound command carried by a topic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandTopic {
    /// `ON`/`OFF` switch for the named device
    Switch(String),
    /// Brightness to set on the named device
    Brightness(String),
    /// Request to re-read the named device's level
    BrightnessGet(String),
    /// Request to rescan the bus
    Scan,
}

/// Topic builder bound to a base topic.
///
/// # Examples
///
/// ```
/// use dali_lamps_rs::Topics;
///
/// let topics = Topics::new("dali2mqtt");
/// assert_eq!(topics.state("hall"), "dali2mqtt/hall/light/status");
/// assert_eq!(topics.brightness_command("hall"), "dali2mqtt/hall/light/brightness/set");
/// assert_eq!(topics.availability(), "dali2mqtt/status");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Topics {
    base: String,
}

impl Topics {
    const LIGHT: &'static str = "light";
    const BRIGHTNESS: &'static str = "light/brightness";

    pub fn new(base: &str) -> Self {
        Topics {
            base: base.trim_end_matches('/').to_string(),
        }
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    pub fn availability(&self) -> String {
        format!("{}/status", self.base)
    }

    pub fn scan(&self) -> String {
        format!("{}/scan", self.base)
    }

    pub fn state(&self, device: &str) -> String {
        format!("{}/{device}/{}/status", self.base, Self::LIGHT)
    }

    pub fn command(&self, device: &str) -> String {
        format!("{}/{device}/{}/switch", self.base, Self::LIGHT)
    }

    pub fn brightness_state(&self, device: &str) -> String {
        format!("{}/{device}/{}/status", self.base, Self::BRIGHTNESS)
    }

    pub fn brightness_command(&self, device: &str) -> String {
        format!("{}/{device}/{}/set", self.base, Self::BRIGHTNESS)
    }

    pub fn brightness_get(&self, device: &str) -> String {
        format!("{}/{device}/{}/get/lamp", self.base, Self::BRIGHTNESS)
    }

    pub fn max_level(&self, device: &str) -> String {
        format!("{}/{device}/{}/max_level", self.base, Self::BRIGHTNESS)
    }

    pub fn min_level(&self, device: &str) -> String {
        format!("{}/{device}/{}/min_level", self.base, Self::BRIGHTNESS)
    }

    pub fn physical_minimum_level(&self, device: &str) -> String {
        format!("{}/{device}/{}/physical_minimum_level", self.base, Self::BRIGHTNESS)
    }

    /// Where Home Assistant expects the discovery document for a device.
    pub fn discovery(ha_prefix: &str, device: &str) -> String {
        format!("{ha_prefix}/light/dali2mqtt_{device}/config")
    }

    /// Subscription filters for every inbound command.
    pub fn subscriptions(&self) -> Vec<String> {
        vec![
            self.command("+"),
            self.brightness_command("+"),
            self.brightness_get("+"),
            self.scan(),
        ]
    }

    /// Classify an inbound topic.
    ///
    /// Returns `None` for topics outside the command layout.
    pub fn parse(&self, topic: &str) -> Option<CommandTopic> {
        let rest = topic.strip_prefix(&self.base)?.strip_prefix('/')?;
        if rest == "scan" {
            return Some(CommandTopic::Scan);
        }

        let (device, suffix) = rest.split_once('/')?;
        if device.is_empty() {
            return None;
        }
        let device = device.to_string();
        match suffix {
            "light/switch" => Some(CommandTopic::Switch(device)),
            "light/brightness/set" => Some(CommandTopic::Brightness(device)),
            "light/brightness/get/lamp" => Some(CommandTopic::BrightnessGet(device)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lamp_topics_are_distinct() {
        let topics = Topics::new("base/");
        let all = [
            topics.state("a"),
            topics.command("a"),
            topics.brightness_state("a"),
            topics.brightness_command("a"),
            topics.brightness_get("a"),
            topics.max_level("a"),
            topics.min_level("a"),
            topics.physical_minimum_level("a"),
            topics.state("b"),
        ];
        for (i, t) in all.iter().enumerate() {
            assert!(t.starts_with("base/"));
            assert!(!all[i + 1..].contains(t), "duplicate topic {t}");
        }
    }

    #[test]
    fn test_parse_round_trips_commands() {
        let topics = Topics::new("dali2mqtt");
        assert_eq!(
            topics.parse(&topics.command("hall")),
            Some(CommandTopic::Switch("hall".into()))
        );
        assert_eq!(
            topics.parse(&topics.brightness_command("hall")),
            Some(CommandTopic::Brightness("hall".into()))
        );
        assert_eq!(
            topics.parse(&topics.brightness_get("hall")),
            Some(CommandTopic::BrightnessGet("hall".into()))
        );
        assert_eq!(topics.parse(&topics.scan()), Some(CommandTopic::Scan));
    }

    #[test]
    fn test_parse_rejects_foreign_topics() {
        let topics = Topics::new("dali2mqtt");
        assert_eq!(topics.parse("other/hall/light/switch"), None);
        assert_eq!(topics.parse("dali2mqttx/hall/light/switch"), None);
        assert_eq!(topics.parse(&topics.state("hall")), None);
        assert_eq!(topics.parse("dali2mqtt//light/switch"), None);
    }

    #[test]
    fn test_discovery_topic() {
        assert_eq!(
            Topics::discovery("homeassistant", "hall"),
            "homeassistant/light/dali2mqtt_hall/config"
        );
    }
}
