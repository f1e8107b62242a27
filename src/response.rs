//! Outbound broker messages.

use std::fmt;

use crate::types::PowerState;

/// A message the caller should publish on the broker.
///
/// Produced by [`Bridge`](crate::Bridge) in response to inbound commands so
/// the bridge itself never owns a broker session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Publication {
    pub topic: String,
    pub payload: String,
    pub retain: bool,
}

impl Publication {
    /// A retained message.
    pub fn retained(topic: String, payload: impl fmt::Display) -> Self {
        Publication {
            topic,
            payload: payload.to_string(),
            retain: true,
        }
    }

    /// A retained `ON`/`OFF` state derived from a level.
    pub fn state(topic: String, level: u8) -> Self {
        Self::retained(topic, PowerState::from_level(level))
    }
}
