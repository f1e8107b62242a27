//! Bridge availability payloads.

use serde::{Deserialize, Serialize};
use strum_macros::Display;

/// Whether the bridge is connected, as published on the availability topic.
#[derive(Debug, Display, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Availability {
    Online,
    Offline,
}
