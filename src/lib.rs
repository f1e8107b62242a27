//! # dali_lamps_rs
//!
//! A state controller for DALI ballasts, exposed to an MQTT broker with
//! Home Assistant discovery metadata.
//!
//! The crate tracks each ballast's brightness limits and last known level,
//! clamps and de-duplicates brightness requests before they reach the bus,
//! and turns broker commands into bus commands plus the state messages to
//! publish back. It does not implement the DALI wire protocol or an MQTT
//! client: both are plugged in from outside.
//!
//! ## Quick Start
//!
//! ```
//! use std::sync::Arc;
//! use dali_lamps_rs::{Address, Lamp, MemoryBus, DiscoveryConfig};
//!
//! // Any `Driver` implementation works; `MemoryBus` simulates one.
//! let bus = Arc::new(MemoryBus::new("MemoryBus").with_ballast(0, 86, 254, 150));
//! let mut lamp = Lamp::new(bus, "Kitchen Ceiling Light", Address::Short(0));
//!
//! if lamp.needs_change(50) {
//!     assert_eq!(lamp.set_level(50), 86); // clamped to the ballast minimum
//! }
//!
//! let config = DiscoveryConfig::generate(&lamp, "dali2mqtt");
//! assert_eq!(config.brightness_scale, 254);
//! ```
//!
//! ## Features
//!
//! - **Lamps**: bounds read from the bus with per-field fallbacks, see [`Lamp`]
//! - **Clamping**: one policy shared by prediction and commit, see [`LevelBounds`]
//! - **Groups**: group-addressed lamps track their members
//! - **Discovery**: Home Assistant discovery documents via [`DiscoveryConfig`]
//! - **Bridge**: broker topics mapped onto lamps with [`Bridge`]
//! - **Scanning**: find ballasts and group memberships with [`scan_lamps`] and [`scan_groups`]
//!
//! ## Logging
//!
//! Diagnostics go through the [`log`] facade. Install whichever logger you
//! like in the final binary; nothing is printed otherwise.

mod address;
mod bridge;
mod config;
mod discovery;
mod driver;
mod errors;
mod lamp;
mod names;
mod response;
mod scan;
mod status;
mod topics;
mod types;

// Re-export public API
pub use address::{Address, AddressKind};
pub use bridge::Bridge;
pub use config::BridgeConfig;
pub use discovery::{DEVICE_NAME, DeviceInfo, DiscoveryConfig, PRODUCT_ID};
pub use driver::{Command, Driver, MemoryBus, Query, Reading};
pub use errors::Error;
pub use lamp::Lamp;
pub use names::{DeviceNames, slugify};
pub use response::Publication;
pub use scan::{scan_groups, scan_lamps};
pub use status::LampStatus;
pub use topics::{CommandTopic, Topics};
pub use types::{Availability, LevelBounds, PowerState};
