//! Broker-facing lamp registry.

use std::collections::HashMap;
use std::num::IntErrorKind;
use std::str::FromStr;
use std::sync::Arc;

use log::{debug, error, info};

use crate::address::Address;
use crate::config::BridgeConfig;
use crate::discovery::DiscoveryConfig;
use crate::driver::Driver;
use crate::errors::Error;
use crate::lamp::Lamp;
use crate::names::DeviceNames;
use crate::response::Publication;
use crate::scan::{scan_groups, scan_lamps};
use crate::status::LampStatus;
use crate::topics::{CommandTopic, Topics};
use crate::types::{Availability, PowerState};

type Result<T> = std::result::Result<T, Error>;

/// Owns every lamp on a bus and maps broker traffic onto them.
///
/// The bridge never talks to a broker: inbound messages are passed to
/// [`Bridge::handle_message`] and the returned [`Publication`]s are for the
/// caller to publish. Every mutating method takes `&mut self`, so all writes
/// to a lamp are serialized through the bridge.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use dali_lamps_rs::{Bridge, BridgeConfig, DeviceNames, MemoryBus};
///
/// let bus = Arc::new(MemoryBus::new("MemoryBus").with_ballast(0, 86, 254, 0));
/// let mut names = DeviceNames::default();
/// names.insert(dali_lamps_rs::Address::Short(0), "Desk");
///
/// let mut bridge = Bridge::new(bus, BridgeConfig::default(), names);
/// bridge.initialize().unwrap();
///
/// let out = bridge
///     .handle_message("dali2mqtt/desk/light/brightness/set", "120")
///     .unwrap();
/// assert_eq!(out[0].topic, "dali2mqtt/desk/light/status");
/// assert_eq!(out[0].payload, "ON");
/// assert_eq!(bridge.lamp("desk").unwrap().level(), 120);
/// ```
pub struct Bridge {
    config: BridgeConfig,
    topics: Topics,
    driver: Arc<dyn Driver>,
    names: DeviceNames,
    lamps: HashMap<String, Lamp>,
    order: Vec<String>,
    by_address: HashMap<Address, String>,
    memberships: HashMap<String, Vec<String>>,
}

impl Bridge {
    pub fn new(driver: Arc<dyn Driver>, config: BridgeConfig, names: DeviceNames) -> Self {
        Bridge {
            topics: Topics::new(&config.base_topic),
            config,
            driver,
            names,
            lamps: HashMap::new(),
            order: Vec::new(),
            by_address: HashMap::new(),
            memberships: HashMap::new(),
        }
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    pub fn topics(&self) -> &Topics {
        &self.topics
    }

    /// Get a lamp by device name.
    pub fn lamp(&self, device: &str) -> Option<&Lamp> {
        self.lamps.get(device)
    }

    /// Get a lamp by bus address.
    pub fn lamp_at(&self, address: Address) -> Option<&Lamp> {
        self.by_address
            .get(&address)
            .and_then(|device| self.lamps.get(device))
    }

    /// Lamps in registration order: ballasts first, then groups.
    pub fn lamps(&self) -> impl Iterator<Item = &Lamp> {
        self.order.iter().filter_map(|device| self.lamps.get(device))
    }

    pub fn statuses(&self) -> Vec<LampStatus> {
        self.lamps().map(LampStatus::from).collect()
    }

    /// Device names of the groups a lamp belongs to.
    pub fn groups_of(&self, device: &str) -> &[String] {
        self.memberships
            .get(device)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Friendly names of every registered lamp, suitable for persisting.
    pub fn device_names(&self) -> DeviceNames {
        let mut names = DeviceNames::default();
        for lamp in self.lamps() {
            names.insert(lamp.address(), lamp.friendly_name());
        }
        names
    }

    /// Topic filters the broker session should subscribe to.
    pub fn subscriptions(&self) -> Vec<String> {
        self.topics.subscriptions()
    }

    /// Retained availability message announcing the bridge.
    pub fn online(&self) -> Publication {
        Publication::retained(self.topics.availability(), Availability::Online)
    }

    /// Will message for the broker session.
    pub fn last_will(&self) -> Publication {
        Publication::retained(self.topics.availability(), Availability::Offline)
    }

    /// Scan the bus and rebuild every lamp and group.
    ///
    /// Returns the availability message followed by the discovery document
    /// and retained state of every lamp.
    pub fn initialize(&mut self) -> Result<Vec<Publication>> {
        self.lamps.clear();
        self.order.clear();
        self.by_address.clear();
        self.memberships.clear();

        let mut publications = vec![self.online()];

        let addresses = scan_lamps(self.driver.as_ref(), self.config.max_lamps);
        for address in &addresses {
            let lamp = Lamp::new(
                self.driver.clone(),
                &self.names.friendly_name(*address),
                *address,
            );
            let device = self.register(lamp);
            publications.extend(self.lamp_publications(&device)?);
        }

        for (group, members) in scan_groups(self.driver.as_ref(), &addresses) {
            debug!("Publishing group {group}");
            let address = Address::Group(group);
            let mut group_lamp = Lamp::new(
                self.driver.clone(),
                &self.names.friendly_name(address),
                address,
            );
            for member in members.iter().filter_map(|a| self.lamp_at(*a)) {
                group_lamp.add_associated_lamp(member);
            }

            let device = self.register(group_lamp);
            let member_devices: Vec<String> = members
                .iter()
                .filter_map(|a| self.by_address.get(a).cloned())
                .collect();
            for member in member_devices {
                self.memberships
                    .entry(member)
                    .or_default()
                    .push(device.clone());
            }
            publications.extend(self.lamp_publications(&device)?);
        }

        info!("Initialized {} lamps", self.order.len());
        Ok(publications)
    }

    /// Apply an inbound broker message.
    ///
    /// Malformed payloads are logged and ignored; messages for unknown
    /// lamps or outside the command layout are errors.
    pub fn handle_message(&mut self, topic: &str, payload: &str) -> Result<Vec<Publication>> {
        debug!("Command on {topic}: {payload}");
        let Some(command) = self.topics.parse(topic) else {
            return Err(Error::UnknownTopic(topic.to_string()));
        };

        match command {
            CommandTopic::Switch(device) => self.switch(&device, payload),
            CommandTopic::Brightness(device) => self.brightness(&device, payload),
            CommandTopic::BrightnessGet(device) => self.brightness_get(&device),
            CommandTopic::Scan => self.initialize(),
        }
    }

    /// Insert a lamp, renaming it if its device name is taken.
    fn register(&mut self, mut lamp: Lamp) -> String {
        while lamp.device_name().is_empty() || self.lamps.contains_key(lamp.device_name()) {
            lamp.disambiguate();
        }
        info!("{lamp}");

        let device = lamp.device_name().to_string();
        self.by_address.insert(lamp.address(), device.clone());
        self.order.push(device.clone());
        self.lamps.insert(device.clone(), lamp);
        device
    }

    fn lamp_mut(&mut self, device: &str) -> Result<&mut Lamp> {
        self.lamps
            .get_mut(device)
            .ok_or_else(|| Error::LampNotFound(device.to_string()))
    }

    fn lamp_publications(&self, device: &str) -> Result<Vec<Publication>> {
        let Some(lamp) = self.lamps.get(device) else {
            return Err(Error::LampNotFound(device.to_string()));
        };

        let discovery = DiscoveryConfig::generate(lamp, self.topics.base()).to_json()?;
        let mut publications = vec![
            Publication::retained(
                Topics::discovery(&self.config.ha_discovery_prefix, device),
                discovery,
            ),
            Publication::retained(self.topics.brightness_state(device), lamp.level()),
            Publication::retained(self.topics.max_level(device), lamp.max_level()),
            Publication::retained(self.topics.min_level(device), lamp.min_level()),
        ];
        if let Some(physical) = lamp.min_physical_level() {
            publications.push(Publication::retained(
                self.topics.physical_minimum_level(device),
                physical,
            ));
        }
        publications.push(Publication::state(self.topics.state(device), lamp.level()));
        Ok(publications)
    }

    fn level_publications(&self, device: &str, level: u8) -> Vec<Publication> {
        vec![
            Publication::state(self.topics.state(device), level),
            Publication::retained(self.topics.brightness_state(device), level),
        ]
    }

    fn switch(&mut self, device: &str, payload: &str) -> Result<Vec<Publication>> {
        let lamp = self.lamp_mut(device)?;
        match PowerState::from_str(payload.trim()) {
            Ok(PowerState::Off) => {
                debug!("Set light <{device}> to OFF");
                lamp.off();
                let mut publications = vec![Publication::state(self.topics.state(device), 0)];
                publications.extend(self.refresh_associated(device));
                Ok(publications)
            }
            // Turning on is driven through the brightness topic.
            Ok(PowerState::On) => Ok(Vec::new()),
            Err(_) => {
                error!("Can't interpret <{payload}> as a switch command for {device}");
                Ok(Vec::new())
            }
        }
    }

    fn brightness(&mut self, device: &str, payload: &str) -> Result<Vec<Publication>> {
        let lamp = self.lamp_mut(device)?;
        // Out-of-range integers saturate and are clamped like any other request.
        let requested = match payload.trim().parse::<i32>() {
            Ok(v) => v,
            Err(e) if *e.kind() == IntErrorKind::PosOverflow => i32::MAX,
            Err(e) if *e.kind() == IntErrorKind::NegOverflow => i32::MIN,
            Err(_) => {
                error!(
                    "Can't convert <{payload}> to integer {}..{}",
                    lamp.min_level(),
                    lamp.max_level()
                );
                return Ok(Vec::new());
            }
        };

        if !lamp.needs_change(requested) {
            debug!("Light <{device}> already at {requested}");
            return Ok(Vec::new());
        }

        let level = lamp.set_level(requested);
        if level == 0 {
            lamp.off();
            debug!("Set light <{device}> to OFF");
        }

        let mut publications = self.level_publications(device, level);
        publications.extend(self.refresh_associated(device));
        Ok(publications)
    }

    fn brightness_get(&mut self, device: &str) -> Result<Vec<Publication>> {
        let level = self.lamp_mut(device)?.refresh();
        Ok(self.level_publications(device, level))
    }

    /// Re-read lamps whose level may have changed alongside `device`.
    fn refresh_associated(&mut self, device: &str) -> Vec<Publication> {
        let mut targets: Vec<String> = Vec::new();
        let mut push = |name: &String| {
            if name != device && !targets.contains(name) {
                targets.push(name.clone());
            }
        };

        match self.lamps.get(device) {
            Some(lamp) if lamp.is_group() => {
                for member in lamp.associated_lamps().unwrap_or_default() {
                    push(member);
                    for other in self.groups_of(member) {
                        push(other);
                    }
                }
            }
            Some(_) => self.groups_of(device).iter().for_each(&mut push),
            None => {}
        }

        let mut publications = Vec::new();
        for target in targets {
            if let Some(lamp) = self.lamps.get_mut(&target) {
                let level = lamp.refresh();
                publications.extend(self.level_publications(&target, level));
            }
        }
        publications
    }
}
