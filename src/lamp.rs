//! Individual lamp control.

use std::fmt;
use std::sync::Arc;

use log::{debug, warn};

use crate::address::Address;
use crate::driver::{Command, Driver, Query, Reading};
use crate::names::slugify;
use crate::types::LevelBounds;

/// Represents a DALI ballast, or a bus group driven as one lamp.
///
/// A `Lamp` caches the ballast's brightness limits and its last known level.
/// Limits are read once from the bus on construction; the level changes on
/// every committed command and on [`Lamp::refresh`].
///
/// Mutating methods take `&mut self`: callers that share a lamp between a
/// command handler and a poller must serialize access (one owner, or a
/// mutex around the lamp) so that [`Lamp::needs_change`] followed by
/// [`Lamp::set_level`] is not interleaved with another write.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use dali_lamps_rs::{Address, Lamp, MemoryBus};
///
/// let bus = Arc::new(MemoryBus::new("MemoryBus").with_ballast(0, 86, 254, 150));
/// let mut lamp = Lamp::new(bus, "Kitchen Ceiling Light", Address::Short(0));
///
/// assert_eq!(lamp.device_name(), "kitchen-ceiling-light");
/// assert!(lamp.needs_change(50));
/// assert_eq!(lamp.set_level(50), 86);
/// assert!(!lamp.needs_change(50));
/// ```
pub struct Lamp {
    address: Address,
    friendly_name: String,
    device_name: String,
    min_physical_level: Option<u8>,
    bounds: LevelBounds,
    level: u8,
    associated_lamps: Option<Vec<String>>,
    driver: Arc<dyn Driver>,
}

impl fmt::Debug for Lamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Lamp")
            .field("address", &self.address)
            .field("friendly_name", &self.friendly_name)
            .field("device_name", &self.device_name)
            .field("min_physical_level", &self.min_physical_level)
            .field("bounds", &self.bounds)
            .field("level", &self.level)
            .field("associated_lamps", &self.associated_lamps)
            .field("driver", &self.driver.name())
            .finish()
    }
}

impl Lamp {
    /// Build a lamp from its bus readings.
    ///
    /// Each read degrades on its own: a missing physical minimum stays
    /// unknown, a missing minimum falls back to the physical minimum or
    /// [`LevelBounds::DEFAULT_MIN`], a missing maximum to
    /// [`LevelBounds::DEFAULT_MAX`], and a missing actual level reads as off.
    /// A reported actual level outside the limits (such as the 255 "unknown"
    /// answer) is clamped into them; nothing is sent to the bus.
    pub fn new(driver: Arc<dyn Driver>, friendly_name: &str, address: Address) -> Self {
        let min_physical_level = driver.query(Query::PhysicalMinimum, address).value();
        if min_physical_level.is_none() {
            warn!("Physical minimum of {address} unavailable, leaving it unset");
        }

        let min = match driver.query(Query::MinLevel, address) {
            Reading::Numeric(v) => v,
            Reading::Unavailable => {
                let fallback = min_physical_level.unwrap_or(LevelBounds::DEFAULT_MIN);
                warn!("Minimum level of {address} unavailable, using {fallback}");
                fallback
            }
        };

        let max = match driver.query(Query::MaxLevel, address) {
            Reading::Numeric(v) => v,
            Reading::Unavailable => {
                warn!(
                    "Maximum level of {address} unavailable, using {}",
                    LevelBounds::DEFAULT_MAX
                );
                LevelBounds::DEFAULT_MAX
            }
        };

        if min > max {
            warn!("Limits of {address} are inverted ({min} > {max}), swapping them");
        }
        let bounds = LevelBounds::new(min, max);

        let level = match driver.query(Query::ActualLevel, address) {
            Reading::Numeric(v) => bounds.clamp(i32::from(v)),
            Reading::Unavailable => {
                warn!("Actual level of {address} unavailable, treating it as off");
                LevelBounds::OFF
            }
        };

        Lamp {
            address,
            friendly_name: friendly_name.to_string(),
            device_name: slugify(friendly_name),
            min_physical_level,
            bounds,
            level,
            associated_lamps: None,
            driver,
        }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn friendly_name(&self) -> &str {
        &self.friendly_name
    }

    pub fn device_name(&self) -> &str {
        &self.device_name
    }

    /// Name of the driver implementation this lamp talks through.
    pub fn driver_name(&self) -> &str {
        self.driver.name()
    }

    pub fn min_physical_level(&self) -> Option<u8> {
        self.min_physical_level
    }

    pub fn min_level(&self) -> u8 {
        self.bounds.min
    }

    pub fn max_level(&self) -> u8 {
        self.bounds.max
    }

    pub fn bounds(&self) -> LevelBounds {
        self.bounds
    }

    /// Last known brightness level, 0 when off.
    pub fn level(&self) -> u8 {
        self.level
    }

    pub fn is_group(&self) -> bool {
        self.address.is_group()
    }

    /// Device names of the member lamps, for group lamps that have any.
    pub fn associated_lamps(&self) -> Option<&[String]> {
        self.associated_lamps.as_deref()
    }

    /// Commit a brightness level to the ballast.
    ///
    /// 0 switches the lamp off; any other value is clamped into the lamp's
    /// bounds first. Returns the level actually sent.
    pub fn set_level(&mut self, requested: i32) -> u8 {
        let level = self.bounds.clamp(requested);
        self.level = level;
        self.driver.send(Command::Dapc(level), self.address);
        debug!("Set lamp <{}> brightness level to {level}", self.friendly_name);
        level
    }

    /// Whether [`Lamp::set_level`] with the same value would change the lamp.
    ///
    /// A request for 0 is always worth sending.
    pub fn needs_change(&self, requested: i32) -> bool {
        if requested == i32::from(LevelBounds::OFF) {
            return true;
        }
        self.bounds.clamp(requested) != self.level
    }

    /// Turn the ballast off.
    pub fn off(&mut self) {
        self.driver.send(Command::Off, self.address);
        self.level = LevelBounds::OFF;
        debug!("Turned lamp <{}> off", self.friendly_name);
    }

    /// Re-read the actual level from the bus; an unanswered read means off.
    ///
    /// Readings outside the lamp's limits are clamped into them.
    pub fn refresh(&mut self) -> u8 {
        self.level = match self.driver.query(Query::ActualLevel, self.address) {
            Reading::Numeric(v) => self.bounds.clamp(i32::from(v)),
            Reading::Unavailable => LevelBounds::OFF,
        };
        debug!("Get lamp <{}> results in {}", self.friendly_name, self.level);
        self.level
    }

    /// Record `member` as part of this group lamp.
    ///
    /// Only meaningful on group-addressed lamps; the caller is expected to
    /// check. Members are kept in insertion order and not deduplicated.
    pub fn add_associated_lamp(&mut self, member: &Lamp) {
        self.associated_lamps
            .get_or_insert_with(Vec::new)
            .push(member.device_name.clone());
    }

    /// Append the address to the device name, e.g. `kitchen-a3`.
    ///
    /// Used when another lamp already owns the plain slug.
    pub(crate) fn disambiguate(&mut self) {
        let suffix = self.address.to_string().to_lowercase();
        self.device_name = if self.device_name.is_empty() {
            suffix
        } else {
            format!("{}-{suffix}", self.device_name)
        };
    }
}

impl fmt::Display for Lamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} - address: {}, actual brightness level: {} (minimum: {}, max: {}, physical minimum: ",
            self.device_name,
            self.address.value(),
            self.level,
            self.bounds.min,
            self.bounds.max,
        )?;
        match self.min_physical_level {
            Some(v) => write!(f, "{v})"),
            None => write!(f, "None)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use log::{Level, LevelFilter, Log, Metadata, Record};

    use super::*;
    use crate::driver::MemoryBus;

    static WARNINGS: Mutex<Vec<String>> = Mutex::new(Vec::new());

    struct WarningLogger;

    impl Log for WarningLogger {
        fn enabled(&self, metadata: &Metadata) -> bool {
            metadata.level() <= Level::Warn
        }

        fn log(&self, record: &Record) {
            if self.enabled(record.metadata()) {
                WARNINGS.lock().unwrap().push(record.args().to_string());
            }
        }

        fn flush(&self) {}
    }

    static LOGGER: WarningLogger = WarningLogger;

    fn capture_warnings() {
        // Another test may have installed it already.
        let _ = log::set_logger(&LOGGER);
        log::set_max_level(LevelFilter::Warn);
    }

    fn warned(message: &str) -> bool {
        WARNINGS.lock().unwrap().iter().any(|w| w == message)
    }

    fn bus() -> Arc<MemoryBus> {
        Arc::new(MemoryBus::new("MemoryBus").with_ballast(0, 86, 254, 150))
    }

    fn lamp(bus: &Arc<MemoryBus>) -> Lamp {
        Lamp::new(bus.clone(), "Kitchen Ceiling Light", Address::Short(0))
    }

    #[test]
    fn test_construction_reads_bounds() {
        let bus = bus();
        let lamp = lamp(&bus);
        assert_eq!(lamp.min_physical_level(), Some(86));
        assert_eq!(lamp.min_level(), 86);
        assert_eq!(lamp.max_level(), 254);
        assert_eq!(lamp.level(), 150);
        assert_eq!(lamp.device_name(), "kitchen-ceiling-light");
        assert!(lamp.associated_lamps().is_none());
        assert!(bus.sent().is_empty());
    }

    #[test]
    fn test_construction_degrades_per_field() {
        let bus = Arc::new(MemoryBus::new("MemoryBus"));
        let lamp = Lamp::new(bus, "Nothing answers", Address::Short(9));
        assert_eq!(lamp.min_physical_level(), None);
        assert_eq!(lamp.min_level(), 86);
        assert_eq!(lamp.max_level(), 254);
        assert_eq!(lamp.level(), 0);
    }

    #[test]
    fn test_min_level_falls_back_to_physical_minimum() {
        let bus = bus();
        bus.set_reading(Address::Short(0), Query::PhysicalMinimum, Some(40));
        bus.set_reading(Address::Short(0), Query::MinLevel, None);
        bus.set_reading(Address::Short(0), Query::ActualLevel, None);
        let lamp = lamp(&bus);
        assert_eq!(lamp.min_physical_level(), Some(40));
        assert_eq!(lamp.min_level(), 40);
        assert_eq!(lamp.level(), 0);
    }

    #[test]
    fn test_construction_clamps_out_of_range_level() {
        let bus = Arc::new(MemoryBus::new("MemoryBus").with_ballast(0, 86, 254, 255));
        assert_eq!(lamp(&bus).level(), 254);

        bus.set_reading(Address::Short(0), Query::ActualLevel, Some(40));
        assert_eq!(lamp(&bus).level(), 86);

        bus.set_reading(Address::Short(0), Query::ActualLevel, Some(0));
        assert_eq!(lamp(&bus).level(), 0);
        assert!(bus.sent().is_empty());
    }

    #[test]
    fn test_refresh_clamps_out_of_range_level() {
        let bus = bus();
        let mut lamp = lamp(&bus);
        bus.set_reading(Address::Short(0), Query::ActualLevel, Some(255));
        assert_eq!(lamp.refresh(), 254);
        bus.set_reading(Address::Short(0), Query::ActualLevel, Some(40));
        assert_eq!(lamp.refresh(), 86);
        assert!(bus.sent().is_empty());
    }

    #[test]
    fn test_inverted_limits_are_swapped() {
        capture_warnings();
        let bus = Arc::new(MemoryBus::new("MemoryBus").with_ballast(41, 200, 100, 150));
        let mut lamp = Lamp::new(bus, "Inverted", Address::Short(41));
        assert_eq!(lamp.min_level(), 100);
        assert_eq!(lamp.max_level(), 200);
        assert_eq!(lamp.level(), 150);
        assert_eq!(lamp.set_level(150), 150);
        assert_eq!(lamp.set_level(250), 200);
        assert!(warned("Limits of A41 are inverted (200 > 100), swapping them"));
    }

    #[test]
    fn test_unavailable_actual_level_is_logged() {
        capture_warnings();
        let bus = Arc::new(MemoryBus::new("MemoryBus").with_ballast(42, 86, 254, 0));
        bus.set_reading(Address::Short(42), Query::ActualLevel, None);
        let lamp = Lamp::new(bus, "Silent", Address::Short(42));
        assert_eq!(lamp.level(), 0);
        assert!(warned("Actual level of A42 unavailable, treating it as off"));
    }

    #[test]
    fn test_set_level_clamps_low() {
        let bus = bus();
        let mut lamp = lamp(&bus);
        assert_eq!(lamp.set_level(50), 86);
        assert_eq!(lamp.level(), 86);
        assert_eq!(bus.sent(), vec![(Command::Dapc(86), Address::Short(0))]);
    }

    #[test]
    fn test_set_level_clamps_high_and_passes_interior() {
        let bus = bus();
        let mut lamp = lamp(&bus);
        assert_eq!(lamp.set_level(300), 254);
        for v in 87..254 {
            assert_eq!(i32::from(lamp.set_level(v)), v);
        }
    }

    #[test]
    fn test_set_level_zero_is_off() {
        let bus = bus();
        let mut lamp = lamp(&bus);
        assert_eq!(lamp.set_level(0), 0);
        assert_eq!(lamp.level(), 0);
        assert_eq!(bus.sent(), vec![(Command::Dapc(0), Address::Short(0))]);
    }

    #[test]
    fn test_needs_change_agrees_with_set_level() {
        let bus = bus();
        let mut lamp = lamp(&bus);
        for v in [-5, 1, 50, 86, 87, 150, 200, 254, 255, 1000] {
            lamp.set_level(v);
            assert!(!lamp.needs_change(v), "needs_change({v}) after set_level({v})");
        }
    }

    #[test]
    fn test_needs_change_predicts_clamped_value() {
        let bus = bus();
        let mut lamp = lamp(&bus);
        assert!(!lamp.needs_change(150));
        assert!(lamp.needs_change(151));
        lamp.set_level(86);
        assert!(!lamp.needs_change(1));
        assert!(lamp.needs_change(0));
        assert_eq!(bus.sent().len(), 1);
    }

    #[test]
    fn test_off_is_idempotent() {
        let bus = bus();
        let mut lamp = lamp(&bus);
        lamp.off();
        assert_eq!(lamp.level(), 0);
        lamp.off();
        assert_eq!(lamp.level(), 0);
        assert_eq!(
            bus.sent(),
            vec![
                (Command::Off, Address::Short(0)),
                (Command::Off, Address::Short(0))
            ]
        );
    }

    #[test]
    fn test_refresh_reconciles_external_changes() {
        let bus = bus();
        let mut lamp = lamp(&bus);
        bus.set_reading(Address::Short(0), Query::ActualLevel, Some(200));
        assert_eq!(lamp.refresh(), 200);
        bus.set_reading(Address::Short(0), Query::ActualLevel, None);
        assert_eq!(lamp.refresh(), 0);
        assert_eq!(lamp.level(), 0);
    }

    #[test]
    fn test_group_members_in_call_order() {
        let bus = Arc::new(
            MemoryBus::new("MemoryBus")
                .with_ballast(1, 86, 254, 0)
                .with_ballast(2, 86, 254, 0),
        );
        let first = Lamp::new(bus.clone(), "First", Address::Short(1));
        let second = Lamp::new(bus.clone(), "Second", Address::Short(2));
        let mut group = Lamp::new(bus, "Group", Address::Group(0));

        assert!(group.is_group());
        group.add_associated_lamp(&first);
        group.add_associated_lamp(&second);
        assert_eq!(
            group.associated_lamps(),
            Some(&["first".to_string(), "second".to_string()][..])
        );
    }

    #[test]
    fn test_disambiguate() {
        let bus = bus();
        let mut lamp = Lamp::new(bus.clone(), "Kitchen", Address::Group(3));
        lamp.disambiguate();
        assert_eq!(lamp.device_name(), "kitchen-g3");

        let mut unnamed = Lamp::new(bus, "???", Address::Short(0));
        unnamed.disambiguate();
        assert_eq!(unnamed.device_name(), "a0");
    }

    #[test]
    fn test_display() {
        let bus = Arc::new(MemoryBus::new("MemoryBus"));
        let lamp = Lamp::new(bus, "Hall", Address::Short(4));
        assert_eq!(
            lamp.to_string(),
            "hall - address: 4, actual brightness level: 0 (minimum: 86, max: 254, physical minimum: None)"
        );
    }
}
