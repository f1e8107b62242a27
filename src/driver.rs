//! Bus driver abstraction.
//!
//! The controller never speaks the DALI wire protocol itself. It consumes a
//! small set of opaque queries and commands through the [`Driver`] trait,
//! which concrete USB/serial/daemon drivers implement. The driver is also
//! responsible for serializing access to the physical bus, which is a shared
//! half-duplex medium.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use crate::address::Address;

/// Queries sent to a ballast that are answered with a single byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Query {
    PhysicalMinimum,
    MinLevel,
    MaxLevel,
    ActualLevel,
    /// Non-zero when a ballast answers at the address
    ControlGearPresent,
    /// Group membership bitmask for groups 0-7
    GroupsZeroToSeven,
    /// Group membership bitmask for groups 8-15
    GroupsEightToFifteen,
}

/// Fire-and-forget commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Direct arc power control
    Dapc(u8),
    Off,
}

/// The answer to a [`Query`].
///
/// A ballast may not answer at all, answer with a collision, or the
/// transport may fail; all of these are reported as `Unavailable`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reading {
    Numeric(u8),
    Unavailable,
}

impl Reading {
    pub fn value(&self) -> Option<u8> {
        match self {
            Reading::Numeric(v) => Some(*v),
            Reading::Unavailable => None,
        }
    }
}

impl From<Option<u8>> for Reading {
    fn from(value: Option<u8>) -> Self {
        value.map_or(Reading::Unavailable, Reading::Numeric)
    }
}

/// Synchronous request/response access to a DALI bus.
pub trait Driver: Send + Sync {
    /// Implementation identifier, e.g. `"SyncHassebDALIUSBDriver"`.
    fn name(&self) -> &str;

    /// Send a query and wait for the answer.
    fn query(&self, query: Query, address: Address) -> Reading;

    /// Send a command without waiting for confirmation.
    fn send(&self, command: Command, address: Address);
}

#[derive(Debug, Default)]
struct MemoryBusState {
    readings: HashMap<(Address, Query), u8>,
    groups: HashMap<u8, Vec<u8>>,
    sent: Vec<(Command, Address)>,
}

impl MemoryBusState {
    fn apply_level(&mut self, address: Address, level: u8) {
        self.readings.insert((address, Query::ActualLevel), level);
        if let Address::Group(group) = address {
            let members = self.groups.get(&group).cloned().unwrap_or_default();
            for member in members {
                self.readings
                    .insert((Address::Short(member), Query::ActualLevel), level);
            }
        }
    }
}

/// An in-memory bus that answers from a table of readings.
///
/// Commands are recorded and applied to the `ActualLevel` reading of the
/// addressed ballast, and of every member when a group is addressed.
/// Anything not configured reads as [`Reading::Unavailable`].
///
/// # Examples
///
/// ```
/// use dali_lamps_rs::{Address, Command, Driver, MemoryBus, Query, Reading};
///
/// let bus = MemoryBus::new("MemoryBus");
/// let addr = Address::Short(1);
/// assert_eq!(bus.query(Query::ActualLevel, addr), Reading::Unavailable);
///
/// bus.send(Command::Dapc(120), addr);
/// assert_eq!(bus.query(Query::ActualLevel, addr), Reading::Numeric(120));
/// ```
#[derive(Debug)]
pub struct MemoryBus {
    name: String,
    state: Mutex<MemoryBusState>,
}

impl MemoryBus {
    pub fn new(name: &str) -> Self {
        MemoryBus {
            name: name.to_string(),
            state: Mutex::new(MemoryBusState::default()),
        }
    }

    /// Register a ballast answering at a short address with the given limits.
    pub fn with_ballast(self, short: u8, min: u8, max: u8, level: u8) -> Self {
        let address = Address::Short(short);
        self.set_reading(address, Query::ControlGearPresent, Some(1));
        self.set_reading(address, Query::PhysicalMinimum, Some(min));
        self.set_reading(address, Query::MinLevel, Some(min));
        self.set_reading(address, Query::MaxLevel, Some(max));
        self.set_reading(address, Query::ActualLevel, Some(level));
        self
    }

    /// Put short addresses in a bus group, updating their membership masks.
    pub fn with_group(self, group: u8, members: &[u8]) -> Self {
        {
            let mut state = self.lock();
            state.groups.insert(group, members.to_vec());
            let (query, other, bit) = if group < 8 {
                (Query::GroupsZeroToSeven, Query::GroupsEightToFifteen, group)
            } else {
                (Query::GroupsEightToFifteen, Query::GroupsZeroToSeven, group - 8)
            };
            for member in members {
                let key = (Address::Short(*member), query);
                let mask = state.readings.get(&key).copied().unwrap_or(0);
                state.readings.insert(key, mask | (1 << bit));
                state
                    .readings
                    .entry((Address::Short(*member), other))
                    .or_insert(0);
            }
        }
        self
    }

    /// Set or clear (`None`) the answer to a query.
    pub fn set_reading(&self, address: Address, query: Query, value: Option<u8>) {
        let mut state = self.lock();
        match value {
            Some(v) => state.readings.insert((address, query), v),
            None => state.readings.remove(&(address, query)),
        };
    }

    /// Commands sent so far, oldest first.
    pub fn sent(&self) -> Vec<(Command, Address)> {
        self.lock().sent.clone()
    }

    pub fn clear_sent(&self) {
        self.lock().sent.clear();
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MemoryBusState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Driver for MemoryBus {
    fn name(&self) -> &str {
        &self.name
    }

    fn query(&self, query: Query, address: Address) -> Reading {
        self.lock().readings.get(&(address, query)).copied().into()
    }

    fn send(&self, command: Command, address: Address) {
        let mut state = self.lock();
        state.sent.push((command, address));
        match command {
            Command::Dapc(level) => state.apply_level(address, level),
            Command::Off => state.apply_level(address, 0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reading_value() {
        assert_eq!(Reading::Numeric(7).value(), Some(7));
        assert_eq!(Reading::Unavailable.value(), None);
        assert_eq!(Reading::from(None), Reading::Unavailable);
    }

    #[test]
    fn test_group_command_reaches_members() {
        let bus = MemoryBus::new("MemoryBus")
            .with_ballast(1, 86, 254, 0)
            .with_ballast(2, 86, 254, 0)
            .with_group(0, &[1, 2]);

        bus.send(Command::Dapc(200), Address::Group(0));
        assert_eq!(
            bus.query(Query::ActualLevel, Address::Short(1)),
            Reading::Numeric(200)
        );
        assert_eq!(
            bus.query(Query::ActualLevel, Address::Short(2)),
            Reading::Numeric(200)
        );

        bus.send(Command::Off, Address::Group(0));
        assert_eq!(
            bus.query(Query::ActualLevel, Address::Short(2)),
            Reading::Numeric(0)
        );
        assert_eq!(bus.sent().len(), 2);
    }

    #[test]
    fn test_group_masks() {
        let bus = MemoryBus::new("MemoryBus")
            .with_ballast(4, 86, 254, 0)
            .with_group(1, &[4])
            .with_group(9, &[4]);

        assert_eq!(
            bus.query(Query::GroupsZeroToSeven, Address::Short(4)),
            Reading::Numeric(0b10)
        );
        assert_eq!(
            bus.query(Query::GroupsEightToFifteen, Address::Short(4)),
            Reading::Numeric(0b10)
        );
    }
}
