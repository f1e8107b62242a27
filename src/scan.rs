//! Bus scanning for ballasts and their group memberships.

use std::collections::BTreeMap;

use log::{debug, info, warn};

use crate::address::Address;
use crate::driver::{Driver, Query, Reading};

/// Query short addresses `0..max` and return those where a ballast answers.
///
/// `max` is capped at [`Address::SHORT_COUNT`].
///
/// # Examples
///
/// ```
/// use dali_lamps_rs::{Address, MemoryBus, scan_lamps};
///
/// let bus = MemoryBus::new("MemoryBus").with_ballast(2, 86, 254, 0).with_ballast(5, 86, 254, 0);
/// assert_eq!(scan_lamps(&bus, 64), vec![Address::Short(2), Address::Short(5)]);
/// assert_eq!(scan_lamps(&bus, 4), vec![Address::Short(2)]);
/// ```
pub fn scan_lamps(driver: &dyn Driver, max: u8) -> Vec<Address> {
    let lamps: Vec<Address> = (0..max.min(Address::SHORT_COUNT))
        .map(Address::Short)
        .filter(|address| {
            debug!("Search for lamp {address}");
            matches!(
                driver.query(Query::ControlGearPresent, *address),
                Reading::Numeric(v) if v != 0
            )
        })
        .collect();
    info!("Found {} lamps", lamps.len());
    lamps
}

/// Read group membership of every given lamp.
///
/// Returns the members of each non-empty group, in the order the lamps were
/// given. Lamps whose membership cannot be read are left out.
pub fn scan_groups(driver: &dyn Driver, lamps: &[Address]) -> BTreeMap<u8, Vec<Address>> {
    info!("Scanning for groups");
    let mut groups: BTreeMap<u8, Vec<Address>> = BTreeMap::new();

    for lamp in lamps {
        let low = driver.query(Query::GroupsZeroToSeven, *lamp);
        let high = driver.query(Query::GroupsEightToFifteen, *lamp);
        let (Some(low), Some(high)) = (low.value(), high.value()) else {
            warn!("Can't get groups for lamp {lamp}");
            continue;
        };

        let mask = u16::from(low) | (u16::from(high) << 8);
        let lamp_groups: Vec<u8> = (0..Address::GROUP_COUNT)
            .filter(|g| mask & (1 << g) != 0)
            .collect();
        for group in &lamp_groups {
            groups.entry(*group).or_default().push(*lamp);
        }
        debug!("Lamp {lamp} is in groups {lamp_groups:?}");
    }

    info!("Finished scanning for groups");
    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::MemoryBus;

    #[test]
    fn test_scan_skips_absent_and_zero() {
        let bus = MemoryBus::new("MemoryBus").with_ballast(0, 86, 254, 0);
        bus.set_reading(Address::Short(1), Query::ControlGearPresent, Some(0));
        assert_eq!(scan_lamps(&bus, 200), vec![Address::Short(0)]);
    }

    #[test]
    fn test_scan_groups() {
        let bus = MemoryBus::new("MemoryBus")
            .with_ballast(0, 86, 254, 0)
            .with_ballast(1, 86, 254, 0)
            .with_ballast(2, 86, 254, 0)
            .with_group(0, &[0, 1])
            .with_group(12, &[1, 2]);

        let lamps = scan_lamps(&bus, 64);
        let groups = scan_groups(&bus, &lamps);

        assert_eq!(groups.len(), 2);
        assert_eq!(groups[&0], vec![Address::Short(0), Address::Short(1)]);
        assert_eq!(groups[&12], vec![Address::Short(1), Address::Short(2)]);
    }

    #[test]
    fn test_unreadable_membership_is_skipped() {
        let bus = MemoryBus::new("MemoryBus")
            .with_ballast(0, 86, 254, 0)
            .with_ballast(1, 86, 254, 0)
            .with_group(3, &[0, 1]);
        bus.set_reading(Address::Short(0), Query::GroupsEightToFifteen, None);

        let groups = scan_groups(&bus, &[Address::Short(0), Address::Short(1)]);
        assert_eq!(groups[&3], vec![Address::Short(1)]);
    }
}
