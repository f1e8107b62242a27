//! Friendly names and the device names derived from them.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::address::Address;

/// Turn a friendly name into a topic-safe device name.
///
/// Lowercases, drops apostrophes and collapses every run of other
/// non-alphanumeric characters into a single `-`, trimmed at both ends.
///
/// # Examples
///
/// ```
/// use dali_lamps_rs::slugify;
///
/// assert_eq!(slugify("Kitchen Ceiling Light"), "kitchen-ceiling-light");
/// assert_eq!(slugify("  Bob's  lamp #2 "), "bobs-lamp-2");
/// ```
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_separator = false;

    for c in name.chars().filter(|c| !matches!(c, '\'' | '\u{2019}')) {
        if c.is_alphanumeric() {
            if pending_separator && !slug.is_empty() {
                slug.push('-');
            }
            pending_separator = false;
            slug.extend(c.to_lowercase());
        } else {
            pending_separator = true;
        }
    }
    slug
}

/// User-assigned friendly names, keyed by bus address.
///
/// Short addresses use their number as key (`"3"`), groups use
/// `"group_<n>"`. Unknown keys fall back to the key itself, so an empty
/// table still yields stable names.
///
/// # Examples
///
/// ```
/// use dali_lamps_rs::{Address, DeviceNames};
///
/// let mut names = DeviceNames::default();
/// names.insert(Address::Short(3), "Hall");
/// assert_eq!(names.friendly_name(Address::Short(3)), "Hall");
/// assert_eq!(names.friendly_name(Address::Short(4)), "4");
/// assert_eq!(names.friendly_name(Address::Group(1)), "group_1");
/// ```
#[derive(Debug, Default, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(transparent)]
pub struct DeviceNames {
    names: BTreeMap<String, String>,
}

impl DeviceNames {
    pub fn key(address: Address) -> String {
        match address {
            Address::Short(v) => v.to_string(),
            Address::Group(v) => format!("group_{v}"),
        }
    }

    pub fn friendly_name(&self, address: Address) -> String {
        let key = Self::key(address);
        self.names.get(&key).cloned().unwrap_or(key)
    }

    pub fn insert(&mut self, address: Address, name: &str) {
        self.names.insert(Self::key(address), name.to_string());
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify_is_repeatable() {
        let name = "Kitchen Ceiling Light";
        assert_eq!(slugify(name), "kitchen-ceiling-light");
        assert_eq!(slugify(name), slugify(name));
    }

    #[test]
    fn test_slugify_collapses_separators() {
        assert_eq!(slugify("--Living__Room--"), "living-room");
        assert_eq!(slugify("A/B\\C.D"), "a-b-c-d");
        assert_eq!(slugify("group_1"), "group-1");
        assert_eq!(slugify("!!!"), "");
    }

    #[test]
    fn test_names_deserialize_from_map() {
        let names: DeviceNames =
            serde_json::from_str(r#"{"0": "Desk", "group_2": "Upstairs"}"#).unwrap();
        assert_eq!(names.len(), 2);
        assert_eq!(names.friendly_name(Address::Short(0)), "Desk");
        assert_eq!(names.friendly_name(Address::Group(2)), "Upstairs");
    }
}
