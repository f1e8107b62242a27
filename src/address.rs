//! Bus addressing for control gear.

use std::fmt;

use serde::{Deserialize, Serialize};
use strum_macros::Display;

use crate::errors::Error;

type Result<T> = std::result::Result<T, Error>;

/// The namespace an [`Address`] lives in.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[strum(serialize_all = "lowercase")]
pub enum AddressKind {
    /// Individual ballast
    Short,
    /// Logical set of ballasts commanded together
    Group,
}

/// A DALI bus address.
///
/// Short addresses identify a single ballast (0-63); group addresses
/// identify one of the 16 bus groups (0-15). The two namespaces overlap
/// numerically, so the kind is carried alongside the number.
///
/// # Examples
///
/// ```
/// use dali_lamps_rs::Address;
///
/// assert!(!Address::short(5).unwrap().is_group());
/// assert!(Address::group(5).unwrap().is_group());
/// assert!(Address::short(64).is_err());
/// assert!(Address::group(16).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Address {
    Short(u8),
    Group(u8),
}

impl Address {
    pub const SHORT_COUNT: u8 = 64;
    pub const GROUP_COUNT: u8 = 16;

    pub fn short(value: u8) -> Result<Self> {
        if value < Self::SHORT_COUNT {
            Ok(Address::Short(value))
        } else {
            Err(Error::invalid_address(AddressKind::Short, value))
        }
    }

    pub fn group(value: u8) -> Result<Self> {
        if value < Self::GROUP_COUNT {
            Ok(Address::Group(value))
        } else {
            Err(Error::invalid_address(AddressKind::Group, value))
        }
    }

    pub fn kind(&self) -> AddressKind {
        match self {
            Address::Short(_) => AddressKind::Short,
            Address::Group(_) => AddressKind::Group,
        }
    }

    /// Raw address number within its namespace.
    pub fn value(&self) -> u8 {
        match self {
            Address::Short(v) | Address::Group(v) => *v,
        }
    }

    pub fn is_group(&self) -> bool {
        matches!(self, Address::Group(_))
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Address::Short(v) => write!(f, "A{v}"),
            Address::Group(v) => write!(f, "G{v}"),
        }
    }
}
