//! Brightness limits of a ballast.

use serde::{Deserialize, Serialize};

/// Inclusive brightness range a ballast accepts when lit.
///
/// Level 0 means off and is never clamped.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct LevelBounds {
    pub(crate) min: u8,
    pub(crate) max: u8,
}

impl Default for LevelBounds {
    fn default() -> Self {
        LevelBounds {
            min: Self::DEFAULT_MIN,
            max: Self::DEFAULT_MAX,
        }
    }
}

impl LevelBounds {
    /// Minimum level assumed when the ballast does not report one.
    pub const DEFAULT_MIN: u8 = 86;
    /// Maximum level assumed when the ballast does not report one.
    pub const DEFAULT_MAX: u8 = 254;
    pub const OFF: u8 = 0;

    /// Limits from two readings; an inverted pair is swapped.
    pub fn new(min: u8, max: u8) -> Self {
        LevelBounds {
            min: min.min(max),
            max: min.max(max),
        }
    }

    pub fn min(&self) -> u8 {
        self.min
    }

    pub fn max(&self) -> u8 {
        self.max
    }

    /// Force a requested level into range.
    ///
    /// # Examples
    ///
    /// ```
    /// use dali_lamps_rs::LevelBounds;
    ///
    /// let bounds = LevelBounds::new(86, 254);
    /// assert_eq!(bounds.clamp(0), 0);
    /// assert_eq!(bounds.clamp(50), 86);
    /// assert_eq!(bounds.clamp(-3), 86);
    /// assert_eq!(bounds.clamp(150), 150);
    /// assert_eq!(bounds.clamp(1000), 254);
    /// ```
    pub fn clamp(&self, requested: i32) -> u8 {
        if requested == i32::from(Self::OFF) {
            Self::OFF
        } else if requested < i32::from(self.min) {
            self.min
        } else if requested > i32::from(self.max) {
            self.max
        } else {
            // min <= requested <= max <= u8::MAX
            requested as u8
        }
    }
}
