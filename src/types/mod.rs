//! Value types for lamp control and broker payloads.

mod availability;
mod level;
mod power;

pub use availability::Availability;
pub use level::LevelBounds;
pub use power::PowerState;
