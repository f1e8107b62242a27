use crate::address::AddressKind;

/// All error types that can occur when driving DALI lamps.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// An address outside the bus namespace for its kind.
    #[error("{kind} address {value} is out of range")]
    InvalidAddress { kind: AddressKind, value: u8 },

    /// Failed to serialize data to JSON.
    #[error("failed to dump json: {0:?}")]
    JsonDump(serde_json::Error),

    /// No lamp is registered under the given device name.
    #[error("lamp {0} not found")]
    LampNotFound(String),

    /// The topic does not belong to any known command.
    #[error("unknown topic {0}")]
    UnknownTopic(String),
}

impl Error {
    /// Create a new invalid address error
    pub fn invalid_address(kind: AddressKind, value: u8) -> Self {
        Error::InvalidAddress { kind, value }
    }
}

/// Hacky implementation of PartialEq for testing
#[cfg(test)]
impl PartialEq for Error {
    fn eq(&self, other: &Self) -> bool {
        self.to_string() == other.to_string()
    }
}
