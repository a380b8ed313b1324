//! Device identifiers.
//!
//! A device id is what the firmware shows on its activation screen. The
//! same normalization has to run on both sides, otherwise the hashes
//! will not line up.

use std::fmt;
use std::str::FromStr;

use crate::error::{KeygenError, Result};

/// Minimum number of characters in a normalized device id.
pub const MIN_DEVICE_ID_LENGTH: usize = 8;

/// A normalized (trimmed, upper-cased) device identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DeviceId(String);

impl DeviceId {
    /// Normalizes and validates a raw device id as typed by an operator.
    pub fn parse(raw: &str) -> Result<Self> {
        let id = raw.trim().to_uppercase();
        if id.chars().count() < MIN_DEVICE_ID_LENGTH {
            return Err(KeygenError::InvalidDeviceId {
                id,
                min: MIN_DEVICE_ID_LENGTH,
            });
        }
        Ok(Self(id))
    }

    /// Builds the device id the firmware reports for a chip's eFuse MAC.
    ///
    /// The id is the 16 bits above bit 32 followed by the low 32 bits,
    /// as 12 uppercase hex digits.
    #[must_use]
    pub fn from_efuse_mac(chip_id: u64) -> Self {
        let high = (chip_id >> 32) as u16;
        let low = chip_id as u32;
        Self(format!("{:04X}{:08X}", high, low))
    }

    /// Returns the normalized id.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for DeviceId {
    type Err = KeygenError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for DeviceId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
