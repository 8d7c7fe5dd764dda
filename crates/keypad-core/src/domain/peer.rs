//! [`PeerAddress`]: the Bluetooth device address (BD_ADDR) of the keypad.
//!
//! Written and parsed in the usual colon-separated, most-significant-byte
//! first form, e.g. `DC:2C:26:00:37:A9`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// Number of bytes in a Bluetooth device address.
pub const PEER_ADDRESS_LEN: usize = 6;

/// Error returned when a string is not a valid device address.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PeerAddressError {
    #[error("expected {PEER_ADDRESS_LEN} colon-separated octets, got {0}")]
    WrongLength(usize),
    #[error("invalid octet '{0}'")]
    InvalidOctet(String),
}

/// Fixed-length link-layer identifier of the peripheral to connect to.
///
/// Configured once at startup and never modified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PeerAddress([u8; PEER_ADDRESS_LEN]);

impl PeerAddress {
    pub const fn new(octets: [u8; PEER_ADDRESS_LEN]) -> Self {
        Self(octets)
    }
}

impl fmt::Display for PeerAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c, d, e, g] = self.0;
        write!(f, "{a:02X}:{b:02X}:{c:02X}:{d:02X}:{e:02X}:{g:02X}")
    }
}

impl FromStr for PeerAddress {
    type Err = PeerAddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.trim().split([':', '-']).collect();
        if parts.len() != PEER_ADDRESS_LEN {
            return Err(PeerAddressError::WrongLength(parts.len()));
        }

        let mut octets = [0u8; PEER_ADDRESS_LEN];
        for (slot, part) in octets.iter_mut().zip(&parts) {
            if part.len() != 2 || !part.bytes().all(|b| b.is_ascii_hexdigit()) {
                return Err(PeerAddressError::InvalidOctet(part.to_string()));
            }
            *slot = u8::from_str_radix(part, 16)
                .map_err(|_| PeerAddressError::InvalidOctet(part.to_string()))?;
        }
        Ok(Self(octets))
    }
}

impl Serialize for PeerAddress {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for PeerAddress {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
