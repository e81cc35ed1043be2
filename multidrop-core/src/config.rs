//! Session configuration
//!
//! The configuration is consumed (and validated) by
//! [`crate::Session::new`]; after that the session is immutable.

use multidrop_protocol::Encoding;

use crate::FRAME_OVERHEAD;

/// Default maximum application payload per packet, in bytes
pub const DEFAULT_PAYLOAD_MAX: usize = 64;

/// Largest raw frame the COBS encoding is allowed to produce
///
/// Past this the session silently switches to SLIP; a single COBS overhead
/// byte stops being enough headroom near the 254-byte group limit.
pub const COBS_RAW_CEILING: usize = 250;

/// Worst-case raw (encoded) frame size under COBS for a given payload max
///
/// Payload + 2 address bytes + 2 checksum bytes + 1 overhead byte. Usable
/// in const generic position to size a [`crate::Session`] scratch buffer.
pub const fn cobs_raw_capacity(payload_max: usize) -> usize {
    payload_max + FRAME_OVERHEAD + 1
}

/// Worst-case raw (encoded) frame size under SLIP for a given payload max
///
/// Every byte of payload + addresses + checksum may escape to two bytes.
pub const fn slip_raw_capacity(payload_max: usize) -> usize {
    (payload_max + FRAME_OVERHEAD) * 2
}

/// Scratch capacity sufficient for either encoding
pub const fn raw_capacity(payload_max: usize) -> usize {
    slip_raw_capacity(payload_max)
}

/// Session configuration
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Config {
    /// This station's one-byte address
    pub address: u8,
    /// Maximum application payload per packet
    pub payload_max: usize,
    /// Requested frame encoding
    ///
    /// Forced to [`Encoding::Slip`] when `payload_max` would push a COBS
    /// frame past [`COBS_RAW_CEILING`] encoded bytes.
    pub encoding: Encoding,
    /// Default blocking behavior; each receive call can OR in its own flag
    pub blocking: bool,
    /// Idle-poll budget for blocking receives
    ///
    /// A blocking receive gives up with a timeout after this many
    /// consecutive polls that found no byte waiting. `None` blocks without
    /// bound.
    pub poll_limit: Option<u32>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            address: 0x00,
            payload_max: DEFAULT_PAYLOAD_MAX,
            encoding: Encoding::Cobs,
            blocking: false,
            poll_limit: None,
        }
    }
}

impl Config {
    /// Configuration for a station at `address`, defaults otherwise
    pub fn for_address(address: u8) -> Self {
        Self {
            address,
            ..Self::default()
        }
    }
}
