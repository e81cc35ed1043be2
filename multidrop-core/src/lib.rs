//! Multidrop packet protocol engine
//!
//! A three-layer packet protocol for cheap, noisy, half-duplex serial
//! links (RS-485 party lines, RS-232 point-to-point, bare UARTs):
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │ packet   CRC-16 trailer, source-filtered receive         │
//! ├──────────────────────────────────────────────────────────┤
//! │ MAC      [dst][src] addressing, broadcast, loop check    │
//! ├──────────────────────────────────────────────────────────┤
//! │ PHY      COBS/SLIP framing, delimiter resync             │
//! ├──────────────────────────────────────────────────────────┤
//! │ transport (multidrop-hal): read/peek/write/flush + DE    │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! Everything hangs off a [`Session`]: one transport, one direction pin,
//! one fixed receive scratch buffer, no heap. Reception is a polling state
//! machine fed one byte at a time — call [`Session::packet_receive`] (or
//! the lower-layer variants) from your main loop; `Ok(None)` means "nothing
//! for you yet, come back later". Transmission frames and flushes a buffer
//! atomically, with the line driver released on every exit path.
//!
//! The engine is single-threaded by design: no interrupts, no executor, no
//! internal locking. Drive one session from one thread of control.

#![no_std]
#![deny(unsafe_code)]

pub mod config;
pub mod error;
pub mod mac;
pub mod packet;
pub mod phy;
pub mod session;

#[cfg(test)]
pub(crate) mod mock;

pub use config::{cobs_raw_capacity, raw_capacity, slip_raw_capacity, Config};
pub use error::{Advisory, Error, ErrorCode, Layer};
pub use mac::MacRx;
pub use packet::PacketRx;
pub use session::Session;

// The configured encoding type comes from the wire-format crate
pub use multidrop_protocol::Encoding;

/// Broadcast destination address, accepted by every receiver
pub const BROADCAST: u8 = 0xFF;

/// MAC header: destination + source address bytes
pub const MAC_HEADER_LEN: usize = 2;

/// Packet-layer checksum trailer length
pub const CRC_LEN: usize = 2;

/// Bytes a decoded PHY frame carries beyond the application payload
pub const FRAME_OVERHEAD: usize = MAC_HEADER_LEN + CRC_LEN;
