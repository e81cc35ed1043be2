//! Multidrop wire encoding
//!
//! This crate holds the pieces of the multidrop protocol that touch bytes on
//! the wire: the two interchangeable frame codecs and the CRC-16 checksum.
//! The protocol engine lives in `multidrop-core`; everything here is pure
//! and stateless so it can be tested (and property-tested) in isolation.
//!
//! # Frame encodings
//!
//! A frame is one encoded byte sequence bounded by two delimiter bytes:
//! ```text
//! ┌───────┬──────────────────────────────┬───────┐
//! │ DELIM │ encoded payload (no DELIM)   │ DELIM │
//! └───────┴──────────────────────────────┴───────┘
//! ```
//!
//! Two encodings keep the delimiter out of the payload:
//! - **COBS** byte stuffing: delimiter 0x00, one byte of overhead per frame
//!   up to 254 payload bytes.
//! - **SLIP** byte escaping: delimiter 0xC0 (END), reserved bytes replaced
//!   by two-byte escape sequences; worst case doubles the length.
//!
//! Both ends of a link must be configured with the same encoding; nothing
//! is negotiated on the wire.

#![no_std]
#![deny(unsafe_code)]

pub mod crc16;
pub mod frame;

pub use crc16::{checksum, CRC16};
pub use frame::{Encoding, FrameError, COBS_END, SLIP_END, SLIP_ESC, SLIP_ESC_END, SLIP_ESC_ESC};
