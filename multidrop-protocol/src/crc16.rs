//! Packet integrity checksum
//!
//! CRC-16/IBM-3740 (poly 0x1021, init 0xFFFF, no reflection, no final
//! XOR) — the conventional all-ones-seeded CRC-16. The trailer travels
//! big-endian: high byte first.

use crc::{Crc, CRC_16_IBM_3740};

/// The checksum algorithm shared by both ends of a link
///
/// Exposed so callers needing incremental computation can open a
/// [`crc::Digest`] on it.
pub const CRC16: Crc<u16> = Crc::<u16>::new(&CRC_16_IBM_3740);

/// One-shot checksum over `data`
pub fn checksum(data: &[u8]) -> u16 {
    CRC16.checksum(data)
}
