//! Frame codecs for the multidrop wire format
//!
//! Encoding produces the bytes that go *between* the delimiters; writing
//! the delimiters themselves is the PHY layer's job. The contract both
//! codecs uphold: encoded output never contains the delimiter byte, and
//! `decode` is the exact inverse of `encode`.

/// SLIP frame delimiter (END)
pub const SLIP_END: u8 = 0xC0;
/// SLIP escape byte (ESC)
pub const SLIP_ESC: u8 = 0xDB;
/// Escaped substitute for END
pub const SLIP_ESC_END: u8 = 0xDC;
/// Escaped substitute for ESC
pub const SLIP_ESC_ESC: u8 = 0xDD;

/// COBS frame delimiter
pub const COBS_END: u8 = 0x00;

/// Errors from frame encoding or decoding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FrameError {
    /// Destination buffer too small for the result
    BufferTooSmall,
    /// Input is not a valid encoded frame
    InvalidFrame,
}

/// Frame encoding selected for a session
///
/// Chosen once at session construction and never negotiated on the wire;
/// both ends of a link must agree out-of-band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Encoding {
    /// COBS byte stuffing, delimiter 0x00
    #[default]
    Cobs,
    /// SLIP byte escaping, delimiter 0xC0
    Slip,
}

impl Encoding {
    /// The delimiter byte this encoding keeps out of its output
    pub const fn delimiter(self) -> u8 {
        match self {
            Encoding::Cobs => COBS_END,
            Encoding::Slip => SLIP_END,
        }
    }

    /// Worst-case encoded length for `len` payload bytes
    ///
    /// COBS pays one overhead byte per started 254-byte group (and one even
    /// for an empty payload); SLIP doubles in the worst case.
    pub const fn max_encoded_len(self, len: usize) -> usize {
        match self {
            Encoding::Cobs => len + len / 254 + 1,
            Encoding::Slip => len * 2,
        }
    }

    /// Encode `src` into `dst`, returning the encoded length
    ///
    /// The output contains no delimiter byte.
    pub fn encode(self, src: &[u8], dst: &mut [u8]) -> Result<usize, FrameError> {
        match self {
            Encoding::Cobs => {
                // cobs::encode indexes dst unchecked; bound it up front
                if dst.len() < self.max_encoded_len(src.len()) {
                    return Err(FrameError::BufferTooSmall);
                }
                Ok(cobs::encode(src, dst))
            }
            Encoding::Slip => slip_encode(src, dst),
        }
    }

    /// Decode `src` into `dst`, returning the decoded length
    pub fn decode(self, src: &[u8], dst: &mut [u8]) -> Result<usize, FrameError> {
        match self {
            Encoding::Cobs => {
                if dst.len() < src.len() {
                    return Err(FrameError::BufferTooSmall);
                }
                cobs::decode(src, dst).map_err(|_| FrameError::InvalidFrame)
            }
            Encoding::Slip => slip_decode(src, dst),
        }
    }
}

/// SLIP-escape `src` into `dst` (no delimiters added)
fn slip_encode(src: &[u8], dst: &mut [u8]) -> Result<usize, FrameError> {
    let mut idx = 0;
    for &byte in src {
        match byte {
            SLIP_END => {
                if idx + 1 >= dst.len() {
                    return Err(FrameError::BufferTooSmall);
                }
                dst[idx] = SLIP_ESC;
                dst[idx + 1] = SLIP_ESC_END;
                idx += 2;
            }
            SLIP_ESC => {
                if idx + 1 >= dst.len() {
                    return Err(FrameError::BufferTooSmall);
                }
                dst[idx] = SLIP_ESC;
                dst[idx + 1] = SLIP_ESC_ESC;
                idx += 2;
            }
            _ => {
                if idx >= dst.len() {
                    return Err(FrameError::BufferTooSmall);
                }
                dst[idx] = byte;
                idx += 1;
            }
        }
    }
    Ok(idx)
}

/// Reverse [`slip_encode`]
///
/// Fails on a dangling ESC, an ESC followed by anything other than the two
/// substitutes, or a stray END inside the body.
fn slip_decode(src: &[u8], dst: &mut [u8]) -> Result<usize, FrameError> {
    let mut idx = 0;
    let mut escaping = false;
    for &byte in src {
        let decoded = if escaping {
            escaping = false;
            match byte {
                SLIP_ESC_END => SLIP_END,
                SLIP_ESC_ESC => SLIP_ESC,
                _ => return Err(FrameError::InvalidFrame),
            }
        } else {
            match byte {
                SLIP_ESC => {
                    escaping = true;
                    continue;
                }
                SLIP_END => return Err(FrameError::InvalidFrame),
                other => other,
            }
        };
        if idx >= dst.len() {
            return Err(FrameError::BufferTooSmall);
        }
        dst[idx] = decoded;
        idx += 1;
    }
    if escaping {
        return Err(FrameError::InvalidFrame);
    }
    Ok(idx)
}
