//! Error taxonomy and the per-layer status shim
//!
//! Operations report through their `Result` return value; that is the
//! primary channel. The per-layer [`ErrorCode`] slots exist for callers
//! ported from last-error-style APIs: each operation overwrites its layer's
//! slot (last write wins, no queue), and [`crate::Session::last_error`]
//! reads it back.

/// Hard failures returned by session operations
///
/// "No data yet" and "not addressed to us" are not errors — those are
/// `Ok(None)` results. `Noise` is the one advisory in this enum: it means a
/// byte arrived outside any frame and was discarded, which on a shared bus
/// is routine; callers normally just poll again.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// Length exceeds a configured maximum, or a frame overflowed a buffer
    Oversize,
    /// Packet checksum trailer did not match the payload
    Checksum,
    /// Received bytes are not a valid encoded frame
    Decode,
    /// Frame could not be encoded (destination buffer too small)
    Encode,
    /// Blocking receive exhausted its idle-poll budget
    Timeout,
    /// Transport refused or failed a write
    Write,
    /// Transport read failed
    Read,
    /// Byte received while unsynchronized; discarded
    Noise,
}

/// Non-fatal observations attached to an otherwise valid received frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Advisory {
    /// Frame's source equals our own address: a loop, or an imposter
    SourceIsSelf,
    /// Frame's source is the broadcast address: malformed sender
    SourceIsBroadcast,
}

/// Protocol layer selector for [`crate::Session::last_error`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Layer {
    Phy,
    Mac,
    App,
}

/// Last-operation status code, one slot per layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ErrorCode {
    /// Operation completed normally
    #[default]
    NoError,
    Oversize,
    Checksum,
    Decode,
    Encode,
    Timeout,
    Write,
    Read,
    /// Nothing available to receive on this call
    NoData,
    Noise,
    SourceIsBroadcast,
    SourceIsSelf,
    Unknown,
}

impl From<Error> for ErrorCode {
    fn from(err: Error) -> Self {
        match err {
            Error::Oversize => ErrorCode::Oversize,
            Error::Checksum => ErrorCode::Checksum,
            Error::Decode => ErrorCode::Decode,
            Error::Encode => ErrorCode::Encode,
            Error::Timeout => ErrorCode::Timeout,
            Error::Write => ErrorCode::Write,
            Error::Read => ErrorCode::Read,
            Error::Noise => ErrorCode::Noise,
        }
    }
}

impl From<Advisory> for ErrorCode {
    fn from(advisory: Advisory) -> Self {
        match advisory {
            Advisory::SourceIsSelf => ErrorCode::SourceIsSelf,
            Advisory::SourceIsBroadcast => ErrorCode::SourceIsBroadcast,
        }
    }
}
