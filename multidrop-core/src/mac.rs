//! MAC layer: one-byte destination/source addressing on top of PHY frames
//!
//! A MAC frame is `[dst][src][payload]`. Receivers keep frames addressed
//! to them or to broadcast (0xFF) and silently drop everything else — on a
//! party-line bus most traffic is legitimately for somebody else, so "not
//! for me" is a non-event, not an error.

use heapless::Vec;
use multidrop_hal::{DirectionControl, SerialPort};

use crate::error::{Advisory, Error, ErrorCode};
use crate::session::Session;
use crate::{BROADCAST, MAC_HEADER_LEN};

/// One frame accepted by the MAC filter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MacRx {
    /// Sender's address
    pub src: u8,
    /// Payload bytes copied to the caller's buffer
    pub len: usize,
    /// Suspicious-but-valid source conditions; payload is still good
    pub advisory: Option<Advisory>,
}

impl<P, D, const RAW: usize> Session<P, D, RAW>
where
    P: SerialPort,
    D: DirectionControl,
{
    /// Address `payload` to `dst` and transmit it as one frame
    ///
    /// Returns the payload length on success. The source address is always
    /// this session's own.
    pub fn send_mac(&mut self, dst: u8, payload: &[u8]) -> Result<usize, Error> {
        if payload.len() > self.payload_max {
            self.mac_status = ErrorCode::Oversize;
            return Err(Error::Oversize);
        }
        let mut frame: Vec<u8, RAW> = Vec::new();
        // Cannot overflow: payload_max + header fits RAW by construction
        let _ = frame.push(dst);
        let _ = frame.push(self.address);
        let _ = frame.extend_from_slice(payload);
        match self.send_phy(&frame) {
            Ok(_) => {
                self.mac_status = ErrorCode::NoError;
                Ok(payload.len())
            }
            Err(e) => {
                self.mac_status = e.into();
                Err(e)
            }
        }
    }

    /// Receive one frame addressed to this station (or broadcast)
    ///
    /// `Ok(None)` covers both "nothing complete yet" and "frame was for
    /// somebody else" — neither is an error. On success the payload (source
    /// and destination stripped) is copied into `out` and the sender's
    /// address is reported in [`MacRx`]. Two source anomalies are flagged
    /// as advisories without rejecting the frame: our own address looping
    /// back, and a sender claiming the broadcast address.
    pub fn receive_mac(
        &mut self,
        out: &mut [u8],
        blocking: bool,
    ) -> Result<Option<MacRx>, Error> {
        let mut raw = [0u8; RAW];
        let len = match self.receive_phy(&mut raw, blocking) {
            Ok(Some(len)) => len,
            Ok(None) => {
                self.mac_status = ErrorCode::NoData;
                return Ok(None);
            }
            Err(e) => {
                self.mac_status = e.into();
                return Err(e);
            }
        };

        if len < MAC_HEADER_LEN {
            // Too short to even carry addresses
            self.mac_status = ErrorCode::Decode;
            return Err(Error::Decode);
        }
        let (dst, src) = (raw[0], raw[1]);
        if dst != self.address && dst != BROADCAST {
            // Somebody else's traffic
            self.mac_status = ErrorCode::NoError;
            return Ok(None);
        }

        let payload = &raw[MAC_HEADER_LEN..len];
        if out.len() < payload.len() {
            self.mac_status = ErrorCode::Oversize;
            return Err(Error::Oversize);
        }
        out[..payload.len()].copy_from_slice(payload);

        let advisory = if src == self.address {
            Some(Advisory::SourceIsSelf)
        } else if src == BROADCAST {
            Some(Advisory::SourceIsBroadcast)
        } else {
            None
        };
        self.mac_status = match advisory {
            Some(a) => a.into(),
            None => ErrorCode::NoError,
        };
        Ok(Some(MacRx {
            src,
            len: payload.len(),
            advisory,
        }))
    }
}
