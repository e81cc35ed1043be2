//! Packet layer: checksum integrity and source-filtered receives
//!
//! The application payload travels with a CRC-16 trailer (big-endian) so a
//! corrupted frame dies here instead of in application code. Three receive
//! entry points with deliberately different filtering contracts:
//!
//! - [`Session::packet_receive`] — any source; reports who sent it
//! - [`Session::packet_receive_from`] — only one expected source; frames
//!   from anyone else are dropped without error (multiplexing by sender)
//! - [`Session::receive_mac`] — destination filtering only, no checksum
//!
//! Downstream code relies on these staying distinct; do not merge them.

use heapless::Vec;
use multidrop_hal::{DirectionControl, SerialPort};
use multidrop_protocol::checksum;

use crate::error::{Advisory, Error, ErrorCode};
use crate::session::Session;
use crate::CRC_LEN;

/// One packet that passed the checksum
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PacketRx {
    /// Sender's address
    pub src: u8,
    /// Application bytes copied to the caller's buffer (trailer stripped)
    pub len: usize,
    /// Source anomalies carried up from the MAC layer
    pub advisory: Option<Advisory>,
}

impl<P, D, const RAW: usize> Session<P, D, RAW>
where
    P: SerialPort,
    D: DirectionControl,
{
    /// Send `data` to `dst` with a checksum trailer appended
    ///
    /// `data` may use up to `payload_max - 2` bytes; the trailer takes the
    /// rest. Returns the transmitted payload length including the trailer.
    pub fn packet_send_to(&mut self, dst: u8, data: &[u8]) -> Result<usize, Error> {
        if data.len() > self.payload_max - CRC_LEN {
            self.app_status = ErrorCode::Oversize;
            return Err(Error::Oversize);
        }
        let mut body: Vec<u8, RAW> = Vec::new();
        // Cannot overflow: payload_max fits RAW by construction
        let _ = body.extend_from_slice(data);
        let crc = checksum(data);
        let _ = body.extend_from_slice(&crc.to_be_bytes());
        match self.send_mac(dst, &body) {
            Ok(_) => {
                self.app_status = ErrorCode::NoError;
                Ok(body.len())
            }
            Err(e) => {
                self.app_status = e.into();
                Err(e)
            }
        }
    }

    /// Receive one checksum-verified packet from any source
    ///
    /// A trailer mismatch discards the frame with [`Error::Checksum`]; no
    /// retry happens internally — poll again to wait for the next frame.
    /// `out` contents are meaningful only when a [`PacketRx`] is returned.
    pub fn packet_receive(
        &mut self,
        out: &mut [u8],
        blocking: bool,
    ) -> Result<Option<PacketRx>, Error> {
        let mut body = [0u8; RAW];
        let mac = match self.receive_mac(&mut body, blocking) {
            Ok(Some(mac)) => mac,
            Ok(None) => {
                self.app_status = ErrorCode::NoData;
                return Ok(None);
            }
            Err(e) => {
                self.app_status = e.into();
                return Err(e);
            }
        };

        if mac.len < CRC_LEN {
            // No room for a trailer; nothing to verify against
            self.app_status = ErrorCode::Checksum;
            return Err(Error::Checksum);
        }
        let data_len = mac.len - CRC_LEN;
        let received = u16::from_be_bytes([body[data_len], body[data_len + 1]]);
        if received != checksum(&body[..data_len]) {
            self.app_status = ErrorCode::Checksum;
            return Err(Error::Checksum);
        }

        if out.len() < data_len {
            self.app_status = ErrorCode::Oversize;
            return Err(Error::Oversize);
        }
        out[..data_len].copy_from_slice(&body[..data_len]);
        self.app_status = ErrorCode::NoError;
        Ok(Some(PacketRx {
            src: mac.src,
            len: data_len,
            advisory: mac.advisory,
        }))
    }

    /// Receive one checksum-verified packet from one specific sender
    ///
    /// Checksum verification happens first; a valid packet from any other
    /// source is then dropped with `Ok(None)` and no error, which lets
    /// several logical streams share the bus keyed by sender address.
    pub fn packet_receive_from(
        &mut self,
        out: &mut [u8],
        expected_src: u8,
        blocking: bool,
    ) -> Result<Option<usize>, Error> {
        match self.packet_receive(out, blocking)? {
            Some(rx) if rx.src == expected_src => Ok(Some(rx.len)),
            Some(_) => {
                // Valid traffic, wrong peer
                self.app_status = ErrorCode::NoData;
                Ok(None)
            }
            None => Ok(None),
        }
    }
}
