//! Session: configuration, buffers, and receive state for one bus station
//!
//! A [`Session`] owns its transport and direction pin outright; there is no
//! shared state and no locking. The `RAW` const generic sizes the one
//! persistent receive scratch buffer, which must hold the worst-case
//! *encoded* frame for the configured payload maximum — use
//! [`crate::raw_capacity`] (or the per-encoding variants) to compute it:
//!
//! ```ignore
//! const PAYLOAD_MAX: usize = 64;
//! let session: Session<_, _, { raw_capacity(PAYLOAD_MAX) }> =
//!     Session::new(port, pin, Config::for_address(0x01))?;
//! ```

use heapless::Vec;
use multidrop_hal::{DirectionControl, SerialPort};
use multidrop_protocol::Encoding;

use crate::config::{cobs_raw_capacity, slip_raw_capacity, Config, COBS_RAW_CEILING};
use crate::error::{Error, ErrorCode, Layer};
use crate::{CRC_LEN, FRAME_OVERHEAD};

/// One station on the bus
///
/// Layer operations are split across the `phy`, `mac`, and `packet`
/// modules; this module holds construction and shared state.
pub struct Session<P, D, const RAW: usize> {
    pub(crate) port: P,
    pub(crate) dir: D,
    pub(crate) address: u8,
    pub(crate) payload_max: usize,
    pub(crate) encoding: Encoding,
    pub(crate) blocking: bool,
    pub(crate) poll_limit: Option<u32>,
    /// Raw (still encoded) bytes of the frame being reassembled
    pub(crate) rx: Vec<u8, RAW>,
    /// PHY receive state: false = discarding noise until a delimiter
    pub(crate) synced: bool,
    pub(crate) phy_status: ErrorCode,
    pub(crate) mac_status: ErrorCode,
    pub(crate) app_status: ErrorCode,
}

impl<P, D, const RAW: usize> Session<P, D, RAW>
where
    P: SerialPort,
    D: DirectionControl,
{
    /// Build a session and drive the line into receive mode
    ///
    /// Fails with [`Error::Oversize`] when `payload_max` is smaller than
    /// the checksum trailer or when the active encoding's worst-case frame
    /// does not fit in `RAW` bytes. A COBS request whose frames could
    /// exceed [`COBS_RAW_CEILING`] encoded bytes silently becomes SLIP.
    pub fn new(port: P, dir: D, config: Config) -> Result<Self, Error> {
        let Config {
            address,
            payload_max,
            mut encoding,
            blocking,
            poll_limit,
        } = config;

        if payload_max < CRC_LEN {
            return Err(Error::Oversize);
        }
        if encoding == Encoding::Cobs && cobs_raw_capacity(payload_max) > COBS_RAW_CEILING {
            encoding = Encoding::Slip;
        }
        let needed = match encoding {
            Encoding::Cobs => cobs_raw_capacity(payload_max),
            Encoding::Slip => slip_raw_capacity(payload_max),
        };
        if needed > RAW {
            return Err(Error::Oversize);
        }

        let mut session = Self {
            port,
            dir,
            address,
            payload_max,
            encoding,
            blocking,
            poll_limit,
            rx: Vec::new(),
            synced: false,
            phy_status: ErrorCode::NoError,
            mac_status: ErrorCode::NoError,
            app_status: ErrorCode::NoError,
        };
        session.dir.set_receive();
        Ok(session)
    }

    /// This station's address
    pub fn address(&self) -> u8 {
        self.address
    }

    /// Maximum application payload per packet
    pub fn payload_max(&self) -> usize {
        self.payload_max
    }

    /// The active frame encoding (after any COBS→SLIP fallback)
    pub fn encoding(&self) -> Encoding {
        self.encoding
    }

    /// Status left behind by the most recent operation on `layer`
    ///
    /// Compatibility shim for last-error-style callers; the `Result` of
    /// each operation carries the same information directly.
    pub fn last_error(&self, layer: Layer) -> ErrorCode {
        match layer {
            Layer::Phy => self.phy_status,
            Layer::Mac => self.mac_status,
            Layer::App => self.app_status,
        }
    }

    /// Direct access to the underlying transport
    ///
    /// For out-of-band traffic and for tests. Do not read from it while a
    /// frame is mid-reassembly unless you mean to steal its bytes.
    pub fn port_mut(&mut self) -> &mut P {
        &mut self.port
    }

    /// Tear down, returning the transport and direction pin
    pub fn release(self) -> (P, D) {
        (self.port, self.dir)
    }

    /// Largest raw buffer `send_phy` accepts under the active encoding
    pub(crate) fn raw_max(&self) -> usize {
        match self.encoding {
            Encoding::Cobs => cobs_raw_capacity(self.payload_max),
            Encoding::Slip => slip_raw_capacity(self.payload_max),
        }
    }

    /// Largest decoded PHY frame: payload + addresses + checksum
    pub(crate) fn frame_max(&self) -> usize {
        self.payload_max + FRAME_OVERHEAD
    }
}
