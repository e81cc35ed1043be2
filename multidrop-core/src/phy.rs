//! PHY layer: frame delimiting over the raw byte stream
//!
//! Transmit wraps an encoded buffer in two delimiter bytes and pushes it
//! out with the line driver held for exactly that long. Receive is a
//! byte-at-a-time state machine: hunt for a delimiter, accumulate until the
//! closing delimiter, decode. A non-blocking call consumes at most one byte
//! and returns `Ok(None)` for every outcome short of a finished frame.

use multidrop_hal::{DirectionControl, SerialPort};
use multidrop_protocol::FrameError;

use crate::error::{Error, ErrorCode};
use crate::session::Session;

/// Scoped transmit grant
///
/// Raises the direction signal on construction and releases it on drop, so
/// the line can never be left keyed by an early return.
struct TxGuard<'a, D: DirectionControl> {
    dir: &'a mut D,
}

impl<'a, D: DirectionControl> TxGuard<'a, D> {
    fn new(dir: &'a mut D) -> Self {
        dir.set_transmit();
        Self { dir }
    }
}

impl<D: DirectionControl> Drop for TxGuard<'_, D> {
    fn drop(&mut self) {
        self.dir.set_receive();
    }
}

/// Push `data` through a transport that may accept partial writes
fn write_all<P: SerialPort>(port: &mut P, mut data: &[u8]) -> Result<(), Error> {
    while !data.is_empty() {
        let n = port.write(data).map_err(|_| Error::Write)?;
        if n == 0 {
            return Err(Error::Write);
        }
        data = &data[n..];
    }
    Ok(())
}

impl<P, D, const RAW: usize> Session<P, D, RAW>
where
    P: SerialPort,
    D: DirectionControl,
{
    /// Encode `raw` and transmit it as one delimited frame
    ///
    /// `raw` may not exceed the active encoding's configured raw maximum;
    /// oversize input fails before any I/O. Returns the encoded length
    /// (delimiters not counted). The direction signal is held at transmit
    /// across the delimiter-payload-delimiter writes and the flush, then
    /// released — also on every error path.
    pub fn send_phy(&mut self, raw: &[u8]) -> Result<usize, Error> {
        let res = self.send_phy_raw(raw);
        self.phy_status = match res {
            Ok(_) => ErrorCode::NoError,
            Err(e) => e.into(),
        };
        res
    }

    fn send_phy_raw(&mut self, raw: &[u8]) -> Result<usize, Error> {
        if raw.len() > self.raw_max() {
            return Err(Error::Oversize);
        }
        let mut encoded = [0u8; RAW];
        let len = self
            .encoding
            .encode(raw, &mut encoded)
            .map_err(|_| Error::Encode)?;
        let delim = [self.encoding.delimiter()];

        let Session { port, dir, .. } = self;
        let _grant = TxGuard::new(dir);
        write_all(port, &delim)?;
        write_all(port, &encoded[..len])?;
        write_all(port, &delim)?;
        port.flush().map_err(|_| Error::Write)?;
        Ok(len)
    }

    /// Poll the transport for one decoded frame
    ///
    /// Non-blocking: consumes at most one byte; `Ok(None)` means call
    /// again later. Blocking (per-call flag OR the session default): spins
    /// until a frame completes, a hard error occurs, or the configured
    /// idle-poll budget runs out. [`Error::Noise`] is advisory and returns
    /// immediately in either mode.
    pub fn receive_phy(&mut self, out: &mut [u8], blocking: bool) -> Result<Option<usize>, Error> {
        let blocking = blocking || self.blocking;
        let mut idle_polls: u32 = 0;
        loop {
            if self.port.available() == 0 {
                self.phy_status = ErrorCode::NoData;
                if !blocking {
                    return Ok(None);
                }
                if let Some(limit) = self.poll_limit {
                    idle_polls += 1;
                    if idle_polls > limit {
                        self.phy_status = ErrorCode::Timeout;
                        return Err(Error::Timeout);
                    }
                }
                continue;
            }
            let byte = match self.port.read() {
                Ok(Some(byte)) => byte,
                Ok(None) => {
                    // available() raced a consumer; treat as an empty poll
                    self.phy_status = ErrorCode::NoData;
                    if !blocking {
                        return Ok(None);
                    }
                    continue;
                }
                Err(_) => {
                    self.phy_status = ErrorCode::Read;
                    return Err(Error::Read);
                }
            };
            idle_polls = 0;
            match self.step(byte, out)? {
                Some(len) => return Ok(Some(len)),
                None if blocking => continue,
                None => return Ok(None),
            }
        }
    }

    /// Advance the reassembly state machine by one received byte
    fn step(&mut self, byte: u8, out: &mut [u8]) -> Result<Option<usize>, Error> {
        if byte == self.encoding.delimiter() {
            if self.synced && !self.rx.is_empty() {
                // Closing delimiter: decode what accumulated between the two
                self.synced = false;
                let res = self.encoding.decode(&self.rx, out);
                self.rx.clear();
                let len = match res {
                    Ok(len) => len,
                    Err(FrameError::BufferTooSmall) => {
                        self.phy_status = ErrorCode::Oversize;
                        return Err(Error::Oversize);
                    }
                    Err(FrameError::InvalidFrame) => {
                        self.phy_status = ErrorCode::Decode;
                        return Err(Error::Decode);
                    }
                };
                if len > self.frame_max() {
                    self.phy_status = ErrorCode::Oversize;
                    return Err(Error::Oversize);
                }
                self.phy_status = ErrorCode::NoError;
                Ok(Some(len))
            } else if self.synced {
                // Back-to-back delimiters: an empty frame. Stay synchronized;
                // a delimiter closes one frame and opens the next.
                self.phy_status = ErrorCode::NoError;
                Ok(None)
            } else {
                // Opening delimiter after noise or idle
                self.synced = true;
                self.rx.clear();
                self.phy_status = ErrorCode::NoError;
                Ok(None)
            }
        } else if self.synced {
            if self.rx.push(byte).is_err() {
                // Scratch full: no valid frame fits anymore. Drop it and
                // hunt for the next delimiter.
                self.synced = false;
                self.rx.clear();
                self.phy_status = ErrorCode::Oversize;
                return Err(Error::Oversize);
            }
            self.phy_status = ErrorCode::NoError;
            Ok(None)
        } else {
            self.phy_status = ErrorCode::Noise;
            Err(Error::Noise)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{MockPin, MockPort};
    use crate::{raw_capacity, Config, Encoding, Layer};

    const CAP: usize = raw_capacity(64);

    fn session(encoding: Encoding) -> Session<MockPort, MockPin, CAP> {
        Session::new(
            MockPort::new(),
            MockPin::new(),
            Config {
                address: 0x01,
                encoding,
                ..Config::default()
            },
        )
        .unwrap()
    }

    /// Delimited wire image of one frame
    fn wire_frame(encoding: Encoding, payload: &[u8]) -> heapless::Vec<u8, 600> {
        let mut encoded = [0u8; 600];
        let len = encoding.encode(payload, &mut encoded).unwrap();
        let mut wire = heapless::Vec::new();
        wire.push(encoding.delimiter()).unwrap();
        wire.extend_from_slice(&encoded[..len]).unwrap();
        wire.push(encoding.delimiter()).unwrap();
        wire
    }

    /// Poll a non-blocking receive until it produces a frame
    fn drain(s: &mut Session<MockPort, MockPin, CAP>, out: &mut [u8]) -> Option<usize> {
        while s.port_mut().available() > 0 {
            if let Some(len) = s.receive_phy(out, false).unwrap() {
                return Some(len);
            }
        }
        None
    }

    #[test]
    fn test_send_brackets_frame_with_delimiters() {
        for encoding in [Encoding::Cobs, Encoding::Slip] {
            let mut s = session(encoding);
            let len = s.send_phy(&[0x10, 0x00, 0xC0]).unwrap();
            let tx = s.port_mut().take_tx();
            assert_eq!(tx.len(), len + 2);
            assert_eq!(tx[0], encoding.delimiter());
            assert_eq!(tx[tx.len() - 1], encoding.delimiter());
            // Nothing between the delimiters may look like one
            assert!(tx[1..tx.len() - 1].iter().all(|&b| b != encoding.delimiter()));
        }
    }

    #[test]
    fn test_send_releases_line_on_success_and_failure() {
        let mut s = session(Encoding::Cobs);
        s.send_phy(&[1, 2, 3]).unwrap();
        s.port_mut().fail_writes = true;
        assert_eq!(s.send_phy(&[4, 5, 6]), Err(Error::Write));
        let (_, pin) = s.release();
        assert!(!pin.high);
        assert_eq!(pin.transmit_edges, 2);
        // Construction plus one release per send attempt
        assert_eq!(pin.receive_edges, 3);
    }

    #[test]
    fn test_send_oversize_performs_no_io() {
        let mut s = session(Encoding::Cobs);
        let too_big = [0u8; raw_capacity(64)];
        assert_eq!(s.send_phy(&too_big[..s.raw_max() + 1]), Err(Error::Oversize));
        assert!(s.port_mut().take_tx().is_empty());
        assert_eq!(s.last_error(Layer::Phy), crate::ErrorCode::Oversize);
    }

    #[test]
    fn test_receive_reassembles_frame_byte_at_a_time() {
        for encoding in [Encoding::Cobs, Encoding::Slip] {
            let mut s = session(encoding);
            let payload = [0xC0, 0x00, 0xDB, 0x42];
            let wire = wire_frame(encoding, &payload);
            s.port_mut().inject(&wire);
            let mut out = [0u8; CAP];
            let len = drain(&mut s, &mut out).unwrap();
            assert_eq!(&out[..len], &payload);
        }
    }

    #[test]
    fn test_receive_without_data_reports_no_data() {
        let mut s = session(Encoding::Cobs);
        let mut out = [0u8; CAP];
        assert_eq!(s.receive_phy(&mut out, false), Ok(None));
        assert_eq!(s.last_error(Layer::Phy), crate::ErrorCode::NoData);
    }

    #[test]
    fn test_noise_before_sync_is_advisory() {
        let mut s = session(Encoding::Cobs);
        s.port_mut().inject(&[0x55, 0xAA]);
        let mut out = [0u8; CAP];
        assert_eq!(s.receive_phy(&mut out, false), Err(Error::Noise));
        assert_eq!(s.receive_phy(&mut out, false), Err(Error::Noise));
        // Noise must not have desynchronized anything: a frame still lands
        let wire = wire_frame(Encoding::Cobs, &[1, 2, 3]);
        s.port_mut().inject(&wire);
        let len = drain(&mut s, &mut out).unwrap();
        assert_eq!(&out[..len], &[1, 2, 3]);
    }

    #[test]
    fn test_back_to_back_delimiters_resync_without_error() {
        let mut s = session(Encoding::Slip);
        let wire = wire_frame(Encoding::Slip, &[7, 8, 9]);
        // Leading END before the real frame: END END 7 8 9 END
        s.port_mut().inject(&[Encoding::Slip.delimiter()]);
        s.port_mut().inject(&wire);
        let mut out = [0u8; CAP];
        let len = drain(&mut s, &mut out).unwrap();
        assert_eq!(&out[..len], &[7, 8, 9]);
    }

    #[test]
    fn test_overflow_discards_frame_and_resyncs() {
        let mut s = session(Encoding::Cobs);
        let mut out = [0u8; CAP];
        // Open a frame, then stuff more nonzero bytes than the scratch holds
        s.port_mut().inject(&[0x00]);
        assert_eq!(s.receive_phy(&mut out, false), Ok(None));
        for _ in 0..CAP {
            s.port_mut().inject(&[0x11]);
            assert_eq!(s.receive_phy(&mut out, false), Ok(None));
        }
        s.port_mut().inject(&[0x11]);
        assert_eq!(s.receive_phy(&mut out, false), Err(Error::Oversize));
        // The machine recovered: the next complete frame decodes
        let wire = wire_frame(Encoding::Cobs, &[4, 5]);
        s.port_mut().inject(&wire);
        let len = drain(&mut s, &mut out).unwrap();
        assert_eq!(&out[..len], &[4, 5]);
    }

    #[test]
    fn test_blocking_receive_completes_in_one_call() {
        let mut s = session(Encoding::Slip);
        let wire = wire_frame(Encoding::Slip, b"blocked");
        s.port_mut().inject(&wire);
        let mut out = [0u8; CAP];
        let len = s.receive_phy(&mut out, true).unwrap().unwrap();
        assert_eq!(&out[..len], b"blocked");
    }

    #[test]
    fn test_blocking_receive_times_out_on_idle_line() {
        let mut s: Session<MockPort, MockPin, CAP> = Session::new(
            MockPort::new(),
            MockPin::new(),
            Config {
                poll_limit: Some(8),
                ..Config::default()
            },
        )
        .unwrap();
        let mut out = [0u8; CAP];
        assert_eq!(s.receive_phy(&mut out, true), Err(Error::Timeout));
        assert_eq!(s.last_error(Layer::Phy), crate::ErrorCode::Timeout);
    }

    #[test]
    fn test_phy_roundtrip_through_loopback() {
        for encoding in [Encoding::Cobs, Encoding::Slip] {
            let mut s = session(encoding);
            let payload = [0x00, 0xC0, 0xDB, 0xDC, 0xDD, 0x01];
            s.send_phy(&payload).unwrap();
            let tx = s.port_mut().take_tx();
            s.port_mut().inject(&tx);
            let mut out = [0u8; CAP];
            let len = drain(&mut s, &mut out).unwrap();
            assert_eq!(&out[..len], &payload);
        }
    }
}
