//! In-memory transport doubles for the unit tests

use heapless::{Deque, Vec};
use multidrop_hal::{OutputPin, SerialPort};

/// Serial double: reads come from an injectable queue, writes land in `tx`
pub(crate) struct MockPort {
    pub rx: Deque<u8, 2048>,
    pub tx: Vec<u8, 2048>,
    /// When set, every write is refused
    pub fail_writes: bool,
}

impl MockPort {
    pub fn new() -> Self {
        Self {
            rx: Deque::new(),
            tx: Vec::new(),
            fail_writes: false,
        }
    }

    /// Queue bytes for the session to receive
    pub fn inject(&mut self, bytes: &[u8]) {
        for &b in bytes {
            self.rx.push_back(b).unwrap();
        }
    }

    /// Take everything the session transmitted
    pub fn take_tx(&mut self) -> Vec<u8, 2048> {
        core::mem::take(&mut self.tx)
    }
}

impl SerialPort for MockPort {
    type Error = ();

    fn available(&mut self) -> usize {
        self.rx.len()
    }

    fn read(&mut self) -> Result<Option<u8>, Self::Error> {
        Ok(self.rx.pop_front())
    }

    fn peek(&mut self) -> Result<Option<u8>, Self::Error> {
        Ok(self.rx.front().copied())
    }

    fn write(&mut self, data: &[u8]) -> Result<usize, Self::Error> {
        if self.fail_writes {
            return Err(());
        }
        self.tx.extend_from_slice(data).map_err(|_| ())?;
        Ok(data.len())
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

/// Direction pin double counting mode transitions
pub(crate) struct MockPin {
    pub high: bool,
    pub transmit_edges: u32,
    pub receive_edges: u32,
}

impl MockPin {
    pub fn new() -> Self {
        Self {
            high: false,
            transmit_edges: 0,
            receive_edges: 0,
        }
    }
}

impl OutputPin for MockPin {
    fn set_high(&mut self) {
        self.high = true;
        self.transmit_edges += 1;
    }

    fn set_low(&mut self) {
        self.high = false;
        self.receive_edges += 1;
    }
}
