//! Serial transport abstraction
//!
//! Provides the byte-stream trait the protocol engine polls. The interface
//! is deliberately non-blocking: `read` and `peek` return `None` when no
//! byte has arrived yet, and the engine decides whether to spin or yield.

/// Byte-oriented serial transport
///
/// Implemented by platform UART drivers (or test doubles) and consumed by
/// the protocol engine by composition.
pub trait SerialPort {
    /// Error type for transport operations
    type Error;

    /// Number of bytes ready to be read without waiting
    fn available(&mut self) -> usize;

    /// Read one byte, or `None` if nothing has arrived yet
    fn read(&mut self) -> Result<Option<u8>, Self::Error>;

    /// Look at the next byte without consuming it, or `None` if empty
    fn peek(&mut self) -> Result<Option<u8>, Self::Error>;

    /// Write data to the transport
    ///
    /// Returns the number of bytes accepted. A return of 0 for a non-empty
    /// slice means the transport refused the write.
    fn write(&mut self, data: &[u8]) -> Result<usize, Self::Error>;

    /// Block until everything written has physically left the wire
    ///
    /// On a half-duplex bus the direction signal must not be released
    /// before this returns.
    fn flush(&mut self) -> Result<(), Self::Error>;
}
