//! Transport abstraction — the device → host byte channel.
//!
//! The telemetry task is generic over `Transport`, so the serial UART on
//! hardware, a stdout shim in simulation, and capture buffers in tests
//! all plug in without touching the telemetry logic. RX bytes never flow
//! through here — command ingress is the dispatcher's job.

/// Outbound byte channel for telemetry frames.
pub trait Transport {
    /// Error type for this transport.
    type Error: core::fmt::Debug;

    /// Write the whole of `data`. All-or-nothing: a partial write is an
    /// error, so a frame is never split across a reconnect.
    fn write(&mut self, data: &[u8]) -> Result<(), Self::Error>;

    /// Flush any buffered output.
    fn flush(&mut self) -> Result<(), Self::Error>;
}

/// A transport that discards all writes. Used in simulation runs with no
/// host attached.
pub struct NullTransport;

impl Transport for NullTransport {
    type Error = ();

    fn write(&mut self, _data: &[u8]) -> Result<(), ()> {
        Ok(())
    }

    fn flush(&mut self) -> Result<(), ()> {
        Ok(())
    }
}
