//! Non-blocking conversion cycle.
//!
//! A conversion takes a few milliseconds. Instead of sleeping through it the
//! device is stepped by repeated `tick` calls, each of which either performs
//! a short pin sequence or only compares timestamps.

/// Monotonic millisecond time source.
pub trait Clock {
    fn now_ms(&mut self) -> u32;
}

impl<F: FnMut() -> u32> Clock for F {
    fn now_ms(&mut self) -> u32 {
        self()
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConversionState {
    /// Next tick starts a conversion.
    StartConversion,
    /// Conversion in progress.
    WaitToRead,
    /// Next tick reads the result back.
    ReadConversion,
}

/// Whether a conversion started at `started_ms` has had `wait_ms` to finish.
///
/// Wrapping arithmetic keeps this correct across a wrap of the clock.
pub fn conversion_done(started_ms: u32, now_ms: u32, wait_ms: u32) -> bool {
    now_ms.wrapping_sub(started_ms) >= wait_ms
}
