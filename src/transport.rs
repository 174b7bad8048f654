//! Bit-banged serial transport.
//!
//! The MPL115A1 speaks an SPI-like, mode 0, MSB-first protocol. Chip select
//! is not part of the transport: the device handle owns its select line so
//! that several devices can share one set of clock and data lines.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{InputPin, OutputPin, PinState};

use crate::error::DeviceError;

/// Settle time after every pin change, in microseconds.
///
/// The datasheet asks for 30 ns of setup and 62.5 ns of clock high time. This
/// is far longer than needed; it is the shortest delay the busy-wait on slow
/// hosts resolves reliably.
pub const SETTLE_DELAY_US: u32 = 40;

/// Byte-level access to the serial lines.
///
/// Every method assumes the caller has already selected the device.
pub trait Transport {
    /// Clocks one byte out while clocking one byte in.
    fn exchange(&mut self, byte: u8) -> Result<u8, DeviceError>;
    fn clock_low(&mut self) -> Result<(), DeviceError>;
    fn data_out_low(&mut self) -> Result<(), DeviceError>;
    /// Waits one settle period.
    fn settle(&mut self);
}

impl<T: Transport + ?Sized> Transport for &mut T {
    fn exchange(&mut self, byte: u8) -> Result<u8, DeviceError> {
        (**self).exchange(byte)
    }

    fn clock_low(&mut self) -> Result<(), DeviceError> {
        (**self).clock_low()
    }

    fn data_out_low(&mut self) -> Result<(), DeviceError> {
        (**self).data_out_low()
    }

    fn settle(&mut self) {
        (**self).settle()
    }
}

/// Software serial bus on three GPIO lines.
pub struct BitBangBus<DIN, DOUT, CLK, D> {
    data_in: DIN,
    data_out: DOUT,
    clock: CLK,
    delay: D,
    settle_us: u32,
}

impl<DIN, DOUT, CLK, D> BitBangBus<DIN, DOUT, CLK, D>
where
    DIN: InputPin,
    DOUT: OutputPin,
    CLK: OutputPin,
    D: DelayNs,
{
    /// `data_in` must already be configured as an input, `data_out` and
    /// `clock` as push-pull outputs.
    pub fn new(data_in: DIN, data_out: DOUT, clock: CLK, delay: D) -> Self {
        Self {
            data_in,
            data_out,
            clock,
            delay,
            settle_us: SETTLE_DELAY_US,
        }
    }

    pub fn with_settle_delay(mut self, us: u32) -> Self {
        self.settle_us = us;
        self
    }

    pub fn release(self) -> (DIN, DOUT, CLK, D) {
        (self.data_in, self.data_out, self.clock, self.delay)
    }
}

impl<DIN, DOUT, CLK, D> Transport for BitBangBus<DIN, DOUT, CLK, D>
where
    DIN: InputPin,
    DOUT: OutputPin,
    CLK: OutputPin,
    D: DelayNs,
{
    fn exchange(&mut self, byte: u8) -> Result<u8, DeviceError> {
        let mut input: u8 = 0;
        for bit in (0..8).rev() {
            let level = PinState::from(byte & (1 << bit) != 0);
            self.data_out.set_state(level).map_err(|_| DeviceError::Pin)?;
            self.settle();

            self.clock.set_high().map_err(|_| DeviceError::Pin)?;
            self.settle();

            input <<= 1;
            if self.data_in.is_high().map_err(|_| DeviceError::Pin)? {
                input |= 0x01;
            }

            self.clock.set_low().map_err(|_| DeviceError::Pin)?;
            self.settle();
        }
        self.data_out_low()?;
        Ok(input)
    }

    fn clock_low(&mut self) -> Result<(), DeviceError> {
        self.clock.set_low().map_err(|_| DeviceError::Pin)
    }

    fn data_out_low(&mut self) -> Result<(), DeviceError> {
        self.data_out.set_low().map_err(|_| DeviceError::Pin)
    }

    fn settle(&mut self) {
        self.delay.delay_us(self.settle_us);
    }
}
