//! Driver for the MPL115A1 barometric pressure sensor on a bit-banged
//! serial bus.
//!
//! The part has no hardware bus support requirement: four GPIO lines (plus
//! an optional shutdown line), a microsecond delay and a millisecond clock
//! are all it needs.
//!
//! ```ignore
//! let pins = Pins::new(miso, mosi, sck, cs).with_shutdown(sdn);
//! let mut sensor = Mpl115a1::new(pins, delay, || millis());
//! sensor.initialize()?;
//! loop {
//!     sensor.tick()?;
//!     if let Ok(pressure) = sensor.current_pressure() {
//!         // 10132 is 101.32 kPa
//!     }
//!     // other work
//! }
//! ```
#![no_std]

#[cfg(test)]
extern crate std;

use core::convert::Infallible;

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{ErrorType, InputPin, OutputPin};
use log::{debug, trace};

mod calibration;
mod command;
mod compensation;
mod config;
mod error;
mod scheduler;
#[cfg(test)]
mod sim;
mod transport;

pub use calibration::{CalibrationWords, Coefficients};
pub use command::{Command, Register, CALIBRATION_REGISTERS, DATA_REGISTERS};
pub use compensation::{compensated_pressure, pressure, pressure_kpa, temperature, RawSample};
pub use config::{Config, Resolution, TemperatureModel};
pub use error::DeviceError;
pub use scheduler::{conversion_done, Clock, ConversionState};
pub use transport::{BitBangBus, Transport, SETTLE_DELAY_US};

/// Placeholder for boards with the shutdown line tied high.
pub struct NoShutdown;

impl ErrorType for NoShutdown {
    type Error = Infallible;
}

impl OutputPin for NoShutdown {
    fn set_low(&mut self) -> Result<(), Infallible> {
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Infallible> {
        Ok(())
    }
}

/// The lines connecting the host to one sensor.
pub struct Pins<DIN, DOUT, CLK, CS, SDN = NoShutdown> {
    pub data_in: DIN,
    pub data_out: DOUT,
    pub clock: CLK,
    /// Active low.
    pub select: CS,
    /// Active low; driven high once at initialization.
    pub shutdown: Option<SDN>,
}

impl<DIN, DOUT, CLK, CS> Pins<DIN, DOUT, CLK, CS, NoShutdown> {
    pub fn new(data_in: DIN, data_out: DOUT, clock: CLK, select: CS) -> Self {
        Self {
            data_in,
            data_out,
            clock,
            select,
            shutdown: None,
        }
    }

    pub fn with_shutdown<SDN>(self, shutdown: SDN) -> Pins<DIN, DOUT, CLK, CS, SDN> {
        Pins {
            data_in: self.data_in,
            data_out: self.data_out,
            clock: self.clock,
            select: self.select,
            shutdown: Some(shutdown),
        }
    }
}

pub struct Mpl115a1<B, CS, SDN, C> {
    bus: B,
    select: CS,
    shutdown: Option<SDN>,
    clock: C,
    config: Config,
    coefficients: Option<Coefficients>, // read once by `initialize`
    sample: Option<RawSample>,
    state: ConversionState,
    started_ms: u32,
}

impl<DIN, DOUT, CLK, D, CS, SDN, C> Mpl115a1<BitBangBus<DIN, DOUT, CLK, D>, CS, SDN, C>
where
    DIN: InputPin,
    DOUT: OutputPin,
    CLK: OutputPin,
    D: DelayNs,
    CS: OutputPin,
    SDN: OutputPin,
    C: Clock,
{
    /// Create a driver that owns its serial lines.
    ///
    /// Pins must already be configured: `data_in` as an input, everything
    /// else as push-pull outputs. Nothing is driven until `initialize`.
    pub fn new(pins: Pins<DIN, DOUT, CLK, CS, SDN>, delay: D, clock: C) -> Self {
        let bus = BitBangBus::new(pins.data_in, pins.data_out, pins.clock, delay);
        Self::with_transport(bus, pins.select, pins.shutdown, clock)
    }
}

impl<B, CS, SDN, C> Mpl115a1<B, CS, SDN, C>
where
    B: Transport,
    CS: OutputPin,
    SDN: OutputPin,
    C: Clock,
{
    /// Create a driver on an existing transport.
    ///
    /// Pass `&mut bus` to share one set of clock and data lines between
    /// several sensors, each with its own select line.
    pub fn with_transport(bus: B, select: CS, shutdown: Option<SDN>, clock: C) -> Self {
        Self {
            bus,
            select,
            shutdown,
            clock,
            config: Config::default(),
            coefficients: None,
            sample: None,
            state: ConversionState::StartConversion,
            started_ms: 0,
        }
    }

    pub fn with_config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    /// Wake the device and read its factory calibration.
    ///
    /// Only needs to be called once. The calibration cannot be verified, so
    /// miswiring shows up as implausible readings rather than an error.
    pub fn initialize(&mut self) -> Result<(), DeviceError> {
        if let Some(shutdown) = self.shutdown.as_mut() {
            shutdown.set_high().map_err(|_| DeviceError::Pin)?;
        }

        let buf = self.framed(|bus| {
            let mut buf = [0u8; 8];
            for (byte, register) in buf.iter_mut().zip(CALIBRATION_REGISTERS) {
                bus.exchange(Command::Read(register).value())?;
                *byte = bus.exchange(Command::Flush.value())?;
            }
            bus.exchange(Command::Flush.value())?;
            Ok(buf)
        })?;

        let coefficients = Coefficients::from_bytes(&buf);
        debug!("calibration bytes {:02x?}", buf);
        debug!(
            "a0 {} b1 {} b2 {} c12 {}",
            coefficients.a0, coefficients.b1, coefficients.b2, coefficients.c12
        );

        self.coefficients = Some(coefficients);
        self.sample = None;
        self.state = ConversionState::StartConversion;
        Ok(())
    }

    /// Run `frame` with the device selected.
    ///
    /// Deselects even when the frame fails so a shared bus is left idle. The
    /// first error is returned.
    fn framed<T>(
        &mut self,
        frame: impl FnOnce(&mut B) -> Result<T, DeviceError>,
    ) -> Result<T, DeviceError> {
        let result = self.select().and_then(|()| frame(&mut self.bus));
        let deselected = self.deselect();
        let value = result?;
        deselected?;
        Ok(value)
    }

    /// Clock low, then select low, each followed by a settle delay.
    pub fn select(&mut self) -> Result<(), DeviceError> {
        self.bus.clock_low()?;
        self.bus.settle();
        self.select.set_low().map_err(|_| DeviceError::Pin)?;
        self.bus.settle();
        Ok(())
    }

    /// Clock low, select high, then park data-out low.
    pub fn deselect(&mut self) -> Result<(), DeviceError> {
        self.bus.clock_low()?;
        self.bus.settle();
        self.select.set_high().map_err(|_| DeviceError::Pin)?;
        self.bus.data_out_low()
    }

    /// Trigger one pressure and temperature conversion.
    ///
    /// The result is ready `Config::conversion_wait_ms` later.
    pub fn start_conversion(&mut self) -> Result<(), DeviceError> {
        if self.coefficients.is_none() {
            return Err(DeviceError::Uncalibrated);
        }
        self.framed(|bus| {
            bus.exchange(Command::StartConversion.value())?;
            bus.exchange(Command::Flush.value())?;
            Ok(())
        })
    }

    /// Read back the last conversion.
    pub fn read_conversion(&mut self) -> Result<RawSample, DeviceError> {
        if self.coefficients.is_none() {
            return Err(DeviceError::Uncalibrated);
        }
        let buf = self.framed(|bus| {
            let mut buf = [0u8; 4];
            // Responses lag one exchange behind the address.
            bus.exchange(Command::Read(DATA_REGISTERS[0]).value())?;
            for (byte, register) in buf.iter_mut().zip(DATA_REGISTERS.iter().skip(1)) {
                *byte = bus.exchange(Command::Read(*register).value())?;
            }
            buf[3] = bus.exchange(Command::Flush.value())?;
            Ok(buf)
        })?;

        let sample = RawSample::from_registers(&buf);
        trace!("raw sample t_adc {} p_adc {}", sample.t_adc, sample.p_adc);
        self.sample = Some(sample);
        Ok(sample)
    }

    /// Advance the conversion cycle by one step and return the new state.
    ///
    /// Never waits for the conversion itself; call it at least every few
    /// milliseconds. Ticking late only delays the next read.
    pub fn tick(&mut self) -> Result<ConversionState, DeviceError> {
        if self.coefficients.is_none() {
            return Err(DeviceError::Uncalibrated);
        }
        let next = match self.state {
            ConversionState::StartConversion => {
                let now = self.clock.now_ms();
                self.start_conversion()?;
                self.started_ms = now;
                ConversionState::WaitToRead
            }
            ConversionState::WaitToRead => {
                let now = self.clock.now_ms();
                if conversion_done(self.started_ms, now, self.config.conversion_wait_ms) {
                    ConversionState::ReadConversion
                } else {
                    ConversionState::WaitToRead
                }
            }
            ConversionState::ReadConversion => {
                self.read_conversion()?;
                ConversionState::StartConversion
            }
        };
        if next != self.state {
            trace!("{:?} -> {:?}", self.state, next);
        }
        self.state = next;
        Ok(next)
    }

    /// Latest pressure in kPa, scaled by the configured resolution.
    pub fn current_pressure(&self) -> Result<i32, DeviceError> {
        let coefficients = self.coefficients.as_ref().ok_or(DeviceError::Uncalibrated)?;
        let sample = self.sample.ok_or(DeviceError::NoSample)?;
        Ok(pressure(sample, coefficients, self.config.resolution))
    }

    /// Latest temperature in °C, scaled by the configured resolution.
    pub fn current_temperature(&self) -> Result<i32, DeviceError> {
        if self.coefficients.is_none() {
            return Err(DeviceError::Uncalibrated);
        }
        let sample = self.sample.ok_or(DeviceError::NoSample)?;
        Ok(temperature(sample, &self.config.temperature, self.config.resolution))
    }

    pub fn state(&self) -> ConversionState {
        self.state
    }

    pub fn coefficients(&self) -> Option<&Coefficients> {
        self.coefficients.as_ref()
    }

    pub fn raw_sample(&self) -> Option<RawSample> {
        self.sample
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn release(self) -> (B, CS, Option<SDN>, C) {
        (self.bus, self.select, self.shutdown, self.clock)
    }
}
