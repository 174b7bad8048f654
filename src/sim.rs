//! Simulated hardware for tests.
//!
//! Pins share their state through `Rc<RefCell<..>>`, so the pins handed to
//! the driver and the handle kept by the test observe the same wires.

use core::cell::{Cell, RefCell};
use core::convert::Infallible;
use std::rc::Rc;
use std::vec::Vec;

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{ErrorType, InputPin, OutputPin};

use crate::compensation::RawSample;
use crate::scheduler::Clock;

/// Data-out wired straight back to data-in.
#[derive(Clone, Default)]
pub struct Loopback {
    level: Rc<Cell<bool>>,
}

pub struct LoopbackOut(Rc<Cell<bool>>);
pub struct LoopbackIn(Rc<Cell<bool>>);
pub struct Floating;

impl Loopback {
    pub fn data_out(&self) -> LoopbackOut {
        LoopbackOut(self.level.clone())
    }

    pub fn data_in(&self) -> LoopbackIn {
        LoopbackIn(self.level.clone())
    }

    pub fn clock(&self) -> Floating {
        Floating
    }

    pub fn data_out_level(&self) -> bool {
        self.level.get()
    }
}

impl ErrorType for LoopbackOut {
    type Error = Infallible;
}

impl OutputPin for LoopbackOut {
    fn set_low(&mut self) -> Result<(), Infallible> {
        self.0.set(false);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Infallible> {
        self.0.set(true);
        Ok(())
    }
}

impl ErrorType for LoopbackIn {
    type Error = Infallible;
}

impl InputPin for LoopbackIn {
    fn is_high(&mut self) -> Result<bool, Infallible> {
        Ok(self.0.get())
    }

    fn is_low(&mut self) -> Result<bool, Infallible> {
        Ok(!self.0.get())
    }
}

impl ErrorType for Floating {
    type Error = Infallible;
}

impl OutputPin for Floating {
    fn set_low(&mut self) -> Result<(), Infallible> {
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Infallible> {
        Ok(())
    }
}

#[derive(Default)]
struct ChipState {
    registers: [u8; 12],
    pending: RawSample,
    selected: bool,
    awake: bool,
    clock: bool,
    mosi: bool,
    miso: bool,
    bits: u8,
    shift_in: u8,
    shift_out: u8,
    /// Every byte received while selected, in order.
    received: Vec<u8>,
    conversions: u32,
    data_in_fault: bool,
}

impl ChipState {
    fn rising_edge(&mut self) {
        if !self.selected {
            return;
        }
        self.miso = self.shift_out & (0x80 >> self.bits) != 0;
        self.shift_in = (self.shift_in << 1) | u8::from(self.mosi);
        self.bits += 1;
        if self.bits == 8 {
            let byte = self.shift_in;
            self.bits = 0;
            self.shift_in = 0;
            self.received.push(byte);
            self.shift_out = self.respond(byte);
        }
    }

    fn respond(&mut self, byte: u8) -> u8 {
        match byte {
            0x24 => {
                self.conversions += 1;
                let p = (self.pending.p_adc << 6).to_be_bytes();
                let t = (self.pending.t_adc << 6).to_be_bytes();
                self.registers[..4].copy_from_slice(&[p[0], p[1], t[0], t[1]]);
                0
            }
            b if b & 0x80 != 0 => self
                .registers
                .get(usize::from((b >> 1) & 0x3F))
                .copied()
                .unwrap_or(0),
            _ => 0,
        }
    }
}

/// An MPL115A1 on the far side of the wires.
#[derive(Clone, Default)]
pub struct SimChip {
    state: Rc<RefCell<ChipState>>,
}

pub struct ChipPin {
    state: Rc<RefCell<ChipState>>,
    role: Role,
}

#[derive(Copy, Clone)]
enum Role {
    Select,
    Shutdown,
    Clock,
    DataOut,
    DataIn,
}

impl SimChip {
    pub fn with_calibration(bytes: [u8; 8]) -> Self {
        let chip = SimChip::default();
        chip.state.borrow_mut().registers[4..].copy_from_slice(&bytes);
        chip
    }

    /// Result the next conversion will produce.
    pub fn set_sample(&self, t_adc: u16, p_adc: u16) {
        self.state.borrow_mut().pending = RawSample { t_adc, p_adc };
    }

    pub fn received(&self) -> Vec<u8> {
        self.state.borrow().received.clone()
    }

    pub fn clear_received(&self) {
        self.state.borrow_mut().received.clear();
    }

    pub fn conversions(&self) -> u32 {
        self.state.borrow().conversions
    }

    pub fn is_selected(&self) -> bool {
        self.state.borrow().selected
    }

    /// Make every read of the host data-in line fail.
    pub fn set_data_in_fault(&self, fault: bool) {
        self.state.borrow_mut().data_in_fault = fault;
    }

    pub fn is_awake(&self) -> bool {
        self.state.borrow().awake
    }

    fn pin(&self, role: Role) -> ChipPin {
        ChipPin {
            state: self.state.clone(),
            role,
        }
    }

    pub fn select(&self) -> ChipPin {
        self.pin(Role::Select)
    }

    pub fn shutdown(&self) -> ChipPin {
        self.pin(Role::Shutdown)
    }

    pub fn clock(&self) -> ChipPin {
        self.pin(Role::Clock)
    }

    /// Host data-out, chip data-in.
    pub fn data_out(&self) -> ChipPin {
        self.pin(Role::DataOut)
    }

    /// Host data-in, chip data-out.
    pub fn data_in(&self) -> ChipPin {
        self.pin(Role::DataIn)
    }
}

impl ErrorType for ChipPin {
    type Error = PinFault;
}

impl ChipPin {
    fn drive(&mut self, high: bool) {
        let mut chip = self.state.borrow_mut();
        match self.role {
            Role::Select => {
                // Falling select starts a fresh frame with nothing to shift out.
                if !high && !chip.selected {
                    chip.bits = 0;
                    chip.shift_in = 0;
                    chip.shift_out = 0;
                }
                chip.selected = !high;
            }
            Role::Shutdown => chip.awake = high,
            Role::Clock => {
                let rising = high && !chip.clock;
                chip.clock = high;
                if rising {
                    chip.rising_edge();
                }
            }
            Role::DataOut => chip.mosi = high,
            Role::DataIn => {}
        }
    }
}

impl OutputPin for ChipPin {
    fn set_low(&mut self) -> Result<(), PinFault> {
        self.drive(false);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), PinFault> {
        self.drive(true);
        Ok(())
    }
}

impl InputPin for ChipPin {
    fn is_high(&mut self) -> Result<bool, PinFault> {
        let chip = self.state.borrow();
        if chip.data_in_fault {
            return Err(PinFault);
        }
        Ok(chip.selected && chip.miso)
    }

    fn is_low(&mut self) -> Result<bool, PinFault> {
        self.is_high().map(|high| !high)
    }
}

/// Manually advanced millisecond clock.
#[derive(Clone, Default)]
pub struct SimClock {
    now: Rc<Cell<u32>>,
}

impl SimClock {
    pub fn starting_at(ms: u32) -> Self {
        let clock = SimClock::default();
        clock.now.set(ms);
        clock
    }

    pub fn advance(&self, ms: u32) {
        self.now.set(self.now.get().wrapping_add(ms));
    }
}

impl Clock for SimClock {
    fn now_ms(&mut self) -> u32 {
        self.now.get()
    }
}

#[derive(Debug)]
pub struct PinFault;

impl embedded_hal::digital::Error for PinFault {
    fn kind(&self) -> embedded_hal::digital::ErrorKind {
        embedded_hal::digital::ErrorKind::Other
    }
}

/// Output pin whose driver reports a fault on every write.
pub struct BrokenPin;

impl ErrorType for BrokenPin {
    type Error = PinFault;
}

impl OutputPin for BrokenPin {
    fn set_low(&mut self) -> Result<(), PinFault> {
        Err(PinFault)
    }

    fn set_high(&mut self) -> Result<(), PinFault> {
        Err(PinFault)
    }
}

/// `DelayNs` that records every microsecond delay it is asked for.
#[derive(Clone, Default)]
pub struct RecordingDelay {
    delays_us: Rc<RefCell<Vec<u32>>>,
}

impl RecordingDelay {
    pub fn delays_us(&self) -> Vec<u32> {
        self.delays_us.borrow().clone()
    }
}

impl DelayNs for RecordingDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.delays_us.borrow_mut().push(ns / 1_000);
    }

    fn delay_us(&mut self, us: u32) {
        self.delays_us.borrow_mut().push(us);
    }
}
