/// Readable registers of the MPL115A1.
///
/// Each register holds one byte; 16-bit values are split into a high and a
/// low register.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Register {
    PressureHigh,
    PressureLow,
    TemperatureHigh,
    TemperatureLow,
    A0High,
    A0Low,
    B1High,
    B1Low,
    B2High,
    B2Low,
    C12High,
    C12Low,
}

impl Register {
    /// Register index as laid out in the device's memory map.
    pub fn index(&self) -> u8 {
        match *self {
            Register::PressureHigh => 0x00,
            Register::PressureLow => 0x01,
            Register::TemperatureHigh => 0x02,
            Register::TemperatureLow => 0x03,
            Register::A0High => 0x04,
            Register::A0Low => 0x05,
            Register::B1High => 0x06,
            Register::B1Low => 0x07,
            Register::B2High => 0x08,
            Register::B2Low => 0x09,
            Register::C12High => 0x0A,
            Register::C12Low => 0x0B,
        }
    }
}

/// Calibration registers in the order they are decoded: a0, b1, b2, c12,
/// each high byte first.
pub const CALIBRATION_REGISTERS: [Register; 8] = [
    Register::A0High,
    Register::A0Low,
    Register::B1High,
    Register::B1Low,
    Register::B2High,
    Register::B2Low,
    Register::C12High,
    Register::C12Low,
];

/// Conversion result registers: pressure then temperature, high byte first.
pub const DATA_REGISTERS: [Register; 4] = [
    Register::PressureHigh,
    Register::PressureLow,
    Register::TemperatureHigh,
    Register::TemperatureLow,
];

pub enum Command {
    StartConversion,
    Read(Register),
    // Clocks out the pending response without addressing anything.
    Flush,
}

impl Command {
    pub fn value(&self) -> u8 {
        match self {
            Command::StartConversion => 0x24,
            // Read bit (0x80) with the register index in bits 1..=6.
            Command::Read(register) => 0x80 | (register.index() << 1),
            Command::Flush => 0x00,
        }
    }
}
