//! Pressure and temperature compensation.
//!
//! All functions are pure: they only look at a raw sample, the decoded
//! coefficients and the configured scaling.

use crate::calibration::Coefficients;
use crate::config::{Resolution, TemperatureModel};

/// Full-scale count of the compensated pressure.
const PCOMP_FULL_SCALE: f64 = 1023.0;
/// Pressure range mapped onto `0..=PCOMP_FULL_SCALE`, in kPa.
const PRESSURE_MIN_KPA: f64 = 50.0;
const PRESSURE_MAX_KPA: f64 = 115.0;

/// One completed conversion: 10-bit raw temperature and pressure counts.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RawSample {
    pub t_adc: u16,
    pub p_adc: u16,
}

impl RawSample {
    /// Builds a sample from the four data registers (pressure high/low,
    /// temperature high/low). Each count is left-aligned in its 16-bit pair.
    pub fn from_registers(buf: &[u8; 4]) -> RawSample {
        RawSample {
            t_adc: adc_count(buf[2], buf[3]),
            p_adc: adc_count(buf[0], buf[1]),
        }
    }
}

fn adc_count(high: u8, low: u8) -> u16 {
    (u16::from_be_bytes([high, low]) >> 6) & 0x03FF
}

/// `Pcomp = a0 + (b1 + c12 * Tadc) * Padc + b2 * Tadc`
pub fn compensated_pressure(sample: RawSample, coefficients: &Coefficients) -> f64 {
    let t_adc = f64::from(sample.t_adc);
    let p_adc = f64::from(sample.p_adc);
    coefficients.a0 + (coefficients.b1 + coefficients.c12 * t_adc) * p_adc + coefficients.b2 * t_adc
}

pub fn pressure_kpa(sample: RawSample, coefficients: &Coefficients) -> f64 {
    compensated_pressure(sample, coefficients) * (PRESSURE_MAX_KPA - PRESSURE_MIN_KPA)
        / PCOMP_FULL_SCALE
        + PRESSURE_MIN_KPA
}

/// Pressure in kPa scaled by the resolution multiplier, truncated.
pub fn pressure(sample: RawSample, coefficients: &Coefficients, resolution: Resolution) -> i32 {
    (pressure_kpa(sample, coefficients) * resolution.multiplier()) as i32
}

/// Temperature in °C scaled by the resolution multiplier, truncated.
pub fn temperature(sample: RawSample, model: &TemperatureModel, resolution: Resolution) -> i32 {
    (model.celsius(sample.t_adc) * resolution.multiplier()) as i32
}
