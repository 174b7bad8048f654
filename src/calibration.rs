//! Factory calibration constants.
//!
//! The device stores four coefficients as big-endian signed 16-bit words.
//! Each is a fixed-point number with its own fraction width, and `c12` only
//! uses the upper 14 bits of its word.

/// Fixed-point scale of each coefficient.
const A0_SCALE: f64 = 8.0;
const B1_SCALE: f64 = 8192.0;
const B2_SCALE: f64 = 16384.0;
const C12_SCALE: f64 = 4194304.0;

/// Two low bits of the c12 word are padding.
const C12_PADDING_BITS: u32 = 2;

/// Calibration registers exactly as read from the device.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CalibrationWords {
    pub a0: i16,
    pub b1: i16,
    pub b2: i16,
    /// Still includes the two padding bits.
    pub c12: i16,
}

impl CalibrationWords {
    pub fn from_bytes(buf: &[u8; 8]) -> CalibrationWords {
        CalibrationWords {
            a0: i16::from_be_bytes([buf[0], buf[1]]),
            b1: i16::from_be_bytes([buf[2], buf[3]]),
            b2: i16::from_be_bytes([buf[4], buf[5]]),
            c12: i16::from_be_bytes([buf[6], buf[7]]),
        }
    }

    pub fn to_bytes(&self) -> [u8; 8] {
        let [a0_h, a0_l] = self.a0.to_be_bytes();
        let [b1_h, b1_l] = self.b1.to_be_bytes();
        let [b2_h, b2_l] = self.b2.to_be_bytes();
        let [c12_h, c12_l] = self.c12.to_be_bytes();
        [a0_h, a0_l, b1_h, b1_l, b2_h, b2_l, c12_h, c12_l]
    }
}

/// Decoded compensation coefficients.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Coefficients {
    /// Pressure offset.
    pub a0: f64,
    /// Pressure sensitivity.
    pub b1: f64,
    /// Temperature coefficient of offset.
    pub b2: f64,
    /// Temperature coefficient of sensitivity.
    pub c12: f64,
}

impl Coefficients {
    pub fn from_words(words: &CalibrationWords) -> Coefficients {
        Coefficients {
            a0: f64::from(words.a0) / A0_SCALE,
            b1: f64::from(words.b1) / B1_SCALE,
            b2: f64::from(words.b2) / B2_SCALE,
            // Arithmetic shift keeps the sign of negative words.
            c12: f64::from(words.c12 >> C12_PADDING_BITS) / C12_SCALE,
        }
    }

    pub fn from_bytes(buf: &[u8; 8]) -> Coefficients {
        Coefficients::from_words(&CalibrationWords::from_bytes(buf))
    }

    /// Reverses the scaling. The c12 padding bits come back as zero.
    ///
    /// `None` if a coefficient does not fit its register, which only happens
    /// for values that did not come from a device.
    pub fn to_words(&self) -> Option<CalibrationWords> {
        let c12 = to_word(self.c12, C12_SCALE)?;
        if c12 < i16::MIN >> C12_PADDING_BITS || c12 > i16::MAX >> C12_PADDING_BITS {
            return None;
        }
        Some(CalibrationWords {
            a0: to_word(self.a0, A0_SCALE)?,
            b1: to_word(self.b1, B1_SCALE)?,
            b2: to_word(self.b2, B2_SCALE)?,
            c12: c12 << C12_PADDING_BITS,
        })
    }

    pub fn to_bytes(&self) -> Option<[u8; 8]> {
        self.to_words().map(|words| words.to_bytes())
    }
}

fn to_word(value: f64, scale: f64) -> Option<i16> {
    let raw = value * scale;
    if raw >= f64::from(i16::MIN) && raw <= f64::from(i16::MAX) {
        Some(raw as i16)
    } else {
        None
    }
}
