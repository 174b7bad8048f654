use core::fmt;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DeviceError {
    /// A digital pin reported an error while being driven or sampled.
    Pin,
    /// Calibration has not been read yet; call `initialize` first.
    Uncalibrated,
    /// No conversion has been read back yet.
    NoSample,
}

impl fmt::Display for DeviceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeviceError::Pin => write!(f, "pin error"),
            DeviceError::Uncalibrated => write!(f, "device not calibrated"),
            DeviceError::NoSample => write!(f, "no conversion read yet"),
        }
    }
}
