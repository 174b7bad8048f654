/// Fixed-point resolution of the integer readings.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Resolution {
    /// Two decimal places: `10132` is 101.32 kPa, `2350` is 23.50 °C.
    Hundredths,
    /// Three decimal places.
    Thousandths,
}

impl Resolution {
    pub fn multiplier(&self) -> f64 {
        match *self {
            Resolution::Hundredths => 100.0,
            Resolution::Thousandths => 1000.0,
        }
    }
}

/// Linear temperature approximation `25 + (Tadc - t0) / slope`.
///
/// The device has no calibrated temperature output. The defaults are the
/// empirical values for this part family and should be replaced by values
/// measured against a reference thermometer where accuracy matters.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct TemperatureModel {
    /// Raw temperature count at 25 °C.
    pub t0: f64,
    /// Counts per °C. Negative: the count falls as temperature rises.
    pub slope: f64,
}

impl Default for TemperatureModel {
    fn default() -> Self {
        Self {
            t0: 472.0,
            slope: -5.35,
        }
    }
}

impl TemperatureModel {
    pub fn celsius(&self, t_adc: u16) -> f64 {
        25.0 + (f64::from(t_adc) - self.t0) / self.slope
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Config {
    /// Time between starting a conversion and reading it back.
    pub conversion_wait_ms: u32,
    pub resolution: Resolution,
    pub temperature: TemperatureModel,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            conversion_wait_ms: 3,
            resolution: Resolution::Hundredths,
            temperature: TemperatureModel::default(),
        }
    }
}

impl Config {
    pub fn with_conversion_wait_ms(mut self, ms: u32) -> Self {
        self.conversion_wait_ms = ms;
        self
    }

    pub fn with_resolution(mut self, resolution: Resolution) -> Self {
        self.resolution = resolution;
        self
    }

    pub fn with_temperature_model(mut self, temperature: TemperatureModel) -> Self {
        self.temperature = temperature;
        self
    }
}
