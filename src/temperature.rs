//! Temperature value type and the vendor's hundredths-of-a-degree wire encoding.

use core::fmt;

const KELVIN_OFFSET: f64 = 273.15;
const WIRE_SCALE: f64 = 100.0;

/// A temperature stored as degrees Celsius. Equality and ordering compare the Celsius value.
#[derive(Debug, Copy, Clone, PartialEq, PartialOrd)]
pub struct Temperature {
    celsius: f64,
}

impl Temperature {
    pub fn of_celsius(celsius: f64) -> Self {
        Temperature { celsius }
    }

    pub fn of_fahrenheit(fahrenheit: f64) -> Self {
        Temperature {
            celsius: (fahrenheit - 32.0) * 5.0 / 9.0,
        }
    }

    pub fn of_kelvin(kelvin: f64) -> Self {
        Temperature {
            celsius: kelvin - KELVIN_OFFSET,
        }
    }

    /// Decode a wire value in hundredths of a degree Celsius.
    pub fn from_wire(hundredths: i64) -> Self {
        Temperature {
            celsius: hundredths as f64 / WIRE_SCALE,
        }
    }

    /// Encode as hundredths of a degree Celsius, rounded to the nearest integer.
    /// `None` for NaN, infinities and values outside the `i64` range.
    pub fn to_wire(self) -> Option<i64> {
        let scaled = (self.celsius * WIRE_SCALE).round();
        (scaled.is_finite() && scaled.abs() < i64::MAX as f64).then_some(scaled as i64)
    }

    pub fn is_finite(self) -> bool {
        self.celsius.is_finite()
    }

    pub fn celsius(self) -> f64 {
        self.celsius
    }

    pub fn fahrenheit(self) -> f64 {
        self.celsius * 9.0 / 5.0 + 32.0
    }

    pub fn kelvin(self) -> f64 {
        self.celsius + KELVIN_OFFSET
    }
}

impl fmt::Display for Temperature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2} °C", self.celsius)
    }
}
