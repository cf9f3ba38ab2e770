//! Affine unit conversion for the units that appear on forecast cubes.
//!
//! Every supported unit maps onto an SI reference unit of one
//! [`Dimension`] through `si = value * scale + offset`. Unit strings are
//! compared after whitespace normalisation, so `"m s-1"` and `"m  s-1"`
//! are the same unit.

use crate::error::CubeError;

/// Physical quantity measured by a unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dimension {
    /// Temperature (K).
    Temperature,
    /// Speed or rate of accumulation (m s-1).
    Speed,
    /// Length (m).
    Length,
    /// Pressure (Pa).
    Pressure,
    /// Dimensionless ratio (1).
    Dimensionless,
}

/// A parsed unit with its affine mapping onto the SI reference unit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Unit {
    dimension: Dimension,
    scale: f64,
    offset: f64,
}

const FAHRENHEIT_SCALE: f64 = 5.0 / 9.0;

impl Unit {
    /// Parses a unit string.
    ///
    /// # Errors
    ///
    /// Returns [`CubeError::UnknownUnit`] for strings outside the table.
    pub fn parse(unit: &str) -> Result<Self, CubeError> {
        let normalised = normalise(unit);
        let (dimension, scale, offset) = match normalised.as_str() {
            "K" | "kelvin" | "Kelvin" => (Dimension::Temperature, 1.0, 0.0),
            "degC" | "celsius" | "Celsius" | "deg_c" => (Dimension::Temperature, 1.0, 273.15),
            "degF" | "fahrenheit" | "Fahrenheit" => (
                Dimension::Temperature,
                FAHRENHEIT_SCALE,
                273.15 - 32.0 * FAHRENHEIT_SCALE,
            ),
            "m s-1" | "m/s" | "m s^-1" => (Dimension::Speed, 1.0, 0.0),
            "km h-1" | "km/h" => (Dimension::Speed, 1.0 / 3.6, 0.0),
            "knots" | "kt" => (Dimension::Speed, 1852.0 / 3600.0, 0.0),
            "mph" => (Dimension::Speed, 0.44704, 0.0),
            "mm h-1" | "mm/h" | "mm hr-1" => (Dimension::Speed, 1.0e-3 / 3600.0, 0.0),
            "mm s-1" | "mm/s" => (Dimension::Speed, 1.0e-3, 0.0),
            "m" | "metres" | "meters" => (Dimension::Length, 1.0, 0.0),
            "mm" => (Dimension::Length, 1.0e-3, 0.0),
            "cm" => (Dimension::Length, 1.0e-2, 0.0),
            "km" => (Dimension::Length, 1.0e3, 0.0),
            "ft" | "feet" => (Dimension::Length, 0.3048, 0.0),
            "Pa" => (Dimension::Pressure, 1.0, 0.0),
            "hPa" | "mbar" => (Dimension::Pressure, 100.0, 0.0),
            "kPa" => (Dimension::Pressure, 1000.0, 0.0),
            "1" | "" => (Dimension::Dimensionless, 1.0, 0.0),
            "%" => (Dimension::Dimensionless, 0.01, 0.0),
            _ => {
                return Err(CubeError::UnknownUnit {
                    unit: unit.to_string(),
                });
            }
        };
        Ok(Self {
            dimension,
            scale,
            offset,
        })
    }

    /// Returns the measured dimension.
    pub fn dimension(&self) -> Dimension {
        self.dimension
    }

    fn to_si(self, value: f64) -> f64 {
        value * self.scale + self.offset
    }

    fn from_si(self, value: f64) -> f64 {
        (value - self.offset) / self.scale
    }
}

fn normalise(unit: &str) -> String {
    unit.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Converts `value` from unit `from` to unit `to`.
///
/// Identical unit strings short-circuit, so units outside the table still
/// convert to themselves.
///
/// # Errors
///
/// Returns [`CubeError::UnknownUnit`] or [`CubeError::IncompatibleUnits`].
pub fn convert(value: f64, from: &str, to: &str) -> Result<f64, CubeError> {
    if normalise(from) == normalise(to) {
        return Ok(value);
    }
    let src = Unit::parse(from)?;
    let dst = Unit::parse(to)?;
    if src.dimension != dst.dimension {
        return Err(CubeError::IncompatibleUnits {
            from: from.to_string(),
            to: to.to_string(),
        });
    }
    Ok(dst.from_si(src.to_si(value)))
}
