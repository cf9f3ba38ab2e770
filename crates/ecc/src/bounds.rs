//! Physical value ranges ("ECC bounds") used to anchor distribution tails.
//!
//! When a percentile distribution is extended to the 0th and 100th
//! percentiles, the end points come from the plausible physical range of the
//! variable. The ranges live in a [`BoundsTable`] that callers pass in
//! explicitly; [`BoundsTable::standard`] provides the shared defaults.

use std::collections::BTreeMap;
use std::sync::OnceLock;

use nimbus_cube::units;

use crate::error::{BoundsExceedance, EccError};

/// Lower and upper plausible values of a variable.
#[derive(Debug, Clone, PartialEq)]
pub struct Bounds {
    /// Smallest plausible value.
    pub lower: f64,
    /// Largest plausible value.
    pub upper: f64,
    /// Units of `lower` and `upper`.
    pub units: String,
}

impl Bounds {
    /// Creates a bounds entry.
    pub fn new(lower: f64, upper: f64, units: impl Into<String>) -> Self {
        Self {
            lower,
            upper,
            units: units.into(),
        }
    }
}

const TEMPERATURE_BOUNDS: (f64, f64) = (173.15, 333.15);
const PRECIPITATION_RATE_MAX: f64 = 0.0032;
const PRECIPITATION_AMOUNT_MAX: f64 = 0.5;
const CLOUD_FRACTIONS: &[&str] = &[
    "cloud_area_fraction",
    "low_type_cloud_area_fraction",
    "medium_type_cloud_area_fraction",
    "high_type_cloud_area_fraction",
];

fn standard_entries() -> BTreeMap<String, Bounds> {
    let mut entries = BTreeMap::new();
    let mut add = |name: &str, lower: f64, upper: f64, units: &str| {
        entries.insert(name.to_string(), Bounds::new(lower, upper, units));
    };

    for name in [
        "air_temperature",
        "dew_point_temperature",
        "wet_bulb_temperature",
        "feels_like_temperature",
    ] {
        add(name, TEMPERATURE_BOUNDS.0, TEMPERATURE_BOUNDS.1, "K");
    }
    add("wind_speed", 0.0, 50.0, "m s-1");
    add("wind_speed_of_gust", 0.0, 200.0, "m s-1");
    for name in CLOUD_FRACTIONS {
        add(name, 0.0, 1.0, "1");
    }
    add("relative_humidity", 0.0, 1.2, "1");
    for name in [
        "lwe_precipitation_rate",
        "lwe_sleetfall_rate",
        "lwe_snowfall_rate",
        "rainfall_rate",
    ] {
        add(name, 0.0, PRECIPITATION_RATE_MAX, "m s-1");
    }
    for name in [
        "lwe_thickness_of_precipitation_amount",
        "thickness_of_rainfall_amount",
    ] {
        add(name, 0.0, PRECIPITATION_AMOUNT_MAX, "m");
    }
    add("visibility_in_air", 0.0, 100_000.0, "m");
    add("air_pressure_at_sea_level", 80_000.0, 110_000.0, "Pa");
    add(
        "cloud_base_altitude_assuming_only_consider_cloud_area_fraction_greater_than_4p5_oktas",
        -400.0,
        20_000.0,
        "m",
    );
    add("ultraviolet_index", 0.0, 25.0, "1");
    entries
}

static STANDARD: OnceLock<BoundsTable> = OnceLock::new();

/// Mapping from variable name to its [`Bounds`].
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BoundsTable {
    entries: BTreeMap<String, Bounds>,
}

impl BoundsTable {
    /// Creates a table with no entries.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Returns a copy of the standard table, built once per process.
    pub fn standard() -> Self {
        STANDARD
            .get_or_init(|| Self {
                entries: standard_entries(),
            })
            .clone()
    }

    /// Adds or replaces the bounds of `variable`.
    pub fn with_bounds(mut self, variable: impl Into<String>, bounds: Bounds) -> Self {
        self.entries.insert(variable.into(), bounds);
        self
    }

    /// Returns the bounds of `variable`, if present.
    pub fn get(&self, variable: &str) -> Option<&Bounds> {
        self.entries.get(variable)
    }

    /// Returns the number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the table has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over `(variable, bounds)` in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Bounds)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Checks every entry is finite with `lower < upper`.
    pub fn validate(&self) -> Result<(), EccError> {
        for (variable, b) in self.iter() {
            if !b.lower.is_finite() || !b.upper.is_finite() {
                return Err(EccError::InvalidBounds {
                    variable: variable.to_string(),
                    reason: "bounds must be finite".to_string(),
                });
            }
            if b.lower >= b.upper {
                return Err(EccError::InvalidBounds {
                    variable: variable.to_string(),
                    reason: format!("lower {} must be below upper {}", b.lower, b.upper),
                });
            }
        }
        Ok(())
    }
}

/// Looks up ECC bounds and converts them to the units a cube works in.
#[derive(Debug, Clone)]
pub struct BoundsManager {
    table: BoundsTable,
}

impl BoundsManager {
    /// Creates a manager over `table`.
    pub fn new(table: BoundsTable) -> Self {
        Self { table }
    }

    /// Returns the table this manager reads.
    pub fn table(&self) -> &BoundsTable {
        &self.table
    }

    /// Returns `(lower, upper)` for `variable`, expressed in `units`.
    ///
    /// # Errors
    ///
    /// Returns [`EccError::UnknownBoundsKey`] when the variable is not in the
    /// table, or a unit conversion error when the table units cannot be
    /// converted into `units`.
    pub fn bounds_for(&self, variable: &str, units: &str) -> Result<(f64, f64), EccError> {
        let bounds = self
            .table
            .get(variable)
            .ok_or_else(|| EccError::UnknownBoundsKey {
                variable: variable.to_string(),
            })?;
        let lower = units::convert(bounds.lower, &bounds.units, units)?;
        let upper = units::convert(bounds.upper, &bounds.units, units)?;
        Ok((lower, upper))
    }
}

impl Default for BoundsManager {
    fn default() -> Self {
        Self::new(BoundsTable::standard())
    }
}

/// Checks that `[data_min, data_max]` lies inside `[lower, upper]`.
pub(crate) fn check_range(
    variable: &str,
    units: &str,
    (lower, upper): (f64, f64),
    (data_min, data_max): (f64, f64),
) -> Result<(), BoundsExceedance> {
    if data_min < lower || data_max > upper {
        return Err(BoundsExceedance {
            variable: variable.to_string(),
            units: units.to_string(),
            lower,
            upper,
            data_min,
            data_max,
        });
    }
    Ok(())
}
