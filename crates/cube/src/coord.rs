//! Coordinate types: the leading probabilistic axis and trailing dimensions.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::CubeError;

/// Units of a percentile axis.
pub const PERCENTILE_UNITS: &str = "%";

/// Units of a realization axis.
pub const REALIZATION_UNITS: &str = "1";

/// The three probabilistic representations a forecast cube can take.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CubeKind {
    /// Probability of exceedance (or non-exceedance) at a set of thresholds.
    Probability,
    /// Values at a set of percentiles.
    Percentile,
    /// Discrete ensemble members.
    Realization,
}

impl fmt::Display for CubeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CubeKind::Probability => "probability",
            CubeKind::Percentile => "percentile",
            CubeKind::Realization => "realization",
        };
        f.write_str(s)
    }
}

/// Which side of a threshold a probability refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThresholdSense {
    /// P(value > threshold).
    GreaterThan,
    /// P(value >= threshold).
    GreaterThanOrEqualTo,
    /// P(value < threshold).
    LessThan,
    /// P(value <= threshold).
    LessThanOrEqualTo,
}

impl ThresholdSense {
    /// Returns `true` for exceedance probabilities.
    pub fn is_above(self) -> bool {
        matches!(
            self,
            ThresholdSense::GreaterThan | ThresholdSense::GreaterThanOrEqualTo
        )
    }

    /// Returns the attribute spelling of this sense.
    pub fn as_str(self) -> &'static str {
        match self {
            ThresholdSense::GreaterThan => "greater_than",
            ThresholdSense::GreaterThanOrEqualTo => "greater_than_or_equal_to",
            ThresholdSense::LessThan => "less_than",
            ThresholdSense::LessThanOrEqualTo => "less_than_or_equal_to",
        }
    }
}

/// The threshold axis of a probability cube.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThresholdAxis {
    /// Name of the thresholded variable, e.g. `air_temperature`.
    pub variable: String,
    /// Units of the threshold points.
    pub units: String,
    /// Threshold values, strictly increasing.
    pub points: Vec<f64>,
    /// Relation between the probability and the threshold.
    pub sense: ThresholdSense,
}

impl ThresholdAxis {
    /// Creates a threshold axis.
    pub fn new(
        variable: impl Into<String>,
        units: impl Into<String>,
        points: Vec<f64>,
        sense: ThresholdSense,
    ) -> Self {
        Self {
            variable: variable.into(),
            units: units.into(),
            points,
            sense,
        }
    }
}

/// The leading (axis 0) coordinate of a cube.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LeadingAxis {
    /// Integer ensemble member labels.
    Realization {
        /// Unique labels.
        points: Vec<i32>,
    },
    /// Percentiles in `[0, 100]`.
    Percentile {
        /// Strictly increasing percentile points.
        points: Vec<f64>,
    },
    /// Probability thresholds.
    Threshold(ThresholdAxis),
}

impl LeadingAxis {
    /// Returns the number of points on the axis.
    pub fn len(&self) -> usize {
        match self {
            LeadingAxis::Realization { points } => points.len(),
            LeadingAxis::Percentile { points } => points.len(),
            LeadingAxis::Threshold(t) => t.points.len(),
        }
    }

    /// Returns `true` if the axis has no points.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the kind of cube this axis makes.
    pub fn kind(&self) -> CubeKind {
        match self {
            LeadingAxis::Realization { .. } => CubeKind::Realization,
            LeadingAxis::Percentile { .. } => CubeKind::Percentile,
            LeadingAxis::Threshold(_) => CubeKind::Probability,
        }
    }

    /// Returns the coordinate name.
    pub fn name(&self) -> &str {
        match self {
            LeadingAxis::Realization { .. } => "realization",
            LeadingAxis::Percentile { .. } => "percentile",
            LeadingAxis::Threshold(t) => &t.variable,
        }
    }

    /// Returns the coordinate units.
    pub fn units(&self) -> &str {
        match self {
            LeadingAxis::Realization { .. } => REALIZATION_UNITS,
            LeadingAxis::Percentile { .. } => PERCENTILE_UNITS,
            LeadingAxis::Threshold(t) => &t.units,
        }
    }

    pub(crate) fn validate(&self) -> Result<(), CubeError> {
        let name = self.name().to_string();
        if self.is_empty() {
            return Err(CubeError::EmptyCoord { name });
        }
        match self {
            LeadingAxis::Realization { points } => {
                let mut seen = BTreeSet::new();
                for &label in points {
                    if !seen.insert(label) {
                        return Err(CubeError::DuplicateRealization { label });
                    }
                }
                Ok(())
            }
            LeadingAxis::Percentile { points } => {
                check_strictly_increasing(&name, points)?;
                if let Some(&value) = points.iter().find(|p| !(0.0..=100.0).contains(*p)) {
                    return Err(CubeError::PercentileOutOfRange { value });
                }
                Ok(())
            }
            LeadingAxis::Threshold(t) => check_strictly_increasing(&name, &t.points),
        }
    }
}

/// A trailing (spatial or temporal) dimension coordinate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DimCoord {
    /// Coordinate name, e.g. `latitude`.
    pub name: String,
    /// Coordinate units.
    pub units: String,
    /// Coordinate points.
    pub points: Vec<f64>,
}

impl DimCoord {
    /// Creates a dimension coordinate.
    pub fn new(name: impl Into<String>, units: impl Into<String>, points: Vec<f64>) -> Self {
        Self {
            name: name.into(),
            units: units.into(),
            points,
        }
    }

    /// Returns the number of points.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Returns `true` if the coordinate has no points.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

fn check_strictly_increasing(name: &str, points: &[f64]) -> Result<(), CubeError> {
    if points.iter().any(|p| !p.is_finite()) {
        return Err(CubeError::NonFiniteCoord {
            name: name.to_string(),
        });
    }
    if points.windows(2).any(|w| w[1] <= w[0]) {
        return Err(CubeError::NonMonotonicCoord {
            name: name.to_string(),
        });
    }
    Ok(())
}
