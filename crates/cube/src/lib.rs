//! Labelled forecast arrays for ensemble post-processing.
//!
//! A [`Cube`] pairs an `ndarray` data array with a leading probabilistic
//! axis and any number of trailing spatial or temporal coordinates. The
//! leading axis decides the cube's [`CubeKind`]:
//!
//! | Leading axis | Kind | Values along the axis |
//! |--------------|------|-----------------------|
//! | `Threshold` | Probability | P(value ⋚ threshold) in `[0, 1]` |
//! | `Percentile` | Percentile | value at each percentile |
//! | `Realization` | Realization | one value per ensemble member |
//!
//! Per-point work is expressed through [`Cube::columns`] and
//! [`Cube::from_columns`], which move between the array and one vector per
//! trailing point.

mod coord;
mod cube;
mod error;
pub mod units;

pub use coord::{
    CubeKind, DimCoord, LeadingAxis, PERCENTILE_UNITS, REALIZATION_UNITS, ThresholdAxis,
    ThresholdSense,
};
pub use cube::Cube;
pub use error::CubeError;
