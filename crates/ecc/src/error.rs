//! Error types for the nimbus-ecc crate.

use nimbus_cube::{CubeError, CubeKind};

/// Broad classification of an [`EccError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The caller asked for something the configuration cannot satisfy.
    Configuration,
    /// The input data or its metadata violate an invariant.
    Validation,
}

/// Forecast data that falls outside the configured ECC bounds.
///
/// Returned by the bounds checks as a condition rather than a hard failure;
/// the converters decide from their policy whether it becomes a logged
/// warning or an [`EccError::BoundsExceeded`].
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error(
    "forecast values for '{variable}' span [{data_min}, {data_max}] {units}, \
     outside the ECC bounds [{lower}, {upper}] {units}"
)]
pub struct BoundsExceedance {
    /// Variable whose bounds were exceeded.
    pub variable: String,
    /// Units of every value in this condition.
    pub units: String,
    /// Lower ECC bound.
    pub lower: f64,
    /// Upper ECC bound.
    pub upper: f64,
    /// Smallest forecast value.
    pub data_min: f64,
    /// Largest forecast value.
    pub data_max: f64,
}

/// Error type for all fallible operations in the nimbus-ecc crate.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EccError {
    /// Returned when the bounds table has no entry for a variable.
    #[error("no ECC bounds are defined for '{variable}'")]
    UnknownBoundsKey {
        /// The variable that was looked up.
        variable: String,
    },

    /// Returned when a bounds table entry is unusable.
    #[error("invalid ECC bounds for '{variable}': {reason}")]
    InvalidBounds {
        /// The variable with bad bounds.
        variable: String,
        /// Description of the problem.
        reason: String,
    },

    /// Returned when neither a realization count nor a raw ensemble is given.
    #[error("either realizations_count or raw_cube must be provided")]
    MissingRealizationsCount,

    /// Returned when a tie-break name is not recognised.
    #[error("tie_break must be either 'random' or 'realization', got '{value}'")]
    InvalidTieBreak {
        /// The unrecognised name.
        value: String,
    },

    /// Returned when a percentile sampling name is not recognised.
    #[error("sampling must be one of 'quantile', 'midpoint' or 'random', got '{value}'")]
    InvalidSampling {
        /// The unrecognised name.
        value: String,
    },

    /// Returned when both a percentile count and explicit percentiles are given.
    #[error("specify either a number of percentiles or explicit percentiles, not both")]
    ConflictingPercentileRequest,

    /// Returned when a percentile or realization count is zero.
    #[error("percentile count must be >= 1, got {count}")]
    InvalidPercentileCount {
        /// The invalid count.
        count: usize,
    },

    /// Returned when a requested percentile set is malformed.
    #[error("invalid percentiles: {reason}")]
    InvalidPercentiles {
        /// Description of the problem.
        reason: String,
    },

    /// Returned when caller-supplied realization labels do not fit the cube.
    #[error("invalid realization labels: {reason}")]
    InvalidRealizationLabels {
        /// Description of the problem.
        reason: String,
    },

    /// Returned when interpolation is given no samples.
    #[error("at least one sample is required for interpolation")]
    EmptySamples,

    /// Returned when sample positions and values differ in length.
    #[error("sample length mismatch: {positions} positions, {values} values")]
    SampleLengthMismatch {
        /// Number of sample positions.
        positions: usize,
        /// Number of sample values.
        values: usize,
    },

    /// Returned when sample positions are not ordered.
    #[error("interpolation samples are not monotonic: {reason}")]
    NonMonotonicSamples {
        /// Description of the problem.
        reason: String,
    },

    /// Returned when a probability lies outside `[0, 1]` or is not finite.
    #[error("probability {value} at point {point} is outside [0, 1]")]
    InvalidProbability {
        /// Flattened trailing point index.
        point: usize,
        /// The offending probability.
        value: f64,
    },

    /// Returned when the cumulative distribution built from the
    /// probabilities decreases.
    #[error(
        "the probabilities at point {point} do not form an ascending cumulative \
         distribution function"
    )]
    NonMonotonicCdf {
        /// Flattened trailing point index.
        point: usize,
    },

    /// Returned when percentile values decrease along the percentile axis.
    #[error("values at point {point} decrease along the percentile axis")]
    NonMonotonicPercentiles {
        /// Flattened trailing point index.
        point: usize,
    },

    /// Returned when forecast data exceeds the ECC bounds and the policy is
    /// to fail.
    #[error(transparent)]
    BoundsExceeded(#[from] BoundsExceedance),

    /// Returned when an operation receives the wrong kind of cube.
    #[error("expected a {expected} cube, found {found}")]
    UnexpectedCubeKind {
        /// The kind the operation accepts.
        expected: CubeKind,
        /// The kind that was supplied (`none` without a leading axis).
        found: String,
    },

    /// Returned when a cube cannot be turned into realizations.
    #[error(
        "unable to convert '{name}' to realizations: it has no percentile axis \
         and is not a probability cube"
    )]
    NotConvertible {
        /// Name of the cube.
        name: String,
    },

    /// Returned when the percentile count differs from the raw member count.
    #[error(
        "{percentiles} percentiles cannot be reordered against {realizations} raw realizations"
    )]
    RealizationCountMismatch {
        /// Number of percentiles.
        percentiles: usize,
        /// Number of raw realizations.
        realizations: usize,
    },

    /// Returned when percentiles cannot be rebadged as realizations.
    #[error("percentiles cannot be rebadged as realizations: {reason}")]
    UnevenPercentiles {
        /// Description of the problem.
        reason: String,
    },

    /// Wraps a cube construction or metadata failure.
    #[error(transparent)]
    Cube(#[from] CubeError),
}

impl EccError {
    /// Returns whether this error stems from configuration or from data.
    pub fn kind(&self) -> ErrorKind {
        match self {
            EccError::UnknownBoundsKey { .. }
            | EccError::InvalidBounds { .. }
            | EccError::MissingRealizationsCount
            | EccError::InvalidTieBreak { .. }
            | EccError::InvalidSampling { .. }
            | EccError::ConflictingPercentileRequest
            | EccError::InvalidPercentileCount { .. }
            | EccError::InvalidPercentiles { .. }
            | EccError::InvalidRealizationLabels { .. } => ErrorKind::Configuration,
            EccError::Cube(CubeError::UnknownUnit { .. } | CubeError::IncompatibleUnits { .. }) => {
                ErrorKind::Configuration
            }
            _ => ErrorKind::Validation,
        }
    }

    pub(crate) fn unexpected_kind(expected: CubeKind, found: Option<CubeKind>) -> Self {
        EccError::UnexpectedCubeKind {
            expected,
            found: found.map_or_else(|| "none".to_string(), |k| k.to_string()),
        }
    }
}
