//! Error types for the nimbus-cube crate.

/// Error type for all fallible operations in the nimbus-cube crate.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CubeError {
    /// Returned when the data array shape does not match the coordinates.
    #[error("data shape {got:?} does not match coordinate shape {expected:?}")]
    ShapeMismatch {
        /// Shape implied by the coordinates.
        expected: Vec<usize>,
        /// Shape of the data array.
        got: Vec<usize>,
    },

    /// Returned when a coordinate has no points.
    #[error("coordinate '{name}' has no points")]
    EmptyCoord {
        /// Name of the coordinate.
        name: String,
    },

    /// Returned when coordinate points are not strictly increasing.
    #[error("coordinate '{name}' points must be strictly increasing")]
    NonMonotonicCoord {
        /// Name of the coordinate.
        name: String,
    },

    /// Returned when a coordinate point is NaN or infinite.
    #[error("coordinate '{name}' contains a non-finite point")]
    NonFiniteCoord {
        /// Name of the coordinate.
        name: String,
    },

    /// Returned when realization labels repeat.
    #[error("duplicate realization label {label}")]
    DuplicateRealization {
        /// The repeated label.
        label: i32,
    },

    /// Returned when a percentile point lies outside `[0, 100]`.
    #[error("percentile {value} is outside [0, 100]")]
    PercentileOutOfRange {
        /// The offending percentile.
        value: f64,
    },

    /// Returned when an operation needs a leading axis the cube lacks.
    #[error("cube '{name}' has no leading percentile, threshold or realization axis")]
    MissingLeadingAxis {
        /// Name of the cube.
        name: String,
    },

    /// Returned when a unit string is not in the conversion table.
    #[error("unknown unit '{unit}'")]
    UnknownUnit {
        /// The unrecognised unit string.
        unit: String,
    },

    /// Returned when two units measure different quantities.
    #[error("cannot convert from '{from}' to '{to}': incompatible dimensions")]
    IncompatibleUnits {
        /// Source unit.
        from: String,
        /// Target unit.
        to: String,
    },

    /// Returned when two cubes combined in one operation have different
    /// trailing coordinates.
    #[error("spatial coordinates do not match: {reason}")]
    SpatialMismatch {
        /// Description of the first difference found.
        reason: String,
    },
}
