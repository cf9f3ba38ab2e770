//! Ensemble Copula Coupling (ECC) conversions between probabilistic forecast
//! representations.
//!
//! Every step borrows its input [`Cube`](nimbus_cube::Cube) and returns a new
//! one:
//!
//! | Step | Input | Output |
//! |------|-------|--------|
//! | [`ProbabilityToPercentileConverter`] | probability | percentile |
//! | [`PercentileResampler`] | percentile | percentile |
//! | [`RealizationRebadger`] | percentile | realization |
//! | [`EnsembleReorderer`] | percentile + raw realizations | realization |
//! | [`RealizationsOrchestrator`] | any kind (+ raw realizations) | realization |
//!
//! # Pipeline
//!
//! ```text
//! RealizationsOrchestrator::process()
//!   ├─ realization cube          -> returned unchanged
//!   ├─ probability cube          -> ProbabilityToPercentileConverter (probabilities.rs)
//!   ├─ percentile cube           -> PercentileResampler              (resample.rs)
//!   └─ percentile cube
//!        ├─ with raw ensemble    -> EnsembleReorderer                (reorder.rs)
//!        └─ without              -> RealizationRebadger              (rebadge.rs)
//! ```
//!
//! Distribution tails are anchored on physical plausibility ranges held in a
//! [`BoundsTable`]; data outside those ranges is reported as a
//! [`BoundsExceedance`] that the caller's policy turns into a warning or an
//! error.
//!
//! # Quick start
//!
//! ```
//! use ndarray::{ArrayD, IxDyn};
//! use nimbus_cube::{Cube, LeadingAxis, ThresholdAxis, ThresholdSense};
//! use nimbus_ecc::{RealizationsConfig, RealizationsOrchestrator};
//!
//! let probabilities = Cube::new(
//!     "probability_of_air_temperature_above_threshold",
//!     "1",
//!     Some(LeadingAxis::Threshold(ThresholdAxis::new(
//!         "air_temperature",
//!         "K",
//!         vec![275.0, 275.5, 276.0, 276.5],
//!         ThresholdSense::GreaterThan,
//!     ))),
//!     vec![],
//!     ArrayD::from_shape_vec(IxDyn(&[4]), vec![1.0, 0.8, 0.6, 0.2]).unwrap(),
//! )
//! .unwrap();
//!
//! let config = RealizationsConfig::new().with_realizations_count(Some(3));
//! let orchestrator = RealizationsOrchestrator::new(config).unwrap();
//! let realizations = orchestrator.process(&probabilities, None).unwrap();
//! assert_eq!(realizations.realization_points(), Some(&[0, 1, 2][..]));
//! ```

mod bounds;
mod config;
mod error;
mod interpolate;
mod probabilities;
mod realizations;
mod rebadge;
mod reorder;
mod resample;
mod sampling;

pub use bounds::{Bounds, BoundsManager, BoundsTable};
pub use config::{ConversionConfig, RealizationsConfig, ReorderConfig, TieBreak};
pub use error::{BoundsExceedance, EccError, ErrorKind};
pub use interpolate::{Extrapolation, PercentileInterpolator};
pub use probabilities::ProbabilityToPercentileConverter;
pub use realizations::RealizationsOrchestrator;
pub use rebadge::RealizationRebadger;
pub use reorder::EnsembleReorderer;
pub use resample::PercentileResampler;
pub use sampling::{PercentileRequest, PercentileSampling, choose_percentiles, validate_percentiles};

use rand::SeedableRng;
use rand::rngs::StdRng;

/// Builds a seeded or OS-sourced RNG.
fn make_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_os_rng(),
    }
}

/// Returns the smallest and largest finite value, or `None` when there are
/// none.
fn finite_range<'a>(values: impl IntoIterator<Item = &'a f64>) -> Option<(f64, f64)> {
    values
        .into_iter()
        .copied()
        .filter(|v| v.is_finite())
        .fold(None, |acc, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
}

/// Fails on the first point whose values decrease along the leading axis.
fn check_ascending(columns: &[Vec<f64>]) -> Result<(), EccError> {
    match interpolate::first_decreasing(columns) {
        Some(point) => Err(EccError::NonMonotonicPercentiles { point }),
        None => Ok(()),
    }
}
