//! Resampling of percentile cubes onto a new percentile set.

use nimbus_cube::{Cube, CubeKind, LeadingAxis};
use rayon::prelude::*;
use tracing::{debug, warn};

use crate::bounds::{BoundsManager, check_range};
use crate::config::ConversionConfig;
use crate::error::EccError;
use crate::interpolate::{Extrapolation, PercentileInterpolator};
use crate::sampling::{PercentileRequest, choose_percentiles};

/// Interpolates a percentile cube onto a different set of percentiles.
///
/// The input distribution is extended to the 0th and 100th percentiles with
/// the ECC bounds of the cube's variable, so any target in `[0, 100]` lies
/// inside the sampled range.
#[derive(Debug, Clone)]
pub struct PercentileResampler {
    config: ConversionConfig,
    bounds: BoundsManager,
}

impl PercentileResampler {
    /// Creates a resampler after validating `config`.
    pub fn new(config: ConversionConfig) -> Result<Self, EccError> {
        config.validate()?;
        let bounds = BoundsManager::new(config.bounds().clone());
        Ok(Self { config, bounds })
    }

    /// Returns the configuration.
    pub fn config(&self) -> &ConversionConfig {
        &self.config
    }

    /// Resamples `cube` to the requested percentiles.
    ///
    /// Without a `request`, the input percentile count is kept and the
    /// points are re-chosen with the configured sampling.
    ///
    /// # Errors
    ///
    /// - [`EccError::UnexpectedCubeKind`] unless `cube` is a percentile cube.
    /// - [`EccError::BoundsExceeded`] when data lies outside the ECC bounds
    ///   and bounds warnings are disabled.
    /// - [`EccError::NonMonotonicPercentiles`] if the result decreases.
    #[tracing::instrument(skip_all, fields(name = cube.name()))]
    pub fn process(
        &self,
        cube: &Cube,
        request: Option<&PercentileRequest>,
    ) -> Result<Cube, EccError> {
        let original = cube
            .percentile_points()
            .ok_or_else(|| EccError::unexpected_kind(CubeKind::Percentile, cube.kind()))?;

        let sampling = self.config.sampling();
        let targets = match request {
            Some(r) => r.resolve(sampling)?,
            None => choose_percentiles(original.len(), sampling)?,
        };

        let (positions, anchors, extrapolation) = if self.config.skip_ecc_bounds() {
            (original.to_vec(), None, Extrapolation::Nearest)
        } else {
            let anchors = self.anchors(cube)?;
            let mut positions = Vec::with_capacity(original.len() + 2);
            let prepend = original[0] > 0.0;
            let append = original[original.len() - 1] < 100.0;
            if prepend {
                positions.push(0.0);
            }
            positions.extend_from_slice(original);
            if append {
                positions.push(100.0);
            }
            (positions, Some((anchors, prepend, append)), Extrapolation::Linear)
        };

        debug!(
            n_input = original.len(),
            n_output = targets.len(),
            bounded = anchors.is_some(),
            "resampling percentiles"
        );

        let interpolator = PercentileInterpolator::new(extrapolation);
        let columns = cube.columns()?;
        let out: Vec<Vec<f64>> = columns
            .par_iter()
            .map(|column| {
                let values: Vec<f64> = match anchors {
                    Some((tails, prepend, append)) => {
                        let (lower, upper) = tails.for_column(column);
                        prepend
                            .then_some(lower)
                            .into_iter()
                            .chain(column.iter().copied())
                            .chain(append.then_some(upper))
                            .collect()
                    }
                    None => column.clone(),
                };
                interpolator.interpolate(&positions, &values, &targets)
            })
            .collect::<Result<_, _>>()?;
        crate::check_ascending(&out)?;

        Ok(Cube::from_columns(
            cube.name(),
            cube.units(),
            LeadingAxis::Percentile { points: targets },
            cube.dims().to_vec(),
            &out,
        )?
        .with_attributes(cube.attributes().clone()))
    }

    /// Looks up the ECC bounds and applies the exceedance policy to the
    /// whole cube.
    fn anchors(&self, cube: &Cube) -> Result<Anchors, EccError> {
        let bounds = self.bounds.bounds_for(cube.name(), cube.units())?;
        let Some(range) = crate::finite_range(cube.data().iter()) else {
            return Ok(Anchors { bounds, widen: false });
        };
        match check_range(cube.name(), cube.units(), bounds, range) {
            Ok(()) => Ok(Anchors { bounds, widen: false }),
            Err(exceedance) if self.config.ecc_bounds_warning() => {
                warn!(%exceedance, "widening the ECC bounds to the data range of each point");
                Ok(Anchors { bounds, widen: true })
            }
            Err(exceedance) => Err(exceedance.into()),
        }
    }
}

/// Values placed at the 0th and 100th percentiles.
#[derive(Debug, Clone, Copy)]
struct Anchors {
    bounds: (f64, f64),
    /// Widen to each point's own data range when it leaves the bounds.
    widen: bool,
}

impl Anchors {
    fn for_column(self, column: &[f64]) -> (f64, f64) {
        let (lower, upper) = self.bounds;
        match crate::finite_range(column) {
            Some((lo, hi)) if self.widen => (lower.min(lo), upper.max(hi)),
            _ => self.bounds,
        }
    }
}
