//! Conversion of threshold probabilities to percentiles.

use nimbus_cube::{Cube, CubeKind, LeadingAxis, ThresholdAxis};
use rayon::prelude::*;
use tracing::{debug, warn};

use crate::bounds::{BoundsManager, check_range};
use crate::config::ConversionConfig;
use crate::error::EccError;
use crate::interpolate::{Extrapolation, PercentileInterpolator};
use crate::sampling::{PercentileRequest, choose_percentiles};

/// Turns a probability cube into a percentile cube by inverting the
/// cumulative distribution at each point.
///
/// Exceedance probabilities are flipped to non-exceedance, the distribution
/// is closed with `(0, lower)` and `(1, upper)` anchors taken from the ECC
/// bounds, and the threshold values are interpolated at the requested
/// percentiles.
#[derive(Debug, Clone)]
pub struct ProbabilityToPercentileConverter {
    config: ConversionConfig,
    bounds: BoundsManager,
}

impl ProbabilityToPercentileConverter {
    /// Creates a converter after validating `config`.
    pub fn new(config: ConversionConfig) -> Result<Self, EccError> {
        config.validate()?;
        let bounds = BoundsManager::new(config.bounds().clone());
        Ok(Self { config, bounds })
    }

    /// Returns the configuration.
    pub fn config(&self) -> &ConversionConfig {
        &self.config
    }

    /// Converts `cube` to percentiles.
    ///
    /// Without a `request`, one percentile per threshold is produced.
    ///
    /// # Errors
    ///
    /// - [`EccError::UnexpectedCubeKind`] unless `cube` is a probability cube.
    /// - [`EccError::InvalidProbability`] for values outside `[0, 1]`.
    /// - [`EccError::NonMonotonicCdf`] when the probabilities do not describe
    ///   a cumulative distribution.
    /// - [`EccError::BoundsExceeded`] when the thresholds reach past the ECC
    ///   bounds and bounds warnings are disabled.
    /// - [`EccError::NonMonotonicPercentiles`] if the result decreases.
    #[tracing::instrument(skip_all, fields(name = cube.name()))]
    pub fn process(
        &self,
        cube: &Cube,
        request: Option<&PercentileRequest>,
    ) -> Result<Cube, EccError> {
        let axis = cube
            .threshold_axis()
            .ok_or_else(|| EccError::unexpected_kind(CubeKind::Probability, cube.kind()))?;

        let sampling = self.config.sampling();
        let percentiles = match request {
            Some(r) => r.resolve(sampling)?,
            None => choose_percentiles(axis.points.len(), sampling)?,
        };
        let targets: Vec<f64> = percentiles.iter().map(|p| p / 100.0).collect();

        let (lower, upper) = self.anchors(axis)?;
        let mut values = Vec::with_capacity(axis.points.len() + 2);
        values.push(lower);
        values.extend_from_slice(&axis.points);
        values.push(upper);

        debug!(
            variable = %axis.variable,
            sense = axis.sense.as_str(),
            n_thresholds = axis.points.len(),
            n_percentiles = percentiles.len(),
            lower,
            upper,
            "converting probabilities to percentiles"
        );

        // Flat steps in the CDF repeat a position, which the interpolator
        // resolves to the upper value.
        let interpolator =
            PercentileInterpolator::new(Extrapolation::Nearest).with_vertical_steps(true);
        let above = axis.sense.is_above();

        let columns = cube.columns()?;
        let out: Vec<Vec<f64>> = columns
            .par_iter()
            .enumerate()
            .map(|(point, probabilities)| {
                let cdf = cumulative(point, probabilities, above)?;
                interpolator.interpolate(&cdf, &values, &targets)
            })
            .collect::<Result<_, _>>()?;
        crate::check_ascending(&out)?;

        let leading = LeadingAxis::Percentile {
            points: percentiles,
        };
        Ok(Cube::from_columns(
            axis.variable.clone(),
            axis.units.clone(),
            leading,
            cube.dims().to_vec(),
            &out,
        )?
        .with_attributes(cube.attributes().clone()))
    }

    /// Returns the values placed at probability 0 and 1.
    fn anchors(&self, axis: &ThresholdAxis) -> Result<(f64, f64), EccError> {
        let first = axis.points[0];
        let last = axis.points[axis.points.len() - 1];
        if self.config.skip_ecc_bounds() {
            return Ok((first, last));
        }

        let bounds = self.bounds.bounds_for(&axis.variable, &axis.units)?;
        match check_range(&axis.variable, &axis.units, bounds, (first, last)) {
            Ok(()) => Ok(bounds),
            Err(exceedance) if self.config.ecc_bounds_warning() => {
                warn!(%exceedance, "using the outermost thresholds in place of the ECC bounds");
                Ok((bounds.0.min(first), bounds.1.max(last)))
            }
            Err(exceedance) => Err(exceedance.into()),
        }
    }
}

/// Builds the `[0, cdf..., 1]` positions for one point.
fn cumulative(point: usize, probabilities: &[f64], above: bool) -> Result<Vec<f64>, EccError> {
    let mut cdf = Vec::with_capacity(probabilities.len() + 2);
    cdf.push(0.0);
    for &p in probabilities {
        if !(0.0..=1.0).contains(&p) {
            return Err(EccError::InvalidProbability { point, value: p });
        }
        cdf.push(if above { 1.0 - p } else { p });
    }
    cdf.push(1.0);
    if cdf.windows(2).any(|w| w[1] < w[0]) {
        return Err(EccError::NonMonotonicCdf { point });
    }
    Ok(cdf)
}
