//! Relabelling of percentiles as ensemble realizations.

use std::collections::BTreeSet;

use nimbus_cube::{Cube, CubeKind, LeadingAxis};
use tracing::debug;

use crate::error::EccError;

/// Allowed deviation, in percent, when checking percentile spacing.
const SPACING_TOLERANCE: f64 = 1e-6;

/// Relabels the percentile axis of a cube as a realization axis.
///
/// The data is untouched. By default the percentiles must be evenly spaced
/// and symmetric about the median, the layout produced by quantile and
/// midpoint sampling, so that every realization is equally likely.
///
/// # Example
///
/// ```
/// use nimbus_cube::{Cube, LeadingAxis};
/// use nimbus_ecc::RealizationRebadger;
///
/// let percentiles = Cube::from_columns(
///     "air_temperature",
///     "K",
///     LeadingAxis::Percentile { points: vec![25.0, 50.0, 75.0] },
///     vec![],
///     &[vec![270.0, 275.0, 280.0]],
/// )
/// .unwrap();
///
/// let realizations = RealizationRebadger::new().process(&percentiles, None).unwrap();
/// assert_eq!(realizations.realization_points(), Some(&[0, 1, 2][..]));
/// assert_eq!(realizations.data(), percentiles.data());
/// ```
#[derive(Debug, Clone, Copy)]
pub struct RealizationRebadger {
    check_spacing: bool,
}

impl RealizationRebadger {
    /// Creates a rebadger with the spacing check enabled.
    pub fn new() -> Self {
        Self {
            check_spacing: true,
        }
    }

    /// Sets whether percentile spacing is checked.
    pub fn with_spacing_check(mut self, check: bool) -> Self {
        self.check_spacing = check;
        self
    }

    /// Returns whether percentile spacing is checked.
    pub fn check_spacing(&self) -> bool {
        self.check_spacing
    }

    /// Rebadges `cube` as realizations labelled `0..M`, or with `labels`.
    ///
    /// # Errors
    ///
    /// - [`EccError::UnexpectedCubeKind`] unless `cube` is a percentile cube.
    /// - [`EccError::UnevenPercentiles`] when the spacing check fails.
    /// - [`EccError::InvalidRealizationLabels`] when `labels` has the wrong
    ///   length or repeats a label.
    #[tracing::instrument(skip_all, fields(name = cube.name()))]
    pub fn process(&self, cube: &Cube, labels: Option<&[i32]>) -> Result<Cube, EccError> {
        let percentiles = cube
            .percentile_points()
            .ok_or_else(|| EccError::unexpected_kind(CubeKind::Percentile, cube.kind()))?;
        if self.check_spacing {
            check_even_spacing(percentiles)?;
        }

        let m = percentiles.len();
        let points = match labels {
            Some(labels) => {
                if labels.len() != m {
                    return Err(EccError::InvalidRealizationLabels {
                        reason: format!("{} labels for {m} percentiles", labels.len()),
                    });
                }
                let unique: BTreeSet<i32> = labels.iter().copied().collect();
                if unique.len() != m {
                    return Err(EccError::InvalidRealizationLabels {
                        reason: "labels must be unique".to_string(),
                    });
                }
                labels.to_vec()
            }
            None => (0..m)
                .map(|k| {
                    i32::try_from(k).map_err(|_| EccError::InvalidRealizationLabels {
                        reason: format!("{m} realizations do not fit the label type"),
                    })
                })
                .collect::<Result<_, _>>()?,
        };
        debug!(n_realizations = m, "rebadging percentiles as realizations");

        Ok(Cube::new(
            cube.name(),
            cube.units(),
            Some(LeadingAxis::Realization { points }),
            cube.dims().to_vec(),
            cube.data().clone(),
        )?
        .with_attributes(cube.attributes().clone()))
    }
}

impl Default for RealizationRebadger {
    fn default() -> Self {
        Self::new()
    }
}

/// Checks the percentiles are evenly spaced and centred on 50.
fn check_even_spacing(percentiles: &[f64]) -> Result<(), EccError> {
    let first = percentiles[0];
    let last = percentiles[percentiles.len() - 1];
    if (first + last - 100.0).abs() > SPACING_TOLERANCE {
        return Err(EccError::UnevenPercentiles {
            reason: format!("percentiles {first} to {last} are not centred on 50"),
        });
    }
    if let [a, b, ..] = percentiles {
        let step = b - a;
        if percentiles
            .windows(2)
            .any(|w| ((w[1] - w[0]) - step).abs() > SPACING_TOLERANCE)
        {
            return Err(EccError::UnevenPercentiles {
                reason: format!("percentile spacing differs from {step}"),
            });
        }
    }
    Ok(())
}
