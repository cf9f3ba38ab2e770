//! Piecewise-linear interpolation between ordered samples.

use crate::error::EccError;

/// Behaviour for targets outside the sample range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Extrapolation {
    /// Continue the line through the two nearest samples.
    #[default]
    Linear,
    /// Repeat the nearest end sample.
    Nearest,
}

/// Monotonic piecewise-linear interpolator for one point's samples.
///
/// Sample positions must be non-decreasing. By default a repeated position
/// is only accepted when the whole `(position, value)` pair repeats (the
/// duplicate is dropped). [`with_vertical_steps`](Self::with_vertical_steps)
/// also accepts repeated positions with different values, as happens when a
/// cumulative distribution is flat between thresholds; evaluation then uses
/// the last sample whose position is `<= target`.
///
/// # Example
///
/// ```
/// use nimbus_ecc::{Extrapolation, PercentileInterpolator};
///
/// let interp = PercentileInterpolator::new(Extrapolation::Nearest);
/// let out = interp
///     .interpolate(&[25.0, 75.0], &[10.0, 20.0], &[0.0, 50.0, 100.0])
///     .unwrap();
/// assert_eq!(out, vec![10.0, 15.0, 20.0]);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct PercentileInterpolator {
    extrapolation: Extrapolation,
    vertical_steps: bool,
}

impl PercentileInterpolator {
    /// Creates an interpolator with the given extrapolation rule.
    pub fn new(extrapolation: Extrapolation) -> Self {
        Self {
            extrapolation,
            vertical_steps: false,
        }
    }

    /// Sets whether repeated positions with different values are accepted.
    pub fn with_vertical_steps(mut self, allow: bool) -> Self {
        self.vertical_steps = allow;
        self
    }

    /// Returns the extrapolation rule.
    pub fn extrapolation(&self) -> Extrapolation {
        self.extrapolation
    }

    /// Evaluates the curve through `(positions[i], values[i])` at each target.
    ///
    /// # Errors
    ///
    /// Returns [`EccError::EmptySamples`] for no samples,
    /// [`EccError::SampleLengthMismatch`] when the slices differ in length,
    /// and [`EccError::NonMonotonicSamples`] when positions decrease, are not
    /// finite, or repeat without vertical steps being allowed.
    pub fn interpolate(
        &self,
        positions: &[f64],
        values: &[f64],
        targets: &[f64],
    ) -> Result<Vec<f64>, EccError> {
        if positions.len() != values.len() {
            return Err(EccError::SampleLengthMismatch {
                positions: positions.len(),
                values: values.len(),
            });
        }
        if positions.is_empty() {
            return Err(EccError::EmptySamples);
        }
        if let Some(&p) = positions.iter().find(|p| !p.is_finite()) {
            return Err(EccError::NonMonotonicSamples {
                reason: format!("non-finite position {p}"),
            });
        }

        let (xs, ys) = self.prepare(positions, values)?;
        Ok(targets
            .iter()
            .map(|&t| evaluate(&xs, &ys, t, self.extrapolation))
            .collect())
    }

    /// Drops exact duplicate samples and checks ordering.
    fn prepare(&self, positions: &[f64], values: &[f64]) -> Result<(Vec<f64>, Vec<f64>), EccError> {
        let mut xs = Vec::with_capacity(positions.len());
        let mut ys = Vec::with_capacity(values.len());
        for (&x, &y) in positions.iter().zip(values) {
            if let (Some(&px), Some(&py)) = (xs.last(), ys.last()) {
                if x < px {
                    return Err(EccError::NonMonotonicSamples {
                        reason: format!("position {x} follows {px}"),
                    });
                }
                if x == px {
                    if y == py || (y.is_nan() && py.is_nan()) {
                        continue;
                    }
                    if !self.vertical_steps {
                        return Err(EccError::NonMonotonicSamples {
                            reason: format!("position {x} repeats with values {py} and {y}"),
                        });
                    }
                }
            }
            xs.push(x);
            ys.push(y);
        }
        Ok((xs, ys))
    }
}

fn line(x0: f64, y0: f64, x1: f64, y1: f64, t: f64) -> f64 {
    y0 + (t - x0) * (y1 - y0) / (x1 - x0)
}

fn evaluate(xs: &[f64], ys: &[f64], t: f64, extrapolation: Extrapolation) -> f64 {
    let n = xs.len();
    if t.is_nan() {
        return f64::NAN;
    }
    if n == 1 {
        return ys[0];
    }

    if t < xs[0] {
        return match extrapolation {
            Extrapolation::Linear if xs[1] > xs[0] => line(xs[0], ys[0], xs[1], ys[1], t),
            _ => ys[0],
        };
    }
    if t > xs[n - 1] {
        return match extrapolation {
            Extrapolation::Linear if xs[n - 1] > xs[n - 2] => {
                line(xs[n - 2], ys[n - 2], xs[n - 1], ys[n - 1], t)
            }
            _ => ys[n - 1],
        };
    }

    // Last sample at or below t; xs[j + 1] > t so the segment has width.
    let j = xs.partition_point(|&x| x <= t) - 1;
    if j == n - 1 {
        return ys[n - 1];
    }
    line(xs[j], ys[j], xs[j + 1], ys[j + 1], t)
}

/// Returns the first column that decreases along its length.
pub(crate) fn first_decreasing(columns: &[Vec<f64>]) -> Option<usize> {
    columns
        .iter()
        .position(|c| c.windows(2).any(|w| w[1] < w[0]))
}
