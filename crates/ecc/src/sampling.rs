//! Choice of target percentile sets.

use std::str::FromStr;

use rand::Rng;

use crate::error::EccError;
use crate::make_rng;

/// How a count of percentiles is turned into percentile values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PercentileSampling {
    /// `100 k / (n + 1)` for `k = 1..=n`: equal probability mass between
    /// neighbouring percentiles and in each tail.
    #[default]
    Quantile,
    /// `100 (i + 0.5) / n` for `i = 0..n`: centres of `n` equal bins.
    Midpoint,
    /// `n` sorted uniform draws inside the quantile range.
    Random {
        /// Seed for reproducible draws; `None` uses OS entropy.
        seed: Option<u64>,
    },
}

impl FromStr for PercentileSampling {
    type Err = EccError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "quantile" => Ok(PercentileSampling::Quantile),
            "midpoint" => Ok(PercentileSampling::Midpoint),
            "random" => Ok(PercentileSampling::Random { seed: None }),
            _ => Err(EccError::InvalidSampling {
                value: s.to_string(),
            }),
        }
    }
}

/// Returns `count` percentiles strictly between 0 and 100.
///
/// # Errors
///
/// Returns [`EccError::InvalidPercentileCount`] when `count` is zero.
pub fn choose_percentiles(
    count: usize,
    sampling: PercentileSampling,
) -> Result<Vec<f64>, EccError> {
    if count == 0 {
        return Err(EccError::InvalidPercentileCount { count });
    }
    let n = count as f64;
    let percentiles: Vec<f64> = match sampling {
        PercentileSampling::Quantile => (1..=count).map(|k| 100.0 * k as f64 / (n + 1.0)).collect(),
        PercentileSampling::Midpoint => (0..count).map(|i| 100.0 * (i as f64 + 0.5) / n).collect(),
        PercentileSampling::Random { seed } => {
            let mut rng = make_rng(seed);
            let lo = 100.0 / (n + 1.0);
            let hi = 100.0 * n / (n + 1.0);
            let mut draws: Vec<f64> = if hi > lo {
                (0..count).map(|_| rng.random_range(lo..hi)).collect()
            } else {
                vec![50.0]
            };
            draws.sort_by(f64::total_cmp);
            draws
        }
    };
    validate_percentiles(&percentiles)?;
    Ok(percentiles)
}

/// Checks a percentile set is non-empty, inside `[0, 100]` and strictly
/// increasing.
pub fn validate_percentiles(percentiles: &[f64]) -> Result<(), EccError> {
    if percentiles.is_empty() {
        return Err(EccError::InvalidPercentiles {
            reason: "no percentiles requested".to_string(),
        });
    }
    if let Some(p) = percentiles
        .iter()
        .find(|p| !p.is_finite() || **p < 0.0 || **p > 100.0)
    {
        return Err(EccError::InvalidPercentiles {
            reason: format!("{p} is outside [0, 100]"),
        });
    }
    if percentiles.windows(2).any(|w| w[1] <= w[0]) {
        return Err(EccError::InvalidPercentiles {
            reason: "percentiles must be strictly increasing".to_string(),
        });
    }
    Ok(())
}

/// The percentiles a conversion should produce.
#[derive(Debug, Clone, PartialEq)]
pub enum PercentileRequest {
    /// A number of percentiles, spaced by the configured sampling.
    Count(usize),
    /// An explicit percentile list.
    Explicit(Vec<f64>),
}

impl PercentileRequest {
    /// Builds a request from the optional command-line style arguments.
    ///
    /// Returns `Ok(None)` when neither is given.
    ///
    /// # Errors
    ///
    /// Returns [`EccError::ConflictingPercentileRequest`] when both are given.
    pub fn from_options(
        count: Option<usize>,
        percentiles: Option<Vec<f64>>,
    ) -> Result<Option<Self>, EccError> {
        match (count, percentiles) {
            (Some(_), Some(_)) => Err(EccError::ConflictingPercentileRequest),
            (Some(n), None) => Ok(Some(PercentileRequest::Count(n))),
            (None, Some(p)) => Ok(Some(PercentileRequest::Explicit(p))),
            (None, None) => Ok(None),
        }
    }

    /// Resolves the request into concrete percentile values.
    pub fn resolve(&self, sampling: PercentileSampling) -> Result<Vec<f64>, EccError> {
        match self {
            PercentileRequest::Count(n) => choose_percentiles(*n, sampling),
            PercentileRequest::Explicit(p) => {
                validate_percentiles(p)?;
                Ok(p.clone())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn quantile_spacing() {
        let p = choose_percentiles(3, PercentileSampling::Quantile).unwrap();
        assert_eq!(p, vec![25.0, 50.0, 75.0]);
        let p = choose_percentiles(4, PercentileSampling::Quantile).unwrap();
        assert_relative_eq!(p[0], 20.0);
        assert_relative_eq!(p[3], 80.0);
    }

    #[test]
    fn midpoint_spacing() {
        let p = choose_percentiles(4, PercentileSampling::Midpoint).unwrap();
        assert_eq!(p, vec![12.5, 37.5, 62.5, 87.5]);
    }

    #[test]
    fn single_percentile_is_median() {
        for sampling in [
            PercentileSampling::Quantile,
            PercentileSampling::Midpoint,
            PercentileSampling::Random { seed: Some(1) },
        ] {
            assert_eq!(choose_percentiles(1, sampling).unwrap(), vec![50.0]);
        }
    }

    #[test]
    fn random_is_seeded_and_sorted() {
        let sampling = PercentileSampling::Random { seed: Some(7) };
        let a = choose_percentiles(10, sampling).unwrap();
        let b = choose_percentiles(10, sampling).unwrap();
        assert_eq!(a, b);
        assert!(a.windows(2).all(|w| w[0] < w[1]));
        assert!(a[0] >= 100.0 / 11.0 && a[9] < 1000.0 / 11.0);
    }

    #[test]
    fn zero_count_rejected() {
        assert_eq!(
            choose_percentiles(0, PercentileSampling::Quantile),
            Err(EccError::InvalidPercentileCount { count: 0 })
        );
    }

    #[test]
    fn sampling_from_str() {
        assert_eq!(
            "Quantile".parse::<PercentileSampling>().unwrap(),
            PercentileSampling::Quantile
        );
        assert_eq!(
            "random".parse::<PercentileSampling>().unwrap(),
            PercentileSampling::Random { seed: None }
        );
        assert!(matches!(
            "even".parse::<PercentileSampling>(),
            Err(EccError::InvalidSampling { .. })
        ));
    }

    #[test]
    fn request_from_options() {
        assert_eq!(PercentileRequest::from_options(None, None), Ok(None));
        assert_eq!(
            PercentileRequest::from_options(Some(5), None),
            Ok(Some(PercentileRequest::Count(5)))
        );
        assert_eq!(
            PercentileRequest::from_options(Some(5), Some(vec![50.0])),
            Err(EccError::ConflictingPercentileRequest)
        );
    }

    #[test]
    fn explicit_request_validated() {
        let sampling = PercentileSampling::default();
        assert!(
            PercentileRequest::Explicit(vec![10.0, 50.0, 90.0])
                .resolve(sampling)
                .is_ok()
        );
        assert!(matches!(
            PercentileRequest::Explicit(vec![50.0, 10.0]).resolve(sampling),
            Err(EccError::InvalidPercentiles { .. })
        ));
        assert!(matches!(
            PercentileRequest::Explicit(vec![-1.0]).resolve(sampling),
            Err(EccError::InvalidPercentiles { .. })
        ));
        assert!(matches!(
            PercentileRequest::Explicit(vec![]).resolve(sampling),
            Err(EccError::InvalidPercentiles { .. })
        ));
    }
}
