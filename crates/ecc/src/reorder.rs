//! Ensemble Copula Coupling reordering of percentiles into realizations.

use std::cmp::Ordering;

use nimbus_cube::{Cube, CubeKind, LeadingAxis};
use rand::Rng;
use rayon::prelude::*;
use tracing::debug;

use crate::config::{ReorderConfig, TieBreak};
use crate::error::EccError;
use crate::make_rng;

/// Assigns percentile values to realizations following the rank order of a
/// raw ensemble.
///
/// At every point the realization holding the k-th smallest raw value
/// receives the k-th smallest percentile value, which restores the spatial
/// and temporal structure of the raw ensemble.
///
/// # Example
///
/// ```
/// use nimbus_cube::{Cube, LeadingAxis};
/// use nimbus_ecc::{EnsembleReorderer, ReorderConfig, TieBreak};
///
/// let percentiles = Cube::from_columns(
///     "air_temperature",
///     "K",
///     LeadingAxis::Percentile { points: vec![25.0, 50.0, 75.0] },
///     vec![],
///     &[vec![1.0, 2.0, 3.0]],
/// )
/// .unwrap();
/// let raw = Cube::from_columns(
///     "air_temperature",
///     "K",
///     LeadingAxis::Realization { points: vec![0, 1, 2] },
///     vec![],
///     &[vec![5.0, 3.0, 9.0]],
/// )
/// .unwrap();
///
/// let reorderer = EnsembleReorderer::new(ReorderConfig::new().with_tie_break(TieBreak::Realization));
/// let out = reorderer.process(&percentiles, &raw).unwrap();
/// assert_eq!(out.columns().unwrap()[0], vec![2.0, 1.0, 3.0]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct EnsembleReorderer {
    config: ReorderConfig,
}

impl EnsembleReorderer {
    /// Creates a reorderer.
    pub fn new(config: ReorderConfig) -> Self {
        Self { config }
    }

    /// Returns the configuration.
    pub fn config(&self) -> &ReorderConfig {
        &self.config
    }

    /// Reorders `percentiles` by the rank structure of `raw`.
    ///
    /// The output keeps the name, units, trailing coordinates and attributes
    /// of `percentiles` and takes its realization labels from `raw`.
    ///
    /// # Errors
    ///
    /// - [`EccError::UnexpectedCubeKind`] when `percentiles` is not a
    ///   percentile cube or `raw` is not a realization cube.
    /// - [`EccError::Cube`] when the trailing coordinates differ.
    /// - [`EccError::RealizationCountMismatch`] when the counts differ and
    ///   recycling is disabled.
    /// - [`EccError::NonMonotonicPercentiles`] when percentile values
    ///   decrease at a point.
    #[tracing::instrument(skip_all, fields(name = percentiles.name(), tie_break = %self.config.tie_break()))]
    pub fn process(&self, percentiles: &Cube, raw: &Cube) -> Result<Cube, EccError> {
        let points = percentiles
            .percentile_points()
            .ok_or_else(|| EccError::unexpected_kind(CubeKind::Percentile, percentiles.kind()))?;
        let raw_labels = raw
            .realization_points()
            .ok_or_else(|| EccError::unexpected_kind(CubeKind::Realization, raw.kind()))?;
        percentiles.check_spatial_match(raw)?;

        let m = points.len();
        let (labels, raw_columns) = self.match_members(m, raw_labels, raw.columns()?)?;
        let values = percentiles.columns()?;

        // Keys are drawn serially so that a seed fixes the result regardless
        // of how the points are split across threads.
        let keys = self.random_keys(values.len(), m);
        debug!(
            n_points = values.len(),
            n_realizations = m,
            random_ordering = self.config.random_ordering(),
            "reordering percentiles"
        );

        let out: Vec<Vec<f64>> = values
            .par_iter()
            .zip(raw_columns.par_iter())
            .enumerate()
            .map(|(point, (v, r))| {
                if v.windows(2).any(|w| w[1] < w[0]) {
                    return Err(EccError::NonMonotonicPercentiles { point });
                }
                let order = self.rank_order(r, keys.as_ref().map(|k| k[point].as_slice()));
                let mut reordered = vec![0.0; m];
                for (&member, &value) in order.iter().zip(v) {
                    reordered[member] = value;
                }
                Ok(reordered)
            })
            .collect::<Result<_, _>>()?;

        Ok(Cube::from_columns(
            percentiles.name(),
            percentiles.units(),
            LeadingAxis::Realization { points: labels },
            percentiles.dims().to_vec(),
            &out,
        )?
        .with_attributes(percentiles.attributes().clone()))
    }

    /// Brings the raw members to `m`, cycling them when recycling is
    /// enabled.
    fn match_members(
        &self,
        m: usize,
        labels: &[i32],
        columns: Vec<Vec<f64>>,
    ) -> Result<(Vec<i32>, Vec<Vec<f64>>), EccError> {
        let n_raw = labels.len();
        if n_raw == m {
            return Ok((labels.to_vec(), columns));
        }
        if !self.config.recycle_raw_realizations() {
            return Err(EccError::RealizationCountMismatch {
                percentiles: m,
                realizations: n_raw,
            });
        }

        debug!(n_raw, m, "recycling raw realizations");
        let first = labels[0];
        let labels = (0..m)
            .map(|k| {
                i32::try_from(k)
                    .ok()
                    .and_then(|k| first.checked_add(k))
                    .ok_or_else(|| EccError::InvalidRealizationLabels {
                        reason: format!("{m} realizations starting at {first} overflow"),
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;
        let columns = columns
            .into_iter()
            .map(|c| (0..m).map(|k| c[k % n_raw]).collect())
            .collect();
        Ok((labels, columns))
    }

    /// Returns one row of uniform keys per point, when ranking needs them.
    fn random_keys(&self, n_points: usize, m: usize) -> Option<Vec<Vec<f64>>> {
        if !self.config.random_ordering() && self.config.tie_break() != TieBreak::Random {
            return None;
        }
        let mut rng = make_rng(self.config.random_seed());
        Some(
            (0..n_points)
                .map(|_| (0..m).map(|_| rng.random::<f64>()).collect())
                .collect(),
        )
    }

    /// Returns member indices ordered from smallest to largest rank.
    fn rank_order(&self, raw: &[f64], keys: Option<&[f64]>) -> Vec<usize> {
        let mut order: Vec<usize> = (0..raw.len()).collect();
        let by_key = |a: usize, b: usize| match keys {
            Some(k) => k[a].total_cmp(&k[b]),
            None => Ordering::Equal,
        };
        if self.config.random_ordering() {
            order.sort_by(|&a, &b| by_key(a, b));
        } else {
            // Stable: without keys, tied members keep index order.
            order.sort_by(|&a, &b| raw[a].total_cmp(&raw[b]).then_with(|| by_key(a, b)));
        }
        order
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nimbus_cube::DimCoord;

    fn percentile_cube(columns: &[Vec<f64>]) -> Cube {
        let m = columns[0].len();
        Cube::from_columns(
            "air_temperature",
            "K",
            LeadingAxis::Percentile {
                points: (1..=m).map(|k| 100.0 * k as f64 / (m as f64 + 1.0)).collect(),
            },
            vec![DimCoord::new(
                "x",
                "m",
                (0..columns.len()).map(|i| i as f64).collect(),
            )],
            columns,
        )
        .unwrap()
    }

    fn raw_cube(labels: Vec<i32>, columns: &[Vec<f64>]) -> Cube {
        Cube::from_columns(
            "air_temperature",
            "K",
            LeadingAxis::Realization { points: labels },
            vec![DimCoord::new(
                "x",
                "m",
                (0..columns.len()).map(|i| i as f64).collect(),
            )],
            columns,
        )
        .unwrap()
    }

    fn by_realization() -> EnsembleReorderer {
        EnsembleReorderer::new(ReorderConfig::new().with_tie_break(TieBreak::Realization))
    }

    #[test]
    fn follows_raw_ranks() {
        let pct = percentile_cube(&[vec![1.0, 2.0, 3.0]]);
        let raw = raw_cube(vec![0, 1, 2], &[vec![5.0, 3.0, 9.0]]);
        let out = by_realization().process(&pct, &raw).unwrap();
        assert_eq!(out.columns().unwrap()[0], vec![2.0, 1.0, 3.0]);
        assert_eq!(out.kind(), Some(CubeKind::Realization));
    }

    #[test]
    fn labels_come_from_raw() {
        let pct = percentile_cube(&[vec![1.0, 2.0, 3.0]]);
        let raw = raw_cube(vec![10, 20, 30], &[vec![5.0, 3.0, 9.0]]);
        let out = by_realization().process(&pct, &raw).unwrap();
        assert_eq!(out.realization_points(), Some(&[10, 20, 30][..]));
    }

    #[test]
    fn realization_tie_break_favours_highest_index() {
        let pct = percentile_cube(&[vec![1.0, 2.0, 3.0]]);
        let raw = raw_cube(vec![0, 1, 2], &[vec![4.0, 4.0, 4.0]]);
        let out = by_realization().process(&pct, &raw).unwrap();
        assert_eq!(out.columns().unwrap()[0], vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn realization_tie_break_ignores_seed() {
        let pct = percentile_cube(&[vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0]]);
        let raw = raw_cube(vec![0, 1, 2], &[vec![1.0, 1.0, 0.0], vec![2.0, 2.0, 2.0]]);
        let a = EnsembleReorderer::new(
            ReorderConfig::new()
                .with_tie_break(TieBreak::Realization)
                .with_random_seed(Some(1)),
        )
        .process(&pct, &raw)
        .unwrap();
        let b = EnsembleReorderer::new(
            ReorderConfig::new()
                .with_tie_break(TieBreak::Realization)
                .with_random_seed(Some(99)),
        )
        .process(&pct, &raw)
        .unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn random_tie_break_is_seeded() {
        let columns: Vec<Vec<f64>> = (0..20).map(|_| vec![1.0, 2.0, 3.0, 4.0]).collect();
        let pct = percentile_cube(&columns);
        let raw_columns: Vec<Vec<f64>> = (0..20).map(|_| vec![0.0; 4]).collect();
        let raw = raw_cube(vec![0, 1, 2, 3], &raw_columns);
        let config = ReorderConfig::new().with_random_seed(Some(42));
        let a = EnsembleReorderer::new(config.clone()).process(&pct, &raw).unwrap();
        let b = EnsembleReorderer::new(config).process(&pct, &raw).unwrap();
        assert_eq!(a, b);
        // With every raw value tied, the keys decide; some point must
        // differ from the identity ordering.
        assert!(
            a.columns()
                .unwrap()
                .iter()
                .any(|c| c != &vec![1.0, 2.0, 3.0, 4.0])
        );
    }

    #[test]
    fn output_is_a_permutation() {
        let pct = percentile_cube(&[vec![1.0, 2.0, 2.0, 7.0], vec![-3.0, 0.0, 0.5, 1.0]]);
        let raw = raw_cube(
            vec![0, 1, 2, 3],
            &[vec![8.0, 1.0, 1.0, 3.0], vec![0.0, -1.0, 5.0, 5.0]],
        );
        let out = EnsembleReorderer::new(ReorderConfig::new().with_random_seed(Some(3)))
            .process(&pct, &raw)
            .unwrap();
        for (got, want) in out.columns().unwrap().iter().zip(pct.columns().unwrap()) {
            let mut sorted = got.clone();
            sorted.sort_by(f64::total_cmp);
            assert_eq!(sorted, want);
        }
    }

    #[test]
    fn random_ordering_ignores_raw_values() {
        let pct = percentile_cube(&[vec![1.0, 2.0, 3.0]]);
        let raw = raw_cube(vec![0, 1, 2], &[vec![5.0, 3.0, 9.0]]);
        let config = ReorderConfig::new()
            .with_random_ordering(true)
            .with_random_seed(Some(5));
        let out = EnsembleReorderer::new(config).process(&pct, &raw).unwrap();
        let mut values = out.columns().unwrap()[0].clone();
        values.sort_by(f64::total_cmp);
        assert_eq!(values, vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn count_mismatch_rejected_without_recycling() {
        let pct = percentile_cube(&[vec![1.0, 2.0]]);
        let raw = raw_cube(vec![0, 1, 2], &[vec![5.0, 3.0, 9.0]]);
        assert_eq!(
            by_realization().process(&pct, &raw).unwrap_err(),
            EccError::RealizationCountMismatch {
                percentiles: 2,
                realizations: 3
            }
        );
    }

    #[test]
    fn recycling_cycles_raw_members() {
        let pct = percentile_cube(&[vec![1.0, 2.0, 3.0, 4.0, 5.0]]);
        let raw = raw_cube(vec![7, 8], &[vec![2.0, 1.0]]);
        let config = ReorderConfig::new()
            .with_tie_break(TieBreak::Realization)
            .with_recycle_raw_realizations(true);
        let out = EnsembleReorderer::new(config).process(&pct, &raw).unwrap();
        assert_eq!(out.realization_points(), Some(&[7, 8, 9, 10, 11][..]));
        // Recycled raw values [2, 1, 2, 1, 2]; ties keep index order.
        assert_eq!(out.columns().unwrap()[0], vec![3.0, 1.0, 4.0, 2.0, 5.0]);
    }

    #[test]
    fn recycling_truncates_raw_members() {
        let pct = percentile_cube(&[vec![1.0, 2.0]]);
        let raw = raw_cube(vec![0, 1, 2], &[vec![5.0, 3.0, 9.0]]);
        let config = ReorderConfig::new()
            .with_tie_break(TieBreak::Realization)
            .with_recycle_raw_realizations(true);
        let out = EnsembleReorderer::new(config).process(&pct, &raw).unwrap();
        assert_eq!(out.realization_points(), Some(&[0, 1][..]));
        assert_eq!(out.columns().unwrap()[0], vec![2.0, 1.0]);
    }

    #[test]
    fn unsorted_percentile_values_rejected() {
        let pct = percentile_cube(&[vec![1.0, 2.0, 3.0], vec![3.0, 2.0, 1.0]]);
        let raw = raw_cube(vec![0, 1, 2], &[vec![5.0, 3.0, 9.0], vec![1.0, 2.0, 3.0]]);
        assert_eq!(
            by_realization().process(&pct, &raw).unwrap_err(),
            EccError::NonMonotonicPercentiles { point: 1 }
        );
    }

    #[test]
    fn spatial_mismatch_rejected() {
        let pct = percentile_cube(&[vec![1.0, 2.0, 3.0]]);
        let raw = Cube::from_columns(
            "air_temperature",
            "K",
            LeadingAxis::Realization {
                points: vec![0, 1, 2],
            },
            vec![DimCoord::new("x", "m", vec![100.0])],
            &[vec![5.0, 3.0, 9.0]],
        )
        .unwrap();
        assert!(matches!(
            by_realization().process(&pct, &raw),
            Err(EccError::Cube(_))
        ));
    }

    #[test]
    fn raw_must_be_realizations() {
        let pct = percentile_cube(&[vec![1.0, 2.0, 3.0]]);
        assert!(matches!(
            by_realization().process(&pct, &pct),
            Err(EccError::UnexpectedCubeKind {
                expected: CubeKind::Realization,
                ..
            })
        ));
    }
}
