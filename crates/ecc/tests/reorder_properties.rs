//! Properties of ensemble reordering over randomly generated ensembles.

use nimbus_cube::{Cube, DimCoord, LeadingAxis};
use nimbus_ecc::{EnsembleReorderer, ReorderConfig, TieBreak};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const N_POINTS: usize = 50;
const N_MEMBERS: usize = 12;

fn dims() -> Vec<DimCoord> {
    vec![DimCoord::new(
        "x",
        "m",
        (0..N_POINTS).map(|i| i as f64 * 1000.0).collect(),
    )]
}

fn random_cubes(seed: u64) -> (Cube, Cube) {
    let mut rng = StdRng::seed_from_u64(seed);
    let percentile_columns: Vec<Vec<f64>> = (0..N_POINTS)
        .map(|_| {
            let mut v: Vec<f64> = (0..N_MEMBERS).map(|_| rng.random_range(0.0..10.0)).collect();
            v.sort_by(f64::total_cmp);
            v
        })
        .collect();
    // Coarse raw values so that ties are common.
    let raw_columns: Vec<Vec<f64>> = (0..N_POINTS)
        .map(|_| {
            (0..N_MEMBERS)
                .map(|_| f64::from(rng.random_range(0..4_i32)))
                .collect()
        })
        .collect();

    let percentiles = Cube::from_columns(
        "air_temperature",
        "K",
        LeadingAxis::Percentile {
            points: (1..=N_MEMBERS)
                .map(|k| 100.0 * k as f64 / (N_MEMBERS as f64 + 1.0))
                .collect(),
        },
        dims(),
        &percentile_columns,
    )
    .unwrap();
    let raw = Cube::from_columns(
        "air_temperature",
        "K",
        LeadingAxis::Realization {
            points: (0..N_MEMBERS as i32).collect(),
        },
        dims(),
        &raw_columns,
    )
    .unwrap();
    (percentiles, raw)
}

fn sorted(values: &[f64]) -> Vec<f64> {
    let mut v = values.to_vec();
    v.sort_by(f64::total_cmp);
    v
}

#[test]
fn output_is_a_permutation_at_every_point() {
    let (percentiles, raw) = random_cubes(1);
    for tie_break in [TieBreak::Random, TieBreak::Realization] {
        let config = ReorderConfig::new()
            .with_tie_break(tie_break)
            .with_random_seed(Some(7));
        let out = EnsembleReorderer::new(config)
            .process(&percentiles, &raw)
            .unwrap();
        for (got, want) in out.columns().unwrap().iter().zip(percentiles.columns().unwrap()) {
            assert_eq!(sorted(got), want);
        }
    }
}

#[test]
fn output_ranks_follow_raw_ranks() {
    let (percentiles, raw) = random_cubes(2);
    let config = ReorderConfig::new().with_random_seed(Some(3));
    let out = EnsembleReorderer::new(config)
        .process(&percentiles, &raw)
        .unwrap();
    for (got, r) in out.columns().unwrap().iter().zip(raw.columns().unwrap()) {
        for i in 0..N_MEMBERS {
            for j in 0..N_MEMBERS {
                if r[i] < r[j] {
                    assert!(got[i] <= got[j]);
                }
            }
        }
    }
}

#[test]
fn fixed_seed_is_reproducible() {
    let (percentiles, raw) = random_cubes(3);
    let config = ReorderConfig::new().with_random_seed(Some(1234));
    let a = EnsembleReorderer::new(config.clone())
        .process(&percentiles, &raw)
        .unwrap();
    let b = EnsembleReorderer::new(config)
        .process(&percentiles, &raw)
        .unwrap();
    assert_eq!(a, b);
}

#[test]
fn different_seeds_break_ties_differently() {
    let (percentiles, raw) = random_cubes(4);
    let a = EnsembleReorderer::new(ReorderConfig::new().with_random_seed(Some(1)))
        .process(&percentiles, &raw)
        .unwrap();
    let b = EnsembleReorderer::new(ReorderConfig::new().with_random_seed(Some(2)))
        .process(&percentiles, &raw)
        .unwrap();
    assert_ne!(a, b);
}

#[test]
fn realization_tie_break_is_deterministic_without_seed() {
    let (percentiles, raw) = random_cubes(5);
    let reorderer =
        EnsembleReorderer::new(ReorderConfig::new().with_tie_break(TieBreak::Realization));
    let a = reorderer.process(&percentiles, &raw).unwrap();
    let b = reorderer.process(&percentiles, &raw).unwrap();
    assert_eq!(a, b);
}
