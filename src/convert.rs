//! Pure conversion functions: TOML config and CLI flags -> crate API config types.

use std::collections::BTreeMap;

use anyhow::{Context, Result};

use crate::cli::{PercentilesArgs, RealizationsArgs};
use crate::config::*;

use nimbus_ecc::{
    Bounds, BoundsTable, ConversionConfig, PercentileRequest, PercentileSampling,
    RealizationsConfig, TieBreak,
};

/// Parses a sampling name, attaching `seed` to random sampling.
pub fn parse_sampling(s: &str, seed: Option<u64>) -> Result<PercentileSampling> {
    let sampling: PercentileSampling = s.parse().context("invalid sampling")?;
    Ok(match sampling {
        PercentileSampling::Random { .. } => PercentileSampling::Random { seed },
        other => other,
    })
}

/// Builds the bounds table: the standard entries overridden by `[bounds.*]`.
pub fn build_bounds_table(bounds: &BTreeMap<String, BoundsToml>) -> BoundsTable {
    bounds
        .iter()
        .fold(BoundsTable::standard(), |table, (variable, b)| {
            table.with_bounds(variable, Bounds::new(b.lower, b.upper, &b.units))
        })
}

/// Builds a [`RealizationsConfig`] from the TOML file, with CLI flags taking
/// precedence.
pub fn build_realizations_config(
    config: &NimbusConfig,
    args: &RealizationsArgs,
) -> Result<RealizationsConfig> {
    let ecc = &config.ecc;
    let seed = args.random_seed.or(ecc.random_seed);
    let tie_break: TieBreak = args
        .tie_break
        .as_deref()
        .unwrap_or(&ecc.tie_break)
        .parse()
        .context("invalid tie-break")?;

    let cfg = RealizationsConfig::new()
        .with_realizations_count(args.realizations_count.or(ecc.realizations_count))
        .with_random_seed(seed)
        .with_tie_break(tie_break)
        .with_ignore_ecc_bounds_exceedance(
            args.ignore_ecc_bounds_exceedance || ecc.ignore_ecc_bounds_exceedance,
        )
        .with_skip_ecc_bounds(args.skip_ecc_bounds || ecc.skip_ecc_bounds)
        .with_sampling(parse_sampling(&ecc.sampling, seed)?)
        .with_bounds(build_bounds_table(&config.bounds));
    cfg.validate().context("invalid realizations configuration")?;
    Ok(cfg)
}

/// Builds a [`ConversionConfig`] from the TOML file, with CLI flags taking
/// precedence.
pub fn build_conversion_config(
    config: &NimbusConfig,
    args: &PercentilesArgs,
) -> Result<ConversionConfig> {
    let ecc = &config.ecc;
    let sampling = args.sampling.as_deref().unwrap_or(&ecc.sampling);
    let cfg = ConversionConfig::new()
        .with_ecc_bounds_warning(
            args.ignore_ecc_bounds_exceedance || ecc.ignore_ecc_bounds_exceedance,
        )
        .with_skip_ecc_bounds(args.skip_ecc_bounds || ecc.skip_ecc_bounds)
        .with_sampling(parse_sampling(sampling, ecc.random_seed)?)
        .with_bounds(build_bounds_table(&config.bounds));
    cfg.validate().context("invalid conversion configuration")?;
    Ok(cfg)
}

/// Builds the percentile request from `--count` / `--percentiles`.
pub fn build_percentile_request(args: &PercentilesArgs) -> Result<Option<PercentileRequest>> {
    PercentileRequest::from_options(args.count, args.percentiles.clone())
        .context("invalid percentile request")
}
