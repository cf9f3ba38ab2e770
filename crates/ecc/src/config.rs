//! Configuration for the conversion, reordering and orchestration steps.

use std::fmt;
use std::str::FromStr;

use crate::bounds::BoundsTable;
use crate::error::EccError;
use crate::sampling::PercentileSampling;

/// Configuration shared by the probability and percentile converters.
///
/// Use the builder methods to customise parameters.
///
/// # Example
///
/// ```
/// use nimbus_ecc::{ConversionConfig, PercentileSampling};
///
/// let config = ConversionConfig::new()
///     .with_ecc_bounds_warning(true)
///     .with_sampling(PercentileSampling::Midpoint);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone)]
pub struct ConversionConfig {
    ecc_bounds_warning: bool,
    skip_ecc_bounds: bool,
    sampling: PercentileSampling,
    bounds: BoundsTable,
}

impl ConversionConfig {
    /// Creates a new configuration with defaults.
    ///
    /// Defaults: `ecc_bounds_warning = false`, `skip_ecc_bounds = false`,
    /// `sampling = Quantile`, `bounds = BoundsTable::standard()`.
    pub fn new() -> Self {
        Self {
            ecc_bounds_warning: false,
            skip_ecc_bounds: false,
            sampling: PercentileSampling::Quantile,
            bounds: BoundsTable::standard(),
        }
    }

    /// Sets whether data outside the ECC bounds warns instead of failing.
    pub fn with_ecc_bounds_warning(mut self, b: bool) -> Self {
        self.ecc_bounds_warning = b;
        self
    }

    /// Sets whether ECC bounds are left out of the distribution entirely.
    pub fn with_skip_ecc_bounds(mut self, b: bool) -> Self {
        self.skip_ecc_bounds = b;
        self
    }

    /// Sets how percentile counts are turned into percentile values.
    pub fn with_sampling(mut self, s: PercentileSampling) -> Self {
        self.sampling = s;
        self
    }

    /// Sets the bounds table.
    pub fn with_bounds(mut self, bounds: BoundsTable) -> Self {
        self.bounds = bounds;
        self
    }

    /// Returns whether bounds exceedance only warns.
    pub fn ecc_bounds_warning(&self) -> bool {
        self.ecc_bounds_warning
    }

    /// Returns whether ECC bounds are skipped.
    pub fn skip_ecc_bounds(&self) -> bool {
        self.skip_ecc_bounds
    }

    /// Returns the percentile sampling.
    pub fn sampling(&self) -> PercentileSampling {
        self.sampling
    }

    /// Returns the bounds table.
    pub fn bounds(&self) -> &BoundsTable {
        &self.bounds
    }

    /// Validates this configuration.
    ///
    /// The bounds table must be valid; it is not consulted when bounds are
    /// skipped.
    pub fn validate(&self) -> Result<(), EccError> {
        if !self.skip_ecc_bounds {
            self.bounds.validate()?;
        }
        Ok(())
    }
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Rule that orders raw ensemble members with equal values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TieBreak {
    /// Order tied members randomly.
    #[default]
    Random,
    /// Order tied members by position, so the highest-numbered member
    /// receives the highest rank.
    Realization,
}

impl fmt::Display for TieBreak {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TieBreak::Random => f.write_str("random"),
            TieBreak::Realization => f.write_str("realization"),
        }
    }
}

impl FromStr for TieBreak {
    type Err = EccError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "random" => Ok(TieBreak::Random),
            "realization" => Ok(TieBreak::Realization),
            other => Err(EccError::InvalidTieBreak {
                value: other.to_string(),
            }),
        }
    }
}

/// Configuration for ensemble reordering.
///
/// # Example
///
/// ```
/// use nimbus_ecc::{ReorderConfig, TieBreak};
///
/// let config = ReorderConfig::new()
///     .with_random_seed(Some(0))
///     .with_tie_break(TieBreak::Realization);
/// assert_eq!(config.tie_break(), TieBreak::Realization);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ReorderConfig {
    random_seed: Option<u64>,
    tie_break: TieBreak,
    random_ordering: bool,
    recycle_raw_realizations: bool,
}

impl ReorderConfig {
    /// Creates a new configuration with defaults.
    ///
    /// Defaults: `random_seed = None`, `tie_break = Random`,
    /// `random_ordering = false`, `recycle_raw_realizations = false`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the seed for random tie-breaking. `None` uses OS entropy.
    pub fn with_random_seed(mut self, seed: Option<u64>) -> Self {
        self.random_seed = seed;
        self
    }

    /// Sets the tie-break rule.
    pub fn with_tie_break(mut self, t: TieBreak) -> Self {
        self.tie_break = t;
        self
    }

    /// Sets whether members are ordered randomly, ignoring the raw values.
    pub fn with_random_ordering(mut self, b: bool) -> Self {
        self.random_ordering = b;
        self
    }

    /// Sets whether raw members are cycled or truncated to the percentile
    /// count instead of failing on a count mismatch.
    pub fn with_recycle_raw_realizations(mut self, b: bool) -> Self {
        self.recycle_raw_realizations = b;
        self
    }

    /// Returns the random seed.
    pub fn random_seed(&self) -> Option<u64> {
        self.random_seed
    }

    /// Returns the tie-break rule.
    pub fn tie_break(&self) -> TieBreak {
        self.tie_break
    }

    /// Returns whether members are ordered randomly.
    pub fn random_ordering(&self) -> bool {
        self.random_ordering
    }

    /// Returns whether raw members are recycled on a count mismatch.
    pub fn recycle_raw_realizations(&self) -> bool {
        self.recycle_raw_realizations
    }
}

/// Configuration for [`RealizationsOrchestrator`](crate::RealizationsOrchestrator).
///
/// # Example
///
/// ```
/// use nimbus_ecc::{RealizationsConfig, TieBreak};
///
/// let config = RealizationsConfig::new()
///     .with_realizations_count(Some(12))
///     .with_random_seed(Some(0))
///     .with_tie_break(TieBreak::Realization)
///     .with_ignore_ecc_bounds_exceedance(true);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone)]
pub struct RealizationsConfig {
    realizations_count: Option<usize>,
    random_seed: Option<u64>,
    tie_break: TieBreak,
    ignore_ecc_bounds_exceedance: bool,
    skip_ecc_bounds: bool,
    sampling: PercentileSampling,
    bounds: BoundsTable,
}

impl RealizationsConfig {
    /// Creates a new configuration with defaults.
    ///
    /// Defaults: `realizations_count = None`, `random_seed = None`,
    /// `tie_break = Random`, `ignore_ecc_bounds_exceedance = false`,
    /// `skip_ecc_bounds = false`, `sampling = Quantile`,
    /// `bounds = BoundsTable::standard()`.
    pub fn new() -> Self {
        Self {
            realizations_count: None,
            random_seed: None,
            tie_break: TieBreak::Random,
            ignore_ecc_bounds_exceedance: false,
            skip_ecc_bounds: false,
            sampling: PercentileSampling::Quantile,
            bounds: BoundsTable::standard(),
        }
    }

    /// Sets the number of output realizations.
    pub fn with_realizations_count(mut self, n: Option<usize>) -> Self {
        self.realizations_count = n;
        self
    }

    /// Sets the seed for random tie-breaking.
    pub fn with_random_seed(mut self, seed: Option<u64>) -> Self {
        self.random_seed = seed;
        self
    }

    /// Sets the tie-break rule.
    pub fn with_tie_break(mut self, t: TieBreak) -> Self {
        self.tie_break = t;
        self
    }

    /// Sets whether ECC bounds exceedance only warns.
    pub fn with_ignore_ecc_bounds_exceedance(mut self, b: bool) -> Self {
        self.ignore_ecc_bounds_exceedance = b;
        self
    }

    /// Sets whether ECC bounds are skipped.
    pub fn with_skip_ecc_bounds(mut self, b: bool) -> Self {
        self.skip_ecc_bounds = b;
        self
    }

    /// Sets the percentile sampling of the intermediate percentile cube.
    pub fn with_sampling(mut self, s: PercentileSampling) -> Self {
        self.sampling = s;
        self
    }

    /// Sets the bounds table.
    pub fn with_bounds(mut self, bounds: BoundsTable) -> Self {
        self.bounds = bounds;
        self
    }

    /// Returns the requested realization count.
    pub fn realizations_count(&self) -> Option<usize> {
        self.realizations_count
    }

    /// Returns the random seed.
    pub fn random_seed(&self) -> Option<u64> {
        self.random_seed
    }

    /// Returns the tie-break rule.
    pub fn tie_break(&self) -> TieBreak {
        self.tie_break
    }

    /// Returns whether ECC bounds exceedance only warns.
    pub fn ignore_ecc_bounds_exceedance(&self) -> bool {
        self.ignore_ecc_bounds_exceedance
    }

    /// Returns whether ECC bounds are skipped.
    pub fn skip_ecc_bounds(&self) -> bool {
        self.skip_ecc_bounds
    }

    /// Returns the percentile sampling.
    pub fn sampling(&self) -> PercentileSampling {
        self.sampling
    }

    /// Returns the converter configuration derived from this one.
    pub fn conversion(&self) -> ConversionConfig {
        ConversionConfig::new()
            .with_ecc_bounds_warning(self.ignore_ecc_bounds_exceedance)
            .with_skip_ecc_bounds(self.skip_ecc_bounds)
            .with_sampling(self.sampling)
            .with_bounds(self.bounds.clone())
    }

    /// Returns the reorder configuration derived from this one.
    ///
    /// Recycling is enabled so that an explicit realization count may differ
    /// from the raw ensemble size.
    pub fn reorder(&self) -> ReorderConfig {
        ReorderConfig::new()
            .with_random_seed(self.random_seed)
            .with_tie_break(self.tie_break)
            .with_recycle_raw_realizations(true)
    }

    /// Validates this configuration.
    pub fn validate(&self) -> Result<(), EccError> {
        if let Some(0) = self.realizations_count {
            return Err(EccError::InvalidPercentileCount { count: 0 });
        }
        self.conversion().validate()
    }
}

impl Default for RealizationsConfig {
    fn default() -> Self {
        Self::new()
    }
}
