//! Conversion of any probabilistic cube to realizations.

use nimbus_cube::{Cube, CubeKind};
use tracing::debug;

use crate::config::RealizationsConfig;
use crate::error::EccError;
use crate::probabilities::ProbabilityToPercentileConverter;
use crate::rebadge::RealizationRebadger;
use crate::reorder::EnsembleReorderer;
use crate::resample::PercentileResampler;
use crate::sampling::{PercentileRequest, PercentileSampling};

/// Single entry point that turns probability, percentile or realization
/// cubes into realization cubes.
#[derive(Debug, Clone)]
pub struct RealizationsOrchestrator {
    config: RealizationsConfig,
    converter: ProbabilityToPercentileConverter,
    resampler: PercentileResampler,
    reorderer: EnsembleReorderer,
    rebadger: RealizationRebadger,
}

impl RealizationsOrchestrator {
    /// Creates an orchestrator after validating `config`.
    pub fn new(config: RealizationsConfig) -> Result<Self, EccError> {
        config.validate()?;
        let conversion = config.conversion();
        // Random percentiles are never evenly spaced.
        let rebadger = RealizationRebadger::new().with_spacing_check(!matches!(
            config.sampling(),
            PercentileSampling::Random { .. }
        ));
        Ok(Self {
            converter: ProbabilityToPercentileConverter::new(conversion.clone())?,
            resampler: PercentileResampler::new(conversion)?,
            reorderer: EnsembleReorderer::new(config.reorder()),
            rebadger,
            config,
        })
    }

    /// Returns the configuration.
    pub fn config(&self) -> &RealizationsConfig {
        &self.config
    }

    /// Converts `cube` to realizations.
    ///
    /// A realization cube is returned unchanged. Otherwise the cube is
    /// brought to `realizations_count` percentiles (or as many as `raw` has
    /// members) and then reordered against `raw`, or rebadged when no raw
    /// ensemble is given.
    ///
    /// # Errors
    ///
    /// - [`EccError::NotConvertible`] when `cube` has no leading axis.
    /// - [`EccError::UnexpectedCubeKind`] when `raw` is not a realization cube.
    /// - [`EccError::MissingRealizationsCount`] when neither a count nor
    ///   `raw` is available.
    /// - Any error of the conversion, reordering or rebadging step.
    #[tracing::instrument(skip_all, fields(name = cube.name(), with_raw = raw.is_some()))]
    pub fn process(&self, cube: &Cube, raw: Option<&Cube>) -> Result<Cube, EccError> {
        let kind = cube.kind().ok_or_else(|| EccError::NotConvertible {
            name: cube.name().to_string(),
        })?;
        if kind == CubeKind::Realization {
            debug!("input already holds realizations");
            return Ok(cube.clone());
        }
        if let Some(raw) = raw
            && raw.kind() != Some(CubeKind::Realization)
        {
            return Err(EccError::unexpected_kind(CubeKind::Realization, raw.kind()));
        }

        let count = self
            .config
            .realizations_count()
            .or_else(|| raw.map(Cube::leading_len))
            .ok_or(EccError::MissingRealizationsCount)?;
        let request = PercentileRequest::Count(count);
        debug!(%kind, count, "converting to realizations");

        let percentiles = match kind {
            CubeKind::Probability => self.converter.process(cube, Some(&request))?,
            _ => self.resampler.process(cube, Some(&request))?,
        };

        match raw {
            Some(raw) => self.reorderer.process(&percentiles, raw),
            None => self.rebadger.process(&percentiles, None),
        }
    }
}
