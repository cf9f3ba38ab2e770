//! Percentiles command: convert probabilities or resample percentiles.

use anyhow::{Context, Result, bail};
use tracing::{info, info_span};

use nimbus_cube::CubeKind;
use nimbus_ecc::{PercentileResampler, ProbabilityToPercentileConverter};

use crate::cli::PercentilesArgs;
use crate::config::NimbusConfig;
use crate::convert;
use crate::cube_io::{read_cube, write_cube};

/// Run the percentile conversion.
pub fn run(args: PercentilesArgs) -> Result<()> {
    let _cmd = info_span!("percentiles").entered();
    let config = NimbusConfig::load(args.config.as_deref())?;
    let conversion = convert::build_conversion_config(&config, &args)?;
    let request = convert::build_percentile_request(&args)?;

    let cube = read_cube(&args.input)?;
    let out = match cube.kind() {
        Some(CubeKind::Probability) => ProbabilityToPercentileConverter::new(conversion)?
            .process(&cube, request.as_ref()),
        Some(CubeKind::Percentile) => {
            PercentileResampler::new(conversion)?.process(&cube, request.as_ref())
        }
        Some(CubeKind::Realization) => {
            bail!("'{}' already holds realizations; use the realizations command", cube.name())
        }
        None => bail!("'{}' has no probabilistic axis to convert", cube.name()),
    }
    .with_context(|| format!("failed to convert '{}' to percentiles", cube.name()))?;
    info!(n_percentiles = out.leading_len(), "percentiles produced");

    write_cube(&args.output, &out)
}
