//! Realizations command: convert a cube to ensemble realizations.

use anyhow::{Context, Result};
use tracing::{info, info_span};

use nimbus_ecc::RealizationsOrchestrator;

use crate::cli::RealizationsArgs;
use crate::config::NimbusConfig;
use crate::convert;
use crate::cube_io::{read_cube, write_cube};

/// Run the realizations conversion.
pub fn run(args: RealizationsArgs) -> Result<()> {
    let _cmd = info_span!("realizations").entered();
    // 1. Config file, then CLI overrides
    let config = NimbusConfig::load(args.config.as_deref())?;
    let ecc_cfg = convert::build_realizations_config(&config, &args)?;

    // 2. Inputs
    let cube = read_cube(&args.input)?;
    let raw = args.raw.as_deref().map(read_cube).transpose()?;

    // 3. Convert
    let orchestrator = RealizationsOrchestrator::new(ecc_cfg)?;
    let out = orchestrator
        .process(&cube, raw.as_ref())
        .with_context(|| format!("failed to convert '{}' to realizations", cube.name()))?;
    info!(n_realizations = out.leading_len(), "realizations produced");

    // 4. Output
    write_cube(&args.output, &out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{ArrayD, IxDyn};
    use nimbus_cube::{Cube, CubeKind, LeadingAxis, ThresholdAxis, ThresholdSense};

    fn args(dir: &std::path::Path) -> RealizationsArgs {
        RealizationsArgs {
            input: dir.join("probabilities.json"),
            raw: None,
            output: dir.join("realizations.json"),
            config: None,
            realizations_count: Some(3),
            random_seed: Some(0),
            tie_break: None,
            ignore_ecc_bounds_exceedance: false,
            skip_ecc_bounds: false,
        }
    }

    fn write_probabilities(path: &std::path::Path) {
        let cube = Cube::new(
            "probability_of_air_temperature_above_threshold",
            "1",
            Some(LeadingAxis::Threshold(ThresholdAxis::new(
                "air_temperature",
                "K",
                vec![275.0, 275.5, 276.0, 276.5],
                ThresholdSense::GreaterThan,
            ))),
            vec![],
            ArrayD::from_shape_vec(IxDyn(&[4]), vec![1.0, 0.8, 0.6, 0.2]).unwrap(),
        )
        .unwrap();
        write_cube(path, &cube).unwrap();
    }

    #[test]
    fn probabilities_file_to_realizations_file() {
        let dir = tempfile::tempdir().unwrap();
        let args = args(dir.path());
        write_probabilities(&args.input);
        let output = args.output.clone();

        run(args).unwrap();

        let out = read_cube(&output).unwrap();
        assert_eq!(out.kind(), Some(CubeKind::Realization));
        assert_eq!(out.realization_points(), Some(&[0, 1, 2][..]));
    }

    #[test]
    fn config_file_supplies_count() {
        let dir = tempfile::tempdir().unwrap();
        let mut args = args(dir.path());
        args.realizations_count = None;
        let config = dir.path().join("nimbus.toml");
        std::fs::write(&config, "[ecc]\nrealizations_count = 5\n").unwrap();
        args.config = Some(config);
        write_probabilities(&args.input);
        let output = args.output.clone();

        run(args).unwrap();
        assert_eq!(read_cube(&output).unwrap().leading_len(), 5);
    }

    #[test]
    fn missing_input_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let args = args(dir.path());
        let err = run(args).unwrap_err();
        assert!(format!("{err:#}").contains("probabilities.json"));
    }
}
