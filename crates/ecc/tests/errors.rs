//! Error classification across the public nimbus-ecc API.

use ndarray::{ArrayD, IxDyn};
use nimbus_cube::{Cube, LeadingAxis, ThresholdAxis, ThresholdSense};
use nimbus_ecc::{
    Bounds, BoundsTable, ConversionConfig, EccError, ErrorKind, PercentileRequest,
    ProbabilityToPercentileConverter, RealizationsConfig, RealizationsOrchestrator, TieBreak,
};

fn wind_probabilities(probabilities: Vec<f64>) -> Cube {
    Cube::new(
        "probability_of_wind_speed_above_threshold",
        "1",
        Some(LeadingAxis::Threshold(ThresholdAxis::new(
            "wind_speed",
            "m s-1",
            vec![5.0, 10.0, 20.0],
            ThresholdSense::GreaterThan,
        ))),
        vec![],
        ArrayD::from_shape_vec(IxDyn(&[3]), probabilities).unwrap(),
    )
    .unwrap()
}

#[test]
fn configuration_errors() {
    let errors = [
        "first".parse::<TieBreak>().unwrap_err(),
        PercentileRequest::from_options(Some(3), Some(vec![50.0])).unwrap_err(),
        RealizationsOrchestrator::new(RealizationsConfig::new())
            .unwrap()
            .process(&wind_probabilities(vec![0.9, 0.5, 0.1]), None)
            .unwrap_err(),
        ProbabilityToPercentileConverter::new(
            ConversionConfig::new().with_bounds(BoundsTable::empty()),
        )
        .unwrap()
        .process(&wind_probabilities(vec![0.9, 0.5, 0.1]), None)
        .unwrap_err(),
    ];
    for e in errors {
        assert_eq!(e.kind(), ErrorKind::Configuration, "{e}");
    }
}

#[test]
fn validation_errors() {
    let converter = ProbabilityToPercentileConverter::new(ConversionConfig::new()).unwrap();
    let errors = [
        converter
            .process(&wind_probabilities(vec![0.1, 0.5, 0.9]), None)
            .unwrap_err(),
        converter
            .process(&wind_probabilities(vec![0.9, f64::NAN, 0.1]), None)
            .unwrap_err(),
    ];
    for e in errors {
        assert_eq!(e.kind(), ErrorKind::Validation, "{e}");
    }
}

#[test]
fn bounds_exceedance_carries_context() {
    let table = BoundsTable::empty().with_bounds("wind_speed", Bounds::new(0.0, 15.0, "m s-1"));
    let converter =
        ProbabilityToPercentileConverter::new(ConversionConfig::new().with_bounds(table)).unwrap();
    let err = converter
        .process(&wind_probabilities(vec![0.9, 0.5, 0.1]), None)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert_eq!(
        err.to_string(),
        "forecast values for 'wind_speed' span [5, 20] m s-1, outside the ECC bounds [0, 15] m s-1"
    );
}

#[test]
fn invalid_bounds_table_rejected_at_construction() {
    let table = BoundsTable::empty().with_bounds("wind_speed", Bounds::new(10.0, 0.0, "m s-1"));
    let result = ProbabilityToPercentileConverter::new(ConversionConfig::new().with_bounds(table));
    assert!(matches!(result, Err(EccError::InvalidBounds { .. })));
}
