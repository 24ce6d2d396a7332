//! End-to-end alignment scenarios through the public API.

use ndarray::Array2;
use u_geoalign::ga::GaConfig;
use u_geoalign::{
    correct, distance, optimize, perform_distance, sample, AlignConfig, AlignError, Bounds,
    Correction, DistanceMethod, GeoTransform, LossConfig, LossStatus, Offset, PointSample,
    RasterSurface, Statistic,
};

fn constant_surface() -> RasterSurface {
    RasterSurface::filled(10, 10, 100.0, GeoTransform::new(0.0, 10.0, 1.0, -1.0))
}

fn constant_points() -> Vec<PointSample> {
    vec![
        PointSample::new("a", 1.5, 8.5).with_attribute("elev", 100.0),
        PointSample::new("b", 4.5, 4.5).with_attribute("elev", 100.0),
        PointSample::new("c", 8.5, 2.5).with_attribute("elev", 100.0),
    ]
}

#[test]
fn constant_raster_degenerate_bounds_gives_zero_offset() {
    let config = AlignConfig::default()
        .with_loss(
            LossConfig::default()
                .with_buffer_radius(0.0)
                .with_method(DistanceMethod::Euclidean)
                .with_measurement("elev"),
        )
        .with_bounds(Bounds::new([0.0, 0.0], [0.0, 0.0]))
        .with_ga(GaConfig::default().with_population_size(10).with_max_generations(5));

    let result = optimize(&constant_points(), &constant_surface(), &config).unwrap();
    assert_eq!(result.offset, Offset::ZERO);
    assert_eq!(result.loss, 0.0);
}

#[test]
fn identical_sequences_have_zero_distance() {
    let a = [1.0, 2.0, 3.0];
    for method in [
        DistanceMethod::Euclidean,
        DistanceMethod::Manhattan,
        DistanceMethod::Correlation,
    ] {
        let d = distance(&a, &a, method).unwrap();
        assert!(d.abs() < 1e-12, "{method}: {d}");
    }
}

#[test]
fn unknown_names_are_invalid_arguments() {
    assert!(matches!(
        "cosine".parse::<DistanceMethod>(),
        Err(AlignError::InvalidArgument { name: "method", .. })
    ));
    assert!(matches!(
        "mode".parse::<Statistic>(),
        Err(AlignError::InvalidArgument { name: "statistic", .. })
    ));
}

#[test]
fn buffer_zero_returns_cell_value_for_every_statistic() {
    let data = Array2::from_shape_fn((5, 5), |(r, c)| (r * 5 + c) as f64);
    let surface = RasterSurface::new(data, GeoTransform::new(0.0, 5.0, 1.0, -1.0), None);
    for statistic in [
        Statistic::Mean,
        Statistic::Median,
        Statistic::Min,
        Statistic::Max,
        Statistic::Sum,
    ] {
        // x = 2.5 -> col 2, y = 3.5 -> row 1
        let value = sample(&surface, 2.5, 3.5, 0.0, statistic).unwrap();
        assert_eq!(value, Ok(7.0), "{statistic}");
    }
}

#[test]
fn empty_set_through_correction_is_unchanged() {
    let config = AlignConfig::default()
        .with_loss(LossConfig::default().with_measurement("elev"));
    let correction = correct(&[], &constant_surface(), &config);

    assert!(!correction.is_success());
    match &correction {
        Correction::Unchanged { points, reason } => {
            assert!(points.is_empty());
            assert_eq!(reason, &AlignError::EmptyInput);
        }
        other => panic!("unexpected {other:?}"),
    }
    assert!(!correction.report().success);
}

#[test]
fn same_seed_same_correction() {
    let data = Array2::from_shape_fn((60, 60), |(r, c)| {
        let (r, c) = (r as f64, c as f64);
        (r * 0.2).sin() * 10.0 + (c * 0.15).cos() * 8.0
    });
    let surface = RasterSurface::new(data, GeoTransform::new(0.0, 60.0, 1.0, -1.0), None);
    let points: Vec<PointSample> = (0..12)
        .map(|i| {
            let (x, y) = (15.0 + 2.5 * i as f64, 20.0 + 1.5 * i as f64);
            let truth = sample(&surface, x + 2.0, y - 1.0, 0.0, Statistic::Mean)
                .unwrap()
                .unwrap();
            PointSample::new(format!("p{i}"), x, y).with_attribute("elev", truth)
        })
        .collect();
    let config = AlignConfig::default()
        .with_loss(LossConfig::default().with_buffer_radius(2.0).with_measurement("elev"))
        .with_bounds(Bounds::symmetric(5.0))
        .with_ga(GaConfig::default().with_population_size(20).with_max_generations(10));

    let a = correct(&points, &surface, &config);
    let b = correct(&points, &surface, &config);
    assert!(a.is_success());
    assert_eq!(a, b);
}

#[test]
fn no_overlap_scores_no_valid_data() {
    let points = vec![PointSample::new("far", 500.0, 500.0).with_attribute("elev", 100.0)];
    let config = LossConfig::default().with_measurement("elev");
    assert_eq!(
        perform_distance(&points, &constant_surface(), &config).unwrap(),
        u_geoalign::NO_VALID_DATA_LOSS
    );

    let evaluation =
        u_geoalign::evaluate_loss(&points, &constant_surface(), Offset::ZERO, &config).unwrap();
    assert_eq!(evaluation.status, LossStatus::NoValidData);
    assert_eq!(evaluation.nodata_count, 1);
}

#[cfg(feature = "serde")]
#[test]
fn config_round_trips_through_json() {
    let config = AlignConfig::default()
        .with_loss(
            LossConfig::default()
                .with_statistic(Statistic::Median)
                .with_method(DistanceMethod::Hausdorff)
                .with_measurement("elev"),
        )
        .with_bounds(Bounds::new([-5.0, -2.0], [5.0, 8.0]));
    let json = serde_json::to_string(&config).unwrap();
    let back: AlignConfig = serde_json::from_str(&json).unwrap();
    assert_eq!(back, config);
}
