use approx::assert_abs_diff_eq;
use helix_track::od::prelude::*;

/// Reference run: ten layers every 10 cm, `(y, phi) = (5, -0.2)`, 1 GeV in 1 T, 2 cm hit error,
/// 0.01 rad² angular process noise, seed zero.
fn reference_run() -> RunOutput {
    let cfg = RecoConfig::builder()
        .layer_positions((1..=10).map(|i| 10.0 * f64::from(i)).collect())
        .initial_state(TrackState::new(5.0, -0.2))
        .pt_gev(1.0)
        .b_tesla(1.0)
        .measurement_error_std(2.0)
        .process_noise_angle_var(0.01)
        .seed(0)
        .build();
    Scenario::new(cfg).unwrap().run().unwrap()
}

#[test]
fn seed_zero_regression() {
    crate::init_logger();
    let output = reference_run();

    // Sanity of the reference run itself
    assert_eq!(output.filtered.len(), 10);
    for (est, nominal) in output.estimates.iter().zip(output.nominal.iter()) {
        assert!(
            (est.state.y - nominal.y).abs() < 6.0 * est.sigma_y(),
            "{est} too far from {nominal}"
        );
    }

    assert_abs_diff_eq!(output.seed_estimate.state.y, 4.009270764299516, epsilon = 1e-12);
    assert_abs_diff_eq!(output.seed_estimate.state.phi, -0.2895024555425701, epsilon = 1e-12);

    let pinned = [
        (10.0, 4.799428945719328),
        (20.0, -0.35599400473532716),
        (30.0, 1.013486752944412),
        (40.0, -5.622765746194066),
        (50.0, -10.034142935846395),
        (60.0, -12.88250367263451),
        (70.0, -17.755463002113807),
        (80.0, -20.821648952062237),
        (90.0, -24.769745489731548),
        (100.0, -28.41302269837739),
    ];
    for (point, (x, y)) in output.filtered.iter().zip(pinned.iter()) {
        println!("{} {}", point.x, point.y);
        assert_eq!(point.x, *x);
        assert_abs_diff_eq!(point.y, *y, epsilon = 1e-9);
    }
}

#[test]
fn reference_run_is_stable() {
    assert_eq!(reference_run(), reference_run());
}
