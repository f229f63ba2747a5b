use approx::assert_abs_diff_eq;
use helix_track::od::prelude::*;
use helix_track::utils::{is_positive_semidefinite, is_symmetric};
use rstest::*;

#[rstest]
fn covariance_stays_psd(
    #[values(0, 1, 7, 42, 1234)] seed: u128,
    #[values(CovarianceUpdate::Standard, CovarianceUpdate::Joseph)]
    covariance_update: CovarianceUpdate,
) {
    crate::init_logger();
    let cfg = RecoConfig::builder()
        .seed(seed)
        .covariance_update(covariance_update)
        .build();
    let output = Scenario::new(cfg).unwrap().run().unwrap();

    assert_eq!(output.estimates.len(), 10);
    for est in &output.estimates {
        assert!(!est.predicted);
        assert!(is_symmetric(&est.covar, 1e-9), "{est}");
        assert!(is_positive_semidefinite(&est.covar, 1e-9), "{est}");
        assert!(is_positive_semidefinite(&est.covar_bar, 1e-9), "{est}");
        // An update never increases the uncertainty of the measured offset
        assert!(est.covar[(0, 0)] <= est.covar_bar[(0, 0)]);
    }
}

#[test]
fn zero_noise_first_layers_are_exact() {
    crate::init_logger();
    // Both noises at zero: the state is fully known after two layers and the covariance collapses,
    // so only the layers before the collapse are processed.
    let cfg = RecoConfig::builder()
        .layer_positions(vec![10.0, 20.0])
        .measurement_error_std(0.0)
        .process_noise_angle_var(0.0)
        .seed_perturbation_std(StateDiag::new(0.0, 0.0))
        .build();
    let output = Scenario::new(cfg).unwrap().run().unwrap();
    assert_eq!(output.seed_estimate.state, TrackState::new(5.0, -0.2));
    for (est, nominal) in output.estimates.iter().zip(output.nominal.iter()) {
        assert_abs_diff_eq!(est.state.y, nominal.y, epsilon = 1e-12);
        assert_abs_diff_eq!(est.state.phi, nominal.phi, epsilon = 1e-12);
    }
}

#[test]
fn zero_noise_collapse_is_singular() {
    let cfg = RecoConfig::builder()
        .measurement_error_std(0.0)
        .process_noise_angle_var(0.0)
        .seed_perturbation_std(StateDiag::new(0.0, 0.0))
        .build();
    match Scenario::new(cfg).unwrap().run() {
        Err(ODError::SingularInnovation { x, .. }) => assert!(x > 20.0, "failed at {x}"),
        other => panic!("expected a singular innovation, got {other:?}"),
    }
}

#[test]
fn zero_noise_convergence() {
    crate::init_logger();
    let cfg = RecoConfig::builder()
        .measurement_error_std(1e-6)
        .process_noise_angle_var(0.0)
        .seed_perturbation_std(StateDiag::new(0.0, 0.0))
        .build();
    let output = Scenario::new(cfg).unwrap().run().unwrap();
    for (point, nominal) in output.filtered.iter().zip(output.nominal.iter()) {
        println!("{point} vs {}", nominal.y);
        assert_abs_diff_eq!(point.y, nominal.y, epsilon = 1e-5);
    }
    for est in &output.estimates {
        assert!(est.sigma_y() < 1e-5);
    }
}

#[test]
fn single_layer_ends_in_done() {
    let geometry = DetectorGeometry::new(&[25.0]).unwrap();
    let mut kf = KF::new(HelixDynamics::from_momentum(1.0, 1.0).unwrap(), 2.0, 0.01).unwrap();
    kf.seed(KfEstimate::from_diag(
        0.0,
        TrackState::new(5.0, -0.2),
        StateDiag::new(100.0, 1.0),
    ))
    .unwrap();

    let mut fit = TrackFit::new(kf, &geometry);
    fit.process_hits(&[Hit::new(0, 25.0, 0.0)]).unwrap();
    assert_eq!(fit.estimates.len(), 1);
    assert_eq!(fit.residuals.len(), 1);
    assert_eq!(fit.kf.phase(), FilterPhase::Done);
    assert!(matches!(
        fit.kf.time_update(30.0),
        Err(ODError::OutOfSequence { .. })
    ));
    assert!(matches!(
        fit.kf.measurement_update(&Hit::new(0, 25.0, 0.0)),
        Err(ODError::OutOfSequence { .. })
    ));

    // Same through a full scenario
    let cfg = RecoConfig::builder().layer_positions(vec![25.0]).build();
    let output = Scenario::new(cfg).unwrap().run().unwrap();
    assert_eq!(output.hits.len(), 1);
    assert_eq!(output.filtered.len(), 1);
    assert_eq!(output.truth.len(), 50);
}

#[test]
fn same_seed_same_output() {
    let scenario = Scenario::new(crate::reference_config()).unwrap();
    let first = scenario.run().unwrap();
    let second = scenario.run().unwrap();
    assert_eq!(first, second);

    let other = Scenario::new(RecoConfig::builder().seed(1).build())
        .unwrap()
        .run()
        .unwrap();
    assert_ne!(first.hits, other.hits);
    assert_ne!(first.filtered, other.filtered);
    // The truth does not depend on the random source
    assert_eq!(first.truth, other.truth);
}

#[test]
fn draw_order() {
    // Hits first, then the offset and the angle of the seed
    let cfg = crate::reference_config();
    let output = Scenario::new(cfg.clone()).unwrap().run().unwrap();

    let geometry = cfg.geometry().unwrap();
    let mut rng = seeded_rng(cfg.seed);
    let hits = cfg
        .hit_simulator()
        .unwrap()
        .generate(cfg.initial_state, &geometry, &mut rng)
        .unwrap();
    let y = rng.gaussian(cfg.initial_state.y, cfg.seed_perturbation_std.y);
    let phi = rng.gaussian(cfg.initial_state.phi, cfg.seed_perturbation_std.phi);

    assert_eq!(output.hits, hits);
    assert_eq!(output.seed_estimate.state, TrackState::new(y, phi));
    assert_eq!(output.seed_estimate.covar, StateDiag::new(100.0, 1.0).to_matrix());
}

#[test]
fn output_layout() {
    let output = Scenario::new(crate::reference_config())
        .unwrap()
        .run()
        .unwrap();
    assert_eq!(output.layers, (1..=10).map(|i| 10.0 * f64::from(i)).collect::<Vec<f64>>());
    assert_eq!(output.truth.len(), 200);
    assert_eq!(output.hits.len(), 10);
    assert_eq!(output.filtered.len(), 10);
    assert_eq!(output.residuals.len(), 10);
    for (i, ((hit, point), resid)) in output
        .hits
        .iter()
        .zip(output.filtered.iter())
        .zip(output.residuals.iter())
        .enumerate()
    {
        assert_eq!(hit.layer_index, i);
        assert_eq!(point.x, hit.x);
        assert_eq!(resid.x, hit.x);
        assert_abs_diff_eq!(resid.ratio, resid.prefit.powi(2) / resid.innovation_var);
        assert_eq!(resid.msr_noise_var, 4.0);
    }
}

#[test]
fn invalid_configuration_is_rejected_before_running() {
    let cfg = RecoConfig::builder()
        .layer_positions(vec![30.0, 20.0])
        .build();
    assert!(matches!(
        Scenario::new(cfg.clone()),
        Err(ODError::ODConfigError { .. })
    ));
    // Even when bypassing the checked constructor
    assert!(matches!(
        Scenario { config: cfg }.run(),
        Err(ODError::ODConfigError { .. })
    ));
}

#[test]
fn domain_error_aborts_run() {
    // The model refuses angles beyond 0.45 rad, which the track reaches before the last layer
    let cfg = RecoConfig::builder().cos_phi_epsilon(0.9).build();
    let result = Scenario::new(cfg).unwrap().run();
    assert!(
        matches!(
            result,
            Err(ODError::ODPropError { .. }) | Err(ODError::ODDynamicsError { .. })
        ),
        "{result:?}"
    );
}
