use approx::assert_abs_diff_eq;
use helix_track::od::msr::Hit;
use helix_track::od::noise::WhiteNoise;
use helix_track::od::simulator::HitSimulator;
use helix_track::propagators::{PropOpts, PropagationError, Propagator};
use helix_track::{DetectorGeometry, HelixDynamics, TrackState};
use rand_pcg::Pcg64Mcg;

#[test]
fn truth_path_reference_scenario() {
    crate::init_logger();
    let cfg = crate::reference_config();
    let geometry = cfg.geometry().unwrap();
    let prop = cfg.propagator().unwrap();
    let truth = prop.truth(cfg.initial_state, &geometry).unwrap();

    // 20 steps of 0.5 cm between consecutive layers, the origin is not part of the path
    assert_eq!(truth.len(), 200);
    assert_abs_diff_eq!(truth[0].x, 0.5);
    assert_abs_diff_eq!(truth[0].y, 5.0 + 0.5 * (-0.2_f64).tan(), epsilon = 1e-12);
    assert_eq!(truth.last().unwrap().x, 100.0);

    // The path lands on every layer and matches the fine propagation to that layer
    for layer_x in geometry.iter() {
        let point = truth.iter().find(|pt| pt.x == layer_x).unwrap();
        let state = prop.until_x(cfg.initial_state, 0.0, layer_x).unwrap();
        assert_abs_diff_eq!(point.y, state.y, epsilon = 1e-9);
    }

    // Strictly increasing x, finite values
    assert!(truth.windows(2).all(|pair| pair[1].x > pair[0].x));
    assert!(truth.iter().all(|pt| pt.y.is_finite()));
}

#[test]
fn truth_and_hits_use_different_discretizations() {
    let cfg = crate::reference_config();
    let geometry = cfg.geometry().unwrap();
    let truth = cfg
        .propagator()
        .unwrap()
        .truth(cfg.initial_state, &geometry)
        .unwrap();
    let nominal = cfg
        .hit_simulator()
        .unwrap()
        .nominal_states(cfg.initial_state, &geometry)
        .unwrap();

    for (layer_x, state) in geometry.iter().zip(nominal.iter()) {
        let truth_y = truth.iter().find(|pt| pt.x == layer_x).unwrap().y;
        // Close, but not identical: one step per layer is coarser than the truth steps
        let diff = (truth_y - state.y).abs();
        assert!(diff < 3.0, "difference of {diff} cm at x = {layer_x}");
    }
    let last_truth = truth.last().unwrap().y;
    assert_ne!(last_truth, nominal.last().unwrap().y);
}

#[test]
fn coarse_truth_step_still_lands_on_layers() {
    crate::init_logger();
    // A step larger than the spacing only produces a warning
    let dynamics = HelixDynamics::from_momentum(1.0, 1.0).unwrap();
    let prop = Propagator::new(dynamics, PropOpts::with_fixed_step(15.0).unwrap());
    let geometry = DetectorGeometry::equally_spaced(10.0, 10.0, 3).unwrap();
    let truth = prop.truth(TrackState::new(0.0, 0.1), &geometry).unwrap();
    let xs = truth.iter().map(|pt| pt.x).collect::<Vec<f64>>();
    assert_eq!(xs, vec![10.0, 20.0, 30.0]);
}

#[test]
fn truth_outside_domain() {
    // The track bends past the accepted angle before reaching the last layer
    let dynamics = HelixDynamics::from_momentum(1.0, 1.0)
        .unwrap()
        .with_epsilon(0.9);
    let prop = Propagator::default(dynamics);
    let geometry = DetectorGeometry::equally_spaced(10.0, 10.0, 10).unwrap();
    assert!(matches!(
        prop.truth(TrackState::new(5.0, -0.2), &geometry),
        Err(PropagationError::Dynamics { .. })
    ));
}

#[test]
fn hits_are_reproducible() {
    let cfg = crate::reference_config();
    let geometry = cfg.geometry().unwrap();
    let sim = cfg.hit_simulator().unwrap();

    let hits = sim
        .generate(cfg.initial_state, &geometry, &mut Pcg64Mcg::new(0))
        .unwrap();
    let again = sim
        .generate(cfg.initial_state, &geometry, &mut Pcg64Mcg::new(0))
        .unwrap();
    assert_eq!(hits, again);
    assert_eq!(hits.len(), 10);
    assert!(hits.iter().enumerate().all(|(i, hit)| hit.layer_index == i));

    // Hits scatter around the nominal offsets at the measurement error
    let nominal = sim.nominal_states(cfg.initial_state, &geometry).unwrap();
    let max_dev = hits
        .iter()
        .zip(nominal.iter())
        .map(|(hit, state): (&Hit, &TrackState)| (hit.y_measured - state.y).abs())
        .fold(0.0, f64::max);
    assert!(max_dev > 0.0);
    assert!(max_dev < 6.0 * cfg.measurement_error_std);
}

#[test]
fn noiseless_hits() {
    let geometry = DetectorGeometry::new(&[1.0, 2.0, 4.0, 8.0]).unwrap();
    let sim = HitSimulator::new(
        HelixDynamics::from_momentum(1.0, 1.0).unwrap(),
        WhiteNoise::zero(),
    );
    let initial = TrackState::new(0.0, 0.2);
    let hits = sim
        .generate(initial, &geometry, &mut Pcg64Mcg::new(99))
        .unwrap();
    let nominal = sim.nominal_states(initial, &geometry).unwrap();
    for (hit, state) in hits.iter().zip(nominal.iter()) {
        assert_eq!(hit.y_measured, state.y);
    }
}
