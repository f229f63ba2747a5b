use approx::assert_abs_diff_eq;
use helix_track::linalg::Matrix2;
use helix_track::{HelixDynamics, TrackState, TrajectoryModel};
use rstest::*;

/// Central finite difference of the propagation with respect to the state.
fn finite_difference(
    dynamics: &HelixDynamics,
    state: &TrackState,
    x_from: f64,
    x_to: f64,
) -> Matrix2<f64> {
    let h = 1e-6;
    let mut jac = Matrix2::zeros();
    for j in 0..2 {
        let mut plus = state.to_vector();
        let mut minus = state.to_vector();
        plus[j] += h;
        minus[j] -= h;
        let f_plus = dynamics
            .propagate(&TrackState::from_vector(&plus), x_from, x_to)
            .unwrap()
            .to_vector();
        let f_minus = dynamics
            .propagate(&TrackState::from_vector(&minus), x_from, x_to)
            .unwrap()
            .to_vector();
        jac.set_column(j, &((f_plus - f_minus) / (2.0 * h)));
    }
    jac
}

#[rstest]
#[case(5.0, -0.2, 0.0, 10.0, 1000.0 / 3.0)]
#[case(0.0, 0.0, 10.0, 20.0, 1000.0 / 3.0)]
#[case(-3.0, 0.5, 0.0, 5.0, 100.0)]
#[case(12.0, -1.0, 30.0, 50.0, 1000.0)]
#[case(1.0, 1.3, 0.0, 1.0, 50.0)]
#[case(2.0, 0.3, 20.0, 10.0, 1000.0 / 3.0)]
fn jacobian_matches_finite_difference(
    #[case] y: f64,
    #[case] phi: f64,
    #[case] x_from: f64,
    #[case] x_to: f64,
    #[case] radius_cm: f64,
) {
    let dynamics = HelixDynamics::new(radius_cm).unwrap();
    let state = TrackState::new(y, phi);

    let jac = dynamics.jacobian(&state, x_from, x_to).unwrap();
    let fd_jac = finite_difference(&dynamics, &state, x_from, x_to);

    println!("analytic: {jac}finite difference: {fd_jac}");
    assert_abs_diff_eq!(jac, fd_jac, epsilon = 1e-6 * (1.0 + jac.abs().max()));

    // The offset never feeds back into the dynamics
    assert_eq!(jac[(0, 0)], 1.0);
    assert_eq!(jac[(1, 0)], 0.0);
}

#[rstest]
#[case(-0.2)]
#[case(0.7)]
#[case(-1.4)]
fn jacobian_matches_autodiff(#[case] phi: f64) {
    let dynamics = HelixDynamics::from_momentum(2.5, 2.0).unwrap();
    let state = TrackState::new(-4.0, phi);
    let jac = dynamics.jacobian(&state, 15.0, 25.0).unwrap();
    let (dual_state, dual_jac) = dynamics.dual_propagate(&state, 15.0, 25.0).unwrap();
    let next = dynamics.propagate(&state, 15.0, 25.0).unwrap();

    assert_abs_diff_eq!(jac, dual_jac, epsilon = 1e-10 * (1.0 + jac.abs().max()));
    assert_abs_diff_eq!(next.y, dual_state.y, epsilon = 1e-12);
    assert_abs_diff_eq!(next.phi, dual_state.phi, epsilon = 1e-12);
}

#[test]
fn jacobian_is_evaluated_at_input_state() {
    let dynamics = HelixDynamics::from_momentum(1.0, 1.0).unwrap();
    let state_a = TrackState::new(5.0, -0.2);
    let state_b = TrackState::new(5.0, 0.4);
    let jac_a = dynamics.jacobian(&state_a, 0.0, 10.0).unwrap();
    let jac_b = dynamics.jacobian(&state_b, 0.0, 10.0).unwrap();
    assert_ne!(jac_a, jac_b);
    // Same state, same step: same Jacobian wherever the step starts
    assert_eq!(jac_a, dynamics.jacobian(&state_a, 40.0, 50.0).unwrap());
}
