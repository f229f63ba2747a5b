/*
    Helix Track, Kalman filter reconstruction of charged particle tracks
    Copyright (C) 2018-onwards Christopher Rabotin <christopher.rabotin@gmail.com>

    This program is free software: you can redistribute it and/or modify
    it under the terms of the GNU Affero General Public License as published
    by the Free Software Foundation, either version 3 of the License, or
    (at your option) any later version.

    This program is distributed in the hope that it will be useful,
    but WITHOUT ANY WARRANTY; without even the implied warranty of
    MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
    GNU Affero General Public License for more details.

    You should have received a copy of the GNU Affero General Public License
    along with this program.  If not, see <https://www.gnu.org/licenses/>.
*/

use super::{
    DynamicsError, InvalidRadiusSnafu, NonFiniteStateSnafu, OutsideDomainSnafu, TrajectoryModel,
};
use crate::linalg::{Matrix2, Vector2};
use crate::TrackState;
use hyperdual::{extract_jacobian_and_result, hyperspace_from_vector, Float, Hyperdual};
use snafu::ensure;
use std::fmt;

/// Default lower bound of |cos(phi)| below which the model refuses to propagate.
pub const DEFAULT_COS_PHI_EPSILON: f64 = 1e-6;

/// Transverse momentum (GeV) to radius of curvature (m) factor in a field of one Tesla, for a unit charge.
pub const GEV_TESLA_TO_M: f64 = 0.3;

/// Motion along a helix of fixed radius, projected on the bending plane and linearized per step.
///
/// For a step `dx = x_to - x_from`:
/// + `y' = y + dx⋅tan(phi)`
/// + `phi' = phi - (dx/R)/cos(phi)`
///
/// The model is only valid while the track stays away from the transverse direction, i.e. while
/// `|cos(phi)|` is above the configured epsilon.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct HelixDynamics {
    radius_cm: f64,
    pub cos_phi_epsilon: f64,
}

impl HelixDynamics {
    /// Initializes the dynamics from the radius of curvature in cm.
    pub fn new(radius_cm: f64) -> Result<Self, DynamicsError> {
        ensure!(
            radius_cm.is_finite() && radius_cm > 0.0,
            InvalidRadiusSnafu { radius_cm }
        );
        Ok(Self {
            radius_cm,
            cos_phi_epsilon: DEFAULT_COS_PHI_EPSILON,
        })
    }

    /// Initializes the dynamics from the transverse momentum in GeV and the magnetic field in Tesla,
    /// using `R = pt⋅100/(0.3⋅B)` in cm.
    pub fn from_momentum(pt_gev: f64, b_tesla: f64) -> Result<Self, DynamicsError> {
        Self::new(Self::radius_from_momentum(pt_gev, b_tesla))
    }

    /// Returns the radius of curvature in cm for this transverse momentum (GeV) and field (T)
    pub fn radius_from_momentum(pt_gev: f64, b_tesla: f64) -> f64 {
        (pt_gev * 100.0) / (GEV_TESLA_TO_M * b_tesla)
    }

    /// Sets the domain epsilon on |cos(phi)|.
    pub fn with_epsilon(mut self, cos_phi_epsilon: f64) -> Self {
        self.cos_phi_epsilon = cos_phi_epsilon;
        self
    }

    pub fn radius_cm(&self) -> f64 {
        self.radius_cm
    }

    /// Checks that the state may be propagated from `x` and returns its `cos(phi)`.
    fn check_domain(&self, state: &TrackState, x: f64) -> Result<f64, DynamicsError> {
        ensure!(
            state.is_finite() && x.is_finite(),
            NonFiniteStateSnafu { x, state: *state }
        );
        let cos_phi = state.phi.cos();
        ensure!(
            cos_phi.abs() >= self.cos_phi_epsilon,
            OutsideDomainSnafu {
                x,
                phi: state.phi,
                cos_phi,
                epsilon: self.cos_phi_epsilon
            }
        );
        Ok(cos_phi)
    }

    /// Propagates the state with hyperdual numbers, returning the propagated state and the
    /// Jacobian computed by automatic differentiation.
    pub fn dual_propagate(
        &self,
        state: &TrackState,
        x_from: f64,
        x_to: f64,
    ) -> Result<(TrackState, Matrix2<f64>), DynamicsError> {
        self.check_domain(state, x_from)?;

        let hyperstate: Vector2<Hyperdual<f64, 3>> = hyperspace_from_vector(&state.to_vector());
        let y = hyperstate[0];
        let phi = hyperstate[1];

        let delta_x = Hyperdual::<f64, 3>::from_real(x_to - x_from);
        let radius = Hyperdual::<f64, 3>::from_real(self.radius_cm);

        let next = Vector2::new(y + delta_x * phi.tan(), phi - (delta_x / radius) / phi.cos());

        let (fx, grad) = extract_jacobian_and_result::<_, 2, 2, 3>(&next);

        Ok((TrackState::from_vector(&fx), grad))
    }
}

impl TrajectoryModel for HelixDynamics {
    fn propagate(
        &self,
        state: &TrackState,
        x_from: f64,
        x_to: f64,
    ) -> Result<TrackState, DynamicsError> {
        let cos_phi = self.check_domain(state, x_from)?;
        let delta_x = x_to - x_from;

        Ok(TrackState {
            y: state.y + delta_x * state.phi.tan(),
            phi: state.phi - (delta_x / self.radius_cm) / cos_phi,
        })
    }

    fn jacobian(
        &self,
        state: &TrackState,
        x_from: f64,
        x_to: f64,
    ) -> Result<Matrix2<f64>, DynamicsError> {
        let cos_phi = self.check_domain(state, x_from)?;
        let delta_x = x_to - x_from;
        let tan_phi = state.phi.tan();

        // d(y')/d(phi) = dx⋅sec²(phi) and d(phi')/d(phi) = 1 - (dx/R)⋅sin(phi)/cos²(phi)
        Ok(Matrix2::new(
            1.0,
            delta_x * (1.0 + tan_phi.powi(2)),
            0.0,
            1.0 - (delta_x / self.radius_cm) * (state.phi.sin() / cos_phi.powi(2)),
        ))
    }
}

impl fmt::Display for HelixDynamics {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "helix (R = {:.3} cm, |cos(phi)| >= {:e})",
            self.radius_cm, self.cos_phi_epsilon
        )
    }
}
