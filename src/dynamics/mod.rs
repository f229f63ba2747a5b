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

use crate::linalg::Matrix2;
use crate::TrackState;
use snafu::Snafu;

/// The simplified helical motion model in the bending plane.
pub mod helix;
pub use self::helix::HelixDynamics;

/// A trajectory model maps a track state from one longitudinal coordinate to another.
///
/// The longitudinal coordinate `x` is the independent variable of the model. Implementations must
/// be pure: the same inputs always yield the same outputs, and the Jacobian must be the exact
/// derivative of `propagate` with respect to the input state (it is evaluated at the input state and
/// must be recomputed on every call).
pub trait TrajectoryModel: Clone + Sync + Send {
    /// Propagates the provided state from `x_from` to `x_to` in a single step.
    fn propagate(
        &self,
        state: &TrackState,
        x_from: f64,
        x_to: f64,
    ) -> Result<TrackState, DynamicsError>;

    /// Returns the partial derivatives of `propagate` with respect to `(y, phi)`, evaluated at the input state.
    fn jacobian(
        &self,
        state: &TrackState,
        x_from: f64,
        x_to: f64,
    ) -> Result<Matrix2<f64>, DynamicsError>;

    /// Returns both the propagated state and the Jacobian of this step.
    fn propagate_with_jacobian(
        &self,
        state: &TrackState,
        x_from: f64,
        x_to: f64,
    ) -> Result<(TrackState, Matrix2<f64>), DynamicsError> {
        let jac = self.jacobian(state, x_from, x_to)?;
        let next = self.propagate(state, x_from, x_to)?;
        Ok((next, jac))
    }
}

#[derive(Debug, PartialEq, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum DynamicsError {
    /// The track angle is too close to transverse for the model.
    #[snafu(display(
        "track angle phi = {phi} rad at x = {x} cm is outside the model domain (|cos(phi)| = {cos_phi:e} < {epsilon:e})"
    ))]
    OutsideDomain {
        x: f64,
        phi: f64,
        cos_phi: f64,
        epsilon: f64,
    },
    #[snafu(display("state {state} at x = {x} cm is not finite"))]
    NonFiniteState { x: f64, state: TrackState },
    #[snafu(display("radius of curvature must be finite and positive, got {radius_cm} cm"))]
    InvalidRadius { radius_cm: f64 },
}
