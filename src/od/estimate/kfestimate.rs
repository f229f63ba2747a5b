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

use crate::od::noise::RandomSource;
use crate::io::{ensure_noise, ensure_positive, ConfigError};
use crate::linalg::{Matrix2, Vector2};
use crate::{StateDiag, TrackPoint, TrackState};
use serde_derive::{Deserialize, Serialize};
use std::fmt;

/// Kalman filter Estimate at a given layer position.
///
/// After a time update, `state` and `covar` hold the prediction. After a measurement update, they
/// hold the posterior while `state_bar` and `covar_bar` keep the prediction they were computed from.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct KfEstimate {
    /// Longitudinal coordinate of this estimate, in cm
    pub x: f64,
    /// The estimated state
    pub state: TrackState,
    /// The predicted state from the time update
    pub state_bar: TrackState,
    /// The Covariance of this estimate
    pub covar: Matrix2<f64>,
    /// The predicted covariance of this estimate
    pub covar_bar: Matrix2<f64>,
    /// Whether or not this is a predicted estimate from a time update, or an estimate from a measurement
    pub predicted: bool,
    /// The Jacobian of the propagation used to compute this Estimate
    pub stm: Matrix2<f64>,
}

impl KfEstimate {
    /// Initializes a new filter estimate from the state and its covariance.
    pub fn from_covar(x: f64, state: TrackState, covar: Matrix2<f64>) -> Self {
        Self {
            x,
            state,
            state_bar: state,
            covar,
            covar_bar: covar,
            predicted: true,
            stm: Matrix2::identity(),
        }
    }

    /// Initializes a new filter estimate from the state and the diagonal of its covariance.
    pub fn from_diag(x: f64, state: TrackState, diag: StateDiag) -> Self {
        Self::from_covar(x, state, diag.to_matrix())
    }

    /// Builds the imperfect seed of the filter: the nominal state dispersed by the provided one-sigma
    /// values, with a diagonal covariance.
    ///
    /// The offset is drawn first, then the angle. Zero sigmas leave the state unchanged, but the
    /// covariance diagonal must be strictly positive.
    pub fn disperse_from_diag<R: RandomSource + ?Sized>(
        x: f64,
        nominal_state: TrackState,
        sigmas: StateDiag,
        covar_diag: StateDiag,
        rng: &mut R,
    ) -> Result<Self, ConfigError> {
        ensure_noise("seed perturbation std of y", sigmas.y)?;
        ensure_noise("seed perturbation std of phi", sigmas.phi)?;
        ensure_positive("initial variance of y", covar_diag.y)?;
        ensure_positive("initial variance of phi", covar_diag.phi)?;

        let y = rng.gaussian(nominal_state.y, sigmas.y);
        let phi = rng.gaussian(nominal_state.phi, sigmas.phi);
        let dispersed = TrackState::new(y, phi);

        debug!("seed {dispersed} dispersed from {nominal_state}");

        Ok(Self::from_diag(x, dispersed, covar_diag))
    }

    /// The one-sigma uncertainty of the transverse offset, in cm.
    pub fn sigma_y(&self) -> f64 {
        self.covar[(0, 0)].sqrt()
    }

    /// The one-sigma uncertainty of the track angle, in radians.
    pub fn sigma_phi(&self) -> f64 {
        self.covar[(1, 1)].sqrt()
    }

    /// The error of this estimate with respect to the provided reference state.
    pub fn state_error(&self, reference: &TrackState) -> Vector2<f64> {
        self.state - *reference
    }

    /// Returns whether the reference state is within some bound of this estimate.
    /// The 68-95-99.7 rule is a good way to assess whether the filter is operating normally
    pub fn within_sigma(&self, reference: &TrackState, sigma: f64) -> bool {
        let err = self.state_error(reference);
        for i in 0..2 {
            let bound = self.covar[(i, i)].sqrt() * sigma;
            if err[i] > bound || err[i] < -bound {
                return false;
            }
        }
        true
    }

    /// Returns whether the reference state is within 3 sigma, which represent 99.7% for a Normal distribution
    pub fn within_3sigma(&self, reference: &TrackState) -> bool {
        self.within_sigma(reference, 3.0)
    }

    /// The estimated transverse offset at this layer.
    pub fn point(&self) -> TrackPoint {
        TrackPoint::new(self.x, self.state.y)
    }
}

impl fmt::Display for KfEstimate {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let word = if self.predicted {
            "Prediction"
        } else {
            "Estimate"
        };
        write!(
            f,
            "=== {} @ x = {} cm ===\nstate {}\nsigmas [{:e}, {:e}]\n",
            word,
            self.x,
            self.state,
            self.sigma_y(),
            self.sigma_phi()
        )
    }
}

impl fmt::LowerExp for KfEstimate {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "=== PREDICTED: {} ===\nEstState {} Covariance {:e}\n=====================",
            &self.predicted, &self.state, &self.covar
        )
    }
}
