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

use snafu::prelude::*;

pub use super::{CovarianceUpdate, FilterPhase};
use crate::dynamics::TrajectoryModel;
use crate::io::{ensure_noise, ensure_positive};
use crate::linalg::{Matrix2, RowVector2, Vector2};
pub use crate::od::estimate::{KfEstimate, Residual};
use crate::od::msr::Hit;
use crate::od::{
    HitLayerMismatchSnafu, ODConfigSnafu, ODDynamicsSnafu, ODError, OutOfSequenceSnafu,
    SingularInnovationSnafu,
};
use crate::TrackState;

/// Relative tolerance on the match between a hit position and the predicted layer position.
const LAYER_MATCH_TOL: f64 = 1e-9;

/// Defines both a Classical and an Extended Kalman filter (CKF and EKF) of the track state.
///
/// The filter linearizes the trajectory model around its own estimate at each layer: the Jacobian
/// of the propagation is evaluated at the previous estimate on every prediction. The measurement
/// is a direct observation of the transverse offset, `H = [1, 0]`.
#[derive(Debug, Clone)]
pub struct KF<D: TrajectoryModel> {
    pub dynamics: D,
    /// Process noise added to the predicted covariance at every layer, `Q = diag(0, q_phi)`
    pub process_noise: Matrix2<f64>,
    /// Measurement noise variance `R`
    pub msr_noise_var: f64,
    /// Form of the covariance measurement update
    pub covariance_update: CovarianceUpdate,
    prev_estimate: Option<KfEstimate>,
    phase: FilterPhase,
}

impl<D: TrajectoryModel> KF<D> {
    /// Initializes a new filter from the measurement error (one-sigma, in cm) and the angular
    /// process noise variance (rad²) added at every layer.
    pub fn new(
        dynamics: D,
        measurement_error_std: f64,
        process_noise_angle_var: f64,
    ) -> Result<Self, ODError> {
        ensure_noise("measurement error std", measurement_error_std).context(ODConfigSnafu)?;
        ensure_noise("process noise angle variance", process_noise_angle_var)
            .context(ODConfigSnafu)?;

        Ok(Self {
            dynamics,
            process_noise: Matrix2::from_diagonal(&Vector2::new(0.0, process_noise_angle_var)),
            msr_noise_var: measurement_error_std.powi(2),
            covariance_update: CovarianceUpdate::default(),
            prev_estimate: None,
            phase: FilterPhase::Uninitialized,
        })
    }

    /// Selects the form of the covariance measurement update.
    pub fn with_covariance_update(mut self, covariance_update: CovarianceUpdate) -> Self {
        self.covariance_update = covariance_update;
        self
    }

    /// Current phase of this filter
    pub fn phase(&self) -> FilterPhase {
        self.phase
    }

    /// Returns the previous estimate, if the filter was seeded.
    pub fn previous_estimate(&self) -> Option<&KfEstimate> {
        self.prev_estimate.as_ref()
    }

    fn ensure_phase(&self, action: &'static str, allowed: &[FilterPhase]) -> Result<(), ODError> {
        ensure!(
            allowed.contains(&self.phase),
            OutOfSequenceSnafu {
                action,
                phase: self.phase
            }
        );
        Ok(())
    }

    fn current(&self, action: &'static str) -> Result<KfEstimate, ODError> {
        self.prev_estimate.ok_or(ODError::OutOfSequence {
            action,
            phase: self.phase,
        })
    }

    /// Seeds the filter with its initial estimate. No measurement is consumed.
    pub fn seed(&mut self, initial_estimate: KfEstimate) -> Result<(), ODError> {
        self.ensure_phase("seed", &[FilterPhase::Uninitialized])?;
        ensure_positive("initial variance of y", initial_estimate.covar[(0, 0)])
            .context(ODConfigSnafu)?;
        ensure_positive("initial variance of phi", initial_estimate.covar[(1, 1)])
            .context(ODConfigSnafu)?;

        debug!("seeded with {initial_estimate}");
        self.prev_estimate = Some(initial_estimate);
        self.phase = FilterPhase::Seeded;
        Ok(())
    }

    /// Computes a time update/prediction to the provided layer position.
    ///
    /// The Jacobian is evaluated at the previous estimate, then the covariance is propagated as
    /// `P_bar = F⋅P⋅F^T + Q`.
    pub fn time_update(&mut self, x_to: f64) -> Result<KfEstimate, ODError> {
        self.ensure_phase("predict", &[FilterPhase::Seeded, FilterPhase::Updated])?;
        let prev = self.current("predict")?;

        let (state_bar, stm) = self
            .dynamics
            .propagate_with_jacobian(&prev.state, prev.x, x_to)
            .context(ODDynamicsSnafu)?;

        let covar_bar = stm * prev.covar * stm.transpose() + self.process_noise;

        let estimate = KfEstimate {
            x: x_to,
            state: state_bar,
            state_bar,
            covar: covar_bar,
            covar_bar,
            predicted: true,
            stm,
        };

        self.prev_estimate = Some(estimate);
        self.phase = FilterPhase::Predicted;
        Ok(estimate)
    }

    /// Computes the measurement update with the hit of the layer the filter was predicted to.
    ///
    /// Returns the updated estimate and the residual.
    pub fn measurement_update(&mut self, hit: &Hit) -> Result<(KfEstimate, Residual), ODError> {
        self.ensure_phase("update", &[FilterPhase::Predicted])?;
        let pred = self.current("update")?;

        ensure!(
            (hit.x - pred.x).abs() <= LAYER_MATCH_TOL * pred.x.abs().max(1.0),
            HitLayerMismatchSnafu {
                hit_x: hit.x,
                expected_x: pred.x
            }
        );

        let h_tilde = RowVector2::new(1.0, 0.0);
        let h_tilde_t = h_tilde.transpose();
        let covar_bar = pred.covar_bar;

        // Compute observation deviation (usually marked as y_i)
        let prefit = hit.y_measured - (h_tilde * pred.state_bar.to_vector())[0];

        // Innovation variance: state uncertainty plus measurement noise
        let innovation_var = (h_tilde * covar_bar * h_tilde_t)[0] + self.msr_noise_var;
        ensure!(
            innovation_var.is_finite() && innovation_var > 0.0,
            SingularInnovationSnafu {
                x: pred.x,
                innovation_var
            }
        );

        // Scalar measurement: the gain only needs the reciprocal of S.
        // A multi dimensional measurement would require a symmetric solve of S instead.
        let gain = covar_bar * h_tilde_t / innovation_var;

        let state = pred.state_bar + gain * prefit;

        let first_term = Matrix2::identity() - gain * h_tilde;
        let covar = match self.covariance_update {
            CovarianceUpdate::Standard => first_term * covar_bar,
            CovarianceUpdate::Joseph => {
                first_term * covar_bar * first_term.transpose()
                    + gain * self.msr_noise_var * gain.transpose()
            }
        };

        let estimate = KfEstimate {
            x: pred.x,
            state,
            state_bar: pred.state_bar,
            covar,
            covar_bar,
            predicted: false,
            stm: pred.stm,
        };

        let resid = Residual::new(
            hit,
            pred.state_bar.y,
            state.y,
            innovation_var,
            self.msr_noise_var,
        );

        debug!("{resid}");

        self.prev_estimate = Some(estimate);
        self.phase = FilterPhase::Updated;
        Ok((estimate, resid))
    }

    /// Closes the pass of this filter and returns its last estimate. Any further call is rejected.
    pub fn finish(&mut self) -> Result<KfEstimate, ODError> {
        self.ensure_phase("finish", &[FilterPhase::Seeded, FilterPhase::Updated])?;
        let last = self.current("finish")?;
        self.phase = FilterPhase::Done;
        Ok(last)
    }

    /// The current estimated state, if any.
    pub fn state(&self) -> Option<TrackState> {
        self.prev_estimate.map(|est| est.state)
    }
}
