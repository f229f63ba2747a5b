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

use crate::od::estimate::KfEstimate;
use crate::od::{ODError, TooFewMeasurementsSnafu};
use snafu::ensure;

/// Smooths the provided filtered estimates with a Rauch-Tung-Striebel fixed interval smoother.
///
/// Estimates must be measurement updates in layer order, as returned by a track fit: each one
/// stores the prediction and the Jacobian that led to it from the previous estimate. The last
/// estimate is already optimal given all hits and is kept as is, every other one is smoothed
/// backward from the next one:
///
/// `C_k = P_k⋅F_{k+1}^T⋅P_bar_{k+1}^-1`
/// `x_k|n = x_k + C_k⋅(x_{k+1}|n - x_bar_{k+1})`
/// `P_k|n = P_k + C_k⋅(P_{k+1}|n - P_bar_{k+1})⋅C_k^T`
pub fn rts_smooth(estimates: &[KfEstimate]) -> Result<Vec<KfEstimate>, ODError> {
    ensure!(
        !estimates.is_empty(),
        TooFewMeasurementsSnafu {
            need: 1_usize,
            action: "smoothing"
        }
    );

    info!("Smoothing {} estimates", estimates.len());

    let mut smoothed = Vec::with_capacity(estimates.len());
    // The very last estimate cannot be smoothed
    let mut sm_est_kp1 = estimates[estimates.len() - 1];
    smoothed.push(sm_est_kp1);

    for k in (0..estimates.len() - 1).rev() {
        let est_k = &estimates[k];
        let est_kp1 = &estimates[k + 1];

        let covar_bar_inv =
            est_kp1
                .covar_bar
                .try_inverse()
                .ok_or(ODError::SingularCovariance {
                    x: est_kp1.x,
                    action: "smooth",
                })?;

        let gain = est_k.covar * est_kp1.stm.transpose() * covar_bar_inv;

        let mut sm_est_k = *est_k;
        sm_est_k.state = est_k.state + gain * (sm_est_kp1.state - est_kp1.state_bar);
        sm_est_k.covar =
            est_k.covar + gain * (sm_est_kp1.covar - est_kp1.covar_bar) * gain.transpose();

        smoothed.push(sm_est_k);
        sm_est_kp1 = sm_est_k;
    }

    // And reverse to maintain the order of estimates
    smoothed.reverse();
    Ok(smoothed)
}
