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

use crate::od::msr::Hit;
use serde_derive::{Deserialize, Serialize};
use std::fmt;

/// Stores the residual of a measurement update at one layer.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct Residual {
    /// Index of the layer of this residual
    pub layer_index: usize,
    /// Layer position, in cm
    pub x: f64,
    /// The prefit residual (innovation): measured offset minus the predicted offset, in cm
    pub prefit: f64,
    /// The postfit residual: measured offset minus the updated offset, in cm
    pub postfit: f64,
    /// The prefit residual ratio computed as the squared Mahalanobis distance, `r² / S`, always positive.
    /// It follows a chi-square distribution of one degree of freedom when the filter is consistent.
    pub ratio: f64,
    /// The innovation variance `S = H⋅P⋅H^T + R`
    pub innovation_var: f64,
    /// The measurement noise variance `R`
    pub msr_noise_var: f64,
}

impl Residual {
    /// Builds the residual of a hit from the predicted and updated offsets.
    pub fn new(
        hit: &Hit,
        predicted_y: f64,
        updated_y: f64,
        innovation_var: f64,
        msr_noise_var: f64,
    ) -> Self {
        let prefit = hit.y_measured - predicted_y;
        Self {
            layer_index: hit.layer_index,
            x: hit.x,
            prefit,
            postfit: hit.y_measured - updated_y,
            ratio: prefit.powi(2) / innovation_var,
            innovation_var,
            msr_noise_var,
        }
    }
}

impl fmt::Display for Residual {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "layer #{} at x = {} cm: prefit = {:.6} cm, postfit = {:.6} cm, ratio = {:.3}",
            self.layer_index, self.x, self.prefit, self.postfit, self.ratio
        )
    }
}
