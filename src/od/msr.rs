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

use serde_derive::{Deserialize, Serialize};
use std::fmt;

/// A simulated detector hit: the measured transverse offset of the track on one layer.
///
/// The longitudinal position `x` is exact (it is the layer position), only `y_measured` is noisy.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Hit {
    /// Index of the layer in the detector geometry
    pub layer_index: usize,
    /// Layer position, in cm
    pub x: f64,
    /// Measured transverse offset, in cm
    pub y_measured: f64,
}

impl Hit {
    pub const fn new(layer_index: usize, x: f64, y_measured: f64) -> Self {
        Self {
            layer_index,
            x,
            y_measured,
        }
    }
}

impl fmt::Display for Hit {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "hit #{} at x = {} cm: y = {:.6} cm",
            self.layer_index, self.x, self.y_measured
        )
    }
}
