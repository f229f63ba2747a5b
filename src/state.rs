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

use crate::linalg::{Matrix2, Vector2};
use serde_derive::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Sub};

/// The track state at a given longitudinal coordinate `x`: transverse offset `y` (cm) and track angle `phi` (rad).
///
/// The state is not tagged with its `x`: the longitudinal coordinate is the independent variable
/// and is always passed alongside the state.
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TrackState {
    /// Transverse offset, in cm
    pub y: f64,
    /// Track angle with respect to the beam axis, in radians
    pub phi: f64,
}

impl TrackState {
    pub const fn new(y: f64, phi: f64) -> Self {
        Self { y, phi }
    }

    /// Returns this state as a column vector `[y, phi]`.
    pub fn to_vector(&self) -> Vector2<f64> {
        Vector2::new(self.y, self.phi)
    }

    /// Builds a state from a column vector `[y, phi]`.
    pub fn from_vector(v: &Vector2<f64>) -> Self {
        Self { y: v[0], phi: v[1] }
    }

    pub fn is_finite(&self) -> bool {
        self.y.is_finite() && self.phi.is_finite()
    }
}

impl Add<Vector2<f64>> for TrackState {
    type Output = Self;

    /// Applies a state deviation to this state.
    fn add(self, other: Vector2<f64>) -> Self {
        Self {
            y: self.y + other[0],
            phi: self.phi + other[1],
        }
    }
}

impl Sub for TrackState {
    type Output = Vector2<f64>;

    fn sub(self, other: Self) -> Vector2<f64> {
        self.to_vector() - other.to_vector()
    }
}

impl fmt::Display for TrackState {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "[y = {:.6} cm, phi = {:.6} rad]", self.y, self.phi)
    }
}

/// A pair of values, one per state component, e.g. the one-sigma dispersions or the diagonal of a covariance.
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct StateDiag {
    pub y: f64,
    pub phi: f64,
}

impl StateDiag {
    pub const fn new(y: f64, phi: f64) -> Self {
        Self { y, phi }
    }

    /// Diagonal matrix built from these values.
    pub fn to_matrix(&self) -> Matrix2<f64> {
        Matrix2::from_diagonal(&Vector2::new(self.y, self.phi))
    }
}

/// A sample of a path in the bending plane, used for truth points and filtered estimates alike.
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TrackPoint {
    /// Longitudinal coordinate, in cm
    pub x: f64,
    /// Transverse offset, in cm
    pub y: f64,
}

impl TrackPoint {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for TrackPoint {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "({:.3}, {:.6})", self.x, self.y)
    }
}
