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

use std::ops::{Mul, MulAssign};

use serde_derive::{Deserialize, Serialize};

use super::{RandomSource, Stochastics};
use crate::io::{ensure_noise, ConfigError};

/// White noise is an uncorrelated random variable.
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct WhiteNoise {
    /// Mean value of this white noise
    pub mean: f64,
    /// Noise as a one-sigma of the Normal distribution.
    pub sigma: f64,
}

impl WhiteNoise {
    /// Initializes a new zero mean white noise of the provided one-sigma.
    pub fn new(sigma: f64) -> Result<Self, ConfigError> {
        ensure_noise("white noise sigma", sigma)?;
        Ok(Self { mean: 0.0, sigma })
    }

    /// A white noise that always returns its mean.
    pub fn zero() -> Self {
        Self::default()
    }
}

impl Stochastics for WhiteNoise {
    fn covariance(&self) -> f64 {
        self.sigma.powi(2)
    }

    fn sample<R: RandomSource + ?Sized>(&self, rng: &mut R) -> f64 {
        rng.gaussian(self.mean, self.sigma)
    }
}

impl Mul<f64> for WhiteNoise {
    type Output = Self;

    /// Scale the white noise sigmas by a constant.
    fn mul(mut self, rhs: f64) -> Self::Output {
        self.sigma *= rhs;
        self
    }
}

impl MulAssign<f64> for WhiteNoise {
    fn mul_assign(&mut self, rhs: f64) {
        *self = *self * rhs;
    }
}
