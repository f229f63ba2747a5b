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

use rand::Rng;
use rand_distr::{Distribution, StandardNormal};
use rand_pcg::Pcg64Mcg;

pub mod white;
pub use white::WhiteNoise;

/// A source of Gaussian random numbers.
///
/// Every simulator takes its random source explicitly: there is no global generator, so that two
/// runs built from identically seeded sources produce identical outputs, and independent runs can
/// be executed in parallel.
pub trait RandomSource {
    /// Draws a sample from a normal distribution of the provided mean and standard deviation.
    fn gaussian(&mut self, mean: f64, std_dev: f64) -> f64;
}

impl<R: Rng + ?Sized> RandomSource for R {
    fn gaussian(&mut self, mean: f64, std_dev: f64) -> f64 {
        let z: f64 = StandardNormal.sample(self);
        mean + std_dev * z
    }
}

/// Builds the random source of a run from its seed.
///
/// `Pcg64Mcg::new` forces the lowest bit of its state to one, so the seed is shifted first:
/// otherwise seeds `2k` and `2k + 1` would share a stream.
pub fn seeded_rng(seed: u128) -> Pcg64Mcg {
    Pcg64Mcg::new((seed << 1) | 1)
}

/// A stochastic noise model.
pub trait Stochastics {
    /// Return the variance of this stochastic noise model.
    fn covariance(&self) -> f64;

    /// Returns a new sample of this stochastic noise model.
    fn sample<R: RandomSource + ?Sized>(&self, rng: &mut R) -> f64;
}
