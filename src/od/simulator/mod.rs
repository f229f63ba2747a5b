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

use snafu::ResultExt;

use super::msr::Hit;
use super::noise::{RandomSource, Stochastics, WhiteNoise};
use super::{ODConfigSnafu, ODDynamicsSnafu, ODError};
use crate::detector::{DetectorGeometry, TRACK_ORIGIN_X};
use crate::dynamics::TrajectoryModel;
use crate::io::ensure_noise;
use crate::TrackState;

/// Simulates the detector response: one hit per layer, in geometry order.
///
/// The track is propagated from layer to layer in a single step per layer (no substeps), which
/// is the same discretization as the filter prediction. Each hit is the propagated offset plus
/// the measurement noise.
#[derive(Clone, Debug)]
pub struct HitSimulator<D: TrajectoryModel> {
    pub dynamics: D,
    /// Measurement noise added to the transverse offset
    pub noise: WhiteNoise,
}

impl<D: TrajectoryModel> HitSimulator<D> {
    pub fn new(dynamics: D, noise: WhiteNoise) -> Self {
        Self { dynamics, noise }
    }

    /// Returns the noise free states at each layer, starting from the provided state at the track origin.
    pub fn nominal_states(
        &self,
        initial_state: TrackState,
        geometry: &DetectorGeometry,
    ) -> Result<Vec<TrackState>, ODError> {
        geometry
            .ensure_after(TRACK_ORIGIN_X)
            .context(ODConfigSnafu)?;

        let mut states = Vec::with_capacity(geometry.len());
        let mut state = initial_state;
        let mut x_prev = TRACK_ORIGIN_X;
        for layer_x in geometry.iter() {
            state = self
                .dynamics
                .propagate(&state, x_prev, layer_x)
                .context(ODDynamicsSnafu)?;
            states.push(state);
            x_prev = layer_x;
        }
        Ok(states)
    }

    /// Generates one noisy hit per layer using the provided random source.
    ///
    /// Exactly one gaussian sample is drawn per layer, in geometry order.
    pub fn generate<R: RandomSource + ?Sized>(
        &self,
        initial_state: TrackState,
        geometry: &DetectorGeometry,
        rng: &mut R,
    ) -> Result<Vec<Hit>, ODError> {
        ensure_noise("measurement error std", self.noise.sigma).context(ODConfigSnafu)?;

        let hits = self
            .nominal_states(initial_state, geometry)?
            .into_iter()
            .zip(geometry.iter())
            .enumerate()
            .map(|(layer_index, (state, x))| {
                let hit = Hit::new(layer_index, x, state.y + self.noise.sample(&mut *rng));
                debug!("{hit}");
                hit
            })
            .collect::<Vec<Hit>>();

        Ok(hits)
    }
}
