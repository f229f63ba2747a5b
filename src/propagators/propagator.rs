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

use super::{DynamicsSnafu, PropConfigSnafu, PropOpts, PropagationError};
use crate::detector::{DetectorGeometry, TRACK_ORIGIN_X};
use crate::dynamics::TrajectoryModel;
use crate::{TrackPoint, TrackState};
use snafu::prelude::*;

/// A fixed step propagator of a trajectory model, used to build the noise free reference path.
///
/// The truth path is integrated with many small steps, whereas the filter uses a single step
/// per layer: the difference between both discretizations is intentional.
#[derive(Clone, Debug)]
pub struct Propagator<D: TrajectoryModel> {
    pub dynamics: D,
    pub opts: PropOpts,
}

impl<D: TrajectoryModel> Propagator<D> {
    pub fn new(dynamics: D, opts: PropOpts) -> Self {
        Self { dynamics, opts }
    }

    /// A propagator with the default options.
    pub fn default(dynamics: D) -> Self {
        Self::new(dynamics, PropOpts::default())
    }

    /// Propagates the state from `x_from` until exactly `x_to` with steps no larger than the configured step.
    pub fn until_x(
        &self,
        state: TrackState,
        x_from: f64,
        x_to: f64,
    ) -> Result<TrackState, PropagationError> {
        self.propagate_segment(state, x_from, x_to, None)
    }

    /// Propagates the state from `x_from` until exactly `x_to`, and returns the final state and every intermediate point.
    pub fn until_x_with_traj(
        &self,
        state: TrackState,
        x_from: f64,
        x_to: f64,
    ) -> Result<(TrackState, Vec<TrackPoint>), PropagationError> {
        let mut traj = Vec::with_capacity(self.substeps(x_from, x_to)?);
        let state = self.propagate_segment(state, x_from, x_to, Some(&mut traj))?;
        Ok((state, traj))
    }

    /// Builds the dense truth path of a track starting at the origin with the provided state, up to the last layer.
    ///
    /// The steps restart at each layer so that a point lands exactly on every layer position. The
    /// starting point itself is not part of the returned path.
    pub fn truth(
        &self,
        initial_state: TrackState,
        geometry: &DetectorGeometry,
    ) -> Result<Vec<TrackPoint>, PropagationError> {
        self.opts.validate().context(PropConfigSnafu)?;
        geometry
            .ensure_after(TRACK_ORIGIN_X)
            .context(PropConfigSnafu)?;
        if let Some(spacing) = geometry.min_spacing() {
            if self.opts.step >= spacing {
                warn!(
                    "truth step of {} cm is not smaller than the minimum layer spacing of {} cm",
                    self.opts.step, spacing
                );
            }
        }

        let mut traj = Vec::with_capacity(self.substeps(TRACK_ORIGIN_X, geometry.last())?);
        let mut state = initial_state;
        let mut x_prev = TRACK_ORIGIN_X;
        for layer_x in geometry.iter() {
            state = self.propagate_segment(state, x_prev, layer_x, Some(&mut traj))?;
            x_prev = layer_x;
        }

        debug!(
            "truth path of {} points through {geometry} ends at {state}",
            traj.len()
        );

        Ok(traj)
    }

    /// Number of substeps needed to cover this span.
    fn substeps(&self, x_from: f64, x_to: f64) -> Result<usize, PropagationError> {
        self.opts.num_steps(x_to - x_from).context(PropConfigSnafu)
    }

    fn propagate_segment(
        &self,
        state: TrackState,
        x_from: f64,
        x_to: f64,
        mut traj: Option<&mut Vec<TrackPoint>>,
    ) -> Result<TrackState, PropagationError> {
        if x_to == x_from {
            return Ok(state);
        }

        let step = self.opts.step.copysign(x_to - x_from);
        let num_steps = self.substeps(x_from, x_to)?;

        let mut state = state;
        let mut x = x_from;
        for k in 1..=num_steps {
            // Substeps are computed from the start of the segment to avoid accumulating rounding errors.
            let x_next = if k == num_steps {
                x_to
            } else {
                x_from + (k as f64) * step
            };
            state = self
                .dynamics
                .propagate(&state, x, x_next)
                .context(DynamicsSnafu)?;
            if let Some(traj) = traj.as_deref_mut() {
                traj.push(TrackPoint::new(x_next, state.y));
            }
            x = x_next;
        }

        Ok(state)
    }
}
