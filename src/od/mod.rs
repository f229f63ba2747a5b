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

use crate::dynamics::DynamicsError;
use crate::io::ConfigError;
use crate::propagators::PropagationError;
use snafu::prelude::Snafu;

/// Provides the extended Kalman filter.
pub mod filter;
pub use filter::kalman::KF;
pub use filter::{CovarianceUpdate, FilterPhase};

/// Provides Estimate handling functionalities.
pub mod estimate;

/// Provides noise modeling and the random source interface
pub mod noise;

/// Provides the detector hit type
pub mod msr;

/// Provides the functionality to simulate detector hits
pub mod simulator;

/// Provides the track fit process and the full reconstruction scenario
pub mod process;

#[allow(unused_imports)]
pub mod prelude {
    pub use super::estimate::*;
    pub use super::filter::kalman::*;
    pub use super::filter::*;
    pub use super::msr::*;
    pub use super::noise::{seeded_rng, RandomSource, Stochastics, WhiteNoise};
    pub use super::process::*;
    pub use super::simulator::*;
    pub use super::*;
    pub use crate::detector::DetectorGeometry;
    pub use crate::dynamics::{HelixDynamics, TrajectoryModel};
    pub use crate::io::ConfigRepr;
    pub use crate::{StateDiag, TrackPoint, TrackState};
}

#[derive(Debug, PartialEq, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum ODError {
    #[snafu(display("during a track reconstruction, encountered {source}"))]
    ODPropError { source: PropagationError },
    #[snafu(display("during a track reconstruction, encountered {source}"))]
    ODDynamicsError { source: DynamicsError },
    #[snafu(display("track reconstruction failed because {source}"))]
    ODConfigError { source: ConfigError },
    #[snafu(display(
        "innovation variance S = {innovation_var} at x = {x} cm is not strictly positive and finite"
    ))]
    SingularInnovation { x: f64, innovation_var: f64 },
    #[snafu(display("predicted covariance at x = {x} cm is singular, cannot {action}"))]
    SingularCovariance { x: f64, action: &'static str },
    #[snafu(display("cannot {action} while the filter is {phase}"))]
    OutOfSequence {
        action: &'static str,
        phase: FilterPhase,
    },
    #[snafu(display("hit at x = {hit_x} cm does not match the predicted layer at x = {expected_x} cm"))]
    HitLayerMismatch { hit_x: f64, expected_x: f64 },
    #[snafu(display("hit refers to layer #{layer_index} but the detector has {num_layers} layers"))]
    UnknownLayer {
        layer_index: usize,
        num_layers: usize,
    },
    #[snafu(display("at least {need} measurements required for {action}"))]
    TooFewMeasurements { need: usize, action: &'static str },
}
