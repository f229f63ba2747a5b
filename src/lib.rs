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

/*! # helix-track

Reconstruction of a charged particle track crossing a sequence of flat detector layers, using an
Extended Kalman Filter operating on a simplified 2D helical motion model.

The crate provides the motion model and its Jacobian, a fine-step truth propagator, a noisy hit
simulator, the filter itself, and the orchestration of a full reconstruction run (and of many
independent runs in parallel).
*/

/// Detector geometry: the ordered positions of the sensitive layers.
pub mod detector;

/// Provides the helical trajectory model used by every simulator and by the filter.
pub mod dynamics;

/// Provides the fine-step truth propagator.
pub mod propagators;

/// Track states and track points.
mod state;
pub use self::state::{StateDiag, TrackPoint, TrackState};

/// All the track fitting tools: noise, hit simulation, estimates, the Kalman filter, and the fitting process.
pub mod od;

/// Configuration loading.
pub mod io;

/// Monte Carlo module
pub mod mc;

/// Utility functions shared by different modules.
pub mod utils;

#[macro_use]
extern crate log;
extern crate nalgebra as na;

/// Re-export nalgebra
pub mod linalg {
    pub use na::base::*;
}

pub use self::detector::DetectorGeometry;
pub use self::dynamics::{HelixDynamics, TrajectoryModel};
