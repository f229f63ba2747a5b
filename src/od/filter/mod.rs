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

pub mod kalman;

/// The phase of a filter in its single pass over the layers.
///
/// The only valid sequence is `Uninitialized → Seeded → (Predicted → Updated)* → Done`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum FilterPhase {
    /// No estimate yet
    Uninitialized,
    /// Holds the initial estimate at the track origin
    Seeded,
    /// Holds a prediction at a layer, awaiting its hit
    Predicted,
    /// Holds the posterior at a layer
    Updated,
    /// The pass is over, the filter rejects any further operation
    Done,
}

impl fmt::Display for FilterPhase {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let word = match self {
            Self::Uninitialized => "uninitialized",
            Self::Seeded => "seeded",
            Self::Predicted => "predicted",
            Self::Updated => "updated",
            Self::Done => "done",
        };
        write!(f, "{word}")
    }
}

/// The form of the covariance measurement update.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum CovarianceUpdate {
    /// `P = (I - K⋅H)⋅P_bar`
    #[default]
    Standard,
    /// `P = (I - K⋅H)⋅P_bar⋅(I - K⋅H)^T + K⋅R⋅K^T`, which keeps the covariance symmetric and
    /// positive semi definite for any gain.
    Joseph,
}
