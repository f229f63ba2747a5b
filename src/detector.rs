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

use crate::io::{
    ConfigError, EmptyGeometrySnafu, LayerBehindOriginSnafu, NonFiniteLayerSnafu,
    NonMonotonicLayersSnafu,
};
use serde_derive::Serialize;
use snafu::ensure;
use std::fmt;

/// Longitudinal coordinate at which every track starts, in cm.
pub const TRACK_ORIGIN_X: f64 = 0.0;

/// The ordered, immutable sequence of sensitive layer positions along the beam axis.
///
/// Positions are strictly increasing and unique. This is checked once at construction and the
/// geometry cannot be mutated afterward: it is shared by reference across the simulators and
/// the filter of a given run.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DetectorGeometry {
    layers: Vec<f64>,
}

impl DetectorGeometry {
    /// Builds a new geometry from the layer positions, in cm.
    pub fn new(positions: &[f64]) -> Result<Self, ConfigError> {
        ensure!(!positions.is_empty(), EmptyGeometrySnafu);

        for (index, x) in positions.iter().copied().enumerate() {
            ensure!(x.is_finite(), NonFiniteLayerSnafu { index, x });
            if index > 0 {
                let prev = positions[index - 1];
                ensure!(x > prev, NonMonotonicLayersSnafu { index, x, prev });
            }
        }

        Ok(Self {
            layers: positions.to_vec(),
        })
    }

    /// Builds `count` layers equally spaced by `spacing`, the first one at `first`.
    pub fn equally_spaced(first: f64, spacing: f64, count: usize) -> Result<Self, ConfigError> {
        let positions = (0..count)
            .map(|i| first + spacing * (i as f64))
            .collect::<Vec<f64>>();
        Self::new(&positions)
    }

    /// Layer positions in geometry order.
    pub fn positions(&self) -> &[f64] {
        &self.layers
    }

    /// Number of layers, never zero.
    pub fn len(&self) -> usize {
        self.layers.len()
    }

    /// Always false: a geometry cannot be built without layers.
    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// Position of the i-th layer, if any.
    pub fn layer(&self, index: usize) -> Option<f64> {
        self.layers.get(index).copied()
    }

    pub fn first(&self) -> f64 {
        self.layers[0]
    }

    pub fn last(&self) -> f64 {
        self.layers[self.layers.len() - 1]
    }

    /// Smallest distance between two consecutive layers, `None` with a single layer.
    pub fn min_spacing(&self) -> Option<f64> {
        self.layers
            .windows(2)
            .map(|pair| pair[1] - pair[0])
            .reduce(f64::min)
    }

    pub fn iter(&self) -> impl Iterator<Item = f64> + '_ {
        self.layers.iter().copied()
    }

    /// Ensures that every layer lies strictly after the provided track origin.
    pub fn ensure_after(&self, origin: f64) -> Result<(), ConfigError> {
        let x = self.first();
        ensure!(x > origin, LayerBehindOriginSnafu { x, origin });
        Ok(())
    }
}

impl fmt::Display for DetectorGeometry {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{} layers from x = {} to x = {} cm",
            self.len(),
            self.first(),
            self.last()
        )
    }
}
