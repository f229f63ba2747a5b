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

use crate::detector::DetectorGeometry;
use crate::dynamics::TrajectoryModel;
use crate::od::estimate::{KfEstimate, Residual};
use crate::od::filter::kalman::KF;
use crate::od::msr::Hit;
use crate::od::{ODError, OutOfSequenceSnafu, TooFewMeasurementsSnafu, UnknownLayerSnafu};
use crate::utils::rms;
use crate::TrackPoint;
use snafu::prelude::*;

mod conf;
pub use conf::RecoConfig;
mod scenario;
pub use scenario::{RunOutput, Scenario};
mod smoother;
pub use smoother::rts_smooth;

/// A single pass fit of a track: runs a seeded filter over the hits of one track.
///
/// The filter performs one prediction and one measurement update per hit, walking the layers of
/// the geometry in order. The filter is closed once all hits are processed.
pub struct TrackFit<'a, D: TrajectoryModel> {
    /// Kalman filter itself
    pub kf: KF<D>,
    /// Detector geometry the hits were recorded on
    pub geometry: &'a DetectorGeometry,
    /// Vector of estimates available after a pass
    pub estimates: Vec<KfEstimate>,
    /// Vector of residuals available after a pass
    pub residuals: Vec<Residual>,
}

impl<'a, D: TrajectoryModel> TrackFit<'a, D> {
    /// Initializes a new track fit from a seeded filter.
    pub fn new(kf: KF<D>, geometry: &'a DetectorGeometry) -> Self {
        Self {
            kf,
            geometry,
            estimates: Vec::with_capacity(geometry.len()),
            residuals: Vec::with_capacity(geometry.len()),
        }
    }

    /// Processes the provided hits, which must refer to layers in strictly increasing order.
    ///
    /// The first error aborts the fit: no partial output is meant to be used.
    pub fn process_hits(&mut self, hits: &[Hit]) -> Result<(), ODError> {
        ensure!(
            !hits.is_empty(),
            TooFewMeasurementsSnafu {
                need: 1_usize,
                action: "a track fit"
            }
        );

        let num_layers = self.geometry.len();
        let mut prev_index: Option<usize> = None;

        info!(
            "Processing {} hits through {}",
            hits.len(),
            self.geometry
        );

        for hit in hits {
            if let Some(prev) = prev_index {
                ensure!(
                    hit.layer_index > prev,
                    OutOfSequenceSnafu {
                        action: "process a hit out of layer order",
                        phase: self.kf.phase()
                    }
                );
            }
            let layer_x = self
                .geometry
                .layer(hit.layer_index)
                .context(UnknownLayerSnafu {
                    layer_index: hit.layer_index,
                    num_layers,
                })?;

            self.kf.time_update(layer_x)?;
            let (estimate, residual) = self.kf.measurement_update(hit)?;

            debug!("{estimate}");

            self.estimates.push(estimate);
            self.residuals.push(residual);
            prev_index = Some(hit.layer_index);
        }

        let last = self.kf.finish()?;
        info!(
            "Track fit done: {} at x = {} cm, RMS prefit residual {:.3} cm",
            last.state,
            last.x,
            self.rms_prefit_residual()?
        );

        Ok(())
    }

    /// The filtered transverse offset at each processed layer.
    pub fn filtered(&self) -> Vec<TrackPoint> {
        self.estimates.iter().map(|est| est.point()).collect()
    }

    /// Returns the root mean square of the prefit residuals, in cm
    pub fn rms_prefit_residual(&self) -> Result<f64, ODError> {
        self.rms_of(|resid| resid.prefit)
    }

    /// Returns the root mean square of the postfit residuals, in cm
    pub fn rms_postfit_residual(&self) -> Result<f64, ODError> {
        self.rms_of(|resid| resid.postfit)
    }

    fn rms_of<F: Fn(&Residual) -> f64>(&self, value: F) -> Result<f64, ODError> {
        let values = self.residuals.iter().map(value).collect::<Vec<f64>>();
        rms(&values).context(TooFewMeasurementsSnafu {
            need: 1_usize,
            action: "computing an RMS residual",
        })
    }

    /// Smooths the estimates of this pass with a fixed interval smoother.
    /// Returns the smoothed estimates in layer order.
    pub fn smooth(&self) -> Result<Vec<KfEstimate>, ODError> {
        rts_smooth(&self.estimates)
    }
}
