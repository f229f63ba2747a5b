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

use crate::od::process::RunOutput;
use crate::od::{ODError, TooFewMeasurementsSnafu};
use snafu::ensure;

/// A structure storing the result of a single Monte Carlo run
#[derive(Debug)]
pub struct Run {
    /// The index of this run
    pub index: usize,
    /// The seed of the random source of this run
    pub seed: u128,
    /// The result from this run
    pub result: Result<RunOutput, ODError>,
}

/// A structure of Monte Carlo results
#[derive(Debug)]
pub struct Results {
    /// Raw data from each run, sorted by run index for O(1) access to each run
    pub runs: Vec<Run>,
    /// Name of this scenario
    pub scenario: String,
}

impl Results {
    /// Outputs of the runs that succeeded, in run order.
    pub fn successes(&self) -> impl Iterator<Item = &RunOutput> + '_ {
        self.runs.iter().filter_map(|run| run.result.as_ref().ok())
    }

    /// Number of failed runs
    pub fn failures(&self) -> usize {
        self.runs.iter().filter(|run| run.result.is_err()).count()
    }

    /// Applies the provided function to the estimate of every successful run at each layer, and
    /// returns the mean per layer.
    fn per_layer_mean<F>(&self, action: &'static str, value: F) -> Result<Vec<f64>, ODError>
    where
        F: Fn(&RunOutput, usize) -> f64,
    {
        let outputs = self.successes().collect::<Vec<&RunOutput>>();
        ensure!(
            !outputs.is_empty(),
            TooFewMeasurementsSnafu {
                need: 1_usize,
                action
            }
        );

        let num_layers = outputs[0].estimates.len();
        let mut means = vec![0.0; num_layers];
        for output in &outputs {
            for (layer, mean) in means.iter_mut().enumerate() {
                *mean += value(output, layer);
            }
        }
        for mean in &mut means {
            *mean /= outputs.len() as f64;
        }
        Ok(means)
    }

    /// Mean over the successful runs of the filtered offset variance at each layer, in cm²
    pub fn mean_covar_yy(&self) -> Result<Vec<f64>, ODError> {
        self.per_layer_mean("a mean covariance", |output, layer| {
            output.estimates[layer].covar[(0, 0)]
        })
    }

    /// Root mean square over the successful runs of the filtered offset error with respect to the
    /// nominal state at each layer, in cm
    pub fn rms_error_y(&self) -> Result<Vec<f64>, ODError> {
        Ok(self
            .per_layer_mean("an RMS error", |output, layer| {
                (output.estimates[layer].state.y - output.nominal[layer].y).powi(2)
            })?
            .into_iter()
            .map(f64::sqrt)
            .collect())
    }

    /// Mean over the successful runs of the prefit residual ratio at each layer, close to one for a consistent filter
    pub fn mean_residual_ratio(&self) -> Result<Vec<f64>, ODError> {
        self.per_layer_mean("a mean residual ratio", |output, layer| {
            output.residuals[layer].ratio
        })
    }
}
