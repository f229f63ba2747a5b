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

use super::{rts_smooth, RecoConfig, TrackFit};
use crate::detector::TRACK_ORIGIN_X;
use crate::od::estimate::{KfEstimate, Residual};
use crate::od::msr::Hit;
use crate::od::noise::{seeded_rng, RandomSource};
use crate::od::{ODConfigSnafu, ODError, ODPropSnafu};
use crate::{TrackPoint, TrackState};
use serde_derive::{Deserialize, Serialize};
use snafu::ResultExt;
use std::time::Instant;

/// Everything produced by a single reconstruction run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RunOutput {
    /// Layer positions, in cm
    pub layers: Vec<f64>,
    /// Dense noise free path, starting after the origin and ending on the last layer
    pub truth: Vec<TrackPoint>,
    /// One hit per layer, in layer order
    pub hits: Vec<Hit>,
    /// Filtered transverse offset at each layer
    pub filtered: Vec<TrackPoint>,
    /// Noise free state at each layer, from the same single step per layer propagation as the hits
    pub nominal: Vec<TrackState>,
    /// The seed of the filter
    pub seed_estimate: KfEstimate,
    /// Filter estimate at each layer
    pub estimates: Vec<KfEstimate>,
    /// Residual of each measurement update
    pub residuals: Vec<Residual>,
}

impl RunOutput {
    /// Smooths the filter estimates of this run.
    pub fn smooth(&self) -> Result<Vec<KfEstimate>, ODError> {
        rts_smooth(&self.estimates)
    }
}

/// A full reconstruction run: builds the truth path, simulates the hits, seeds the filter from
/// a perturbed initial state and fits the track.
#[derive(Clone, Debug, PartialEq)]
pub struct Scenario {
    pub config: RecoConfig,
}

impl Scenario {
    /// Initializes a new scenario after checking its configuration.
    pub fn new(config: RecoConfig) -> Result<Self, ODError> {
        config.validate().context(ODConfigSnafu)?;
        Ok(Self { config })
    }

    /// Executes a run with a random source seeded from the configuration.
    pub fn run(&self) -> Result<RunOutput, ODError> {
        let mut rng = seeded_rng(self.config.seed);
        self.run_with(&mut rng)
    }

    /// Executes a run drawing all of its random numbers from the provided source.
    ///
    /// All hits are drawn first (one per layer), then the perturbation of the seed (offset then angle).
    pub fn run_with<R: RandomSource + ?Sized>(&self, rng: &mut R) -> Result<RunOutput, ODError> {
        let start = Instant::now();
        let cfg = &self.config;
        cfg.validate().context(ODConfigSnafu)?;
        let geometry = cfg.geometry().context(ODConfigSnafu)?;

        info!("Running track reconstruction with {cfg}");

        let truth = cfg
            .propagator()?
            .truth(cfg.initial_state, &geometry)
            .context(ODPropSnafu)?;

        let simulator = cfg.hit_simulator()?;
        let nominal = simulator.nominal_states(cfg.initial_state, &geometry)?;
        let hits = simulator.generate(cfg.initial_state, &geometry, &mut *rng)?;

        let seed_estimate = KfEstimate::disperse_from_diag(
            TRACK_ORIGIN_X,
            cfg.initial_state,
            cfg.seed_perturbation_std,
            cfg.initial_covariance_diag,
            rng,
        )
        .context(ODConfigSnafu)?;

        let mut kf = cfg.filter()?;
        kf.seed(seed_estimate)?;

        let mut fit = TrackFit::new(kf, &geometry);
        fit.process_hits(&hits)?;

        let filtered = fit.filtered();

        info!(
            "Reconstruction of {} hits done in {:?}",
            hits.len(),
            start.elapsed()
        );

        Ok(RunOutput {
            layers: geometry.positions().to_vec(),
            truth,
            hits,
            filtered,
            nominal,
            seed_estimate,
            estimates: fit.estimates,
            residuals: fit.residuals,
        })
    }
}
