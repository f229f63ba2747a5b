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

use super::results::{Results, Run};
use crate::od::noise::seeded_rng;
use crate::od::process::{RecoConfig, Scenario};
use crate::od::{ODConfigSnafu, ODError};
use indicatif::{ParallelProgressIterator, ProgressBar, ProgressStyle};
use rayon::prelude::*;
use snafu::ResultExt;
use std::fmt;
use std::time::Instant;

/// A Monte Carlo framework of track reconstructions, automatically running on all threads via a thread pool.
///
/// Each run is an independent reconstruction of the same configured track, with its own random
/// source seeded from the Monte Carlo seed and the run index: the results do not depend on the
/// number of threads nor on the scheduling of the runs.
#[derive(Clone, Debug)]
pub struct MonteCarlo {
    /// Seed of the [64bit PCG random number generator](https://www.pcg-random.org/index.html)
    pub seed: u128,
    /// Configuration shared by all runs, its own seed is replaced by the seed of each run
    pub config: RecoConfig,
    /// Name of this run, will be reflected in the progress bar and in the output structure
    pub scenario: String,
}

impl MonteCarlo {
    /// Initializes a new Monte Carlo seeded from the configuration seed.
    pub fn new(scenario: String, config: RecoConfig) -> Result<Self, ODError> {
        config.validate().context(ODConfigSnafu)?;
        Ok(Self {
            seed: config.seed,
            config,
            scenario,
        })
    }

    // Just the template for the progress bar
    fn progress_bar(&self, num_runs: usize) -> ProgressBar {
        let pb = ProgressBar::new(num_runs as u64);
        if let Ok(style) = ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:100.cyan/blue} {pos:>7}/{len:7} {msg}")
        {
            pb.set_style(style.progress_chars("##-"));
        }
        pb.set_message(format!("{self}"));
        pb
    }

    /// Seed of the random source of the provided run.
    pub fn run_seed(&self, index: usize) -> u128 {
        self.seed.wrapping_add(index as u128)
    }

    /// Reconstructs `num_runs` independent tracks.
    #[must_use = "Monte Carlo result must be used"]
    pub fn run(&self, num_runs: usize) -> Results {
        self.resume_run(0, num_runs)
    }

    /// Resumes a Monte Carlo run by skipping the first `skip` runs.
    #[must_use = "Monte Carlo result must be used"]
    pub fn resume_run(&self, skip: usize, num_runs: usize) -> Results {
        // Setup the progress bar
        let pb = self.progress_bar(num_runs);

        let start = Instant::now();
        let mut runs = (skip..skip + num_runs)
            .into_par_iter()
            .progress_with(pb)
            .map(|index| {
                let seed = self.run_seed(index);
                let mut config = self.config.clone();
                config.seed = seed;
                let mut rng = seeded_rng(seed);
                let result = Scenario { config }.run_with(&mut rng);
                if let Err(e) = &result {
                    warn!("run #{index} failed: {e}");
                }
                Run {
                    index,
                    seed,
                    result,
                }
            })
            .collect::<Vec<Run>>();

        info!(
            "Reconstructed {} tracks in {:?}",
            num_runs,
            start.elapsed()
        );

        // Sort them by run index
        runs.par_sort_by_key(|run| run.index);

        Results {
            runs,
            scenario: self.scenario.clone(),
        }
    }
}

impl fmt::Display for MonteCarlo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - Monte Carlo - seed: {}", self.scenario, self.seed)
    }
}

impl fmt::LowerHex for MonteCarlo {
    /// Returns a filename friendly name
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "mc-data-{}-seed-{}",
            self.scenario.replace(' ', "-"),
            self.seed
        )
    }
}
