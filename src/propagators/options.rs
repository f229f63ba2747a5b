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

use std::fmt;

use crate::io::{ensure_positive, ConfigError, TooManyStepsSnafu};
use snafu::ensure;
use serde_derive::{Deserialize, Serialize};
use typed_builder::TypedBuilder;

/// Default step of the truth propagator, in cm.
pub const DEFAULT_TRUTH_STEP_CM: f64 = 0.5;

/// Largest number of steps of a single propagation.
pub const MAX_TRUTH_STEPS: usize = 10_000_000;

/// Fraction of a step under which a remaining span is not worth an extra substep.
const SUBSTEP_TOL: f64 = 1e-9;

/// PropOpts stores the options of the fixed step truth propagator.
///
/// The step must be materially smaller than the inter-layer spacing so that the truth path is
/// independent of, and finer than, the one step per layer used by the filter.
#[derive(Clone, Copy, Debug, PartialEq, TypedBuilder, Serialize, Deserialize)]
#[builder(doc)]
pub struct PropOpts {
    /// Fixed step size, in cm
    #[builder(default = DEFAULT_TRUTH_STEP_CM)]
    pub step: f64,
}

impl PropOpts {
    /// Initializes the options with the provided fixed step, checking that it is positive.
    pub fn with_fixed_step(step: f64) -> Result<Self, ConfigError> {
        let me = Self { step };
        me.validate()?;
        Ok(me)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        ensure_positive("truth step", self.step)
    }

    /// Returns the number of steps needed to cover this span, at least one, and checks that
    /// it does not exceed [MAX_TRUTH_STEPS].
    pub fn num_steps(&self, span: f64) -> Result<usize, ConfigError> {
        self.validate()?;
        let steps = ((span.abs() / self.step) - SUBSTEP_TOL).ceil().max(1.0);
        ensure!(
            steps <= MAX_TRUTH_STEPS as f64,
            TooManyStepsSnafu {
                step: self.step,
                span: span.abs(),
                max: MAX_TRUTH_STEPS
            }
        );
        Ok(steps as usize)
    }
}

impl Default for PropOpts {
    fn default() -> Self {
        Self {
            step: DEFAULT_TRUTH_STEP_CM,
        }
    }
}

impl fmt::Display for PropOpts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "fixed step: {} cm", self.step)
    }
}
