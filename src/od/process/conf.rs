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

use crate::detector::{DetectorGeometry, TRACK_ORIGIN_X};
use crate::dynamics::helix::{HelixDynamics, DEFAULT_COS_PHI_EPSILON};
use crate::io::{
    ensure_noise, ensure_positive, ConfigError, ConfigRepr, NonFiniteInitialStateSnafu,
};
use crate::od::filter::kalman::KF;
use crate::od::filter::CovarianceUpdate;
use crate::od::noise::WhiteNoise;
use crate::od::simulator::HitSimulator;
use crate::od::ODError;
use crate::propagators::{PropOpts, Propagator, DEFAULT_TRUTH_STEP_CM};
use crate::{StateDiag, TrackState};
use serde_derive::{Deserialize, Serialize};
use snafu::ensure;
use std::fmt;
use typed_builder::TypedBuilder;

/// Configuration of a track reconstruction run.
///
/// Every field has a default, so a YAML configuration only needs to list what it changes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, TypedBuilder)]
#[builder(doc)]
#[serde(default, deny_unknown_fields)]
pub struct RecoConfig {
    /// Positions of the detector layers, in cm
    #[builder(default_code = "(1..=10).map(|i| 10.0 * f64::from(i)).collect()")]
    pub layer_positions: Vec<f64>,
    /// One-sigma of the hit measurement error on the transverse offset, in cm
    #[builder(default = 2.0)]
    pub measurement_error_std: f64,
    /// Variance of the track angle added at every layer (multiple scattering), in rad²
    #[builder(default = 0.01)]
    pub process_noise_angle_var: f64,
    /// Transverse momentum, in GeV
    #[builder(default = 1.0)]
    #[serde(alias = "pt")]
    pub pt_gev: f64,
    /// Magnetic field, in Tesla
    #[builder(default = 1.0)]
    #[serde(alias = "B")]
    pub b_tesla: f64,
    /// True state of the track at the origin
    #[builder(default = TrackState::new(5.0, -0.2))]
    pub initial_state: TrackState,
    /// One-sigma of the perturbation of the true initial state used to seed the filter
    #[builder(default = StateDiag::new(5.0, 0.1))]
    #[serde(alias = "initial_state_seed_perturbation_std")]
    pub seed_perturbation_std: StateDiag,
    /// Diagonal of the initial covariance of the filter
    #[builder(default = StateDiag::new(100.0, 1.0))]
    pub initial_covariance_diag: StateDiag,
    /// Step of the truth path integration, in cm
    #[builder(default = DEFAULT_TRUTH_STEP_CM)]
    pub truth_step: f64,
    /// Smallest |cos(phi)| accepted by the trajectory model
    #[builder(default = DEFAULT_COS_PHI_EPSILON)]
    pub cos_phi_epsilon: f64,
    /// Seed of the random source of this run
    #[builder(default)]
    pub seed: u128,
    /// Form of the covariance measurement update
    #[builder(default)]
    pub covariance_update: CovarianceUpdate,
}

impl Default for RecoConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl ConfigRepr for RecoConfig {}

impl RecoConfig {
    /// Checks every parameter of this configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let geometry = self.geometry()?;
        geometry.ensure_after(TRACK_ORIGIN_X)?;
        ensure_noise("measurement error std", self.measurement_error_std)?;
        ensure_noise("process noise angle variance", self.process_noise_angle_var)?;
        ensure_positive("transverse momentum", self.pt_gev)?;
        ensure_positive("magnetic field", self.b_tesla)?;
        ensure!(
            self.initial_state.is_finite(),
            NonFiniteInitialStateSnafu {
                state: self.initial_state
            }
        );
        ensure_noise("seed perturbation std of y", self.seed_perturbation_std.y)?;
        ensure_noise("seed perturbation std of phi", self.seed_perturbation_std.phi)?;
        ensure_positive("initial variance of y", self.initial_covariance_diag.y)?;
        ensure_positive("initial variance of phi", self.initial_covariance_diag.phi)?;
        PropOpts::with_fixed_step(self.truth_step)?
            .num_steps(geometry.last() - TRACK_ORIGIN_X)?;
        ensure_positive("cos(phi) epsilon", self.cos_phi_epsilon)?;
        Ok(())
    }

    /// Radius of curvature of the track, in cm.
    pub fn curvature_radius_cm(&self) -> f64 {
        HelixDynamics::radius_from_momentum(self.pt_gev, self.b_tesla)
    }

    pub fn geometry(&self) -> Result<DetectorGeometry, ConfigError> {
        DetectorGeometry::new(&self.layer_positions)
    }

    pub fn dynamics(&self) -> Result<HelixDynamics, ODError> {
        ensure_positive("transverse momentum", self.pt_gev)
            .and_then(|_| ensure_positive("magnetic field", self.b_tesla))
            .map_err(|source| ODError::ODConfigError { source })?;
        HelixDynamics::from_momentum(self.pt_gev, self.b_tesla)
            .map(|dynamics| dynamics.with_epsilon(self.cos_phi_epsilon))
            .map_err(|source| ODError::ODDynamicsError { source })
    }

    /// The truth path propagator of this configuration.
    pub fn propagator(&self) -> Result<Propagator<HelixDynamics>, ODError> {
        let opts = PropOpts::with_fixed_step(self.truth_step)
            .map_err(|source| ODError::ODConfigError { source })?;
        Ok(Propagator::new(self.dynamics()?, opts))
    }

    /// The hit simulator of this configuration.
    pub fn hit_simulator(&self) -> Result<HitSimulator<HelixDynamics>, ODError> {
        let noise = WhiteNoise::new(self.measurement_error_std)
            .map_err(|source| ODError::ODConfigError { source })?;
        Ok(HitSimulator::new(self.dynamics()?, noise))
    }

    /// An unseeded filter of this configuration.
    pub fn filter(&self) -> Result<KF<HelixDynamics>, ODError> {
        Ok(KF::new(
            self.dynamics()?,
            self.measurement_error_std,
            self.process_noise_angle_var,
        )?
        .with_covariance_update(self.covariance_update))
    }
}

impl fmt::Display for RecoConfig {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{} layers, sigma_meas = {} cm, q_phi = {} rad², pt = {} GeV, B = {} T (R = {:.3} cm), seed {}",
            self.layer_positions.len(),
            self.measurement_error_std,
            self.process_noise_angle_var,
            self.pt_gev,
            self.b_tesla,
            self.curvature_radius_cm(),
            self.seed
        )
    }
}
