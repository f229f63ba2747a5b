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

use crate::TrackState;
use serde::de::DeserializeOwned;
use serde::Serialize;
use snafu::prelude::*;
use std::collections::BTreeMap;
use std::fmt::Debug;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum ConfigError {
    #[snafu(display("failed to read configuration file: {source}"))]
    ReadError { source: std::io::Error },
    #[snafu(display("failed to parse YAML configuration: {source}"))]
    ParseError { source: serde_yaml::Error },
    #[snafu(display("detector geometry must have at least one layer"))]
    EmptyGeometry,
    #[snafu(display("layer #{index} position {x} is not finite"))]
    NonFiniteLayer { index: usize, x: f64 },
    #[snafu(display(
        "layer positions must be strictly increasing: layer #{index} at {x} follows {prev}"
    ))]
    NonMonotonicLayers { index: usize, x: f64, prev: f64 },
    #[snafu(display("first layer at {x} must be after the track origin at {origin}"))]
    LayerBehindOrigin { x: f64, origin: f64 },
    #[snafu(display("initial track state {state} is not finite"))]
    NonFiniteInitialState { state: TrackState },
    #[snafu(display("{param} must be finite and non-negative, got {val}"))]
    NegativeNoise { param: &'static str, val: f64 },
    #[snafu(display("a step of {step} cm needs more than {max} steps to cover {span} cm"))]
    TooManySteps { step: f64, span: f64, max: usize },
    #[snafu(display("{param} must be finite and strictly positive, got {val}"))]
    NonPositiveParam { param: &'static str, val: f64 },
}

impl PartialEq for ConfigError {
    /// No two configuration errors match
    fn eq(&self, _other: &Self) -> bool {
        false
    }
}

/// Ensures that the provided noise parameter is finite and non-negative.
pub(crate) fn ensure_noise(param: &'static str, val: f64) -> Result<(), ConfigError> {
    ensure!(
        val.is_finite() && val >= 0.0,
        NegativeNoiseSnafu { param, val }
    );
    Ok(())
}

/// Ensures that the provided parameter is finite and strictly positive.
pub(crate) fn ensure_positive(param: &'static str, val: f64) -> Result<(), ConfigError> {
    ensure!(
        val.is_finite() && val > 0.0,
        NonPositiveParamSnafu { param, val }
    );
    Ok(())
}

pub trait ConfigRepr: Debug + Sized + Serialize + DeserializeOwned {
    /// Builds the configuration representation from the path to a yaml
    fn load<P>(path: P) -> Result<Self, ConfigError>
    where
        P: AsRef<Path>,
    {
        let file = File::open(path).context(ReadSnafu)?;
        let reader = BufReader::new(file);

        serde_yaml::from_reader(reader).context(ParseSnafu)
    }

    /// Builds a sequence of "Selves" from the provided path to a yaml
    fn load_many<P>(path: P) -> Result<Vec<Self>, ConfigError>
    where
        P: AsRef<Path>,
    {
        let file = File::open(path).context(ReadSnafu)?;
        let reader = BufReader::new(file);

        serde_yaml::from_reader(reader).context(ParseSnafu)
    }

    /// Builds a map of names to "selves" from the provided path to a yaml
    fn load_named<P>(path: P) -> Result<BTreeMap<String, Self>, ConfigError>
    where
        P: AsRef<Path>,
    {
        let file = File::open(path).context(ReadSnafu)?;
        let reader = BufReader::new(file);

        serde_yaml::from_reader(reader).context(ParseSnafu)
    }

    /// Builds "Self" from the provided string of a yaml
    fn loads(data: &str) -> Result<Self, ConfigError> {
        debug!("Loading YAML:\n{data}");
        serde_yaml::from_str(data).context(ParseSnafu)
    }

    /// Builds a sequence of "Selves" from the provided string of a yaml
    fn loads_many(data: &str) -> Result<Vec<Self>, ConfigError> {
        debug!("Loading YAML:\n{data}");
        serde_yaml::from_str(data).context(ParseSnafu)
    }
}
