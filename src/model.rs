//! The model represents the static input data provided by the user.
use crate::pipeline::PipelineNetwork;
use crate::region::RegionMap;
use anyhow::Result;
use std::path::PathBuf;

pub mod parameters;
pub use parameters::{ModelParameters, SimulationMode};

/// Model definition
#[derive(Debug, Clone, PartialEq)]
pub struct Model {
    /// Path to model folder
    pub model_path: PathBuf,
    /// Parameters from the model TOML file
    pub parameters: ModelParameters,
    /// Regions, along with their sites and production units
    pub regions: RegionMap,
    /// Hydrogen pipelines, if the model has any
    pub pipelines: Option<PipelineNetwork>,
}

impl Model {
    /// The simulated years, in order
    pub fn years(&self) -> Result<Vec<u32>> {
        self.parameters.years()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::model;
    use itertools::Itertools;
    use rstest::rstest;

    #[rstest]
    fn test_years(model: Model) {
        assert_eq!(model.years().unwrap(), (2020..=2032).collect_vec());
    }
}
