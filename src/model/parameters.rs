//! Defines the `ModelParameters` struct, which represents the contents of `model.toml`.
use crate::energy_carrier::EnergyCarrierID;
use crate::input::{input_err_msg, read_toml};
use crate::process::ProcessID;
use crate::product::ProductID;
use crate::production_unit::DecisionRules;
use crate::units::{Distance, MoneyPerDistance, MoneyPerEmissions, UnitType};
use crate::year::year_span;
use anyhow::{Context, Result, ensure};
use itertools::Itertools;
use serde::Deserialize;
use serde_string_enum::DeserializeLabeledStringEnum;
use std::path::Path;

const MODEL_PARAMETERS_FILE_NAME: &str = "model.toml";

macro_rules! define_unit_param_default {
    ($name:ident, $type: ty, $value: expr) => {
        fn $name() -> $type {
            <$type>::new($value)
        }
    };
}

macro_rules! define_param_default {
    ($name:ident, $type: ty, $value: expr) => {
        fn $name() -> $type {
            $value
        }
    };
}

define_param_default!(default_year_increment, u32, 1);
define_unit_param_default!(default_co2_price_2015, MoneyPerEmissions, 80.0);
define_unit_param_default!(default_co2_price_2050, MoneyPerEmissions, 300.0);
define_param_default!(default_hydrogen_carrier_id, EnergyCarrierID, "15".into());
define_param_default!(default_electricity_carrier_id, EnergyCarrierID, "1".into());
define_param_default!(
    default_direct_reduction_process_ids,
    Vec<ProcessID>,
    vec!["38".into(), "39".into()]
);
define_unit_param_default!(default_h2_distance_threshold, Distance, 50.0);
define_unit_param_default!(default_pipeline_cost_per_km, MoneyPerDistance, 100.0);

/// Represents the contents of the entire model file.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ModelParameters {
    /// Name of the scenario, which is written to the run metadata
    #[serde(default)]
    pub scenario_id: String,
    /// Whether production units decide deterministically or with a random element
    #[serde(default)]
    pub simulation_mode: SimulationMode,
    /// First simulated year
    pub start_year: u32,
    /// Last simulated year
    pub end_year: u32,
    /// Number of years between simulated years
    #[serde(default = "default_year_increment")]
    pub year_increment: u32,
    /// Default CO2 price in the base year, for regions which don't give their own
    #[serde(default = "default_co2_price_2015")]
    pub co2_price_2015: MoneyPerEmissions,
    /// Default CO2 price in 2050, for regions which don't give their own
    #[serde(default = "default_co2_price_2050")]
    pub co2_price_2050: MoneyPerEmissions,
    /// Seed for the random number generator.
    ///
    /// If not given, a different seed is used for every run.
    #[serde(default)]
    pub seed: Option<u64>,
    /// Only simulate production units making these products
    #[serde(default)]
    pub product_filter: Option<Vec<ProductID>>,
    /// The carrier delivered by hydrogen pipelines
    #[serde(default = "default_hydrogen_carrier_id")]
    pub hydrogen_carrier_id: EnergyCarrierID,
    /// The carrier which every process consumes for electricity
    #[serde(default = "default_electricity_carrier_id")]
    pub electricity_carrier_id: EnergyCarrierID,
    /// Processes which can switch fuel without reinvesting
    #[serde(default = "default_direct_reduction_process_ids")]
    pub direct_reduction_process_ids: Vec<ProcessID>,
    /// Maximum distance to a hydrogen pipeline for a site to use hydrogen (km)
    #[serde(default = "default_h2_distance_threshold")]
    pub h2_distance_threshold: Distance,
    /// Cost of connecting a site to a hydrogen pipeline per km
    #[serde(default = "default_pipeline_cost_per_km")]
    pub pipeline_cost_per_km: MoneyPerDistance,
    /// Number of years either side of end of life in which a unit may wait for a pipeline
    #[serde(default)]
    pub reinvestment_wait_window: u32,
}

/// How production units decide whether to reconsider their process
#[derive(DeserializeLabeledStringEnum, Debug, Clone, Copy, PartialEq, Default)]
pub enum SimulationMode {
    /// Units reconsider their process only when they must
    #[default]
    #[string = "deterministic"]
    Deterministic,
    /// Units not forced to reconsider do so at random
    #[string = "monte_carlo"]
    MonteCarlo,
}

/// Check that a price is a finite, non-negative number
fn check_price<T: UnitType + PartialOrd>(value: T, name: &str) -> Result<()> {
    ensure!(
        value.is_finite() && value >= T::new(0.0),
        "{name} must be a finite number greater than or equal to zero"
    );

    Ok(())
}

/// Check that the product filter, if given, names at least one product
fn check_product_filter(filter: Option<&[ProductID]>) -> Result<()> {
    if let Some(filter) = filter {
        ensure!(!filter.is_empty(), "product_filter cannot be empty");
        ensure!(
            filter.iter().all_unique(),
            "product_filter cannot contain duplicates"
        );
    }

    Ok(())
}

impl ModelParameters {
    /// Read a model file from the specified directory.
    ///
    /// # Arguments
    ///
    /// * `model_dir` - Folder containing model configuration files
    ///
    /// # Returns
    ///
    /// The model file contents as a [`ModelParameters`] struct or an error if the file is invalid
    pub fn from_path<P: AsRef<Path>>(model_dir: P) -> Result<ModelParameters> {
        let file_path = model_dir.as_ref().join(MODEL_PARAMETERS_FILE_NAME);
        let model_params: ModelParameters = read_toml(&file_path)?;

        model_params
            .validate()
            .with_context(|| input_err_msg(file_path))?;

        Ok(model_params)
    }

    /// Validate parameters after reading in file
    fn validate(&self) -> Result<()> {
        // start_year, end_year and year_increment
        year_span(self.start_year, self.end_year, self.year_increment)?;

        // CO2 prices
        check_price(self.co2_price_2015, "co2_price_2015")?;
        check_price(self.co2_price_2050, "co2_price_2050")?;

        // product_filter
        check_product_filter(self.product_filter.as_deref())?;

        // direct_reduction_process_ids
        ensure!(
            self.direct_reduction_process_ids.iter().all_unique(),
            "direct_reduction_process_ids cannot contain duplicates"
        );

        // h2_distance_threshold and pipeline_cost_per_km
        check_price(self.h2_distance_threshold, "h2_distance_threshold")?;
        check_price(self.pipeline_cost_per_km, "pipeline_cost_per_km")?;

        Ok(())
    }

    /// The simulated years
    pub fn years(&self) -> Result<Vec<u32>> {
        year_span(self.start_year, self.end_year, self.year_increment)
    }

    /// Settings governing the decisions of production units
    pub fn decision_rules(&self) -> DecisionRules {
        DecisionRules {
            fuel_switch_process_ids: self.direct_reduction_process_ids.clone(),
            h2_distance_threshold: self.h2_distance_threshold,
            reinvestment_wait_window: self.reinvestment_wait_window,
        }
    }
}
