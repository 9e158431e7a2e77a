//! Code for reading region-related information from CSV files.
use super::{check_values_finite, input_err_msg, read_csv};
use crate::model::ModelParameters;
use crate::region::RegionID;
use crate::units::{MoneyPerEmissions, UnitType};
use crate::year::Trajectory;
use anyhow::{Context, Result, ensure};
use indexmap::IndexMap;
use serde::Deserialize;
use std::path::Path;

const REGIONS_FILE_NAME: &str = "regions.csv";

/// A region as described in the regions file
#[derive(Debug, PartialEq)]
pub struct RegionDefinition {
    /// A text description of the region (e.g. "Germany")
    pub description: String,
    /// Price of emitting a ton of CO2
    pub co2_price: Trajectory<MoneyPerEmissions>,
}

#[derive(Debug, PartialEq, Deserialize)]
struct RegionRaw {
    id: RegionID,
    description: String,
    co2_price_2015: Option<MoneyPerEmissions>,
    co2_price_2050: Option<MoneyPerEmissions>,
}

/// Reads regions from a CSV file.
///
/// Regions which don't give their own CO2 prices use those from the model file.
///
/// # Arguments
///
/// * `model_dir` - Folder containing model configuration files
/// * `parameters` - Model parameters
///
/// # Returns
///
/// A map of regions keyed by ID or an error
pub fn read_regions(
    model_dir: &Path,
    parameters: &ModelParameters,
) -> Result<IndexMap<RegionID, RegionDefinition>> {
    let file_path = model_dir.join(REGIONS_FILE_NAME);
    let regions_csv = read_csv(&file_path)?;
    read_regions_from_iter(regions_csv, parameters).with_context(|| input_err_msg(&file_path))
}

fn read_regions_from_iter<I>(
    iter: I,
    parameters: &ModelParameters,
) -> Result<IndexMap<RegionID, RegionDefinition>>
where
    I: Iterator<Item = RegionRaw>,
{
    let mut regions = IndexMap::new();
    for region in iter {
        let value_2015 = region.co2_price_2015.unwrap_or(parameters.co2_price_2015);
        let value_2050 = region.co2_price_2050.unwrap_or(parameters.co2_price_2050);
        check_values_finite([
            ("co2_price_2015", value_2015.value()),
            ("co2_price_2050", value_2050.value()),
        ])
        .with_context(|| format!("Invalid CO2 price for region {}", region.id))?;

        let definition = RegionDefinition {
            description: region.description,
            co2_price: Trajectory::linear(value_2015, value_2050),
        };
        ensure!(
            regions.insert(region.id.clone(), definition).is_none(),
            "Duplicate region ID found: {}",
            region.id
        );
    }

    Ok(regions)
}
