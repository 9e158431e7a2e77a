//! Code for reading energy carriers and their regional parameters from CSV files.
use super::region::RegionDefinition;
use super::{check_values_finite, input_err_msg, read_csv};
use crate::energy_carrier::{EnergyCarrier, EnergyCarrierID, EnergyCarrierMap};
use crate::id::IDCollection;
use crate::region::RegionID;
use crate::units::{EmissionsPerEnergy, Energy, MoneyPerEnergy};
use crate::year::Trajectory;
use anyhow::{Context, Result, ensure};
use indexmap::IndexMap;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use std::rc::Rc;

const ENERGY_CARRIERS_FILE_NAME: &str = "energy_carriers.csv";
const ENERGY_CARRIER_PARAMETERS_FILE_NAME: &str = "energy_carrier_parameters.csv";

#[derive(Debug, PartialEq, Deserialize)]
struct EnergyCarrierRaw {
    id: EnergyCarrierID,
    name: String,
}

#[derive(Debug, PartialEq, Deserialize)]
struct EnergyCarrierParameterRaw {
    region_id: String,
    energy_carrier_id: String,
    cost_2015: f64,
    cost_2030: f64,
    cost_2050: f64,
    emission_2015: f64,
    emission_2050: f64,
    availability_2015: f64,
    availability_2050: f64,
    subsidies_2015: f64,
    subsidies_2030: f64,
    subsidies_2050: f64,
    taxes_2015: f64,
    taxes_2050: f64,
}

impl EnergyCarrierParameterRaw {
    fn validate(&self) -> Result<()> {
        check_values_finite([
            ("cost_2015", self.cost_2015),
            ("cost_2030", self.cost_2030),
            ("cost_2050", self.cost_2050),
            ("emission_2015", self.emission_2015),
            ("emission_2050", self.emission_2050),
            ("availability_2015", self.availability_2015),
            ("availability_2050", self.availability_2050),
            ("subsidies_2015", self.subsidies_2015),
            ("subsidies_2030", self.subsidies_2030),
            ("subsidies_2050", self.subsidies_2050),
            ("taxes_2015", self.taxes_2015),
            ("taxes_2050", self.taxes_2050),
        ])?;

        // The cost falls exponentially until 2030, which is only defined for these values
        ensure!(self.cost_2015 > 0.0, "cost_2015 must be greater than zero");
        ensure!(
            self.cost_2030 >= 0.0,
            "cost_2030 must be greater than or equal to zero"
        );

        Ok(())
    }

    fn into_carrier(self, id: EnergyCarrierID, name: String) -> EnergyCarrier {
        EnergyCarrier {
            id,
            name,
            cost: Trajectory::ExponentialDecrease {
                value_2015: MoneyPerEnergy(self.cost_2015),
                value_2030: MoneyPerEnergy(self.cost_2030),
                value_2050: MoneyPerEnergy(self.cost_2050),
            },
            emission: Trajectory::linear(
                EmissionsPerEnergy(self.emission_2015),
                EmissionsPerEnergy(self.emission_2050),
            ),
            availability: Trajectory::linear(
                Energy(self.availability_2015),
                Energy(self.availability_2050),
            ),
            subsidies: Trajectory::Kinked {
                value_2015: MoneyPerEnergy(self.subsidies_2015),
                value_2030: MoneyPerEnergy(self.subsidies_2030),
                value_2050: MoneyPerEnergy(self.subsidies_2050),
            },
            taxes: Trajectory::linear(
                MoneyPerEnergy(self.taxes_2015),
                MoneyPerEnergy(self.taxes_2050),
            ),
        }
    }
}

/// Read energy carriers, priced for every region, from the model directory.
///
/// # Arguments
///
/// * `model_dir` - Folder containing model configuration files
/// * `regions` - All regions in the model
///
/// # Returns
///
/// A map of energy carriers for each region or an error. Every region has every carrier.
pub fn read_energy_carriers(
    model_dir: &Path,
    regions: &IndexMap<RegionID, RegionDefinition>,
) -> Result<IndexMap<RegionID, EnergyCarrierMap>> {
    let file_path = model_dir.join(ENERGY_CARRIERS_FILE_NAME);
    let names = read_energy_carrier_names(read_csv(&file_path)?)
        .with_context(|| input_err_msg(&file_path))?;

    let file_path = model_dir.join(ENERGY_CARRIER_PARAMETERS_FILE_NAME);
    let parameters_csv = read_csv(&file_path)?;
    read_energy_carrier_parameters_from_iter(parameters_csv, &names, regions)
        .with_context(|| input_err_msg(&file_path))
}

fn read_energy_carrier_names<I>(iter: I) -> Result<IndexMap<EnergyCarrierID, String>>
where
    I: Iterator<Item = EnergyCarrierRaw>,
{
    let mut names = IndexMap::new();
    for carrier in iter {
        ensure!(
            names.insert(carrier.id.clone(), carrier.name).is_none(),
            "Duplicate energy carrier ID found: {}",
            carrier.id
        );
    }

    Ok(names)
}

fn read_energy_carrier_parameters_from_iter<I>(
    iter: I,
    names: &IndexMap<EnergyCarrierID, String>,
    regions: &IndexMap<RegionID, RegionDefinition>,
) -> Result<IndexMap<RegionID, EnergyCarrierMap>>
where
    I: Iterator<Item = EnergyCarrierParameterRaw>,
{
    let mut carriers = HashMap::new();
    for param in iter {
        let region_id = regions.get_id_by_str(&param.region_id)?;
        let carrier_id = names.get_id_by_str(&param.energy_carrier_id)?;
        param.validate().with_context(|| {
            format!("Invalid parameters for energy carrier {carrier_id} in region {region_id}")
        })?;

        let carrier = param.into_carrier(carrier_id.clone(), names[&carrier_id].clone());
        ensure!(
            carriers
                .insert((region_id.clone(), carrier_id.clone()), Rc::new(carrier))
                .is_none(),
            "More than one set of parameters given for energy carrier {carrier_id} in region \
            {region_id}"
        );
    }

    // Assemble in input order, checking that nothing is missing
    let mut map = IndexMap::new();
    for region_id in regions.keys() {
        let mut region_carriers = EnergyCarrierMap::new();
        for carrier_id in names.keys() {
            let carrier = carriers
                .remove(&(region_id.clone(), carrier_id.clone()))
                .with_context(|| {
                    format!("Missing parameters for energy carrier {carrier_id} in region {region_id}")
                })?;
            region_carriers.insert(carrier_id.clone(), carrier);
        }
        map.insert(region_id.clone(), region_carriers);
    }

    Ok(map)
}
