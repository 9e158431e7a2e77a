//! Code for reading products, processes and demand shares from CSV files.
use super::{
    check_values_finite, deserialise_proportion, input_err_msg, read_csv, read_csv_optional,
};
use crate::demand::{Demand, DemandKind};
use crate::energy_carrier::{EnergyCarrierID, EnergyCarrierMap};
use crate::id::IDCollection;
use crate::model::ModelParameters;
use crate::process::{Process, ProcessID, ProcessParameter};
use crate::product::{Product, ProductID, ProductMap};
use crate::region::RegionID;
use crate::units::{Dimensionless, EmissionsPerTon, EnergyPerTon, MoneyPerTon};
use crate::year::Trajectory;
use anyhow::{Context, Result, ensure};
use indexmap::IndexMap;
use serde::Deserialize;
use std::path::Path;
use std::rc::Rc;

const PRODUCT_PROCESSES_FILE_NAME: &str = "product_processes.csv";
const FUEL_SHARES_FILE_NAME: &str = "fuel_shares.csv";
const STEAM_SHARES_FILE_NAME: &str = "steam_shares.csv";
const FEEDSTOCK_SHARES_FILE_NAME: &str = "feedstock_shares.csv";

/// A process is identified by the product it makes along with its own ID
pub type ProductProcessKey = (ProductID, ProcessID);

/// The products and processes of a single region.
///
/// Every process is created once per region and shared between all the units which use it.
#[derive(Debug, PartialEq)]
pub struct ProcessCatalog {
    /// Every process, whether or not units may switch to it
    pub processes: IndexMap<ProductProcessKey, Rc<Process>>,
    /// Products, along with the processes units may switch to
    pub products: ProductMap,
}

#[derive(Debug, PartialEq, Deserialize)]
struct ProductProcessRaw {
    product_id: ProductID,
    process_id: ProcessID,
    is_alternative: bool,
    capex_2015: f64,
    capex_2050: f64,
    opex_2015: f64,
    opex_2050: f64,
    lifetime: u32,
    interest_rate: f64,
    depreciation_period: u32,
    process_emission: f64,
    efficiency_improvement_2015: f64,
    efficiency_improvement_2050: f64,
    investment_funding_2015: f64,
    investment_funding_2050: f64,
    investment_flexibility_2015: f64,
    investment_flexibility_2050: f64,
    electricity_demand: f64,
    fuel_demand: f64,
    feedstock_demand: f64,
    steam_demand: f64,
}

impl ProductProcessRaw {
    /// Convert the economic columns into a [`ProcessParameter`]
    fn to_parameter(&self) -> Result<ProcessParameter> {
        check_values_finite([
            ("capex_2015", self.capex_2015),
            ("capex_2050", self.capex_2050),
            ("opex_2015", self.opex_2015),
            ("opex_2050", self.opex_2050),
            ("efficiency_improvement_2015", self.efficiency_improvement_2015),
            ("efficiency_improvement_2050", self.efficiency_improvement_2050),
            ("investment_funding_2015", self.investment_funding_2015),
            ("investment_funding_2050", self.investment_funding_2050),
            ("investment_flexibility_2015", self.investment_flexibility_2015),
            ("investment_flexibility_2050", self.investment_flexibility_2050),
        ])?;

        Ok(ProcessParameter {
            capex: Trajectory::linear(MoneyPerTon(self.capex_2015), MoneyPerTon(self.capex_2050)),
            opex: Trajectory::linear(MoneyPerTon(self.opex_2015), MoneyPerTon(self.opex_2050)),
            lifetime: self.lifetime,
            interest_rate: Dimensionless(self.interest_rate),
            depreciation_period: self.depreciation_period,
            process_emission: EmissionsPerTon(self.process_emission),
            efficiency_improvement: Trajectory::linear(
                Dimensionless(self.efficiency_improvement_2015),
                Dimensionless(self.efficiency_improvement_2050),
            ),
            investment_funding: Trajectory::linear(
                MoneyPerTon(self.investment_funding_2015),
                MoneyPerTon(self.investment_funding_2050),
            ),
            investment_flexibility: Trajectory::linear(
                Dimensionless(self.investment_flexibility_2015),
                Dimensionless(self.investment_flexibility_2050),
            ),
        })
    }

    /// The declared demand per ton which is split between carriers according to a shares file
    fn shared_demand(&self, kind: DemandKind) -> f64 {
        match kind {
            DemandKind::Energy => self.fuel_demand,
            DemandKind::Steam => self.steam_demand,
            DemandKind::Feedstock => self.feedstock_demand,
        }
    }
}

#[derive(Debug, PartialEq, Deserialize)]
struct DemandShareRaw {
    product_id: String,
    process_id: String,
    energy_carrier_id: EnergyCarrierID,
    #[serde(deserialize_with = "deserialise_proportion")]
    share: f64,
}

/// The share of a declared demand met by each carrier
type DemandShareMap = IndexMap<ProductProcessKey, Vec<(EnergyCarrierID, f64)>>;

/// A row of the product processes file, along with its validated parameter
#[derive(Debug)]
struct ProcessDefinition {
    raw: ProductProcessRaw,
    parameter: ProcessParameter,
}

/// Read the processes for every region from the model directory.
///
/// # Arguments
///
/// * `model_dir` - Folder containing model configuration files
/// * `carriers` - Energy carriers for each region
/// * `parameters` - Model parameters
///
/// # Returns
///
/// The products and processes of each region or an error.
pub fn read_process_catalog(
    model_dir: &Path,
    carriers: &IndexMap<RegionID, EnergyCarrierMap>,
    parameters: &ModelParameters,
) -> Result<IndexMap<RegionID, ProcessCatalog>> {
    let file_path = model_dir.join(PRODUCT_PROCESSES_FILE_NAME);
    let definitions = read_product_processes_from_iter(read_csv(&file_path)?)
        .with_context(|| input_err_msg(&file_path))?;

    let mut shares = IndexMap::new();
    for (kind, file_name) in [
        (DemandKind::Energy, FUEL_SHARES_FILE_NAME),
        (DemandKind::Steam, STEAM_SHARES_FILE_NAME),
        (DemandKind::Feedstock, FEEDSTOCK_SHARES_FILE_NAME),
    ] {
        let file_path = model_dir.join(file_name);
        let shares_csv = read_csv_optional(&file_path)?;
        let kind_shares = read_demand_shares_from_iter(shares_csv, &definitions)
            .with_context(|| input_err_msg(&file_path))?;
        shares.insert(kind, kind_shares);
    }

    carriers
        .iter()
        .map(|(region_id, carriers)| {
            let catalog = create_catalog(&definitions, &shares, carriers, parameters)
                .with_context(|| format!("Error creating processes for region {region_id}"))?;
            Ok((region_id.clone(), catalog))
        })
        .collect()
}

fn read_product_processes_from_iter<I>(
    iter: I,
) -> Result<IndexMap<ProductProcessKey, ProcessDefinition>>
where
    I: Iterator<Item = ProductProcessRaw>,
{
    let mut definitions = IndexMap::new();
    for raw in iter {
        let key = (raw.product_id.clone(), raw.process_id.clone());
        let parameter = raw
            .to_parameter()
            .with_context(|| format!("Invalid process {}|{}", key.0, key.1))?;
        check_values_finite([
            ("electricity_demand", raw.electricity_demand),
            ("fuel_demand", raw.fuel_demand),
            ("feedstock_demand", raw.feedstock_demand),
            ("steam_demand", raw.steam_demand),
        ])
        .with_context(|| format!("Invalid demands for process {}|{}", key.0, key.1))?;

        ensure!(
            !definitions.contains_key(&key),
            "Process {}|{} is defined more than once",
            key.0,
            key.1
        );
        definitions.insert(key, ProcessDefinition { raw, parameter });
    }

    Ok(definitions)
}

fn read_demand_shares_from_iter<I>(
    iter: I,
    definitions: &IndexMap<ProductProcessKey, ProcessDefinition>,
) -> Result<DemandShareMap>
where
    I: Iterator<Item = DemandShareRaw>,
{
    let mut shares = DemandShareMap::new();
    for share in iter {
        let key = (
            ProductID::new(&share.product_id),
            ProcessID::new(&share.process_id),
        );
        ensure!(
            definitions.contains_key(&key),
            "Shares given for unknown process {}|{}",
            key.0,
            key.1
        );

        shares
            .entry(key)
            .or_default()
            .push((share.energy_carrier_id, share.share));
    }

    Ok(shares)
}

/// Create the demands of one kind for a process
fn create_demands(
    key: &ProductProcessKey,
    kind: DemandKind,
    declared: f64,
    shares: &DemandShareMap,
    carriers: &EnergyCarrierMap,
) -> Result<Vec<Demand>> {
    if declared <= 0.0 {
        return Ok(Vec::new());
    }

    let shares = shares.get(key).with_context(|| {
        format!(
            "No {kind} demand shares for product|process: {}|{}",
            key.0, key.1
        )
    })?;

    shares
        .iter()
        .map(|(carrier_id, share)| {
            let carrier_id = carriers.get_id(carrier_id)?;
            Ok(Demand::new(
                Rc::clone(&carriers[&carrier_id]),
                EnergyPerTon(declared * share),
            ))
        })
        .collect()
}

/// Create every process and product for one region
fn create_catalog(
    definitions: &IndexMap<ProductProcessKey, ProcessDefinition>,
    shares: &IndexMap<DemandKind, DemandShareMap>,
    carriers: &EnergyCarrierMap,
    parameters: &ModelParameters,
) -> Result<ProcessCatalog> {
    let electricity_id = carriers
        .get_id(&parameters.electricity_carrier_id)
        .context("The electricity carrier must be defined")?;
    let electricity = &carriers[&electricity_id];

    let mut processes = IndexMap::new();
    let mut alternatives: IndexMap<ProductID, Vec<Rc<Process>>> = IndexMap::new();
    for (key, definition) in definitions {
        // Every process uses electricity, in addition to its fuels
        let mut demands: IndexMap<DemandKind, Vec<Demand>> = IndexMap::new();
        for (kind, kind_shares) in shares {
            let declared = definition.raw.shared_demand(*kind);
            demands.insert(
                *kind,
                create_demands(key, *kind, declared, kind_shares, carriers)?,
            );
        }
        let mut energy_demands = vec![Demand::new(
            Rc::clone(electricity),
            EnergyPerTon(definition.raw.electricity_demand),
        )];
        energy_demands.extend(demands.shift_remove(&DemandKind::Energy).unwrap_or_default());

        let process = Process::new(
            key.1.clone(),
            definition.parameter.clone(),
            energy_demands,
            demands.shift_remove(&DemandKind::Steam).unwrap_or_default(),
            demands
                .shift_remove(&DemandKind::Feedstock)
                .unwrap_or_default(),
            &parameters.hydrogen_carrier_id,
        )
        .with_context(|| format!("Invalid process {}|{}", key.0, key.1))?;
        let process = Rc::new(process);

        let product_alternatives = alternatives.entry(key.0.clone()).or_default();
        if definition.raw.is_alternative {
            product_alternatives.push(Rc::clone(&process));
        }
        processes.insert(key.clone(), process);
    }

    let products = alternatives
        .into_iter()
        .map(|(id, processes)| {
            let product = Product {
                id: id.clone(),
                processes,
            };
            (id, Rc::new(product))
        })
        .collect();

    Ok(ProcessCatalog {
        processes,
        products,
    })
}
