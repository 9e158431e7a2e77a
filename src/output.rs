//! The module responsible for writing output data to disk.
use crate::demand::DemandKind;
use crate::energy_carrier::EnergyCarrierID;
use crate::pipeline::{PipelineID, PipelineNetwork};
use crate::process::ProcessID;
use crate::product::ProductID;
use crate::production_unit::{LeafState, ProductionUnit, ProductionUnitID};
use crate::region::{Region, RegionID};
use crate::site::{Site, SiteID};
use crate::units::{Money, UnitType};
use crate::visitor::ResultVisitor;
use anyhow::{Context, Result, ensure};
use itertools::Itertools;
use serde::Serialize;
use std::collections::HashSet;
use std::fs;
use std::fs::File;
use std::path::{Path, PathBuf};

pub mod metadata;

/// The root folder in which model-specific output folders will be created
pub const OUTPUT_DIRECTORY_ROOT: &str = "techdiff_results";

/// The output file name for production unit results
const PRODUCTION_UNIT_RESULTS_FILE_NAME: &str = "production_unit_results.csv";

/// The output file name for energy carrier consumption
const ENERGY_CARRIER_RESULTS_FILE_NAME: &str = "energy_carrier_results.csv";

/// The output file name for the comparison of processes
const PROCESS_COMPARISON_FILE_NAME: &str = "process_comparison.csv";

/// The output file name for the comparison of energy carriers
const ENERGY_CARRIER_COMPARISON_FILE_NAME: &str = "energy_carrier_comparison.csv";

/// The output file name for the processes used at each site
const SITE_PROCESSES_FILE_NAME: &str = "site_processes.csv";

/// The output file name for pipeline modes
const PIPELINE_MODES_FILE_NAME: &str = "pipeline_modes.csv";

/// The output file name for the state of production units
const UNIT_STATES_FILE_NAME: &str = "debug_unit_states.csv";

/// Get the model name from the specified directory path
pub fn get_output_dir(model_dir: &Path) -> Result<PathBuf> {
    // Get the model name from the dir path. This ends up being convoluted because we need to check
    // for all possible errors. Ugh.
    let model_dir = model_dir
        .canonicalize() // canonicalise in case the user has specified "."
        .context("Could not resolve path to model")?;

    let model_name = model_dir
        .file_name()
        .context("Model cannot be in root folder")?
        .to_str()
        .context("Invalid chars in model dir name")?;

    // Construct path
    Ok([OUTPUT_DIRECTORY_ROOT, model_name].iter().collect())
}

/// Create a new output directory for the model, optionally overwriting existing data
///
/// # Arguments
///
/// * `output_dir` - The output directory to create/overwrite
/// * `allow_overwrite` - Whether to delete and recreate the folder if it is non-empty
///
/// # Returns
///
/// True if the output dir contained existing data that was deleted, false if not, or an error.
pub fn create_output_directory(output_dir: &Path, allow_overwrite: bool) -> Result<bool> {
    // If the folder already exists, then delete it
    let overwrite = if let Ok(mut it) = fs::read_dir(output_dir) {
        if it.next().is_none() {
            // Folder exists and is empty: nothing to do
            return Ok(false);
        }

        ensure!(
            allow_overwrite,
            "Output folder already exists and is not empty. \
            Please delete the folder or pass the --overwrite command-line option."
        );

        fs::remove_dir_all(output_dir).context("Could not delete folder")?;
        true
    } else {
        false
    };

    // Try to create the directory, with parents
    fs::create_dir_all(output_dir)?;

    Ok(overwrite)
}

/// Metrics reported for each production unit
#[derive(Debug, Clone, Copy, PartialEq, strum::IntoStaticStr, strum::EnumIter)]
#[strum(serialize_all = "snake_case")]
enum UnitMetric {
    Production,
    ProductionCost,
    ProductionCostPerTon,
    EmissionCost,
    ProcessEmission,
    ProcessEmissionCost,
    EnergyEmission,
    Annuity,
    AnnuityPerTon,
    Opex,
    OpexPerTon,
    CarrierCostPerTon,
    NewInvestment,
    EfficiencyImprovement,
    InvestmentFlexibility,
    YearOfLastReinvestment,
}

/// Metrics reported for the consumption of each energy carrier by each production unit
#[derive(Debug, Clone, Copy, PartialEq, strum::IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
enum ConsumptionMetric {
    Consumption,
    Cost,
    CostPerTon,
    Emission,
    EmissionCost,
    EmissionCostPerTon,
    CostIncludingEmissions,
}

/// Metrics reported for every process eligible to make a product
#[derive(Debug, Clone, Copy, PartialEq, strum::IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
enum ProcessMetric {
    ProductionCostPerTon,
    AnnuityPerTon,
    OpexPerTon,
    EnergyEmissionCostPerTon,
    ProcessEmissionCostPerTon,
    EfficiencyImprovement,
    InvestmentFlexibility,
}

/// Metrics reported for each energy carrier in each region
#[derive(Debug, Clone, Copy, PartialEq, strum::IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
enum CarrierMetric {
    Cost,
    Emission,
    Availability,
    Subsidies,
    Taxes,
}

/// Represents a row in the production unit results CSV file
#[derive(Serialize)]
struct ProductionUnitResultRow<'a> {
    scenario_id: &'a str,
    year: u32,
    region_id: &'a RegionID,
    site_id: &'a SiteID,
    production_unit_id: &'a ProductionUnitID,
    product_id: &'a ProductID,
    process_id: &'a ProcessID,
    metric: &'static str,
    value: f64,
}

/// Represents a row in the energy carrier results CSV file
#[derive(Serialize)]
struct EnergyCarrierResultRow<'a> {
    scenario_id: &'a str,
    year: u32,
    region_id: &'a RegionID,
    site_id: &'a SiteID,
    production_unit_id: &'a ProductionUnitID,
    energy_carrier_id: &'a EnergyCarrierID,
    demand_kind: &'static str,
    metric: &'static str,
    value: f64,
}

/// Represents a row in the process comparison CSV file.
///
/// The value is empty where it is undefined.
#[derive(Serialize)]
struct ProcessComparisonRow<'a> {
    scenario_id: &'a str,
    year: u32,
    region_id: &'a RegionID,
    product_id: &'a ProductID,
    process_id: &'a ProcessID,
    metric: &'static str,
    value: Option<f64>,
}

/// Represents a row in the energy carrier comparison CSV file
#[derive(Serialize)]
struct EnergyCarrierComparisonRow<'a> {
    scenario_id: &'a str,
    year: u32,
    region_id: &'a RegionID,
    energy_carrier_id: &'a EnergyCarrierID,
    metric: &'static str,
    value: f64,
}

/// Represents a row in the site processes CSV file
#[derive(Serialize)]
struct SiteProcessesRow<'a> {
    scenario_id: &'a str,
    year: u32,
    region_id: &'a RegionID,
    site_id: &'a SiteID,
    longitude: f64,
    latitude: f64,
    process_ids: String,
}

/// Represents a row in the pipeline modes CSV file
#[derive(Serialize)]
struct PipelineModeRow<'a> {
    scenario_id: &'a str,
    year: u32,
    pipeline_id: &'a PipelineID,
    mode: &'static str,
}

/// Represents a row in the production unit states CSV file
#[derive(Serialize)]
struct UnitStateRow<'a> {
    scenario_id: &'a str,
    year: u32,
    production_unit_id: &'a ProductionUnitID,
    process_id: &'a ProcessID,
    previous_process_id: &'a ProcessID,
    year_of_last_reinvestment: Option<u32>,
    previous_year_of_last_reinvestment: Option<u32>,
}

/// Open a CSV writer for the named file in the output folder
fn new_writer(output_path: &Path, file_name: &str) -> Result<csv::Writer<File>> {
    let file_path = output_path.join(file_name);
    csv::Writer::from_path(&file_path)
        .with_context(|| format!("Could not create {}", file_path.display()))
}

/// For writing extra debug information about the model
struct DebugDataWriter {
    unit_states_writer: csv::Writer<File>,
}

impl DebugDataWriter {
    /// Open CSV files to write debug info to
    ///
    /// # Arguments
    ///
    /// * `output_path` - Folder where files will be saved
    fn create(output_path: &Path) -> Result<Self> {
        Ok(Self {
            unit_states_writer: new_writer(output_path, UNIT_STATES_FILE_NAME)?,
        })
    }

    /// Write the decision state of a production unit
    fn write_unit_state(
        &mut self,
        scenario_id: &str,
        year: u32,
        unit_id: &ProductionUnitID,
        leaf: &LeafState,
    ) -> Result<()> {
        let row = UnitStateRow {
            scenario_id,
            year,
            production_unit_id: unit_id,
            process_id: &leaf.process.id,
            previous_process_id: &leaf.previous_process.id,
            year_of_last_reinvestment: leaf.year_of_last_reinvestment,
            previous_year_of_last_reinvestment: leaf.previous_year_of_last_reinvestment,
        };
        self.unit_states_writer.serialize(row)?;

        Ok(())
    }

    /// Flush the underlying streams
    fn flush(&mut self) -> Result<()> {
        self.unit_states_writer.flush()?;

        Ok(())
    }
}

/// Writes simulation results to CSV files as the model is traversed
pub struct DataWriter {
    /// The scenario which every row is labelled with
    scenario_id: String,
    unit_results_writer: csv::Writer<File>,
    carrier_results_writer: csv::Writer<File>,
    process_comparison_writer: csv::Writer<File>,
    carrier_comparison_writer: csv::Writer<File>,
    site_processes_writer: csv::Writer<File>,
    pipeline_modes_writer: csv::Writer<File>,
    debug_writer: Option<DebugDataWriter>,
    /// Products whose processes have already been compared, per region and year
    compared_products: HashSet<(RegionID, ProductID, u32)>,
}

impl DataWriter {
    /// Open CSV files to write output data to
    ///
    /// # Arguments
    ///
    /// * `output_path` - Folder where files will be saved
    /// * `scenario_id` - The scenario being run
    /// * `save_debug_info` - Whether to include extra CSV files for debugging model
    pub fn create(output_path: &Path, scenario_id: &str, save_debug_info: bool) -> Result<Self> {
        let debug_writer = if save_debug_info {
            // Create debug CSV files
            Some(DebugDataWriter::create(output_path)?)
        } else {
            None
        };

        Ok(Self {
            scenario_id: scenario_id.to_string(),
            unit_results_writer: new_writer(output_path, PRODUCTION_UNIT_RESULTS_FILE_NAME)?,
            carrier_results_writer: new_writer(output_path, ENERGY_CARRIER_RESULTS_FILE_NAME)?,
            process_comparison_writer: new_writer(output_path, PROCESS_COMPARISON_FILE_NAME)?,
            carrier_comparison_writer: new_writer(
                output_path,
                ENERGY_CARRIER_COMPARISON_FILE_NAME,
            )?,
            site_processes_writer: new_writer(output_path, SITE_PROCESSES_FILE_NAME)?,
            pipeline_modes_writer: new_writer(output_path, PIPELINE_MODES_FILE_NAME)?,
            debug_writer,
            compared_products: HashSet::new(),
        })
    }

    /// Flush the underlying streams
    pub fn flush(&mut self) -> Result<()> {
        self.unit_results_writer.flush()?;
        self.carrier_results_writer.flush()?;
        self.process_comparison_writer.flush()?;
        self.carrier_comparison_writer.flush()?;
        self.site_processes_writer.flush()?;
        self.pipeline_modes_writer.flush()?;
        if let Some(wtr) = &mut self.debug_writer {
            wtr.flush()?;
        }

        Ok(())
    }

    /// Write the results for a unit which runs a single process
    fn write_unit_results(
        &mut self,
        year: u32,
        region: &Region,
        site: &Site,
        unit_id: &ProductionUnitID,
        leaf: &LeafState,
    ) -> Result<()> {
        let process = &leaf.process;
        let production = leaf.production;
        let co2_price = region.co2_price(year);

        for metric in <UnitMetric as strum::IntoEnumIterator>::iter() {
            let value = match metric {
                UnitMetric::Production => production.value(),
                // Units are reported as if they had no pipeline surcharge
                UnitMetric::ProductionCost => process
                    .production_cost(year, production, co2_price, Money(1.0))
                    .value(),
                UnitMetric::ProductionCostPerTon => process.production_cost_per_ton(year).value(),
                UnitMetric::EmissionCost => {
                    (production * process.emission_cost_per_ton(year, co2_price)).value()
                }
                UnitMetric::ProcessEmission => process.process_emission(production).value(),
                UnitMetric::ProcessEmissionCost => {
                    (process.process_emission(production) * co2_price).value()
                }
                UnitMetric::EnergyEmission => {
                    (production * process.energy_emission_per_ton(year)).value()
                }
                UnitMetric::Annuity => process.annuity(year, production).value(),
                UnitMetric::AnnuityPerTon => process.annuity_per_ton(year).value(),
                UnitMetric::Opex => (production * process.opex_per_ton(year)).value(),
                UnitMetric::OpexPerTon => process.opex_per_ton(year).value(),
                UnitMetric::CarrierCostPerTon => process.carrier_cost_per_ton(year).value(),
                UnitMetric::NewInvestment => leaf.new_investment(year).value(),
                UnitMetric::EfficiencyImprovement => process.efficiency_improvement(year).value(),
                UnitMetric::InvestmentFlexibility => process.investment_flexibility(year).value(),
                UnitMetric::YearOfLastReinvestment => {
                    // Not reported for units whose last reinvestment is unknown
                    let Some(last) = leaf.year_of_last_reinvestment else {
                        continue;
                    };
                    f64::from(last)
                }
            };

            let row = ProductionUnitResultRow {
                scenario_id: &self.scenario_id,
                year,
                region_id: &region.id,
                site_id: &site.id,
                production_unit_id: unit_id,
                product_id: &leaf.product.id,
                process_id: &process.id,
                metric: metric.into(),
                value,
            };
            self.unit_results_writer.serialize(row)?;
        }

        for (kind, demand) in process.iter_demands() {
            let cost_per_ton = demand.cost_per_ton(year);
            let cost = production * cost_per_ton;
            let mut metrics = vec![
                (
                    ConsumptionMetric::Consumption,
                    (production * demand.quantity).value(),
                ),
                (ConsumptionMetric::Cost, cost.value()),
                (ConsumptionMetric::CostPerTon, cost_per_ton.value()),
            ];

            // Feedstocks are not burnt
            if kind != DemandKind::Feedstock {
                let emission_cost_per_ton = demand.emission_per_ton(year) * co2_price;
                let emission_cost = production * emission_cost_per_ton;
                metrics.extend([
                    (
                        ConsumptionMetric::Emission,
                        (production * demand.emission_per_ton(year)).value(),
                    ),
                    (ConsumptionMetric::EmissionCost, emission_cost.value()),
                    (
                        ConsumptionMetric::EmissionCostPerTon,
                        emission_cost_per_ton.value(),
                    ),
                    (
                        ConsumptionMetric::CostIncludingEmissions,
                        (cost + emission_cost).value(),
                    ),
                ]);
            }

            for (metric, value) in metrics {
                let row = EnergyCarrierResultRow {
                    scenario_id: &self.scenario_id,
                    year,
                    region_id: &region.id,
                    site_id: &site.id,
                    production_unit_id: unit_id,
                    energy_carrier_id: demand.carrier_id(),
                    demand_kind: kind.into(),
                    metric: metric.into(),
                    value,
                };
                self.carrier_results_writer.serialize(row)?;
            }
        }

        Ok(())
    }

    /// Compare all the processes which could make the unit's product
    fn write_process_comparison(
        &mut self,
        year: u32,
        region: &Region,
        leaf: &LeafState,
    ) -> Result<()> {
        let product = &leaf.product;
        let co2_price = region.co2_price(year);

        let mut rows = Vec::new();
        rows.extend(
            product
                .production_cost_per_ton_by_process(year)
                .map(|(id, value)| (ProcessMetric::ProductionCostPerTon, id, Some(value.value()))),
        );
        rows.extend(
            product
                .annuity_per_ton_by_process(year)
                .map(|(id, value)| (ProcessMetric::AnnuityPerTon, id, Some(value.value()))),
        );
        rows.extend(
            product
                .opex_per_ton_by_process(year)
                .map(|(id, value)| (ProcessMetric::OpexPerTon, id, Some(value.value()))),
        );
        rows.extend(
            product
                .energy_emission_cost_per_ton_by_process(year, co2_price)
                .map(|(id, value)| {
                    (ProcessMetric::EnergyEmissionCostPerTon, id, Some(value.value()))
                }),
        );
        rows.extend(
            product
                .process_emission_cost_per_ton_by_process(leaf.production, co2_price)
                .map(|(id, value)| {
                    (
                        ProcessMetric::ProcessEmissionCostPerTon,
                        id,
                        value.map(|value| value.value()),
                    )
                }),
        );
        for process in &product.processes {
            rows.push((
                ProcessMetric::EfficiencyImprovement,
                &process.id,
                Some(process.efficiency_improvement(year).value()),
            ));
        }
        for process in &product.processes {
            rows.push((
                ProcessMetric::InvestmentFlexibility,
                &process.id,
                Some(process.investment_flexibility(year).value()),
            ));
        }

        for (metric, process_id, value) in rows {
            let row = ProcessComparisonRow {
                scenario_id: &self.scenario_id,
                year,
                region_id: &region.id,
                product_id: &product.id,
                process_id,
                metric: metric.into(),
                value,
            };
            self.process_comparison_writer.serialize(row)?;
        }

        Ok(())
    }
}

impl ResultVisitor for DataWriter {
    fn visit_region(&mut self, year: u32, region: &Region) -> Result<()> {
        for carrier in region.carriers.values() {
            for (metric, value) in [
                (CarrierMetric::Cost, carrier.cost(year).value()),
                (CarrierMetric::Emission, carrier.emission(year).value()),
                (CarrierMetric::Availability, carrier.availability(year).value()),
                (CarrierMetric::Subsidies, carrier.subsidies(year).value()),
                (CarrierMetric::Taxes, carrier.taxes(year).value()),
            ] {
                let row = EnergyCarrierComparisonRow {
                    scenario_id: &self.scenario_id,
                    year,
                    region_id: &region.id,
                    energy_carrier_id: &carrier.id,
                    metric: metric.into(),
                    value,
                };
                self.carrier_comparison_writer.serialize(row)?;
            }
        }

        Ok(())
    }

    fn visit_site(&mut self, year: u32, region: &Region, site: &Site) -> Result<()> {
        let row = SiteProcessesRow {
            scenario_id: &self.scenario_id,
            year,
            region_id: &region.id,
            site_id: &site.id,
            longitude: site.location.x(),
            latitude: site.location.y(),
            process_ids: site.process_ids().iter().join(";"),
        };
        self.site_processes_writer.serialize(row)?;

        Ok(())
    }

    fn visit_product(&mut self, year: u32, region: &Region, leaf: &LeafState) -> Result<()> {
        let key = (region.id.clone(), leaf.product.id.clone(), year);
        if self.compared_products.insert(key) {
            self.write_process_comparison(year, region, leaf)?;
        }

        Ok(())
    }

    fn visit_process(
        &mut self,
        year: u32,
        region: &Region,
        site: &Site,
        unit: &ProductionUnit,
        leaf: &LeafState,
    ) -> Result<()> {
        self.write_unit_results(year, region, site, &unit.id, leaf)?;
        if let Some(wtr) = &mut self.debug_writer {
            wtr.write_unit_state(&self.scenario_id, year, &unit.id, leaf)?;
        }

        Ok(())
    }

    fn visit_pipelines(&mut self, year: u32, network: &PipelineNetwork) -> Result<()> {
        for pipeline in network.pipelines.values() {
            let row = PipelineModeRow {
                scenario_id: &self.scenario_id,
                year,
                pipeline_id: &pipeline.id,
                mode: pipeline.mode.into(),
            };
            self.pipeline_modes_writer.serialize(row)?;
        }

        Ok(())
    }

    fn finalize(&mut self) -> Result<()> {
        self.flush()
    }
}
