//! Functionality for running the simulation.
use crate::model::Model;
use crate::output::DataWriter;
use crate::output::metadata::write_metadata;
use crate::production_unit::DecisionRules;
use crate::visitor::{ResultVisitor, visit_region};
use anyhow::{Context, Result, bail, ensure};
use log::{info, warn};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::path::Path;

/// Hands out the simulated years in order
#[derive(Debug, Clone, PartialEq)]
pub struct Scheduler {
    years: Vec<u32>,
    next: usize,
}

impl Scheduler {
    /// Create a scheduler for the given years, which must not be empty
    pub fn new(years: Vec<u32>) -> Result<Self> {
        ensure!(!years.is_empty(), "At least one year must be simulated");

        Ok(Self { years, next: 0 })
    }

    /// Advance to the next year
    pub fn next_year(&mut self) -> Result<u32> {
        let Some(&year) = self.years.get(self.next) else {
            let last = self.years.last().context("No years to simulate")?;
            bail!("Cannot step beyond the final year ({last})");
        };
        self.next += 1;

        Ok(year)
    }

    /// Whether every year has been simulated
    pub fn is_finished(&self) -> bool {
        self.next == self.years.len()
    }
}

/// A model being run, along with the state needed to advance it
pub struct Simulation {
    model: Model,
    scheduler: Scheduler,
    rules: DecisionRules,
    rng: StdRng,
}

impl Simulation {
    /// Prepare the model to be run
    pub fn new(model: Model) -> Result<Self> {
        let scheduler = Scheduler::new(model.years()?)?;
        let rules = model.parameters.decision_rules();
        let rng = match model.parameters.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => {
                warn!("No seed given; results of Monte Carlo runs will not be reproducible");
                StdRng::from_entropy()
            }
        };

        Ok(Self {
            model,
            scheduler,
            rules,
            rng,
        })
    }

    /// The model in its current state
    pub fn model(&self) -> &Model {
        &self.model
    }

    /// Simulate the next year and pass the results to the visitors.
    ///
    /// # Returns
    ///
    /// The year which was simulated, or an error if all years have already been simulated or a
    /// visitor failed.
    pub fn step(&mut self, visitors: &mut [&mut dyn ResultVisitor]) -> Result<u32> {
        let year = self.scheduler.next_year()?;
        info!("Simulating year {year}");

        if let Some(network) = &mut self.model.pipelines {
            network.update(year);
        }

        let mode = self.model.parameters.simulation_mode;
        for region in self.model.regions.values_mut() {
            region.process_year(
                year,
                self.model.pipelines.as_ref(),
                mode,
                &mut self.rng,
                &self.rules,
            );
        }

        let is_final_year = self.scheduler.is_finished();
        for visitor in visitors.iter_mut() {
            let visitor: &mut dyn ResultVisitor = &mut **visitor;
            for region in self.model.regions.values() {
                visit_region(visitor, year, region)?;
            }
            if let Some(network) = &self.model.pipelines {
                visitor.visit_pipelines(year, network)?;
            }
            if is_final_year {
                visitor.finalize()?;
            }
        }

        Ok(year)
    }

    /// Simulate all remaining years
    pub fn run_to_end(&mut self, visitors: &mut [&mut dyn ResultVisitor]) -> Result<()> {
        while !self.scheduler.is_finished() {
            self.step(visitors)?;
        }

        Ok(())
    }
}

/// Run the simulation, writing results to the output folder.
///
/// # Arguments:
///
/// * `model` - The model to run
/// * `output_path` - The folder to which output files will be written
/// * `debug_model` - Whether to write additional information to CSV files
pub fn run(model: Model, output_path: &Path, debug_model: bool) -> Result<()> {
    write_metadata(
        output_path,
        &model.model_path,
        &model.parameters.scenario_id,
    )
    .context("Failed to save metadata")?;

    let mut writer =
        DataWriter::create(output_path, &model.parameters.scenario_id, debug_model)?;
    let mut simulation = Simulation::new(model)?;
    simulation.run_to_end(&mut [&mut writer])
}
