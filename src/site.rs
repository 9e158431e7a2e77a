//! Industrial sites, which are geolocated collections of production units.
use crate::id::{define_id_getter, define_id_type};
use crate::model::SimulationMode;
use crate::pipeline::PipelineNetwork;
use crate::process::ProcessID;
use crate::production_unit::{DecisionRules, ProductionUnit};
use crate::region::RegionID;
use crate::units::{Dimensionless, Distance, Money, MoneyPerEmissions};
use geo::Point;
use indexmap::IndexMap;
use rand::{Rng, RngCore};

define_id_type! {SiteID}

/// A map of [`Site`]s, keyed by ID
pub type SiteMap = IndexMap<SiteID, Site>;

/// An industrial site
#[derive(Debug, Clone, PartialEq)]
pub struct Site {
    /// Unique identifier for the site
    pub id: SiteID,
    /// The region in which the site is located
    pub region_id: RegionID,
    /// Longitude and latitude of the site
    pub location: Point<f64>,
    /// The production units at the site
    pub units: Vec<ProductionUnit>,
}
define_id_getter! {Site, SiteID}

/// The probability limit for a single production unit's decision.
///
/// In Monte Carlo mode, the limit is either 0 or 1 with equal probability, so that units which are
/// not at end of life reinvest about half of the time.
pub fn probability_limit(mode: SimulationMode, rng: &mut dyn RngCore) -> Dimensionless {
    match mode {
        SimulationMode::Deterministic => Dimensionless(1.0),
        SimulationMode::MonteCarlo => Dimensionless(f64::from(rng.gen_range(0..=1_u8))),
    }
}

impl Site {
    /// Distance to the nearest hydrogen pipeline and the pipeline surcharge for this site.
    ///
    /// Sites closer than `threshold` to a hydrogen pipeline pay no surcharge. Without a pipeline
    /// network, every site is treated as if it were on top of a pipeline.
    pub fn pipeline_conditions(
        &self,
        network: Option<&PipelineNetwork>,
        threshold: Distance,
    ) -> (Option<Distance>, Money) {
        let Some(network) = network else {
            return (Some(Distance(0.0)), Money(1.0));
        };

        let distance = network.distance_to_closest_hydrogen_pipeline(&self.id);
        let scaling = if distance.is_some_and(|distance| distance < threshold) {
            Money(1.0)
        } else {
            network.pipeline_cost_scaling(distance)
        };

        (distance, scaling)
    }

    /// Let every production unit at the site reconsider its process.
    ///
    /// # Arguments
    ///
    /// * `year` - The simulated year
    /// * `co2_price` - The region's CO2 price in `year`
    /// * `network` - The pipeline network, if the model has one
    /// * `mode` - Whether decisions are deterministic or randomised
    /// * `rng` - Source of random numbers for Monte Carlo mode
    /// * `rules` - Model-wide decision settings
    pub fn process_year(
        &mut self,
        year: u32,
        co2_price: MoneyPerEmissions,
        network: Option<&PipelineNetwork>,
        mode: SimulationMode,
        rng: &mut dyn RngCore,
        rules: &DecisionRules,
    ) {
        let (distance, scaling) = self.pipeline_conditions(network, rules.h2_distance_threshold);
        for unit in &mut self.units {
            let limit = probability_limit(mode, rng);
            unit.optimise_process(year, co2_price, scaling, distance, limit, rules);
        }
    }

    /// The process used by each production unit at the site
    pub fn process_ids(&self) -> Vec<&ProcessID> {
        self.units
            .iter()
            .flat_map(ProductionUnit::iter_leaves)
            .map(|(_, leaf)| &leaf.process.id)
            .collect()
    }
}
