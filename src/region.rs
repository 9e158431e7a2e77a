//! Regions are collections of sites which share energy carrier prices and a CO2 price.
use crate::energy_carrier::EnergyCarrierMap;
use crate::id::{define_id_getter, define_id_type};
use crate::model::SimulationMode;
use crate::pipeline::PipelineNetwork;
use crate::product::ProductMap;
use crate::production_unit::DecisionRules;
use crate::site::SiteMap;
use crate::units::MoneyPerEmissions;
use crate::year::Trajectory;
use indexmap::IndexMap;
use log::debug;
use rand::RngCore;

define_id_type! {RegionID}

/// A map of [`Region`]s, keyed by region ID
pub type RegionMap = IndexMap<RegionID, Region>;

/// A region along with everything which is located in it
#[derive(Debug, Clone, PartialEq)]
pub struct Region {
    /// A unique identifier for a region (e.g. "DE").
    pub id: RegionID,
    /// A text description of the region (e.g. "Germany").
    pub description: String,
    /// Price of emitting a ton of CO2
    pub co2_price: Trajectory<MoneyPerEmissions>,
    /// Energy carriers, priced for this region
    pub carriers: EnergyCarrierMap,
    /// Products made in this region, with processes priced for this region
    pub products: ProductMap,
    /// Sites in the region
    pub sites: SiteMap,
}
define_id_getter! {Region, RegionID}

impl Region {
    /// The CO2 price in the given year
    pub fn co2_price(&self, year: u32) -> MoneyPerEmissions {
        self.co2_price.value_at(year)
    }

    /// Let every site in the region make its decisions for the year
    pub fn process_year(
        &mut self,
        year: u32,
        network: Option<&PipelineNetwork>,
        mode: SimulationMode,
        rng: &mut dyn RngCore,
        rules: &DecisionRules,
    ) {
        let co2_price = self.co2_price(year);
        debug!("CO2 price in region {} for {year}: {co2_price}", self.id);

        for site in self.sites.values_mut() {
            site.process_year(year, co2_price, network, mode, rng, rules);
        }
    }
}
