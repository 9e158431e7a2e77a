//! Energy carriers are the fuels, feedstocks and other forms of energy consumed by processes.
use crate::id::{define_id_getter, define_id_type};
use crate::units::{EmissionsPerEnergy, Energy, MoneyPerEnergy};
use crate::year::Trajectory;
use indexmap::IndexMap;
use std::rc::Rc;

define_id_type! {EnergyCarrierID}

/// A map of [`EnergyCarrier`]s, keyed by ID
pub type EnergyCarrierMap = IndexMap<EnergyCarrierID, Rc<EnergyCarrier>>;

/// An energy carrier as seen from within a single region
#[derive(Debug, PartialEq)]
pub struct EnergyCarrier {
    /// Unique identifier for the carrier (e.g. "1")
    pub id: EnergyCarrierID,
    /// Human-readable name (e.g. "Electricity")
    pub name: String,
    /// Price, which falls exponentially towards its 2030 value
    pub cost: Trajectory<MoneyPerEnergy>,
    /// Emission factor
    pub emission: Trajectory<EmissionsPerEnergy>,
    /// Total amount available to each consumer in a year
    pub availability: Trajectory<Energy>,
    /// Subsidies paid on consumption
    pub subsidies: Trajectory<MoneyPerEnergy>,
    /// Taxes levied on consumption
    pub taxes: Trajectory<MoneyPerEnergy>,
}
define_id_getter! {EnergyCarrier, EnergyCarrierID}

impl EnergyCarrier {
    /// Price of the carrier in the given year
    pub fn cost(&self, year: u32) -> MoneyPerEnergy {
        self.cost.value_at(year)
    }

    /// Emission factor in the given year
    pub fn emission(&self, year: u32) -> EmissionsPerEnergy {
        self.emission.value_at(year)
    }

    /// Availability in the given year
    pub fn availability(&self, year: u32) -> Energy {
        self.availability.value_at(year)
    }

    /// Subsidies in the given year
    pub fn subsidies(&self, year: u32) -> MoneyPerEnergy {
        self.subsidies.value_at(year)
    }

    /// Taxes in the given year
    pub fn taxes(&self, year: u32) -> MoneyPerEnergy {
        self.taxes.value_at(year)
    }
}
