//! The amount of an energy carrier consumed per ton of product.
use crate::energy_carrier::{EnergyCarrier, EnergyCarrierID};
use crate::units::{EmissionsPerTon, EnergyPerTon, MoneyPerTon};
use std::rc::Rc;

/// The role a carrier plays in a process
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, strum::EnumIter, strum::IntoStaticStr,
)]
#[strum(serialize_all = "snake_case")]
pub enum DemandKind {
    /// Electricity and fuels used for energy
    Energy,
    /// Carriers used to raise steam
    Steam,
    /// Carriers consumed as a raw material
    Feedstock,
}

/// Consumption of a single carrier per ton of product
#[derive(Debug, Clone, PartialEq)]
pub struct Demand {
    /// The carrier consumed
    pub carrier: Rc<EnergyCarrier>,
    /// Amount consumed per ton of product
    pub quantity: EnergyPerTon,
}

impl Demand {
    /// Create a new [`Demand`]
    pub fn new(carrier: Rc<EnergyCarrier>, quantity: EnergyPerTon) -> Self {
        Self { carrier, quantity }
    }

    /// The ID of the carrier consumed
    pub fn carrier_id(&self) -> &EnergyCarrierID {
        &self.carrier.id
    }

    /// Purchase cost of the carrier per ton of product
    pub fn cost_per_ton(&self, year: u32) -> MoneyPerTon {
        self.quantity * self.carrier.cost(year)
    }

    /// Emissions from burning the carrier per ton of product
    pub fn emission_per_ton(&self, year: u32) -> EmissionsPerTon {
        self.quantity * self.carrier.emission(year)
    }

    /// Subsidies received per ton of product
    pub fn subsidies_per_ton(&self, year: u32) -> MoneyPerTon {
        self.quantity * self.carrier.subsidies(year)
    }

    /// Taxes paid per ton of product
    pub fn taxes_per_ton(&self, year: u32) -> MoneyPerTon {
        self.quantity * self.carrier.taxes(year)
    }
}
