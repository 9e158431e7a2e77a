//! Processes are the competing technologies with which a product can be manufactured.
//!
//! A process is characterised by its investment and operating costs, its lifetime and its
//! consumption of energy carriers, which together determine the cost of producing a ton of product
//! in a given year.
use crate::demand::{Demand, DemandKind};
use crate::energy_carrier::{EnergyCarrier, EnergyCarrierID};
use crate::finance::annuity_per_ton;
use crate::id::{define_id_getter, define_id_type};
use crate::units::{
    Dimensionless, Emissions, EmissionsPerTon, EnergyPerTon, Money, MoneyPerEmissions,
    MoneyPerTon, Tons, UnitType,
};
use crate::year::Trajectory;
use anyhow::{Result, ensure};
use indexmap::IndexMap;
use std::rc::Rc;
use strum::IntoEnumIterator;

define_id_type! {ProcessID}

/// The economic parameters of a process
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessParameter {
    /// Capital expenditure per ton of annual production capacity
    pub capex: Trajectory<MoneyPerTon>,
    /// Operating expenditure per ton of product
    pub opex: Trajectory<MoneyPerTon>,
    /// Years between reinvestments
    pub lifetime: u32,
    /// Interest rate applied to the investment
    pub interest_rate: Dimensionless,
    /// Years over which the investment is repaid
    pub depreciation_period: u32,
    /// Emissions from the process itself (i.e. not from burning fuel) per ton of product
    pub process_emission: EmissionsPerTon,
    /// Improvement in efficiency relative to the base year
    pub efficiency_improvement: Trajectory<Dimensionless>,
    /// Public funding towards the investment per ton of capacity
    pub investment_funding: Trajectory<MoneyPerTon>,
    /// How easily the investment can be brought forward or postponed
    pub investment_flexibility: Trajectory<Dimensionless>,
}

impl ProcessParameter {
    /// Check that the parameter values are usable
    fn validate(&self) -> Result<()> {
        ensure!(self.lifetime > 0, "Lifetime must be greater than 0");
        ensure!(
            self.depreciation_period > 0,
            "Depreciation period must be greater than 0"
        );
        ensure!(
            self.interest_rate.is_finite() && self.interest_rate >= Dimensionless(0.0),
            "Interest rate must be a finite, non-negative number"
        );
        ensure!(
            self.process_emission.is_finite(),
            "Process emission must be a finite number"
        );

        Ok(())
    }
}

/// A process for making a particular product, parameterised for one region
#[derive(Debug, PartialEq)]
pub struct Process {
    /// Unique identifier for the process (e.g. "38")
    pub id: ProcessID,
    /// Economic parameters
    pub parameter: ProcessParameter,
    /// Electricity and fuels
    pub energy_demands: Vec<Demand>,
    /// Carriers used for steam
    pub steam_demands: Vec<Demand>,
    /// Carriers used as raw materials
    pub feedstock_demands: Vec<Demand>,
    /// Whether any of the demands is for hydrogen
    uses_hydrogen: bool,
}
define_id_getter! {Process, ProcessID}

/// A map of [`Process`]es, keyed by ID
pub type ProcessMap = IndexMap<ProcessID, Rc<Process>>;

/// A carrier along with the total amount of it consumed per ton of product
pub type CarrierDemand<'a> = (&'a Rc<EnergyCarrier>, EnergyPerTon);

impl Process {
    /// Create a new [`Process`].
    ///
    /// # Arguments
    ///
    /// * `id` - The process ID
    /// * `parameter` - Economic parameters
    /// * `energy_demands` - Electricity and fuel demands
    /// * `steam_demands` - Steam demands
    /// * `feedstock_demands` - Feedstock demands
    /// * `hydrogen_carrier_id` - The carrier which is delivered by hydrogen pipelines
    pub fn new(
        id: ProcessID,
        parameter: ProcessParameter,
        energy_demands: Vec<Demand>,
        steam_demands: Vec<Demand>,
        feedstock_demands: Vec<Demand>,
        hydrogen_carrier_id: &EnergyCarrierID,
    ) -> Result<Self> {
        parameter.validate()?;

        let mut process = Self {
            id,
            parameter,
            energy_demands,
            steam_demands,
            feedstock_demands,
            uses_hydrogen: false,
        };
        process.uses_hydrogen = process.uses_carrier(hydrogen_carrier_id);

        Ok(process)
    }

    /// The demands of the given kind
    pub fn demands(&self, kind: DemandKind) -> &[Demand] {
        match kind {
            DemandKind::Energy => &self.energy_demands,
            DemandKind::Steam => &self.steam_demands,
            DemandKind::Feedstock => &self.feedstock_demands,
        }
    }

    /// Iterate over all demands along with their kind
    pub fn iter_demands(&self) -> impl Iterator<Item = (DemandKind, &Demand)> {
        DemandKind::iter()
            .flat_map(move |kind| self.demands(kind).iter().map(move |demand| (kind, demand)))
    }

    /// Whether any demand is for the given carrier
    pub fn uses_carrier(&self, carrier_id: &EnergyCarrierID) -> bool {
        self.iter_demands()
            .any(|(_, demand)| demand.carrier_id() == carrier_id)
    }

    /// Whether the process consumes hydrogen
    pub fn uses_hydrogen(&self) -> bool {
        self.uses_hydrogen
    }

    /// Total demand per ton for each carrier consumed, across all kinds of demand
    pub fn demand_per_carrier(&self) -> IndexMap<EnergyCarrierID, CarrierDemand<'_>> {
        let mut totals: IndexMap<EnergyCarrierID, CarrierDemand> = IndexMap::new();
        for (_, demand) in self.iter_demands() {
            totals
                .entry(demand.carrier_id().clone())
                .or_insert((&demand.carrier, EnergyPerTon(0.0)))
                .1 += demand.quantity;
        }

        totals
    }

    /// Whether enough of every carrier is available to make the given amount of product.
    ///
    /// Demand equal to the availability counts as unavailable.
    pub fn is_energy_available(&self, year: u32, production: Tons) -> bool {
        self.demand_per_carrier()
            .values()
            .all(|(carrier, quantity)| carrier.availability(year) > production * *quantity)
    }

    /// Capital expenditure per ton of capacity
    pub fn capex(&self, year: u32) -> MoneyPerTon {
        self.parameter.capex.value_at(year)
    }

    /// Operating expenditure per ton of product
    pub fn opex_per_ton(&self, year: u32) -> MoneyPerTon {
        self.parameter.opex.value_at(year)
    }

    /// Public funding per ton of capacity
    pub fn investment_funding(&self, year: u32) -> MoneyPerTon {
        self.parameter.investment_funding.value_at(year)
    }

    /// Efficiency improvement relative to the base year
    pub fn efficiency_improvement(&self, year: u32) -> Dimensionless {
        self.parameter.efficiency_improvement.value_at(year)
    }

    /// Investment flexibility
    pub fn investment_flexibility(&self, year: u32) -> Dimensionless {
        self.parameter.investment_flexibility.value_at(year)
    }

    /// Annual repayment per ton of capacity on the investment net of funding
    pub fn annuity_per_ton(&self, year: u32) -> MoneyPerTon {
        annuity_per_ton(
            self.capex(year) - self.investment_funding(year),
            self.parameter.interest_rate,
            self.parameter.depreciation_period,
        )
    }

    /// Annual repayment on the investment for the given production volume
    pub fn annuity(&self, year: u32, production: Tons) -> Money {
        production * self.annuity_per_ton(year)
    }

    /// Investment net of funding for the given production volume
    pub fn investment(&self, year: u32, production: Tons) -> Money {
        production * (self.capex(year) - self.investment_funding(year))
    }

    /// The year in which an investment made in `year_of_last_reinvestment` reaches end of life
    pub fn year_of_new_investment(&self, year_of_last_reinvestment: u32) -> u32 {
        year_of_last_reinvestment + self.parameter.lifetime
    }

    /// Purchase cost per ton of product of all carriers
    pub fn carrier_cost_per_ton(&self, year: u32) -> MoneyPerTon {
        self.iter_demands()
            .map(|(_, demand)| demand.cost_per_ton(year))
            .sum()
    }

    /// Subsidies per ton of product on all carriers
    pub fn subsidies_per_ton(&self, year: u32) -> MoneyPerTon {
        self.iter_demands()
            .map(|(_, demand)| demand.subsidies_per_ton(year))
            .sum()
    }

    /// Taxes per ton of product on all carriers
    pub fn taxes_per_ton(&self, year: u32) -> MoneyPerTon {
        self.iter_demands()
            .map(|(_, demand)| demand.taxes_per_ton(year))
            .sum()
    }

    /// Cost of making a ton of product, excluding the cost of emissions
    pub fn production_cost_per_ton(&self, year: u32) -> MoneyPerTon {
        self.annuity_per_ton(year)
            + self.opex_per_ton(year)
            + (self.carrier_cost_per_ton(year) - self.subsidies_per_ton(year)
                + self.taxes_per_ton(year))
    }

    /// Emissions per ton of product from energy and steam carriers.
    ///
    /// Feedstocks are not burnt, so are excluded.
    pub fn energy_emission_per_ton(&self, year: u32) -> EmissionsPerTon {
        self.energy_demands
            .iter()
            .chain(self.steam_demands.iter())
            .map(|demand| demand.emission_per_ton(year))
            .sum()
    }

    /// Cost of process and energy emissions per ton of product
    pub fn emission_cost_per_ton(&self, year: u32, co2_price: MoneyPerEmissions) -> MoneyPerTon {
        (self.parameter.process_emission + self.energy_emission_per_ton(year)) * co2_price
    }

    /// The flat surcharge added to the production cost for connecting to a hydrogen pipeline
    pub fn pipeline_surcharge(&self, pipeline_cost_scaling: Money) -> Money {
        if self.uses_hydrogen {
            pipeline_cost_scaling
        } else {
            Money(1.0)
        }
    }

    /// Total cost of making the given amount of product, including emissions and pipeline costs.
    ///
    /// # Arguments
    ///
    /// * `year` - The year in which production takes place
    /// * `production` - Amount of product
    /// * `co2_price` - Price of emitting a ton of CO2
    /// * `pipeline_cost_scaling` - Surcharge for processes which use hydrogen
    pub fn production_cost(
        &self,
        year: u32,
        production: Tons,
        co2_price: MoneyPerEmissions,
        pipeline_cost_scaling: Money,
    ) -> Money {
        self.pipeline_surcharge(pipeline_cost_scaling)
            + production
                * (self.production_cost_per_ton(year)
                    + self.emission_cost_per_ton(year, co2_price))
    }

    /// Cost per ton of carriers plus all emissions, used to compare fuel switches
    pub fn energy_and_emission_cost(&self, year: u32, co2_price: MoneyPerEmissions) -> MoneyPerTon {
        self.carrier_cost_per_ton(year) + self.emission_cost_per_ton(year, co2_price)
    }

    /// Process emissions for the given production volume
    pub fn process_emission(&self, production: Tons) -> Emissions {
        production * self.parameter.process_emission
    }

    /// Cost per ton of process emissions, which is undefined if nothing is produced
    pub fn process_emission_cost_per_ton(
        &self,
        production: Tons,
        co2_price: MoneyPerEmissions,
    ) -> Option<MoneyPerTon> {
        if production == Tons(0.0) {
            return None;
        }

        Some((self.process_emission(production) / production) * co2_price)
    }
}
