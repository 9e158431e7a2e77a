//! Production units and the rules by which they reinvest in new processes.
//!
//! Each simulated year, every production unit decides whether it has reached a point at which it
//! may reinvest. If so, it picks the cheapest eligible process for its product; otherwise it may
//! still switch fuel if it runs one of the designated fuel-switching processes.
use crate::id::{define_id_getter, define_id_type};
use crate::process::{Process, ProcessID};
use crate::product::Product;
use crate::units::{Dimensionless, Distance, Money, MoneyPerEmissions, Tons, UnitType};
use log::debug;
use std::rc::Rc;

define_id_type! {ProductionUnitID}

/// Settings which govern how production units choose between processes
#[derive(Debug, Clone, PartialEq)]
pub struct DecisionRules {
    /// Processes which can switch fuel without reinvesting
    pub fuel_switch_process_ids: Vec<ProcessID>,
    /// Hydrogen-using processes are only eligible within this distance of a hydrogen pipeline
    pub h2_distance_threshold: Distance,
    /// Years either side of a unit's end of life in which it waits for a pending pipeline
    pub reinvestment_wait_window: u32,
}

/// The state of a production unit which runs a single process
#[derive(Debug, Clone, PartialEq)]
pub struct LeafState {
    /// The product made by the unit
    pub product: Rc<Product>,
    /// The process currently in use
    pub process: Rc<Process>,
    /// The process in use before the last decision
    pub previous_process: Rc<Process>,
    /// Annual production
    pub production: Tons,
    /// The year of the most recent reinvestment, if known
    pub year_of_last_reinvestment: Option<u32>,
    /// The value of `year_of_last_reinvestment` before the last reinvestment
    pub previous_year_of_last_reinvestment: Option<u32>,
}

/// Either a single unit or a group of units
#[derive(Debug, Clone, PartialEq)]
pub enum UnitState {
    /// A unit which runs a single process
    Leaf(LeafState),
    /// A unit made up of other units, each deciding independently
    Composite(Vec<ProductionUnit>),
}

/// A production unit at an industrial site
#[derive(Debug, Clone, PartialEq)]
pub struct ProductionUnit {
    /// Unique identifier for the unit
    pub id: ProductionUnitID,
    /// The unit's state
    pub state: UnitState,
}
define_id_getter! {ProductionUnit, ProductionUnitID}

/// Pick the process with the lowest cost, keeping the first of any equally cheap processes
fn cheapest<'a, I, F, C>(processes: I, cost: F) -> Option<&'a Rc<Process>>
where
    I: IntoIterator<Item = &'a Rc<Process>>,
    F: Fn(&Process) -> C,
    C: UnitType,
{
    processes
        .into_iter()
        .map(|process| (process, cost(process).value()))
        .min_by(|(_, cost1), (_, cost2)| cost1.total_cmp(cost2))
        .map(|(process, _)| process)
}

/// Whether a process is ruled out because it needs hydrogen and the site is too far from supply.
///
/// An unknown distance means there is no hydrogen pipeline at all, which also rules it out.
pub fn check_h2_distance(
    process: &Process,
    distance: Option<Distance>,
    threshold: Distance,
) -> bool {
    if !process.uses_hydrogen() {
        return false;
    }

    distance.is_none_or(|distance| distance > threshold)
}

impl LeafState {
    /// Create the state for a unit which has just been loaded
    pub fn new(
        product: Rc<Product>,
        process: Rc<Process>,
        production: Tons,
        year_of_last_reinvestment: Option<u32>,
    ) -> Self {
        Self {
            product,
            previous_process: Rc::clone(&process),
            process,
            production,
            year_of_last_reinvestment,
            previous_year_of_last_reinvestment: year_of_last_reinvestment,
        }
    }

    /// Whether there is enough of every carrier to run `process` at this unit's production level
    pub fn check_energy_availability(&self, year: u32, process: &Process) -> bool {
        process.is_energy_available(year, self.production)
    }

    /// The product's processes which this unit could switch to
    fn candidates<'a>(
        &self,
        product: &'a Product,
        year: u32,
        distance: Option<Distance>,
        rules: &DecisionRules,
    ) -> Vec<&'a Rc<Process>> {
        product
            .processes
            .iter()
            .filter(|process| {
                self.check_energy_availability(year, process)
                    && !check_h2_distance(process, distance, rules.h2_distance_threshold)
            })
            .collect()
    }

    /// Whether the unit should hold off reinvesting because of the cost of pipeline access.
    ///
    /// Compares the cheapest available process with and without the pipeline surcharge; if these
    /// differ then reinvesting now would lock in a choice that a pipeline would overturn. Returns
    /// `None` if no process is available.
    pub fn check_production_cost_minima(
        &self,
        year: u32,
        co2_price: MoneyPerEmissions,
        pipeline_cost_scaling: Money,
    ) -> Option<bool> {
        let available = self
            .product
            .processes
            .iter()
            .filter(|process| self.check_energy_availability(year, process))
            .collect::<Vec<_>>();

        let cost_with = |scaling: Money| {
            move |process: &Process| {
                process.production_cost(year, self.production, co2_price, scaling)
            }
        };
        let with_pipelines = cheapest(available.iter().copied(), cost_with(pipeline_cost_scaling))?;
        let without_pipelines = cheapest(available.iter().copied(), cost_with(Money(1.0)))?;

        Some(with_pipelines.id != without_pipelines.id)
    }

    /// The likelihood (0 or 1) that the unit reconsiders its process in `year`
    pub fn probability_of_change(
        &self,
        year: u32,
        co2_price: MoneyPerEmissions,
        pipeline_cost_scaling: Money,
        rules: &DecisionRules,
    ) -> Dimensionless {
        let Some(last) = self.year_of_last_reinvestment else {
            return Dimensionless(1.0);
        };

        let end_of_life = self.process.year_of_new_investment(last);
        if year == end_of_life {
            return Dimensionless(1.0);
        }

        let window = rules.reinvestment_wait_window;
        if end_of_life.saturating_sub(window) <= year && year < end_of_life + window {
            let wait = self.check_production_cost_minima(year, co2_price, pipeline_cost_scaling);
            return if wait == Some(true) {
                Dimensionless(0.0)
            } else {
                Dimensionless(1.0)
            };
        }

        Dimensionless(0.0)
    }

    /// Switch between fuel-switching processes without reinvesting
    fn check_fuel_switch(
        &mut self,
        year: u32,
        co2_price: MoneyPerEmissions,
        distance: Option<Distance>,
        rules: &DecisionRules,
    ) {
        if !rules.fuel_switch_process_ids.contains(&self.process.id) {
            return;
        }

        let product = Rc::clone(&self.product);
        let candidates = self.candidates(&product, year, distance, rules);
        let chosen = cheapest(candidates, |process| {
            process.energy_and_emission_cost(year, co2_price)
        })
        .map_or_else(|| Rc::clone(&self.process), Rc::clone);

        self.process = chosen;
    }

    fn optimise_process(
        &mut self,
        year: u32,
        co2_price: MoneyPerEmissions,
        pipeline_cost_scaling: Money,
        distance: Option<Distance>,
        probability_limit: Dimensionless,
        rules: &DecisionRules,
    ) {
        // Each year starts from the process used in the previous year
        self.previous_process = Rc::clone(&self.process);

        let probability =
            self.probability_of_change(year, co2_price, pipeline_cost_scaling, rules);
        if probability < probability_limit {
            self.check_fuel_switch(year, co2_price, distance, rules);
            return;
        }

        let product = Rc::clone(&self.product);
        let candidates = self.candidates(&product, year, distance, rules);
        let chosen = cheapest(candidates, |process| {
            process.production_cost(year, self.production, co2_price, pipeline_cost_scaling)
        })
        .map_or_else(|| Rc::clone(&self.process), Rc::clone);

        self.process = chosen;
        self.previous_year_of_last_reinvestment = self.year_of_last_reinvestment;
        self.year_of_last_reinvestment = Some(year);
    }

    /// Investment made in `year`, which is zero unless the unit reinvested in that year
    pub fn new_investment(&self, year: u32) -> Money {
        if self.year_of_last_reinvestment == Some(year) {
            self.process.investment(year, self.production)
        } else {
            Money(0.0)
        }
    }
}

impl ProductionUnit {
    /// Create a unit which runs a single process
    pub fn new_leaf(id: ProductionUnitID, state: LeafState) -> Self {
        Self {
            id,
            state: UnitState::Leaf(state),
        }
    }

    /// Create a unit made up of other units
    pub fn new_composite(id: ProductionUnitID, children: Vec<ProductionUnit>) -> Self {
        Self {
            id,
            state: UnitState::Composite(children),
        }
    }

    /// The children of a composite unit, or `None` for a unit which runs a single process
    pub fn children_mut(&mut self) -> Option<&mut Vec<ProductionUnit>> {
        match &mut self.state {
            UnitState::Leaf(_) => None,
            UnitState::Composite(children) => Some(children),
        }
    }

    /// The likelihood (0 or 1) that the unit reconsiders its process in `year`.
    ///
    /// A composite unit reconsiders if any of its children does.
    pub fn probability_of_change(
        &self,
        year: u32,
        co2_price: MoneyPerEmissions,
        pipeline_cost_scaling: Money,
        rules: &DecisionRules,
    ) -> Dimensionless {
        match &self.state {
            UnitState::Leaf(leaf) => {
                leaf.probability_of_change(year, co2_price, pipeline_cost_scaling, rules)
            }
            UnitState::Composite(children) => {
                let any_change = children.iter().any(|child| {
                    child.probability_of_change(year, co2_price, pipeline_cost_scaling, rules)
                        > Dimensionless(0.0)
                });
                Dimensionless(if any_change { 1.0 } else { 0.0 })
            }
        }
    }

    /// Reconsider the process used by this unit (or each of its children).
    ///
    /// # Arguments
    ///
    /// * `year` - The simulated year
    /// * `co2_price` - The region's CO2 price in `year`
    /// * `pipeline_cost_scaling` - Surcharge applied to hydrogen-using processes
    /// * `distance` - Distance to the closest hydrogen pipeline, if there is one
    /// * `probability_limit` - Units whose probability of change is below this only fuel-switch
    /// * `rules` - Model-wide decision settings
    pub fn optimise_process(
        &mut self,
        year: u32,
        co2_price: MoneyPerEmissions,
        pipeline_cost_scaling: Money,
        distance: Option<Distance>,
        probability_limit: Dimensionless,
        rules: &DecisionRules,
    ) {
        match &mut self.state {
            UnitState::Leaf(leaf) => {
                leaf.optimise_process(
                    year,
                    co2_price,
                    pipeline_cost_scaling,
                    distance,
                    probability_limit,
                    rules,
                );
                if leaf.process.id != leaf.previous_process.id {
                    debug!(
                        "Production unit {} switched from process {} to {} in {year}",
                        self.id, leaf.previous_process.id, leaf.process.id
                    );
                }
            }
            UnitState::Composite(children) => {
                for child in children {
                    child.optimise_process(
                        year,
                        co2_price,
                        pipeline_cost_scaling,
                        distance,
                        probability_limit,
                        rules,
                    );
                }
            }
        }
    }

    /// Iterate over this unit and all of its descendants which run a single process
    pub fn iter_leaves(&self) -> Box<dyn Iterator<Item = (&ProductionUnitID, &LeafState)> + '_> {
        match &self.state {
            UnitState::Leaf(leaf) => Box::new(std::iter::once((&self.id, leaf))),
            UnitState::Composite(children) => {
                Box::new(children.iter().flat_map(ProductionUnit::iter_leaves))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::demand::Demand;
    use crate::energy_carrier::EnergyCarrier;
    use crate::fixture::{
        decision_rules, electricity, make_process, process_a, process_b, process_h2,
        process_parameter, product, product_of, unit_on,
    };
    use crate::process::ProcessParameter;
    use crate::units::EnergyPerTon;
    use rstest::rstest;

    const CO2_PRICE: MoneyPerEmissions = MoneyPerEmissions(100.0);

    fn leaf(unit: &ProductionUnit) -> &LeafState {
        match &unit.state {
            UnitState::Leaf(leaf) => leaf,
            UnitState::Composite(_) => panic!("Expected leaf unit"),
        }
    }

    #[rstest]
    #[case(2015, 0.0, Money(1.0))]
    #[case(2030, 100.0, Money(20000.0))]
    #[case(2050, 1000.0, Money(1e14))]
    fn test_probability_of_change_without_reinvestment_year(
        product: Product,
        process_a: Rc<Process>,
        decision_rules: DecisionRules,
        #[case] year: u32,
        #[case] co2_price: f64,
        #[case] scaling: Money,
    ) {
        let unit = unit_on(product.into(), process_a, None);
        assert_eq!(
            unit.probability_of_change(year, MoneyPerEmissions(co2_price), scaling, &decision_rules),
            Dimensionless(1.0)
        );
    }

    #[rstest]
    #[case(2029, 0.0)]
    #[case(2030, 1.0)] // end of life
    #[case(2031, 0.0)] // missed end of life
    fn test_probability_of_change_around_end_of_life(
        product: Product,
        process_a: Rc<Process>,
        decision_rules: DecisionRules,
        #[case] year: u32,
        #[case] expected: f64,
    ) {
        let unit = unit_on(product.into(), process_a, Some(2020));
        assert_eq!(
            unit.probability_of_change(year, CO2_PRICE, Money(1.0), &decision_rules),
            Dimensionless(expected)
        );
    }

    #[rstest]
    fn test_reinvest_at_end_of_life(
        product: Product,
        process_a: Rc<Process>,
        decision_rules: DecisionRules,
    ) {
        let mut unit = unit_on(product.into(), process_a, Some(2020));
        unit.optimise_process(
            2030,
            CO2_PRICE,
            Money(1.0),
            None,
            Dimensionless(1.0),
            &decision_rules,
        );

        let state = leaf(&unit);
        assert_eq!(state.process.id, ProcessID::new("B"));
        assert_eq!(state.previous_process.id, ProcessID::new("A"));
        assert_eq!(state.year_of_last_reinvestment, Some(2030));
        assert_eq!(state.previous_year_of_last_reinvestment, Some(2020));
    }

    #[rstest]
    fn test_previous_process_follows_each_year(
        product: Product,
        process_a: Rc<Process>,
        decision_rules: DecisionRules,
    ) {
        let mut unit = unit_on(product.into(), process_a, Some(2020));
        let mut step = |year: u32| {
            unit.optimise_process(
                year,
                CO2_PRICE,
                Money(1.0),
                None,
                Dimensionless(1.0),
                &decision_rules,
            );
            let state = leaf(&unit);
            (
                state.previous_process.id.clone(),
                state.process.id.clone(),
                state.year_of_last_reinvestment,
            )
        };

        let a = ProcessID::new("A");
        let b = ProcessID::new("B");
        assert_eq!(step(2030), (a, b.clone(), Some(2030)));
        assert_eq!(step(2031), (b.clone(), b.clone(), Some(2030)));
        assert_eq!(step(2032), (b.clone(), b, Some(2030)));
    }

    #[rstest]
    fn test_no_reinvestment_before_end_of_life(
        product: Product,
        process_a: Rc<Process>,
        decision_rules: DecisionRules,
    ) {
        let mut unit = unit_on(product.into(), process_a, Some(2020));
        unit.optimise_process(
            2025,
            CO2_PRICE,
            Money(1.0),
            None,
            Dimensionless(1.0),
            &decision_rules,
        );

        let state = leaf(&unit);
        assert_eq!(state.process.id, ProcessID::new("A"));
        assert_eq!(state.year_of_last_reinvestment, Some(2020));
    }

    #[rstest]
    fn test_zero_probability_limit_always_reoptimises(
        product: Product,
        process_a: Rc<Process>,
        decision_rules: DecisionRules,
    ) {
        let mut unit = unit_on(product.into(), process_a, Some(2020));
        unit.optimise_process(
            2025,
            CO2_PRICE,
            Money(1.0),
            None,
            Dimensionless(0.0),
            &decision_rules,
        );

        let state = leaf(&unit);
        assert_eq!(state.process.id, ProcessID::new("B"));
        assert_eq!(state.year_of_last_reinvestment, Some(2025));
    }

    #[rstest]
    fn test_stay_on_current_process_if_none_available(
        process_a: Rc<Process>,
        process_h2: Rc<Process>,
        decision_rules: DecisionRules,
    ) {
        // The only alternative needs hydrogen and there is no pipeline
        let product = product_of(&[&process_h2]);
        let mut unit = unit_on(product, process_a, None);
        unit.optimise_process(
            2030,
            CO2_PRICE,
            Money(1e14),
            None,
            Dimensionless(1.0),
            &decision_rules,
        );

        let state = leaf(&unit);
        assert_eq!(state.process.id, ProcessID::new("A"));
        assert_eq!(state.year_of_last_reinvestment, Some(2030));
    }

    #[rstest]
    fn test_first_of_equal_minima_wins(
        process_parameter: ProcessParameter,
        electricity: EnergyCarrier,
    ) {
        let electricity = Rc::new(electricity);
        let processes = ["X", "Y"].map(|id| {
            let demand = Demand::new(Rc::clone(&electricity), EnergyPerTon(1.0));
            make_process(id, process_parameter.clone(), vec![demand])
        });
        let chosen = cheapest(&processes, |process| {
            process.production_cost(2030, Tons(1.0), CO2_PRICE, Money(1.0))
        })
        .unwrap();
        assert_eq!(chosen.id, ProcessID::new("X"));
    }

    #[rstest]
    #[case(Some(Distance(10.0)), false)]
    #[case(Some(Distance(50.0)), false)] // boundary is inclusive
    #[case(Some(Distance(50.1)), true)]
    #[case(Some(Distance(200.0)), true)]
    #[case(None, true)] // no hydrogen pipeline at all
    fn test_check_h2_distance(
        process_h2: Rc<Process>,
        process_a: Rc<Process>,
        #[case] distance: Option<Distance>,
        #[case] excluded: bool,
    ) {
        let threshold = Distance(50.0);
        assert_eq!(check_h2_distance(&process_h2, distance, threshold), excluded);

        // Processes which don't use hydrogen are never excluded
        assert!(!check_h2_distance(&process_a, distance, threshold));
    }

    #[rstest]
    #[case(Tons(1000.0), true)]
    #[case(Tons(5e8), false)] // 2 GJ/t of gas against 1e9 GJ available
    #[case(Tons(1e9), false)]
    fn test_check_energy_availability(
        process_a: Rc<Process>,
        product: Product,
        #[case] production: Tons,
        #[case] expected: bool,
    ) {
        let state = LeafState::new(product.into(), Rc::clone(&process_a), production, None);
        assert_eq!(state.check_energy_availability(2022, &process_a), expected);
    }

    #[rstest]
    fn test_fuel_switch_keeps_reinvestment_year(
        process_a: Rc<Process>,
        process_b: Rc<Process>,
        decision_rules: DecisionRules,
    ) {
        // Pretend that process A is a fuel-switching process
        let rules = DecisionRules {
            fuel_switch_process_ids: vec!["A".into()],
            ..decision_rules
        };
        let product = product_of(&[&process_a, &process_b]);
        let mut unit = unit_on(product, process_a, Some(2020));
        unit.optimise_process(2025, CO2_PRICE, Money(1.0), None, Dimensionless(1.0), &rules);

        // B has the same energy and emission costs as A, so A (listed first) is kept
        let state = leaf(&unit);
        assert_eq!(state.process.id, ProcessID::new("A"));
        assert_eq!(state.year_of_last_reinvestment, Some(2020));
    }

    #[rstest]
    fn test_fuel_switch_to_cheaper_energy(
        process_a: Rc<Process>,
        process_h2: Rc<Process>,
        decision_rules: DecisionRules,
    ) {
        let rules = DecisionRules {
            fuel_switch_process_ids: vec!["A".into(), "H".into()],
            ..decision_rules
        };
        let product = product_of(&[&process_h2, &process_a]);
        let mut unit = unit_on(product, Rc::clone(&process_h2), Some(2020));

        // Hydrogen is more expensive than gas, so H switches to A
        unit.optimise_process(
            2025,
            MoneyPerEmissions(0.0),
            Money(1.0),
            Some(Distance(0.0)),
            Dimensionless(1.0),
            &rules,
        );

        let state = leaf(&unit);
        assert_eq!(state.process.id, ProcessID::new("A"));
        assert_eq!(state.previous_process.id, ProcessID::new("H"));
        assert_eq!(state.year_of_last_reinvestment, Some(2020));
    }

    #[rstest]
    fn test_check_production_cost_minima(
        process_a: Rc<Process>,
        process_h2: Rc<Process>,
    ) {
        let product = product_of(&[&process_a, &process_h2]);
        let state = LeafState::new(product, process_a, Tons(1000.0), Some(2020));

        // H is cheapest without a surcharge but not with one
        assert_eq!(
            state.check_production_cost_minima(2030, CO2_PRICE, Money(20000.0)),
            Some(true)
        );
        assert_eq!(
            state.check_production_cost_minima(2030, CO2_PRICE, Money(1.0)),
            Some(false)
        );
    }

    #[rstest]
    fn test_check_production_cost_minima_nothing_available(process_a: Rc<Process>) {
        let product = product_of(&[&process_a]);
        let state = LeafState::new(product, process_a, Tons(1e10), Some(2020));
        assert_eq!(
            state.check_production_cost_minima(2030, CO2_PRICE, Money(1.0)),
            None
        );
    }

    #[rstest]
    fn test_wait_window(
        process_a: Rc<Process>,
        process_h2: Rc<Process>,
        decision_rules: DecisionRules,
    ) {
        let rules = DecisionRules {
            reinvestment_wait_window: 2,
            ..decision_rules
        };
        let product = product_of(&[&process_a, &process_h2]);
        let unit = unit_on(product, process_a, Some(2020));

        // Inside the window: wait while the pipeline surcharge changes the cheapest process...
        assert_eq!(
            unit.probability_of_change(2029, CO2_PRICE, Money(20000.0), &rules),
            Dimensionless(0.0)
        );
        // ...but reinvest early otherwise
        assert_eq!(
            unit.probability_of_change(2029, CO2_PRICE, Money(1.0), &rules),
            Dimensionless(1.0)
        );
        // Outside the window
        assert_eq!(
            unit.probability_of_change(2027, CO2_PRICE, Money(1.0), &rules),
            Dimensionless(0.0)
        );
    }

    #[rstest]
    fn test_new_investment(product: Product, process_a: Rc<Process>) {
        let state = LeafState::new(product.into(), process_a, Tons(10.0), Some(2030));
        assert_eq!(state.new_investment(2030), Money(10000.0));
        assert_eq!(state.new_investment(2031), Money(0.0));
    }

    #[rstest]
    fn test_composite_unit(
        product: Product,
        process_a: Rc<Process>,
        decision_rules: DecisionRules,
    ) {
        let product = Rc::new(product);
        let child1 = unit_on(Rc::clone(&product), Rc::clone(&process_a), Some(2020));
        let child2 = ProductionUnit::new_leaf(
            "child2".into(),
            LeafState::new(product, process_a, Tons(1000.0), Some(2025)),
        );
        let mut unit = ProductionUnit::new_composite("parent".into(), vec![child1, child2]);

        // Only the first child is at end of life
        assert_eq!(
            unit.probability_of_change(2030, CO2_PRICE, Money(1.0), &decision_rules),
            Dimensionless(1.0)
        );
        assert_eq!(
            unit.probability_of_change(2031, CO2_PRICE, Money(1.0), &decision_rules),
            Dimensionless(0.0)
        );

        unit.optimise_process(
            2030,
            CO2_PRICE,
            Money(1.0),
            None,
            Dimensionless(1.0),
            &decision_rules,
        );
        let processes: Vec<_> = unit
            .iter_leaves()
            .map(|(id, leaf)| (id.to_string(), leaf.process.id.to_string()))
            .collect();
        assert_eq!(
            processes,
            [
                ("unit1".to_string(), "B".to_string()),
                ("child2".to_string(), "A".to_string())
            ]
        );
    }
}
