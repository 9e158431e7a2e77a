//! Products and the processes which can make them.
use crate::id::{define_id_getter, define_id_type};
use crate::process::{Process, ProcessID};
use crate::units::{MoneyPerEmissions, MoneyPerTon, Tons};
use indexmap::IndexMap;
use std::rc::Rc;

define_id_type! {ProductID}

/// A map of [`Product`]s, keyed by ID
pub type ProductMap = IndexMap<ProductID, Rc<Product>>;

/// A product along with the processes a production unit may switch to when making it
#[derive(Debug, PartialEq)]
pub struct Product {
    /// Unique identifier for the product (e.g. "steel")
    pub id: ProductID,
    /// Processes eligible for reinvestment, in input order
    pub processes: Vec<Rc<Process>>,
}
define_id_getter! {Product, ProductID}

impl Product {
    /// Production cost per ton of each eligible process
    pub fn production_cost_per_ton_by_process(
        &self,
        year: u32,
    ) -> impl Iterator<Item = (&ProcessID, MoneyPerTon)> {
        self.processes
            .iter()
            .map(move |process| (&process.id, process.production_cost_per_ton(year)))
    }

    /// Process emission cost per ton of each eligible process.
    ///
    /// Values are undefined when nothing is produced.
    pub fn process_emission_cost_per_ton_by_process(
        &self,
        production: Tons,
        co2_price: MoneyPerEmissions,
    ) -> impl Iterator<Item = (&ProcessID, Option<MoneyPerTon>)> {
        self.processes.iter().map(move |process| {
            (
                &process.id,
                process.process_emission_cost_per_ton(production, co2_price),
            )
        })
    }

    /// Energy emission cost per ton of each eligible process
    pub fn energy_emission_cost_per_ton_by_process(
        &self,
        year: u32,
        co2_price: MoneyPerEmissions,
    ) -> impl Iterator<Item = (&ProcessID, MoneyPerTon)> {
        self.processes.iter().map(move |process| {
            (
                &process.id,
                process.energy_emission_per_ton(year) * co2_price,
            )
        })
    }

    /// Annuity per ton of each eligible process
    pub fn annuity_per_ton_by_process(
        &self,
        year: u32,
    ) -> impl Iterator<Item = (&ProcessID, MoneyPerTon)> {
        self.processes
            .iter()
            .map(move |process| (&process.id, process.annuity_per_ton(year)))
    }

    /// Operating cost per ton of each eligible process
    pub fn opex_per_ton_by_process(
        &self,
        year: u32,
    ) -> impl Iterator<Item = (&ProcessID, MoneyPerTon)> {
        self.processes
            .iter()
            .map(move |process| (&process.id, process.opex_per_ton(year)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::{process_a, process_b, product};
    use float_cmp::assert_approx_eq;
    use itertools::Itertools;
    use rstest::rstest;

    #[rstest]
    fn test_comparison_metrics_cover_all_processes(
        product: Product,
        process_a: Rc<Process>,
        process_b: Rc<Process>,
    ) {
        let costs = product.production_cost_per_ton_by_process(2030).collect_vec();
        assert_eq!(costs.len(), 2);
        assert_eq!(costs[0].0, &process_a.id);
        assert_approx_eq!(
            MoneyPerTon,
            costs[1].1,
            process_b.production_cost_per_ton(2030)
        );

        let emissions = product
            .process_emission_cost_per_ton_by_process(Tons(0.0), MoneyPerEmissions(100.0))
            .collect_vec();
        assert!(emissions.iter().all(|(_, cost)| cost.is_none()));
    }
}
