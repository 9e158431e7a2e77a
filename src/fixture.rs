//! Fixtures for tests
use crate::demand::Demand;
use crate::energy_carrier::{EnergyCarrier, EnergyCarrierID};
use crate::model::{Model, ModelParameters, SimulationMode};
use crate::process::{Process, ProcessParameter};
use crate::product::Product;
use crate::production_unit::{DecisionRules, LeafState, ProductionUnit};
use crate::region::Region;
use crate::site::Site;
use crate::units::{
    Dimensionless, Distance, EmissionsPerEnergy, EmissionsPerTon, Energy, EnergyPerTon,
    MoneyPerDistance, MoneyPerEmissions, MoneyPerEnergy, MoneyPerTon, Tons,
};
use crate::year::Trajectory;
use geo::Point;
use indexmap::indexmap;
use rstest::fixture;
use std::path::PathBuf;
use std::rc::Rc;

/// Assert that an error with the given message occurs
macro_rules! assert_error {
    ($result:expr, $msg:expr) => {
        assert_eq!(
            $result.unwrap_err().chain().next().unwrap().to_string(),
            $msg
        );
    };
}
pub(crate) use assert_error;

#[fixture]
pub fn hydrogen_id() -> EnergyCarrierID {
    "15".into()
}

/// A carrier whose cost, emissions, subsidies and taxes never change
fn constant_carrier(id: &str, name: &str, cost: f64, availability: f64) -> EnergyCarrier {
    EnergyCarrier {
        id: id.into(),
        name: name.into(),
        cost: Trajectory::ExponentialDecrease {
            value_2015: MoneyPerEnergy(cost),
            value_2030: MoneyPerEnergy(cost),
            value_2050: MoneyPerEnergy(cost),
        },
        emission: Trajectory::constant(EmissionsPerEnergy(0.0)),
        availability: Trajectory::constant(Energy(availability)),
        subsidies: Trajectory::constant(MoneyPerEnergy(0.0)),
        taxes: Trajectory::constant(MoneyPerEnergy(0.0)),
    }
}

#[fixture]
pub fn electricity() -> EnergyCarrier {
    constant_carrier("1", "Electricity", 100.0, 1e15)
}

#[fixture]
pub fn natural_gas() -> EnergyCarrier {
    EnergyCarrier {
        id: "gas".into(),
        name: "Natural gas".into(),
        cost: Trajectory::ExponentialDecrease {
            value_2015: MoneyPerEnergy(30.0),
            value_2030: MoneyPerEnergy(15.0),
            value_2050: MoneyPerEnergy(20.0),
        },
        emission: Trajectory::constant(EmissionsPerEnergy(0.2)),
        availability: Trajectory::linear(Energy(1e9), Energy(2e9)),
        subsidies: Trajectory::Kinked {
            value_2015: MoneyPerEnergy(4.0),
            value_2030: MoneyPerEnergy(2.0),
            value_2050: MoneyPerEnergy(0.0),
        },
        taxes: Trajectory::constant(MoneyPerEnergy(1.0)),
    }
}

#[fixture]
pub fn hydrogen() -> EnergyCarrier {
    EnergyCarrier {
        cost: Trajectory::ExponentialDecrease {
            value_2015: MoneyPerEnergy(150.0),
            value_2030: MoneyPerEnergy(100.0),
            value_2050: MoneyPerEnergy(60.0),
        },
        ..constant_carrier("15", "Hydrogen", 150.0, 1e12)
    }
}

#[fixture]
pub fn process_parameter() -> ProcessParameter {
    ProcessParameter {
        capex: Trajectory::constant(MoneyPerTon(1000.0)),
        opex: Trajectory::constant(MoneyPerTon(50.0)),
        lifetime: 20,
        interest_rate: Dimensionless(0.05),
        depreciation_period: 10,
        process_emission: EmissionsPerTon(0.5),
        efficiency_improvement: Trajectory::constant(Dimensionless(0.0)),
        investment_funding: Trajectory::constant(MoneyPerTon(0.0)),
        investment_flexibility: Trajectory::constant(Dimensionless(0.0)),
    }
}

/// Create a process which only has energy demands
pub fn make_process(
    id: &str,
    parameter: ProcessParameter,
    energy_demands: Vec<Demand>,
) -> Rc<Process> {
    Process::new(
        id.into(),
        parameter,
        energy_demands,
        Vec::new(),
        Vec::new(),
        &hydrogen_id(),
    )
    .unwrap()
    .into()
}

/// A process with a ten-year lifetime and the given operating cost
fn process_with_opex(
    id: &str,
    opex: f64,
    parameter: ProcessParameter,
    energy_demands: Vec<Demand>,
) -> Rc<Process> {
    let parameter = ProcessParameter {
        opex: Trajectory::constant(MoneyPerTon(opex)),
        lifetime: 10,
        ..parameter
    };
    make_process(id, parameter, energy_demands)
}

/// Electricity plus natural gas
fn gas_demands(electricity: EnergyCarrier, natural_gas: EnergyCarrier) -> Vec<Demand> {
    vec![
        Demand::new(Rc::new(electricity), EnergyPerTon(1.0)),
        Demand::new(Rc::new(natural_gas), EnergyPerTon(2.0)),
    ]
}

#[fixture]
pub fn process_a(
    process_parameter: ProcessParameter,
    electricity: EnergyCarrier,
    natural_gas: EnergyCarrier,
) -> Rc<Process> {
    process_with_opex(
        "A",
        50.0,
        process_parameter,
        gas_demands(electricity, natural_gas),
    )
}

/// Like process A, but cheaper to run
#[fixture]
pub fn process_b(
    process_parameter: ProcessParameter,
    electricity: EnergyCarrier,
    natural_gas: EnergyCarrier,
) -> Rc<Process> {
    process_with_opex(
        "B",
        20.0,
        process_parameter,
        gas_demands(electricity, natural_gas),
    )
}

/// Electricity plus hydrogen
#[fixture]
pub fn process_h2(
    process_parameter: ProcessParameter,
    electricity: EnergyCarrier,
    hydrogen: EnergyCarrier,
) -> Rc<Process> {
    process_with_opex(
        "H",
        10.0,
        process_parameter,
        vec![
            Demand::new(Rc::new(electricity), EnergyPerTon(1.0)),
            Demand::new(Rc::new(hydrogen), EnergyPerTon(1.0)),
        ],
    )
}

/// Create a steel product with the given processes
pub fn product_of(processes: &[&Rc<Process>]) -> Rc<Product> {
    Rc::new(Product {
        id: "steel".into(),
        processes: processes.iter().map(|process| Rc::clone(process)).collect(),
    })
}

#[fixture]
pub fn product(process_a: Rc<Process>, process_b: Rc<Process>) -> Product {
    Product {
        id: "steel".into(),
        processes: vec![process_a, process_b],
    }
}

/// A production unit making 1000 t per year
pub fn unit_on(
    product: Rc<Product>,
    process: Rc<Process>,
    year_of_last_reinvestment: Option<u32>,
) -> ProductionUnit {
    ProductionUnit::new_leaf(
        "unit1".into(),
        LeafState::new(product, process, Tons(1000.0), year_of_last_reinvestment),
    )
}

#[fixture]
pub fn decision_rules() -> DecisionRules {
    DecisionRules {
        fuel_switch_process_ids: vec!["38".into(), "39".into()],
        h2_distance_threshold: Distance(50.0),
        reinvestment_wait_window: 0,
    }
}

/// A site with a single unit running process A, which reaches end of life in 2030
#[fixture]
pub fn site(product: Product, process_a: Rc<Process>) -> Site {
    Site {
        id: "site1".into(),
        region_id: "DE".into(),
        location: Point::new(8.0, 50.0),
        units: vec![unit_on(product.into(), process_a, Some(2020))],
    }
}

#[fixture]
pub fn region(
    site: Site,
    product: Product,
    electricity: EnergyCarrier,
    natural_gas: EnergyCarrier,
) -> Region {
    Region {
        id: "DE".into(),
        description: "Germany".into(),
        co2_price: Trajectory::linear(MoneyPerEmissions(80.0), MoneyPerEmissions(300.0)),
        carriers: indexmap! {
            electricity.id.clone() => Rc::new(electricity),
            natural_gas.id.clone() => Rc::new(natural_gas),
        },
        products: indexmap! {product.id.clone() => Rc::new(product)},
        sites: indexmap! {site.id.clone() => site},
    }
}

#[fixture]
pub fn model_parameters() -> ModelParameters {
    ModelParameters {
        scenario_id: "test".into(),
        simulation_mode: SimulationMode::Deterministic,
        start_year: 2020,
        end_year: 2032,
        year_increment: 1,
        co2_price_2015: MoneyPerEmissions(80.0),
        co2_price_2050: MoneyPerEmissions(300.0),
        seed: Some(0),
        product_filter: None,
        hydrogen_carrier_id: "15".into(),
        electricity_carrier_id: "1".into(),
        direct_reduction_process_ids: vec!["38".into(), "39".into()],
        h2_distance_threshold: Distance(50.0),
        pipeline_cost_per_km: MoneyPerDistance(100.0),
        reinvestment_wait_window: 0,
    }
}

#[fixture]
pub fn model(model_parameters: ModelParameters, region: Region) -> Model {
    Model {
        model_path: PathBuf::from("model"),
        parameters: model_parameters,
        regions: indexmap! {region.id.clone() => region},
        pipelines: None,
    }
}
