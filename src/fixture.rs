//! Fixtures for tests

use crate::demand::{DemandMap, ScenarioID};
use crate::investment::{Investment, InvestmentMap};
use crate::model::{Model, ModelParameters};
use crate::product::{Product, ProductMap};
use indexmap::{IndexSet, indexmap};
use rstest::fixture;

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
pub fn scenario_ids() -> IndexSet<ScenarioID> {
    ["low".into(), "high".into()].into_iter().collect()
}

#[fixture]
pub fn products() -> ProductMap {
    indexmap! {
        "bolts".into() => Product { id: "bolts".into(), price: 5.0 },
        "nuts".into() => Product { id: "nuts".into(), price: 3.0 },
    }
}

#[fixture]
pub fn investments() -> InvestmentMap {
    indexmap! {
        "small".into() => Investment {
            id: "small".into(),
            cost: 100.0,
            production_cost: 2.0,
            capacity: 20.0,
        },
        "large".into() => Investment {
            id: "large".into(),
            cost: 300.0,
            production_cost: 1.0,
            capacity: 50.0,
        },
    }
}

#[fixture]
pub fn model_parameters() -> ModelParameters {
    ModelParameters {
        num_periods: 2,
        storage_cost: 0.5,
        amortisation: 1.0,
        initial_stock: false,
        initial_stock_penalty: 1000.0,
    }
}

/// Demand indexed as (scenario, product, period)
#[fixture]
pub fn demand() -> DemandMap {
    let values = [
        // low
        [[10.0, 10.0], [4.0, 6.0]],
        // high
        [[20.0, 30.0], [10.0, 10.0]],
    ];

    let mut demand = DemandMap::new(2, 2, 2);
    for (scenario, by_product) in values.iter().enumerate() {
        for (product, by_period) in by_product.iter().enumerate() {
            for (period, value) in by_period.iter().enumerate() {
                demand.set(scenario, product, period, *value);
            }
        }
    }

    demand
}

#[fixture]
pub fn model(
    model_parameters: ModelParameters,
    investments: InvestmentMap,
    products: ProductMap,
    scenario_ids: IndexSet<ScenarioID>,
    demand: DemandMap,
) -> Model {
    Model {
        parameters: model_parameters,
        investments,
        products,
        scenarios: scenario_ids,
        demand,
    }
}
