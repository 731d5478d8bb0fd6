//! The model represents the static input data provided by the user.
use crate::demand::{DemandMap, ScenarioID};
use crate::investment::InvestmentMap;
use crate::product::ProductMap;
use anyhow::{Result, ensure};
use indexmap::IndexSet;

pub mod parameters;
pub use parameters::ModelParameters;

/// Model definition
pub struct Model {
    /// Parameters from the model TOML file
    pub parameters: ModelParameters,
    /// Candidate investments, in index order
    pub investments: InvestmentMap,
    /// Products, in index order
    pub products: ProductMap,
    /// Demand scenarios, in index order
    pub scenarios: IndexSet<ScenarioID>,
    /// Demand for each product in each period of each scenario
    pub demand: DemandMap,
}

impl Model {
    /// The number of candidate investments
    pub fn num_investments(&self) -> usize {
        self.investments.len()
    }

    /// The number of demand scenarios
    pub fn num_scenarios(&self) -> usize {
        self.scenarios.len()
    }

    /// The number of products
    pub fn num_products(&self) -> usize {
        self.products.len()
    }

    /// The number of periods in the planning horizon
    pub fn num_periods(&self) -> u32 {
        self.parameters.num_periods
    }

    /// Total revenue from selling the whole demand of a scenario.
    ///
    /// All demand must be met, so this does not depend on the investment or on production
    /// decisions.
    pub fn revenue(&self, scenario: usize) -> f64 {
        let mut revenue = 0.0;
        for (product, info) in self.products.values().enumerate() {
            for period in 0..self.num_periods() as usize {
                revenue += info.price * self.demand.get(scenario, product, period);
            }
        }

        revenue
    }

    /// Check that the objective's constant term is finite for every (investment, scenario) pair.
    ///
    /// Finite inputs can still overflow once multiplied together, which would make the linear
    /// programs meaningless.
    pub fn validate(&self) -> Result<()> {
        let params = &self.parameters;
        for (scenario_id, scenario) in self.scenarios.iter().zip(0..) {
            let revenue = self.revenue(scenario);
            ensure!(
                revenue.is_finite(),
                "Revenue for scenario {scenario_id} is too large"
            );

            for investment in self.investments.values() {
                let constant = revenue
                    - investment.cost
                    - investment.total_amortisation(params.amortisation, params.num_periods);
                ensure!(
                    constant.is_finite(),
                    "Costs for investment {} under scenario {scenario_id} are too large",
                    investment.id
                );
            }
        }

        Ok(())
    }
}
