//! Demand for products in each period of each scenario.
use crate::id::define_id_type;

define_id_type! {ScenarioID}

/// Demand quantities indexed by scenario, product and period.
///
/// Values are stored densely, as every scenario must give a demand for every product in every
/// period.
#[derive(PartialEq, Debug, Clone)]
pub struct DemandMap {
    num_products: usize,
    num_periods: usize,
    values: Vec<f64>,
}

impl DemandMap {
    /// Create a new [`DemandMap`] with all demands set to zero
    pub fn new(num_scenarios: usize, num_products: usize, num_periods: usize) -> Self {
        Self {
            num_products,
            num_periods,
            values: vec![0.0; num_scenarios * num_products * num_periods],
        }
    }

    /// Get the position of the given entry in `values`
    fn flat_index(&self, scenario: usize, product: usize, period: usize) -> usize {
        assert!(
            product < self.num_products && period < self.num_periods,
            "Demand index out of range"
        );
        (scenario * self.num_products + product) * self.num_periods + period
    }

    /// Get the demand for a product in a period of a scenario.
    ///
    /// # Panics
    ///
    /// If any of the indices are out of range.
    pub fn get(&self, scenario: usize, product: usize, period: usize) -> f64 {
        self.values[self.flat_index(scenario, product, period)]
    }

    /// Set the demand for a product in a period of a scenario
    pub fn set(&mut self, scenario: usize, product: usize, period: usize, demand: f64) {
        let idx = self.flat_index(scenario, product, period);
        self.values[idx] = demand;
    }
}
