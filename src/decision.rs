//! Decision criteria under uncertainty, calculated from a complete profit matrix.
//!
//! Three criteria are supported:
//!
//! * the best achievable profit in each scenario (optimistic)
//! * the minimum regret of each investment across scenarios (Savage)
//! * the mean profit of each investment across scenarios (Laplace)
//!
//! Each is a pure function of the matrix. They should only be calculated once every cell of the
//! matrix has been populated; unset cells are treated as zero.
use crate::profit::ProfitMatrix;

/// For each scenario, the highest profit across all investments.
///
/// The result is never below zero: losses only show up if no investment makes a profit in that
/// scenario, in which case the best is zero.
pub fn best_per_scenario(matrix: &ProfitMatrix) -> Vec<f64> {
    (0..matrix.num_scenarios())
        .map(|scenario| {
            (0..matrix.num_investments())
                .map(|investment| matrix.value(investment, scenario))
                .fold(0.0, f64::max)
        })
        .collect()
}

/// For each investment, the largest shortfall from its own best scenario.
///
/// The regret of an investment in a scenario is its profit there minus its best profit across all
/// scenarios, so regrets are never positive and are zero in the best scenario. The returned value
/// is the minimum (i.e. worst) regret for each investment.
pub fn min_regret_per_investment(matrix: &ProfitMatrix) -> Vec<f64> {
    (0..matrix.num_investments())
        .map(|investment| {
            let best = matrix
                .row(investment)
                .fold(f64::NEG_INFINITY, f64::max);
            matrix
                .row(investment)
                .map(|value| value - best)
                .fold(0.0, f64::min)
        })
        .collect()
}

/// For each investment, the mean profit across all scenarios.
///
/// Infeasible cells are included with their sentinel value.
pub fn mean_per_investment(matrix: &ProfitMatrix) -> Vec<f64> {
    let num_scenarios = matrix.num_scenarios() as f64;
    (0..matrix.num_investments())
        .map(|investment| matrix.row(investment).sum::<f64>() / num_scenarios)
        .collect()
}

/// Get the index of the highest value, preferring the lowest index on ties
fn index_of_max(values: &[f64]) -> Option<usize> {
    values
        .iter()
        .enumerate()
        .fold(None, |best: Option<(usize, f64)>, (idx, &value)| match best {
            Some((_, best_value)) if value <= best_value => best,
            _ => Some((idx, value)),
        })
        .map(|(idx, _)| idx)
}

/// The results of all decision criteria for one profit matrix
#[derive(Debug, Clone, PartialEq)]
pub struct DecisionCriteria {
    best_per_scenario: Vec<f64>,
    min_regret_per_investment: Vec<f64>,
    mean_per_investment: Vec<f64>,
}

impl DecisionCriteria {
    /// Calculate all decision criteria for the given profit matrix
    pub fn evaluate(matrix: &ProfitMatrix) -> Self {
        Self {
            best_per_scenario: best_per_scenario(matrix),
            min_regret_per_investment: min_regret_per_investment(matrix),
            mean_per_investment: mean_per_investment(matrix),
        }
    }

    /// The best profit achievable in the given scenario
    pub fn best_for_scenario(&self, scenario: usize) -> f64 {
        self.best_per_scenario[scenario]
    }

    /// The minimum regret for the given investment
    pub fn regret_for_investment(&self, investment: usize) -> f64 {
        self.min_regret_per_investment[investment]
    }

    /// The mean profit for the given investment
    pub fn mean_for_investment(&self, investment: usize) -> f64 {
        self.mean_per_investment[investment]
    }

    /// Best profit for each scenario
    pub fn best_per_scenario(&self) -> &[f64] {
        &self.best_per_scenario
    }

    /// Minimum regret for each investment
    pub fn min_regret_per_investment(&self) -> &[f64] {
        &self.min_regret_per_investment
    }

    /// Mean profit for each investment
    pub fn mean_per_investment(&self) -> &[f64] {
        &self.mean_per_investment
    }

    /// The investment with the highest mean profit (Laplace criterion)
    pub fn laplace_choice(&self) -> Option<usize> {
        index_of_max(&self.mean_per_investment)
    }

    /// The investment whose worst regret is smallest (Savage criterion)
    pub fn savage_choice(&self) -> Option<usize> {
        index_of_max(&self.min_regret_per_investment)
    }
}
