//! The profit matrix: the optimal profit for each (investment, scenario) pair.
use crate::solver::SolveOutcome;

/// The value recorded for pairs whose linear program has no feasible solution.
///
/// This is far below any profit a real model could produce, so it can be told apart from a
/// genuine result.
pub const INFEASIBLE: f64 = -999_999_999_999.99;

/// A dense table of profits indexed by investment and scenario.
///
/// Cells start out unset and are populated one at a time as each pair is solved. The decision
/// criteria should only be calculated once every cell has been populated (see
/// [`ProfitMatrix::is_complete`]).
#[derive(Debug, Clone, PartialEq)]
pub struct ProfitMatrix {
    num_scenarios: usize,
    values: Vec<Option<f64>>,
}

impl ProfitMatrix {
    /// Create a new matrix with every cell unset
    pub fn new(num_investments: usize, num_scenarios: usize) -> Self {
        Self {
            num_scenarios,
            values: vec![None; num_investments * num_scenarios],
        }
    }

    /// Create a fully populated matrix from rows of profits, one row per investment.
    ///
    /// # Panics
    ///
    /// If the rows are not all the same length.
    pub fn from_rows<R>(rows: &[R]) -> Self
    where
        R: AsRef<[f64]>,
    {
        let num_scenarios = rows.first().map_or(0, |row| row.as_ref().len());
        assert!(
            rows.iter().all(|row| row.as_ref().len() == num_scenarios),
            "All rows must have the same number of scenarios"
        );

        Self {
            num_scenarios,
            values: rows
                .iter()
                .flat_map(|row| row.as_ref().iter().copied().map(Some))
                .collect(),
        }
    }

    /// The number of investments (rows)
    pub fn num_investments(&self) -> usize {
        if self.num_scenarios == 0 {
            0
        } else {
            self.values.len() / self.num_scenarios
        }
    }

    /// The number of scenarios (columns)
    pub fn num_scenarios(&self) -> usize {
        self.num_scenarios
    }

    fn flat_index(&self, investment: usize, scenario: usize) -> usize {
        assert!(
            investment < self.num_investments() && scenario < self.num_scenarios,
            "Profit matrix index ({investment}, {scenario}) out of range"
        );
        investment * self.num_scenarios + scenario
    }

    /// Set the value of a cell
    pub fn set(&mut self, investment: usize, scenario: usize, value: f64) {
        let idx = self.flat_index(investment, scenario);
        self.values[idx] = Some(value);
    }

    /// Record the outcome of solving the given pair, using [`INFEASIBLE`] if there was no solution
    pub fn record(&mut self, investment: usize, scenario: usize, outcome: SolveOutcome) {
        let value = match outcome {
            SolveOutcome::Optimal(value) => value,
            SolveOutcome::Infeasible => INFEASIBLE,
        };
        self.set(investment, scenario, value);
    }

    /// Get the value of a cell, if it has been populated
    pub fn get(&self, investment: usize, scenario: usize) -> Option<f64> {
        self.values[self.flat_index(investment, scenario)]
    }

    /// Get the value of a cell, treating unset cells as zero
    pub fn value(&self, investment: usize, scenario: usize) -> f64 {
        self.get(investment, scenario).unwrap_or(0.0)
    }

    /// Whether the cell is populated with a feasible profit
    pub fn is_feasible(&self, investment: usize, scenario: usize) -> bool {
        self.get(investment, scenario)
            .is_some_and(|value| value != INFEASIBLE)
    }

    /// Whether every cell has been populated
    pub fn is_complete(&self) -> bool {
        self.values.iter().all(Option::is_some)
    }

    /// The number of populated cells
    pub fn num_populated(&self) -> usize {
        self.values.iter().filter(|value| value.is_some()).count()
    }

    /// Iterate over the populated cells in (investment, scenario) order.
    ///
    /// # Returns
    ///
    /// An iterator of tuples containing investment index, scenario index and value.
    pub fn iter_populated(&self) -> impl Iterator<Item = (usize, usize, f64)> + '_ {
        self.values.iter().enumerate().filter_map(|(idx, value)| {
            value.map(|value| (idx / self.num_scenarios, idx % self.num_scenarios, value))
        })
    }

    /// Iterate over the values for one investment across all scenarios
    pub(crate) fn row(&self, investment: usize) -> impl Iterator<Item = f64> + '_ {
        (0..self.num_scenarios).map(move |scenario| self.value(investment, scenario))
    }
}
