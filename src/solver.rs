//! The boundary between the appraisal and the LP solver.
//!
//! The appraisal writes each linear program to a file and hands the path to a [`Solver`], which
//! reports either the optimal objective value or that the problem has no feasible solution. Any
//! other failure is an error.
use anyhow::{Context, Result, anyhow};
use highs::{HighsModelStatus, RowProblem as Problem, Sense};
use log::debug;
use std::fs;
use std::path::Path;

pub mod lp_file;
use lp_file::{LinearProgram, ObjectiveSense, parse_lp};

/// The result of solving a single linear program
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SolveOutcome {
    /// An optimal solution was found with the given objective value
    Optimal(f64),
    /// The problem has no feasible solution (or is unbounded)
    Infeasible,
}

/// Something which can solve a linear program stored in an LP file
pub trait Solver {
    /// Solve the linear program in the given file.
    ///
    /// # Returns
    ///
    /// The optimal objective value, [`SolveOutcome::Infeasible`] if there is no solution, or an
    /// error if the file could not be read or the solver failed.
    fn solve_lp_file(&mut self, path: &Path) -> Result<SolveOutcome>;
}

/// A [`Solver`] backed by HiGHS
#[derive(Debug, Default)]
pub struct HighsSolver {
    verbose: bool,
}

impl HighsSolver {
    /// Create a new [`HighsSolver`].
    ///
    /// If `verbose` is true, the solver's own output is printed to the console.
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }

    /// Solve an already-parsed linear program
    pub fn solve(&self, lp: &LinearProgram) -> Result<SolveOutcome> {
        let mut problem = Problem::default();

        // Add variables
        let variables = lp.variables();
        let mut columns = Vec::with_capacity(variables.len());
        for var in &variables {
            let coeff = lp.objective.get(*var).copied().unwrap_or(0.0);
            let (min, max) = lp.bounds_for(var);
            columns.push(problem.add_column(coeff, min..=max));
        }

        // Add constraints
        for row in &lp.rows {
            let terms = row.terms.iter().map(|(var, coeff)| {
                let idx = variables
                    .get_index_of(var.as_str())
                    .expect("Every variable in a row should have a column");
                (columns[idx], *coeff)
            });
            problem.add_row(row.lower..=row.upper, terms);
        }

        let sense = match lp.sense {
            ObjectiveSense::Maximise => Sense::Maximise,
            ObjectiveSense::Minimise => Sense::Minimise,
        };
        let mut highs_model = problem.optimise(sense);
        highs_model.set_option("output_flag", self.verbose);
        if self.verbose {
            highs_model.set_option("log_to_console", true);
        }

        let solved = highs_model.solve();
        match solved.status() {
            HighsModelStatus::Optimal => {
                let solution = solved.get_solution();
                let objective = variables
                    .iter()
                    .zip(solution.columns())
                    .map(|(var, value)| lp.objective.get(*var).copied().unwrap_or(0.0) * value)
                    .sum();
                Ok(SolveOutcome::Optimal(objective))
            }
            HighsModelStatus::Infeasible
            | HighsModelStatus::Unbounded
            | HighsModelStatus::UnboundedOrInfeasible => Ok(SolveOutcome::Infeasible),
            status => Err(anyhow!("Could not solve: {status:?}")),
        }
    }
}

impl Solver for HighsSolver {
    fn solve_lp_file(&mut self, path: &Path) -> Result<SolveOutcome> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Could not read LP file {}", path.display()))?;
        let lp = parse_lp(&text)
            .with_context(|| format!("Could not parse LP file {}", path.display()))?;
        debug!(
            "Solving {}: {} variables, {} constraints",
            path.display(),
            lp.variables().len(),
            lp.rows.len()
        );

        self.solve(&lp)
            .with_context(|| format!("Solver failed for {}", path.display()))
    }
}
