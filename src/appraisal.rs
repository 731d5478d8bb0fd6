//! Solving the linear program for every (investment, scenario) pair of a model.
use crate::decision::DecisionCriteria;
use crate::id::IDCollection;
use crate::lp::{LpBuilder, OpeningStock};
use crate::model::Model;
use crate::output::DataWriter;
use crate::profit::ProfitMatrix;
use crate::solver::{SolveOutcome, Solver};
use anyhow::{Context, Result, ensure};
use log::{debug, info, warn};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// The name of the folder, inside the output folder, where LP files are kept for debugging
pub const LP_FILES_DIR_NAME: &str = "lp_files";

/// The directory in which LP files are written while they are being solved
pub enum LpFileDir {
    /// A temporary directory which is deleted, along with any files left in it, when dropped
    Temporary(TempDir),
    /// A persistent directory in which LP files are kept after being solved
    Persistent(PathBuf),
}

impl LpFileDir {
    /// Create a new temporary directory for LP files
    pub fn temporary() -> Result<Self> {
        let dir = TempDir::new().context("Failed to create temporary directory for LP files")?;
        Ok(Self::Temporary(dir))
    }

    /// Use `<output_dir>/lp_files` for LP files, creating it if needed
    pub fn persistent(output_dir: &Path) -> Result<Self> {
        let path = output_dir.join(LP_FILES_DIR_NAME);
        fs::create_dir_all(&path)
            .with_context(|| format!("Failed to create directory: {}", path.display()))?;
        Ok(Self::Persistent(path))
    }

    /// The path to the directory
    pub fn path(&self) -> &Path {
        match self {
            Self::Temporary(dir) => dir.path(),
            Self::Persistent(path) => path,
        }
    }

    /// Whether LP files should be kept after solving
    fn keep_files(&self) -> bool {
        matches!(self, Self::Persistent(_))
    }
}

/// The file name for the LP file of the given pair
pub fn lp_file_name(investment: usize, scenario: usize) -> String {
    format!("solve_{investment}_{scenario}.lp")
}

/// An LP file on disk, which is removed when this goes out of scope unless it is to be kept
struct LpFile {
    path: PathBuf,
    keep: bool,
}

impl LpFile {
    /// Write `contents` to a new file at `path`
    fn create(path: PathBuf, contents: &str, keep: bool) -> Result<Self> {
        fs::write(&path, contents)
            .with_context(|| format!("Failed to write LP file {}", path.display()))?;
        Ok(Self { path, keep })
    }
}

impl Drop for LpFile {
    fn drop(&mut self) {
        if self.keep {
            return;
        }

        if let Err(err) = fs::remove_file(&self.path) {
            warn!("Could not remove LP file {}: {err}", self.path.display());
        }
    }
}

/// Run a complete appraisal of the model.
///
/// Every (investment, scenario) pair is solved, then the decision criteria are calculated from
/// the resulting profit matrix. Results are written to `output_path`. If solving fails part way
/// through, the partially populated profit matrix is still written before the error is returned.
///
/// # Arguments
///
/// * `model` - The model to appraise
/// * `solver` - The solver to use for each pair
/// * `opening_stock` - How opening stock is treated
/// * `output_path` - The folder to which output files will be written
/// * `debug_model` - Whether to keep the LP file for each pair
pub fn run<S>(
    model: &Model,
    solver: &mut S,
    opening_stock: OpeningStock,
    output_path: &Path,
    debug_model: bool,
) -> Result<DecisionCriteria>
where
    S: Solver + ?Sized,
{
    let lp_dir = if debug_model {
        LpFileDir::persistent(output_path)?
    } else {
        LpFileDir::temporary()?
    };
    let writer = DataWriter::create(output_path)?;

    let mut matrix = ProfitMatrix::new(model.num_investments(), model.num_scenarios());
    if let Err(err) = solve_profit_matrix(model, solver, opening_stock, &lp_dir, &mut matrix) {
        // Keep whatever was solved, but report the solve failure rather than any write failure
        if let Err(write_err) = writer.write_profit_matrix(model, &matrix) {
            warn!("Could not write partial profit matrix: {write_err:?}");
        }
        return Err(err);
    }
    writer.write_profit_matrix(model, &matrix)?;
    ensure!(matrix.is_complete(), "Profit matrix is incomplete");

    let criteria = DecisionCriteria::evaluate(&matrix);
    writer.write_criteria(model, &criteria)?;

    if let Some(investment) = criteria.laplace_choice() {
        info!(
            "Highest mean profit: investment {} ({})",
            pair_id(&model.investments, investment),
            criteria.mean_for_investment(investment)
        );
    }
    if let Some(investment) = criteria.savage_choice() {
        info!(
            "Lowest regret: investment {} ({})",
            pair_id(&model.investments, investment),
            criteria.regret_for_investment(investment)
        );
    }

    Ok(criteria)
}

/// Solve the linear program for every (investment, scenario) pair, recording results in `matrix`.
///
/// Pairs are solved in order of investment, then scenario. Pairs without a feasible solution are
/// recorded as infeasible and solving continues. Any other failure stops the loop immediately and
/// is returned, leaving the remaining cells of `matrix` unset.
///
/// # Arguments
///
/// * `model` - The model
/// * `solver` - The solver to use for each pair
/// * `opening_stock` - How opening stock is treated, for every pair
/// * `lp_dir` - Where to write the LP files
/// * `matrix` - The matrix to populate, sized for the model
pub fn solve_profit_matrix<S>(
    model: &Model,
    solver: &mut S,
    opening_stock: OpeningStock,
    lp_dir: &LpFileDir,
    matrix: &mut ProfitMatrix,
) -> Result<()>
where
    S: Solver + ?Sized,
{
    assert_eq!(matrix.num_investments(), model.num_investments());
    assert_eq!(matrix.num_scenarios(), model.num_scenarios());

    info!(
        "Solving {} investments under {} scenarios",
        model.num_investments(),
        model.num_scenarios()
    );

    let builder = LpBuilder::new(model, opening_stock);
    let mut num_infeasible = 0;
    for investment in 0..model.num_investments() {
        for scenario in 0..model.num_scenarios() {
            let outcome = solve_pair(&builder, solver, lp_dir, investment, scenario)
                .with_context(|| {
                    format!(
                        "Failed to solve for investment {} under scenario {}",
                        pair_id(&model.investments, investment),
                        pair_id(&model.scenarios, scenario)
                    )
                })?;

            match outcome {
                SolveOutcome::Optimal(profit) => debug!(
                    "Investment {}, scenario {}: profit {profit}",
                    pair_id(&model.investments, investment),
                    pair_id(&model.scenarios, scenario)
                ),
                SolveOutcome::Infeasible => {
                    num_infeasible += 1;
                    warn!(
                        "No feasible solution for investment {} under scenario {}",
                        pair_id(&model.investments, investment),
                        pair_id(&model.scenarios, scenario)
                    );
                }
            }
            matrix.record(investment, scenario, outcome);
        }
    }

    info!(
        "Solved {} pairs ({num_infeasible} infeasible)",
        matrix.num_populated()
    );

    Ok(())
}

/// Get the ID at `index` for use in messages
fn pair_id<C, ID>(ids: &C, index: usize) -> String
where
    C: IDCollection<ID>,
    ID: crate::id::IDLike,
{
    ids.get_id_at(index)
        .map_or_else(|| index.to_string(), ToString::to_string)
}

/// Write the LP file for one pair and solve it. The file is removed again on all paths.
fn solve_pair<S>(
    builder: &LpBuilder,
    solver: &mut S,
    lp_dir: &LpFileDir,
    investment: usize,
    scenario: usize,
) -> Result<SolveOutcome>
where
    S: Solver + ?Sized,
{
    let path = lp_dir.path().join(lp_file_name(investment, scenario));
    let lp_file = LpFile::create(path, &builder.build(investment, scenario), lp_dir.keep_files())?;
    solver.solve_lp_file(&lp_file.path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::{assert_error, model};
    use crate::profit::INFEASIBLE;
    use crate::solver::HighsSolver;
    use anyhow::bail;
    use float_cmp::assert_approx_eq;
    use rstest::rstest;
    use tempfile::tempdir;

    /// A solver which returns canned outcomes and records the files it was given
    #[derive(Default)]
    struct MockSolver {
        outcomes: Vec<Result<SolveOutcome, String>>,
        paths: Vec<PathBuf>,
    }

    impl Solver for MockSolver {
        fn solve_lp_file(&mut self, path: &Path) -> Result<SolveOutcome> {
            assert!(path.is_file());
            let text = fs::read_to_string(path)?;
            assert!(text.starts_with("Maximize"));
            self.paths.push(path.to_path_buf());

            match self.outcomes.remove(0) {
                Ok(outcome) => Ok(outcome),
                Err(msg) => bail!(msg),
            }
        }
    }

    fn mock(outcomes: &[Result<SolveOutcome, &str>]) -> MockSolver {
        MockSolver {
            outcomes: outcomes
                .iter()
                .map(|&outcome| outcome.map_err(ToString::to_string))
                .collect(),
            ..MockSolver::default()
        }
    }

    #[rstest]
    fn test_solve_profit_matrix(model: Model) {
        let mut solver = mock(&[
            Ok(SolveOutcome::Optimal(1.0)),
            Ok(SolveOutcome::Infeasible),
            Ok(SolveOutcome::Optimal(3.0)),
            Ok(SolveOutcome::Optimal(-4.0)),
        ]);
        let lp_dir = LpFileDir::temporary().unwrap();
        let mut matrix = ProfitMatrix::new(2, 2);
        solve_profit_matrix(
            &model,
            &mut solver,
            OpeningStock::Fixed,
            &lp_dir,
            &mut matrix,
        )
        .unwrap();

        assert!(matrix.is_complete());
        assert_eq!(matrix.get(0, 0), Some(1.0));
        assert_eq!(matrix.get(0, 1), Some(INFEASIBLE));
        assert_eq!(matrix.get(1, 0), Some(3.0));
        assert_eq!(matrix.get(1, 1), Some(-4.0));

        // Pairs are solved in order and every file is removed afterwards
        let names: Vec<_> = solver
            .paths
            .iter()
            .map(|path| path.file_name().unwrap().to_str().unwrap())
            .collect();
        assert_eq!(
            names,
            ["solve_0_0.lp", "solve_0_1.lp", "solve_1_0.lp", "solve_1_1.lp"]
        );
        assert!(solver.paths.iter().all(|path| !path.exists()));
    }

    #[rstest]
    fn test_solve_profit_matrix_error(model: Model) {
        let mut solver = mock(&[
            Ok(SolveOutcome::Optimal(1.0)),
            Ok(SolveOutcome::Optimal(2.0)),
            Err("Bad LP file"),
        ]);
        let lp_dir = LpFileDir::temporary().unwrap();
        let mut matrix = ProfitMatrix::new(2, 2);
        let result = solve_profit_matrix(
            &model,
            &mut solver,
            OpeningStock::Fixed,
            &lp_dir,
            &mut matrix,
        );
        assert_error!(
            result,
            "Failed to solve for investment large under scenario low"
        );

        // The remaining pair is never attempted
        assert_eq!(matrix.num_populated(), 2);
        assert_eq!(matrix.get(1, 0), None);
        assert_eq!(matrix.get(1, 1), None);
        assert_eq!(solver.paths.len(), 3);

        // The failing pair's file is removed too
        assert!(!solver.paths[2].exists());
    }

    #[rstest]
    fn test_solve_profit_matrix_keep_files(model: Model) {
        let output_dir = tempdir().unwrap();
        let lp_dir = LpFileDir::persistent(output_dir.path()).unwrap();
        let mut solver = mock(&[Ok(SolveOutcome::Optimal(0.0)); 4]);
        let mut matrix = ProfitMatrix::new(2, 2);
        solve_profit_matrix(
            &model,
            &mut solver,
            OpeningStock::Fixed,
            &lp_dir,
            &mut matrix,
        )
        .unwrap();

        let lp_files_dir = output_dir.path().join(LP_FILES_DIR_NAME);
        for (investment, scenario) in [(0, 0), (0, 1), (1, 0), (1, 1)] {
            assert!(lp_files_dir.join(lp_file_name(investment, scenario)).is_file());
        }
    }

    #[rstest]
    fn test_solve_profit_matrix_highs(model: Model) {
        let lp_dir = LpFileDir::temporary().unwrap();
        let mut matrix = ProfitMatrix::new(2, 2);
        solve_profit_matrix(
            &model,
            &mut HighsSolver::default(),
            OpeningStock::Penalised(1000.0),
            &lp_dir,
            &mut matrix,
        )
        .unwrap();

        assert_approx_eq!(f64, matrix.value(0, 0), -40.0, epsilon = 1e-6);
        assert_approx_eq!(f64, matrix.value(0, 1), -29895.0, epsilon = 1e-6);
        assert_approx_eq!(f64, matrix.value(1, 0), -270.0, epsilon = 1e-6);
        assert_approx_eq!(f64, matrix.value(1, 1), -90.0, epsilon = 1e-6);
    }

    #[rstest]
    fn test_run(model: Model) {
        let output_dir = tempdir().unwrap();
        let criteria = run(
            &model,
            &mut HighsSolver::default(),
            OpeningStock::Fixed,
            output_dir.path(),
            false,
        )
        .unwrap();

        // The small machine cannot meet high demand without opening stock
        assert_approx_eq!(f64, criteria.best_for_scenario(0), 0.0);
        assert_approx_eq!(f64, criteria.best_for_scenario(1), 0.0);
        assert_eq!(criteria.laplace_choice(), Some(1));
        assert!(output_dir.path().join("profit_matrix.csv").is_file());
        assert!(output_dir.path().join("investment_criteria.csv").is_file());
        assert!(!output_dir.path().join(LP_FILES_DIR_NAME).exists());
    }

    #[rstest]
    fn test_run_debug_model(model: Model) {
        let output_dir = tempdir().unwrap();
        let mut solver = mock(&[Ok(SolveOutcome::Optimal(1.0)); 4]);
        run(&model, &mut solver, OpeningStock::Fixed, output_dir.path(), true).unwrap();
        assert!(
            output_dir
                .path()
                .join(LP_FILES_DIR_NAME)
                .join(lp_file_name(1, 1))
                .is_file()
        );
    }

    #[rstest]
    fn test_run_solve_error_writes_partial_matrix(model: Model) {
        let output_dir = tempdir().unwrap();
        let mut solver = mock(&[
            Ok(SolveOutcome::Optimal(1.0)),
            Ok(SolveOutcome::Infeasible),
            Err("Bad LP file"),
        ]);
        let result = run(
            &model,
            &mut solver,
            OpeningStock::Fixed,
            output_dir.path(),
            false,
        );
        assert_error!(
            result,
            "Failed to solve for investment large under scenario low"
        );

        // Header plus the two solved pairs
        let profits = fs::read_to_string(output_dir.path().join("profit_matrix.csv")).unwrap();
        assert_eq!(profits.lines().count(), 1 + 2);
        assert!(!output_dir.path().join("scenario_criteria.csv").exists());
        assert!(!output_dir.path().join("investment_criteria.csv").exists());
    }
}
