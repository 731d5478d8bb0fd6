//! The module responsible for writing output data to disk.
use crate::decision::DecisionCriteria;
use crate::demand::ScenarioID;
use crate::id::IDCollection;
use crate::investment::InvestmentID;
use crate::model::Model;
use crate::profit::ProfitMatrix;
use anyhow::{Context, Result, ensure};
use serde::{Deserialize, Serialize};
use std::fs;
use std::fs::File;
use std::path::{Path, PathBuf};

/// The root folder in which model-specific output folders will be created
const OUTPUT_DIRECTORY_ROOT: &str = "invest_appraisal_results";

/// The output file name for the profit matrix
const PROFIT_MATRIX_FILE_NAME: &str = "profit_matrix.csv";

/// The output file name for per-scenario decision criteria
const SCENARIO_CRITERIA_FILE_NAME: &str = "scenario_criteria.csv";

/// The output file name for per-investment decision criteria
const INVESTMENT_CRITERIA_FILE_NAME: &str = "investment_criteria.csv";

/// Get the default output directory for the model in the specified directory
pub fn get_output_dir(model_dir: &Path) -> Result<PathBuf> {
    // Get the model name from the dir path. This ends up being convoluted because we need to check
    // for all possible errors. Ugh.
    let model_dir = model_dir
        .canonicalize() // canonicalise in case the user has specified "."
        .context("Could not resolve path to model")?;

    let model_name = model_dir
        .file_name()
        .context("Model cannot be in root folder")?
        .to_str()
        .context("Invalid chars in model dir name")?;

    // Construct path
    Ok([OUTPUT_DIRECTORY_ROOT, model_name].iter().collect())
}

/// Create a new output directory for the model, optionally overwriting an existing one.
///
/// # Returns
///
/// True if an existing, non-empty directory was overwritten, false otherwise, or an error if the
/// directory already contains files and `allow_overwrite` is false.
pub fn create_output_directory(output_dir: &Path, allow_overwrite: bool) -> Result<bool> {
    // If the folder already exists, then delete it
    let overwrite = if let Ok(mut it) = fs::read_dir(output_dir) {
        if it.next().is_none() {
            // Folder exists and is empty: nothing to do
            return Ok(false);
        }

        ensure!(
            allow_overwrite,
            "Output folder already exists and is not empty. \
            Please delete the folder or pass the --overwrite command-line option."
        );

        fs::remove_dir_all(output_dir)?;
        true
    } else {
        false
    };

    // Try to create the directory, with parents
    fs::create_dir_all(output_dir)?;

    Ok(overwrite)
}

/// Represents a row in the profit matrix CSV file
#[derive(Serialize, Deserialize, Debug, PartialEq)]
struct ProfitRow {
    investment_id: InvestmentID,
    scenario_id: ScenarioID,
    profit: f64,
    feasible: bool,
}

/// Represents a row in the scenario criteria CSV file
#[derive(Serialize, Deserialize, Debug, PartialEq)]
struct ScenarioCriteriaRow {
    scenario_id: ScenarioID,
    best_profit: f64,
}

/// Represents a row in the investment criteria CSV file
#[derive(Serialize, Deserialize, Debug, PartialEq)]
struct InvestmentCriteriaRow {
    investment_id: InvestmentID,
    min_regret: f64,
    mean_profit: f64,
}

/// Look up the ID at `index`, which must exist
fn id_at<C, ID>(ids: &C, index: usize) -> Result<ID>
where
    C: IDCollection<ID>,
    ID: crate::id::IDLike,
{
    ids.get_id_at(index)
        .cloned()
        .with_context(|| format!("No ID for index {index}"))
}

/// An object for writing results to file
#[derive(Debug)]
pub struct DataWriter {
    output_path: PathBuf,
}

impl DataWriter {
    /// Create a writer for the given output folder, which must already exist
    ///
    /// # Arguments
    ///
    /// * `output_path` - Folder where files will be saved
    pub fn create(output_path: &Path) -> Result<Self> {
        ensure!(
            output_path.is_dir(),
            "Output folder does not exist: {}",
            output_path.display()
        );

        Ok(Self {
            output_path: output_path.to_path_buf(),
        })
    }

    fn new_writer(&self, file_name: &str) -> Result<csv::Writer<File>> {
        let file_path = self.output_path.join(file_name);
        csv::Writer::from_path(&file_path)
            .with_context(|| format!("Could not create {}", file_path.display()))
    }

    /// Write the populated cells of the profit matrix to a CSV file.
    ///
    /// Cells which have not been solved are left out, so this can be used for a partially
    /// populated matrix.
    pub fn write_profit_matrix(&self, model: &Model, matrix: &ProfitMatrix) -> Result<()> {
        let mut writer = self.new_writer(PROFIT_MATRIX_FILE_NAME)?;
        for (investment, scenario, profit) in matrix.iter_populated() {
            let row = ProfitRow {
                investment_id: id_at(&model.investments, investment)?,
                scenario_id: id_at(&model.scenarios, scenario)?,
                profit,
                feasible: matrix.is_feasible(investment, scenario),
            };
            writer.serialize(row)?;
        }
        writer.flush()?;

        Ok(())
    }

    /// Write the decision criteria to CSV files
    pub fn write_criteria(&self, model: &Model, criteria: &DecisionCriteria) -> Result<()> {
        let mut writer = self.new_writer(SCENARIO_CRITERIA_FILE_NAME)?;
        for (scenario, best_profit) in criteria.best_per_scenario().iter().enumerate() {
            let row = ScenarioCriteriaRow {
                scenario_id: id_at(&model.scenarios, scenario)?,
                best_profit: *best_profit,
            };
            writer.serialize(row)?;
        }
        writer.flush()?;

        let mut writer = self.new_writer(INVESTMENT_CRITERIA_FILE_NAME)?;
        for investment in 0..criteria.mean_per_investment().len() {
            let row = InvestmentCriteriaRow {
                investment_id: id_at(&model.investments, investment)?,
                min_regret: criteria.regret_for_investment(investment),
                mean_profit: criteria.mean_for_investment(investment),
            };
            writer.serialize(row)?;
        }
        writer.flush()?;

        Ok(())
    }
}
