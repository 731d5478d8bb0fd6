//! Code for reading the scenarios CSV file.
use super::*;
use crate::demand::ScenarioID;
use serde::Deserialize;
use std::path::Path;

const SCENARIOS_FILE_NAME: &str = "scenarios.csv";

#[derive(PartialEq, Debug, Deserialize)]
struct ScenarioRaw {
    id: ScenarioID,
}

/// Read scenario IDs from the scenarios CSV file.
///
/// The order of the file gives the scenario indices.
pub fn read_scenarios(model_dir: &Path) -> Result<IndexSet<ScenarioID>> {
    let file_path = model_dir.join(SCENARIOS_FILE_NAME);
    let scenarios_csv = read_csv::<ScenarioRaw>(&file_path)?;
    collect_unique_ids(scenarios_csv.map(|raw| raw.id)).with_context(|| input_err_msg(&file_path))
}
