//! Code for reading the investments CSV file.
use super::*;
use crate::investment::{Investment, InvestmentID, InvestmentMap};
use serde::Deserialize;
use std::path::Path;

const INVESTMENTS_FILE_NAME: &str = "investments.csv";

#[derive(PartialEq, Debug, Deserialize)]
struct InvestmentRaw {
    id: String,
    #[serde(deserialize_with = "deserialise_finite")]
    cost: f64,
    #[serde(deserialize_with = "deserialise_finite")]
    production_cost: f64,
    #[serde(deserialize_with = "deserialise_non_negative")]
    capacity: f64,
}

/// Read investments from the investments CSV file.
///
/// # Arguments
///
/// * `model_dir` - Folder containing model configuration files
///
/// # Returns
///
/// A map of investments in file order, keyed by ID
pub fn read_investments(model_dir: &Path) -> Result<InvestmentMap> {
    let file_path = model_dir.join(INVESTMENTS_FILE_NAME);
    let investments_csv = read_csv(&file_path)?;
    read_investments_from_iter(investments_csv).with_context(|| input_err_msg(&file_path))
}

fn read_investments_from_iter<I>(iter: I) -> Result<InvestmentMap>
where
    I: Iterator<Item = InvestmentRaw>,
{
    let mut investments = InvestmentMap::new();
    for raw in iter {
        let id = InvestmentID::from(raw.id);
        ensure!(
            !investments.contains_key(&id),
            "Duplicate investment ID found: {id}"
        );

        let investment = Investment {
            id: id.clone(),
            cost: raw.cost,
            production_cost: raw.production_cost,
            capacity: raw.capacity,
        };
        investments.insert(id, investment);
    }

    Ok(investments)
}
