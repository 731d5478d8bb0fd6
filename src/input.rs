//! Common routines for handling input data.
use crate::demand::ScenarioID;
use crate::model::{Model, ModelParameters};
use anyhow::{Context, Result, ensure};
use indexmap::IndexSet;
use itertools::Itertools;
use serde::de::{Deserialize, DeserializeOwned, Deserializer};
use std::fmt::Display;
use std::fs;
use std::path::Path;

mod demand;
use demand::read_demand;
mod investment;
use investment::read_investments;
mod product;
use product::read_products;
mod scenario;
use scenario::read_scenarios;

/// Read a series of type `T`s from a CSV file.
///
/// Will raise an error if the file is empty.
///
/// # Arguments
///
/// * `file_path` - Path to the CSV file
pub fn read_csv<T: DeserializeOwned>(file_path: &Path) -> Result<std::vec::IntoIter<T>> {
    let vec = read_csv_internal(file_path)?;
    ensure!(!vec.is_empty(), "CSV file {} cannot be empty", file_path.display());

    Ok(vec.into_iter())
}

fn read_csv_internal<T: DeserializeOwned>(file_path: &Path) -> Result<Vec<T>> {
    let vec = csv::Reader::from_path(file_path)
        .with_context(|| input_err_msg(file_path))?
        .into_deserialize()
        .process_results(|iter| iter.collect_vec())
        .with_context(|| input_err_msg(file_path))?;

    Ok(vec)
}

/// Parse a TOML file at the specified path.
///
/// # Arguments
///
/// * `file_path` - Path to the TOML file
///
/// # Returns
///
/// * The deserialised TOML data or an error if the file could not be read or parsed.
pub fn read_toml<T: DeserializeOwned>(file_path: &Path) -> Result<T> {
    let toml_str = fs::read_to_string(file_path).with_context(|| input_err_msg(file_path))?;
    let toml_data = toml::from_str(&toml_str).with_context(|| input_err_msg(file_path))?;
    Ok(toml_data)
}

/// Format an error message to include the file path. To be used with `anyhow::Context`.
pub fn input_err_msg<P: AsRef<Path>>(file_path: P) -> String {
    format!("Error reading {}", file_path.as_ref().display())
}

/// Read an f64, checking that it is finite
pub fn deserialise_finite<'de, D>(deserialiser: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value: f64 = Deserialize::deserialize(deserialiser)?;
    if !value.is_finite() {
        Err(serde::de::Error::custom("Value must be a finite number"))?;
    }

    Ok(value)
}

/// Read an f64, checking that it is finite and not negative
pub fn deserialise_non_negative<'de, D>(deserialiser: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = deserialise_finite(deserialiser)?;
    if value < 0.0 {
        Err(serde::de::Error::custom("Value cannot be negative"))?;
    }

    Ok(value)
}

/// Collect IDs into an ordered set, checking that there are no duplicates
fn collect_unique_ids<ID, I>(iter: I) -> Result<IndexSet<ID>>
where
    ID: Eq + std::hash::Hash + Display,
    I: IntoIterator<Item = ID>,
{
    let mut ids = IndexSet::new();
    for id in iter {
        ensure!(!ids.contains(&id), "Duplicate ID found: {id}");
        ids.insert(id);
    }

    Ok(ids)
}

/// Read a model from the specified directory.
///
/// # Arguments
///
/// * `model_dir` - Folder containing model configuration files
///
/// # Returns
///
/// The loaded model, with all of its input data validated.
pub fn load_model<P: AsRef<Path>>(model_dir: P) -> Result<Model> {
    let model_dir = model_dir.as_ref();
    let parameters = ModelParameters::from_path(model_dir)?;
    let investments = read_investments(model_dir)?;
    let products = read_products(model_dir)?;
    let scenarios: IndexSet<ScenarioID> = read_scenarios(model_dir)?;
    let demand = read_demand(model_dir, &scenarios, &products, parameters.num_periods)?;

    let model = Model {
        parameters,
        investments,
        products,
        scenarios,
        demand,
    };
    model.validate()?;

    Ok(model)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id::GenericID;
    use serde::Deserialize;
    use std::fs::File;
    use std::io::Write;
    use std::path::PathBuf;
    use tempfile::tempdir;

    #[derive(Debug, PartialEq, Deserialize)]
    struct Record {
        id: String,
        value: u32,
    }

    /// Create an example CSV file in dir_path
    fn create_csv_file(dir_path: &Path, contents: &str) -> PathBuf {
        let file_path = dir_path.join("test.csv");
        let mut file = File::create(&file_path).unwrap();
        writeln!(file, "{contents}").unwrap();
        file_path
    }

    #[test]
    fn test_read_csv() {
        let dir = tempdir().unwrap();
        let file_path = create_csv_file(dir.path(), "id,value\nhello,1\nworld,2\n");
        let records: Vec<Record> = read_csv(&file_path).unwrap().collect();
        assert_eq!(
            records,
            &[
                Record {
                    id: "hello".to_string(),
                    value: 1,
                },
                Record {
                    id: "world".to_string(),
                    value: 2,
                }
            ]
        );

        // File with no data (only column headers)
        let file_path = create_csv_file(dir.path(), "id,value\n");
        assert!(read_csv::<Record>(&file_path).is_err());

        // Missing file
        assert!(read_csv::<Record>(&dir.path().join("missing.csv")).is_err());
    }

    #[derive(Debug, Deserialize)]
    struct Values {
        #[serde(deserialize_with = "deserialise_non_negative")]
        value: f64,
    }

    fn read_value(raw: &str) -> Result<f64, toml::de::Error> {
        toml::from_str::<Values>(&format!("value = {raw}")).map(|values| values.value)
    }

    #[test]
    fn test_deserialise_non_negative() {
        assert_eq!(read_value("0.0").unwrap(), 0.0);
        assert_eq!(read_value("12.5").unwrap(), 12.5);
        assert!(read_value("-1.0").is_err());
        assert!(read_value("inf").is_err());
        assert!(read_value("nan").is_err());
    }

    #[test]
    fn test_read_toml() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("test.toml");
        {
            let mut file = File::create(&file_path).unwrap();
            writeln!(file, "value = 1.5").unwrap();
        }

        let values: Values = read_toml(&file_path).unwrap();
        assert_eq!(values.value, 1.5);

        assert!(read_toml::<Values>(&dir.path().join("missing.toml")).is_err());
    }

    #[test]
    fn test_collect_unique_ids() {
        let ids: IndexSet<GenericID> =
            collect_unique_ids(["a".into(), "b".into()]).unwrap();
        assert_eq!(ids.len(), 2);

        let result = collect_unique_ids::<GenericID, _>(["a".into(), "a".into()]);
        assert_eq!(result.unwrap_err().to_string(), "Duplicate ID found: a");
    }
}
