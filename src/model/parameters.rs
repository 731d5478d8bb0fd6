//! Defines the `ModelParameters` struct, which represents the contents of `model.toml`.
use crate::input::{deserialise_finite, deserialise_non_negative, input_err_msg, read_toml};
use crate::lp::OpeningStock;
use anyhow::{Context, Result, ensure};
use serde::Deserialize;
use std::path::Path;

const MODEL_PARAMETERS_FILE_NAME: &str = "model.toml";

macro_rules! define_param_default {
    ($name:ident, $type: ty, $value: expr) => {
        fn $name() -> $type {
            $value
        }
    };
}

define_param_default!(default_initial_stock_penalty, f64, 1000.0);

/// Represents the contents of the entire model file.
#[derive(Debug, Deserialize, PartialEq)]
pub struct ModelParameters {
    /// The number of production periods in the planning horizon
    pub num_periods: u32,
    /// The cost of holding one unit of any product in stock for one period
    #[serde(deserialize_with = "deserialise_non_negative")]
    pub storage_cost: f64,
    /// The amortisation charged per unit of machine capacity per period
    #[serde(deserialize_with = "deserialise_non_negative")]
    pub amortisation: f64,
    /// Whether opening stock is supplied externally.
    ///
    /// If so, the opening stock variables are fixed at zero; otherwise any opening stock is
    /// penalised in the objective.
    #[serde(default)]
    pub initial_stock: bool,
    /// The objective penalty per unit of opening stock, when no initial stock is supplied
    #[serde(default = "default_initial_stock_penalty")]
    #[serde(deserialize_with = "deserialise_finite")]
    pub initial_stock_penalty: f64,
}

/// Check that the `num_periods` parameter is valid
fn check_num_periods(num_periods: u32) -> Result<()> {
    ensure!(num_periods > 0, "num_periods cannot be zero");

    Ok(())
}

/// Check that the `initial_stock_penalty` parameter is valid
fn check_initial_stock_penalty(value: f64) -> Result<()> {
    ensure!(
        value > 0.0,
        "initial_stock_penalty must be a finite number greater than zero"
    );

    Ok(())
}

impl ModelParameters {
    /// Read a model file from the specified directory.
    ///
    /// # Arguments
    ///
    /// * `model_dir` - Folder containing model configuration files
    ///
    /// # Returns
    ///
    /// The model file contents as a [`ModelParameters`] struct or an error if the file is invalid
    pub fn from_path<P: AsRef<Path>>(model_dir: P) -> Result<ModelParameters> {
        let file_path = model_dir.as_ref().join(MODEL_PARAMETERS_FILE_NAME);
        let model_params: ModelParameters = read_toml(&file_path)?;

        model_params
            .validate()
            .with_context(|| input_err_msg(file_path))?;

        Ok(model_params)
    }

    /// Validate parameters after reading in file
    fn validate(&self) -> Result<()> {
        check_num_periods(self.num_periods)?;
        check_initial_stock_penalty(self.initial_stock_penalty)?;

        Ok(())
    }

    /// How opening stock should be treated in the LP formulation
    pub fn opening_stock(&self) -> OpeningStock {
        if self.initial_stock {
            OpeningStock::Fixed
        } else {
            OpeningStock::Penalised(self.initial_stock_penalty)
        }
    }
}
