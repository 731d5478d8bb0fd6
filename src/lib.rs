//! Appraisal of capital investments under demand uncertainty.
//!
//! Each candidate investment is evaluated under each demand scenario by solving a multi-period
//! production and storage linear program. The resulting profit matrix is then summarised with
//! classical decision criteria under uncertainty.
#![warn(missing_docs)]
use std::path::PathBuf;

pub mod appraisal;
pub mod cli;
pub mod decision;
pub mod demand;
pub mod id;
pub mod input;
pub mod investment;
pub mod log;
pub mod lp;
pub mod model;
pub mod output;
pub mod product;
pub mod profit;
pub mod settings;
pub mod solver;

#[cfg(test)]
mod fixture;

/// Get the config folder for the program, which contains `settings.toml`
pub fn get_config_dir() -> PathBuf {
    let mut path = dirs::config_dir().unwrap_or_default();
    path.push("invest-appraisal");
    path
}
