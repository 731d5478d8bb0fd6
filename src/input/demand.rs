//! Code for reading the demand CSV file.
use super::*;
use crate::demand::{DemandMap, ScenarioID};
use crate::id::IDCollection;
use crate::product::ProductMap;
use itertools::iproduct;
use serde::Deserialize;
use std::path::Path;

const DEMAND_FILE_NAME: &str = "demand.csv";

#[derive(PartialEq, Debug, Deserialize)]
struct DemandRaw {
    scenario_id: String,
    product_id: String,
    period: u32,
    #[serde(deserialize_with = "deserialise_non_negative")]
    demand: f64,
}

/// Read demand data from the demand CSV file.
///
/// # Arguments
///
/// * `model_dir` - Folder containing model configuration files
/// * `scenarios` - All scenario IDs, in index order
/// * `products` - All products, in index order
/// * `num_periods` - The number of periods in the planning horizon
///
/// # Returns
///
/// The demand for every product in every period of every scenario
pub fn read_demand(
    model_dir: &Path,
    scenarios: &IndexSet<ScenarioID>,
    products: &ProductMap,
    num_periods: u32,
) -> Result<DemandMap> {
    let file_path = model_dir.join(DEMAND_FILE_NAME);
    let demand_csv = read_csv(&file_path)?;
    read_demand_from_iter(demand_csv, scenarios, products, num_periods)
        .with_context(|| input_err_msg(&file_path))
}

fn read_demand_from_iter<I>(
    iter: I,
    scenarios: &IndexSet<ScenarioID>,
    products: &ProductMap,
    num_periods: u32,
) -> Result<DemandMap>
where
    I: Iterator<Item = DemandRaw>,
{
    let num_periods_usize = num_periods as usize;
    let mut demand = DemandMap::new(scenarios.len(), products.len(), num_periods_usize);
    let mut seen = vec![false; scenarios.len() * products.len() * num_periods_usize];
    for raw in iter {
        let scenario = scenarios.get_index_by_str(&raw.scenario_id)?;
        let product = products.get_index_by_str(&raw.product_id)?;
        ensure!(
            raw.period < num_periods,
            "Period {} is out of range: there are {num_periods} periods",
            raw.period
        );
        let period = raw.period as usize;

        let seen_idx = (scenario * products.len() + product) * num_periods_usize + period;
        ensure!(
            !seen[seen_idx],
            "Duplicate demand entry for scenario {}, product {}, period {period}",
            raw.scenario_id,
            raw.product_id
        );
        seen[seen_idx] = true;

        demand.set(scenario, product, period, raw.demand);
    }

    // Every scenario must give a demand for every product in every period
    for (scenario, product, period) in
        iproduct!(0..scenarios.len(), 0..products.len(), 0..num_periods_usize)
    {
        let seen_idx = (scenario * products.len() + product) * num_periods_usize + period;
        ensure!(
            seen[seen_idx],
            "Missing demand for scenario {}, product {}, period {period}",
            scenarios[scenario],
            products[product].id
        );
    }

    Ok(demand)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::{assert_error, products, scenario_ids};
    use rstest::rstest;

    fn demand_raw(scenario_id: &str, product_id: &str, period: u32, demand: f64) -> DemandRaw {
        DemandRaw {
            scenario_id: scenario_id.into(),
            product_id: product_id.into(),
            period,
            demand,
        }
    }

    /// A complete set of demand records for the fixture scenarios and products over two periods
    fn complete_demand() -> Vec<DemandRaw> {
        let mut records = Vec::new();
        for scenario_id in ["low", "high"] {
            for product_id in ["bolts", "nuts"] {
                for period in 0..2 {
                    records.push(demand_raw(scenario_id, product_id, period, f64::from(period)));
                }
            }
        }
        records
    }

    #[rstest]
    fn test_read_demand_from_iter(scenario_ids: IndexSet<ScenarioID>, products: ProductMap) {
        let mut records = complete_demand();
        records[0].demand = 7.0;
        let demand =
            read_demand_from_iter(records.into_iter(), &scenario_ids, &products, 2).unwrap();
        assert_eq!(demand.get(0, 0, 0), 7.0);
        assert_eq!(demand.get(1, 1, 1), 1.0);
    }

    #[rstest]
    fn test_read_demand_from_iter_missing(
        scenario_ids: IndexSet<ScenarioID>,
        products: ProductMap,
    ) {
        let mut records = complete_demand();
        records.pop();
        assert_error!(
            read_demand_from_iter(records.into_iter(), &scenario_ids, &products, 2),
            "Missing demand for scenario high, product nuts, period 1"
        );
    }

    #[rstest]
    fn test_read_demand_from_iter_duplicate(
        scenario_ids: IndexSet<ScenarioID>,
        products: ProductMap,
    ) {
        let mut records = complete_demand();
        records.push(demand_raw("low", "bolts", 0, 3.0));
        assert_error!(
            read_demand_from_iter(records.into_iter(), &scenario_ids, &products, 2),
            "Duplicate demand entry for scenario low, product bolts, period 0"
        );
    }

    #[rstest]
    fn test_read_demand_from_iter_bad_period(
        scenario_ids: IndexSet<ScenarioID>,
        products: ProductMap,
    ) {
        let records = [demand_raw("low", "bolts", 2, 3.0)];
        assert_error!(
            read_demand_from_iter(records.into_iter(), &scenario_ids, &products, 2),
            "Period 2 is out of range: there are 2 periods"
        );
    }

    #[rstest]
    fn test_read_demand_from_iter_unknown_id(
        scenario_ids: IndexSet<ScenarioID>,
        products: ProductMap,
    ) {
        let records = [demand_raw("medium", "bolts", 0, 3.0)];
        assert_error!(
            read_demand_from_iter(records.into_iter(), &scenario_ids, &products, 2),
            "Unknown ID medium found"
        );
    }
}
