//! Investments are the candidate capital purchases being appraised. Each one is a machine with a
//! purchase cost, a production cost per unit and a production capacity per period.
use crate::id::define_id_type;
use indexmap::IndexMap;

define_id_type! {InvestmentID}

/// A map of [`Investment`]s, keyed by investment ID.
///
/// The position of an investment in the map is its index in the profit matrix.
pub type InvestmentMap = IndexMap<InvestmentID, Investment>;

/// A candidate investment
#[derive(PartialEq, Debug, Clone)]
pub struct Investment {
    /// A unique identifier for the investment (e.g. "press_large")
    pub id: InvestmentID,
    /// The one-off purchase cost of the machine
    pub cost: f64,
    /// The cost of producing one unit of any product
    pub production_cost: f64,
    /// The maximum number of units (summed over products) which can be produced in a period
    pub capacity: f64,
}

impl Investment {
    /// The amortisation charged over the whole horizon for this investment's capacity.
    ///
    /// Each unit of capacity is amortised in every period, whether or not it is used.
    pub fn total_amortisation(&self, amortisation: f64, num_periods: u32) -> f64 {
        amortisation * f64::from(num_periods) * self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::assert_approx_eq;

    #[test]
    fn test_total_amortisation() {
        let investment = Investment {
            id: "inv1".into(),
            cost: 100.0,
            production_cost: 2.0,
            capacity: 20.0,
        };
        assert_approx_eq!(f64, investment.total_amortisation(1.5, 4), 120.0);
        assert_approx_eq!(f64, investment.total_amortisation(0.0, 4), 0.0);
    }
}
