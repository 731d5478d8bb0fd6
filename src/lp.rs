//! Construction of the linear program for a single investment under a single demand scenario.
//!
//! The program is written as text in CPLEX LP format, which is what the solver imports. It models
//! multi-period production with stock carried between periods:
//!
//! * `X_<product>_<period>` is the quantity of a product made in a period
//! * `Y_<product>_<period>` is the stock of a product at the start of a period, for periods
//!   `0..=P`, so that `Y_<product>_<P>` is the closing stock
//! * `cst` is fixed at one and carries the constant part of the objective
//!
//! All demand must be met, so revenue does not depend on any decision variable and is folded into
//! the constant term along with the purchase cost and amortisation of the machine.
use crate::model::Model;
use std::fmt::Write;

/// The name of the variable which is fixed at one to carry the objective's constant term
pub const CONSTANT_VAR: &str = "cst";

/// How opening stock is treated in the formulation
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum OpeningStock {
    /// Opening stock is supplied externally, so the opening stock variables are fixed at zero
    Fixed,
    /// No opening stock is supplied, so any opening stock incurs the given penalty per unit
    Penalised(f64),
}

/// The name of the production variable for a product in a period
pub fn production_var(product: usize, period: usize) -> String {
    format!("X_{product}_{period}")
}

/// The name of the stock variable for a product at the start of a period
pub fn stock_var(product: usize, period: usize) -> String {
    format!("Y_{product}_{period}")
}

/// Format a number for the LP file.
///
/// Rust never uses exponent notation when displaying an `f64`, which suits LP readers, but
/// negative zero needs normalising.
fn format_number(value: f64) -> String {
    if value == 0.0 {
        "0".to_string()
    } else {
        value.to_string()
    }
}

/// Append a signed term (e.g. ` - 2.5 X_0_1`) to an expression
fn push_term(expr: &mut String, coeff: f64, var: &str) {
    let sign = if coeff < 0.0 { '-' } else { '+' };
    write!(expr, " {sign} {} {var}", format_number(coeff.abs())).unwrap();
}

/// Builds LP text for (investment, scenario) pairs of a model.
///
/// The treatment of opening stock is fixed for the lifetime of the builder, so every program built
/// in a batch uses the same setting.
pub struct LpBuilder<'a> {
    model: &'a Model,
    opening_stock: OpeningStock,
}

impl<'a> LpBuilder<'a> {
    /// Create a new [`LpBuilder`]
    pub fn new(model: &'a Model, opening_stock: OpeningStock) -> Self {
        Self {
            model,
            opening_stock,
        }
    }

    /// Build the complete LP document for the given investment and scenario.
    ///
    /// The output only depends on the arguments and the model, so repeated calls give identical
    /// text.
    ///
    /// # Panics
    ///
    /// If `investment` or `scenario` are out of range.
    pub fn build(&self, investment: usize, scenario: usize) -> String {
        let mut lp = String::new();
        writeln!(lp, "Maximize").unwrap();
        writeln!(lp, " profit: {}", self.objective(investment, scenario)).unwrap();
        writeln!(lp, "Subject To").unwrap();
        lp.push_str(&self.capacity_constraints(investment));
        lp.push_str(&self.stock_constraints(scenario));
        writeln!(lp, "Bounds").unwrap();
        lp.push_str(&self.bounds());
        writeln!(lp, "End").unwrap();

        lp
    }

    /// The constant part of the objective: revenue less purchase cost and total amortisation
    pub fn objective_constant(&self, investment: usize, scenario: usize) -> f64 {
        let params = &self.model.parameters;
        let investment = &self.model.investments[investment];

        self.model.revenue(scenario)
            - investment.cost
            - investment.total_amortisation(params.amortisation, params.num_periods)
    }

    /// The objective expression (to be maximised), without its label.
    ///
    /// Terms are grouped by kind: production costs, then storage costs, then amortisation credits,
    /// then any opening stock penalties, then the constant.
    pub fn objective(&self, investment: usize, scenario: usize) -> String {
        let params = &self.model.parameters;
        let production_cost = self.model.investments[investment].production_cost;
        let num_products = self.model.num_products();
        let num_periods = params.num_periods as usize;

        let mut production = String::new();
        let mut storage = String::new();
        let mut amortisation = String::new();
        for period in 0..=num_periods {
            for product in 0..num_products {
                push_term(&mut storage, -params.storage_cost, &stock_var(product, period));

                // No production happens after the last period
                if period < num_periods {
                    let var = production_var(product, period);
                    push_term(&mut production, -production_cost, &var);
                    push_term(&mut amortisation, params.amortisation, &var);
                }
            }
        }

        let mut objective = production;
        objective.push_str(&storage);
        objective.push_str(&amortisation);

        if let OpeningStock::Penalised(penalty) = self.opening_stock {
            for product in 0..num_products {
                push_term(&mut objective, -penalty, &stock_var(product, 0));
            }
        }

        push_term(
            &mut objective,
            self.objective_constant(investment, scenario),
            CONSTANT_VAR,
        );

        objective.trim_start().to_string()
    }

    /// One capacity constraint per period: total production cannot exceed machine capacity
    pub fn capacity_constraints(&self, investment: usize) -> String {
        let capacity = self.model.investments[investment].capacity;
        let num_products = self.model.num_products();

        let mut constraints = String::new();
        for period in 0..self.model.num_periods() as usize {
            let lhs = (0..num_products)
                .map(|product| production_var(product, period))
                .collect::<Vec<_>>()
                .join(" + ");
            writeln!(
                constraints,
                " Capa_{period}: {lhs} <= {}",
                format_number(capacity)
            )
            .unwrap();
        }

        constraints
    }

    /// One stock balance constraint per period and product.
    ///
    /// Closing stock equals opening stock plus production less demand, written as
    /// `Y_k_(p+1) - Y_k_p - X_k_p = -demand`.
    pub fn stock_constraints(&self, scenario: usize) -> String {
        let mut constraints = String::new();
        for period in 0..self.model.num_periods() as usize {
            for product in 0..self.model.num_products() {
                let demand = self.model.demand.get(scenario, product, period);
                writeln!(
                    constraints,
                    " stock_{product}_{period}: {} - {} - {} = {}",
                    stock_var(product, period + 1),
                    stock_var(product, period),
                    production_var(product, period),
                    format_number(-demand)
                )
                .unwrap();
            }
        }

        constraints
    }

    /// Variable bounds: the constant variable is fixed at one and, if opening stock is supplied
    /// externally, opening stock is fixed at zero
    pub fn bounds(&self) -> String {
        let mut bounds = String::new();
        writeln!(bounds, " {CONSTANT_VAR} = 1").unwrap();
        if self.opening_stock == OpeningStock::Fixed {
            for product in 0..self.model.num_products() {
                writeln!(bounds, " {} = 0", stock_var(product, 0)).unwrap();
            }
        }

        bounds
    }
}
