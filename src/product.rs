//! Products are the goods made by an investment's machine and sold to meet demand.
use crate::id::define_id_type;
use indexmap::IndexMap;

define_id_type! {ProductID}

/// A map of [`Product`]s, keyed by product ID.
///
/// The position of a product in the map is the product index used in LP variable names.
pub type ProductMap = IndexMap<ProductID, Product>;

/// A product which can be manufactured and sold
#[derive(PartialEq, Debug, Clone)]
pub struct Product {
    /// A unique identifier for the product
    pub id: ProductID,
    /// Selling price per unit
    pub price: f64,
}
