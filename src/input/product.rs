//! Code for reading the products CSV file.
use super::*;
use crate::product::{Product, ProductID, ProductMap};
use serde::Deserialize;
use std::path::Path;

const PRODUCTS_FILE_NAME: &str = "products.csv";

#[derive(PartialEq, Debug, Deserialize)]
struct ProductRaw {
    id: String,
    #[serde(deserialize_with = "deserialise_finite")]
    price: f64,
}

/// Read products from the products CSV file.
///
/// # Arguments
///
/// * `model_dir` - Folder containing model configuration files
///
/// # Returns
///
/// A map of products in file order, keyed by ID
pub fn read_products(model_dir: &Path) -> Result<ProductMap> {
    let file_path = model_dir.join(PRODUCTS_FILE_NAME);
    let products_csv = read_csv(&file_path)?;
    read_products_from_iter(products_csv).with_context(|| input_err_msg(&file_path))
}

fn read_products_from_iter<I>(iter: I) -> Result<ProductMap>
where
    I: Iterator<Item = ProductRaw>,
{
    let mut products = ProductMap::new();
    for raw in iter {
        let id = ProductID::from(raw.id);
        let product = Product {
            id: id.clone(),
            price: raw.price,
        };
        ensure!(
            products.insert(id.clone(), product).is_none(),
            "Duplicate product ID found: {id}"
        );
    }

    Ok(products)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_products_from_iter() {
        let products = read_products_from_iter(
            [
                ProductRaw {
                    id: "bolts".into(),
                    price: 5.0,
                },
                ProductRaw {
                    id: "nuts".into(),
                    price: 3.5,
                },
            ]
            .into_iter(),
        )
        .unwrap();
        assert_eq!(products.get_index_of("nuts"), Some(1));
        assert_eq!(products["bolts"].price, 5.0);
    }

    #[test]
    fn test_read_products_from_iter_duplicate() {
        let raw = || ProductRaw {
            id: "bolts".into(),
            price: 5.0,
        };
        assert_eq!(
            read_products_from_iter([raw(), raw()].into_iter())
                .unwrap_err()
                .to_string(),
            "Duplicate product ID found: bolts"
        );
    }
}
