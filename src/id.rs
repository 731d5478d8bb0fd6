//! Code for handling IDs
use anyhow::{Context, Result};
use indexmap::{IndexMap, IndexSet};

/// A trait alias for ID types
pub trait IDLike:
    Eq + std::hash::Hash + std::borrow::Borrow<str> + Clone + std::fmt::Display + From<String>
{
}
impl<T> IDLike for T where
    T: Eq + std::hash::Hash + std::borrow::Borrow<str> + Clone + std::fmt::Display + From<String>
{
}

macro_rules! define_id_type {
    ($name:ident) => {
        #[derive(
            Clone, std::hash::Hash, PartialEq, Eq, serde::Deserialize, Debug, serde::Serialize,
        )]
        /// An ID type (e.g. `InvestmentID`, `ScenarioID`, etc.)
        pub struct $name(pub std::rc::Rc<str>);

        impl std::borrow::Borrow<str> for $name {
            fn borrow(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                $name(std::rc::Rc::from(s))
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                $name(std::rc::Rc::from(s))
            }
        }
    };
}
pub(crate) use define_id_type;

#[cfg(test)]
define_id_type!(GenericID);

/// An ordered collection of IDs, where an ID's position is its index in the model.
///
/// The LP formulation and the profit matrix refer to investments, products and scenarios by
/// index, whereas input files refer to them by ID, so this is the bridge between the two.
pub trait IDCollection<ID: IDLike> {
    /// Get the index of the ID with the given string representation.
    ///
    /// # Returns
    ///
    /// The position of the ID in `self`, or an error if not found.
    fn get_index_by_str(&self, id: &str) -> Result<usize>;

    /// Get the ID at the given index, if any
    fn get_id_at(&self, index: usize) -> Option<&ID>;
}

impl<ID: IDLike> IDCollection<ID> for IndexSet<ID> {
    fn get_index_by_str(&self, id: &str) -> Result<usize> {
        self.get_index_of(id)
            .with_context(|| format!("Unknown ID {id} found"))
    }

    fn get_id_at(&self, index: usize) -> Option<&ID> {
        self.get_index(index)
    }
}

impl<ID: IDLike, T> IDCollection<ID> for IndexMap<ID, T> {
    fn get_index_by_str(&self, id: &str) -> Result<usize> {
        self.get_index_of(id)
            .with_context(|| format!("Unknown ID {id} found"))
    }

    fn get_id_at(&self, index: usize) -> Option<&ID> {
        self.get_index(index).map(|(id, _)| id)
    }
}
