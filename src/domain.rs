//! Domain module - core entities and pure logic
//!
//! Everything in here is synchronous and side-effect free: the component
//! entity with its monetary table, price-string normalization, search-term
//! derivation, and the lookup seam the application layer depends on.

pub mod component;
pub mod lookup;
pub mod price;
pub mod search_terms;

// Re-export commonly used items for convenience
pub use component::{Cheaper, ColumnKind, Component, MatchState, PriceCell, PriceTable};
pub use lookup::{PriceLookup, PriceMatch};
pub use search_terms::derive_search_terms;
