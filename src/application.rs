//! Application layer module
//!
//! Orchestrates the domain logic: the lookup service walks a component's
//! search terms through the dispatch queue, and the comparison view keeps
//! the per-row comparison state and aggregate total current as resolutions
//! arrive.

pub mod comparison_view;
pub mod lookup_service;

pub use comparison_view::{AggregateTotal, ComparisonView};
pub use lookup_service::{LookupOutcome, LookupService};
