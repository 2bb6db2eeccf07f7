//! Partwatch - part-list price comparison
//!
//! Scans a PC part-list page, derives search queries for every listed
//! component, looks each query up against a remote price index, and keeps a
//! comparison view (per-cell matched prices plus a running aggregate total)
//! up to date as results arrive.
//!
//! Lookups are funneled through a bounded-concurrency, rate-limited
//! [`dispatch::DispatchQueue`] so the remote index never sees more than a
//! configured number of simultaneous requests, with a minimum spacing delay
//! between queue-driven dispatches.

// Module declarations
pub mod application;
pub mod dispatch;
pub mod domain;
pub mod infrastructure;

// Re-export the main entry points for convenience
pub use application::{ComparisonView, LookupService};
pub use dispatch::{DispatchQueue, QueueConfig};
pub use infrastructure::config::AppConfig;
