//! Dispatch module - throttled execution of asynchronous work
//!
//! Contains the [`DispatchQueue`], the single funnel every remote lookup in
//! this crate passes through.

pub mod queue;

pub use queue::{DispatchError, DispatchQueue, QueueConfig};
