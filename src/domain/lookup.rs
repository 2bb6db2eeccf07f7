//! Lookup seam between the application layer and the remote price index
//!
//! The [`LookupService`](crate::application::LookupService) only ever talks
//! to this trait, so tests can script the index instead of standing up HTTP.

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// One entry returned by a price-index search.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceMatch {
    /// Canonical link to the matched listing.
    pub link: String,
    /// Normalized price, absent when the index reply carried no parseable
    /// amount for this entry.
    pub price: Option<f64>,
}

/// Read-only keyword search against an external price index.
#[async_trait]
pub trait PriceLookup: Send + Sync {
    /// Look a free-text keyword up and return zero or more matches, most
    /// relevant first.
    async fn search(&self, keyword: &str) -> Result<Vec<PriceMatch>>;
}
