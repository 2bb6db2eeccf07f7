//! Configuration infrastructure
//!
//! There is no configuration file; these structs exist so the reference
//! constants (two concurrent lookups, 500ms dispatch spacing, 5s transport
//! timeout) are constructor parameters instead of magic numbers, and so
//! tests can tighten them.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::dispatch::QueueConfig;
use crate::infrastructure::http_client::HttpClientConfig;

/// Complete application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Maximum simultaneous lookups against the price index
    pub max_concurrency: usize,

    /// Minimum spacing between queue-driven dispatches, in milliseconds
    pub min_dispatch_delay_ms: u64,

    /// Per-request transport timeout, in milliseconds
    pub request_timeout_ms: u64,

    /// User agent sent with every request
    pub user_agent: String,

    /// Base URL of the price-index search endpoint
    pub index_base_url: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            max_concurrency: 2,
            min_dispatch_delay_ms: 500,
            request_timeout_ms: 5_000,
            user_agent: "partwatch/0.2".to_string(),
            index_base_url: "https://tweakers.net/ajax/zoeken/pricewatch/".to_string(),
        }
    }
}

impl AppConfig {
    pub fn queue_config(&self) -> QueueConfig {
        QueueConfig {
            max_concurrency: self.max_concurrency,
            min_dispatch_delay: Duration::from_millis(self.min_dispatch_delay_ms),
        }
    }

    pub fn http_config(&self) -> HttpClientConfig {
        HttpClientConfig {
            user_agent: self.user_agent.clone(),
            timeout: Duration::from_millis(self.request_timeout_ms),
        }
    }
}
