//! Infrastructure module - transport, remote index client, page parsing
//!
//! Everything that touches the network or raw HTML lives here, behind the
//! seams the domain layer defines.

pub mod config;
pub mod http_client;
pub mod part_list_parser;
pub mod price_index;

pub use config::AppConfig;
pub use http_client::{FetchError, HttpClient, HttpClientConfig};
pub use part_list_parser::{ParseError, PartListParser};
pub use price_index::PriceIndexClient;
