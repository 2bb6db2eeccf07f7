//! Remote price-index client
//!
//! Issues keyword searches against the index's JSON endpoint and turns the
//! reply into [`PriceMatch`] values. The interesting wrinkle is the
//! `minPrice` field: it is not an amount but an HTML snippet whose trailing
//! anchor text carries the locale-formatted price, e.g.
//! `<a href="...">&euro; 1.234,56</a>`. The amount is cut out with a regex
//! and normalized; a snippet that will not yield an amount downgrades that
//! entry to a match without a price, never an error.

use anyhow::Result;
use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use tracing::{debug, warn};
use url::Url;

use crate::domain::lookup::{PriceLookup, PriceMatch};
use crate::domain::price::normalize_index_price;
use crate::infrastructure::http_client::HttpClient;

static MIN_PRICE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"; ([\d.,-]+)</a>$").expect("min price regex is valid"));

/// Search reply payload. Unknown fields are ignored; an absent entity list
/// reads as empty.
#[derive(Debug, Deserialize)]
struct SearchPayload {
    #[serde(default)]
    entities: Vec<EntityPayload>,
}

#[derive(Debug, Deserialize)]
struct EntityPayload {
    link: String,
    #[serde(rename = "minPrice")]
    min_price: Option<String>,
}

/// Client for the remote price index.
pub struct PriceIndexClient {
    http: HttpClient,
    base_url: String,
}

impl PriceIndexClient {
    pub fn new(http: HttpClient, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
        }
    }

    fn search_url(&self, keyword: &str) -> Result<Url> {
        let mut url = Url::parse(&self.base_url)?;
        url.query_pairs_mut()
            .append_pair("keyword", keyword)
            .append_pair("output", "json");
        Ok(url)
    }
}

/// Pull the locale-formatted amount out of a `minPrice` HTML snippet.
fn extract_min_price(snippet: &str) -> Option<f64> {
    let captures = MIN_PRICE_RE.captures(snippet.trim_end())?;
    normalize_index_price(&captures[1])
}

#[async_trait]
impl PriceLookup for PriceIndexClient {
    async fn search(&self, keyword: &str) -> Result<Vec<PriceMatch>> {
        let url = self.search_url(keyword)?;
        let payload: SearchPayload = self.http.get_json(url.as_str()).await?;

        debug!(%keyword, entities = payload.entities.len(), "price index replied");

        let matches = payload
            .entities
            .into_iter()
            .map(|entity| {
                let price = entity.min_price.as_deref().and_then(extract_min_price);
                if price.is_none() {
                    warn!(link = %entity.link, "index entry carried no parseable price");
                }
                PriceMatch {
                    link: entity.link,
                    price,
                }
            })
            .collect();

        Ok(matches)
    }
}
