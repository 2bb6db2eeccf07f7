//! Part-list page parser
//!
//! Extracts one [`Component`] per row of the part-list table: the display
//! name (zero-width spaces stripped), the product URL, the derived search
//! terms, and the five monetary cells. Rows that fail to extract are logged
//! and skipped; a page with no extractable rows at all is an error.

use anyhow::Result;
use scraper::{ElementRef, Html, Selector};
use thiserror::Error;
use tracing::{debug, warn};

use crate::domain::component::{ColumnKind, Component, PriceCell, PriceTable};
use crate::domain::price::parse_listing_price;
use crate::domain::search_terms::derive_search_terms;

/// Failure to extract anything usable from a document.
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("no part rows found in document")]
    NoComponents,
}

/// Parser for the part-list table.
pub struct PartListParser {
    row_selector: Selector,
    name_link_selector: Selector,
    cell_selectors: Vec<(ColumnKind, Selector)>,
}

impl PartListParser {
    /// Create a parser with the source page's selectors compiled.
    pub fn new() -> Result<Self> {
        let cell_selectors = ColumnKind::ALL
            .iter()
            .map(|kind| {
                let css = format!(".td__{}", kind.class_suffix());
                Ok((*kind, Self::compile(&css)?))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            row_selector: Self::compile("tr")?,
            name_link_selector: Self::compile(".td__name > a")?,
            cell_selectors,
        })
    }

    fn compile(css: &str) -> Result<Selector> {
        Selector::parse(css).map_err(|e| anyhow::anyhow!("Failed to compile selector '{css}': {e}"))
    }

    /// Extract all components from a part-list document.
    pub fn parse(&self, html: &str) -> Result<Vec<Component>, ParseError> {
        let document = Html::parse_document(html);
        let mut components = Vec::new();

        for row in document.select(&self.row_selector) {
            let Some(link) = row.select(&self.name_link_selector).next() else {
                continue; // header, total, or otherwise non-part row
            };

            match self.extract_component(row, link) {
                Some(component) => components.push(component),
                None => warn!("skipping part row with no usable name or url"),
            }
        }

        if components.is_empty() {
            return Err(ParseError::NoComponents);
        }

        debug!(count = components.len(), "extracted part rows");
        Ok(components)
    }

    fn extract_component(&self, row: ElementRef<'_>, link: ElementRef<'_>) -> Option<Component> {
        let name = text_of(link).replace('\u{200B}', "").trim().to_string();
        let url = link.value().attr("href")?.to_string();

        if name.is_empty() {
            return None;
        }

        let mut table = PriceTable::default();
        for (kind, selector) in &self.cell_selectors {
            // Absent or blank monetary cells are carried as zero, matching
            // how the source page renders them.
            let listed = row
                .select(selector)
                .next()
                .and_then(|cell| parse_listing_price(&text_of(cell)))
                .unwrap_or(0.0);

            let cell = match kind {
                ColumnKind::Base => &mut table.base,
                ColumnKind::Promo => &mut table.promo,
                ColumnKind::Shipping => &mut table.shipping,
                ColumnKind::Tax => &mut table.tax,
                ColumnKind::Price => &mut table.price,
            };
            *cell = PriceCell {
                listed,
                matched: None,
            };
        }

        let search_terms = derive_search_terms(&name, &url);
        Some(Component::new(name, url, search_terms, table))
    }
}

fn text_of(element: ElementRef<'_>) -> String {
    element.text().collect::<Vec<_>>().join("\n")
}
