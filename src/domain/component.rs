//! Component entity and its monetary table
//!
//! One [`Component`] exists per part-list row. Its match state transitions at
//! most once, from unresolved to either resolved (a remote price was found)
//! or exhausted (every search term was tried without a usable match).

use serde::{Deserialize, Serialize};
use tracing::warn;

/// The five monetary columns of a part-list row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColumnKind {
    Base,
    Promo,
    Shipping,
    Tax,
    Price,
}

impl ColumnKind {
    pub const ALL: [ColumnKind; 5] = [
        ColumnKind::Base,
        ColumnKind::Promo,
        ColumnKind::Shipping,
        ColumnKind::Tax,
        ColumnKind::Price,
    ];

    /// CSS class suffix the source page uses for this column.
    pub fn class_suffix(self) -> &'static str {
        match self {
            ColumnKind::Base => "base",
            ColumnKind::Promo => "promo",
            ColumnKind::Shipping => "shipping",
            ColumnKind::Tax => "tax",
            ColumnKind::Price => "price",
        }
    }
}

/// One monetary cell: the price listed on the page, plus the matched remote
/// price once a lookup resolves.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct PriceCell {
    /// Amount shown on the source page; absent cells are carried as zero.
    pub listed: f64,
    /// Matched remote amount, absent until the component resolves.
    pub matched: Option<f64>,
}

/// Which side of a cell is the cheaper one. Ties go to the matched price,
/// since a remote match at the same amount is still worth surfacing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cheaper {
    Listed,
    Matched,
}

/// Per-row table of monetary cells.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PriceTable {
    pub base: PriceCell,
    pub promo: PriceCell,
    pub shipping: PriceCell,
    pub tax: PriceCell,
    pub price: PriceCell,
}

impl PriceTable {
    pub fn cell(&self, kind: ColumnKind) -> &PriceCell {
        match kind {
            ColumnKind::Base => &self.base,
            ColumnKind::Promo => &self.promo,
            ColumnKind::Shipping => &self.shipping,
            ColumnKind::Tax => &self.tax,
            ColumnKind::Price => &self.price,
        }
    }

    /// Total column amount this row contributes to the aggregate: the
    /// matched price when it undercuts (or equals) the listed one, otherwise
    /// the listed price.
    pub fn effective_total(&self) -> f64 {
        match self.cheaper_side() {
            Cheaper::Matched => self.price.matched.unwrap_or(self.price.listed),
            Cheaper::Listed => self.price.listed,
        }
    }

    /// Which side of the total column to highlight.
    pub fn cheaper_side(&self) -> Cheaper {
        match self.price.matched {
            Some(matched) if matched <= self.price.listed => Cheaper::Matched,
            _ => Cheaper::Listed,
        }
    }
}

/// Terminal state of a component's lookup.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub enum MatchState {
    /// No lookup has concluded yet.
    #[default]
    Unresolved,
    /// A remote match was found and recorded.
    Resolved { link: String, price: f64 },
    /// Every search term was tried; nothing usable came back.
    Exhausted,
}

/// One part-list row: identity, the ordered search terms to try against the
/// remote index (most specific first), and the mutable match state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Component {
    pub name: String,
    pub url: String,
    pub search_terms: Vec<String>,
    pub table: PriceTable,
    pub match_state: MatchState,
}

impl Component {
    pub fn new(name: String, url: String, search_terms: Vec<String>, table: PriceTable) -> Self {
        Self {
            name,
            url,
            search_terms,
            table,
            match_state: MatchState::Unresolved,
        }
    }

    /// Record a successful match. The base and total columns carry the
    /// matched amount; the remaining columns have no remote counterpart.
    /// Only the first transition is honored.
    pub fn apply_match(&mut self, link: String, price: f64) {
        if !matches!(self.match_state, MatchState::Unresolved) {
            warn!(name = %self.name, "ignoring second match for already settled component");
            return;
        }

        self.table.base.matched = Some(price);
        self.table.price.matched = Some(price);
        self.match_state = MatchState::Resolved { link, price };
    }

    /// Record that every search term was tried without a usable match.
    pub fn mark_exhausted(&mut self) {
        if !matches!(self.match_state, MatchState::Unresolved) {
            warn!(name = %self.name, "ignoring exhaustion for already settled component");
            return;
        }
        self.match_state = MatchState::Exhausted;
    }
}
