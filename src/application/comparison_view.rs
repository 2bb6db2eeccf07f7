//! Comparison view - the page-adapter boundary
//!
//! Owns the scanned components and the derived presentation state: per-cell
//! matched prices, the cheaper-side highlight, and the aggregate total
//! across all rows. The aggregate is recomputed on every single update and
//! stays marked "loading" until the dispatch queue has fully drained.

use std::sync::{Arc, RwLock};

use futures::future::join_all;
use tracing::debug;

use crate::application::lookup_service::LookupService;
use crate::dispatch::DispatchQueue;
use crate::domain::component::{Cheaper, ColumnKind, Component, MatchState};
use crate::domain::price::format_eur;
use crate::infrastructure::part_list_parser::{ParseError, PartListParser};

/// Aggregate comparison row: cheaper-of-two summed across all components.
#[derive(Debug, Clone, Copy)]
pub struct AggregateTotal {
    pub total: f64,
    /// True until every admitted lookup has settled.
    pub loading: bool,
}

struct ViewInner {
    components: Vec<Arc<RwLock<Component>>>,
    aggregate: RwLock<AggregateTotal>,
    queue: DispatchQueue,
}

/// Live comparison state for one scanned part list.
#[derive(Clone)]
pub struct ComparisonView {
    inner: Arc<ViewInner>,
}

impl ComparisonView {
    /// Build a view over already-extracted components.
    pub fn new(components: Vec<Component>, queue: DispatchQueue) -> Self {
        let total = components.iter().map(|c| c.table.effective_total()).sum();
        Self {
            inner: Arc::new(ViewInner {
                components: components
                    .into_iter()
                    .map(|c| Arc::new(RwLock::new(c)))
                    .collect(),
                aggregate: RwLock::new(AggregateTotal {
                    total,
                    loading: true,
                }),
                queue,
            }),
        }
    }

    /// Scan a part-list document and build the view.
    pub fn from_html(html: &str, parser: &PartListParser, queue: DispatchQueue) -> Result<Self, ParseError> {
        let components = parser.parse(html)?;
        Ok(Self::new(components, queue))
    }

    /// Resolve every component through the given service. Resolutions run
    /// concurrently, bounded by the shared dispatch queue; each terminal
    /// state feeds [`Self::on_update`] exactly once.
    pub async fn resolve_all(&self, service: &LookupService) {
        let resolutions = self
            .inner
            .components
            .iter()
            .enumerate()
            .map(|(index, component)| {
                let view = self.clone();
                let component = Arc::clone(component);
                let service = service.clone();
                async move {
                    service
                        .resolve_component(&component, move || view.on_update(index))
                        .await;
                }
            });

        join_all(resolutions).await;
    }

    /// Update callback: one component reached a terminal state. Recomputes
    /// the aggregate total and, once the queue is drained, clears the
    /// loading flag. Safe to call for an unresolved (exhausted) component.
    pub fn on_update(&self, index: usize) {
        let total = self
            .inner
            .components
            .iter()
            .map(|c| lock(c).table.effective_total())
            .sum();

        let loading = !self.inner.queue.is_idle();
        {
            let mut aggregate = self
                .inner
                .aggregate
                .write()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            aggregate.total = total;
            aggregate.loading = loading;
        }

        debug!(index, total, loading, "comparison row settled");
    }

    pub fn aggregate(&self) -> AggregateTotal {
        *self
            .inner
            .aggregate
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Snapshot of all components, for rendering and assertions.
    pub fn components(&self) -> Vec<Component> {
        self.inner.components.iter().map(|c| lock(c).clone()).collect()
    }

    /// Plain-text snapshot of the comparison: one block per row with every
    /// monetary cell (matched side marked), plus the aggregate line.
    pub fn render(&self) -> String {
        let mut out = String::new();

        for component in self.components() {
            out.push_str(&component.name);
            out.push('\n');

            for kind in ColumnKind::ALL {
                let cell = component.table.cell(kind);
                let matched = match (&component.match_state, cell.matched) {
                    (MatchState::Unresolved, _) => "...".to_string(),
                    (_, Some(amount)) => format_eur(amount),
                    (_, None) => "--".to_string(),
                };
                out.push_str(&format!(
                    "  {:<10} {:>10}  {:>10}\n",
                    kind.class_suffix(),
                    format_eur(cell.listed),
                    matched
                ));
            }

            if matches!(component.table.cheaper_side(), Cheaper::Matched) {
                out.push_str("  * matched price is cheaper\n");
            }
        }

        let aggregate = self.aggregate();
        out.push_str(&format!(
            "total {} {}\n",
            format_eur(aggregate.total),
            if aggregate.loading { "(loading)" } else { "" }
        ));

        out
    }
}

fn lock(component: &Arc<RwLock<Component>>) -> std::sync::RwLockReadGuard<'_, Component> {
    component.read().unwrap_or_else(|poisoned| poisoned.into_inner())
}
