//! Lookup service - term-fallback resolution of one component
//!
//! For each component the service tries its search terms in order, one
//! lookup in flight at a time, through the shared dispatch queue. The first
//! term whose reply carries a usable match wins; a transport failure, an
//! empty reply, or an unparseable price all just advance to the next term.
//! Different components still run concurrently against each other - the
//! queue, not this service, bounds that.

use std::sync::{Arc, RwLock};

use tracing::{debug, info, warn};

use crate::dispatch::DispatchQueue;
use crate::domain::component::Component;
use crate::domain::lookup::PriceLookup;

/// Terminal outcome of resolving one component's term list.
#[derive(Debug, Clone)]
pub enum LookupOutcome {
    /// A term produced a usable match.
    Resolved { link: String, price: f64 },
    /// Every term was tried; none matched.
    Exhausted,
}

/// Per-term progress. The index always advances; there is no retry of a
/// term that already failed.
enum LookupState {
    Trying(usize),
    Done(LookupOutcome),
}

/// Resolves components against a price index through the dispatch queue.
#[derive(Clone)]
pub struct LookupService {
    queue: DispatchQueue,
    index: Arc<dyn PriceLookup>,
}

impl LookupService {
    pub fn new(queue: DispatchQueue, index: Arc<dyn PriceLookup>) -> Self {
        Self { queue, index }
    }

    /// Walk an ordered term list until one yields a match or the list runs
    /// out. Each attempt is submitted through the queue, so this suspends
    /// whenever the queue is saturated.
    pub async fn resolve_terms(&self, name: &str, terms: &[String]) -> LookupOutcome {
        let mut state = LookupState::Trying(0);

        loop {
            state = match state {
                LookupState::Trying(i) => {
                    let Some(term) = terms.get(i) else {
                        debug!(%name, tried = terms.len(), "search terms exhausted");
                        break LookupOutcome::Exhausted;
                    };
                    self.try_term(name, term, i).await
                }
                LookupState::Done(outcome) => break outcome,
            };
        }
    }

    async fn try_term(&self, name: &str, term: &str, index_in_list: usize) -> LookupState {
        debug!(%name, %term, "submitting lookup");

        let index = Arc::clone(&self.index);
        let keyword = term.to_string();
        let result = self
            .queue
            .submit(async move { index.search(&keyword).await })
            .await;

        match result {
            Ok(Ok(matches)) => match matches.first() {
                Some(first) => match first.price {
                    Some(price) => {
                        info!(%name, %term, price, "matched");
                        LookupState::Done(LookupOutcome::Resolved {
                            link: first.link.clone(),
                            price,
                        })
                    }
                    None => {
                        debug!(%name, %term, "first match had no usable price, trying next term");
                        LookupState::Trying(index_in_list + 1)
                    }
                },
                None => {
                    debug!(%name, %term, "no matches, trying next term");
                    LookupState::Trying(index_in_list + 1)
                }
            },
            Ok(Err(e)) => {
                warn!(%name, %term, error = %e, "lookup failed, trying next term");
                LookupState::Trying(index_in_list + 1)
            }
            Err(e) => {
                warn!(%name, %term, error = %e, "lookup never completed, trying next term");
                LookupState::Trying(index_in_list + 1)
            }
        }
    }

    /// Resolve one shared component in place and fire the update callback
    /// exactly once, whether or not a match was found.
    pub async fn resolve_component<F>(&self, component: &Arc<RwLock<Component>>, on_update: F)
    where
        F: FnOnce(),
    {
        let (name, terms) = {
            let c = read_lock(component);
            (c.name.clone(), c.search_terms.clone())
        };

        let outcome = self.resolve_terms(&name, &terms).await;

        {
            let mut c = write_lock(component);
            match outcome {
                LookupOutcome::Resolved { link, price } => c.apply_match(link, price),
                LookupOutcome::Exhausted => c.mark_exhausted(),
            }
        }

        on_update();
    }
}

fn read_lock(component: &Arc<RwLock<Component>>) -> std::sync::RwLockReadGuard<'_, Component> {
    component.read().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn write_lock(component: &Arc<RwLock<Component>>) -> std::sync::RwLockWriteGuard<'_, Component> {
    component.write().unwrap_or_else(|poisoned| poisoned.into_inner())
}
