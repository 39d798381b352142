//! Debounced catalog search
//!
//! Every keystroke bumps a shared generation counter. A request goes out only
//! once the debounce window passes without a newer keystroke, and its reply is
//! applied only if no newer keystroke arrived meanwhile.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use ssa_gateway::{GatewayError, SatelliteSummary, SsaGateway, MIN_SEARCH_LEN};
use tracing::debug;

pub const SEARCH_DEBOUNCE: Duration = Duration::from_millis(300);

/// Entries shown in the map search dropdown
pub const MAP_SEARCH_LIMIT: usize = 8;

#[derive(Debug)]
pub enum SearchOutcome {
    /// Query too short; results should be hidden
    Hidden,
    /// A newer keystroke replaced this one
    Superseded,
    Results(Vec<SatelliteSummary>),
    Failed(GatewayError),
}

/// Clones share one generation counter
#[derive(Debug, Clone)]
pub struct SearchDebouncer {
    generation: Arc<AtomicU64>,
    delay: Duration,
    limit: usize,
}

impl Default for SearchDebouncer {
    fn default() -> Self {
        Self::new(SEARCH_DEBOUNCE, MAP_SEARCH_LIMIT)
    }
}

impl SearchDebouncer {
    pub fn new(delay: Duration, limit: usize) -> Self {
        Self {
            generation: Arc::new(AtomicU64::new(0)),
            delay,
            limit,
        }
    }

    pub fn current_generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    fn is_current(&self, generation: u64) -> bool {
        self.current_generation() == generation
    }

    /// Register a keystroke without searching; pending searches go stale
    pub fn invalidate(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub async fn search<G: SsaGateway>(&self, gateway: &G, query: &str) -> SearchOutcome {
        let generation = self.invalidate();
        let query = query.trim();
        if query.chars().count() < MIN_SEARCH_LEN {
            return SearchOutcome::Hidden;
        }

        tokio::time::sleep(self.delay).await;
        if !self.is_current(generation) {
            debug!(query, generation, "search superseded before request");
            return SearchOutcome::Superseded;
        }

        let reply = gateway.search_satellites(query).await;
        if !self.is_current(generation) {
            debug!(query, generation, "stale search reply dropped");
            return SearchOutcome::Superseded;
        }

        match reply {
            Ok(mut results) => {
                results.truncate(self.limit);
                SearchOutcome::Results(results)
            }
            Err(e) => SearchOutcome::Failed(e),
        }
    }
}
