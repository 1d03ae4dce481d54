use std::sync::Arc;
use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// Per-ticker mutual exclusion for holding read-modify-write cycles.
///
/// Every change to a holding reads the stored row, recomputes it and writes it
/// back. Two requests for the same ticker must not interleave those steps, so
/// callers hold the ticker's lock for the whole cycle.
#[derive(Clone)]
pub struct TickerLocks {
    locks: Arc<DashMap<String, Arc<Mutex<()>>>>,
    prune_above: usize,
}

const DEFAULT_PRUNE_ABOVE: usize = 1024;

impl Default for TickerLocks {
    fn default() -> Self {
        Self::with_prune_threshold(DEFAULT_PRUNE_ABOVE)
    }
}

/// Guards for one or more tickers; the locks are released when this is dropped.
pub struct TickerGuard {
    _guards: Vec<OwnedMutexGuard<()>>,
}

impl TickerLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Unused entries are dropped whenever the map grows past `prune_above`.
    pub fn with_prune_threshold(prune_above: usize) -> Self {
        Self {
            locks: Arc::new(DashMap::new()),
            prune_above,
        }
    }

    /// Lock a single ticker.
    pub async fn lock(&self, ticker: &str) -> TickerGuard {
        self.lock_all(&[ticker]).await
    }

    /// Lock several tickers at once.
    ///
    /// Tickers are de-duplicated and taken in sorted order so that two callers
    /// asking for the same pair can never wait on each other.
    pub async fn lock_all(&self, tickers: &[&str]) -> TickerGuard {
        let mut ordered: Vec<&str> = tickers.to_vec();
        ordered.sort_unstable();
        ordered.dedup();

        if self.locks.len() > self.prune_above {
            self.prune();
        }

        let mut guards = Vec::with_capacity(ordered.len());
        for ticker in ordered {
            // Clone the Arc out so the map shard is not held across the await
            let lock = self
                .locks
                .entry(ticker.to_string())
                .or_insert_with(|| Arc::new(Mutex::new(())))
                .value()
                .clone();
            guards.push(lock.lock_owned().await);
        }

        TickerGuard { _guards: guards }
    }

    /// Drop entries nobody is holding or waiting on.
    pub fn prune(&self) {
        self.locks.retain(|_, lock| Arc::strong_count(lock) > 1);
    }

    pub fn len(&self) -> usize {
        self.locks.len()
    }
}
