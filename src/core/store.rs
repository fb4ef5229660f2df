//! Price store — latest tick plus bounded history per (instrument, venue)
//!
//! Concurrent ingestion sink for adapter ticks. In practice each key has a
//! single writer (one adapter owns each venue), so a plain read/write lock
//! over the nested map serializes puts per key while letting the engine
//! read freely. Readers never observe a partially written entry.

use std::collections::{HashMap, VecDeque};
use std::sync::RwLock;
use std::time::Duration;

use crate::adapters::types::Tick;
use crate::core::types::{Instrument, Venue};

// =============================================================================
// Configuration
// =============================================================================

/// Store sizing and staleness knobs.
#[derive(Debug, Clone, Copy)]
pub struct StoreConfig {
    /// Ticks retained per key (oldest evicted on insertion)
    pub history_size: usize,
    /// A key is stale when its latest tick is older than this
    pub stale_after: Duration,
    /// `sweep` drops keys untouched for this long
    pub drop_after: Duration,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            history_size: 100,
            stale_after: Duration::from_secs(60),
            drop_after: Duration::from_secs(300),
        }
    }
}

// =============================================================================
// PriceStore
// =============================================================================

#[derive(Debug)]
struct PriceEntry {
    latest: Tick,
    history: VecDeque<Tick>,
}

/// Concurrent map of (instrument, venue) → latest tick + history ring.
pub struct PriceStore {
    config: StoreConfig,
    inner: RwLock<HashMap<Instrument, HashMap<Venue, PriceEntry>>>,
}

impl PriceStore {
    pub fn new(config: StoreConfig) -> Self {
        Self {
            config,
            inner: RwLock::new(HashMap::new()),
        }
    }

    /// Insert a tick, replacing the latest value and appending to the
    /// history ring. Rejects ticks with non-positive or non-finite prices.
    ///
    /// Ingest time is clamped monotone non-decreasing per key, so a tick
    /// parsed just before a clock step back can never make the key appear
    /// to travel backwards in time.
    pub fn put(&self, mut tick: Tick) -> bool {
        if !tick.is_valid() {
            tracing::debug!(
                instrument = %tick.instrument,
                venue = %tick.venue,
                price = tick.price,
                "Rejected invalid tick"
            );
            return false;
        }

        let mut map = match self.inner.write() {
            Ok(guard) => guard,
            Err(_) => return false,
        };
        let venues = map.entry(tick.instrument.clone()).or_default();
        match venues.get_mut(&tick.venue) {
            Some(entry) => {
                if tick.ingest_ms < entry.latest.ingest_ms {
                    tick.ingest_ms = entry.latest.ingest_ms;
                }
                entry.latest = tick.clone();
                entry.history.push_back(tick);
                while entry.history.len() > self.config.history_size {
                    entry.history.pop_front();
                }
            }
            None => {
                let mut history = VecDeque::with_capacity(self.config.history_size.min(16));
                history.push_back(tick.clone());
                venues.insert(tick.venue, PriceEntry { latest: tick, history });
            }
        }
        true
    }

    /// Latest tick for a key.
    pub fn get(&self, instrument: &Instrument, venue: Venue) -> Option<Tick> {
        self.inner
            .read()
            .ok()?
            .get(instrument)?
            .get(&venue)
            .map(|e| e.latest.clone())
    }

    /// Latest tick from every venue that has ever reported the instrument.
    /// May include stale entries; callers apply `is_stale`.
    pub fn prices_for(&self, instrument: &Instrument) -> Vec<Tick> {
        let map = match self.inner.read() {
            Ok(guard) => guard,
            Err(_) => return Vec::new(),
        };
        let Some(venues) = map.get(instrument) else {
            return Vec::new();
        };
        let mut ticks: Vec<Tick> = venues.values().map(|e| e.latest.clone()).collect();
        ticks.sort_by_key(|t| t.venue);
        ticks
    }

    /// A key is stale at `now_ms` when its latest tick is strictly older
    /// than the staleness threshold. Missing keys count as stale.
    pub fn is_stale(&self, instrument: &Instrument, venue: Venue, now_ms: u64) -> bool {
        match self.get(instrument, venue) {
            Some(tick) => {
                now_ms.saturating_sub(tick.ingest_ms) > self.config.stale_after.as_millis() as u64
            }
            None => true,
        }
    }

    /// History ring for a key, oldest first.
    pub fn history(&self, instrument: &Instrument, venue: Venue) -> Vec<Tick> {
        self.inner
            .read()
            .ok()
            .and_then(|map| {
                map.get(instrument)
                    .and_then(|venues| venues.get(&venue))
                    .map(|e| e.history.iter().cloned().collect())
            })
            .unwrap_or_default()
    }

    /// Remove all keys untouched for longer than `drop_after`.
    /// Returns the number of keys removed.
    pub fn sweep(&self, now_ms: u64) -> usize {
        let drop_after_ms = self.config.drop_after.as_millis() as u64;
        let mut removed = 0;
        if let Ok(mut map) = self.inner.write() {
            map.retain(|_, venues| {
                venues.retain(|_, entry| {
                    let keep = now_ms.saturating_sub(entry.latest.ingest_ms) <= drop_after_ms;
                    if !keep {
                        removed += 1;
                    }
                    keep
                });
                !venues.is_empty()
            });
        }
        removed
    }

    /// Total number of (instrument, venue) keys currently stored.
    pub fn key_count(&self) -> usize {
        self.inner
            .read()
            .map(|map| map.values().map(|v| v.len()).sum())
            .unwrap_or(0)
    }
}

impl Default for PriceStore {
    fn default() -> Self {
        Self::new(StoreConfig::default())
    }
}
