//! Core data types for venue adapters
//!
//! These types are used across all venue adapters for consistent
//! tick normalization, catalog representation, and health tracking.

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, AtomicU64};
use std::sync::Arc;
use std::time::Duration;

use crate::core::types::{current_time_ms, Instrument, Venue};

// =============================================================================
// HTTP Client Constants
// =============================================================================

/// Max idle connections per host in the connection pool
const HTTP_POOL_MAX_IDLE: usize = 2;
/// How long idle connections stay in the pool (seconds)
const HTTP_POOL_IDLE_TIMEOUT_SECS: u64 = 60;
/// TCP keepalive interval (seconds)
const HTTP_TCP_KEEPALIVE_SECS: u64 = 30;

/// Create a pooled HTTP client for catalog fetches.
///
/// All request deadlines are bounded by the configured network timeout.
pub fn create_http_client(venue: Venue, timeout: Duration) -> reqwest::Client {
    let client = reqwest::Client::builder()
        .timeout(timeout)
        .pool_max_idle_per_host(HTTP_POOL_MAX_IDLE)
        .pool_idle_timeout(Duration::from_secs(HTTP_POOL_IDLE_TIMEOUT_SECS))
        .tcp_keepalive(Duration::from_secs(HTTP_TCP_KEEPALIVE_SECS))
        .connect_timeout(timeout)
        .user_agent(concat!("spreadwatch/", env!("CARGO_PKG_VERSION")))
        .build()
        .unwrap_or_else(|_| reqwest::Client::new());
    tracing::debug!(
        phase = "init",
        venue = %venue,
        timeout_ms = timeout.as_millis() as u64,
        pool_max_idle = HTTP_POOL_MAX_IDLE,
        "HTTP client configured"
    );
    client
}

/// WebSocket ping / health-check interval (seconds)
pub const WS_PING_INTERVAL_SECS: u64 = 30;

// =============================================================================
// Tick
// =============================================================================

/// Normalized price record emitted by a venue adapter.
///
/// Invariant: `price` is positive and finite — frames violating this are
/// dropped at the adapter boundary and never reach a sink.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tick {
    /// Canonical instrument
    pub instrument: Instrument,
    /// Venue that produced the quote
    pub venue: Venue,
    /// Last traded / ticker price
    pub price: f64,
    /// Wall time at parse, milliseconds since epoch
    pub ingest_ms: u64,
    /// 24h volume, carried opaquely when the venue reports it
    pub volume: Option<f64>,
    /// 24h high
    pub high: Option<f64>,
    /// 24h low
    pub low: Option<f64>,
}

impl Tick {
    /// Build a tick stamped with the current wall time.
    pub fn now(instrument: Instrument, venue: Venue, price: f64) -> Self {
        Self {
            instrument,
            venue,
            price,
            ingest_ms: current_time_ms(),
            volume: None,
            high: None,
            low: None,
        }
    }

    /// True when the price satisfies the boundary invariant.
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.price.is_finite() && self.price > 0.0
    }
}

/// Callback used to deliver parsed ticks into the price store.
///
/// Kept synchronous: `PriceStore::put` is a thread-safe direct call, so the
/// reader loop never awaits while holding a frame.
pub type TickSink = Arc<dyn Fn(Tick) + Send + Sync>;

// =============================================================================
// Catalog
// =============================================================================

/// One instrument from a venue's catalog endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogEntry {
    /// Canonical instrument
    pub instrument: Instrument,
    /// Base asset (upper-case)
    pub base: String,
    /// Quote asset (upper-case)
    pub quote: String,
    /// Whether the venue reports the pair as tradable
    pub tradable: bool,
    /// Price increment, when reported
    pub tick_size: Option<f64>,
    /// Minimum order size, when reported
    pub min_size: Option<f64>,
}

impl CatalogEntry {
    /// Build a tradable entry from base/quote assets.
    pub fn tradable(base: &str, quote: &str) -> Self {
        Self {
            instrument: Instrument::new(base, quote),
            base: base.to_uppercase(),
            quote: quote.to_uppercase(),
            tradable: true,
            tick_size: None,
            min_size: None,
        }
    }
}

// =============================================================================
// Adapter Status
// =============================================================================

/// Read-only adapter status snapshot for the health monitor and the
/// (external) observability surface.
#[derive(Debug, Clone, Serialize)]
pub struct AdapterStatus {
    pub venue: Venue,
    pub connected: bool,
    pub connection_count: usize,
    pub subscribed: Vec<Instrument>,
    pub last_error: Option<String>,
}

// =============================================================================
// Connection Health
// =============================================================================

/// Shared connection health state for a venue's streaming socket.
///
/// Atomic fields shared between the reader loop and the adapter methods.
#[derive(Debug, Default)]
pub struct ConnectionHealth {
    /// Timestamp of last data received (Unix ms) — any message counts
    pub last_data: AtomicU64,
    /// Set to false when the reader loop exits (Close frame or error)
    pub reader_alive: AtomicBool,
    /// Frames dropped for violating the price invariant
    pub invalid_ticks: AtomicU64,
}

impl ConnectionHealth {
    pub fn new() -> Self {
        Self::default()
    }
}
