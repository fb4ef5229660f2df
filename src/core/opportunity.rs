//! Opportunity lifecycle types
//!
//! An opportunity is identified by `(instrument, {venue_a, venue_b})` with
//! the venue pair unordered: both orders collapse to the same id. Active
//! opportunities are owned exclusively by the engine; closed records are
//! immutable history.

use serde::Serialize;
use std::fmt;

use crate::core::spread::SpreadQuote;
use crate::core::types::{Instrument, Venue};

// =============================================================================
// OpportunityId
// =============================================================================

/// Identity of a spread opportunity. The constructor sorts the venue pair
/// so `(i, a, b)` and `(i, b, a)` produce equal ids.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct OpportunityId {
    pub instrument: Instrument,
    pub venue_a: Venue,
    pub venue_b: Venue,
}

impl OpportunityId {
    pub fn new(instrument: Instrument, v1: Venue, v2: Venue) -> Self {
        let (venue_a, venue_b) = if v1 <= v2 { (v1, v2) } else { (v2, v1) };
        Self {
            instrument,
            venue_a,
            venue_b,
        }
    }
}

impl fmt::Display for OpportunityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}-{}", self.instrument, self.venue_a, self.venue_b)
    }
}

// =============================================================================
// Close Reasons
// =============================================================================

/// Why an opportunity left the active set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CloseReason {
    BelowThreshold,
    PriceConverged,
    Timeout,
    Manual,
}

impl fmt::Display for CloseReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CloseReason::BelowThreshold => write!(f, "BELOW_THRESHOLD"),
            CloseReason::PriceConverged => write!(f, "PRICE_CONVERGED"),
            CloseReason::Timeout => write!(f, "TIMEOUT"),
            CloseReason::Manual => write!(f, "MANUAL"),
        }
    }
}

// =============================================================================
// ActiveOpportunity
// =============================================================================

/// State carried between engine scans while an opportunity is open.
#[derive(Debug, Clone, Serialize)]
pub struct ActiveOpportunity {
    pub id: OpportunityId,
    pub open_ms: u64,
    pub last_seen_ms: u64,
    /// Snapshot as of first open
    pub opening: SpreadQuote,
    /// Most recent qualifying quote
    pub current: SpreadQuote,
    pub peak_spread_pct: f64,
    pub peak_profit: f64,
    pub peak_ms: u64,
    /// Number of alerts emitted for this id, starting at 1 on open
    pub alerts_sent: u32,
}

impl ActiveOpportunity {
    /// Open a new opportunity; peak is initialized to the current quote.
    pub fn open(id: OpportunityId, quote: SpreadQuote, now_ms: u64) -> Self {
        Self {
            id,
            open_ms: now_ms,
            last_seen_ms: now_ms,
            opening: quote,
            current: quote,
            peak_spread_pct: quote.spread_pct,
            peak_profit: quote.implied_profit,
            peak_ms: now_ms,
            alerts_sent: 1,
        }
    }

    /// Update current fields; advance the peak triple when the spread
    /// exceeds the previous peak.
    pub fn update(&mut self, quote: SpreadQuote, now_ms: u64) {
        self.current = quote;
        self.last_seen_ms = now_ms;
        if quote.spread_pct > self.peak_spread_pct {
            self.peak_spread_pct = quote.spread_pct;
            self.peak_profit = quote.implied_profit;
            self.peak_ms = now_ms;
        }
    }

    /// Consume into an immutable closed record.
    pub fn close(self, closing: SpreadQuote, reason: CloseReason, now_ms: u64) -> ClosedOpportunity {
        ClosedOpportunity {
            id: self.id,
            opening: self.opening,
            closing,
            open_ms: self.open_ms,
            close_ms: now_ms,
            duration_ms: now_ms.saturating_sub(self.open_ms),
            peak_spread_pct: self.peak_spread_pct,
            peak_profit: self.peak_profit,
            peak_ms: self.peak_ms,
            close_reason: reason,
            alerts_sent: self.alerts_sent,
        }
    }
}

// =============================================================================
// ClosedOpportunity
// =============================================================================

/// Immutable history record produced on close.
#[derive(Debug, Clone, Serialize)]
pub struct ClosedOpportunity {
    pub id: OpportunityId,
    pub opening: SpreadQuote,
    pub closing: SpreadQuote,
    pub open_ms: u64,
    pub close_ms: u64,
    pub duration_ms: u64,
    pub peak_spread_pct: f64,
    pub peak_profit: f64,
    pub peak_ms: u64,
    pub close_reason: CloseReason,
    pub alerts_sent: u32,
}

// =============================================================================
// AlertEvent
// =============================================================================

/// Detection result consumed by the external alert sink.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", content = "data")]
pub enum AlertEvent {
    #[serde(rename = "open_or_update")]
    OpenOrUpdate(ActiveOpportunity),
    #[serde(rename = "close")]
    Close(ClosedOpportunity),
}

impl AlertEvent {
    /// Delivery priority: `floor(spread_pct × 10)`, computed from the
    /// current spread for open/update events and the peak for closes.
    pub fn priority(&self) -> u32 {
        let pct = match self {
            AlertEvent::OpenOrUpdate(o) => o.current.spread_pct,
            AlertEvent::Close(c) => c.peak_spread_pct,
        };
        (pct * 10.0).floor().max(0.0) as u32
    }

    pub fn id(&self) -> &OpportunityId {
        match self {
            AlertEvent::OpenOrUpdate(o) => &o.id,
            AlertEvent::Close(c) => &c.id,
        }
    }
}
