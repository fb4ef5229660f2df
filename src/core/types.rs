//! Core vocabulary shared across the detection pipeline.
//!
//! The canonical instrument form (`BASE/QUOTE`, upper-case) and the closed
//! venue set are the only identifiers used inside the core; each adapter
//! owns the bijection to its own wire form.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

// =============================================================================
// Venue
// =============================================================================

/// Supported trading venues. Closed set — one adapter per venue.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Venue {
    Binance,
    Bybit,
    Okx,
    Kucoin,
    Gate,
}

impl Venue {
    /// Every venue, in canonical order.
    pub const ALL: [Venue; 5] = [
        Venue::Binance,
        Venue::Bybit,
        Venue::Okx,
        Venue::Kucoin,
        Venue::Gate,
    ];

    /// Stable lowercase identifier used in logs and ids.
    pub fn as_str(&self) -> &'static str {
        match self {
            Venue::Binance => "binance",
            Venue::Bybit => "bybit",
            Venue::Okx => "okx",
            Venue::Kucoin => "kucoin",
            Venue::Gate => "gate",
        }
    }
}

impl fmt::Display for Venue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Venue {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "binance" => Ok(Venue::Binance),
            "bybit" => Ok(Venue::Bybit),
            "okx" => Ok(Venue::Okx),
            "kucoin" => Ok(Venue::Kucoin),
            "gate" => Ok(Venue::Gate),
            other => Err(format!("unknown venue: '{}'", other)),
        }
    }
}

// =============================================================================
// Instrument
// =============================================================================

/// Canonical trading pair identifier: `BASE/QUOTE`, upper-case.
///
/// Uses `Arc<str>` for cheap cloning across store keys, opportunity ids,
/// and subscription registries.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Instrument(Arc<str>);

impl Instrument {
    /// Build from base and quote assets. Both are upper-cased.
    pub fn new(base: &str, quote: &str) -> Self {
        Self(Arc::from(
            format!("{}/{}", base.to_uppercase(), quote.to_uppercase()).as_str(),
        ))
    }

    /// Parse a canonical `BASE/QUOTE` string. Returns `None` when the form
    /// is not exactly two non-empty, slash-separated segments.
    pub fn parse(s: &str) -> Option<Self> {
        let (base, quote) = s.split_once('/')?;
        if base.is_empty() || quote.is_empty() || quote.contains('/') {
            return None;
        }
        Some(Self::new(base, quote))
    }

    pub fn base(&self) -> &str {
        self.0.split_once('/').map(|(b, _)| b).unwrap_or(&self.0)
    }

    pub fn quote(&self) -> &str {
        self.0.split_once('/').map(|(_, q)| q).unwrap_or("")
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Instrument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// =============================================================================
// Utility
// =============================================================================

/// Get current time in milliseconds since epoch.
#[inline]
pub fn current_time_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}
