//! Configuration types for the detector
//!
//! A single immutable `Settings` value is constructed at startup from YAML
//! (plus serde defaults) and handed to components; each component receives
//! only the fields it needs.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::core::types::{Instrument, Venue};
use crate::error::AppError;

// ============================================================================
// Defaults
// ============================================================================

fn default_scan_interval_secs() -> u64 {
    10
}
fn default_open_threshold_pct() -> f64 {
    0.7
}
fn default_close_threshold_pct() -> f64 {
    0.5
}
fn default_alert_cooldown_secs() -> u64 {
    300
}
fn default_min_profit() -> f64 {
    10.0
}
fn default_notional_units() -> f64 {
    1_000.0
}
fn default_min_close_alert_duration_secs() -> u64 {
    120
}
fn default_max_opportunity_age_secs() -> u64 {
    7_200
}
fn default_stale_after_secs() -> u64 {
    60
}
fn default_drop_after_secs() -> u64 {
    300
}
fn default_history_size() -> usize {
    100
}
fn default_min_venues_per_instrument() -> usize {
    2
}
fn default_quote_filter() -> String {
    "USDT".to_string()
}
fn default_enable_fallbacks() -> bool {
    true
}
fn default_fallback_instruments() -> Vec<Instrument> {
    ["BTC/USDT", "ETH/USDT", "SOL/USDT", "XRP/USDT", "BNB/USDT"]
        .iter()
        .filter_map(|s| Instrument::parse(s))
        .collect()
}
fn default_ws_timeout_secs() -> u64 {
    10
}
fn default_reconnect_delay_secs() -> u64 {
    5
}
fn default_failure_cooldown_secs() -> u64 {
    1_800
}
fn default_health_interval_secs() -> u64 {
    300
}
fn default_closed_alerts_enabled() -> bool {
    true
}
fn default_venues() -> Vec<Venue> {
    Venue::ALL.to_vec()
}

// ============================================================================
// Settings
// ============================================================================

/// Root detector configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Opportunity engine scan period (seconds)
    #[serde(default = "default_scan_interval_secs")]
    pub scan_interval_secs: u64,
    /// Minimum spread percentage to open/alert (inclusive)
    #[serde(default = "default_open_threshold_pct")]
    pub open_threshold_pct: f64,
    /// Spread percentage below which an open opportunity closes (exclusive)
    #[serde(default = "default_close_threshold_pct")]
    pub close_threshold_pct: f64,
    /// Minimum gap between repeat alerts for the same opportunity (seconds)
    #[serde(default = "default_alert_cooldown_secs")]
    pub alert_cooldown_secs: u64,
    /// Minimum implied profit at the configured notional
    #[serde(default = "default_min_profit")]
    pub min_profit: f64,
    /// Units used in the implied profit calculation
    #[serde(default = "default_notional_units")]
    pub notional_units: f64,
    /// Opportunities shorter than this do not emit a close alert (seconds)
    #[serde(default = "default_min_close_alert_duration_secs")]
    pub min_close_alert_duration_secs: u64,
    /// Hard cap on opportunity lifetime (seconds)
    #[serde(default = "default_max_opportunity_age_secs")]
    pub max_opportunity_age_secs: u64,
    /// Tick staleness threshold (seconds)
    #[serde(default = "default_stale_after_secs")]
    pub stale_after_secs: u64,
    /// Price store GC threshold (seconds)
    #[serde(default = "default_drop_after_secs")]
    pub drop_after_secs: u64,
    /// Ticks retained per (instrument, venue) key
    #[serde(default = "default_history_size")]
    pub history_size: usize,
    /// Intersection cutoff for the active set
    #[serde(default = "default_min_venues_per_instrument")]
    pub min_venues_per_instrument: usize,
    /// Quote asset used for catalog intersection
    #[serde(default = "default_quote_filter")]
    pub quote_filter: String,
    /// On catalog fetch failure, fall back to the static list
    #[serde(default = "default_enable_fallbacks")]
    pub enable_fallbacks: bool,
    /// Static instrument list used when fallbacks are enabled
    #[serde(default = "default_fallback_instruments")]
    pub fallback_instruments: Vec<Instrument>,
    /// Hard network timeout (seconds)
    #[serde(default = "default_ws_timeout_secs")]
    pub ws_timeout_secs: u64,
    /// Base reconnect delay (seconds)
    #[serde(default = "default_reconnect_delay_secs")]
    pub reconnect_delay_secs: u64,
    /// Deduplication window for failure notifications (seconds)
    #[serde(default = "default_failure_cooldown_secs")]
    pub failure_cooldown_secs: u64,
    /// Liveness probe period (seconds)
    #[serde(default = "default_health_interval_secs")]
    pub health_interval_secs: u64,
    /// Whether CLOSE events are emitted at all
    #[serde(default = "default_closed_alerts_enabled")]
    pub closed_alerts_enabled: bool,
    /// Venues to run adapters for
    #[serde(default = "default_venues")]
    pub venues: Vec<Venue>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            scan_interval_secs: default_scan_interval_secs(),
            open_threshold_pct: default_open_threshold_pct(),
            close_threshold_pct: default_close_threshold_pct(),
            alert_cooldown_secs: default_alert_cooldown_secs(),
            min_profit: default_min_profit(),
            notional_units: default_notional_units(),
            min_close_alert_duration_secs: default_min_close_alert_duration_secs(),
            max_opportunity_age_secs: default_max_opportunity_age_secs(),
            stale_after_secs: default_stale_after_secs(),
            drop_after_secs: default_drop_after_secs(),
            history_size: default_history_size(),
            min_venues_per_instrument: default_min_venues_per_instrument(),
            quote_filter: default_quote_filter(),
            enable_fallbacks: default_enable_fallbacks(),
            fallback_instruments: default_fallback_instruments(),
            ws_timeout_secs: default_ws_timeout_secs(),
            reconnect_delay_secs: default_reconnect_delay_secs(),
            failure_cooldown_secs: default_failure_cooldown_secs(),
            health_interval_secs: default_health_interval_secs(),
            closed_alerts_enabled: default_closed_alerts_enabled(),
            venues: default_venues(),
        }
    }
}

impl Settings {
    pub fn scan_interval(&self) -> Duration {
        Duration::from_secs(self.scan_interval_secs)
    }

    pub fn alert_cooldown(&self) -> Duration {
        Duration::from_secs(self.alert_cooldown_secs)
    }

    pub fn min_close_alert_duration(&self) -> Duration {
        Duration::from_secs(self.min_close_alert_duration_secs)
    }

    pub fn max_opportunity_age(&self) -> Duration {
        Duration::from_secs(self.max_opportunity_age_secs)
    }

    pub fn stale_after(&self) -> Duration {
        Duration::from_secs(self.stale_after_secs)
    }

    pub fn drop_after(&self) -> Duration {
        Duration::from_secs(self.drop_after_secs)
    }

    pub fn ws_timeout(&self) -> Duration {
        Duration::from_secs(self.ws_timeout_secs)
    }

    pub fn reconnect_delay(&self) -> Duration {
        Duration::from_secs(self.reconnect_delay_secs)
    }

    pub fn failure_cooldown(&self) -> Duration {
        Duration::from_secs(self.failure_cooldown_secs)
    }

    pub fn health_interval(&self) -> Duration {
        Duration::from_secs(self.health_interval_secs)
    }

    /// Validate all configuration rules. Nonsensical thresholds are
    /// rejected at startup rather than surfacing as NaN spreads later.
    pub fn validate(&self) -> Result<(), AppError> {
        if !self.open_threshold_pct.is_finite() || self.open_threshold_pct <= 0.0 {
            return Err(AppError::Config(format!(
                "open_threshold_pct must be a positive finite number (got {})",
                self.open_threshold_pct
            )));
        }
        if !self.close_threshold_pct.is_finite() || self.close_threshold_pct < 0.0 {
            return Err(AppError::Config(format!(
                "close_threshold_pct must be a non-negative finite number (got {})",
                self.close_threshold_pct
            )));
        }
        if !self.min_profit.is_finite() || self.min_profit < 0.0 {
            return Err(AppError::Config(format!(
                "min_profit must be a non-negative finite number (got {})",
                self.min_profit
            )));
        }
        if !self.notional_units.is_finite() || self.notional_units <= 0.0 {
            return Err(AppError::Config(format!(
                "notional_units must be a positive finite number (got {})",
                self.notional_units
            )));
        }
        if self.scan_interval_secs == 0 {
            return Err(AppError::Config(
                "scan_interval_secs must be at least 1".to_string(),
            ));
        }
        if self.history_size == 0 {
            return Err(AppError::Config(
                "history_size must be at least 1".to_string(),
            ));
        }
        if self.min_venues_per_instrument < 2 {
            return Err(AppError::Config(format!(
                "min_venues_per_instrument must be at least 2 (got {})",
                self.min_venues_per_instrument
            )));
        }
        if self.quote_filter.trim().is_empty() {
            return Err(AppError::Config("quote_filter cannot be empty".to_string()));
        }
        if self.venues.is_empty() {
            return Err(AppError::Config(
                "at least one venue must be configured".to_string(),
            ));
        }
        let mut seen = std::collections::HashSet::new();
        for v in &self.venues {
            if !seen.insert(*v) {
                return Err(AppError::Config(format!("duplicate venue: {}", v)));
            }
        }
        if self.close_threshold_pct >= self.open_threshold_pct {
            tracing::warn!(
                open = self.open_threshold_pct,
                close = self.close_threshold_pct,
                "close_threshold_pct >= open_threshold_pct: hysteresis band is inverted"
            );
        }
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_documented_values() {
        let s = Settings::default();
        assert_eq!(s.scan_interval_secs, 10);
        assert_eq!(s.open_threshold_pct, 0.7);
        assert_eq!(s.close_threshold_pct, 0.5);
        assert_eq!(s.alert_cooldown_secs, 300);
        assert_eq!(s.min_profit, 10.0);
        assert_eq!(s.notional_units, 1_000.0);
        assert_eq!(s.min_close_alert_duration_secs, 120);
        assert_eq!(s.max_opportunity_age_secs, 7_200);
        assert_eq!(s.stale_after_secs, 60);
        assert_eq!(s.drop_after_secs, 300);
        assert_eq!(s.history_size, 100);
        assert_eq!(s.min_venues_per_instrument, 2);
        assert_eq!(s.quote_filter, "USDT");
        assert_eq!(s.ws_timeout_secs, 10);
        assert_eq!(s.reconnect_delay_secs, 5);
        assert_eq!(s.failure_cooldown_secs, 1_800);
        assert_eq!(s.health_interval_secs, 300);
        assert!(s.closed_alerts_enabled);
        assert_eq!(s.venues.len(), 5);
    }

    #[test]
    fn test_default_settings_validate() {
        assert!(Settings::default().validate().is_ok());
    }

    #[test]
    fn test_nan_open_threshold_fails() {
        let mut s = Settings::default();
        s.open_threshold_pct = f64::NAN;
        assert!(s.validate().is_err());
    }

    #[test]
    fn test_negative_open_threshold_fails() {
        let mut s = Settings::default();
        s.open_threshold_pct = -0.5;
        assert!(s.validate().is_err());
    }

    #[test]
    fn test_infinite_min_profit_fails() {
        let mut s = Settings::default();
        s.min_profit = f64::INFINITY;
        assert!(s.validate().is_err());
    }

    #[test]
    fn test_zero_notional_fails() {
        let mut s = Settings::default();
        s.notional_units = 0.0;
        assert!(s.validate().is_err());
    }

    #[test]
    fn test_zero_scan_interval_fails() {
        let mut s = Settings::default();
        s.scan_interval_secs = 0;
        assert!(s.validate().is_err());
    }

    #[test]
    fn test_min_venues_below_two_fails() {
        let mut s = Settings::default();
        s.min_venues_per_instrument = 1;
        assert!(s.validate().is_err());
    }

    #[test]
    fn test_empty_quote_filter_fails() {
        let mut s = Settings::default();
        s.quote_filter = "  ".to_string();
        assert!(s.validate().is_err());
    }

    #[test]
    fn test_duplicate_venue_fails() {
        let mut s = Settings::default();
        s.venues = vec![Venue::Binance, Venue::Binance];
        let err = s.validate().unwrap_err().to_string();
        assert!(err.contains("duplicate venue"), "got: {}", err);
    }

    #[test]
    fn test_no_venues_fails() {
        let mut s = Settings::default();
        s.venues.clear();
        assert!(s.validate().is_err());
    }

    #[test]
    fn test_inverted_hysteresis_is_allowed_with_warning() {
        let mut s = Settings::default();
        s.close_threshold_pct = 0.9;
        assert!(s.validate().is_ok());
    }

    #[test]
    fn test_yaml_overrides() {
        let yaml = r#"
open_threshold_pct: 1.2
close_threshold_pct: 0.8
quote_filter: USDC
venues: [binance, okx]
"#;
        let s: Settings = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(s.open_threshold_pct, 1.2);
        assert_eq!(s.quote_filter, "USDC");
        assert_eq!(s.venues, vec![Venue::Binance, Venue::Okx]);
        // Unspecified fields keep their defaults
        assert_eq!(s.scan_interval_secs, 10);
    }

    #[test]
    fn test_fallback_instruments_are_canonical() {
        let s = Settings::default();
        assert!(s
            .fallback_instruments
            .iter()
            .any(|i| i.as_str() == "BTC/USDT"));
    }

    #[test]
    fn test_duration_accessors() {
        let s = Settings::default();
        assert_eq!(s.scan_interval(), Duration::from_secs(10));
        assert_eq!(s.alert_cooldown(), Duration::from_secs(300));
        assert_eq!(s.stale_after(), Duration::from_secs(60));
        assert_eq!(s.max_opportunity_age(), Duration::from_secs(7_200));
    }
}
