//! Opportunity engine — periodic pairwise scan with an open/close lifecycle
//!
//! Every scan runs `check_closes` then `find_opens` against the price
//! store. Active opportunities, the re-alert cooldown map, and the bounded
//! closed history are owned exclusively by the engine; nothing outside a
//! scan mutates them.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::config::Settings;
use crate::core::catalog::ActiveSet;
use crate::core::opportunity::{
    ActiveOpportunity, AlertEvent, ClosedOpportunity, CloseReason, OpportunityId,
};
use crate::core::sink::AlertSink;
use crate::core::spread::SpreadQuote;
use crate::core::store::PriceStore;
use crate::core::types::current_time_ms;

/// Retry budget handed to the sink with every event.
const ALERT_RETRY_BUDGET: u32 = 3;

/// Below this spread percentage the two quotes are considered converged.
const CONVERGENCE_FLOOR_PCT: f64 = 0.1;

/// Closed records retained in memory.
const CLOSED_HISTORY_CAP: usize = 1_000;

// =============================================================================
// Configuration
// =============================================================================

#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub scan_interval: Duration,
    /// Minimum spread percentage to open (inclusive)
    pub open_threshold_pct: f64,
    /// Spread percentage below which an open opportunity closes (exclusive)
    pub close_threshold_pct: f64,
    pub alert_cooldown: Duration,
    pub min_profit: f64,
    pub notional_units: f64,
    pub min_close_alert_duration: Duration,
    pub max_opportunity_age: Duration,
    pub closed_alerts_enabled: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            scan_interval: Duration::from_secs(10),
            open_threshold_pct: 0.7,
            close_threshold_pct: 0.5,
            alert_cooldown: Duration::from_secs(300),
            min_profit: 10.0,
            notional_units: 1_000.0,
            min_close_alert_duration: Duration::from_secs(120),
            max_opportunity_age: Duration::from_secs(7_200),
            closed_alerts_enabled: true,
        }
    }
}

impl From<&Settings> for EngineConfig {
    fn from(s: &Settings) -> Self {
        Self {
            scan_interval: s.scan_interval(),
            open_threshold_pct: s.open_threshold_pct,
            close_threshold_pct: s.close_threshold_pct,
            alert_cooldown: s.alert_cooldown(),
            min_profit: s.min_profit,
            notional_units: s.notional_units,
            min_close_alert_duration: s.min_close_alert_duration(),
            max_opportunity_age: s.max_opportunity_age(),
            closed_alerts_enabled: s.closed_alerts_enabled,
        }
    }
}

// =============================================================================
// Engine
// =============================================================================

enum Verdict {
    /// Keep open, apply the fresh quote
    Update(SpreadQuote),
    /// Close with the recomputed quote as the closing snapshot
    Close(CloseReason, Option<SpreadQuote>),
}

pub struct OpportunityEngine {
    config: EngineConfig,
    store: Arc<PriceStore>,
    active_source: Arc<dyn ActiveSet>,
    sink: Arc<dyn AlertSink>,
    active: HashMap<OpportunityId, ActiveOpportunity>,
    /// id → last alert timestamp (ms)
    cooldowns: HashMap<OpportunityId, u64>,
    closed: VecDeque<ClosedOpportunity>,
}

impl OpportunityEngine {
    pub fn new(
        config: EngineConfig,
        store: Arc<PriceStore>,
        active_source: Arc<dyn ActiveSet>,
        sink: Arc<dyn AlertSink>,
    ) -> Self {
        Self {
            config,
            store,
            active_source,
            sink,
            active: HashMap::new(),
            cooldowns: HashMap::new(),
            closed: VecDeque::new(),
        }
    }

    /// Scan loop: one scan per interval tick, late scans coalesced, no
    /// overlap. The shutdown signal stops scheduling; the in-flight scan
    /// completes first.
    pub async fn run(mut self, mut shutdown: broadcast::Receiver<()>) {
        let mut interval = tokio::time::interval(self.config.scan_interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        info!(
            interval_s = self.config.scan_interval.as_secs(),
            open_pct = self.config.open_threshold_pct,
            close_pct = self.config.close_threshold_pct,
            "Opportunity engine started"
        );
        loop {
            tokio::select! {
                _ = shutdown.recv() => {
                    info!(
                        active = self.active.len(),
                        "Opportunity engine shutting down"
                    );
                    break;
                }
                _ = interval.tick() => {
                    let now = current_time_ms();
                    self.scan(now).await;
                }
            }
        }
    }

    /// One atomic scan: close pass first, then the open pass, then store GC.
    pub async fn scan(&mut self, now_ms: u64) {
        self.check_closes(now_ms).await;
        self.find_opens(now_ms).await;
        let dropped = self.store.sweep(now_ms);
        if dropped > 0 {
            debug!(dropped, "Price store swept");
        }
    }

    // =========================================================================
    // Close pass
    // =========================================================================

    async fn check_closes(&mut self, now_ms: u64) {
        let ids: Vec<OpportunityId> = self.active.keys().cloned().collect();
        for id in ids {
            let Some(open_ms) = self.active.get(&id).map(|o| o.open_ms) else {
                continue;
            };
            let verdict = self.judge(&id, open_ms, now_ms);
            match verdict {
                Verdict::Update(quote) => {
                    if let Some(o) = self.active.get_mut(&id) {
                        o.update(quote, now_ms);
                    }
                }
                Verdict::Close(reason, closing) => {
                    let Some(o) = self.active.remove(&id) else {
                        continue;
                    };
                    self.cooldowns.remove(&id);
                    let closing = closing.unwrap_or(o.current);
                    let closed = o.close(closing, reason, now_ms);
                    info!(
                        event_type = "OPPORTUNITY_CLOSED",
                        id = %closed.id,
                        reason = %closed.close_reason,
                        duration_s = closed.duration_ms / 1_000,
                        peak_pct = closed.peak_spread_pct,
                        alerts_sent = closed.alerts_sent,
                        "Opportunity closed"
                    );
                    self.emit_close(&closed).await;
                    self.push_closed(closed);
                }
            }
        }
    }

    /// Close-condition precedence: unavailable/stale data first (preserved
    /// source behavior: counts as convergence), then the convergence floor,
    /// then below-threshold for the [floor, close) band, then age.
    fn judge(&self, id: &OpportunityId, open_ms: u64, now_ms: u64) -> Verdict {
        let tick_a = self.store.get(&id.instrument, id.venue_a);
        let tick_b = self.store.get(&id.instrument, id.venue_b);
        let stale_a = self.store.is_stale(&id.instrument, id.venue_a, now_ms);
        let stale_b = self.store.is_stale(&id.instrument, id.venue_b, now_ms);

        let (Some(tick_a), Some(tick_b)) = (tick_a, tick_b) else {
            debug!(id = %id, stale = true, "Closing: price missing");
            return Verdict::Close(CloseReason::PriceConverged, None);
        };
        if stale_a || stale_b {
            debug!(id = %id, stale = true, "Closing: price stale");
            return Verdict::Close(CloseReason::PriceConverged, None);
        }

        let Some(quote) =
            SpreadQuote::compute(tick_a.price, tick_b.price, self.config.notional_units)
        else {
            debug!(id = %id, stale = true, "Closing: quote not computable");
            return Verdict::Close(CloseReason::PriceConverged, None);
        };

        if quote.spread_pct < CONVERGENCE_FLOOR_PCT {
            return Verdict::Close(CloseReason::PriceConverged, Some(quote));
        }
        if quote.spread_pct < self.config.close_threshold_pct {
            return Verdict::Close(CloseReason::BelowThreshold, Some(quote));
        }
        if now_ms.saturating_sub(open_ms) > self.config.max_opportunity_age.as_millis() as u64 {
            return Verdict::Close(CloseReason::Timeout, Some(quote));
        }
        Verdict::Update(quote)
    }

    // =========================================================================
    // Open pass
    // =========================================================================

    async fn find_opens(&mut self, now_ms: u64) {
        let cooldown_ms = self.config.alert_cooldown.as_millis() as u64;

        for instrument in self.active_source.active_set() {
            let fresh: Vec<_> = self
                .store
                .prices_for(&instrument)
                .into_iter()
                .filter(|t| !self.store.is_stale(&instrument, t.venue, now_ms))
                .collect();
            if fresh.len() < 2 {
                continue;
            }

            for i in 0..fresh.len() {
                for j in (i + 1)..fresh.len() {
                    let id =
                        OpportunityId::new(instrument.clone(), fresh[i].venue, fresh[j].venue);
                    // Orient the pair to the sorted id
                    let (tick_a, tick_b) = if fresh[i].venue == id.venue_a {
                        (&fresh[i], &fresh[j])
                    } else {
                        (&fresh[j], &fresh[i])
                    };

                    let Some(quote) = SpreadQuote::compute(
                        tick_a.price,
                        tick_b.price,
                        self.config.notional_units,
                    ) else {
                        continue;
                    };
                    if quote.spread_pct < self.config.open_threshold_pct
                        || quote.implied_profit < self.config.min_profit
                    {
                        continue;
                    }

                    if self.active.contains_key(&id) {
                        self.refresh_open(&id, quote, now_ms, cooldown_ms).await;
                    } else {
                        self.open(id, quote, now_ms).await;
                    }
                }
            }
        }
    }

    async fn open(&mut self, id: OpportunityId, quote: SpreadQuote, now_ms: u64) {
        let opportunity = ActiveOpportunity::open(id.clone(), quote, now_ms);
        info!(
            event_type = "OPPORTUNITY_OPENED",
            id = %id,
            spread_pct = quote.spread_pct,
            direction = %quote.direction,
            implied_profit = quote.implied_profit,
            "Opportunity opened"
        );
        let event = AlertEvent::OpenOrUpdate(opportunity.clone());
        let priority = event.priority();
        if let Err(e) = self.sink.enqueue(event, priority, ALERT_RETRY_BUDGET).await {
            warn!(id = %id, error = %e, "Open alert dropped");
        }
        self.cooldowns.insert(id.clone(), now_ms);
        self.active.insert(id, opportunity);
    }

    async fn refresh_open(
        &mut self,
        id: &OpportunityId,
        quote: SpreadQuote,
        now_ms: u64,
        cooldown_ms: u64,
    ) {
        let Some(opportunity) = self.active.get_mut(id) else {
            return;
        };
        opportunity.update(quote, now_ms);

        let last_alert = self.cooldowns.get(id).copied().unwrap_or(0);
        if now_ms.saturating_sub(last_alert) < cooldown_ms {
            // Cooldown: state (incl. peak) advanced, outbound alert suppressed
            return;
        }

        let mut snapshot = opportunity.clone();
        snapshot.alerts_sent += 1;
        let event = AlertEvent::OpenOrUpdate(snapshot);
        let priority = event.priority();
        match self.sink.enqueue(event, priority, ALERT_RETRY_BUDGET).await {
            Ok(()) => {
                if let Some(o) = self.active.get_mut(id) {
                    o.alerts_sent += 1;
                    debug!(
                        event_type = "OPPORTUNITY_UPDATED",
                        id = %id,
                        spread_pct = quote.spread_pct,
                        alerts_sent = o.alerts_sent,
                        "Re-alerted after cooldown"
                    );
                }
                self.cooldowns.insert(id.clone(), now_ms);
            }
            Err(e) => {
                // Cooldown untouched: the re-alert is retried next scan
                warn!(id = %id, error = %e, "Update alert dropped");
            }
        }
    }

    // =========================================================================
    // Close delivery + history
    // =========================================================================

    async fn emit_close(&self, closed: &ClosedOpportunity) {
        if !self.config.closed_alerts_enabled {
            return;
        }
        if closed.duration_ms < self.config.min_close_alert_duration.as_millis() as u64 {
            debug!(id = %closed.id, duration_ms = closed.duration_ms, "Close alert skipped: too short");
            return;
        }
        let event = AlertEvent::Close(closed.clone());
        let priority = event.priority();
        if let Err(e) = self.sink.enqueue(event, priority, ALERT_RETRY_BUDGET).await {
            warn!(id = %closed.id, error = %e, "Close alert dropped");
        }
    }

    fn push_closed(&mut self, closed: ClosedOpportunity) {
        self.closed.push_back(closed);
        while self.closed.len() > CLOSED_HISTORY_CAP {
            self.closed.pop_front();
        }
    }

    // =========================================================================
    // Operator surface
    // =========================================================================

    /// Close one opportunity by operator command.
    pub async fn close_manual(
        &mut self,
        id: &OpportunityId,
        now_ms: u64,
    ) -> Option<ClosedOpportunity> {
        let opportunity = self.active.remove(id)?;
        self.cooldowns.remove(id);
        let closing = opportunity.current;
        let closed = opportunity.close(closing, CloseReason::Manual, now_ms);
        info!(
            event_type = "OPPORTUNITY_CLOSED",
            id = %closed.id,
            reason = %closed.close_reason,
            "Opportunity closed manually"
        );
        self.emit_close(&closed).await;
        self.push_closed(closed.clone());
        Some(closed)
    }

    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    pub fn active_snapshot(&self) -> Vec<ActiveOpportunity> {
        self.active.values().cloned().collect()
    }

    pub fn closed_history(&self) -> Vec<ClosedOpportunity> {
        self.closed.iter().cloned().collect()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::types::Tick;
    use crate::core::sink::{ChannelSink, QueuedAlert};
    use crate::core::store::StoreConfig;
    use crate::core::types::{Instrument, Venue};
    use tokio::sync::mpsc;

    struct StaticSet(Vec<Instrument>);

    impl ActiveSet for StaticSet {
        fn active_set(&self) -> Vec<Instrument> {
            self.0.clone()
        }
    }

    fn btc() -> Instrument {
        Instrument::new("BTC", "USDT")
    }

    fn feed(store: &PriceStore, venue: Venue, price: f64, ingest_ms: u64) {
        store.put(Tick {
            instrument: btc(),
            venue,
            price,
            ingest_ms,
            volume: None,
            high: None,
            low: None,
        });
    }

    fn engine_with(
        config: EngineConfig,
    ) -> (OpportunityEngine, Arc<PriceStore>, mpsc::Receiver<QueuedAlert>) {
        let store = Arc::new(PriceStore::new(StoreConfig::default()));
        let (sink, rx) = ChannelSink::new(64);
        let engine = OpportunityEngine::new(
            config,
            Arc::clone(&store),
            Arc::new(StaticSet(vec![btc()])),
            Arc::new(sink),
        );
        (engine, store, rx)
    }

    fn drain(rx: &mut mpsc::Receiver<QueuedAlert>) -> Vec<QueuedAlert> {
        let mut out = Vec::new();
        while let Ok(alert) = rx.try_recv() {
            out.push(alert);
        }
        out
    }

    #[tokio::test]
    async fn test_exactly_open_threshold_opens() {
        // Pin the threshold to the exact spread the pair produces, so the
        // test exercises `>=` (not `>`) without float round-trip surprises.
        let (a, b) = (100.0f64, 101.0f64);
        let exact_pct = 100.0 * (a - b).abs() / ((a + b) / 2.0);
        let config = EngineConfig {
            open_threshold_pct: exact_pct,
            ..Default::default()
        };
        let (mut engine, store, mut rx) = engine_with(config);
        feed(&store, Venue::Binance, a, 1_000);
        feed(&store, Venue::Okx, b, 1_000);

        engine.scan(2_000).await;
        assert_eq!(engine.active_count(), 1);
        let alerts = drain(&mut rx);
        assert_eq!(alerts.len(), 1);
        match &alerts[0].event {
            AlertEvent::OpenOrUpdate(o) => {
                assert_eq!(o.current.spread_pct, exact_pct);
                assert_eq!(o.alerts_sent, 1);
            }
            other => panic!("expected open, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_below_open_threshold_does_not_open() {
        let (mut engine, store, mut rx) = engine_with(EngineConfig::default());
        feed(&store, Venue::Binance, 100.0, 1_000);
        feed(&store, Venue::Okx, 100.5, 1_000); // ~0.499%

        engine.scan(2_000).await;
        assert_eq!(engine.active_count(), 0);
        assert!(drain(&mut rx).is_empty());
    }

    #[tokio::test]
    async fn test_min_profit_gates_open() {
        let config = EngineConfig {
            min_profit: 10.0,
            notional_units: 1_000.0,
            ..Default::default()
        };
        let (mut engine, store, mut rx) = engine_with(config);
        // 1% spread on a tiny price: abs = 0.0005, profit = 0.5 < 10
        feed(&store, Venue::Binance, 0.05, 1_000);
        feed(&store, Venue::Okx, 0.0505, 1_000);

        engine.scan(2_000).await;
        assert_eq!(engine.active_count(), 0);
        assert!(drain(&mut rx).is_empty());
    }

    #[tokio::test]
    async fn test_cooldown_suppresses_but_updates() {
        let (mut engine, store, mut rx) = engine_with(EngineConfig::default());
        feed(&store, Venue::Binance, 100.0, 0);
        feed(&store, Venue::Okx, 101.0, 0);
        engine.scan(1_000).await;
        assert_eq!(drain(&mut rx).len(), 1);

        // Wider spread inside the cooldown: peak advances, no alert
        feed(&store, Venue::Binance, 100.0, 10_000);
        feed(&store, Venue::Okx, 101.5, 10_000);
        engine.scan(11_000).await;
        assert!(drain(&mut rx).is_empty());
        let o = engine.active_snapshot().pop().unwrap();
        assert!(o.peak_spread_pct > 1.0);
        assert_eq!(o.alerts_sent, 1);

        // Past the cooldown: exactly one re-alert with alerts_sent = 2
        feed(&store, Venue::Binance, 100.0, 301_500);
        feed(&store, Venue::Okx, 101.0, 301_500);
        engine.scan(302_000).await;
        let alerts = drain(&mut rx);
        assert_eq!(alerts.len(), 1);
        match &alerts[0].event {
            AlertEvent::OpenOrUpdate(o) => assert_eq!(o.alerts_sent, 2),
            other => panic!("expected update, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_exactly_close_threshold_stays_open() {
        // Pin the close threshold to the exact spread the narrowed pair
        // produces: `<` is exclusive, so equality keeps the opportunity open.
        let (a, b) = (100.0f64, 100.4f64);
        let exact_pct = 100.0 * (a - b).abs() / ((a + b) / 2.0);
        let config = EngineConfig {
            close_threshold_pct: exact_pct,
            ..Default::default()
        };
        let (mut engine, store, mut rx) = engine_with(config);
        feed(&store, Venue::Binance, 100.0, 0);
        feed(&store, Venue::Okx, 101.0, 0);
        engine.scan(1_000).await;
        assert_eq!(engine.active_count(), 1);
        drain(&mut rx);

        feed(&store, Venue::Binance, a, 10_000);
        feed(&store, Venue::Okx, b, 10_000);
        engine.scan(11_000).await;
        assert_eq!(engine.active_count(), 1);
    }

    #[tokio::test]
    async fn test_below_threshold_close() {
        let (mut engine, store, mut rx) = engine_with(EngineConfig::default());
        feed(&store, Venue::Binance, 100.0, 0);
        feed(&store, Venue::Okx, 101.0, 0);
        engine.scan(1_000).await;
        drain(&mut rx);

        // ~0.399%: in [0.1, 0.5) → BELOW_THRESHOLD
        feed(&store, Venue::Binance, 100.0, 200_000);
        feed(&store, Venue::Okx, 100.40, 200_000);
        engine.scan(201_000).await;
        assert_eq!(engine.active_count(), 0);
        let history = engine.closed_history();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].close_reason, CloseReason::BelowThreshold);
    }

    #[tokio::test]
    async fn test_convergence_close_and_close_alert() {
        let (mut engine, store, mut rx) = engine_with(EngineConfig::default());
        feed(&store, Venue::Binance, 100.0, 0);
        feed(&store, Venue::Okx, 101.0, 0);
        engine.scan(1_000).await;
        drain(&mut rx);

        // ~0.05% < 0.1% → PRICE_CONVERGED; duration 2 min ⇒ CLOSE emitted
        feed(&store, Venue::Binance, 100.0, 121_000);
        feed(&store, Venue::Okx, 100.05, 121_000);
        engine.scan(121_000).await;

        let history = engine.closed_history();
        assert_eq!(history[0].close_reason, CloseReason::PriceConverged);
        // Peak in the closed record is the opening ~0.995%
        assert!((history[0].peak_spread_pct - 0.995_024_875).abs() < 1e-6);

        let alerts = drain(&mut rx);
        assert_eq!(alerts.len(), 1);
        assert!(matches!(alerts[0].event, AlertEvent::Close(_)));
    }

    #[tokio::test]
    async fn test_short_lived_close_emits_no_alert() {
        let (mut engine, store, mut rx) = engine_with(EngineConfig::default());
        feed(&store, Venue::Binance, 100.0, 0);
        feed(&store, Venue::Okx, 101.0, 0);
        engine.scan(1_000).await;
        drain(&mut rx);

        // Converges 30 s after open: duration < 2 min → no CLOSE event
        feed(&store, Venue::Binance, 100.0, 31_000);
        feed(&store, Venue::Okx, 100.01, 31_000);
        engine.scan(31_000).await;

        assert_eq!(engine.closed_history().len(), 1);
        assert!(drain(&mut rx).is_empty());
    }

    #[tokio::test]
    async fn test_stale_price_closes_as_converged() {
        let (mut engine, store, mut rx) = engine_with(EngineConfig::default());
        feed(&store, Venue::Binance, 100.0, 0);
        feed(&store, Venue::Okx, 101.0, 0);
        engine.scan(1_000).await;
        drain(&mut rx);

        // Keep binance fresh, let okx go stale (> 60 s old)
        feed(&store, Venue::Binance, 100.0, 200_000);
        engine.scan(200_000).await;

        assert_eq!(engine.active_count(), 0);
        let history = engine.closed_history();
        assert_eq!(history[0].close_reason, CloseReason::PriceConverged);
        // Closing snapshot falls back to the last seen quote
        assert!((history[0].closing.spread_pct - history[0].opening.spread_pct).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_timeout_close() {
        let config = EngineConfig {
            max_opportunity_age: Duration::from_secs(7_200),
            ..Default::default()
        };
        let (mut engine, store, mut rx) = engine_with(config);
        feed(&store, Venue::Binance, 100.0, 0);
        feed(&store, Venue::Okx, 101.0, 0);
        engine.scan(1_000).await;
        drain(&mut rx);

        // Still above threshold 2h+ later
        let later = 1_000 + 7_200_000 + 1_000;
        feed(&store, Venue::Binance, 100.0, later);
        feed(&store, Venue::Okx, 101.0, later);
        engine.scan(later).await;

        let history = engine.closed_history();
        assert_eq!(history[0].close_reason, CloseReason::Timeout);
    }

    #[tokio::test]
    async fn test_convergence_floor_beats_below_threshold() {
        // Even with the close threshold configured under the convergence
        // floor, a spread beneath the floor closes as converged.
        let config = EngineConfig {
            close_threshold_pct: 0.08,
            ..Default::default()
        };
        let (mut engine, store, mut rx) = engine_with(config);
        feed(&store, Venue::Binance, 100.0, 0);
        feed(&store, Venue::Okx, 101.0, 0);
        engine.scan(1_000).await;
        drain(&mut rx);

        feed(&store, Venue::Binance, 100.0, 150_000);
        feed(&store, Venue::Okx, 100.05, 150_000);
        engine.scan(150_000).await;
        assert_eq!(
            engine.closed_history()[0].close_reason,
            CloseReason::PriceConverged
        );
    }

    #[tokio::test]
    async fn test_three_venue_fanout() {
        let (mut engine, store, mut rx) = engine_with(EngineConfig::default());
        feed(&store, Venue::Binance, 100.0, 0);
        feed(&store, Venue::Okx, 101.0, 0);
        feed(&store, Venue::Gate, 102.0, 0);

        engine.scan(1_000).await;
        // Three independent ids, each alerted once
        assert_eq!(engine.active_count(), 3);
        assert_eq!(drain(&mut rx).len(), 3);
    }

    #[tokio::test]
    async fn test_manual_close() {
        let (mut engine, store, mut rx) = engine_with(EngineConfig::default());
        feed(&store, Venue::Binance, 100.0, 0);
        feed(&store, Venue::Okx, 101.0, 0);
        engine.scan(1_000).await;
        drain(&mut rx);

        let id = OpportunityId::new(btc(), Venue::Binance, Venue::Okx);
        let closed = engine.close_manual(&id, 500_000).await.unwrap();
        assert_eq!(closed.close_reason, CloseReason::Manual);
        assert_eq!(engine.active_count(), 0);
    }

    #[tokio::test]
    async fn test_open_survives_scans_without_close_condition() {
        let (mut engine, store, mut rx) = engine_with(EngineConfig::default());
        feed(&store, Venue::Binance, 100.0, 0);
        feed(&store, Venue::Okx, 101.0, 0);
        engine.scan(1_000).await;

        for scan_ms in [11_000u64, 21_000, 31_000] {
            feed(&store, Venue::Binance, 100.0, scan_ms);
            feed(&store, Venue::Okx, 101.0, scan_ms);
            engine.scan(scan_ms).await;
            assert_eq!(engine.active_count(), 1);
        }
        drain(&mut rx);
    }
}
