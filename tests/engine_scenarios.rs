//! End-to-end engine lifecycle scenarios
//!
//! Drives the opportunity engine against a directly-fed price store and a
//! channel-backed alert sink, covering the full open → update → close
//! lifecycle: cooldown suppression, symmetric ids, convergence and
//! below-threshold closes, staleness, and multi-venue fanout.

use std::sync::Arc;

use spreadwatch::adapters::types::Tick;
use spreadwatch::core::engine::{EngineConfig, OpportunityEngine};
use spreadwatch::core::opportunity::{AlertEvent, CloseReason, OpportunityId};
use spreadwatch::core::sink::{ChannelSink, QueuedAlert};
use spreadwatch::core::spread::Direction;
use spreadwatch::core::store::{PriceStore, StoreConfig};
use spreadwatch::core::types::{Instrument, Venue};
use spreadwatch::core::ActiveSet;
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

fn harness() -> (OpportunityEngine, Arc<PriceStore>, mpsc::Receiver<QueuedAlert>) {
    let store = Arc::new(PriceStore::new(StoreConfig::default()));
    let (sink, rx) = ChannelSink::new(64);
    let engine = OpportunityEngine::new(
        EngineConfig::default(),
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

/// Scenario 1: V1=100.00, V2=101.00 at t=0 opens one opportunity with
/// direction buy-A-sell-B, one alert, priority floor(0.995×10)=9.
#[tokio::test]
async fn simple_open() {
    let (mut engine, store, mut rx) = harness();
    feed(&store, Venue::Binance, 100.0, 0);
    feed(&store, Venue::Okx, 101.0, 0);

    engine.scan(1_000).await;

    let alerts = drain(&mut rx);
    assert_eq!(alerts.len(), 1);
    assert_eq!(alerts[0].priority, 9);
    let AlertEvent::OpenOrUpdate(o) = &alerts[0].event else {
        panic!("expected open event");
    };
    assert_eq!(o.id, OpportunityId::new(btc(), Venue::Binance, Venue::Okx));
    assert_eq!(o.current.direction, Direction::BuyASellB);
    assert_eq!(o.alerts_sent, 1);
    assert!((o.current.spread_pct - 0.995_024_875).abs() < 1e-6);
    assert_eq!(o.current.implied_profit, 1_000.0);
}

/// Scenario 2: constant feeds keep updating the opportunity but emit no
/// second alert until the 5-minute cooldown elapses; the re-alert carries
/// alerts_sent = 2.
#[tokio::test]
async fn cooldown_suppression() {
    let (mut engine, store, mut rx) = harness();
    feed(&store, Venue::Binance, 100.0, 0);
    feed(&store, Venue::Okx, 101.0, 0);
    engine.scan(1_000).await;
    assert_eq!(drain(&mut rx).len(), 1);

    for t in [11_000u64, 21_000, 31_000, 120_000, 250_000] {
        feed(&store, Venue::Binance, 100.0, t);
        feed(&store, Venue::Okx, 101.0, t);
        engine.scan(t).await;
        assert_eq!(engine.active_count(), 1);
    }
    assert!(drain(&mut rx).is_empty(), "cooldown must suppress re-alerts");

    let t = 302_000u64; // past 1_000 + 300_000
    feed(&store, Venue::Binance, 100.0, t);
    feed(&store, Venue::Okx, 101.0, t);
    engine.scan(t).await;

    let alerts = drain(&mut rx);
    assert_eq!(alerts.len(), 1);
    let AlertEvent::OpenOrUpdate(o) = &alerts[0].event else {
        panic!("expected update event");
    };
    assert_eq!(o.alerts_sent, 2);
}

/// Scenario 3: swapping which venue carries which price yields the same
/// opportunity id (no second open) with the direction flipped.
#[tokio::test]
async fn symmetric_id() {
    let (mut engine, store, mut rx) = harness();
    feed(&store, Venue::Binance, 100.0, 0);
    feed(&store, Venue::Okx, 101.0, 0);
    engine.scan(1_000).await;
    drain(&mut rx);

    // Prices swap venues
    feed(&store, Venue::Binance, 101.0, 10_000);
    feed(&store, Venue::Okx, 100.0, 10_000);
    engine.scan(11_000).await;

    assert_eq!(engine.active_count(), 1, "same id, no second open");
    let o = engine.active_snapshot().pop().unwrap();
    assert_eq!(o.id, OpportunityId::new(btc(), Venue::Okx, Venue::Binance));
    assert_eq!(o.current.direction, Direction::BuyBSellA);
}

/// Scenario 4: convergence below 0.1% closes with PRICE_CONVERGED; the
/// close event carries the peak (~0.995%) and duration ≥ 2 min emits it.
#[tokio::test]
async fn close_by_convergence() {
    let (mut engine, store, mut rx) = harness();
    feed(&store, Venue::Binance, 100.0, 0);
    feed(&store, Venue::Okx, 101.0, 0);
    engine.scan(1_000).await;
    drain(&mut rx);

    feed(&store, Venue::Binance, 100.0, 121_000);
    feed(&store, Venue::Okx, 100.05, 121_000);
    engine.scan(121_000).await;

    assert_eq!(engine.active_count(), 0);
    let alerts = drain(&mut rx);
    assert_eq!(alerts.len(), 1);
    let AlertEvent::Close(c) = &alerts[0].event else {
        panic!("expected close event");
    };
    assert_eq!(c.close_reason, CloseReason::PriceConverged);
    assert!((c.peak_spread_pct - 0.995_024_875).abs() < 1e-6);
    assert!(c.duration_ms >= 120_000);
    assert_eq!(alerts[0].priority, 9); // floor(peak × 10)
}

/// Scenario 5: ~0.399% sits inside [0.1%, 0.5%) and closes BELOW_THRESHOLD.
#[tokio::test]
async fn close_below_threshold() {
    let (mut engine, store, mut rx) = harness();
    feed(&store, Venue::Binance, 100.0, 0);
    feed(&store, Venue::Okx, 101.0, 0);
    engine.scan(1_000).await;
    drain(&mut rx);

    feed(&store, Venue::Binance, 100.0, 150_000);
    feed(&store, Venue::Okx, 100.40, 150_000);
    engine.scan(150_000).await;

    let history = engine.closed_history();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].close_reason, CloseReason::BelowThreshold);
}

/// Scenario 6: one venue going silent past the staleness window closes
/// the opportunity (preserved behavior: reason is PRICE_CONVERGED) and no
/// further open is emitted while the key stays stale.
#[tokio::test]
async fn stale_closes_open() {
    let (mut engine, store, mut rx) = harness();
    feed(&store, Venue::Binance, 100.0, 0);
    feed(&store, Venue::Okx, 101.0, 0);
    engine.scan(1_000).await;
    drain(&mut rx);

    // Only binance keeps feeding; okx's last tick ages past 60 s
    feed(&store, Venue::Binance, 100.0, 130_000);
    engine.scan(130_000).await;

    assert_eq!(engine.active_count(), 0);
    let history = engine.closed_history();
    assert_eq!(history[0].close_reason, CloseReason::PriceConverged);

    // Further scans with the key still stale must not reopen
    feed(&store, Venue::Binance, 100.0, 140_000);
    engine.scan(140_000).await;
    assert_eq!(engine.active_count(), 0);

    // A fresh qualifying tick reopens
    feed(&store, Venue::Binance, 100.0, 150_000);
    feed(&store, Venue::Okx, 101.0, 150_000);
    engine.scan(150_000).await;
    assert_eq!(engine.active_count(), 1);
    let alerts = drain(&mut rx);
    // close alert (duration ≥ 2 min) + the reopen
    assert!(alerts
        .iter()
        .any(|a| matches!(a.event, AlertEvent::OpenOrUpdate(_))));
}

/// Scenario 7: three venues produce three independent opportunities, one
/// per unordered venue pair, each alerted independently.
#[tokio::test]
async fn three_venue_fanout() {
    let (mut engine, store, mut rx) = harness();
    feed(&store, Venue::Binance, 100.0, 0);
    feed(&store, Venue::Okx, 101.0, 0);
    feed(&store, Venue::Gate, 102.0, 0);

    engine.scan(1_000).await;

    assert_eq!(engine.active_count(), 3);
    let alerts = drain(&mut rx);
    assert_eq!(alerts.len(), 3);

    let mut ids: Vec<OpportunityId> = engine.active_snapshot().into_iter().map(|o| o.id).collect();
    ids.sort_by_key(|id| (id.venue_a, id.venue_b));
    assert_eq!(
        ids,
        vec![
            OpportunityId::new(btc(), Venue::Binance, Venue::Okx),
            OpportunityId::new(btc(), Venue::Binance, Venue::Gate),
            OpportunityId::new(btc(), Venue::Okx, Venue::Gate),
        ]
    );
}

/// Peak is non-decreasing and always at least the current spread.
#[tokio::test]
async fn peak_is_monotone() {
    let (mut engine, store, mut rx) = harness();
    feed(&store, Venue::Binance, 100.0, 0);
    feed(&store, Venue::Okx, 101.0, 0);
    engine.scan(1_000).await;

    let mut last_peak = 0.0f64;
    for (t, b) in [(11_000u64, 101.5), (21_000, 102.0), (31_000, 101.2)] {
        feed(&store, Venue::Binance, 100.0, t);
        feed(&store, Venue::Okx, b, t);
        engine.scan(t).await;
        let o = engine.active_snapshot().pop().unwrap();
        assert!(o.peak_spread_pct >= o.current.spread_pct);
        assert!(o.peak_spread_pct >= last_peak);
        last_peak = o.peak_spread_pct;
    }
    drain(&mut rx);
}

/// An instrument with fewer than two fresh venues is skipped entirely.
#[tokio::test]
async fn single_venue_is_skipped() {
    let (mut engine, store, mut rx) = harness();
    feed(&store, Venue::Binance, 100.0, 0);

    engine.scan(1_000).await;
    assert_eq!(engine.active_count(), 0);
    assert!(drain(&mut rx).is_empty());
}
