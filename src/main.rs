//! Cross-venue spread detector entry point
//!
//! Wiring order: configuration → adapters → catalog discovery →
//! subscriptions → engine + health monitor. Shutdown is a broadcast:
//! in-flight scan work completes, sockets close, no further alerts are
//! enqueued.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use tokio::signal;
use tokio::sync::broadcast;
use tracing::{error, info};

use spreadwatch::adapters::factory::create_adapter;
use spreadwatch::adapters::shared::{NetPolicy, ReconnectPolicy};
use spreadwatch::adapters::VenueAdapter;
use spreadwatch::config;
use spreadwatch::core::{
    ActiveSet, AlertEvent, CatalogConfig, CatalogService, ChannelSink, EngineConfig, FailureHub,
    HealthMonitor, LogNotifier, OpportunityEngine, PriceStore, StoreConfig, SubscriptionManager,
    VenueRegistry,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    config::init_logging();

    let settings = match config::load_settings(Path::new("config.yaml")) {
        Ok(s) => s,
        Err(e) => {
            error!(error = %e, "Configuration failed");
            std::process::exit(1);
        }
    };
    info!(
        venues = ?settings.venues,
        scan_interval_s = settings.scan_interval_secs,
        open_pct = settings.open_threshold_pct,
        close_pct = settings.close_threshold_pct,
        quote = %settings.quote_filter,
        "Detector starting"
    );

    let failures = Arc::new(FailureHub::new(
        Arc::new(LogNotifier),
        settings.failure_cooldown(),
    ));

    // Adapters for the configured venue set
    let net = NetPolicy {
        ws_timeout: settings.ws_timeout(),
        reconnect: ReconnectPolicy::new(settings.reconnect_delay()),
    };
    let mut adapters = Vec::new();
    for venue in &settings.venues {
        let mut adapter = create_adapter(*venue, net, Arc::clone(&failures));
        adapter.start().await?;
        adapters.push((*venue, adapter));
    }
    let registry = Arc::new(VenueRegistry::new(adapters));

    // Price store + discovery
    let store = Arc::new(PriceStore::new(StoreConfig {
        history_size: settings.history_size,
        stale_after: settings.stale_after(),
        drop_after: settings.drop_after(),
    }));
    let catalog = Arc::new(CatalogService::new(
        Arc::clone(&registry),
        CatalogConfig {
            quote_filter: settings.quote_filter.clone(),
            min_venues: settings.min_venues_per_instrument,
            enable_fallbacks: settings.enable_fallbacks,
            fallback_instruments: settings.fallback_instruments.clone(),
        },
        Arc::clone(&failures),
    ));
    catalog.refresh().await;

    let subscriptions = Arc::new(SubscriptionManager::new(
        Arc::clone(&registry),
        Arc::clone(&catalog),
        Arc::clone(&store),
    ));
    subscriptions.sync_all().await;

    // Alert egress: the delivery side is external; here the queue drains
    // into structured logs.
    let (sink, mut alert_rx) = ChannelSink::new(256);
    let delivery = tokio::spawn(async move {
        while let Some(alert) = alert_rx.recv().await {
            match &alert.event {
                AlertEvent::OpenOrUpdate(o) => info!(
                    event_type = "ALERT",
                    id = %o.id,
                    spread_pct = o.current.spread_pct,
                    direction = %o.current.direction,
                    implied_profit = o.current.implied_profit,
                    alerts_sent = o.alerts_sent,
                    priority = alert.priority,
                    "Spread alert"
                ),
                AlertEvent::Close(c) => info!(
                    event_type = "ALERT_CLOSE",
                    id = %c.id,
                    reason = %c.close_reason,
                    duration_s = c.duration_ms / 1_000,
                    peak_pct = c.peak_spread_pct,
                    priority = alert.priority,
                    "Spread closed"
                ),
            }
        }
    });

    // Engine + health monitor
    let (shutdown_tx, _) = broadcast::channel::<()>(1);
    let engine = OpportunityEngine::new(
        EngineConfig::from(&settings),
        Arc::clone(&store),
        Arc::clone(&catalog) as Arc<dyn ActiveSet>,
        Arc::new(sink),
    );
    let engine_handle = tokio::spawn(engine.run(shutdown_tx.subscribe()));

    let monitor = Arc::new(HealthMonitor::new(
        Arc::clone(&registry),
        Arc::clone(&subscriptions),
        settings.health_interval(),
    ));
    let monitor_handle = tokio::spawn(Arc::clone(&monitor).run(shutdown_tx.subscribe()));

    info!("Detector running, Ctrl+C to stop");
    signal::ctrl_c().await?;
    info!("Shutdown signal received");

    // Stop scheduling scans/probes, then close the sockets.
    let _ = shutdown_tx.send(());
    let _ = engine_handle.await;
    let _ = monitor_handle.await;
    for (venue, adapter) in registry.iter() {
        let mut guard = adapter.lock().await;
        if let Err(e) = guard.stop().await {
            error!(venue = %venue, error = %e, "Adapter stop failed");
        }
    }

    // Give the delivery task a moment to drain, then let it drop.
    tokio::time::sleep(Duration::from_millis(100)).await;
    delivery.abort();

    info!("Detector stopped");
    Ok(())
}
