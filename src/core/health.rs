//! Health monitor — periodic adapter liveness probe
//!
//! One probe 30 seconds after startup, then one every `interval`. A venue
//! reporting itself disconnected (or with zero live connections) gets a
//! reconnect issued through the subscription manager. Each probe emits a
//! single aggregated snapshot.

use std::sync::Arc;
use std::sync::RwLock;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::broadcast;
use tracing::{info, warn};

use crate::adapters::traits::VenueAdapter;
use crate::core::registry::VenueRegistry;
use crate::core::subscription::SubscriptionManager;
use crate::core::types::{current_time_ms, Venue};

/// Delay before the first probe after startup.
const STARTUP_PROBE_DELAY: Duration = Duration::from_secs(30);

/// Aggregated result of one probe.
#[derive(Debug, Clone, Serialize)]
pub struct HealthSnapshot {
    pub probed_ms: u64,
    pub working: Vec<Venue>,
    pub failed: Vec<Venue>,
}

pub struct HealthMonitor<A: VenueAdapter> {
    registry: Arc<VenueRegistry<A>>,
    subscriptions: Arc<SubscriptionManager<A>>,
    interval: Duration,
    latest: RwLock<Option<HealthSnapshot>>,
}

impl<A: VenueAdapter> HealthMonitor<A> {
    pub fn new(
        registry: Arc<VenueRegistry<A>>,
        subscriptions: Arc<SubscriptionManager<A>>,
        interval: Duration,
    ) -> Self {
        Self {
            registry,
            subscriptions,
            interval,
            latest: RwLock::new(None),
        }
    }

    /// Probe every adapter once; trigger reconnects for failed venues.
    pub async fn probe(&self) -> HealthSnapshot {
        let mut working = Vec::new();
        let mut failed = Vec::new();

        for (venue, adapter) in self.registry.iter() {
            let status = {
                let guard = adapter.lock().await;
                guard.status().await
            };
            if status.connected && status.connection_count > 0 {
                working.push(venue);
            } else {
                failed.push(venue);
                warn!(
                    venue = %venue,
                    last_error = ?status.last_error,
                    "Venue unhealthy, requesting reconnect"
                );
                if let Err(e) = self.subscriptions.reconnect_venue(venue).await {
                    warn!(venue = %venue, error = %e, "Reconnect request failed");
                }
            }
        }

        let snapshot = HealthSnapshot {
            probed_ms: current_time_ms(),
            working,
            failed,
        };
        info!(
            event_type = "HEALTH_PROBE",
            working = snapshot.working.len(),
            failed = snapshot.failed.len(),
            "Health probe completed"
        );
        if let Ok(mut latest) = self.latest.write() {
            *latest = Some(snapshot.clone());
        }
        snapshot
    }

    /// Most recent snapshot, for the external status surface.
    pub fn latest(&self) -> Option<HealthSnapshot> {
        self.latest.read().ok().and_then(|guard| guard.clone())
    }

    /// Probe loop: startup probe after 30 s, then on the configured period.
    pub async fn run(self: Arc<Self>, mut shutdown: broadcast::Receiver<()>) {
        tokio::select! {
            _ = shutdown.recv() => return,
            _ = tokio::time::sleep(STARTUP_PROBE_DELAY) => {
                self.probe().await;
            }
        }

        let mut interval = tokio::time::interval(self.interval);
        interval.tick().await; // first tick fires immediately, skip it
        loop {
            tokio::select! {
                _ = shutdown.recv() => break,
                _ = interval.tick() => {
                    self.probe().await;
                }
            }
        }
    }
}
