//! Generic streaming adapter core
//!
//! `StreamAdapter<W>` owns everything every venue adapter has in common:
//! the multiplexed socket lifecycle, the subscription registry, the reader
//! task, reconnect supervision with backoff, and the stop latch that
//! guarantees no tick is delivered after `stop()`. Venue modules supply a
//! `VenueWire` implementation: endpoints, symbol bijection, frame formats,
//! and the catalog fetch.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures_util::stream::SplitSink;
use futures_util::{SinkExt, StreamExt};
use tokio::sync::Mutex as AsyncMutex;
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tokio_tungstenite::tungstenite::Message;

use crate::adapters::errors::{AdapterError, AdapterResult};
use crate::adapters::shared::reconnect::ReconnectPolicy;
use crate::adapters::shared::websocket::{connect_tls, TlsWebSocketStream};
use crate::adapters::traits::VenueAdapter;
use crate::adapters::types::{
    AdapterStatus, CatalogEntry, ConnectionHealth, Tick, TickSink, WS_PING_INTERVAL_SECS,
};
use crate::core::notify::{FailureHub, FailureKind};
use crate::core::types::{current_time_ms, Instrument, Venue};

// =============================================================================
// Wire Protocol Seam
// =============================================================================

/// Raw ticker payload extracted from a venue frame, keyed by the venue's
/// own symbol form. The streaming core resolves it back to the canonical
/// instrument through the subscription registry.
#[derive(Debug, Clone)]
pub struct RawTick {
    pub wire_symbol: String,
    pub price: f64,
    pub volume: Option<f64>,
    pub high: Option<f64>,
    pub low: Option<f64>,
}

/// Outcome of parsing one inbound text frame.
#[derive(Debug)]
pub enum ParsedFrame {
    /// A ticker update for a subscribed symbol
    Tick(RawTick),
    /// Application-level pong
    Pong,
    /// Subscription confirmation or other acknowledged control frame
    Ack,
    /// A frame that looked like ticker data but failed to parse
    Malformed(String),
    /// Anything else the venue sends that we do not care about
    Ignore,
}

/// Venue-specific wire protocol.
///
/// Implementations are stateless descriptions of one venue's streaming and
/// catalog endpoints; all connection state lives in `StreamAdapter`.
#[async_trait]
pub trait VenueWire: Send + Sync + 'static {
    /// The venue this protocol speaks for.
    const VENUE: Venue;

    /// Resolve the websocket endpoint. Most venues have a fixed URL;
    /// KuCoin performs a token handshake over HTTP first.
    async fn ws_endpoint(&self, client: &reqwest::Client) -> AdapterResult<String>;

    /// Canonical instrument → venue wire symbol.
    fn wire_symbol(&self, instrument: &Instrument) -> String;

    /// Frame that begins streaming the symbol's ticker.
    fn subscribe_frame(&self, wire_symbol: &str) -> Message;

    /// Frame that stops streaming the symbol's ticker.
    fn unsubscribe_frame(&self, wire_symbol: &str) -> Message;

    /// Application-level keepalive, for venues that require one.
    fn ping_frame(&self) -> Option<Message> {
        None
    }

    /// Parse one inbound text frame.
    fn parse_frame(&self, text: &str) -> ParsedFrame;

    /// Fetch and normalize the venue's instrument catalog.
    async fn fetch_catalog(&self, client: &reqwest::Client) -> AdapterResult<Vec<CatalogEntry>>;
}

// =============================================================================
// Network Policy
// =============================================================================

/// Network timing knobs shared by every adapter.
#[derive(Debug, Clone, Copy)]
pub struct NetPolicy {
    /// Hard timeout for every network operation
    pub ws_timeout: Duration,
    /// Reconnect backoff policy
    pub reconnect: ReconnectPolicy,
}

impl Default for NetPolicy {
    fn default() -> Self {
        Self {
            ws_timeout: Duration::from_secs(10),
            reconnect: ReconnectPolicy::default(),
        }
    }
}

// =============================================================================
// Internal Shared State
// =============================================================================

#[derive(Clone)]
struct SubEntry {
    instrument: Instrument,
    sink: TickSink,
}

type Registry = Arc<std::sync::RwLock<HashMap<String, SubEntry>>>;
type WsWriter = SplitSink<TlsWebSocketStream, Message>;
type WriterSlot = Arc<AsyncMutex<Option<WsWriter>>>;
type ErrorSlot = Arc<std::sync::Mutex<Option<String>>>;

/// Delay between subscription frames to stay within venue rate limits.
const SUBSCRIBE_PACING_MS: u64 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AdapterState {
    Created,
    Initialized,
    Terminated,
}

// =============================================================================
// StreamAdapter
// =============================================================================

/// Streaming adapter for one venue, parameterized by its wire protocol.
pub struct StreamAdapter<W: VenueWire> {
    wire: Arc<W>,
    http: reqwest::Client,
    net: NetPolicy,
    state: AdapterState,
    registry: Registry,
    writer: WriterSlot,
    conn_handle: Option<JoinHandle<()>>,
    ping_handle: Option<JoinHandle<()>>,
    health: Arc<ConnectionHealth>,
    stopped: Arc<AtomicBool>,
    last_error: ErrorSlot,
    failures: Option<Arc<FailureHub>>,
}

impl<W: VenueWire> StreamAdapter<W> {
    pub fn new(wire: W, http: reqwest::Client, net: NetPolicy) -> Self {
        Self {
            wire: Arc::new(wire),
            http,
            net,
            state: AdapterState::Created,
            registry: Arc::new(std::sync::RwLock::new(HashMap::new())),
            writer: Arc::new(AsyncMutex::new(None)),
            conn_handle: None,
            ping_handle: None,
            health: Arc::new(ConnectionHealth::new()),
            stopped: Arc::new(AtomicBool::new(false)),
            last_error: Arc::new(std::sync::Mutex::new(None)),
            failures: None,
        }
    }

    /// Attach the deduplicated failure notifier.
    pub fn with_failure_hub(mut self, hub: Arc<FailureHub>) -> Self {
        self.failures = Some(hub);
        self
    }

    fn spawn_connection(&mut self) {
        let wire = Arc::clone(&self.wire);
        let http = self.http.clone();
        let net = self.net;
        let registry = Arc::clone(&self.registry);
        let writer = Arc::clone(&self.writer);
        let health = Arc::clone(&self.health);
        let stopped = Arc::clone(&self.stopped);
        let last_error = Arc::clone(&self.last_error);
        let failures = self.failures.clone();

        self.conn_handle = Some(tokio::spawn(async move {
            connection_task(
                wire, http, net, registry, writer, health, stopped, last_error, failures,
            )
            .await;
        }));

        if self.ping_handle.is_none() {
            if let Some(frame) = self.wire.ping_frame() {
                let writer = Arc::clone(&self.writer);
                let stopped = Arc::clone(&self.stopped);
                self.ping_handle = Some(tokio::spawn(async move {
                    let mut tick =
                        tokio::time::interval(Duration::from_secs(WS_PING_INTERVAL_SECS));
                    loop {
                        tick.tick().await;
                        if stopped.load(Ordering::Relaxed) {
                            break;
                        }
                        let mut slot = writer.lock().await;
                        if let Some(sender) = slot.as_mut() {
                            if sender.send(frame.clone()).await.is_err() {
                                // Reader loop will notice the dead socket
                                *slot = None;
                            }
                        }
                    }
                }));
            }
        }
    }
}

#[async_trait]
impl<W: VenueWire> VenueAdapter for StreamAdapter<W> {
    fn venue(&self) -> Venue {
        W::VENUE
    }

    async fn start(&mut self) -> AdapterResult<()> {
        match self.state {
            AdapterState::Terminated => Err(AdapterError::ConnectionFailed(
                "adapter is terminated".into(),
            )),
            _ => {
                self.state = AdapterState::Initialized;
                Ok(())
            }
        }
    }

    async fn stop(&mut self) -> AdapterResult<()> {
        self.stopped.store(true, Ordering::SeqCst);
        self.state = AdapterState::Terminated;

        if let Some(handle) = self.ping_handle.take() {
            handle.abort();
        }

        {
            let mut slot = self.writer.lock().await;
            if let Some(mut sender) = slot.take() {
                let _ = sender.send(Message::Close(None)).await;
            }
        }

        if let Some(handle) = self.conn_handle.take() {
            handle.abort();
        }

        self.health.reader_alive.store(false, Ordering::Relaxed);
        if let Ok(mut registry) = self.registry.write() {
            registry.clear();
        }

        tracing::info!(venue = %W::VENUE, "Adapter stopped");
        Ok(())
    }

    async fn fetch_catalog(&self) -> AdapterResult<Vec<CatalogEntry>> {
        let entries = timeout(self.net.ws_timeout, self.wire.fetch_catalog(&self.http))
            .await
            .map_err(|_| AdapterError::NetworkTimeout(self.net.ws_timeout.as_millis() as u64))??;
        Ok(entries.into_iter().filter(|e| e.tradable).collect())
    }

    async fn subscribe(&mut self, instrument: &Instrument, sink: TickSink) -> AdapterResult<()> {
        if self.state == AdapterState::Terminated {
            return Err(AdapterError::SubscriptionFailed {
                instrument: instrument.to_string(),
                reason: "adapter is terminated".into(),
            });
        }

        let wire_symbol = self.wire.wire_symbol(instrument);
        {
            let mut registry = self.registry.write().map_err(|_| {
                AdapterError::SubscriptionFailed {
                    instrument: instrument.to_string(),
                    reason: "registry poisoned".into(),
                }
            })?;
            registry.insert(
                wire_symbol.clone(),
                SubEntry {
                    instrument: instrument.clone(),
                    sink,
                },
            );
        }

        if self.conn_handle.is_none() {
            // First subscription opens the stream; the connection task
            // subscribes everything in the registry once connected.
            self.spawn_connection();
            return Ok(());
        }

        let mut slot = self.writer.lock().await;
        if let Some(sender) = slot.as_mut() {
            sender
                .send(self.wire.subscribe_frame(&wire_symbol))
                .await
                .map_err(|e| AdapterError::SubscriptionFailed {
                    instrument: instrument.to_string(),
                    reason: e.to_string(),
                })?;
        }
        // Disconnected: the pending registry entry is subscribed on reconnect.
        Ok(())
    }

    async fn unsubscribe(&mut self, instrument: &Instrument) -> AdapterResult<()> {
        let wire_symbol = self.wire.wire_symbol(instrument);
        let removed = self
            .registry
            .write()
            .map(|mut r| r.remove(&wire_symbol).is_some())
            .unwrap_or(false);

        if removed {
            let mut slot = self.writer.lock().await;
            if let Some(sender) = slot.as_mut() {
                let _ = sender.send(self.wire.unsubscribe_frame(&wire_symbol)).await;
            }
        }
        Ok(())
    }

    async fn reconnect(&mut self) -> AdapterResult<()> {
        if self.state == AdapterState::Terminated {
            return Err(AdapterError::ConnectionFailed(
                "adapter is terminated".into(),
            ));
        }
        if let Some(handle) = self.conn_handle.take() {
            handle.abort();
        }
        *self.writer.lock().await = None;
        self.health.reader_alive.store(false, Ordering::Relaxed);
        self.spawn_connection();
        tracing::info!(venue = %W::VENUE, "Reconnect requested");
        Ok(())
    }

    async fn status(&self) -> AdapterStatus {
        let connected = self.conn_handle.is_some()
            && self.health.reader_alive.load(Ordering::Relaxed)
            && !self.stopped.load(Ordering::Relaxed);
        let subscribed = self
            .registry
            .read()
            .map(|r| r.values().map(|e| e.instrument.clone()).collect())
            .unwrap_or_default();
        let last_error = self.last_error.lock().ok().and_then(|g| g.clone());
        AdapterStatus {
            venue: W::VENUE,
            connected,
            connection_count: usize::from(connected),
            subscribed,
            last_error,
        }
    }
}

// =============================================================================
// Connection Task
// =============================================================================

/// One task per adapter: connect, subscribe the active set, read frames,
/// and on abnormal exit back off and reconnect until the stop latch fires.
#[allow(clippy::too_many_arguments)]
async fn connection_task<W: VenueWire>(
    wire: Arc<W>,
    http: reqwest::Client,
    net: NetPolicy,
    registry: Registry,
    writer: WriterSlot,
    health: Arc<ConnectionHealth>,
    stopped: Arc<AtomicBool>,
    last_error: ErrorSlot,
    failures: Option<Arc<FailureHub>>,
) {
    let mut attempt: u32 = 0;

    'supervisor: loop {
        if stopped.load(Ordering::Relaxed) {
            break;
        }
        if attempt > 0 {
            let delay = net.reconnect.backoff_with_jitter(attempt - 1);
            tracing::info!(
                venue = %W::VENUE,
                attempt,
                delay_ms = delay.as_millis() as u64,
                "Scheduling reconnect"
            );
            tokio::time::sleep(delay).await;
            if stopped.load(Ordering::Relaxed) {
                break;
            }
        }

        // Resolve endpoint + open the socket, both bounded by the timeout.
        let endpoint = match timeout(net.ws_timeout, wire.ws_endpoint(&http)).await {
            Ok(Ok(url)) => url,
            Ok(Err(e)) => {
                report_open_failure::<W>(&last_error, &failures, e.to_string());
                attempt = attempt.saturating_add(1);
                continue;
            }
            Err(_) => {
                report_open_failure::<W>(&last_error, &failures, "endpoint resolution timed out".into());
                attempt = attempt.saturating_add(1);
                continue;
            }
        };

        let ws = match timeout(net.ws_timeout, connect_tls(&endpoint)).await {
            Ok(Ok(ws)) => ws,
            Ok(Err(e)) => {
                report_open_failure::<W>(&last_error, &failures, e.to_string());
                attempt = attempt.saturating_add(1);
                continue;
            }
            Err(_) => {
                report_open_failure::<W>(&last_error, &failures, "connect timed out".into());
                attempt = attempt.saturating_add(1);
                continue;
            }
        };

        tracing::info!(venue = %W::VENUE, "Stream connected");
        let (mut sender, mut receiver) = ws.split();

        // Subscribe everything currently registered, paced for rate limits.
        let symbols: Vec<String> = registry
            .read()
            .map(|r| r.keys().cloned().collect())
            .unwrap_or_default();
        for symbol in &symbols {
            if sender.send(wire.subscribe_frame(symbol)).await.is_err() {
                record_stream_error::<W>(&last_error, "subscribe frame send failed");
                attempt = attempt.saturating_add(1);
                continue 'supervisor;
            }
            tokio::time::sleep(Duration::from_millis(SUBSCRIBE_PACING_MS)).await;
        }
        tracing::info!(venue = %W::VENUE, count = symbols.len(), "Subscriptions issued");

        *writer.lock().await = Some(sender);
        health.reader_alive.store(true, Ordering::Relaxed);
        health.last_data.store(current_time_ms(), Ordering::Relaxed);
        attempt = 0;

        // Read until close, error, or stop.
        loop {
            let msg = receiver.next().await;
            if stopped.load(Ordering::Relaxed) {
                break 'supervisor;
            }
            match msg {
                Some(Ok(Message::Text(text))) => {
                    health.last_data.store(current_time_ms(), Ordering::Relaxed);
                    handle_frame(&*wire, &text, &registry, &health, &stopped, &failures);
                }
                Some(Ok(Message::Ping(payload))) => {
                    let mut slot = writer.lock().await;
                    if let Some(sender) = slot.as_mut() {
                        let _ = sender.send(Message::Pong(payload)).await;
                    }
                }
                Some(Ok(Message::Close(_))) | None => {
                    tracing::info!(venue = %W::VENUE, "Stream closed by server");
                    break;
                }
                Some(Ok(_)) => {
                    health.last_data.store(current_time_ms(), Ordering::Relaxed);
                }
                Some(Err(e)) => {
                    record_stream_error::<W>(&last_error, &format!("read error: {}", e));
                    break;
                }
            }
        }

        health.reader_alive.store(false, Ordering::Relaxed);
        *writer.lock().await = None;

        if stopped.load(Ordering::Relaxed) {
            break;
        }
        if let Some(hub) = &failures {
            hub.notify(
                W::VENUE,
                FailureKind::StreamClosedUnexpectedly,
                "ticker stream dropped",
            );
        }
        attempt = 1;
    }

    health.reader_alive.store(false, Ordering::Relaxed);
    tracing::debug!(venue = %W::VENUE, "Connection task exited");
}

fn report_open_failure<W: VenueWire>(
    last_error: &ErrorSlot,
    failures: &Option<Arc<FailureHub>>,
    msg: String,
) {
    tracing::warn!(venue = %W::VENUE, error = %msg, "Stream open failed");
    if let Ok(mut guard) = last_error.lock() {
        *guard = Some(msg.clone());
    }
    if let Some(hub) = failures {
        hub.notify(W::VENUE, FailureKind::StreamOpenFailed, &msg);
    }
}

fn record_stream_error<W: VenueWire>(last_error: &ErrorSlot, msg: &str) {
    tracing::warn!(venue = %W::VENUE, error = %msg, "Stream error");
    if let Ok(mut guard) = last_error.lock() {
        *guard = Some(msg.to_string());
    }
}

/// Dispatch one parsed frame to the registered sink.
fn handle_frame<W: VenueWire>(
    wire: &W,
    text: &str,
    registry: &Registry,
    health: &Arc<ConnectionHealth>,
    stopped: &Arc<AtomicBool>,
    failures: &Option<Arc<FailureHub>>,
) {
    match wire.parse_frame(text) {
        ParsedFrame::Tick(raw) => {
            let entry = registry
                .read()
                .ok()
                .and_then(|r| r.get(&raw.wire_symbol).cloned());
            let Some(entry) = entry else {
                tracing::trace!(venue = %W::VENUE, symbol = %raw.wire_symbol, "Tick for unknown symbol");
                return;
            };
            if stopped.load(Ordering::Relaxed) {
                return;
            }
            let tick = Tick {
                instrument: entry.instrument,
                venue: W::VENUE,
                price: raw.price,
                ingest_ms: current_time_ms(),
                volume: raw.volume,
                high: raw.high,
                low: raw.low,
            };
            if tick.is_valid() {
                (entry.sink)(tick);
            } else {
                health.invalid_ticks.fetch_add(1, Ordering::Relaxed);
                tracing::debug!(
                    venue = %W::VENUE,
                    symbol = %raw.wire_symbol,
                    price = raw.price,
                    "Dropped invalid tick"
                );
            }
        }
        ParsedFrame::Malformed(err) => {
            tracing::warn!(venue = %W::VENUE, error = %err, "Malformed ticker frame");
            if let Some(hub) = failures {
                hub.notify(W::VENUE, FailureKind::ParseFailed, &err);
            }
        }
        ParsedFrame::Pong => {
            tracing::trace!(venue = %W::VENUE, "Pong received");
        }
        ParsedFrame::Ack => {
            tracing::debug!(venue = %W::VENUE, "Subscription confirmed");
        }
        ParsedFrame::Ignore => {}
    }
}
