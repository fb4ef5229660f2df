//! Failure notification with rate-limited deduplication
//!
//! Adapter-layer failures (catalog fetches, stream opens, unexpected
//! closes, parse errors) are funneled through a `FailureHub` that
//! suppresses repeats of the same (venue, kind, message) within the
//! configured cooldown. What happens to a surfaced failure is up to the
//! `FailureNotifier` implementation; the default just logs.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::sync::Mutex;
use std::time::Duration;

use crate::core::types::{current_time_ms, Venue};

/// Default deduplication window (30 minutes).
pub const DEFAULT_FAILURE_COOLDOWN: Duration = Duration::from_secs(30 * 60);

// =============================================================================
// Failure Kinds
// =============================================================================

/// Classification of adapter failures surfaced out of the core.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    CatalogFetchFailed,
    StreamOpenFailed,
    StreamClosedUnexpectedly,
    ParseFailed,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::CatalogFetchFailed => write!(f, "CATALOG_FETCH_FAILED"),
            FailureKind::StreamOpenFailed => write!(f, "STREAM_OPEN_FAILED"),
            FailureKind::StreamClosedUnexpectedly => write!(f, "STREAM_CLOSED_UNEXPECTEDLY"),
            FailureKind::ParseFailed => write!(f, "PARSE_FAILED"),
        }
    }
}

// =============================================================================
// Notifier Interface
// =============================================================================

/// Sink for deduplicated failure notifications. Side effects (chat
/// messages, pages) are the implementer's concern.
pub trait FailureNotifier: Send + Sync {
    fn notify(&self, venue: Venue, kind: FailureKind, message: &str);
}

/// Default notifier: structured warning log, nothing else.
pub struct LogNotifier;

impl FailureNotifier for LogNotifier {
    fn notify(&self, venue: Venue, kind: FailureKind, message: &str) {
        tracing::warn!(
            event_type = %kind,
            venue = %venue,
            message = %message,
            "Adapter failure"
        );
    }
}

// =============================================================================
// FailureHub
// =============================================================================

/// Deduplicating front for a `FailureNotifier`.
///
/// A key that has fired within the cooldown window is suppressed.
pub struct FailureHub {
    inner: Arc<dyn FailureNotifier>,
    cooldown_ms: u64,
    seen: Mutex<HashMap<(Venue, FailureKind, String), u64>>,
}

impl FailureHub {
    pub fn new(inner: Arc<dyn FailureNotifier>, cooldown: Duration) -> Self {
        Self {
            inner,
            cooldown_ms: cooldown.as_millis() as u64,
            seen: Mutex::new(HashMap::new()),
        }
    }

    /// Forward the failure unless the same key fired within the cooldown.
    pub fn notify(&self, venue: Venue, kind: FailureKind, message: &str) {
        let now = current_time_ms();
        let key = (venue, kind, message.to_string());

        let mut seen = match self.seen.lock() {
            Ok(guard) => guard,
            Err(_) => return,
        };
        if let Some(&last) = seen.get(&key) {
            if now.saturating_sub(last) < self.cooldown_ms {
                tracing::trace!(
                    venue = %venue,
                    kind = %kind,
                    "Failure notification suppressed (cooldown)"
                );
                return;
            }
        }
        seen.insert(key, now);
        drop(seen);

        self.inner.notify(venue, kind, message);
    }

    /// Drop deduplication entries older than the cooldown window.
    pub fn sweep(&self) {
        let now = current_time_ms();
        let cooldown = self.cooldown_ms;
        if let Ok(mut seen) = self.seen.lock() {
            seen.retain(|_, ts| now.saturating_sub(*ts) < cooldown);
        }
    }
}
