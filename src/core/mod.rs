//! Core detection pipeline
//!
//! Price store, common-instrument discovery, the opportunity engine, and
//! the surrounding plumbing (alert sink, failure notification, health).

pub mod catalog;
pub mod engine;
pub mod health;
pub mod notify;
pub mod opportunity;
pub mod registry;
pub mod sink;
pub mod spread;
pub mod store;
pub mod subscription;
pub mod types;

pub use catalog::{ActiveSet, CatalogConfig, CatalogDiff, CatalogService};
pub use engine::{EngineConfig, OpportunityEngine};
pub use health::{HealthMonitor, HealthSnapshot};
pub use notify::{FailureHub, FailureKind, FailureNotifier, LogNotifier};
pub use opportunity::{
    ActiveOpportunity, AlertEvent, ClosedOpportunity, CloseReason, OpportunityId,
};
pub use registry::VenueRegistry;
pub use sink::{AlertSink, ChannelSink, QueuedAlert, SinkError};
pub use spread::{Direction, SpreadQuote};
pub use store::{PriceStore, StoreConfig};
pub use subscription::SubscriptionManager;
pub use types::{Instrument, Venue};
