//! Shared adapter infrastructure
//!
//! TLS connection helpers, reconnect policy, and the generic streaming
//! core that every venue adapter is built on.

pub mod reconnect;
pub mod stream;
pub mod websocket;

pub use reconnect::ReconnectPolicy;
pub use stream::{NetPolicy, ParsedFrame, RawTick, StreamAdapter, VenueWire};
pub use websocket::{connect_tls, TlsWebSocketStream};
