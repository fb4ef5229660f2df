//! Shared WebSocket connection helpers
//!
//! Provides TLS-enabled WebSocket connection utilities used by all adapters.

use tokio_tungstenite::{
    connect_async_tls_with_config, Connector, MaybeTlsStream, WebSocketStream,
};

use crate::adapters::errors::AdapterError;

/// Type alias for the WebSocket stream with TLS
pub type TlsWebSocketStream = WebSocketStream<MaybeTlsStream<tokio::net::TcpStream>>;

/// Connect to a WebSocket endpoint with TLS (TLSv1.2 minimum)
///
/// This helper centralizes the TLS configuration for all venue adapters,
/// ensuring consistent security settings across connections.
pub async fn connect_tls(url: &str) -> Result<TlsWebSocketStream, AdapterError> {
    let tls = native_tls::TlsConnector::builder()
        .min_protocol_version(Some(native_tls::Protocol::Tlsv12))
        .build()
        .map_err(|e| AdapterError::ConnectionFailed(format!("TLS error: {}", e)))?;

    let (ws_stream, _response) =
        connect_async_tls_with_config(url, None, false, Some(Connector::NativeTls(tls)))
            .await
            .map_err(|e| AdapterError::WebSocket(Box::new(e)))?;

    Ok(ws_stream)
}
