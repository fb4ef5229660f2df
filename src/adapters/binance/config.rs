//! Binance endpoint configuration

/// Spot streaming endpoint (raw stream, one connection, multiplexed subs)
const MAINNET_WS_URL: &str = "wss://stream.binance.com:9443/ws";

/// Spot REST base for the catalog fetch
const MAINNET_REST_URL: &str = "https://api.binance.com";

/// Configuration for the Binance connection (public market data)
#[derive(Debug, Clone)]
pub struct BinanceConfig {
    ws_url: String,
    rest_url: String,
}

impl Default for BinanceConfig {
    fn default() -> Self {
        Self {
            ws_url: MAINNET_WS_URL.to_string(),
            rest_url: MAINNET_REST_URL.to_string(),
        }
    }
}

impl BinanceConfig {
    /// Create configuration, honoring endpoint overrides from the
    /// environment (useful against mirrors and in tests).
    pub fn from_env() -> Self {
        Self {
            ws_url: std::env::var("BINANCE_WS_URL").unwrap_or_else(|_| MAINNET_WS_URL.to_string()),
            rest_url: std::env::var("BINANCE_REST_URL")
                .unwrap_or_else(|_| MAINNET_REST_URL.to_string()),
        }
    }

    pub fn ws_url(&self) -> &str {
        &self.ws_url
    }

    pub fn rest_url(&self) -> &str {
        &self.rest_url
    }
}
