//! Gate.io endpoint configuration

/// v4 spot streaming endpoint
const MAINNET_WS_URL: &str = "wss://api.gateio.ws/ws/v4/";

/// v4 REST base for the catalog fetch
const MAINNET_REST_URL: &str = "https://api.gateio.ws";

/// Configuration for the Gate.io connection (public market data)
#[derive(Debug, Clone)]
pub struct GateConfig {
    ws_url: String,
    rest_url: String,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            ws_url: MAINNET_WS_URL.to_string(),
            rest_url: MAINNET_REST_URL.to_string(),
        }
    }
}

impl GateConfig {
    pub fn from_env() -> Self {
        Self {
            ws_url: std::env::var("GATE_WS_URL").unwrap_or_else(|_| MAINNET_WS_URL.to_string()),
            rest_url: std::env::var("GATE_REST_URL")
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = GateConfig::default();
        assert_eq!(config.ws_url(), "wss://api.gateio.ws/ws/v4/");
    }
}
