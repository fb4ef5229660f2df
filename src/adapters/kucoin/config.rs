//! KuCoin endpoint configuration

/// REST base: catalog fetch and the bullet-public token handshake
const MAINNET_REST_URL: &str = "https://api.kucoin.com";

/// Configuration for the KuCoin connection (public market data)
#[derive(Debug, Clone)]
pub struct KucoinConfig {
    rest_url: String,
}

impl Default for KucoinConfig {
    fn default() -> Self {
        Self {
            rest_url: MAINNET_REST_URL.to_string(),
        }
    }
}

impl KucoinConfig {
    pub fn from_env() -> Self {
        Self {
            rest_url: std::env::var("KUCOIN_REST_URL")
                .unwrap_or_else(|_| MAINNET_REST_URL.to_string()),
        }
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
        let config = KucoinConfig::default();
        assert_eq!(config.rest_url(), "https://api.kucoin.com");
    }
}
