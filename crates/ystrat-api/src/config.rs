//! API server configuration.

/// Playground server configuration. The bind host is fixed to loopback.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub port: u16,
    /// Upper bound on request bodies; sized for the CSV limit plus
    /// multipart overhead.
    pub max_body_bytes: usize,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            port: 8787,
            max_body_bytes: 64 * 1024 * 1024,
        }
    }
}

impl ApiConfig {
    pub const HOST: &'static str = "127.0.0.1";

    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            port: std::env::var("YSTRAT_PORT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.port),
            max_body_bytes: std::env::var("YSTRAT_MAX_BODY_BYTES")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.max_body_bytes),
        }
    }
}
