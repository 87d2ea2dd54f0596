//! Process-level configuration, read once from the environment at startup.

use std::net::SocketAddr;
use std::path::PathBuf;

/// Read an environment variable, treating blank values as unset
pub fn env_non_empty(key: &str) -> Option<String> {
    std::env::var(key).ok().and_then(|value| {
        let trimmed = value.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_string())
    })
}

/// HTTP server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    /// Directory of front-end assets served for unknown paths (None = disabled)
    pub static_dir: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 5000)),
            static_dir: None,
        }
    }
}

impl ServerConfig {
    /// Load config from BIND_ADDR and STATIC_DIR
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let bind_addr = match env_non_empty("BIND_ADDR") {
            Some(raw) => raw.parse().unwrap_or_else(|e| {
                tracing::warn!(
                    "Invalid BIND_ADDR '{}': {}, using {}",
                    raw,
                    e,
                    defaults.bind_addr
                );
                defaults.bind_addr
            }),
            None => defaults.bind_addr,
        };

        Self {
            bind_addr,
            static_dir: env_non_empty("STATIC_DIR").map(PathBuf::from),
        }
    }
}
