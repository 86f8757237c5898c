use std::net::{IpAddr, Ipv4Addr};
use std::time::Duration;

use crate::schedule::DEFAULT_SETTLE_MS;

pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_LOG_FILTER: &str = "info";
pub const MAX_SETTLE_MS: u64 = 5_000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub host: IpAddr,
    pub port: u16,
    pub log_filter: String,
    pub settle: Duration,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: DEFAULT_PORT,
            log_filter: DEFAULT_LOG_FILTER.to_string(),
            settle: Duration::from_millis(DEFAULT_SETTLE_MS),
        }
    }
}

impl Settings {
    /// Reads `EPARGNE_HOST`, `PORT`, `RUST_LOG` and `EPARGNE_SETTLE_MS`.
    /// Unparseable values keep their defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut settings = Self::default();
        if let Some(host) = lookup("EPARGNE_HOST").and_then(|v| v.trim().parse().ok()) {
            settings.host = host;
        }
        if let Some(port) = lookup("PORT").and_then(|v| v.trim().parse().ok()) {
            settings.port = port;
        }
        if let Some(filter) = lookup("RUST_LOG").filter(|v| !v.trim().is_empty()) {
            settings.log_filter = filter;
        }
        if let Some(ms) = lookup("EPARGNE_SETTLE_MS").and_then(|v| v.trim().parse().ok()) {
            settings.settle = settle_from_millis(ms);
        }
        settings
    }
}

/// Settle window for watch mode, capped at `MAX_SETTLE_MS`.
pub fn settle_from_millis(ms: u64) -> Duration {
    Duration::from_millis(ms.min(MAX_SETTLE_MS))
}
