//! Configuration loading and resolution.
//!
//! Every setting resolves as explicit flag, then environment variable, then
//! built-in default.

use std::time::Duration;

pub const DEFAULT_ADDR: &str = "0.0.0.0:3000";
pub const DEFAULT_MAX_FRAME_BYTES: usize = 4 * 1024 * 1024;
pub const DEFAULT_DRAIN_SECS: u64 = 5;

pub const ENV_ADDR: &str = "VALUATION_MCP_ADDR";
pub const ENV_MAX_FRAME_BYTES: &str = "VALUATION_MCP_MAX_FRAME_BYTES";
pub const ENV_DRAIN_SECS: &str = "VALUATION_MCP_DRAIN_SECS";
pub const ENV_TOKEN: &str = "VALUATION_MCP_TOKEN";

/// Per-connection transport limits.
#[derive(Debug, Clone, Copy)]
pub struct TransportConfig {
    /// Longest accepted frame, excluding the `\n` or `\r\n` terminator.
    pub max_frame_bytes: usize,
    /// How long a closing connection waits for in-flight handlers.
    pub drain_timeout: Duration,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            max_frame_bytes: DEFAULT_MAX_FRAME_BYTES,
            drain_timeout: Duration::from_secs(DEFAULT_DRAIN_SECS),
        }
    }
}

impl TransportConfig {
    /// Defaults overridden by any valid environment values.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let max_frame_bytes = env_parse(ENV_MAX_FRAME_BYTES)
            .filter(|n: &usize| *n > 0)
            .unwrap_or(defaults.max_frame_bytes);
        let drain_timeout = env_parse(ENV_DRAIN_SECS)
            .map(Duration::from_secs)
            .unwrap_or(defaults.drain_timeout);
        Self {
            max_frame_bytes,
            drain_timeout,
        }
    }
}

/// Resolve the listen address.
pub fn resolve_listen_addr(explicit: Option<&str>) -> String {
    if let Some(addr) = explicit {
        return addr.to_string();
    }

    if let Ok(env_addr) = std::env::var(ENV_ADDR) {
        if !env_addr.trim().is_empty() {
            return env_addr;
        }
    }

    DEFAULT_ADDR.to_string()
}

/// Resolve the bearer token for the HTTP transport, if any.
pub fn resolve_token(explicit: Option<String>) -> Option<String> {
    explicit
        .or_else(|| std::env::var(ENV_TOKEN).ok())
        .filter(|t| !t.is_empty())
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    let raw = std::env::var(key).ok()?;
    match raw.trim().parse() {
        Ok(v) => Some(v),
        Err(_) => {
            tracing::warn!("Ignoring invalid {key}={raw}");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_addr_wins() {
        assert_eq!(resolve_listen_addr(Some("127.0.0.1:9")), "127.0.0.1:9");
    }

    #[test]
    fn test_explicit_token_wins() {
        assert_eq!(resolve_token(Some("abc".into())).as_deref(), Some("abc"));
    }

    #[test]
    fn test_default_transport_config() {
        let config = TransportConfig::default();
        assert_eq!(config.max_frame_bytes, 4 * 1024 * 1024);
        assert_eq!(config.drain_timeout, Duration::from_secs(5));
    }
}
