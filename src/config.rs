//! Server tunables, read once at startup.
//!
//! The two timer durations exist so tests can run with millisecond windows
//! while production keeps reload-friendly defaults.

use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    /// How long a disconnected member's seat and vote are held for a
    /// reconnection carrying the same client identity (T1).
    pub grace_period: Duration,
    /// How long after the host leaves the member set before the remaining
    /// members are told the host is absent (T2).
    pub host_absent_delay: Duration,
    /// HTTP/WebSocket listen port
    pub port: u16,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            grace_period: Duration::from_secs(10),
            host_absent_delay: Duration::from_secs(15),
            port: 8080,
        }
    }
}

impl Config {
    /// Load config from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let grace_secs = std::env::var("GRACE_PERIOD_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.grace_period.as_secs());

        let host_absent_secs = std::env::var("HOST_ABSENT_DELAY_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.host_absent_delay.as_secs());

        let port = std::env::var("PORT")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.port);

        tracing::info!(grace_secs, host_absent_secs, port, "Server config loaded");

        Self {
            grace_period: Duration::from_secs(grace_secs),
            host_absent_delay: Duration::from_secs(host_absent_secs),
            port,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_defaults_without_env() {
        std::env::remove_var("GRACE_PERIOD_SECS");
        std::env::remove_var("HOST_ABSENT_DELAY_SECS");
        std::env::remove_var("PORT");

        let config = Config::from_env();
        assert_eq!(config.grace_period, Duration::from_secs(10));
        assert_eq!(config.host_absent_delay, Duration::from_secs(15));
        assert_eq!(config.port, 8080);
    }

    #[test]
    #[serial]
    fn test_env_overrides() {
        std::env::set_var("GRACE_PERIOD_SECS", "2");
        std::env::set_var("HOST_ABSENT_DELAY_SECS", "3");
        std::env::set_var("PORT", "9999");

        let config = Config::from_env();
        assert_eq!(config.grace_period, Duration::from_secs(2));
        assert_eq!(config.host_absent_delay, Duration::from_secs(3));
        assert_eq!(config.port, 9999);

        std::env::remove_var("GRACE_PERIOD_SECS");
        std::env::remove_var("HOST_ABSENT_DELAY_SECS");
        std::env::remove_var("PORT");
    }

    #[test]
    #[serial]
    fn test_garbage_values_fall_back() {
        std::env::set_var("GRACE_PERIOD_SECS", "soon");
        std::env::set_var("PORT", "-1");

        let config = Config::from_env();
        assert_eq!(config.grace_period, Duration::from_secs(10));
        assert_eq!(config.port, 8080);

        std::env::remove_var("GRACE_PERIOD_SECS");
        std::env::remove_var("PORT");
    }
}
