//! Feed Settings
//!
//! Ambient settings for the market data connection. Trading parameters are
//! never read here; they come from the interactive prompt.

use std::time::Duration;

/// Default Binance raw-stream endpoint.
pub const DEFAULT_BASE_URL: &str = "wss://stream.binance.com:9443/ws";

/// Kline interval used for the subscription.
pub const KLINE_INTERVAL: &str = "15m";

/// Market data connection settings.
#[derive(Debug, Clone)]
pub struct FeedSettings {
    /// Stream endpoint without the trailing stream name.
    pub base_url: String,
    /// Kline interval token.
    pub interval: String,
    /// Delay before the first retry after a failure.
    pub reconnect_delay_initial: Duration,
    /// Maximum delay between retries.
    pub reconnect_delay_max: Duration,
    /// Growth factor between consecutive retries (1.0 = fixed delay).
    pub reconnect_delay_multiplier: f64,
    /// Random spread applied to each delay, as a fraction in `[0, 1]`.
    pub reconnect_jitter: f64,
}

impl Default for FeedSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            interval: KLINE_INTERVAL.to_string(),
            reconnect_delay_initial: Duration::from_secs(3),
            reconnect_delay_max: Duration::from_secs(3),
            reconnect_delay_multiplier: 1.0,
            reconnect_jitter: 0.0,
        }
    }
}

impl FeedSettings {
    /// Load settings from the process environment, falling back to defaults.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load settings through an arbitrary key lookup.
    ///
    /// Missing or unparsable values fall back to defaults.
    #[must_use]
    pub fn from_lookup<L>(lookup: L) -> Self
    where
        L: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let base_url = lookup("BINANCE_WS_BASE_URL")
            .map(|v| v.trim().trim_end_matches('/').to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or(defaults.base_url);

        let reconnect_delay_initial = parse_duration_secs(
            &lookup,
            "FEED_RECONNECT_DELAY_SECS",
            defaults.reconnect_delay_initial,
        );
        let reconnect_delay_max = parse_duration_secs(
            &lookup,
            "FEED_RECONNECT_DELAY_MAX_SECS",
            defaults.reconnect_delay_max,
        )
        .max(reconnect_delay_initial);
        let reconnect_delay_multiplier = lookup("FEED_RECONNECT_MULTIPLIER")
            .and_then(|v| v.parse::<f64>().ok())
            .filter(|v| v.is_finite() && *v >= 1.0)
            .unwrap_or(defaults.reconnect_delay_multiplier);
        let reconnect_jitter = lookup("FEED_RECONNECT_JITTER")
            .and_then(|v| v.parse::<f64>().ok())
            .filter(|v| (0.0..=1.0).contains(v))
            .unwrap_or(defaults.reconnect_jitter);

        Self {
            base_url,
            interval: defaults.interval,
            reconnect_delay_initial,
            reconnect_delay_max,
            reconnect_delay_multiplier,
            reconnect_jitter,
        }
    }

    /// Stream URL for a symbol, e.g. `.../ws/btcusdt@kline_15m`.
    #[must_use]
    pub fn stream_url(&self, symbol: &str) -> String {
        format!(
            "{}/{}@kline_{}",
            self.base_url,
            symbol.to_lowercase(),
            self.interval
        )
    }
}

fn parse_duration_secs<L>(lookup: &L, key: &str, default: Duration) -> Duration
where
    L: Fn(&str) -> Option<String>,
{
    lookup(key)
        .and_then(|v| v.parse::<u64>().ok())
        .map_or(default, Duration::from_secs)
}
