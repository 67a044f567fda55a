//! Position Domain Types
//!
//! Trade configuration, position state, and the events emitted when a
//! position opens or closes.

use std::fmt;

use chrono::{DateTime, TimeDelta, Utc};
use uuid::Uuid;

// =============================================================================
// Trade Configuration
// =============================================================================

/// Immutable trading parameters captured once at startup.
#[derive(Debug, Clone, PartialEq)]
pub struct TradeConfig {
    symbol: String,
    min_price: f64,
    max_price: f64,
    take_profit_pct: f64,
    stop_loss_pct: f64,
}

impl TradeConfig {
    /// Create a new configuration. The symbol is lower-cased.
    #[must_use]
    pub fn new(
        symbol: &str,
        min_price: f64,
        max_price: f64,
        take_profit_pct: f64,
        stop_loss_pct: f64,
    ) -> Self {
        Self {
            symbol: symbol.trim().to_lowercase(),
            min_price,
            max_price,
            take_profit_pct,
            stop_loss_pct,
        }
    }

    /// Lower-cased trading symbol (e.g. `btcusdt`).
    #[must_use]
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// Lower entry band; touching it opens a long position.
    #[must_use]
    pub const fn min_price(&self) -> f64 {
        self.min_price
    }

    /// Upper entry band; touching it opens a short position.
    #[must_use]
    pub const fn max_price(&self) -> f64 {
        self.max_price
    }

    /// Favourable move, in percent, that closes a position.
    #[must_use]
    pub const fn take_profit_pct(&self) -> f64 {
        self.take_profit_pct
    }

    /// Adverse move, in percent, that closes a position.
    #[must_use]
    pub const fn stop_loss_pct(&self) -> f64 {
        self.stop_loss_pct
    }

    /// True when the lower band sits above the upper band.
    #[must_use]
    pub fn has_inverted_bands(&self) -> bool {
        self.min_price > self.max_price
    }

    /// True when either exit threshold is zero or negative.
    #[must_use]
    pub fn has_non_positive_thresholds(&self) -> bool {
        self.take_profit_pct <= 0.0 || self.stop_loss_pct <= 0.0
    }
}

// =============================================================================
// Position State
// =============================================================================

/// Direction of a simulated position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    /// Profits when price rises from entry.
    Long,
    /// Profits when price falls from entry.
    Short,
}

impl Side {
    /// Label used in logs and metrics.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Long => "LONG",
            Self::Short => "SHORT",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An open simulated position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OpenPosition {
    /// Correlates the open and close log lines of one position.
    pub id: Uuid,
    /// Long or short.
    pub side: Side,
    /// Price of the tick that opened the position.
    pub entry_price: f64,
    /// Exchange time of the opening tick, or the wall clock if it had none.
    pub opened_at: DateTime<Utc>,
}

/// Current position state. At most one position is open at a time.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum PositionState {
    /// No position open; ticks are compared against the entry bands.
    #[default]
    Flat,
    /// A position is open; ticks are compared against the exit thresholds.
    Open(OpenPosition),
}

impl PositionState {
    /// Check if a position is open.
    #[must_use]
    pub const fn is_open(&self) -> bool {
        matches!(self, Self::Open(_))
    }

    /// Side of the open position, if any.
    #[must_use]
    pub const fn side(&self) -> Option<Side> {
        match self {
            Self::Flat => None,
            Self::Open(position) => Some(position.side),
        }
    }

    /// Entry price of the open position, if any.
    #[must_use]
    pub const fn entry_price(&self) -> Option<f64> {
        match self {
            Self::Flat => None,
            Self::Open(position) => Some(position.entry_price),
        }
    }
}

// =============================================================================
// Events
// =============================================================================

/// Why a position was closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CloseReason {
    /// Favourable threshold crossed.
    TakeProfit,
    /// Adverse threshold crossed.
    StopLoss,
}

impl CloseReason {
    /// Human-readable reason.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::TakeProfit => "Take Profit",
            Self::StopLoss => "Stop Loss",
        }
    }

    /// Snake-case label for metrics.
    #[must_use]
    pub const fn metric_label(&self) -> &'static str {
        match self {
            Self::TakeProfit => "take_profit",
            Self::StopLoss => "stop_loss",
        }
    }
}

impl fmt::Display for CloseReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// State transition emitted by the engine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PositionEvent {
    /// A position was opened.
    Opened {
        /// Position identifier.
        id: Uuid,
        /// Side of the new position.
        side: Side,
        /// Entry price.
        price: f64,
    },
    /// A position was closed.
    Closed {
        /// Position identifier.
        id: Uuid,
        /// Side of the closed position.
        side: Side,
        /// Which threshold was crossed.
        reason: CloseReason,
        /// Entry price of the closed position.
        entry_price: f64,
        /// Price of the closing tick.
        price: f64,
        /// `(price - entry) / entry * 100` at the closing tick.
        change_pct: f64,
        /// Time between the opening and closing ticks.
        held: TimeDelta,
    },
}

/// A single decoded price from the feed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceTick {
    /// Latest trade or close price.
    pub price: f64,
    /// Exchange event time, when the payload carries one.
    pub event_time: Option<DateTime<Utc>>,
}

impl PriceTick {
    /// Create a tick without an event time.
    #[must_use]
    pub const fn new(price: f64) -> Self {
        Self {
            price,
            event_time: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trade_config_lowercases_symbol() {
        let config = TradeConfig::new(" BTCUSDT ", 100.0, 110.0, 2.0, 1.0);
        assert_eq!(config.symbol(), "btcusdt");
    }

    #[test]
    fn trade_config_flags_inverted_bands() {
        assert!(TradeConfig::new("x", 110.0, 100.0, 2.0, 1.0).has_inverted_bands());
        assert!(!TradeConfig::new("x", 100.0, 100.0, 2.0, 1.0).has_inverted_bands());
    }

    #[test]
    fn trade_config_flags_non_positive_thresholds() {
        assert!(TradeConfig::new("x", 100.0, 110.0, 0.0, 1.0).has_non_positive_thresholds());
        assert!(TradeConfig::new("x", 100.0, 110.0, 2.0, -1.0).has_non_positive_thresholds());
        assert!(!TradeConfig::new("x", 100.0, 110.0, 2.0, 1.0).has_non_positive_thresholds());
    }

    #[test]
    fn flat_state_has_no_entry() {
        let state = PositionState::default();
        assert!(!state.is_open());
        assert_eq!(state.side(), None);
        assert_eq!(state.entry_price(), None);
    }

    #[test]
    fn close_reason_labels() {
        assert_eq!(CloseReason::TakeProfit.to_string(), "Take Profit");
        assert_eq!(CloseReason::StopLoss.to_string(), "Stop Loss");
        assert_eq!(CloseReason::StopLoss.metric_label(), "stop_loss");
    }
}
