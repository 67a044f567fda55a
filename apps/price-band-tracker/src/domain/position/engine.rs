//! Position Engine
//!
//! Two-state machine driven one price at a time:
//!
//! ```text
//!            min band touch            take profit / stop loss
//!   Flat ─────────────────────► Open(Long) ──────────────────────► Flat
//!   Flat ─────────────────────► Open(Short) ─────────────────────► Flat
//!            max band touch
//! ```
//!
//! # Tie-breaks
//!
//! - When a flat tick touches both bands (only possible if the bands are
//!   closer than `2 * ENTRY_MARGIN`), the long band wins.
//! - When an open tick crosses both thresholds, take-profit wins.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::types::{
    CloseReason, OpenPosition, PositionEvent, PositionState, PriceTick, Side, TradeConfig,
};

/// Absolute distance, in price units, within which a tick touches a band.
pub const ENTRY_MARGIN: f64 = 0.10;

/// Owns the trade configuration and the single position state.
///
/// Not `Sync`-shared: the feed loop owns the engine and evaluates ticks
/// strictly in arrival order.
#[derive(Debug, Clone)]
pub struct PositionEngine {
    config: TradeConfig,
    state: PositionState,
}

impl PositionEngine {
    /// Create a flat engine.
    #[must_use]
    pub fn new(config: TradeConfig) -> Self {
        Self {
            config,
            state: PositionState::Flat,
        }
    }

    /// Trade configuration.
    #[must_use]
    pub const fn config(&self) -> &TradeConfig {
        &self.config
    }

    /// Current position state.
    #[must_use]
    pub const fn state(&self) -> &PositionState {
        &self.state
    }

    /// Evaluate one price and apply at most one transition.
    ///
    /// `price` must be finite and positive; the decoder guarantees this.
    pub fn on_price(&mut self, price: f64) -> Option<PositionEvent> {
        self.on_tick(PriceTick::new(price))
    }

    /// Evaluate one decoded tick.
    ///
    /// The tick's exchange time, falling back to the wall clock, stamps the
    /// open and close so the holding time follows the market's clock.
    pub fn on_tick(&mut self, tick: PriceTick) -> Option<PositionEvent> {
        let price = tick.price;
        let at = tick.event_time.unwrap_or_else(Utc::now);

        match self.state {
            PositionState::Open(position) => {
                let change_pct = (price - position.entry_price) / position.entry_price * 100.0;
                self.exit_reason(position.side, change_pct)
                    .map(|reason| self.close_position(position, reason, price, change_pct, at))
            }
            PositionState::Flat => self
                .entry_side(price)
                .map(|side| self.open_position(side, price, at)),
        }
    }

    /// Take-profit is checked before stop-loss.
    fn exit_reason(&self, side: Side, change_pct: f64) -> Option<CloseReason> {
        let take_profit = self.config.take_profit_pct();
        let stop_loss = self.config.stop_loss_pct();

        match side {
            Side::Long if change_pct >= take_profit => Some(CloseReason::TakeProfit),
            Side::Long if change_pct <= -stop_loss => Some(CloseReason::StopLoss),
            Side::Short if change_pct <= -take_profit => Some(CloseReason::TakeProfit),
            Side::Short if change_pct >= stop_loss => Some(CloseReason::StopLoss),
            _ => None,
        }
    }

    /// The long band is checked before the short band.
    fn entry_side(&self, price: f64) -> Option<Side> {
        if (price - self.config.min_price()).abs() < ENTRY_MARGIN {
            Some(Side::Long)
        } else if (price - self.config.max_price()).abs() < ENTRY_MARGIN {
            Some(Side::Short)
        } else {
            None
        }
    }

    fn open_position(&mut self, side: Side, price: f64, at: DateTime<Utc>) -> PositionEvent {
        let position = OpenPosition {
            id: Uuid::new_v4(),
            side,
            entry_price: price,
            opened_at: at,
        };
        self.state = PositionState::Open(position);

        tracing::info!(
            action = "opened",
            position_id = %position.id,
            symbol = %self.config.symbol(),
            side = side.as_str(),
            price,
            event_time = %at,
            "Opened {side} position at {price:.2}"
        );

        PositionEvent::Opened {
            id: position.id,
            side,
            price,
        }
    }

    fn close_position(
        &mut self,
        position: OpenPosition,
        reason: CloseReason,
        price: f64,
        change_pct: f64,
        at: DateTime<Utc>,
    ) -> PositionEvent {
        self.state = PositionState::Flat;
        let held = at - position.opened_at;

        tracing::info!(
            action = "closed",
            position_id = %position.id,
            symbol = %self.config.symbol(),
            side = position.side.as_str(),
            reason = reason.as_str(),
            entry_price = position.entry_price,
            price,
            change_pct,
            event_time = %at,
            held_secs = held.num_seconds(),
            "Closed position at {price:.2} due to {reason}"
        );

        PositionEvent::Closed {
            id: position.id,
            side: position.side,
            reason,
            entry_price: position.entry_price,
            price,
            change_pct,
            held,
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeDelta;
    use proptest::prelude::*;
    use test_case::test_case;

    use super::*;

    fn config() -> TradeConfig {
        TradeConfig::new("btcusdt", 100.0, 110.0, 2.0, 1.0)
    }

    fn engine_open_at(side: Side, entry: f64) -> PositionEngine {
        let mut engine = PositionEngine::new(config());
        engine.state = PositionState::Open(OpenPosition {
            id: Uuid::new_v4(),
            side,
            entry_price: entry,
            opened_at: Utc::now(),
        });
        engine
    }

    fn close_reason(event: Option<PositionEvent>) -> Option<CloseReason> {
        match event {
            Some(PositionEvent::Closed { reason, .. }) => Some(reason),
            _ => None,
        }
    }

    #[test]
    fn starts_flat() {
        let engine = PositionEngine::new(config());
        assert_eq!(*engine.state(), PositionState::Flat);
    }

    #[test_case(100.05, Some(Side::Long) ; "just above min band")]
    #[test_case(99.95, Some(Side::Long) ; "just below min band")]
    #[test_case(100.0, Some(Side::Long) ; "exactly min band")]
    #[test_case(109.95, Some(Side::Short) ; "just below max band")]
    #[test_case(110.09, Some(Side::Short) ; "just above max band")]
    #[test_case(105.0, None ; "between bands")]
    #[test_case(100.2, None ; "outside min margin")]
    #[test_case(109.8, None ; "outside max margin")]
    fn entry_band_touch(price: f64, expected: Option<Side>) {
        let mut engine = PositionEngine::new(config());
        let event = engine.on_price(price);

        assert_eq!(engine.state().side(), expected);
        match expected {
            Some(side) => {
                assert_eq!(engine.state().entry_price(), Some(price));
                assert!(matches!(
                    event,
                    Some(PositionEvent::Opened { side: s, price: p, .. }) if s == side && p == price
                ));
            }
            None => assert!(event.is_none()),
        }
    }

    #[test]
    fn overlapping_bands_prefer_long() {
        let mut engine = PositionEngine::new(TradeConfig::new("x", 100.0, 100.15, 2.0, 1.0));
        engine.on_price(100.08);
        assert_eq!(engine.state().side(), Some(Side::Long));
    }

    #[test_case(Side::Long, 102.0, Some(CloseReason::TakeProfit) ; "long take profit at threshold")]
    #[test_case(Side::Long, 105.0, Some(CloseReason::TakeProfit) ; "long take profit beyond")]
    #[test_case(Side::Long, 99.0, Some(CloseReason::StopLoss) ; "long stop loss at threshold")]
    #[test_case(Side::Long, 90.0, Some(CloseReason::StopLoss) ; "long stop loss beyond")]
    #[test_case(Side::Long, 101.5, None ; "long between thresholds")]
    #[test_case(Side::Short, 98.0, Some(CloseReason::TakeProfit) ; "short take profit at threshold")]
    #[test_case(Side::Short, 101.0, Some(CloseReason::StopLoss) ; "short stop loss at threshold")]
    #[test_case(Side::Short, 99.5, None ; "short between thresholds")]
    fn exit_thresholds(side: Side, price: f64, expected: Option<CloseReason>) {
        let mut engine = engine_open_at(side, 100.0);
        let event = engine.on_price(price);

        assert_eq!(close_reason(event), expected);
        assert_eq!(engine.state().is_open(), expected.is_none());
    }

    #[test]
    fn take_profit_wins_when_both_thresholds_cross() {
        // Negative stop loss puts the stop above entry so one tick crosses both.
        let mut engine = PositionEngine::new(TradeConfig::new("x", 100.0, 110.0, 2.0, -5.0));
        engine.on_price(100.0);
        let event = engine.on_price(103.0);
        assert_eq!(close_reason(event), Some(CloseReason::TakeProfit));
    }

    #[test]
    fn open_position_ignores_entry_bands() {
        let mut engine = engine_open_at(Side::Long, 100.0);
        assert!(engine.on_price(100.05).is_none());
        assert!(engine.on_price(99.95).is_none());
        assert_eq!(engine.state().side(), Some(Side::Long));
        assert_eq!(engine.state().entry_price(), Some(100.0));
    }

    #[test]
    fn closed_event_carries_position_details() {
        let mut engine = PositionEngine::new(config());
        let Some(PositionEvent::Opened { id: opened_id, .. }) = engine.on_price(100.0) else {
            panic!("expected open");
        };

        let event = engine.on_price(102.0);
        let Some(PositionEvent::Closed {
            id,
            side,
            entry_price,
            price,
            change_pct,
            ..
        }) = event
        else {
            panic!("expected close");
        };
        assert_eq!(id, opened_id);
        assert_eq!(side, Side::Long);
        assert_eq!(entry_price, 100.0);
        assert_eq!(price, 102.0);
        assert!((change_pct - 2.0).abs() < 1e-12);
    }

    #[test]
    fn holding_time_follows_tick_event_times() {
        let opened_at = DateTime::from_timestamp_millis(1_700_000_000_000).unwrap();
        let mut engine = PositionEngine::new(config());

        engine.on_tick(PriceTick {
            price: 100.0,
            event_time: Some(opened_at),
        });
        assert!(matches!(
            engine.state(),
            PositionState::Open(position) if position.opened_at == opened_at
        ));

        let event = engine.on_tick(PriceTick {
            price: 102.5,
            event_time: Some(opened_at + TimeDelta::seconds(90)),
        });
        assert!(matches!(
            event,
            Some(PositionEvent::Closed { held, .. }) if held == TimeDelta::seconds(90)
        ));
    }

    #[test]
    fn worked_example_sequence() {
        let mut engine = PositionEngine::new(config());

        engine.on_price(100.05);
        assert_eq!(engine.state().side(), Some(Side::Long));
        assert_eq!(engine.state().entry_price(), Some(100.05));

        let event = engine.on_price(102.06);
        assert_eq!(close_reason(event), Some(CloseReason::TakeProfit));
        assert_eq!(*engine.state(), PositionState::Flat);

        engine.on_price(109.95);
        assert_eq!(engine.state().side(), Some(Side::Short));
        assert_eq!(engine.state().entry_price(), Some(109.95));

        let event = engine.on_price(111.05);
        assert_eq!(close_reason(event), Some(CloseReason::StopLoss));
        assert_eq!(*engine.state(), PositionState::Flat);
    }

    #[test]
    fn reopens_after_close() {
        let mut engine = PositionEngine::new(config());
        engine.on_price(100.0);
        engine.on_price(99.0);
        assert!(!engine.state().is_open());

        engine.on_price(105.0);
        assert!(!engine.state().is_open());

        engine.on_price(100.02);
        assert_eq!(engine.state().side(), Some(Side::Long));
        assert_eq!(engine.state().entry_price(), Some(100.02));
    }

    proptest! {
        #[test]
        fn ticks_near_min_band_open_long(
            min in 1.0f64..10_000.0,
            gap in 1.0f64..1_000.0,
            offset in -0.099f64..0.099,
        ) {
            let mut engine = PositionEngine::new(TradeConfig::new("x", min, min + gap, 2.0, 1.0));
            engine.on_price(min + offset);
            prop_assert_eq!(engine.state().side(), Some(Side::Long));
        }

        #[test]
        fn ticks_near_max_band_open_short(
            min in 1.0f64..10_000.0,
            gap in 1.0f64..1_000.0,
            offset in -0.099f64..0.099,
        ) {
            let max = min + gap;
            let mut engine = PositionEngine::new(TradeConfig::new("x", min, max, 2.0, 1.0));
            engine.on_price(max + offset);
            prop_assert_eq!(engine.state().side(), Some(Side::Short));
        }

        #[test]
        fn ticks_away_from_bands_stay_flat(
            min in 1.0f64..10_000.0,
            gap in 1.0f64..1_000.0,
            fraction in 0.0f64..1.0,
        ) {
            let max = min + gap;
            let price = (min + 0.11) + fraction * (gap - 0.22);
            let mut engine = PositionEngine::new(TradeConfig::new("x", min, max, 2.0, 1.0));
            prop_assert!(engine.on_price(price).is_none());
            prop_assert!(!engine.state().is_open());
        }

        #[test]
        fn long_exits_at_thresholds(
            entry in 1.0f64..10_000.0,
            take_profit in 0.1f64..20.0,
            stop_loss in 0.1f64..20.0,
        ) {
            let nudge = 1.0 + 1e-9;
            let config = TradeConfig::new("x", entry, entry + 1_000.0, take_profit, stop_loss);

            let mut engine = PositionEngine::new(config.clone());
            engine.on_price(entry);
            let event = engine.on_price(entry * (1.0 + take_profit / 100.0) * nudge);
            prop_assert_eq!(close_reason(event), Some(CloseReason::TakeProfit));

            let mut engine = PositionEngine::new(config.clone());
            engine.on_price(entry);
            let event = engine.on_price(entry * (1.0 - stop_loss / 100.0) / nudge);
            prop_assert_eq!(close_reason(event), Some(CloseReason::StopLoss));

            let mut engine = PositionEngine::new(config);
            engine.on_price(entry);
            let inside = entry * (1.0 + (take_profit - stop_loss) / 200.0);
            prop_assert!(engine.on_price(inside).is_none());
            prop_assert!(engine.state().is_open());
        }

        #[test]
        fn short_exits_at_thresholds(
            entry in 1_000.0f64..10_000.0,
            take_profit in 0.1f64..20.0,
            stop_loss in 0.1f64..20.0,
        ) {
            let nudge = 1.0 + 1e-9;
            let config = TradeConfig::new("x", 1.0, entry, take_profit, stop_loss);

            let mut engine = PositionEngine::new(config.clone());
            engine.on_price(entry);
            let event = engine.on_price(entry * (1.0 - take_profit / 100.0) / nudge);
            prop_assert_eq!(close_reason(event), Some(CloseReason::TakeProfit));

            let mut engine = PositionEngine::new(config);
            engine.on_price(entry);
            let event = engine.on_price(entry * (1.0 + stop_loss / 100.0) * nudge);
            prop_assert_eq!(close_reason(event), Some(CloseReason::StopLoss));
        }
    }
}
