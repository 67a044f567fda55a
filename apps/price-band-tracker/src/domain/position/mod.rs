//! Position tracking: configuration, state, and the band/threshold engine.

mod engine;
mod types;

pub use engine::{ENTRY_MARGIN, PositionEngine};
pub use types::{
    CloseReason, OpenPosition, PositionEvent, PositionState, PriceTick, Side, TradeConfig,
};
