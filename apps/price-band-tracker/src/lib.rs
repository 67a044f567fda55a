#![cfg_attr(
    test,
    allow(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::float_cmp,
        clippy::panic,
        clippy::too_many_lines,
        clippy::items_after_statements
    )
)]

//! Price Band Tracker
//!
//! Watches one symbol's live price stream, opens a simulated long position
//! when price touches the lower entry band or a short position when it
//! touches the upper band, and closes the position on a take-profit or
//! stop-loss percentage move. No orders are placed; every transition is a
//! log line.
//!
//! # Layers (inside → outside)
//!
//! - **Domain**: the position engine and trading types
//! - **Application**: feed/decoder ports, the feed loop, the reconnect policy
//! - **Infrastructure**: Binance WebSocket client, JSON codec, setup prompt,
//!   settings, tracing, metrics
//!
//! # Data Flow
//!
//! ```text
//! Binance WS ──► FeedLoop ──► JsonCodec ──► PriceTick ──► PositionEngine
//!                   │                                        │
//!                   └── ReconnectPolicy                      └── log + metrics
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::pedantic)]

// =============================================================================
// Module Declarations
// =============================================================================

/// Domain layer - Position state machine with no I/O.
pub mod domain;

/// Application layer - Ports and the feed loop.
pub mod application;

/// Infrastructure layer - Adapters and ambient concerns.
pub mod infrastructure;

// =============================================================================
// Re-exports
// =============================================================================

// Domain types
pub use domain::position::{
    CloseReason, ENTRY_MARGIN, OpenPosition, PositionEngine, PositionEvent, PositionState,
    PriceTick, Side, TradeConfig,
};

// Ports and services
pub use application::ports::{DecodeError, FeedError, MessageDecoder, PriceFeedPort};
pub use application::services::{FeedLoop, ReconnectConfig, ReconnectPolicy, StepOutcome};

// Binance adapter
pub use infrastructure::binance::{BinanceClientConfig, BinanceStreamClient, JsonCodec};

// Configuration
pub use infrastructure::config::{ConfigError, FeedSettings, prompt_trade_config};

// Metrics
pub use infrastructure::metrics::{init_metrics, render_metrics};

// Telemetry
pub use infrastructure::telemetry::{TelemetryConfig, TelemetryGuard, init as init_telemetry};
