//! Binance WebSocket Adapters
//!
//! - **client**: raw-stream WebSocket connection (`PriceFeedPort`)
//! - **codec**: JSON decoding of trade and kline events (`MessageDecoder`)
//! - **messages**: wire format types

pub mod client;
pub mod codec;
pub mod messages;

pub use client::{BinanceClientConfig, BinanceStreamClient};
pub use codec::JsonCodec;
pub use messages::{Kline, KlineMessage, MarketMessage, TradeMessage};
