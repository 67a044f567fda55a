//! Binance WebSocket Message Types
//!
//! Wire format types for the public raw streams. Only the price and the
//! event time are mapped. Every other field in the payload is ignored, so a
//! change in an unrelated field's type never costs a price.
//!
//! # References
//!
//! - [WebSocket Streams](https://developers.binance.com/docs/binance-spot-api-docs/web-socket-streams)

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Trade or aggregate-trade event.
///
/// # Wire Format (JSON)
/// ```json
/// {"e":"trade","E":1672515782136,"s":"BNBBTC","t":12345,"p":"0.001","q":"100","T":1672515782136,"m":true,"M":true}
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradeMessage {
    /// Event time in milliseconds since the epoch.
    #[serde(rename = "E", default, deserialize_with = "lenient_millis")]
    pub event_time: Option<i64>,

    /// Trade price as a decimal string.
    #[serde(rename = "p")]
    pub price: String,
}

/// Kline (candlestick) event.
///
/// # Wire Format (JSON)
/// ```json
/// {"e":"kline","E":1672515782136,"s":"BNBBTC","k":{"t":1672515780000,"T":1672515839999,
///  "s":"BNBBTC","i":"15m","o":"0.0010","c":"0.0020","h":"0.0025","l":"0.0015","v":"1000","x":false}}
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KlineMessage {
    /// Event time in milliseconds since the epoch.
    #[serde(rename = "E", default, deserialize_with = "lenient_millis")]
    pub event_time: Option<i64>,

    /// Candle payload.
    #[serde(rename = "k")]
    pub kline: Kline,
}

/// Candle fields of a kline event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Kline {
    /// Latest (close) price; updated on every trade while the candle is open.
    #[serde(rename = "c")]
    pub close: String,
}

/// A decoded price-bearing message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MarketMessage {
    /// Trade or aggregate-trade event.
    Trade(TradeMessage),
    /// Kline event.
    Kline(KlineMessage),
}

impl MarketMessage {
    /// The raw decimal price string.
    #[must_use]
    pub fn price(&self) -> &str {
        match self {
            Self::Trade(trade) => &trade.price,
            Self::Kline(kline) => &kline.kline.close,
        }
    }

    /// Event time in milliseconds, if present.
    #[must_use]
    pub const fn event_time(&self) -> Option<i64> {
        match self {
            Self::Trade(trade) => trade.event_time,
            Self::Kline(kline) => kline.event_time,
        }
    }
}

/// Integer milliseconds, or `None` for anything else.
fn lenient_millis<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Value::deserialize(deserializer)?.as_i64())
}
