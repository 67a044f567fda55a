//! Stream Codec
//!
//! JSON decoding for Binance raw streams. Each WebSocket text frame carries
//! exactly one event object. The price is taken from the trade field `p`
//! when present, otherwise from the kline close `k.c`.

use chrono::DateTime;
use serde_json::Value;

use super::messages::{KlineMessage, MarketMessage, TradeMessage};
use crate::application::ports::{DecodeError, MessageDecoder};
use crate::domain::position::PriceTick;

/// JSON codec for Binance raw streams.
#[derive(Debug, Default, Clone)]
pub struct JsonCodec;

impl JsonCodec {
    /// Create a new JSON codec.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Decode a text frame into a typed market message.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not a JSON object or carries no
    /// string price field.
    pub fn decode_message(&self, text: &str) -> Result<MarketMessage, DecodeError> {
        let value: Value = serde_json::from_str(text.trim())?;

        if !value.is_object() {
            return Err(DecodeError::InvalidFormat(format!(
                "expected JSON object, got: {}",
                truncate(&value.to_string())
            )));
        }

        if let Some(price) = value.get("p") {
            ensure_string(price)?;
            let trade: TradeMessage = serde_json::from_value(value)?;
            return Ok(MarketMessage::Trade(trade));
        }

        if let Some(close) = value.get("k").and_then(|k| k.get("c")) {
            ensure_string(close)?;
            let kline: KlineMessage = serde_json::from_value(value)?;
            return Ok(MarketMessage::Kline(kline));
        }

        Err(DecodeError::MissingPrice)
    }
}

impl MessageDecoder for JsonCodec {
    fn decode(&self, raw: &str) -> Result<PriceTick, DecodeError> {
        let message = self.decode_message(raw)?;
        let price = parse_price(message.price())?;
        let event_time = message
            .event_time()
            .and_then(DateTime::from_timestamp_millis);

        Ok(PriceTick { price, event_time })
    }
}

/// Parse a decimal string into a finite, positive price.
fn parse_price(text: &str) -> Result<f64, DecodeError> {
    let price: f64 = text
        .trim()
        .parse()
        .map_err(|e| DecodeError::InvalidPrice(format!("{text:?}: {e}")))?;

    if !price.is_finite() || price <= 0.0 {
        return Err(DecodeError::InvalidPrice(format!(
            "{text:?} is not a positive finite number"
        )));
    }

    Ok(price)
}

fn ensure_string(value: &Value) -> Result<(), DecodeError> {
    if value.is_string() {
        Ok(())
    } else {
        Err(DecodeError::InvalidPrice(format!(
            "expected decimal string, got: {}",
            truncate(&value.to_string())
        )))
    }
}

fn truncate(text: &str) -> &str {
    let end = text
        .char_indices()
        .nth(50)
        .map_or(text.len(), |(idx, _)| idx);
    &text[..end]
}
