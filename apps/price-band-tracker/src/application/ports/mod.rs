//! Port Interfaces
//!
//! Contracts between the feed loop and the outside world, following the
//! Hexagonal Architecture pattern.
//!
//! ## Driven Ports (Outbound)
//!
//! - `PriceFeedPort`: a reconnectable stream of raw market messages
//! - `MessageDecoder`: turns one raw message into a `PriceTick`

use async_trait::async_trait;

use crate::domain::position::PriceTick;

// =============================================================================
// Errors
// =============================================================================

/// Transport errors reported by a price feed.
#[derive(Debug, thiserror::Error)]
pub enum FeedError {
    /// Connection could not be established.
    #[error("connection failed: {0}")]
    ConnectFailed(String),

    /// Reading from an established connection failed.
    #[error("read failed: {0}")]
    ReadFailed(String),

    /// The server closed the connection or the stream ended.
    #[error("connection closed")]
    ConnectionClosed,

    /// A read was attempted without a connection.
    #[error("not connected")]
    NotConnected,
}

/// Reasons a raw message yields no price.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    /// Payload is not well-formed JSON.
    #[error("JSON codec error: {0}")]
    Json(#[from] serde_json::Error),

    /// Payload is JSON but not an object.
    #[error("invalid message format: {0}")]
    InvalidFormat(String),

    /// Neither a trade price nor a kline close price is present.
    #[error("price field missing")]
    MissingPrice,

    /// Price field present but not a finite, positive decimal string.
    #[error("invalid price: {0}")]
    InvalidPrice(String),
}

// =============================================================================
// Ports
// =============================================================================

/// A persistent, reconnectable source of raw market messages.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PriceFeedPort: Send {
    /// Human-readable endpoint, for logs.
    fn endpoint(&self) -> String;

    /// Establish (or re-establish) the streaming connection.
    ///
    /// Any previous connection is discarded.
    async fn connect(&mut self) -> Result<(), FeedError>;

    /// Wait for the next data message.
    ///
    /// Control frames are handled internally and never returned.
    async fn next_message(&mut self) -> Result<String, FeedError>;
}

/// Converts one raw message into a validated price.
pub trait MessageDecoder: Send {
    /// Decode `raw` into a tick with a finite, positive price.
    ///
    /// # Errors
    ///
    /// Returns a `DecodeError` when the payload is malformed or carries no
    /// usable price.
    fn decode(&self, raw: &str) -> Result<PriceTick, DecodeError>;
}
