//! Binance Stream Client
//!
//! Connects to a single Binance raw stream, e.g.
//! `wss://stream.binance.com:9443/ws/btcusdt@kline_15m`.
//!
//! Raw streams need no authentication or subscribe message: the stream name
//! in the URL is the subscription. The server pings every few minutes and
//! drops connections that do not answer; pings are answered here and never
//! surface to the caller.

use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};

use crate::application::ports::{FeedError, PriceFeedPort};
use crate::infrastructure::config::FeedSettings;

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

// =============================================================================
// Configuration
// =============================================================================

/// Configuration for the Binance stream client.
#[derive(Debug, Clone)]
pub struct BinanceClientConfig {
    /// Full stream URL.
    pub url: String,
}

impl BinanceClientConfig {
    /// Create a configuration for an explicit URL.
    #[must_use]
    pub const fn new(url: String) -> Self {
        Self { url }
    }

    /// Kline stream for `symbol` at the configured interval.
    #[must_use]
    pub fn kline(settings: &FeedSettings, symbol: &str) -> Self {
        Self::new(settings.stream_url(symbol))
    }
}

// =============================================================================
// Client
// =============================================================================

/// WebSocket client for one Binance raw stream.
pub struct BinanceStreamClient {
    config: BinanceClientConfig,
    stream: Option<WsStream>,
}

impl BinanceStreamClient {
    /// Create a disconnected client.
    #[must_use]
    pub const fn new(config: BinanceClientConfig) -> Self {
        Self {
            config,
            stream: None,
        }
    }

    /// Check if a connection is currently held.
    #[must_use]
    pub const fn is_connected(&self) -> bool {
        self.stream.is_some()
    }
}

#[async_trait]
impl PriceFeedPort for BinanceStreamClient {
    fn endpoint(&self) -> String {
        self.config.url.clone()
    }

    async fn connect(&mut self) -> Result<(), FeedError> {
        if let Some(mut previous) = self.stream.take()
            && let Err(e) = previous.close(None).await
        {
            tracing::debug!(error = %e, "Failed to close previous connection");
        }

        let (ws_stream, response) = tokio_tungstenite::connect_async(self.config.url.as_str())
            .await
            .map_err(|e| FeedError::ConnectFailed(e.to_string()))?;

        tracing::debug!(status = %response.status(), "WebSocket handshake complete");
        self.stream = Some(ws_stream);
        Ok(())
    }

    async fn next_message(&mut self) -> Result<String, FeedError> {
        let Some(stream) = self.stream.as_mut() else {
            return Err(FeedError::NotConnected);
        };

        loop {
            match stream.next().await {
                Some(Ok(Message::Text(text))) => return Ok(text.as_str().to_owned()),
                Some(Ok(Message::Binary(data))) => match String::from_utf8(data.to_vec()) {
                    Ok(text) => return Ok(text),
                    Err(_) => tracing::warn!(len = data.len(), "Ignoring non-UTF-8 binary frame"),
                },
                Some(Ok(Message::Ping(data))) => {
                    if let Err(e) = stream.send(Message::Pong(data)).await {
                        self.stream = None;
                        return Err(FeedError::ReadFailed(format!("failed to send pong: {e}")));
                    }
                }
                Some(Ok(Message::Close(frame))) => {
                    tracing::info!(frame = ?frame, "Server sent close frame");
                    self.stream = None;
                    return Err(FeedError::ConnectionClosed);
                }
                Some(Ok(_)) => {
                    // Pong and raw frames carry no data
                }
                Some(Err(e)) => {
                    self.stream = None;
                    return Err(FeedError::ReadFailed(e.to_string()));
                }
                None => {
                    tracing::info!("WebSocket stream ended");
                    self.stream = None;
                    return Err(FeedError::ConnectionClosed);
                }
            }
        }
    }
}
