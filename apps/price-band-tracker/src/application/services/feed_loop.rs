//! Feed Loop
//!
//! Drives the pipeline: read one raw message, decode it, hand the price to
//! the position engine. Transport failures are absorbed here: the loop logs,
//! waits for the reconnect policy's delay, re-establishes the connection and
//! carries on. Only the very first connection attempt is allowed to fail the
//! process.

use std::time::Duration;

use super::reconnect::{ReconnectConfig, ReconnectPolicy};
use crate::application::ports::{FeedError, MessageDecoder, PriceFeedPort};
use crate::domain::position::{PositionEngine, PositionEvent};
use crate::infrastructure::metrics;

/// Result of a single loop iteration.
#[derive(Debug, Clone, PartialEq)]
pub enum StepOutcome {
    /// A price was decoded and evaluated, possibly producing a transition.
    Processed(Option<PositionEvent>),
    /// The message could not be decoded and was dropped.
    Dropped,
    /// The read failed; the loop backed off and will reconnect.
    ReadFailed,
    /// The connection was re-established.
    Reconnected,
    /// Re-establishing the connection failed; the loop backed off.
    ReconnectFailed,
}

/// Owns the feed connection and the position engine.
///
/// Everything runs on the caller's task, so ticks are evaluated strictly
/// one at a time.
pub struct FeedLoop<F, D> {
    feed: F,
    decoder: D,
    engine: PositionEngine,
    policy: ReconnectPolicy,
    reconnect_pending: bool,
}

impl<F, D> FeedLoop<F, D>
where
    F: PriceFeedPort,
    D: MessageDecoder,
{
    /// Create a new feed loop. No connection is made until [`Self::connect`]
    /// or [`Self::run`].
    #[must_use]
    pub fn new(feed: F, decoder: D, engine: PositionEngine, reconnect: ReconnectConfig) -> Self {
        Self {
            feed,
            decoder,
            engine,
            policy: ReconnectPolicy::new(reconnect),
            reconnect_pending: false,
        }
    }

    /// The position engine.
    #[must_use]
    pub const fn engine(&self) -> &PositionEngine {
        &self.engine
    }

    /// The reconnect policy.
    #[must_use]
    pub const fn policy(&self) -> &ReconnectPolicy {
        &self.policy
    }

    /// The underlying feed.
    #[must_use]
    pub const fn feed(&self) -> &F {
        &self.feed
    }

    /// Establish the initial connection.
    ///
    /// # Errors
    ///
    /// Returns the feed error unchanged; callers treat it as fatal.
    #[tracing::instrument(skip(self), fields(endpoint = %self.feed.endpoint()))]
    pub async fn connect(&mut self) -> Result<(), FeedError> {
        tracing::info!("Connecting to price feed");
        self.feed.connect().await?;
        metrics::set_feed_connected(true);
        tracing::info!("Connected to price feed");
        Ok(())
    }

    /// Connect, then process messages forever.
    ///
    /// Only returns if the initial connection fails.
    ///
    /// # Errors
    ///
    /// Returns the error from the initial connection attempt.
    pub async fn run(mut self) -> Result<(), FeedError> {
        self.connect().await?;

        loop {
            self.step().await;
        }
    }

    /// Run one iteration: a pending reconnect, or one read.
    #[tracing::instrument(skip_all, fields(reconnect_pending = self.reconnect_pending))]
    pub async fn step(&mut self) -> StepOutcome {
        if self.reconnect_pending {
            return self.reconnect().await;
        }

        match self.feed.next_message().await {
            Ok(raw) => self.handle_message(&raw),
            Err(e) => {
                tracing::error!(error = %e, "Read error");
                metrics::record_read_error();
                metrics::set_feed_connected(false);
                self.reconnect_pending = true;
                self.back_off().await;
                StepOutcome::ReadFailed
            }
        }
    }

    fn handle_message(&mut self, raw: &str) -> StepOutcome {
        match self.decoder.decode(raw) {
            Ok(tick) => {
                metrics::record_tick();
                let event = self.engine.on_tick(tick);
                if let Some(event) = &event {
                    metrics::record_position_event(event);
                }
                StepOutcome::Processed(event)
            }
            Err(e) => {
                tracing::error!(error = %e, "Dropping undecodable message");
                metrics::record_decode_error();
                StepOutcome::Dropped
            }
        }
    }

    #[tracing::instrument(
        skip(self),
        fields(endpoint = %self.feed.endpoint(), attempt = self.policy.attempt_count())
    )]
    async fn reconnect(&mut self) -> StepOutcome {
        metrics::record_reconnect();
        tracing::info!("Reconnecting to price feed");

        match self.feed.connect().await {
            Ok(()) => {
                tracing::info!(
                    failed_attempts = self.policy.attempt_count(),
                    "Reconnected to price feed"
                );
                self.policy.reset();
                self.reconnect_pending = false;
                metrics::set_feed_connected(true);
                StepOutcome::Reconnected
            }
            Err(e) => {
                tracing::error!(error = %e, "Reconnect failed");
                self.back_off().await;
                StepOutcome::ReconnectFailed
            }
        }
    }

    async fn back_off(&mut self) {
        let delay: Duration = self.policy.next_delay();
        tracing::info!(
            attempt = self.policy.attempt_count(),
            delay_ms = delay.as_millis(),
            "Backing off before reconnect"
        );
        tokio::time::sleep(delay).await;
    }
}
