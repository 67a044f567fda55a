//! Application Services
//!
//! - `FeedLoop`: connection lifecycle and the read, decode, evaluate cycle
//! - `ReconnectPolicy`: backoff schedule between transport failures

mod feed_loop;
mod reconnect;

pub use feed_loop::{FeedLoop, StepOutcome};
pub use reconnect::{ReconnectConfig, ReconnectPolicy};
