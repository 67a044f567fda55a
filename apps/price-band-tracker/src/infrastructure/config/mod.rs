//! Configuration Module
//!
//! Interactive trade setup and ambient feed settings.

mod prompt;
mod settings;

pub use prompt::{ConfigError, prompt_trade_config};
pub use settings::{DEFAULT_BASE_URL, FeedSettings, KLINE_INTERVAL};
