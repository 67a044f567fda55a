//! Application Layer - Use cases and port definitions.
//!
//! The feed loop orchestrates the domain engine through the ports that
//! infrastructure adapters implement.

/// Port interfaces for the price feed and message decoding.
pub mod ports;

/// Feed loop and reconnect policy.
pub mod services;
