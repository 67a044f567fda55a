//! Infrastructure Layer - Adapters and external integrations.
//!
//! Concrete implementations of the application ports plus the ambient
//! concerns (configuration, tracing, metrics).

/// Binance WebSocket stream adapter and JSON codec.
pub mod binance;

/// Interactive trade setup and feed settings.
pub mod config;

/// Prometheus metrics instrumentation.
pub mod metrics;

/// Tracing subscriber and OpenTelemetry integration.
pub mod telemetry;
