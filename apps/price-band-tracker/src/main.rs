//! Price Band Tracker Binary
//!
//! Prompts for the trade setup on stdin, then follows the symbol's 15-minute
//! kline stream until the process is stopped.
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin price-band-tracker
//! ```
//!
//! # Environment Variables
//!
//! All optional; trading parameters are only ever entered at the prompt.
//!
//! - `BINANCE_WS_BASE_URL`: stream endpoint (default: wss://stream.binance.com:9443/ws)
//! - `FEED_RECONNECT_DELAY_SECS`: backoff after a failure (default: 3)
//! - `FEED_RECONNECT_DELAY_MAX_SECS`: backoff cap (default: 3)
//! - `FEED_RECONNECT_MULTIPLIER`: backoff growth (default: 1.0)
//! - `FEED_RECONNECT_JITTER`: random spread per delay, 0 to 1 (default: 0)
//! - `OTEL_ENABLED`: export spans over OTLP (default: false)
//! - `RUST_LOG`: log level (default: info)

use anyhow::Context;
use price_band_tracker::infrastructure::telemetry;
use price_band_tracker::{
    BinanceClientConfig, BinanceStreamClient, FeedLoop, FeedSettings, JsonCodec, PositionEngine,
    ReconnectConfig, TradeConfig, init_metrics, prompt_trade_config, render_metrics,
};
use tokio::signal;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    rustls::crypto::ring::default_provider()
        .install_default()
        .map_err(|_| anyhow::anyhow!("failed to install rustls crypto provider"))?;

    load_dotenv();

    let telemetry_guard = telemetry::init();

    tracing::info!(
        otlp_export = telemetry_guard.is_exporting(),
        "Starting Price Band Tracker"
    );

    let _metrics_handle = init_metrics().context("failed to install metrics recorder")?;

    let trade_config = read_trade_config()?;
    let settings = FeedSettings::from_env();
    log_config(&trade_config, &settings);

    let client = BinanceStreamClient::new(BinanceClientConfig::kline(
        &settings,
        trade_config.symbol(),
    ));
    let feed_loop = FeedLoop::new(
        client,
        JsonCodec::new(),
        PositionEngine::new(trade_config),
        ReconnectConfig::from_feed_settings(&settings),
    );

    tokio::select! {
        result = feed_loop.run() => {
            result.context("price feed connection failed")?;
        }
        () = await_ctrl_c() => {
            tracing::info!("Received Ctrl+C, stopping");
            if let Some(snapshot) = render_metrics() {
                tracing::info!(metrics = %snapshot, "Final metrics");
            }
        }
    }

    Ok(())
}

/// Run the setup prompt against the terminal.
fn read_trade_config() -> anyhow::Result<TradeConfig> {
    let stdin = std::io::stdin();
    let mut input = stdin.lock();
    let mut output = std::io::stdout();

    prompt_trade_config(&mut input, &mut output)
        .inspect_err(|e| tracing::error!(error = %e, "Invalid setup input"))
        .context("invalid trade configuration")
}

/// Log the parsed configuration.
fn log_config(trade: &TradeConfig, settings: &FeedSettings) {
    tracing::info!(
        symbol = trade.symbol(),
        min_price = trade.min_price(),
        max_price = trade.max_price(),
        take_profit_pct = trade.take_profit_pct(),
        stop_loss_pct = trade.stop_loss_pct(),
        "Trade configuration loaded"
    );
    tracing::debug!(
        stream_url = %settings.stream_url(trade.symbol()),
        reconnect_delay_ms = settings.reconnect_delay_initial.as_millis(),
        "Feed settings"
    );
}

/// Load .env file from current directory or any ancestor directory.
fn load_dotenv() {
    if dotenvy::dotenv().is_ok() {
        return;
    }

    if let Ok(cwd) = std::env::current_dir() {
        let mut dir = cwd.as_path();
        while let Some(parent) = dir.parent() {
            let env_path = parent.join(".env");
            if env_path.exists() {
                let _ = dotenvy::from_path(&env_path);
                return;
            }
            dir = parent;
        }
    }
}

/// Resolve on Ctrl+C. If the handler cannot be installed, never resolves.
async fn await_ctrl_c() {
    if let Err(e) = signal::ctrl_c().await {
        tracing::warn!(error = %e, "Ctrl+C handler unavailable");
        std::future::pending::<()>().await;
    }
}
