//! Interactive Setup Prompt
//!
//! Reads the trade configuration line by line. Any invalid answer is fatal;
//! nothing is retried.

use std::io::{BufRead, Write};

use crate::domain::position::TradeConfig;

/// Fatal setup errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A numeric field did not parse as a finite number.
    #[error("invalid number for {field}: {input:?}")]
    InvalidNumber {
        /// Field being read.
        field: &'static str,
        /// Raw answer.
        input: String,
    },
    /// A required text field was blank.
    #[error("{0} cannot be empty")]
    EmptyValue(&'static str),
    /// Input closed before all fields were answered.
    #[error("input ended before {0} was entered")]
    UnexpectedEof(&'static str),
    /// Reading input or writing a prompt failed.
    #[error("setup I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Ask for symbol, min price, max price, take profit % and stop loss %.
///
/// # Errors
///
/// Returns a `ConfigError` on the first blank symbol, non-numeric answer,
/// or closed input.
pub fn prompt_trade_config<R, W>(input: &mut R, output: &mut W) -> Result<TradeConfig, ConfigError>
where
    R: BufRead,
    W: Write,
{
    let symbol = read_answer(input, output, "Symbol (e.g. btcusdt): ", "symbol")?;
    if symbol.is_empty() {
        return Err(ConfigError::EmptyValue("symbol"));
    }

    let min_price = read_number(input, output, "Min Price: ", "min price")?;
    let max_price = read_number(input, output, "Max Price: ", "max price")?;
    let take_profit_pct = read_number(input, output, "Take Profit (%): ", "take profit")?;
    let stop_loss_pct = read_number(input, output, "Stop Loss (%): ", "stop loss")?;

    let config = TradeConfig::new(&symbol, min_price, max_price, take_profit_pct, stop_loss_pct);

    if config.has_inverted_bands() {
        tracing::warn!(min_price, max_price, "Min price is above max price");
    }
    if config.has_non_positive_thresholds() {
        tracing::warn!(
            take_profit_pct,
            stop_loss_pct,
            "Take profit and stop loss are expected to be positive"
        );
    }

    Ok(config)
}

fn read_answer<R, W>(
    input: &mut R,
    output: &mut W,
    prompt: &str,
    field: &'static str,
) -> Result<String, ConfigError>
where
    R: BufRead,
    W: Write,
{
    write!(output, "{prompt}")?;
    output.flush()?;

    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Err(ConfigError::UnexpectedEof(field));
    }
    Ok(line.trim().to_string())
}

fn read_number<R, W>(
    input: &mut R,
    output: &mut W,
    prompt: &str,
    field: &'static str,
) -> Result<f64, ConfigError>
where
    R: BufRead,
    W: Write,
{
    let answer = read_answer(input, output, prompt, field)?;
    answer
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or(ConfigError::InvalidNumber {
            field,
            input: answer,
        })
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use test_case::test_case;

    use super::*;

    fn run(answers: &str) -> (Result<TradeConfig, ConfigError>, String) {
        let mut input = Cursor::new(answers.as_bytes().to_vec());
        let mut output = Vec::new();
        let result = prompt_trade_config(&mut input, &mut output);
        (result, String::from_utf8(output).unwrap())
    }

    #[test]
    fn reads_all_fields_in_order() {
        let (result, prompts) = run("BTCUSDT\n100\n110.5\n2\n1.5\n");
        let config = result.unwrap();

        assert_eq!(config.symbol(), "btcusdt");
        assert_eq!(config.min_price(), 100.0);
        assert_eq!(config.max_price(), 110.5);
        assert_eq!(config.take_profit_pct(), 2.0);
        assert_eq!(config.stop_loss_pct(), 1.5);

        let symbol_at = prompts.find("Symbol").unwrap();
        let min_at = prompts.find("Min Price").unwrap();
        let max_at = prompts.find("Max Price").unwrap();
        let tp_at = prompts.find("Take Profit").unwrap();
        let sl_at = prompts.find("Stop Loss").unwrap();
        assert!(symbol_at < min_at && min_at < max_at && max_at < tp_at && tp_at < sl_at);
    }

    #[test]
    fn tolerates_windows_line_endings() {
        let (result, _) = run("ethusdt\r\n10\r\n20\r\n1\r\n1\r\n");
        assert_eq!(result.unwrap().max_price(), 20.0);
    }

    #[test_case("btcusdt\nabc\n110\n2\n1\n", "min price" ; "min price")]
    #[test_case("btcusdt\n100\n\n2\n1\n", "max price" ; "blank max price")]
    #[test_case("btcusdt\n100\n110\n2%\n1\n", "take profit" ; "take profit with suffix")]
    #[test_case("btcusdt\n100\n110\n2\nNaN\n", "stop loss" ; "not a number")]
    #[test_case("btcusdt\n100\n110\ninf\n1\n", "take profit" ; "infinite")]
    fn invalid_number_is_fatal(answers: &str, expected_field: &str) {
        let (result, _) = run(answers);
        match result {
            Err(ConfigError::InvalidNumber { field, .. }) => assert_eq!(field, expected_field),
            other => panic!("expected InvalidNumber, got {other:?}"),
        }
    }

    #[test]
    fn blank_symbol_is_fatal() {
        let (result, _) = run("  \n100\n110\n2\n1\n");
        assert!(matches!(result, Err(ConfigError::EmptyValue("symbol"))));
    }

    #[test]
    fn closed_input_is_fatal() {
        let (result, _) = run("btcusdt\n100\n");
        assert!(matches!(result, Err(ConfigError::UnexpectedEof("max price"))));
    }

    #[test]
    fn inverted_bands_are_accepted() {
        let (result, _) = run("btcusdt\n110\n100\n2\n1\n");
        assert!(result.unwrap().has_inverted_bands());
    }
}
