mod pipe;

use std::io;

use clap::{Parser, ValueEnum};
use throttle::{MonotonicClock, SystemClock, ThrottleConfig};

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("i/o failed: {0}")]
    Io(#[from] io::Error),
    #[error("invalid throttle configuration: {0}")]
    Throttle(#[from] throttle::ThrottleError),
    #[error("line {line}: expected `<ms>\\t<payload>`, got {content:?}")]
    MalformedReplayLine { line: usize, content: String },
    #[error("failed to encode summary: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Parser, Debug)]
#[command(name = "throttle-cli", about = "Forward stdin lines to stdout, dropping any that arrive too soon")]
struct Cli {
    /// Minimum milliseconds between forwarded lines. When absent,
    /// `THROTTLE_MIN_INTERVAL_MS` is read, then the 250ms default.
    #[arg(long, allow_negative_numbers = true)]
    interval_ms: Option<i64>,

    /// Time source for live input.
    #[arg(long, value_enum, default_value_t = ClockKind::Monotonic)]
    clock: ClockKind,

    /// Treat each line as `<ms>\t<payload>` and admit by the recorded time.
    #[arg(long)]
    replay: bool,

    /// Print admitted/suppressed totals as JSON to stderr at end of input.
    #[arg(long)]
    summary: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum ClockKind {
    System,
    Monotonic,
}

fn main() -> Result<(), CliError> {
    tracing_subscriber::fmt().with_writer(io::stderr).init();

    let cli = Cli::parse();
    let config = resolve_config(cli.interval_ms)?;
    tracing::info!(
        min_interval = ?config.min_interval,
        replay = cli.replay,
        clock = ?cli.clock,
        "throttle-cli starting"
    );

    let input = io::stdin().lock();
    let mut output = io::stdout().lock();
    let summary = if cli.replay {
        pipe::run_replay(input, &mut output, config)?
    } else {
        match cli.clock {
            ClockKind::System => pipe::run_live(input, &mut output, config, SystemClock)?,
            ClockKind::Monotonic => pipe::run_live(input, &mut output, config, MonotonicClock::new())?,
        }
    };

    if cli.summary {
        eprintln!("{}", serde_json::to_string(&summary)?);
    }
    Ok(())
}

/// The flag wins; otherwise the environment is validated by the library.
fn resolve_config(interval_ms: Option<i64>) -> Result<ThrottleConfig, CliError> {
    let config = match interval_ms {
        Some(ms) => ThrottleConfig::from_millis(ms)?,
        None => ThrottleConfig::from_env()?,
    };
    Ok(config)
}

#[cfg(test)]
#[path = "main_test.rs"]
mod tests;
