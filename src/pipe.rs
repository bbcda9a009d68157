//! Line pipe: forwards admitted input lines to the output.
//!
//! DESIGN
//! ======
//! Every input line is one event. Events go through a [`Throttled`](throttle::Throttled) whose
//! action writes the line out; suppressed events are counted and dropped.
//!
//! Live mode reads time from a real clock. Replay mode expects
//! `<ms>\t<payload>` lines and drives a [`ManualClock`] from the recorded
//! timestamps, so a captured stream always produces the same output.

use std::io::{BufRead, Write};

use serde::Serialize;
use throttle::{Clock, ManualClock, ThrottleConfig};
use tracing::info;

use crate::CliError;

/// Totals printed by `--summary`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub admitted: u64,
    pub suppressed: u64,
}

/// Forward `input` lines to `output` using `clock` for admission times.
pub fn run_live<R, W, C>(input: R, output: &mut W, config: ThrottleConfig, clock: C) -> Result<Summary, CliError>
where
    R: BufRead,
    W: Write,
    C: Clock,
{
    let mut throttled = config.throttle_with_clock(|line: &str| writeln!(output, "{line}"), clock);
    let mut summary = Summary::default();

    for line in input.lines() {
        let line = line?;
        record(&mut summary, throttled.call(line.as_str()))?;
    }

    info!(admitted = summary.admitted, suppressed = summary.suppressed, "input drained");
    Ok(summary)
}

/// Forward `<ms>\t<payload>` lines, admitting by their recorded timestamps.
///
/// Only the payload is written out.
pub fn run_replay<R, W>(input: R, output: &mut W, config: ThrottleConfig) -> Result<Summary, CliError>
where
    R: BufRead,
    W: Write,
{
    let clock = ManualClock::default();
    let mut throttled = config.throttle_with_clock(|payload: &str| writeln!(output, "{payload}"), clock.clone());
    let mut summary = Summary::default();

    for (index, line) in input.lines().enumerate() {
        let line = line?;
        let (ts, payload) = parse_replay_line(index + 1, &line)?;
        clock.set(ts);
        record(&mut summary, throttled.call(payload))?;
    }

    info!(admitted = summary.admitted, suppressed = summary.suppressed, "replay finished");
    Ok(summary)
}

fn record(summary: &mut Summary, outcome: Option<std::io::Result<()>>) -> Result<(), CliError> {
    match outcome {
        Some(written) => {
            written?;
            summary.admitted += 1;
        }
        None => summary.suppressed += 1,
    }
    Ok(())
}

/// Split `<ms>\t<payload>` on the first tab. `line_no` is 1-based.
fn parse_replay_line(line_no: usize, line: &str) -> Result<(i64, &str), CliError> {
    let malformed = || CliError::MalformedReplayLine {
        line: line_no,
        content: line.to_owned(),
    };
    let (ts, payload) = line.split_once('\t').ok_or_else(malformed)?;
    let ts = ts.trim().parse::<i64>().map_err(|_| malformed())?;
    Ok((ts, payload))
}

#[cfg(test)]
#[path = "pipe_test.rs"]
mod tests;
