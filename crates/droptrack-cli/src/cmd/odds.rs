//! `dt odds`: chance of at least one drop in N attempts, without tracking anything.

use crate::cmd::fail;
use crate::output::{OutputMode, pretty_kv, render};
use clap::Args;
use droptrack_core::model::rate::{format_rate, parse_denominator_text};
use droptrack_core::probability::{format_percent, probability_at_least_once};
use serde::Serialize;
use std::io::Write;

#[derive(Args, Debug)]
pub struct OddsArgs {
    /// Rate, as `64` or `1/64`.
    pub rate: String,

    /// Number of attempts.
    pub attempts: u64,
}

#[derive(Debug, Serialize)]
struct OddsResult {
    denominator: u32,
    attempts: u64,
    percent: f64,
    display: String,
}

fn compute(args: &OddsArgs, output: OutputMode) -> anyhow::Result<OddsResult> {
    let denominator = parse_denominator_text(&args.rate).map_err(|e| fail(output, e.into()))?;
    let percent = probability_at_least_once(f64::from(denominator), args.attempts)
        .map_err(|e| fail(output, e))?;
    Ok(OddsResult {
        denominator,
        attempts: args.attempts,
        percent,
        display: format_percent(percent),
    })
}

pub fn run_odds(args: &OddsArgs, output: OutputMode) -> anyhow::Result<()> {
    let result = compute(args, output)?;
    render(output, &result, |r, w| match output {
        OutputMode::Pretty => {
            pretty_kv(w, "rate", format_rate(r.denominator))?;
            pretty_kv(w, "attempts", r.attempts.to_string())?;
            pretty_kv(w, "chance", &r.display)
        }
        _ => writeln!(w, "{}", r.display),
    })
}
