//! Loading indicator.
//!
//! The controller reports every page request it sends and how it ended.
//! Indicators render that as a busy state for the result area; all output
//! goes to stderr so stdout stays parseable.

use clap::ValueEnum;
use std::io::Write;
use std::time::Duration;

use crate::controller::FetchOutcome;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LoadEvent {
    /// A page request was sent; the result area is busy.
    Started { query: String, page: u32 },
    /// The request settled after `elapsed`.
    Finished {
        page: u32,
        outcome: FetchOutcome,
        elapsed: Duration,
    },
}

pub trait LoadingIndicator: Send + Sync {
    fn report(&self, event: LoadEvent);
}

/// Human summary of a settled request, e.g.
/// `page 2: 5 items in 312ms, end of results`.
pub fn summarize(page: u32, outcome: &FetchOutcome, elapsed: Duration) -> String {
    let took = format_elapsed(elapsed);
    match outcome {
        FetchOutcome::Loaded {
            items, has_more, ..
        } => {
            let noun = if *items == 1 { "item" } else { "items" };
            let tail = if *has_more {
                "more available"
            } else {
                "end of results"
            };
            format!("page {}: {} {} in {}, {}", page, items, noun, took, tail)
        }
        FetchOutcome::NoResults => format!("page {}: no results ({})", page, took),
        FetchOutcome::Failed { .. } => format!("page {}: failed after {}", page, took),
        FetchOutcome::Stale => format!("page {}: superseded by a newer search", page),
        FetchOutcome::Skipped { .. } => format!("page {}: not requested", page),
    }
}

fn format_elapsed(elapsed: Duration) -> String {
    if elapsed < Duration::from_secs(1) {
        format!("{}ms", elapsed.as_millis())
    } else {
        format!("{:.1}s", elapsed.as_secs_f64())
    }
}

/// Status lines for a terminal.
pub struct StderrIndicator;

impl LoadingIndicator for StderrIndicator {
    fn report(&self, event: LoadEvent) {
        let line = match event {
            LoadEvent::Started { query, page } if page == 1 => {
                format!("searching \"{}\"...", query)
            }
            LoadEvent::Started { query, page } => {
                format!("loading page {} of \"{}\"...", page, query)
            }
            LoadEvent::Finished {
                page,
                outcome,
                elapsed,
            } => summarize(page, &outcome, elapsed),
        };
        let mut stderr = std::io::stderr().lock();
        let _ = writeln!(stderr, "{}", line);
    }
}

/// One JSON object per event, for wrapping UIs.
pub struct JsonIndicator;

impl LoadingIndicator for JsonIndicator {
    fn report(&self, event: LoadEvent) {
        let obj = match event {
            LoadEvent::Started { query, page } => serde_json::json!({
                "event": "loading",
                "query": query,
                "page": page,
            }),
            LoadEvent::Finished {
                page,
                outcome,
                elapsed,
            } => serde_json::json!({
                "event": "settled",
                "page": page,
                "elapsed_ms": elapsed.as_millis() as u64,
                "result": outcome,
            }),
        };
        let mut stderr = std::io::stderr().lock();
        let _ = writeln!(stderr, "{}", obj);
    }
}

pub struct NoIndicator;

impl LoadingIndicator for NoIndicator {
    fn report(&self, _event: LoadEvent) {}
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum IndicatorMode {
    Off,
    Human,
    Json,
}

impl IndicatorMode {
    /// Human lines when stderr is a terminal, nothing otherwise.
    pub fn default_for_tty() -> Self {
        if atty::is(atty::Stream::Stderr) {
            IndicatorMode::Human
        } else {
            IndicatorMode::Off
        }
    }

    pub fn indicator(self) -> Box<dyn LoadingIndicator> {
        match self {
            IndicatorMode::Off => Box::new(NoIndicator),
            IndicatorMode::Human => Box::new(StderrIndicator),
            IndicatorMode::Json => Box::new(JsonIndicator),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::SkipReason;

    #[test]
    fn loaded_summary_counts_items() {
        let outcome = FetchOutcome::Loaded {
            page: 2,
            items: 5,
            has_more: false,
        };
        assert_eq!(
            summarize(2, &outcome, Duration::from_millis(312)),
            "page 2: 5 items in 312ms, end of results"
        );

        let outcome = FetchOutcome::Loaded {
            page: 1,
            items: 1,
            has_more: true,
        };
        assert_eq!(
            summarize(1, &outcome, Duration::from_millis(2500)),
            "page 1: 1 item in 2.5s, more available"
        );
    }

    #[test]
    fn other_outcomes() {
        let failed = FetchOutcome::Failed {
            notice: "x".to_string(),
        };
        assert_eq!(
            summarize(1, &failed, Duration::from_secs(10)),
            "page 1: failed after 10.0s"
        );
        assert_eq!(
            summarize(1, &FetchOutcome::NoResults, Duration::from_millis(40)),
            "page 1: no results (40ms)"
        );
        let skipped = FetchOutcome::Skipped {
            reason: SkipReason::InFlight,
        };
        assert_eq!(
            summarize(3, &skipped, Duration::ZERO),
            "page 3: not requested"
        );
    }

    #[test]
    fn modes_parse_from_cli_values() {
        assert_eq!(
            IndicatorMode::from_str("json", true),
            Ok(IndicatorMode::Json)
        );
        assert!(IndicatorMode::from_str("loud", true).is_err());
    }
}
