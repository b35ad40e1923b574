//! Live progress line on stderr while a check runs.

use relcheck_core::progress::{format_bytes, ProgressStats, ProgressTracker};
use std::io::{IsTerminal, Write};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

const PROGRESS_INTERVAL_MS: u64 = 500;

/// Prints the tracker every 500 ms until finished or cancelled. Prints
/// nothing when stderr is not a terminal.
pub fn spawn_printer(tracker: Arc<ProgressTracker>) -> JoinHandle<()> {
    tokio::spawn(async move {
        if !std::io::stderr().is_terminal() {
            return;
        }
        let mut interval = tokio::time::interval(Duration::from_millis(PROGRESS_INTERVAL_MS));
        loop {
            interval.tick().await;
            if tracker.is_finished() || tracker.is_cancelled() {
                break;
            }
            let stats = tracker.snapshot();
            if stats.total_bytes > 0 {
                eprint!("\r  {}  ", render(&stats));
                let _ = std::io::stderr().flush();
            }
        }
    })
}

/// Final line once the check has returned.
pub fn print_final(tracker: &ProgressTracker) {
    let stats = tracker.snapshot();
    if stats.total_bytes == 0 || !std::io::stderr().is_terminal() {
        return;
    }
    eprintln!("\r  {}  ", render(&stats));
}

fn render(stats: &ProgressStats) -> String {
    let eta = stats
        .eta_secs()
        .map(|s| format!("{:.0}s", s))
        .unwrap_or_else(|| "?".to_string());
    format!(
        "{} / {} ({:.1}%)  {}/s  ETA {}",
        format_bytes(stats.bytes_done),
        format_bytes(stats.total_bytes),
        stats.fraction() * 100.0,
        format_bytes(stats.bytes_per_sec() as u64),
        eta
    )
}
