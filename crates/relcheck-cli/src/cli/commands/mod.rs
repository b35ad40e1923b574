//! CLI command handlers. Each command is in its own file.

mod config;
mod crc;
mod generate;
mod progress;
mod sfv;
mod srr;
mod zip;

pub use config::run_config;
pub use crc::run_crc;
pub use generate::{run_completions, run_manpage};
pub use sfv::run_sfv;
pub use srr::run_srr;
pub use zip::run_zip;

use anyhow::{Context, Result};
use relcheck_core::control::Cancelled;
use relcheck_core::progress::ProgressTracker;
use std::sync::Arc;

/// Runs a blocking check on the blocking pool while printing `tracker`.
async fn run_with_progress<T, F>(tracker: Arc<ProgressTracker>, job: F) -> Result<T>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    let printer = progress::spawn_printer(Arc::clone(&tracker));
    let result = tokio::task::spawn_blocking(job)
        .await
        .context("verification task panicked")?;
    printer.abort();
    let _ = printer.await;
    progress::print_final(&tracker);
    result
}

/// Turns a check error into an `anyhow::Error`, keeping cancellation as a
/// bare [`Cancelled`] so the exit code can tell it apart.
fn check_error<E>(err: E, cancelled: Option<Cancelled>) -> anyhow::Error
where
    E: std::error::Error + Send + Sync + 'static,
{
    match cancelled {
        Some(reason) => anyhow::Error::new(reason),
        None => anyhow::Error::new(err),
    }
}
