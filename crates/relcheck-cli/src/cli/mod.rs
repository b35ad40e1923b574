//! CLI for the relcheck release verifier.

mod commands;

use anyhow::Result;
use clap::{Args, Parser, Subcommand, ValueEnum};
use relcheck_core::config::{self, ReadMode, VerifyConfig};
use relcheck_core::control::{CancelToken, Cancelled};
use std::path::PathBuf;

use commands::{
    run_completions, run_config, run_crc, run_manpage, run_sfv, run_srr, run_zip,
};

/// Top-level CLI for relcheck.
#[derive(Debug, Parser)]
#[command(name = "relcheck", version)]
#[command(about = "relcheck: verify release integrity (sfv, split zips, srrDB records)", long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: CliCommand,
}

/// Overrides applied on top of the config file.
#[derive(Debug, Args, Default)]
pub struct GlobalArgs {
    /// Use this config file instead of ~/.config/relcheck/config.toml.
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// How file content is read for CRC32.
    #[arg(long, global = true, value_enum)]
    pub read_mode: Option<ReadModeArg>,

    /// Hash threads per file in parallel mode (0 = all cores).
    #[arg(long, global = true, value_name = "N")]
    pub threads: Option<usize>,

    /// Give up after this many seconds.
    #[arg(long, global = true, value_name = "SECS")]
    pub timeout: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ReadModeArg {
    Auto,
    Parallel,
    Sequential,
}

impl From<ReadModeArg> for ReadMode {
    fn from(arg: ReadModeArg) -> Self {
        match arg {
            ReadModeArg::Auto => ReadMode::Auto,
            ReadModeArg::Parallel => ReadMode::Parallel,
            ReadModeArg::Sequential => ReadMode::Sequential,
        }
    }
}

impl GlobalArgs {
    /// Config from disk with the command-line overrides applied.
    pub fn load_config(&self) -> Result<VerifyConfig> {
        let mut cfg = match &self.config {
            Some(path) => config::load_from(path)?,
            None => config::load_or_init()?,
        };
        self.apply(&mut cfg);
        Ok(cfg)
    }

    fn apply(&self, cfg: &mut VerifyConfig) {
        if let Some(mode) = self.read_mode {
            cfg.engine.read_mode = mode.into();
        }
        if let Some(threads) = self.threads {
            cfg.engine.hash_threads = threads;
        }
        if let Some(secs) = self.timeout {
            cfg.timeout_secs = Some(secs);
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Check every .sfv manifest in a release.
    Sfv {
        /// Release directory (or a single .sfv file).
        path: PathBuf,
    },

    /// Validate split-archive sets packed in .zip containers.
    Zip {
        /// Release directory.
        path: PathBuf,

        /// Write the first .nfo found in the containers to this file.
        #[arg(long, value_name = "FILE")]
        save_nfo: Option<PathBuf>,
    },

    /// Verify a release against srrDB records.
    Srr {
        /// Release directory.
        path: PathBuf,

        /// Compare sizes only; do not read file content.
        #[arg(long)]
        fast: bool,

        /// Extensions of the media files whose parent directories name the
        /// releases to look up.
        #[arg(
            long = "ext",
            value_delimiter = ',',
            default_value = "mkv,mp4,avi,m2ts,wmv,rar"
        )]
        extensions: Vec<String>,
    },

    /// Compute (and optionally check) the CRC32 of a file.
    Crc {
        /// Path to the file.
        path: PathBuf,

        /// Expected CRC32 as 8 hex digits.
        #[arg(long, value_name = "HEX", value_parser = parse_crc)]
        want: Option<u32>,
    },

    /// Show the config file path and effective settings.
    Config,

    /// Print shell completions to stdout.
    Completions {
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },

    /// Print the man page (roff) to stdout.
    Manpage,
}

fn parse_crc(s: &str) -> Result<u32, String> {
    let s = s.trim();
    if s.is_empty() || s.len() > 8 {
        return Err(format!("expected up to 8 hex digits, got {:?}", s));
    }
    u32::from_str_radix(s, 16).map_err(|e| format!("invalid crc {:?}: {}", s, e))
}

impl CliCommand {
    pub async fn run_from_args() -> Result<()> {
        let cli = Cli::parse();

        // Generators need neither config nor a token.
        match &cli.command {
            CliCommand::Completions { shell } => return run_completions(*shell),
            CliCommand::Manpage => return run_manpage(),
            _ => {}
        }

        let cfg = cli.global.load_config()?;
        tracing::debug!("loaded config: {:?}", cfg);

        let cancel = CancelToken::new();
        spawn_interrupt_handler(cancel.clone());

        match cli.command {
            CliCommand::Sfv { path } => run_sfv(cfg, cancel, path).await?,
            CliCommand::Zip { path, save_nfo } => run_zip(cfg, cancel, path, save_nfo).await?,
            CliCommand::Srr {
                path,
                fast,
                extensions,
            } => run_srr(cfg, cancel, path, fast, extensions).await?,
            CliCommand::Crc { path, want } => run_crc(cfg, cancel, path, want).await?,
            CliCommand::Config => run_config(&cfg, cli.global.config.as_deref())?,
            CliCommand::Completions { .. } | CliCommand::Manpage => {}
        }

        Ok(())
    }
}

/// First Ctrl-C cancels the run; checks stop at their next read.
fn spawn_interrupt_handler(cancel: CancelToken) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            eprintln!("\ninterrupted, stopping...");
            tracing::info!("interrupted by user");
            cancel.cancel();
        }
    });
}

/// Process exit code for a failed command: 130 when the run was cancelled
/// (Ctrl-C or deadline), 1 otherwise.
pub fn exit_code(err: &anyhow::Error) -> i32 {
    if err.downcast_ref::<Cancelled>().is_some() {
        130
    } else {
        1
    }
}

#[cfg(test)]
mod tests;
