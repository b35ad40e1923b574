//! `relcheck config` – where the config lives and what is in effect.

use anyhow::Result;
use relcheck_core::config::{self, VerifyConfig};
use relcheck_core::logging;
use std::path::Path;

pub fn run_config(cfg: &VerifyConfig, explicit: Option<&Path>) -> Result<()> {
    let path = match explicit {
        Some(p) => p.to_path_buf(),
        None => config::config_path()?,
    };
    println!("# config: {}", path.display());
    if let Ok(log) = logging::log_file_path() {
        println!("# log:    {}", log.display());
    }
    print!("{}", toml::to_string_pretty(cfg)?);
    Ok(())
}
