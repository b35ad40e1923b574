//! Storage probing for the read-mode decision.
//!
//! Parallel chunked reads pay off on SSDs and hurt on spinning disks, so
//! [`ReadMode::Auto`] asks the kernel whether the device backing a release is
//! rotational. Detection is best effort: anything unexpected means "not an
//! SSD" and the engine reads sequentially.

use std::path::Path;

use crate::config::ReadMode;

/// Whether `path` should be hashed with parallel chunked reads under `mode`.
pub fn use_parallel_read(mode: ReadMode, path: &Path) -> bool {
    match mode {
        ReadMode::Parallel => true,
        ReadMode::Sequential => false,
        ReadMode::Auto => {
            let ssd = is_ssd(path);
            tracing::debug!(path = %path.display(), ssd, "read mode auto");
            ssd
        }
    }
}

/// True when the block device holding `path` reports itself non-rotational.
#[cfg(target_os = "linux")]
pub fn is_ssd(path: &Path) -> bool {
    match linux::rotational(path) {
        Ok(rotational) => !rotational,
        Err(e) => {
            tracing::debug!(path = %path.display(), "storage detection failed: {:#}", e);
            false
        }
    }
}

#[cfg(not(target_os = "linux"))]
pub fn is_ssd(_path: &Path) -> bool {
    false
}

#[cfg(target_os = "linux")]
mod linux {
    use anyhow::{Context, Result};
    use std::fs;
    use std::os::unix::fs::MetadataExt;
    use std::path::{Path, PathBuf};

    /// Reads `queue/rotational` for the whole disk behind `path`.
    pub(super) fn rotational(path: &Path) -> Result<bool> {
        let meta = fs::metadata(path).with_context(|| format!("stat {}", path.display()))?;
        let dev = meta.dev() as libc::dev_t;
        let (major, minor) = (libc::major(dev), libc::minor(dev));

        let sys = PathBuf::from(format!("/sys/dev/block/{}:{}", major, minor));
        let mut device = fs::canonicalize(&sys)
            .with_context(|| format!("resolve {} (not a block device?)", sys.display()))?;
        // Partitions have no queue/ of their own; the parent is the disk.
        if device.join("partition").exists() {
            device = device
                .parent()
                .map(Path::to_path_buf)
                .context("partition without parent device")?;
        }

        let flag = device.join("queue").join("rotational");
        let value = fs::read_to_string(&flag).with_context(|| format!("read {}", flag.display()))?;
        parse_rotational(&value)
    }

    pub(super) fn parse_rotational(value: &str) -> Result<bool> {
        match value.trim() {
            "0" => Ok(false),
            "1" => Ok(true),
            other => anyhow::bail!("unexpected rotational flag {:?}", other),
        }
    }

}
