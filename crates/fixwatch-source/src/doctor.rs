use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Result;

use crate::shell::MIN_UPDATE_INTERVAL;

/// Resolve the feed interpreter: a path is checked directly, a bare name is
/// looked up on PATH.
pub fn check_interpreter(program: &str) -> Result<PathBuf> {
    anyhow::ensure!(!program.trim().is_empty(), "interpreter program not set");

    let candidate = Path::new(program);
    if candidate.components().count() > 1 {
        anyhow::ensure!(candidate.is_file(), "interpreter '{}' not found", program);
        return Ok(candidate.to_path_buf());
    }

    let path = std::env::var_os("PATH").unwrap_or_default();
    for dir in std::env::split_paths(&path) {
        let full = dir.join(program);
        if full.is_file() {
            return Ok(full);
        }
    }
    anyhow::bail!("interpreter '{}' not found on PATH", program)
}

pub fn check_script(script: &str) -> Result<()> {
    anyhow::ensure!(!script.trim().is_empty(), "watcher script is empty");
    Ok(())
}

pub fn check_update_interval(interval: Duration) -> Result<()> {
    anyhow::ensure!(
        interval >= MIN_UPDATE_INTERVAL,
        "update interval {:?} below the {:?} floor",
        interval,
        MIN_UPDATE_INTERVAL
    );
    Ok(())
}
