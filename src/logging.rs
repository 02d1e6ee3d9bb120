use std::fs::{self, OpenOptions};
use std::sync::Mutex;

use anyhow::{anyhow, Context, Result};
use tracing_subscriber::EnvFilter;

use crate::config::LogConfig;

/// Overrides `log.filter` when set, e.g. `POSTVIEW_LOG=postview=debug`.
pub const LOG_ENV: &str = "POSTVIEW_LOG";

/// Installs the global subscriber. The terminal belongs to the UI, so events
/// go to the configured file; without one logging stays off.
pub fn init(cfg: &LogConfig) -> Result<bool> {
    let Some(path) = cfg.file.as_ref() else {
        return Ok(false);
    };
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("log: failed to create directory {}", parent.display()))?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("log: failed to open {}", path.display()))?;

    let filter = match EnvFilter::try_from_env(LOG_ENV) {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&cfg.filter)
            .with_context(|| format!("log: invalid filter {:?}", cfg.filter))?,
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_target(true)
        .with_writer(Mutex::new(file))
        .try_init()
        .map_err(|err| anyhow!("log: install subscriber: {err}"))?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn no_file_means_no_subscriber() {
        let cfg = LogConfig {
            file: None,
            filter: "info".into(),
        };
        assert!(!init(&cfg).unwrap());
    }

    #[test]
    fn creates_log_file_and_parents() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("postview.log");
        let cfg = LogConfig {
            file: Some(path.clone()),
            filter: "debug".into(),
        };
        assert!(init(&cfg).unwrap());
        tracing::info!("logging ready");
        assert!(path.exists());
    }
}
