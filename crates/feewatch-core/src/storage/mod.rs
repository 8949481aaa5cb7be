pub mod settings;

pub use settings::{Settings, SettingsStore, CACHE_TTL_MS, MAX_ALERT_THRESHOLD};

use std::path::PathBuf;

use crate::error::StorageError;

/// Directory holding the settings record, created on first use.
///
/// Resolution order: an explicit `FEEWATCH_CONFIG_DIR` path wins;
/// otherwise the platform config directory (`$XDG_CONFIG_HOME` or
/// `~/.config` on Linux) joined with `feewatch`, or `feewatch-dev`
/// when `FEEWATCH_ENV=dev` so a development build never touches the
/// real settings record.
pub fn data_dir() -> Result<PathBuf, StorageError> {
    let dir = match std::env::var_os("FEEWATCH_CONFIG_DIR") {
        Some(explicit) => PathBuf::from(explicit),
        None => {
            let base = dirs::config_dir().ok_or_else(|| {
                StorageError::DirUnavailable("no config directory on this platform".into())
            })?;
            let name = if std::env::var("FEEWATCH_ENV").as_deref() == Ok("dev") {
                "feewatch-dev"
            } else {
                "feewatch"
            };
            base.join(name)
        }
    };
    std::fs::create_dir_all(&dir).map_err(|e| StorageError::DirUnavailable(e.to_string()))?;
    Ok(dir)
}
