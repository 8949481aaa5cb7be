//! Persisted user settings and the embedded fee cache.
//!
//! One TOML record per installation at `~/.config/feewatch/settings.toml`.
//! Every field carries a serde default, so a record written by an older
//! version is backfilled on load and re-persisted -- a read never
//! observes a partially-initialized record. Staleness of the embedded
//! cache is a read-time check; stale data is never eagerly evicted, the
//! next successful fetch simply overwrites it.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::alert::AlertSide;
use crate::error::{ConfigError, CoreError, StorageError};
use crate::fees::{FeeSnapshot, Priority};
use crate::now_ms;

/// How long a cached snapshot stays trustworthy.
pub const CACHE_TTL_MS: u64 = 5 * 60 * 1000;

/// Upper bound for the alert threshold in sat/vB.
pub const MAX_ALERT_THRESHOLD: f64 = 1000.0;

/// The single persisted settings record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default = "default_priority")]
    pub selected_priority: Priority,
    #[serde(default = "default_true")]
    pub notifications_enabled: bool,
    #[serde(default = "default_true")]
    pub badge_visible: bool,
    /// Alert threshold in sat/vB. Alerts are off while unset.
    #[serde(default)]
    pub alert_threshold: Option<f64>,
    /// Epoch milliseconds of the last successful fetch. 0 = never.
    #[serde(default)]
    pub last_update: u64,
    #[serde(default)]
    pub last_alert_state: Option<AlertSide>,
    #[serde(default)]
    pub last_notification_time: Option<u64>,
    /// Kept last: serializes as a TOML table.
    #[serde(default)]
    pub cached_fees: Option<FeeSnapshot>,
}

fn default_priority() -> Priority {
    Priority::HalfHour
}
fn default_true() -> bool {
    true
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            selected_priority: Priority::HalfHour,
            notifications_enabled: true,
            badge_visible: true,
            alert_threshold: None,
            last_update: 0,
            last_alert_state: None,
            last_notification_time: None,
            cached_fees: None,
        }
    }
}

impl Settings {
    /// Whether the embedded cache is still within its TTL at `now_ms`.
    pub fn is_cache_fresh_at(&self, now_ms: u64) -> bool {
        self.cached_fees.is_some()
            && self.last_update > 0
            && now_ms.saturating_sub(self.last_update) < CACHE_TTL_MS
    }

    /// The cached snapshot, only while fresh at `now_ms`.
    pub fn cached_fees_at(&self, now_ms: u64) -> Option<FeeSnapshot> {
        if self.is_cache_fresh_at(now_ms) {
            self.cached_fees
        } else {
            None
        }
    }
}

/// Validate an alert threshold: strictly positive, at most
/// [`MAX_ALERT_THRESHOLD`].
pub fn validate_threshold(value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 && value <= MAX_ALERT_THRESHOLD {
        Ok(())
    } else {
        Err(ConfigError::InvalidValue {
            key: "alert_threshold".into(),
            message: format!("must be in (0, {MAX_ALERT_THRESHOLD}]"),
        })
    }
}

/// TOML-file-backed settings repository.
///
/// Every operation re-reads the record before acting, so interleaved
/// handlers never act on a stale in-memory copy; every write replaces
/// the whole file atomically (temp file + rename).
pub struct SettingsStore {
    path: PathBuf,
}

impl SettingsStore {
    /// Store at the default location (see [`super::data_dir`]).
    pub fn open_default() -> Result<Self, StorageError> {
        Ok(Self {
            path: super::data_dir()?.join("settings.toml"),
        })
    }

    /// Store at an explicit path (tests use a temp directory).
    pub fn at_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load-or-default-and-persist.
    ///
    /// Missing file: write defaults and return them. Existing file:
    /// parse with serde defaults backfilling missing fields, and persist
    /// the merged record when anything was backfilled.
    pub fn settings(&self) -> Result<Settings, StorageError> {
        match std::fs::read_to_string(&self.path) {
            Ok(content) => {
                let settings: Settings = toml::from_str(&content)
                    .map_err(|e| StorageError::ParseFailed(e.to_string()))?;
                let normalized = toml::to_string_pretty(&settings)
                    .map_err(|e| StorageError::ParseFailed(e.to_string()))?;
                if normalized != content {
                    self.write_atomic(&normalized)?;
                }
                Ok(settings)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let settings = Settings::default();
                self.save(&settings)?;
                Ok(settings)
            }
            Err(e) => Err(StorageError::ReadFailed {
                path: self.path.clone(),
                message: e.to_string(),
            }),
        }
    }

    /// Persist the whole record.
    pub fn save(&self, settings: &Settings) -> Result<(), StorageError> {
        let content = toml::to_string_pretty(settings)
            .map_err(|e| StorageError::ParseFailed(e.to_string()))?;
        self.write_atomic(&content)
    }

    /// Typed read-modify-write. Returns the record as persisted.
    pub fn update_with<F>(&self, f: F) -> Result<Settings, StorageError>
    where
        F: FnOnce(&mut Settings),
    {
        let mut settings = self.settings()?;
        f(&mut settings);
        self.save(&settings)?;
        Ok(settings)
    }

    /// Keyed single-field update with validation.
    pub fn set(&self, key: &str, value: &str) -> Result<(), CoreError> {
        let mut settings = self.settings()?;
        apply_key(&mut settings, key, value)?;
        self.save(&settings)?;
        Ok(())
    }

    /// Read a field as a display string by its record key.
    pub fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let settings = self.settings()?;
        let json = serde_json::to_value(&settings)
            .map_err(|e| StorageError::ParseFailed(e.to_string()))?;
        Ok(json.get(key).map(|value| match value {
            serde_json::Value::String(s) => s.clone(),
            other => other.to_string(),
        }))
    }

    /// Replace the cached snapshot and refresh the update timestamp in
    /// one atomic write.
    pub fn cache_snapshot(&self, fees: &FeeSnapshot) -> Result<(), StorageError> {
        self.update_with(|s| {
            s.cached_fees = Some(*fees);
            s.last_update = now_ms();
        })
        .map(|_| ())
    }

    /// The cached snapshot, only while fresh.
    pub fn cached_fees(&self) -> Result<Option<FeeSnapshot>, StorageError> {
        Ok(self.settings()?.cached_fees_at(now_ms()))
    }

    /// Rewrite the record with defaults. The only way settings are ever
    /// deleted.
    pub fn reset(&self) -> Result<(), StorageError> {
        self.save(&Settings::default())
    }

    fn write_atomic(&self, content: &str) -> Result<(), StorageError> {
        let write_err = |e: std::io::Error| StorageError::WriteFailed {
            path: self.path.clone(),
            message: e.to_string(),
        };
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(write_err)?;
            }
        }
        let tmp = self.path.with_extension("toml.tmp");
        std::fs::write(&tmp, content).map_err(write_err)?;
        std::fs::rename(&tmp, &self.path).map_err(write_err)
    }
}

fn apply_key(settings: &mut Settings, key: &str, value: &str) -> Result<(), ConfigError> {
    let invalid = |message: &str| ConfigError::InvalidValue {
        key: key.to_string(),
        message: message.to_string(),
    };
    match key {
        "selected_priority" => {
            settings.selected_priority = Priority::from_wire_name(value)
                .ok_or_else(|| invalid("expected fastestFee, halfHourFee or hourFee"))?;
        }
        "notifications_enabled" => {
            settings.notifications_enabled =
                value.parse::<bool>().map_err(|_| invalid("expected true or false"))?;
        }
        "badge_visible" => {
            settings.badge_visible =
                value.parse::<bool>().map_err(|_| invalid("expected true or false"))?;
        }
        "alert_threshold" => {
            if value.eq_ignore_ascii_case("none") {
                settings.alert_threshold = None;
            } else {
                let threshold = value
                    .parse::<f64>()
                    .map_err(|_| invalid("expected a number or 'none'"))?;
                validate_threshold(threshold)?;
                settings.alert_threshold = Some(threshold);
            }
        }
        other => return Err(ConfigError::UnknownKey(other.to_string())),
    }
    Ok(())
}
