//! Badge policy: text and color derivation for the toolbar indicator.
//!
//! Pure functions, independent of any rendering technology. The badge
//! color follows the *selected tier*, not the numeric fee value -- two
//! snapshots with wildly different numbers but the same selected tier
//! produce the same color, so the badge never flickers as fees
//! fluctuate around a magnitude threshold.

use serde::{Deserialize, Serialize};

use crate::fees::{FeeLevel, FeeSnapshot, Priority};
use crate::storage::Settings;

/// Rounded values above this render as "99+".
pub const BADGE_MAX_VALUE: u32 = 99;

/// Fee-magnitude thresholds in sat/vB for [`level_from_value`].
pub const LOW_FEE_THRESHOLD: f64 = 10.0;
pub const HIGH_FEE_THRESHOLD: f64 = 50.0;

pub const COLOR_LOW: &str = "#10B981";
pub const COLOR_MEDIUM: &str = "#F59E0B";
pub const COLOR_HIGH: &str = "#EF4444";
pub const COLOR_ERROR: &str = "#6B7280";
pub const COLOR_TEXT: &str = "#FFFFFF";

/// Glyph shown when the fee source is unreachable.
pub const ERROR_BADGE_TEXT: &str = "?";

/// Derived badge rendering parameters. Recomputed every cycle; never
/// persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BadgeConfig {
    pub text: String,
    /// Foreground (text) color.
    pub color: String,
    pub background_color: String,
    pub level: FeeLevel,
}

/// Urgency of the selected tier itself. Drives badge coloring.
pub fn level_for_priority(priority: Priority) -> FeeLevel {
    match priority {
        Priority::Hour => FeeLevel::Low,
        Priority::HalfHour => FeeLevel::Medium,
        Priority::Fastest => FeeLevel::High,
    }
}

/// Absolute-magnitude classification for status messaging.
/// Not used for badge coloring -- the badge follows the selected tier.
pub fn level_from_value(value: f64) -> FeeLevel {
    if value < LOW_FEE_THRESHOLD {
        FeeLevel::Low
    } else if value <= HIGH_FEE_THRESHOLD {
        FeeLevel::Medium
    } else {
        FeeLevel::High
    }
}

/// Color for a fee level.
pub fn badge_color(level: FeeLevel) -> &'static str {
    match level {
        FeeLevel::Low => COLOR_LOW,
        FeeLevel::Medium => COLOR_MEDIUM,
        FeeLevel::High => COLOR_HIGH,
    }
}

/// Badge text: the fee rounded to the nearest integer, capped at "99+"
/// so it always fits the badge width.
pub fn format_badge_text(value: f64) -> String {
    let rounded = value.round();
    if rounded > BADGE_MAX_VALUE as f64 {
        "99+".to_string()
    } else {
        format!("{}", rounded as i64)
    }
}

/// Badge parameters for a snapshot under the current settings.
pub fn compute_badge(fees: &FeeSnapshot, settings: &Settings) -> BadgeConfig {
    let value = fees.fee_for(settings.selected_priority);
    let level = level_for_priority(settings.selected_priority);
    BadgeConfig {
        text: format_badge_text(value),
        color: COLOR_TEXT.to_string(),
        background_color: badge_color(level).to_string(),
        level,
    }
}
