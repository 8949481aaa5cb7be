//! Alert state machine.
//!
//! Detects above→below threshold crossings and rate-limits the resulting
//! notifications. The machine itself is pure -- it reads the persisted
//! state off `Settings` and returns the mutations the caller must
//! persist, so every transition is testable against an explicit clock.

use serde::{Deserialize, Serialize};

use crate::storage::Settings;

/// Hard floor between two consecutive alert notifications.
pub const NOTIFICATION_COOLDOWN_MS: u64 = 15 * 60 * 1000;

/// Which side of the threshold the last evaluated fee was on.
/// Absent from settings = unknown/initial.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertSide {
    Above,
    Below,
}

/// Outcome of one evaluation: whether to fire, plus the settings
/// mutations to persist. `None` fields mean "leave unchanged".
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AlertEvaluation {
    pub fire: bool,
    pub new_state: Option<AlertSide>,
    pub notified_at: Option<u64>,
}

impl AlertEvaluation {
    const NO_CHANGE: AlertEvaluation = AlertEvaluation {
        fire: false,
        new_state: None,
        notified_at: None,
    };

    /// Nothing to persist and nothing to fire.
    pub fn is_noop(&self) -> bool {
        !self.fire && self.new_state.is_none() && self.notified_at.is_none()
    }
}

/// Evaluate the selected fee against the configured threshold.
///
/// Transition rules:
/// - notifications disabled or no threshold: no transition, no alert;
/// - crossing into `Below` fires, unless a notification fired within the
///   cooldown window -- then the state still moves but nothing fires;
/// - crossing into `Above` never fires;
/// - staying on the same side is a no-op.
///
/// A first-ever evaluation (state unknown) with the fee already at or
/// below the threshold counts as a crossing and fires immediately.
pub fn evaluate(fee: f64, settings: &Settings, now_ms: u64) -> AlertEvaluation {
    if !settings.notifications_enabled {
        return AlertEvaluation::NO_CHANGE;
    }
    let Some(threshold) = settings.alert_threshold else {
        return AlertEvaluation::NO_CHANGE;
    };

    let below = fee <= threshold;
    let in_cooldown = settings
        .last_notification_time
        .map(|t| now_ms.saturating_sub(t) < NOTIFICATION_COOLDOWN_MS)
        .unwrap_or(false);

    match (below, settings.last_alert_state) {
        (true, Some(AlertSide::Below)) | (false, Some(AlertSide::Above)) => {
            AlertEvaluation::NO_CHANGE
        }
        (true, _) if in_cooldown => AlertEvaluation {
            fire: false,
            new_state: Some(AlertSide::Below),
            notified_at: None,
        },
        (true, _) => AlertEvaluation {
            fire: true,
            new_state: Some(AlertSide::Below),
            notified_at: Some(now_ms),
        },
        (false, _) => AlertEvaluation {
            fire: false,
            new_state: Some(AlertSide::Above),
            notified_at: None,
        },
    }
}
