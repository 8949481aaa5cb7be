use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::fees::{FeeLevel, FeeSnapshot};

/// Every observable outcome of a sync cycle produces an Event.
/// The frontend renders or logs them; tests assert on them.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    FeesUpdated {
        fees: FeeSnapshot,
        at: DateTime<Utc>,
    },
    FetchFailed {
        reason: String,
        at: DateTime<Utc>,
    },
    BadgeUpdated {
        text: String,
        level: FeeLevel,
        at: DateTime<Utc>,
    },
    BadgeCleared {
        at: DateTime<Utc>,
    },
    AlertFired {
        fee: f64,
        threshold: f64,
        at: DateTime<Utc>,
    },
}
