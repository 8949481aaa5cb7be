//! Fee-rate domain types.
//!
//! Field names follow the mempool.space wire format (`fastestFee`,
//! `halfHourFee`, `hourFee`) so snapshots round-trip between the API,
//! the persisted settings record, and JSON output unchanged.

use serde::{Deserialize, Serialize};

/// Confirmation-speed tier a fee rate targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Priority {
    /// Fastest confirmation (~10 min).
    #[serde(rename = "fastestFee")]
    Fastest,
    /// Medium confirmation (~30 min).
    #[serde(rename = "halfHourFee")]
    HalfHour,
    /// Economy confirmation (~60 min).
    #[serde(rename = "hourFee")]
    Hour,
}

impl Priority {
    pub const ALL: [Priority; 3] = [Priority::Fastest, Priority::HalfHour, Priority::Hour];

    /// Wire/storage key name.
    pub fn wire_name(self) -> &'static str {
        match self {
            Priority::Fastest => "fastestFee",
            Priority::HalfHour => "halfHourFee",
            Priority::Hour => "hourFee",
        }
    }

    /// Human-readable tier name.
    pub fn display_name(self) -> &'static str {
        match self {
            Priority::Fastest => "High",
            Priority::HalfHour => "Medium",
            Priority::Hour => "Low",
        }
    }

    /// Approximate confirmation target.
    pub fn confirmation_target(self) -> &'static str {
        match self {
            Priority::Fastest => "~10 min",
            Priority::HalfHour => "~30 min",
            Priority::Hour => "~60 min",
        }
    }

    /// Parse a wire name back into a tier.
    pub fn from_wire_name(name: &str) -> Option<Self> {
        Priority::ALL.into_iter().find(|p| p.wire_name() == name)
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.display_name(), self.confirmation_target())
    }
}

/// One fetched set of recommended fee rates in sat/vB.
///
/// Immutable once fetched; replaced wholesale on each successful fetch.
/// All three rates are strictly positive -- the client rejects anything
/// else before it can reach the cache.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeeSnapshot {
    #[serde(rename = "fastestFee")]
    pub fastest: f64,
    #[serde(rename = "halfHourFee")]
    pub half_hour: f64,
    #[serde(rename = "hourFee")]
    pub hour: f64,
}

impl FeeSnapshot {
    /// Fee rate for the given tier.
    pub fn fee_for(&self, priority: Priority) -> f64 {
        match priority {
            Priority::Fastest => self.fastest,
            Priority::HalfHour => self.half_hour,
            Priority::Hour => self.hour,
        }
    }

    /// All three rates finite and strictly positive.
    pub fn is_valid(&self) -> bool {
        [self.fastest, self.half_hour, self.hour]
            .into_iter()
            .all(|v| v.is_finite() && v > 0.0)
    }
}

/// Coarse fee-magnitude classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeeLevel {
    Low,
    Medium,
    High,
}

impl std::fmt::Display for FeeLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            FeeLevel::Low => "low",
            FeeLevel::Medium => "medium",
            FeeLevel::High => "high",
        };
        f.write_str(s)
    }
}

/// Projected fee span of the next block, in sat/vB.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeeRange {
    pub min: f64,
    pub max: f64,
}
