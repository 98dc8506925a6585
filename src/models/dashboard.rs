use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lower bound for `online_volunteers`.
pub const MIN_ONLINE_VOLUNTEERS: u32 = 10;
/// Lower bound for `crowd_density`.
pub const MIN_CROWD_DENSITY: f64 = 0.0;
/// Upper bound for `crowd_density`.
pub const MAX_CROWD_DENSITY: f64 = 100.0;

/// Snapshot of the operational counters shown on the dashboard stat cards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    /// Open SOS alerts. Never negative.
    #[serde(rename = "activeSOS")]
    pub active_sos: u32,
    /// Registered pilgrim groups.
    pub total_groups: u32,
    /// Volunteers currently online. Never below [`MIN_ONLINE_VOLUNTEERS`].
    pub online_volunteers: u32,
    /// Alerts resolved so far.
    pub resolved_alerts: u32,
    /// Crowd density percentage in `[0, 100]`.
    pub crowd_density: f64,
    /// When this snapshot was produced.
    pub last_update: DateTime<Utc>,
}

impl DashboardStats {
    /// The values a freshly mounted dashboard starts from.
    pub fn seed(now: DateTime<Utc>) -> Self {
        Self {
            active_sos: 3,
            total_groups: 42,
            online_volunteers: 18,
            resolved_alerts: 156,
            crowd_density: 75.0,
            last_update: now,
        }
    }

    /// Returns `true` when every bounded counter is within range.
    pub fn within_bounds(&self) -> bool {
        self.online_volunteers >= MIN_ONLINE_VOLUNTEERS
            && (MIN_CROWD_DENSITY..=MAX_CROWD_DENSITY).contains(&self.crowd_density)
    }
}
