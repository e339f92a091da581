//! Notification domain model and the per-license dedup marker.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Urgency tier of an upcoming license expiration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationTier {
    FourMonth,
    OneMonth,
    OneWeek,
}

impl NotificationTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationTier::FourMonth => "four_month",
            NotificationTier::OneMonth => "one_month",
            NotificationTier::OneWeek => "one_week",
        }
    }
}

impl std::fmt::Display for NotificationTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One dispatch event: a single email sent to a client about its
/// expiring licenses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    pub id: i64,
    pub client_id: i64,
    pub created_at: DateTime<Utc>,
}

/// A dedup marker to record: once stored, the (license, tier) pair is
/// never notified again.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NewLicenseNotification {
    pub license_id: i64,
    pub tier: NotificationTier,
}
