//! Notification entities (database row mappings).

use chrono::{DateTime, Utc};
use domain::models::{Notification, NotificationTier};
use sqlx::FromRow;

/// Database enum for notification_tier that maps to the PostgreSQL enum type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "notification_tier", rename_all = "snake_case")]
pub enum NotificationTierDb {
    FourMonth,
    OneMonth,
    OneWeek,
}

impl From<NotificationTierDb> for NotificationTier {
    fn from(db_tier: NotificationTierDb) -> Self {
        match db_tier {
            NotificationTierDb::FourMonth => NotificationTier::FourMonth,
            NotificationTierDb::OneMonth => NotificationTier::OneMonth,
            NotificationTierDb::OneWeek => NotificationTier::OneWeek,
        }
    }
}

impl From<NotificationTier> for NotificationTierDb {
    fn from(tier: NotificationTier) -> Self {
        match tier {
            NotificationTier::FourMonth => NotificationTierDb::FourMonth,
            NotificationTier::OneMonth => NotificationTierDb::OneMonth,
            NotificationTier::OneWeek => NotificationTierDb::OneWeek,
        }
    }
}

/// Database row mapping for the notifications table.
#[derive(Debug, Clone, FromRow)]
pub struct NotificationEntity {
    pub id: i64,
    pub client_id: i64,
    pub created_at: DateTime<Utc>,
}

impl From<NotificationEntity> for Notification {
    fn from(entity: NotificationEntity) -> Self {
        Self {
            id: entity.id,
            client_id: entity.client_id,
            created_at: entity.created_at,
        }
    }
}

/// Database row mapping for the license_notifications table.
///
/// The (license_id, tier) pair is unique across all time; these rows are
/// the permanent dedup markers.
#[derive(Debug, Clone, FromRow)]
pub struct LicenseNotificationEntity {
    pub id: i64,
    pub notification_id: i64,
    pub license_id: i64,
    pub tier: NotificationTierDb,
    pub created_at: DateTime<Utc>,
}

/// Notification with client name and marker count for history listings.
#[derive(Debug, Clone, FromRow)]
pub struct NotificationWithCountEntity {
    pub id: i64,
    pub client_id: i64,
    pub client_name: String,
    pub expiring_license_count: i64,
    pub created_at: DateTime<Utc>,
}
