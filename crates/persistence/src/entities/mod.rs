//! Database entity definitions.
//!
//! Entities are direct mappings to database rows.

pub mod client;
pub mod license;
pub mod notification;

pub use client::ClientEntity;
pub use license::{LicenseEntity, LicenseKindDb, PackageDb};
pub use notification::{
    LicenseNotificationEntity, NotificationEntity, NotificationTierDb,
    NotificationWithCountEntity,
};
