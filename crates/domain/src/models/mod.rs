//! Domain models for the License Portal.

pub mod client;
pub mod license;
pub mod notification;

pub use client::{Client, ClientResponse, CreateClientRequest};
pub use license::{
    default_expiry, CreateLicenseRequest, License, LicenseKind, LicenseResponse, Package,
    LICENSE_TERM_DAYS,
};
pub use notification::{NewLicenseNotification, Notification, NotificationTier};
