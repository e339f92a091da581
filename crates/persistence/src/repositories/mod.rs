//! Repository implementations.

pub mod client;
pub mod expiry_store;
pub mod license;
pub mod notification;

pub use client::ClientRepository;
pub use expiry_store::PgExpiryStore;
pub use license::LicenseRepository;
pub use notification::NotificationRepository;
