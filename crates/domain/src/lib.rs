//! Domain layer for the License Portal backend.
//!
//! This crate contains:
//! - Domain models (Client, License, Notification)
//! - The expiry rule engine (classifier and due windows)
//! - The scan service that selects candidates and dispatches notifications

pub mod models;
pub mod services;
