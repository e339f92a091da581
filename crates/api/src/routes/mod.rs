//! HTTP route handlers.

pub mod clients;
pub mod health;
pub mod licenses;
pub mod notifications;
