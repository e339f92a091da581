//! Persistence layer for the License Portal backend.
//!
//! This crate contains:
//! - Database connection management
//! - Entity definitions (database row mappings)
//! - Repository implementations and the Postgres expiry store

pub mod db;
pub mod entities;
pub mod metrics;
pub mod repositories;
