//! Background job scheduler and job implementations.

mod expiry_scan;
mod pool_metrics;
mod scheduler;

pub use expiry_scan::ExpiryScanJob;
pub use pool_metrics::PoolMetricsJob;
pub use scheduler::{Job, JobFrequency, JobScheduler};
