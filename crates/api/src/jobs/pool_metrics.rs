//! Connection pool gauge job.

use sqlx::PgPool;
use tracing::debug;

use super::scheduler::{Job, JobFrequency};

/// Pushes database connection pool gauges once a minute.
pub struct PoolMetricsJob {
    pool: PgPool,
}

impl PoolMetricsJob {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl Job for PoolMetricsJob {
    fn name(&self) -> &'static str {
        "db_pool_metrics"
    }

    fn frequency(&self) -> JobFrequency {
        JobFrequency::Minutes(1)
    }

    async fn execute(&self) -> Result<(), String> {
        persistence::metrics::record_pool_metrics(&self.pool);
        debug!(
            size = self.pool.size(),
            idle = self.pool.num_idle(),
            "Recorded connection pool gauges"
        );
        Ok(())
    }
}
