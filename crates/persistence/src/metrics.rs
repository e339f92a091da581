//! Query and pool metrics.

use metrics::{gauge, histogram};
use sqlx::PgPool;
use std::time::Instant;

/// Times a database operation and records its duration into the
/// `database_query_duration_seconds` histogram when dropped.
///
/// ```ignore
/// let _timer = QueryTimer::start("find_client_by_id");
/// sqlx::query_as::<_, ClientEntity>(...).fetch_optional(&pool).await
/// ```
pub struct QueryTimer {
    query_name: &'static str,
    started_at: Instant,
}

impl QueryTimer {
    /// Start timing the named query.
    pub fn start(query_name: &'static str) -> Self {
        Self {
            query_name,
            started_at: Instant::now(),
        }
    }
}

impl Drop for QueryTimer {
    fn drop(&mut self) {
        histogram!(
            "database_query_duration_seconds",
            "query" => self.query_name
        )
        .record(self.started_at.elapsed().as_secs_f64());
    }
}

/// Push connection pool gauges. Called periodically by the pool metrics
/// job.
pub fn record_pool_metrics(pool: &PgPool) {
    let total = pool.size() as f64;
    let idle = pool.num_idle() as f64;

    gauge!("database_connections_total").set(total);
    gauge!("database_connections_idle").set(idle);
    gauge!("database_connections_active").set((total - idle).max(0.0));
}
