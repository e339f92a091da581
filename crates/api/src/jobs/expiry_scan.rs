//! Scheduled license expiry scan job.

use std::sync::Arc;

use chrono::Utc;
use tracing::info;

use super::scheduler::{Job, JobFrequency};
use crate::middleware::metrics::{record_failed_emails, record_notifications_created};
use domain::services::scan::ExpiryScanService;

/// Background job running the expiry scan on a fixed interval.
///
/// The HTTP trigger shares the same service, so a scheduled pass and a
/// manual pass never double-notify: the dedup markers are the single
/// source of truth.
pub struct ExpiryScanJob {
    service: Arc<ExpiryScanService>,
    interval_minutes: u64,
}

impl ExpiryScanJob {
    /// Create a new expiry scan job.
    pub fn new(service: Arc<ExpiryScanService>, interval_minutes: u64) -> Self {
        Self {
            service,
            interval_minutes,
        }
    }
}

#[async_trait::async_trait]
impl Job for ExpiryScanJob {
    fn name(&self) -> &'static str {
        "expiry_scan"
    }

    fn frequency(&self) -> JobFrequency {
        JobFrequency::Minutes(self.interval_minutes)
    }

    async fn execute(&self) -> Result<(), String> {
        let outcome = self
            .service
            .run_scan(Utc::now())
            .await
            .map_err(|e| format!("Expiry scan failed: {e}"))?;

        record_notifications_created(outcome.notifications.len());
        record_failed_emails(outcome.failed_emails);

        info!(
            notifications = outcome.notifications.len(),
            failed_emails = outcome.failed_emails,
            "Expiry scan completed"
        );

        if outcome.failed_emails > 0 {
            return Err(format!(
                "{} expiry notification emails failed to send",
                outcome.failed_emails
            ));
        }

        Ok(())
    }
}
