//! Background job scheduler.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

/// How often a job runs.
#[derive(Debug, Clone, Copy)]
pub enum JobFrequency {
    /// Every N minutes.
    Minutes(u64),
    /// Every hour.
    Hourly,
    /// Every day.
    Daily,
}

impl JobFrequency {
    /// Interval between executions.
    pub fn duration(&self) -> Duration {
        match *self {
            JobFrequency::Minutes(minutes) => Duration::from_secs(minutes * 60),
            JobFrequency::Hourly => Duration::from_secs(60 * 60),
            JobFrequency::Daily => Duration::from_secs(24 * 60 * 60),
        }
    }
}

/// A unit of background work run on a fixed schedule.
#[async_trait::async_trait]
pub trait Job: Send + Sync {
    /// Name used in logs.
    fn name(&self) -> &'static str;

    /// How often to run.
    fn frequency(&self) -> JobFrequency;

    /// Run one iteration.
    async fn execute(&self) -> Result<(), String>;
}

/// Drives registered jobs until shutdown.
pub struct JobScheduler {
    jobs: Vec<Arc<dyn Job>>,
    shutdown_tx: watch::Sender<bool>,
    handles: Vec<JoinHandle<()>>,
}

impl JobScheduler {
    pub fn new() -> Self {
        let (shutdown_tx, _) = watch::channel(false);
        Self {
            jobs: Vec::new(),
            shutdown_tx,
            handles: Vec::new(),
        }
    }

    /// Register a job; takes effect at the next `start`.
    pub fn register<J: Job + 'static>(&mut self, job: J) {
        self.jobs.push(Arc::new(job));
    }

    /// Spawn one task per registered job.
    pub fn start(&mut self) {
        info!(jobs = self.jobs.len(), "Starting job scheduler");

        for job in &self.jobs {
            let job = Arc::clone(job);
            let shutdown_rx = self.shutdown_tx.subscribe();
            self.handles.push(tokio::spawn(run_job(job, shutdown_rx)));
        }
    }

    /// Signal all jobs to stop after their current iteration.
    pub fn shutdown(&self) {
        info!("Stopping job scheduler");
        let _ = self.shutdown_tx.send(true);
    }

    /// Wait for job tasks to finish, up to the timeout.
    pub async fn wait_for_shutdown(self, timeout: Duration) {
        let drain = async {
            for handle in self.handles {
                if let Err(e) = handle.await {
                    warn!("Job task panicked: {e}");
                }
            }
        };

        if tokio::time::timeout(timeout, drain).await.is_err() {
            warn!("Jobs did not stop within {timeout:?}");
        }
    }
}

impl Default for JobScheduler {
    fn default() -> Self {
        Self::new()
    }
}

async fn run_job(job: Arc<dyn Job>, mut shutdown_rx: watch::Receiver<bool>) {
    let name = job.name();
    let mut interval = tokio::time::interval(job.frequency().duration());

    // The first tick fires immediately; skip it so jobs start one full
    // interval after boot.
    interval.tick().await;

    info!(job = name, frequency = ?job.frequency(), "Job scheduled");

    loop {
        tokio::select! {
            _ = interval.tick() => {
                let started_at = std::time::Instant::now();

                match job.execute().await {
                    Ok(()) => info!(
                        job = name,
                        elapsed_ms = started_at.elapsed().as_millis() as u64,
                        "Job run succeeded"
                    ),
                    Err(e) => error!(
                        job = name,
                        elapsed_ms = started_at.elapsed().as_millis() as u64,
                        error = %e,
                        "Job run failed"
                    ),
                }
            }
            _ = shutdown_rx.changed() => {
                if *shutdown_rx.borrow() {
                    info!(job = name, "Job stopping");
                    break;
                }
            }
        }
    }
}
