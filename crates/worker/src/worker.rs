//! Queue worker: lease → workflow → ack/reject

use tracing::{error, info};

use fixity_config::Config;
use fixity_errors::{Error, Result};
use fixity_queue::{JobLease, JobQueue};

use crate::workflow::ReportWorkflow;

/// Terminal outcome of one delivery
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Acked,
    Rejected,
}

/// Tally of a drained queue
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DrainSummary {
    pub acked: u64,
    pub rejected: u64,
}

/// Processes one delivery at a time: Idle → Processing → {Acked | Rejected}
/// → Idle
///
/// Every delivery gets a fresh [`ReportWorkflow`] (and with it a fresh
/// token cache); nothing persists across messages. Any error anywhere in
/// the workflow rejects the delivery, and retry policy belongs entirely to
/// the queue's redelivery configuration. The error kind picks the log
/// line, never the outcome.
pub struct QueueWorker {
    config: Config,
}

impl QueueWorker {
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Process one leased delivery and settle it.
    ///
    /// # Errors
    ///
    /// Returns an error only if the lease itself cannot be settled;
    /// workflow failures are mapped to [`Outcome::Rejected`].
    pub async fn process(&self, lease: Box<dyn JobLease>) -> Result<Outcome> {
        let file_version_id = lease.job().file_version_id.clone();
        info!("processing file_version_id: {file_version_id}");

        let result = match ReportWorkflow::new(file_version_id, &self.config) {
            Ok(workflow) => workflow.run().await,
            Err(e) => Err(e),
        };

        match result {
            Ok(()) => {
                info!("md5 reported!");
                lease.ack().await?;
                Ok(Outcome::Acked)
            }
            Err(err) => {
                match &err {
                    Error::Config(e) => {
                        error!("configuration problem, redelivery cannot succeed until fixed: {e}");
                    }
                    Error::Integrity(e) => error!("integrity failure: {e}"),
                    Error::Api(e) => error!("{e}"),
                    other => error!("{other}"),
                }
                lease.reject().await?;
                Ok(Outcome::Rejected)
            }
        }
    }

    /// Lease and process deliveries until the queue reports drained.
    ///
    /// # Errors
    ///
    /// Returns an error if a lease cannot be settled.
    pub async fn run(&self, queue: &dyn JobQueue) -> Result<DrainSummary> {
        let mut summary = DrainSummary::default();
        while let Some(lease) = queue.lease().await {
            match self.process(lease).await? {
                Outcome::Acked => summary.acked += 1,
                Outcome::Rejected => summary.rejected += 1,
            }
        }
        Ok(summary)
    }
}
