#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Job queue boundary for fixity
//!
//! The broker engine (exchanges, durability, redelivery counting) is an
//! external collaborator; this crate defines the seam it plugs into. A
//! worker leases one delivery at a time and must settle it with `ack`
//! (remove permanently) or `reject` (redeliver, dead-letter once the
//! delivery cap is reached). [`MemoryQueue`] implements the contract
//! in-process so the whole lifecycle runs and tests without a broker.

mod memory;
mod publisher;

pub use memory::{DeadJob, MemoryQueue};
pub use publisher::publish_all;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use fixity_errors::Result;

/// One verification job: the message body is the file-version id
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Job {
    pub file_version_id: String,
}

impl Job {
    #[must_use]
    pub fn new(file_version_id: impl Into<String>) -> Self {
        Self {
            file_version_id: file_version_id.into(),
        }
    }
}

/// A leased delivery. The worker owns the lease and must settle it exactly
/// once; the queue decides what a rejection means (redeliver or dead-letter).
#[async_trait]
pub trait JobLease: Send {
    fn job(&self) -> &Job;

    /// How many times this job has been delivered, this lease included.
    fn delivery_count(&self) -> u32;

    /// Remove the message permanently.
    async fn ack(self: Box<Self>) -> Result<()>;

    /// Route the message for redelivery or dead-lettering.
    async fn reject(self: Box<Self>) -> Result<()>;
}

/// Queue port. The in-memory implementation is the stand-in; an AMQP
/// binding would implement the same trait.
#[async_trait]
pub trait JobQueue: Send + Sync {
    /// Enqueue a new job.
    async fn publish(&self, job: Job) -> Result<()>;

    /// Lease one delivery. Waits for work; returns `None` once the queue is
    /// closed and drained.
    async fn lease(&self) -> Option<Box<dyn JobLease>>;
}
