//! In-process queue honoring the broker contract

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{Mutex, Notify};
use tracing::{debug, warn};

use fixity_errors::{QueueError, Result};

use crate::{Job, JobLease, JobQueue};

/// A job that exhausted its delivery cap
#[derive(Debug, Clone)]
pub struct DeadJob {
    pub job: Job,
    pub deliveries: u32,
}

#[derive(Debug)]
struct Pending {
    job: Job,
    deliveries: u32,
}

#[derive(Debug, Default)]
struct QueueState {
    ready: VecDeque<Pending>,
    in_flight: usize,
    dead: Vec<DeadJob>,
    closed: bool,
}

/// In-memory stand-in for the external broker
///
/// Ack removes a delivery permanently. Reject requeues it with an
/// incremented delivery count until `max_deliveries`, then moves it to the
/// dead-letter list. `close` stops new publishes and lets `lease` drain to
/// `None`. Lease-expiry on crash is the real broker's concern, not this
/// stand-in's.
pub struct MemoryQueue {
    state: Arc<Mutex<QueueState>>,
    notify: Arc<Notify>,
    max_deliveries: u32,
}

impl MemoryQueue {
    #[must_use]
    pub fn new(max_deliveries: u32) -> Self {
        Self {
            state: Arc::new(Mutex::new(QueueState::default())),
            notify: Arc::new(Notify::new()),
            max_deliveries: max_deliveries.max(1),
        }
    }

    /// Stop accepting publishes; leases drain the remaining jobs, then
    /// return `None`.
    pub async fn close(&self) {
        let mut state = self.state.lock().await;
        state.closed = true;
        drop(state);
        self.notify.notify_waiters();
    }

    /// Jobs that exhausted their delivery cap, in dead-letter order
    pub async fn dead_letters(&self) -> Vec<DeadJob> {
        self.state.lock().await.dead.clone()
    }
}

#[async_trait]
impl JobQueue for MemoryQueue {
    async fn publish(&self, job: Job) -> Result<()> {
        let mut state = self.state.lock().await;
        if state.closed {
            return Err(QueueError::Closed.into());
        }
        state.ready.push_back(Pending {
            job,
            deliveries: 0,
        });
        drop(state);
        self.notify.notify_waiters();
        Ok(())
    }

    async fn lease(&self) -> Option<Box<dyn JobLease>> {
        loop {
            // register for wakeups before checking, so a publish between
            // the check and the await is not missed
            let notified = self.notify.notified();
            {
                let mut state = self.state.lock().await;
                if let Some(mut pending) = state.ready.pop_front() {
                    pending.deliveries += 1;
                    state.in_flight += 1;
                    debug!(
                        file_version_id = %pending.job.file_version_id,
                        delivery = pending.deliveries,
                        "leased job"
                    );
                    return Some(Box::new(MemoryLease {
                        job: pending.job,
                        deliveries: pending.deliveries,
                        state: Arc::clone(&self.state),
                        notify: Arc::clone(&self.notify),
                        max_deliveries: self.max_deliveries,
                    }));
                }
                if state.closed && state.in_flight == 0 {
                    return None;
                }
            }
            notified.await;
        }
    }
}

struct MemoryLease {
    job: Job,
    deliveries: u32,
    state: Arc<Mutex<QueueState>>,
    notify: Arc<Notify>,
    max_deliveries: u32,
}

#[async_trait]
impl JobLease for MemoryLease {
    fn job(&self) -> &Job {
        &self.job
    }

    fn delivery_count(&self) -> u32 {
        self.deliveries
    }

    async fn ack(self: Box<Self>) -> Result<()> {
        let mut state = self.state.lock().await;
        state.in_flight -= 1;
        drop(state);
        self.notify.notify_waiters();
        Ok(())
    }

    async fn reject(self: Box<Self>) -> Result<()> {
        let mut state = self.state.lock().await;
        state.in_flight -= 1;
        if self.deliveries >= self.max_deliveries {
            warn!(
                file_version_id = %self.job.file_version_id,
                deliveries = self.deliveries,
                "job exhausted its delivery cap, dead-lettering"
            );
            state.dead.push(DeadJob {
                job: self.job,
                deliveries: self.deliveries,
            });
        } else {
            state.ready.push_back(Pending {
                job: self.job,
                deliveries: self.deliveries,
            });
        }
        drop(state);
        self.notify.notify_waiters();
        Ok(())
    }
}
