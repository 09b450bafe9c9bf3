//! Queue lifecycle error types

use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[non_exhaustive]
pub enum QueueError {
    #[error("queue is closed")]
    Closed,
}
