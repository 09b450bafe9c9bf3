//! Publisher: newline-delimited ids in, one message per id out

use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::info;

use fixity_errors::Result;

use crate::{Job, JobQueue};

/// Publish one message per non-empty input line, in input order
///
/// The line terminator is stripped; nothing else is transformed, batched,
/// or deduplicated. Returns the number of messages published.
///
/// # Errors
///
/// Returns an error if reading fails or the queue refuses a publish.
pub async fn publish_all<R>(reader: R, queue: &dyn JobQueue) -> Result<u64>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = reader.lines();
    let mut published = 0u64;

    while let Some(line) = lines.next_line().await? {
        if line.is_empty() {
            continue;
        }
        queue.publish(Job::new(line)).await?;
        published += 1;
    }

    info!(published, "all published");
    Ok(published)
}
