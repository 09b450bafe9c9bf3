//! Integration tests for the in-memory queue and publisher

use std::time::Duration;

use fixity_errors::{Error, QueueError};
use fixity_queue::{publish_all, Job, JobQueue, MemoryQueue};

#[tokio::test]
async fn ack_removes_the_job_permanently() {
    let queue = MemoryQueue::new(3);
    queue.publish(Job::new("fv-1")).await.unwrap();

    let lease = queue.lease().await.unwrap();
    assert_eq!(lease.job().file_version_id, "fv-1");
    assert_eq!(lease.delivery_count(), 1);
    lease.ack().await.unwrap();

    queue.close().await;
    assert!(queue.lease().await.is_none());
    assert!(queue.dead_letters().await.is_empty());
}

#[tokio::test]
async fn reject_redelivers_until_the_cap_then_dead_letters() {
    let queue = MemoryQueue::new(3);
    queue.publish(Job::new("fv-1")).await.unwrap();

    for expected_delivery in 1..=3 {
        let lease = queue.lease().await.unwrap();
        assert_eq!(lease.delivery_count(), expected_delivery);
        lease.reject().await.unwrap();
    }

    queue.close().await;
    assert!(queue.lease().await.is_none());

    let dead = queue.dead_letters().await;
    assert_eq!(dead.len(), 1);
    assert_eq!(dead[0].job.file_version_id, "fv-1");
    assert_eq!(dead[0].deliveries, 3);
}

#[tokio::test]
async fn rejected_job_goes_to_the_back_of_the_queue() {
    let queue = MemoryQueue::new(5);
    queue.publish(Job::new("fv-1")).await.unwrap();
    queue.publish(Job::new("fv-2")).await.unwrap();

    let first = queue.lease().await.unwrap();
    assert_eq!(first.job().file_version_id, "fv-1");
    first.reject().await.unwrap();

    let second = queue.lease().await.unwrap();
    assert_eq!(second.job().file_version_id, "fv-2");
    second.ack().await.unwrap();

    let redelivered = queue.lease().await.unwrap();
    assert_eq!(redelivered.job().file_version_id, "fv-1");
    assert_eq!(redelivered.delivery_count(), 2);
    redelivered.ack().await.unwrap();
}

#[tokio::test]
async fn publish_after_close_is_refused() {
    let queue = MemoryQueue::new(3);
    queue.close().await;
    let err = queue.publish(Job::new("fv-1")).await.unwrap_err();
    assert!(matches!(err, Error::Queue(QueueError::Closed)));
}

#[tokio::test]
async fn lease_waits_for_a_publish() {
    let queue = std::sync::Arc::new(MemoryQueue::new(3));

    let waiter = {
        let queue = std::sync::Arc::clone(&queue);
        tokio::spawn(async move { queue.lease().await.map(|l| l.job().clone()) })
    };

    tokio::time::sleep(Duration::from_millis(20)).await;
    queue.publish(Job::new("fv-late")).await.unwrap();

    let job = waiter.await.unwrap().unwrap();
    assert_eq!(job.file_version_id, "fv-late");
}

#[tokio::test]
async fn publisher_preserves_input_order_and_skips_blank_lines() {
    let queue = MemoryQueue::new(3);
    let input: &[u8] = b"fv-1\nfv-2\n\nfv-3\n";

    let published = publish_all(input, &queue).await.unwrap();
    assert_eq!(published, 3);

    queue.close().await;
    for expected in ["fv-1", "fv-2", "fv-3"] {
        let lease = queue.lease().await.unwrap();
        assert_eq!(lease.job().file_version_id, expected);
        lease.ack().await.unwrap();
    }
    assert!(queue.lease().await.is_none());
}

#[tokio::test]
async fn publisher_handles_input_without_trailing_newline() {
    let queue = MemoryQueue::new(3);
    let input: &[u8] = b"fv-only";

    assert_eq!(publish_all(input, &queue).await.unwrap(), 1);

    queue.close().await;
    let lease = queue.lease().await.unwrap();
    assert_eq!(lease.job().file_version_id, "fv-only");
    lease.ack().await.unwrap();
}
