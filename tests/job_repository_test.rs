/// Job repository tests - queue operations against Postgres
///
/// Covers:
/// - Enqueue/retrieve round trip
/// - Atomic dequeue semantics
/// - Retry vs permanent failure vs abandonment
/// - Priority ordering and statistics
mod utils;

use bingelog::modules::sync::domain::entities::{Job, PRIORITY_INTERACTIVE, PRIORITY_SCHEDULED};
use bingelog::modules::sync::domain::repository::JobRepository;
use bingelog::modules::sync::JobRepositoryImpl;
use bingelog::shared::domain::ContentKind;
use utils::db;

fn repo() -> JobRepositoryImpl {
    JobRepositoryImpl::new((*db::get_test_db_pool()).clone())
}

#[tokio::test]
async fn enqueue_and_retrieve_job() {
    let _guard = db::acquire_test_lock();
    db::clean_test_db();

    let repo = repo();
    let job = Job::sync_title(121361, ContentKind::Series, None, PRIORITY_INTERACTIVE);

    let enqueued = repo.enqueue(job).await.unwrap();
    assert_eq!(enqueued.job_type, "sync_title");
    assert_eq!(enqueued.status, "pending");
    assert_eq!(enqueued.priority, PRIORITY_INTERACTIVE);

    let retrieved = repo.get_by_id(enqueued.id).await.unwrap();
    assert!(retrieved.is_some());
    assert_eq!(retrieved.unwrap().id, enqueued.id);
}

#[tokio::test]
async fn dequeue_claims_job_and_increments_attempts() {
    let _guard = db::acquire_test_lock();
    db::clean_test_db();

    let repo = repo();
    repo.enqueue(Job::sync_person(42, None, PRIORITY_INTERACTIVE))
        .await
        .unwrap();

    let dequeued = repo.dequeue().await.unwrap();
    assert!(dequeued.is_some());

    let job = dequeued.unwrap();
    assert_eq!(job.status, "running");
    assert_eq!(job.attempts, 1);

    // The claimed job is not visible to a second dequeue
    assert!(repo.dequeue().await.unwrap().is_none());
}

#[tokio::test]
async fn dequeue_empty_queue_returns_none() {
    let _guard = db::acquire_test_lock();
    db::clean_test_db();

    assert!(repo().dequeue().await.unwrap().is_none());
}

#[tokio::test]
async fn dequeue_prefers_lower_priority_value() {
    let _guard = db::acquire_test_lock();
    db::clean_test_db();

    let repo = repo();
    repo.enqueue(Job::sync_title(1, ContentKind::Series, None, PRIORITY_SCHEDULED))
        .await
        .unwrap();
    repo.enqueue(Job::sync_title(2, ContentKind::Series, None, PRIORITY_INTERACTIVE))
        .await
        .unwrap();

    let first = repo.dequeue().await.unwrap().unwrap();
    assert_eq!(first.priority, PRIORITY_INTERACTIVE);

    let second = repo.dequeue().await.unwrap().unwrap();
    assert_eq!(second.priority, PRIORITY_SCHEDULED);
}

#[tokio::test]
async fn mark_completed_updates_status() {
    let _guard = db::acquire_test_lock();
    db::clean_test_db();

    let repo = repo();
    let enqueued = repo
        .enqueue(Job::sync_title(121361, ContentKind::Series, None, PRIORITY_INTERACTIVE))
        .await
        .unwrap();

    repo.dequeue().await.unwrap();
    repo.mark_completed(enqueued.id).await.unwrap();

    let job = repo.get_by_id(enqueued.id).await.unwrap().unwrap();
    assert_eq!(job.status, "completed");
    assert!(job.completed_at.is_some());
}

#[tokio::test]
async fn failed_job_returns_to_pending_while_attempts_remain() {
    let _guard = db::acquire_test_lock();
    db::clean_test_db();

    let repo = repo();
    let enqueued = repo
        .enqueue(Job::sync_title(121361, ContentKind::Series, None, PRIORITY_INTERACTIVE))
        .await
        .unwrap();

    repo.dequeue().await.unwrap();
    repo.mark_failed(enqueued.id, "provider hiccup").await.unwrap();

    let job = repo.get_by_id(enqueued.id).await.unwrap().unwrap();
    assert_eq!(job.status, "pending");
    assert_eq!(job.attempts, 1);
    assert!(job.error.is_some());
}

#[tokio::test]
async fn failed_job_becomes_permanent_after_max_attempts() {
    let _guard = db::acquire_test_lock();
    db::clean_test_db();

    let repo = repo();
    let enqueued = repo
        .enqueue(Job::sync_title(121361, ContentKind::Series, None, PRIORITY_INTERACTIVE))
        .await
        .unwrap();

    for _ in 0..3 {
        let job = repo.dequeue().await.unwrap().unwrap();
        repo.mark_failed(job.id, "still broken").await.unwrap();
    }

    let job = repo.get_by_id(enqueued.id).await.unwrap().unwrap();
    assert_eq!(job.status, "failed");
    assert_eq!(job.attempts, 3);
    assert!(job.completed_at.is_some());

    // Exhausted jobs are not dequeued again
    assert!(repo.dequeue().await.unwrap().is_none());
}

#[tokio::test]
async fn abandoned_job_is_failed_despite_remaining_attempts() {
    let _guard = db::acquire_test_lock();
    db::clean_test_db();

    let repo = repo();
    let enqueued = repo
        .enqueue(Job::sync_title(999999, ContentKind::Series, None, PRIORITY_INTERACTIVE))
        .await
        .unwrap();

    repo.dequeue().await.unwrap();
    repo.mark_abandoned(enqueued.id, "series 999999 not found in provider")
        .await
        .unwrap();

    let job = repo.get_by_id(enqueued.id).await.unwrap().unwrap();
    assert_eq!(job.status, "failed");
    assert_eq!(job.attempts, 1);
    assert!(repo.dequeue().await.unwrap().is_none());
}

#[tokio::test]
async fn statistics_count_each_status() {
    let _guard = db::acquire_test_lock();
    db::clean_test_db();

    let repo = repo();

    let completed = repo
        .enqueue(Job::sync_title(1, ContentKind::Series, None, PRIORITY_INTERACTIVE))
        .await
        .unwrap();
    repo.enqueue(Job::sync_title(2, ContentKind::Series, None, PRIORITY_INTERACTIVE))
        .await
        .unwrap();
    repo.enqueue(Job::sync_person(3, None, PRIORITY_SCHEDULED))
        .await
        .unwrap();

    repo.dequeue().await.unwrap();
    repo.mark_completed(completed.id).await.unwrap();

    let stats = repo.get_statistics().await.unwrap();
    assert_eq!(stats.completed_count, 1);
    assert_eq!(stats.pending_count, 2);
    assert_eq!(stats.running_count, 0);
    assert_eq!(stats.total_count, 3);
}
