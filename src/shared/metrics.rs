use crate::domain::value_objects::MutationKind;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};

/// 時刻未記録を表す値
const NEVER: i64 = i64::MIN;

#[derive(Debug, Clone, Copy)]
enum Outcome {
    Confirmed,
    Failed,
}

/// 1 種類のミューテーションの決着回数と、最後に決着した時刻
#[derive(Debug)]
struct OutcomeCounter {
    confirmed: AtomicU64,
    failed: AtomicU64,
    last_confirmed_ms: AtomicI64,
    last_failed_ms: AtomicI64,
}

impl Default for OutcomeCounter {
    fn default() -> Self {
        Self {
            confirmed: AtomicU64::new(0),
            failed: AtomicU64::new(0),
            last_confirmed_ms: AtomicI64::new(NEVER),
            last_failed_ms: AtomicI64::new(NEVER),
        }
    }
}

impl OutcomeCounter {
    fn record(&self, outcome: Outcome) {
        let (count, at) = match outcome {
            Outcome::Confirmed => (&self.confirmed, &self.last_confirmed_ms),
            Outcome::Failed => (&self.failed, &self.last_failed_ms),
        };
        count.fetch_add(1, Ordering::Relaxed);
        at.store(Utc::now().timestamp_millis(), Ordering::Relaxed);
    }

    fn snapshot(&self) -> OutcomeSnapshot {
        OutcomeSnapshot {
            successes: self.confirmed.load(Ordering::Relaxed),
            failures: self.failed.load(Ordering::Relaxed),
            last_success_at: recorded_at(&self.last_confirmed_ms),
            last_failure_at: recorded_at(&self.last_failed_ms),
        }
    }
}

fn recorded_at(cell: &AtomicI64) -> Option<DateTime<Utc>> {
    match cell.load(Ordering::Relaxed) {
        NEVER => None,
        millis => DateTime::from_timestamp_millis(millis),
    }
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct OutcomeSnapshot {
    pub successes: u64,
    pub failures: u64,
    pub last_success_at: Option<DateTime<Utc>>,
    pub last_failure_at: Option<DateTime<Utc>>,
}

/// ミューテーション種別ごとの成功/失敗回数と、巻き戻し・無効化の件数
#[derive(Debug, Default)]
pub struct MutationMetrics {
    upvote_post: OutcomeCounter,
    upvote_comment: OutcomeCounter,
    create_comment: OutcomeCounter,
    rollbacks: AtomicU64,
    invalidations: AtomicU64,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct MutationMetricsSnapshot {
    pub upvote_post: OutcomeSnapshot,
    pub upvote_comment: OutcomeSnapshot,
    pub create_comment: OutcomeSnapshot,
    pub rollbacks: u64,
    pub invalidations: u64,
}

impl MutationMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    fn counter(&self, kind: MutationKind) -> &OutcomeCounter {
        match kind {
            MutationKind::UpvotePost => &self.upvote_post,
            MutationKind::UpvoteComment => &self.upvote_comment,
            MutationKind::CreateComment => &self.create_comment,
        }
    }

    pub fn record_success(&self, kind: MutationKind) {
        self.counter(kind).record(Outcome::Confirmed);
    }

    pub fn record_failure(&self, kind: MutationKind) {
        self.counter(kind).record(Outcome::Failed);
    }

    pub fn record_rollback(&self) {
        self.rollbacks.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_invalidations(&self, count: usize) {
        self.invalidations
            .fetch_add(count as u64, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MutationMetricsSnapshot {
        MutationMetricsSnapshot {
            upvote_post: self.upvote_post.snapshot(),
            upvote_comment: self.upvote_comment.snapshot(),
            create_comment: self.create_comment.snapshot(),
            rollbacks: self.rollbacks.load(Ordering::Relaxed),
            invalidations: self.invalidations.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_records_per_kind() {
        let metrics = MutationMetrics::new();
        metrics.record_success(MutationKind::UpvotePost);
        metrics.record_failure(MutationKind::CreateComment);
        metrics.record_rollback();
        metrics.record_invalidations(3);

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.upvote_post.successes, 1);
        assert!(snapshot.upvote_post.last_success_at.is_some());
        assert!(snapshot.upvote_post.last_failure_at.is_none());
        assert_eq!(snapshot.upvote_comment, OutcomeSnapshot {
            successes: 0,
            failures: 0,
            last_success_at: None,
            last_failure_at: None,
        });
        assert_eq!(snapshot.create_comment.failures, 1);
        assert_eq!(snapshot.rollbacks, 1);
        assert_eq!(snapshot.invalidations, 3);
    }
}
