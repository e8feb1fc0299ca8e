use super::query_data::QueryData;
use crate::domain::value_objects::{CommentId, MutationKind, PostId, QueryKey};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use uuid::Uuid;

/// 楽観的更新の直前に取得したスロットの値
#[derive(Debug, Clone)]
pub struct CacheSnapshot {
    pub key: QueryKey,
    pub data: Arc<QueryData>,
}

impl CacheSnapshot {
    pub fn new(key: QueryKey, data: Arc<QueryData>) -> Self {
        Self { key, data }
    }
}

/// ミューテーション対象
#[derive(Debug, Clone, PartialEq)]
pub enum MutationTarget {
    Post(PostId),
    Comment(CommentId),
    Thread(QueryKey),
}

/// 実行中ミューテーションのコンテキスト。
///
/// Reconciler が値で受け取って消費するため、同じコンテキストを二度使うことはできない。
#[derive(Debug)]
pub struct PendingMutation {
    pub id: Uuid,
    pub kind: MutationKind,
    pub target: MutationTarget,
    pub snapshots: Vec<CacheSnapshot>,
    pub placeholder_id: Option<CommentId>,
    pub created_at: DateTime<Utc>,
}

impl PendingMutation {
    pub fn new(kind: MutationKind, target: MutationTarget, snapshots: Vec<CacheSnapshot>) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            target,
            snapshots,
            placeholder_id: None,
            created_at: Utc::now(),
        }
    }

    pub fn with_placeholder(mut self, placeholder_id: CommentId) -> Self {
        self.placeholder_id = Some(placeholder_id);
        self
    }

    pub fn snapshot_for(&self, key: &QueryKey) -> Option<&CacheSnapshot> {
        self.snapshots.iter().find(|snapshot| &snapshot.key == key)
    }

    pub fn is_noop(&self) -> bool {
        self.snapshots.is_empty()
    }
}
