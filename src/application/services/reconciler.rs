use super::optimistic_projector::post_filters;
use crate::application::ports::cache::{InvalidateOptions, QueryCache};
use crate::application::ports::notifier::{Notice, Notifier};
use crate::domain::entities::{Comment, PendingMutation, QueryData, UpvoteResult};
use crate::domain::value_objects::{CommentId, PostId, QueryFilter, QueryKey};
use crate::shared::error::AppError;
use crate::shared::metrics::MutationMetrics;
use std::sync::Arc;
use tracing::{error, info, warn};

/// サーバー確定値で投稿を上書きした値。既に一致していれば `None`。
pub fn apply_post_result(
    data: &QueryData,
    post_id: PostId,
    result: &UpvoteResult,
) -> Option<QueryData> {
    match data {
        QueryData::Post(post) if post.id == post_id && !post.matches_upvote_result(result) => {
            let mut post = post.clone();
            post.apply_upvote_result(result);
            Some(QueryData::Post(post))
        }
        QueryData::PostList(list)
            if list
                .items()
                .any(|post| post.id == post_id && !post.matches_upvote_result(result)) =>
        {
            let mut list = list.clone();
            list.items_mut()
                .filter(|post| post.id == post_id)
                .for_each(|post| post.apply_upvote_result(result));
            Some(QueryData::PostList(list))
        }
        _ => None,
    }
}

/// サーバー確定値でコメントを上書きした値。既に一致していれば `None`。
pub fn apply_comment_result(
    data: &QueryData,
    comment_id: CommentId,
    result: &UpvoteResult,
) -> Option<QueryData> {
    let QueryData::CommentThread(thread) = data else {
        return None;
    };

    let mut next = thread.clone();
    let mut changed = false;
    for comment in next.items_mut() {
        comment.update_matching(comment_id, &mut |c: &mut Comment| {
            let before = (c.points, c.is_upvoted());
            c.apply_upvote_result(result);
            changed |= before != (c.points, c.is_upvoted());
        });
    }
    changed.then_some(QueryData::CommentThread(next))
}

/// 先頭ページから `placeholder_id` の仮コメントを除き、確定したコメントを先頭に置く
pub fn replace_placeholder(
    data: &QueryData,
    placeholder_id: CommentId,
    confirmed: &Comment,
) -> Option<QueryData> {
    let QueryData::CommentThread(thread) = data else {
        return None;
    };
    let mut thread = thread.clone();
    let first = thread.first_page_mut()?;
    if first.data.first() == Some(confirmed)
        && !first.data.iter().any(|comment| comment.id == placeholder_id)
    {
        return None;
    }

    first
        .data
        .retain(|comment| comment.id != placeholder_id && comment.id != confirmed.id);
    first.data.insert(0, confirmed.clone());
    Some(QueryData::CommentThread(thread))
}

/// 確定結果をキャッシュへ反映し、失敗時は巻き戻す
pub struct Reconciler {
    cache: Arc<dyn QueryCache>,
    notifier: Arc<dyn Notifier>,
    metrics: Arc<MutationMetrics>,
}

impl Reconciler {
    pub fn new(
        cache: Arc<dyn QueryCache>,
        notifier: Arc<dyn Notifier>,
        metrics: Arc<MutationMetrics>,
    ) -> Self {
        Self {
            cache,
            notifier,
            metrics,
        }
    }

    pub fn post_upvote_succeeded(
        &self,
        pending: PendingMutation,
        post_id: PostId,
        result: &UpvoteResult,
    ) {
        let mut updated = 0;
        let mut invalidated = 0;
        for filter in post_filters(post_id) {
            updated += self
                .cache
                .update_matching(&filter, &mut |_, data| apply_post_result(data, post_id, result))
                .len();
            invalidated += self
                .cache
                .invalidate(&filter, InvalidateOptions::inactive_only());
        }

        self.metrics.record_success(pending.kind);
        self.metrics.record_invalidations(invalidated);
        info!(
            post_id = %post_id,
            count = result.count,
            is_upvoted = result.is_upvoted,
            updated,
            "post upvote confirmed"
        );
    }

    pub async fn post_upvote_failed(&self, pending: PendingMutation, post_id: PostId, err: &AppError) {
        let primary = QueryKey::post(post_id);
        let restored = match pending.snapshot_for(&primary) {
            Some(snapshot) => {
                self.cache.restore(snapshot.clone());
                true
            }
            None => false,
        };
        // 一覧は楽観値から分岐している可能性があるので取得し直す
        let invalidated = self
            .cache
            .invalidate(&QueryFilter::posts(), InvalidateOptions::refetch_active());

        if restored {
            self.metrics.record_rollback();
        }
        self.metrics.record_invalidations(invalidated);
        self.report_failure(&pending, err).await;
    }

    pub fn comment_upvote_succeeded(
        &self,
        pending: PendingMutation,
        comment_id: CommentId,
        result: &UpvoteResult,
    ) {
        let filter = QueryFilter::comments();
        let updated = self
            .cache
            .update_matching(&filter, &mut |_, data| {
                apply_comment_result(data, comment_id, result)
            })
            .len();
        let invalidated = self
            .cache
            .invalidate(&filter, InvalidateOptions::inactive_only());

        self.metrics.record_success(pending.kind);
        self.metrics.record_invalidations(invalidated);
        info!(
            comment_id = %comment_id,
            count = result.count,
            is_upvoted = result.is_upvoted,
            updated,
            "comment upvote confirmed"
        );
    }

    /// コメントには単体スロットがないため、触れたスレッドをすべて戻す
    pub async fn comment_upvote_failed(&self, pending: PendingMutation, err: &AppError) {
        let restored = pending.snapshots.len();
        for snapshot in pending.snapshots.iter().cloned() {
            self.cache.restore(snapshot);
        }
        if restored > 0 {
            self.metrics.record_rollback();
        }
        self.report_failure(&pending, err).await;
    }

    pub fn comment_created(&self, pending: PendingMutation, thread: &QueryKey, comment: &Comment) {
        let mut confirmed = comment.clone();
        confirmed.upvoters.clear();
        let placeholder_id = pending.placeholder_id.unwrap_or(CommentId::PLACEHOLDER);

        self.cache
            .update_matching(&QueryFilter::exact(thread), &mut |_, data| {
                replace_placeholder(data, placeholder_id, &confirmed)
            });
        let invalidated = self.cache.invalidate(
            &QueryFilter::post(confirmed.post_id),
            InvalidateOptions::refetch_active(),
        );

        self.metrics.record_success(pending.kind);
        self.metrics.record_invalidations(invalidated);
        info!(
            thread = %thread,
            comment_id = %confirmed.id,
            "comment creation confirmed"
        );
    }

    /// プレースホルダーは巻き戻さず、スレッドごと取得し直して消す
    pub async fn comment_creation_failed(
        &self,
        pending: PendingMutation,
        thread: &QueryKey,
        err: &AppError,
    ) {
        let invalidated = self
            .cache
            .invalidate(&QueryFilter::exact(thread), InvalidateOptions::refetch_all());
        self.metrics.record_invalidations(invalidated);

        if err.is_form_error() {
            self.metrics.record_failure(pending.kind);
            info!(thread = %thread, error = %err, "comment rejected by server");
            return;
        }
        self.report_failure(&pending, err).await;
    }

    async fn report_failure(&self, pending: &PendingMutation, err: &AppError) {
        self.metrics.record_failure(pending.kind);
        if err.is_not_found() {
            warn!(
                mutation = %pending.kind,
                target = ?pending.target,
                error = %err,
                "target no longer exists"
            );
        } else {
            error!(
                mutation = %pending.kind,
                target = ?pending.target,
                error = %err,
                "mutation failed"
            );
        }

        self.notifier
            .notify(Notice::error(pending.kind.failure_title(), err.user_message()))
            .await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::notifier::NoticeLevel;
    use crate::application::services::optimistic_projector::OptimisticProjector;
    use crate::domain::entities::{InfiniteData, Page, Post};
    use crate::domain::value_objects::{CommentScope, PostsFilter, SortBy, SortOrder};
    use crate::infrastructure::cache::ViewIndex;
    use async_trait::async_trait;
    use chrono::Utc;
    use mockall::mock;

    mock! {
        pub Notify {}

        #[async_trait]
        impl Notifier for Notify {
            async fn notify(&self, notice: Notice);
        }
    }

    fn post(id: i64, points: i64, is_upvoted: bool) -> Post {
        let mut post = Post::new(PostId::new(id), "title", Utc::now());
        post.points = points;
        post.is_upvoted = is_upvoted;
        post
    }

    fn list_key() -> QueryKey {
        QueryKey::posts(PostsFilter::new(SortBy::Points, SortOrder::Desc))
    }

    fn seeded(cache: &ViewIndex) {
        cache.set(QueryKey::post(PostId::new(7)), QueryData::Post(post(7, 3, false)));
        cache.set(
            list_key(),
            QueryData::PostList(InfiniteData::from_pages(vec![Page::new(
                vec![post(7, 3, false)],
                1,
                1,
            )])),
        );
    }

    fn reconciler(cache: Arc<ViewIndex>, notifier: MockNotify) -> Reconciler {
        Reconciler::new(cache, Arc::new(notifier), Arc::new(MutationMetrics::new()))
    }

    #[test]
    fn test_apply_post_result_is_idempotent() {
        let data = QueryData::Post(post(7, 3, false));
        let result = UpvoteResult::new(5, true);

        let once = apply_post_result(&data, PostId::new(7), &result).unwrap();
        assert_eq!(once.as_post().unwrap().points, 5);
        assert!(apply_post_result(&once, PostId::new(7), &result).is_none());
    }

    #[test]
    fn test_replace_placeholder_is_idempotent() {
        let mut placeholder = Comment::placeholder("hello", PostId::new(7), None, None);
        let data = QueryData::CommentThread(InfiniteData::from_pages(vec![Page::new(
            vec![placeholder.clone()],
            1,
            1,
        )]));
        placeholder.id = CommentId::new(99);

        let once = replace_placeholder(&data, CommentId::PLACEHOLDER, &placeholder).unwrap();
        assert!(replace_placeholder(&once, CommentId::PLACEHOLDER, &placeholder).is_none());
        let items: Vec<_> = once.as_comment_thread().unwrap().items().cloned().collect();
        assert_eq!(items, vec![placeholder]);
    }

    #[test]
    fn test_post_upvote_success_overwrites_all_slots() {
        let cache = Arc::new(ViewIndex::new(10));
        seeded(&cache);
        cache.mount(&list_key());
        let projector = OptimisticProjector::new(cache.clone());
        let reconciler = reconciler(cache.clone(), MockNotify::new());

        let pending = projector.project_post_upvote(PostId::new(7));
        reconciler.post_upvote_succeeded(pending, PostId::new(7), &UpvoteResult::new(5, true));

        let single = cache.get(&QueryKey::post(PostId::new(7))).unwrap();
        assert_eq!(single.as_post().unwrap().points, 5);
        let list = cache.get(&list_key()).unwrap();
        assert_eq!(list.as_post_list().unwrap().items().next().unwrap().points, 5);

        // 非表示の単体スロットだけ古いとマークされる
        assert!(cache.status(&QueryKey::post(PostId::new(7))).unwrap().is_invalidated);
        assert!(!cache.status(&list_key()).unwrap().is_invalidated);
        assert!(cache.take_refetch_queue().is_empty());
    }

    #[tokio::test]
    async fn test_post_upvote_failure_restores_primary_and_notifies() {
        let cache = Arc::new(ViewIndex::new(10));
        seeded(&cache);
        let before = cache.get(&QueryKey::post(PostId::new(7))).unwrap();

        let mut notifier = MockNotify::new();
        notifier
            .expect_notify()
            .withf(|notice| {
                notice.level == NoticeLevel::Error && notice.title == "Failed to upvote post"
            })
            .times(1)
            .returning(|_| ());

        let projector = OptimisticProjector::new(cache.clone());
        let reconciler = reconciler(cache.clone(), notifier);

        let pending = projector.project_post_upvote(PostId::new(7));
        reconciler
            .post_upvote_failed(pending, PostId::new(7), &AppError::Network("down".into()))
            .await;

        let after = cache.get(&QueryKey::post(PostId::new(7))).unwrap();
        assert!(Arc::ptr_eq(&before, &after));
        assert!(cache.status(&list_key()).unwrap().is_invalidated);
    }

    #[tokio::test]
    async fn test_form_error_does_not_toast() {
        let cache = Arc::new(ViewIndex::new(10));
        let key = QueryKey::comments(CommentScope::Post, 7);
        cache.set(
            key.clone(),
            QueryData::CommentThread(InfiniteData::from_pages(vec![Page::new(vec![], 1, 1)])),
        );

        let mut notifier = MockNotify::new();
        notifier.expect_notify().times(0);
        let projector = OptimisticProjector::new(cache.clone());
        let reconciler = reconciler(cache.clone(), notifier);

        let pending = projector.project_comment_creation(7, "hello", false);
        reconciler
            .comment_creation_failed(pending, &key, &AppError::FormError("spam".into()))
            .await;

        assert!(cache.status(&key).unwrap().is_invalidated);
        assert_eq!(cache.take_refetch_queue(), vec![key]);
    }
}
