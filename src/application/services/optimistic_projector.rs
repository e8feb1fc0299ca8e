use crate::application::ports::cache::QueryCache;
use crate::domain::entities::{
    Comment, CommentParent, MutationTarget, PendingMutation, QueryData,
};
use crate::domain::value_objects::{CommentId, MutationKind, PostId, QueryFilter, QueryKey};
use std::sync::Arc;
use tracing::debug;

/// 投稿が載り得るスロット（単体と全一覧）
pub fn post_filters(post_id: PostId) -> [QueryFilter; 2] {
    [QueryFilter::post(post_id), QueryFilter::posts()]
}

/// 投稿の投票状態を反転した新しい値。投稿を含まなければ `None`。
pub fn toggle_post(data: &QueryData, post_id: PostId) -> Option<QueryData> {
    match data {
        QueryData::Post(post) if post.id == post_id => {
            let mut post = post.clone();
            post.toggle_upvote();
            Some(QueryData::Post(post))
        }
        QueryData::PostList(list) if list.items().any(|post| post.id == post_id) => {
            let mut list = list.clone();
            list.items_mut()
                .filter(|post| post.id == post_id)
                .for_each(|post| post.toggle_upvote());
            Some(QueryData::PostList(list))
        }
        _ => None,
    }
}

/// コメントの投票状態を反転した新しい値。子コメントも対象。
pub fn toggle_comment(data: &QueryData, comment_id: CommentId) -> Option<QueryData> {
    let QueryData::CommentThread(thread) = data else {
        return None;
    };
    if !thread.items().any(|comment| comment.contains(comment_id)) {
        return None;
    }

    let mut thread = thread.clone();
    for comment in thread.items_mut() {
        comment.update_matching(comment_id, &mut Comment::toggle_upvote);
    }
    Some(QueryData::CommentThread(thread))
}

/// 先頭ページの先頭にコメントを差し込む。後続ページはずらさない。
pub fn prepend_to_first_page(data: &QueryData, comment: Comment) -> Option<QueryData> {
    let QueryData::CommentThread(thread) = data else {
        return None;
    };
    let mut thread = thread.clone();
    let first = thread.first_page_mut()?;
    first.data.insert(0, comment);
    Some(QueryData::CommentThread(thread))
}

/// 確定前の変更をキャッシュへ即時に反映する
pub struct OptimisticProjector {
    cache: Arc<dyn QueryCache>,
}

impl OptimisticProjector {
    pub fn new(cache: Arc<dyn QueryCache>) -> Self {
        Self { cache }
    }

    pub fn project_post_upvote(&self, post_id: PostId) -> PendingMutation {
        let snapshots = post_filters(post_id)
            .iter()
            .flat_map(|filter| {
                self.cache
                    .update_matching(filter, &mut |_, data| toggle_post(data, post_id))
            })
            .collect::<Vec<_>>();

        debug!(post_id = %post_id, slots = snapshots.len(), "projected post upvote");
        PendingMutation::new(
            MutationKind::UpvotePost,
            MutationTarget::Post(post_id),
            snapshots,
        )
    }

    pub fn project_comment_upvote(&self, comment_id: CommentId) -> PendingMutation {
        let snapshots = self
            .cache
            .update_matching(&QueryFilter::comments(), &mut |_, data| {
                toggle_comment(data, comment_id)
            });

        debug!(comment_id = %comment_id, slots = snapshots.len(), "projected comment upvote");
        PendingMutation::new(
            MutationKind::UpvoteComment,
            MutationTarget::Comment(comment_id),
            snapshots,
        )
    }

    pub fn project_comment_creation(
        &self,
        target_id: i64,
        content: &str,
        is_parent: bool,
    ) -> PendingMutation {
        let key = QueryKey::comment_thread(target_id, is_parent);
        let parent = if is_parent {
            self.find_cached_parent(CommentId::new(target_id))
        } else {
            None
        };
        let user = self.cache.current_user();
        let placeholder =
            Comment::placeholder(content, PostId::new(target_id), parent, user.as_ref());

        let snapshots = self
            .cache
            .update_matching(&QueryFilter::exact(&key), &mut |_, data| {
                prepend_to_first_page(data, placeholder.clone())
            });

        debug!(key = %key, inserted = !snapshots.is_empty(), "projected comment placeholder");
        PendingMutation::new(
            MutationKind::CreateComment,
            MutationTarget::Thread(key),
            snapshots,
        )
        .with_placeholder(CommentId::PLACEHOLDER)
    }

    fn find_cached_parent(&self, comment_id: CommentId) -> Option<CommentParent> {
        self.cache
            .snapshot_matching(&QueryFilter::comments())
            .iter()
            .filter_map(|snapshot| snapshot.data.as_comment_thread())
            .flat_map(|thread| thread.items())
            .find_map(|comment| comment.find(comment_id))
            .map(Comment::as_parent)
    }
}
