use super::OptimisticMutation;
use crate::application::ports::board_api::BoardApi;
use crate::application::ports::cache::QueryCache;
use crate::application::services::optimistic_projector::{OptimisticProjector, post_filters};
use crate::application::services::reconciler::Reconciler;
use crate::domain::entities::{PendingMutation, UpvoteResult};
use crate::domain::value_objects::{CommentId, MutationKind, PostId, QueryFilter};
use crate::shared::error::AppError;
use crate::shared::validation::validate_identifier;
use async_trait::async_trait;
use std::sync::Arc;

/// 投稿への投票
pub struct UpvotePostMutation {
    api: Arc<dyn BoardApi>,
    cache: Arc<dyn QueryCache>,
    projector: Arc<OptimisticProjector>,
    reconciler: Arc<Reconciler>,
}

impl UpvotePostMutation {
    pub fn new(
        api: Arc<dyn BoardApi>,
        cache: Arc<dyn QueryCache>,
        projector: Arc<OptimisticProjector>,
        reconciler: Arc<Reconciler>,
    ) -> Self {
        Self {
            api,
            cache,
            projector,
            reconciler,
        }
    }
}

#[async_trait]
impl OptimisticMutation for UpvotePostMutation {
    type Args = PostId;
    type Output = UpvoteResult;

    fn kind(&self) -> MutationKind {
        MutationKind::UpvotePost
    }

    fn validate(&self, post_id: PostId) -> Result<PostId, AppError> {
        validate_identifier(post_id.value(), "post")?;
        Ok(post_id)
    }

    fn on_mutate(&self, post_id: &PostId) -> PendingMutation {
        for filter in post_filters(*post_id) {
            self.cache.cancel(&filter);
        }
        self.projector.project_post_upvote(*post_id)
    }

    async fn dispatch(&self, post_id: &PostId) -> Result<UpvoteResult, AppError> {
        self.api.upvote_post(*post_id).await
    }

    async fn on_success(&self, pending: PendingMutation, post_id: &PostId, output: &UpvoteResult) {
        self.reconciler.post_upvote_succeeded(pending, *post_id, output);
    }

    async fn on_error(&self, pending: PendingMutation, post_id: &PostId, err: &AppError) {
        self.reconciler.post_upvote_failed(pending, *post_id, err).await;
    }
}

/// コメントへの投票
pub struct UpvoteCommentMutation {
    api: Arc<dyn BoardApi>,
    cache: Arc<dyn QueryCache>,
    projector: Arc<OptimisticProjector>,
    reconciler: Arc<Reconciler>,
}

impl UpvoteCommentMutation {
    pub fn new(
        api: Arc<dyn BoardApi>,
        cache: Arc<dyn QueryCache>,
        projector: Arc<OptimisticProjector>,
        reconciler: Arc<Reconciler>,
    ) -> Self {
        Self {
            api,
            cache,
            projector,
            reconciler,
        }
    }
}

#[async_trait]
impl OptimisticMutation for UpvoteCommentMutation {
    type Args = CommentId;
    type Output = UpvoteResult;

    fn kind(&self) -> MutationKind {
        MutationKind::UpvoteComment
    }

    fn validate(&self, comment_id: CommentId) -> Result<CommentId, AppError> {
        validate_identifier(comment_id.value(), "comment")?;
        Ok(comment_id)
    }

    fn on_mutate(&self, comment_id: &CommentId) -> PendingMutation {
        self.cache.cancel(&QueryFilter::comments());
        self.projector.project_comment_upvote(*comment_id)
    }

    async fn dispatch(&self, comment_id: &CommentId) -> Result<UpvoteResult, AppError> {
        self.api.upvote_comment(*comment_id).await
    }

    async fn on_success(
        &self,
        pending: PendingMutation,
        comment_id: &CommentId,
        output: &UpvoteResult,
    ) {
        self.reconciler
            .comment_upvote_succeeded(pending, *comment_id, output);
    }

    async fn on_error(&self, pending: PendingMutation, _comment_id: &CommentId, err: &AppError) {
        self.reconciler.comment_upvote_failed(pending, err).await;
    }
}
