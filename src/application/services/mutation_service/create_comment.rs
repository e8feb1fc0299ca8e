use super::OptimisticMutation;
use crate::application::ports::board_api::BoardApi;
use crate::application::ports::cache::QueryCache;
use crate::application::services::optimistic_projector::OptimisticProjector;
use crate::application::services::reconciler::Reconciler;
use crate::domain::entities::{Comment, PendingMutation};
use crate::domain::value_objects::{MutationKind, QueryFilter, QueryKey};
use crate::shared::error::AppError;
use crate::shared::validation::{validate_comment_content, validate_identifier};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCommentArgs {
    /// `is_parent` が真ならコメント ID、偽なら投稿 ID
    pub target_id: i64,
    pub content: String,
    pub is_parent: bool,
}

impl CreateCommentArgs {
    pub fn on_post(post_id: i64, content: impl Into<String>) -> Self {
        Self {
            target_id: post_id,
            content: content.into(),
            is_parent: false,
        }
    }

    pub fn reply_to(comment_id: i64, content: impl Into<String>) -> Self {
        Self {
            target_id: comment_id,
            content: content.into(),
            is_parent: true,
        }
    }

    pub fn thread_key(&self) -> QueryKey {
        QueryKey::comment_thread(self.target_id, self.is_parent)
    }
}

/// コメント投稿
pub struct CreateCommentMutation {
    api: Arc<dyn BoardApi>,
    cache: Arc<dyn QueryCache>,
    projector: Arc<OptimisticProjector>,
    reconciler: Arc<Reconciler>,
}

impl CreateCommentMutation {
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
impl OptimisticMutation for CreateCommentMutation {
    type Args = CreateCommentArgs;
    type Output = Comment;

    fn kind(&self) -> MutationKind {
        MutationKind::CreateComment
    }

    fn validate(&self, args: CreateCommentArgs) -> Result<CreateCommentArgs, AppError> {
        validate_identifier(args.target_id, if args.is_parent { "comment" } else { "post" })?;
        let content = validate_comment_content(&args.content)?;
        Ok(CreateCommentArgs { content, ..args })
    }

    fn on_mutate(&self, args: &CreateCommentArgs) -> PendingMutation {
        self.cache.cancel(&QueryFilter::exact(&args.thread_key()));
        self.projector
            .project_comment_creation(args.target_id, &args.content, args.is_parent)
    }

    async fn dispatch(&self, args: &CreateCommentArgs) -> Result<Comment, AppError> {
        self.api
            .post_comment(args.target_id, &args.content, args.is_parent)
            .await?
            .into_result()
    }

    async fn on_success(&self, pending: PendingMutation, args: &CreateCommentArgs, output: &Comment) {
        self.reconciler
            .comment_created(pending, &args.thread_key(), output);
    }

    async fn on_error(&self, pending: PendingMutation, args: &CreateCommentArgs, err: &AppError) {
        self.reconciler
            .comment_creation_failed(pending, &args.thread_key(), err)
            .await;
    }
}
