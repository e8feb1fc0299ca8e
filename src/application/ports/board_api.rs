use crate::domain::entities::{Comment, Page, Post, UpvoteResult};
use crate::domain::value_objects::{CommentId, CommentScope, PostId, PostsFilter};
use crate::shared::error::AppError;
use async_trait::async_trait;

/// コメント投稿の結果。サーバーが入力を拒否した場合はエラーではなく `Rejected`。
#[derive(Debug, Clone, PartialEq)]
pub enum CommentSubmission {
    Created(Comment),
    Rejected {
        error: String,
        is_form_error: bool,
        message: Option<String>,
    },
}

impl CommentSubmission {
    /// `Rejected` を `AppError` に変換する
    pub fn into_result(self) -> Result<Comment, AppError> {
        match self {
            CommentSubmission::Created(comment) => Ok(comment),
            CommentSubmission::Rejected {
                error,
                is_form_error: true,
                ..
            } => Err(AppError::FormError(error)),
            CommentSubmission::Rejected { error, message, .. } => Err(AppError::Network(
                message.map_or_else(|| error.clone(), |m| format!("{error}: {m}")),
            )),
        }
    }
}

/// 掲示板サーバーへのリモート呼び出し
#[async_trait]
pub trait BoardApi: Send + Sync {
    async fn upvote_post(&self, post_id: PostId) -> Result<UpvoteResult, AppError>;

    async fn upvote_comment(&self, comment_id: CommentId) -> Result<UpvoteResult, AppError>;

    /// `is_parent` が真なら `target_id` はコメント、偽なら投稿
    async fn post_comment(
        &self,
        target_id: i64,
        content: &str,
        is_parent: bool,
    ) -> Result<CommentSubmission, AppError>;

    async fn fetch_post(&self, post_id: PostId) -> Result<Post, AppError>;

    async fn fetch_posts(&self, filter: &PostsFilter, page: u32) -> Result<Page<Post>, AppError>;

    async fn fetch_comments(
        &self,
        scope: CommentScope,
        target_id: i64,
        page: u32,
    ) -> Result<Page<Comment>, AppError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejected_form_error_maps_to_form_error() {
        let submission = CommentSubmission::Rejected {
            error: "Comment is too short".to_string(),
            is_form_error: true,
            message: None,
        };
        assert_eq!(
            submission.into_result(),
            Err(AppError::FormError("Comment is too short".to_string()))
        );
    }

    #[test]
    fn test_rejected_server_error_maps_to_network() {
        let submission = CommentSubmission::Rejected {
            error: "Failed to create comment".to_string(),
            is_form_error: false,
            message: Some("db down".to_string()),
        };
        let err = submission.into_result().unwrap_err();
        assert_eq!(err.code(), "NETWORK_ERROR");
        assert!(!err.is_form_error());
    }
}
