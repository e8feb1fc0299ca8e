use super::wire::Envelope;
use crate::application::ports::board_api::{BoardApi, CommentSubmission};
use crate::domain::entities::{Comment, Page, Post, UpvoteResult};
use crate::domain::value_objects::{CommentId, CommentScope, PostId, PostsFilter};
use crate::shared::config::ApiConfig;
use crate::shared::error::AppError;
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode, Url};
use serde::de::DeserializeOwned;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

/// コメント一覧の並び順。サーバー既定に合わせる。
const COMMENTS_SORT_BY: &str = "points";
const COMMENTS_ORDER: &str = "desc";

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("invalid base url: {0}")]
    InvalidUrl(String),

    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("unauthorized: {0}")]
    Unauthorized(String),

    #[error("server returned {status}: {message}")]
    Status { status: u16, message: String },

    #[error("invalid response body: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("response has no data")]
    MissingData,
}

impl From<ClientError> for AppError {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::Transport(inner) => AppError::from(inner),
            ClientError::NotFound(message) => AppError::NotFound(message),
            ClientError::Unauthorized(message) => AppError::Unauthorized(message),
            ClientError::InvalidUrl(message) => AppError::ConfigurationError(message),
            ClientError::Decode(inner) => AppError::DeserializationError(inner.to_string()),
            err @ (ClientError::Status { .. } | ClientError::MissingData) => {
                AppError::Network(err.to_string())
            }
        }
    }
}

/// `reqwest` で掲示板サーバーの JSON API を呼び出す
pub struct HttpBoardApi {
    client: Client,
    base_url: Url,
    page_size: u32,
}

impl HttpBoardApi {
    pub fn new(config: &ApiConfig, page_size: u32) -> Result<Self, ClientError> {
        let base_url = Url::parse(&config.base_url)
            .map_err(|err| ClientError::InvalidUrl(format!("{}: {err}", config.base_url)))?;
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.clone())
            .build()?;

        Ok(Self {
            client,
            base_url,
            page_size,
        })
    }

    fn url(&self, path: &str) -> Result<Url, ClientError> {
        self.base_url
            .join(path)
            .map_err(|err| ClientError::InvalidUrl(format!("{path}: {err}")))
    }

    fn page_query(&self, page: u32) -> Vec<(&'static str, String)> {
        vec![
            ("page", page.to_string()),
            ("limit", self.page_size.to_string()),
        ]
    }

    /// レスポンスを共通エンベロープとして読む。失敗応答の本文も読めるよう 4xx でも解析を試みる。
    async fn send<T: DeserializeOwned>(
        &self,
        builder: RequestBuilder,
    ) -> Result<(StatusCode, Envelope<T>), ClientError> {
        let response = builder.send().await?;
        let status = response.status();
        let body = response.text().await?;
        debug!(status = status.as_u16(), "board api responded");

        match status {
            StatusCode::NOT_FOUND => return Err(ClientError::NotFound(error_text(&body))),
            StatusCode::UNAUTHORIZED => return Err(ClientError::Unauthorized(error_text(&body))),
            _ => {}
        }

        match serde_json::from_str::<Envelope<T>>(&body) {
            Ok(envelope) => Ok((status, envelope)),
            Err(_) if !status.is_success() => Err(ClientError::Status {
                status: status.as_u16(),
                message: body,
            }),
            Err(err) => Err(ClientError::Decode(err)),
        }
    }

    async fn send_data<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T, ClientError> {
        let (status, envelope) = self.send::<T>(builder).await?;
        if !status.is_success() || !envelope.success {
            return Err(ClientError::Status {
                status: status.as_u16(),
                message: envelope.error_message(),
            });
        }
        envelope.data.ok_or(ClientError::MissingData)
    }

    async fn send_page<T: DeserializeOwned>(
        &self,
        builder: RequestBuilder,
        page: u32,
    ) -> Result<Page<T>, ClientError> {
        let (status, envelope) = self.send::<Vec<T>>(builder).await?;
        if !status.is_success() || !envelope.success {
            return Err(ClientError::Status {
                status: status.as_u16(),
                message: envelope.error_message(),
            });
        }
        Ok(envelope.into_page(page))
    }
}

fn error_text(body: &str) -> String {
    serde_json::from_str::<Envelope<serde_json::Value>>(body)
        .map(|envelope| envelope.error_message())
        .unwrap_or_else(|_| body.to_string())
}

#[async_trait]
impl BoardApi for HttpBoardApi {
    async fn upvote_post(&self, post_id: PostId) -> Result<UpvoteResult, AppError> {
        let url = self.url(&format!("api/posts/{post_id}/upvote"))?;
        Ok(self.send_data(self.client.post(url)).await?)
    }

    async fn upvote_comment(&self, comment_id: CommentId) -> Result<UpvoteResult, AppError> {
        let url = self.url(&format!("api/comments/{comment_id}/upvote"))?;
        Ok(self.send_data(self.client.post(url)).await?)
    }

    async fn post_comment(
        &self,
        target_id: i64,
        content: &str,
        is_parent: bool,
    ) -> Result<CommentSubmission, AppError> {
        let path = if is_parent {
            format!("api/comments/{target_id}")
        } else {
            format!("api/posts/{target_id}/comment")
        };
        let builder = self
            .client
            .post(self.url(&path)?)
            .form(&[("content", content)]);

        let (status, envelope) = self.send::<Comment>(builder).await?;
        if status.is_success() && envelope.success {
            let comment = envelope.data.ok_or(ClientError::MissingData)?;
            return Ok(CommentSubmission::Created(comment));
        }

        Ok(CommentSubmission::Rejected {
            error: envelope.error_message(),
            is_form_error: envelope.is_form_error,
            message: envelope.message,
        })
    }

    async fn fetch_post(&self, post_id: PostId) -> Result<Post, AppError> {
        let url = self.url(&format!("api/posts/{post_id}"))?;
        Ok(self.send_data(self.client.get(url)).await?)
    }

    async fn fetch_posts(&self, filter: &PostsFilter, page: u32) -> Result<Page<Post>, AppError> {
        let mut query = self.page_query(page);
        query.push(("sortBy", filter.sort_by.as_str().to_string()));
        query.push(("order", filter.order.as_str().to_string()));
        if let Some(author) = &filter.author {
            query.push(("author", author.clone()));
        }
        if let Some(site) = &filter.site {
            query.push(("site", site.clone()));
        }

        let builder = self.client.get(self.url("api/posts")?).query(&query);
        Ok(self.send_page(builder, page).await?)
    }

    async fn fetch_comments(
        &self,
        scope: CommentScope,
        target_id: i64,
        page: u32,
    ) -> Result<Page<Comment>, AppError> {
        let mut query = self.page_query(page);
        query.push(("sortBy", COMMENTS_SORT_BY.to_string()));
        query.push(("order", COMMENTS_ORDER.to_string()));

        let path = match scope {
            CommentScope::Post => {
                query.push(("includeChildren", "true".to_string()));
                format!("api/posts/{target_id}/comments")
            }
            CommentScope::Comment => format!("api/comments/{target_id}/comments"),
        };

        let builder = self.client.get(self.url(&path)?).query(&query);
        Ok(self.send_page(builder, page).await?)
    }
}
