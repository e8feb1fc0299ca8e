use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use threadboard_lib::application::ports::board_api::{BoardApi, CommentSubmission};
use threadboard_lib::domain::entities::{Comment, Page, Post, UpvoteResult};
use threadboard_lib::domain::value_objects::{CommentId, CommentScope, PostId, PostsFilter};
use threadboard_lib::shared::error::AppError;
use tokio::sync::Notify;

/// 応答を順番に返すサーバーの代役。取得系は保持している状態をそのまま返す。
#[derive(Default)]
pub struct ScriptedBoardApi {
    upvote_post: Mutex<VecDeque<Result<UpvoteResult, AppError>>>,
    upvote_comment: Mutex<VecDeque<Result<UpvoteResult, AppError>>>,
    post_comment: Mutex<VecDeque<Result<CommentSubmission, AppError>>>,
    posts: Mutex<Vec<Post>>,
    total_pages: Mutex<u32>,
    threads: Mutex<HashMap<(CommentScope, i64), Vec<Comment>>>,
    calls: Mutex<Vec<String>>,
    gates: Mutex<HashMap<&'static str, Arc<Notify>>>,
}

impl ScriptedBoardApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_upvote_post(&self, response: Result<UpvoteResult, AppError>) {
        self.upvote_post.lock().unwrap().push_back(response);
    }

    pub fn push_upvote_comment(&self, response: Result<UpvoteResult, AppError>) {
        self.upvote_comment.lock().unwrap().push_back(response);
    }

    pub fn push_post_comment(&self, response: Result<CommentSubmission, AppError>) {
        self.post_comment.lock().unwrap().push_back(response);
    }

    pub fn set_posts(&self, posts: Vec<Post>) {
        *self.posts.lock().unwrap() = posts;
    }

    /// 投稿一覧の総ページ数。2 ページ目以降は空で返す。
    pub fn set_total_pages(&self, total: u32) {
        *self.total_pages.lock().unwrap() = total;
    }

    /// 次の `operation` 呼び出しを、返したゲートが開くまで止める
    pub fn hold(&self, operation: &'static str) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        self.gates.lock().unwrap().insert(operation, gate.clone());
        gate
    }

    async fn pass(&self, operation: &'static str) {
        let gate = self.gates.lock().unwrap().remove(operation);
        if let Some(gate) = gate {
            gate.notified().await;
        }
    }

    pub fn set_thread(&self, scope: CommentScope, target_id: i64, comments: Vec<Comment>) {
        self.threads
            .lock()
            .unwrap()
            .insert((scope, target_id), comments);
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }

    fn next<T>(queue: &Mutex<VecDeque<Result<T, AppError>>>) -> Result<T, AppError> {
        queue
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(AppError::Internal("no scripted response".to_string())))
    }
}

#[async_trait]
impl BoardApi for ScriptedBoardApi {
    async fn upvote_post(&self, post_id: PostId) -> Result<UpvoteResult, AppError> {
        self.record(format!("upvote_post:{post_id}"));
        self.pass("upvote_post").await;
        Self::next(&self.upvote_post)
    }

    async fn upvote_comment(&self, comment_id: CommentId) -> Result<UpvoteResult, AppError> {
        self.record(format!("upvote_comment:{comment_id}"));
        Self::next(&self.upvote_comment)
    }

    async fn post_comment(
        &self,
        target_id: i64,
        content: &str,
        is_parent: bool,
    ) -> Result<CommentSubmission, AppError> {
        self.record(format!("post_comment:{target_id}:{content}:{is_parent}"));
        let response = Self::next(&self.post_comment);
        if let Ok(CommentSubmission::Created(comment)) = &response {
            let scope = CommentScope::for_target(is_parent);
            self.threads
                .lock()
                .unwrap()
                .entry((scope, target_id))
                .or_default()
                .insert(0, comment.clone());
        }
        response
    }

    async fn fetch_post(&self, post_id: PostId) -> Result<Post, AppError> {
        self.record(format!("fetch_post:{post_id}"));
        self.posts
            .lock()
            .unwrap()
            .iter()
            .find(|post| post.id == post_id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("post {post_id}")))
    }

    async fn fetch_posts(&self, filter: &PostsFilter, page: u32) -> Result<Page<Post>, AppError> {
        self.record(format!("fetch_posts:{}:{page}", filter.sort_by.as_str()));
        self.pass("fetch_posts").await;
        let total = (*self.total_pages.lock().unwrap()).max(1);
        let posts = if page == 1 {
            self.posts.lock().unwrap().clone()
        } else {
            Vec::new()
        };
        Ok(Page::new(posts, page, total))
    }

    async fn fetch_comments(
        &self,
        scope: CommentScope,
        target_id: i64,
        page: u32,
    ) -> Result<Page<Comment>, AppError> {
        self.record(format!("fetch_comments:{}:{target_id}:{page}", scope.as_str()));
        let comments = self
            .threads
            .lock()
            .unwrap()
            .get(&(scope, target_id))
            .cloned()
            .unwrap_or_default();
        Ok(Page::new(comments, page, 1))
    }
}
