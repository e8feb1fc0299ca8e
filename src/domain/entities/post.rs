use super::upvote::{UpvoteResult, toggle_delta};
use super::user::Author;
use crate::domain::value_objects::PostId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: PostId,
    pub title: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    pub points: i64,
    pub comment_count: i64,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub author: Option<Author>,
    #[serde(default)]
    pub is_upvoted: bool,
}

impl Post {
    pub fn new(id: PostId, title: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            title: title.into(),
            url: None,
            content: None,
            points: 0,
            comment_count: 0,
            created_at,
            author: None,
            is_upvoted: false,
        }
    }

    /// 楽観的な投票トグル
    pub fn toggle_upvote(&mut self) {
        self.points += toggle_delta(self.is_upvoted);
        self.is_upvoted = !self.is_upvoted;
    }

    pub fn apply_upvote_result(&mut self, result: &UpvoteResult) {
        self.points = result.count;
        self.is_upvoted = result.is_upvoted;
    }

    pub fn matches_upvote_result(&self, result: &UpvoteResult) -> bool {
        self.points == result.count && self.is_upvoted == result.is_upvoted
    }
}
