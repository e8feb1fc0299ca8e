use super::upvote::{UpvoteResult, toggle_delta};
use super::user::{Author, SessionUser};
use crate::domain::value_objects::{CommentId, PostId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Upvoter {
    pub user_id: UserId,
}

impl Upvoter {
    pub fn local() -> Self {
        Self {
            user_id: UserId::local(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: CommentId,
    #[serde(default)]
    pub user_id: String,
    pub content: String,
    pub points: i64,
    pub depth: i32,
    pub comment_count: i64,
    pub created_at: DateTime<Utc>,
    pub post_id: PostId,
    #[serde(default)]
    pub parent_comment_id: Option<CommentId>,
    /// サーバーは閲覧ユーザー分だけを返すので、空でなければ「投票済み」
    #[serde(rename = "commentUpvotes", default)]
    pub upvoters: Vec<Upvoter>,
    #[serde(default)]
    pub author: Option<Author>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub child_comments: Option<Vec<Comment>>,
}

/// プレースホルダー生成時に解決する親の情報
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommentParent {
    pub comment_id: CommentId,
    pub post_id: PostId,
    pub depth: i32,
}

impl Comment {
    /// サーバー確定前のコメント。`id` は常に -1。
    pub fn placeholder(
        content: impl Into<String>,
        post_id: PostId,
        parent: Option<CommentParent>,
        user: Option<&SessionUser>,
    ) -> Self {
        let (post_id, parent_comment_id, depth) = match parent {
            Some(parent) => (parent.post_id, Some(parent.comment_id), parent.depth + 1),
            None => (post_id, None, 0),
        };

        Self {
            id: CommentId::PLACEHOLDER,
            user_id: user.map(|u| u.id.to_string()).unwrap_or_default(),
            content: content.into(),
            points: 0,
            depth,
            comment_count: 0,
            created_at: Utc::now(),
            post_id,
            parent_comment_id,
            upvoters: Vec::new(),
            author: Some(
                user.map(SessionUser::as_author)
                    .unwrap_or_else(|| Author::new("", "")),
            ),
            child_comments: None,
        }
    }

    pub fn is_upvoted(&self) -> bool {
        !self.upvoters.is_empty()
    }

    pub fn toggle_upvote(&mut self) {
        let upvoted = self.is_upvoted();
        self.points += toggle_delta(upvoted);
        self.upvoters = if upvoted {
            Vec::new()
        } else {
            vec![Upvoter::local()]
        };
    }

    pub fn apply_upvote_result(&mut self, result: &UpvoteResult) {
        self.points = result.count;
        self.upvoters = if result.is_upvoted {
            vec![Upvoter::local()]
        } else {
            Vec::new()
        };
    }

    /// 自身と子孫のうち `id` に一致するコメントへ `f` を適用する。適用件数を返す。
    pub fn update_matching<F>(&mut self, id: CommentId, f: &mut F) -> usize
    where
        F: FnMut(&mut Comment),
    {
        let mut updated = 0;
        if self.id == id {
            f(self);
            updated += 1;
        }
        if let Some(children) = self.child_comments.as_mut() {
            for child in children.iter_mut() {
                updated += child.update_matching(id, f);
            }
        }
        updated
    }

    pub fn contains(&self, id: CommentId) -> bool {
        self.find(id).is_some()
    }

    pub fn find(&self, id: CommentId) -> Option<&Comment> {
        if self.id == id {
            return Some(self);
        }
        self.child_comments
            .as_ref()
            .and_then(|children| children.iter().find_map(|child| child.find(id)))
    }

    pub fn as_parent(&self) -> CommentParent {
        CommentParent {
            comment_id: self.id,
            post_id: self.post_id,
            depth: self.depth,
        }
    }
}
