use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MutationKind {
    UpvotePost,
    UpvoteComment,
    CreateComment,
}

impl MutationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MutationKind::UpvotePost => "upvote_post",
            MutationKind::UpvoteComment => "upvote_comment",
            MutationKind::CreateComment => "create_comment",
        }
    }

    /// 失敗時トーストのタイトル
    pub fn failure_title(&self) -> &'static str {
        match self {
            MutationKind::UpvotePost => "Failed to upvote post",
            MutationKind::UpvoteComment => "Failed to upvote comment",
            MutationKind::CreateComment => "Failed to create comment",
        }
    }
}

impl std::fmt::Display for MutationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

