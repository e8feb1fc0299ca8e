use serde::{Deserialize, Serialize};

/// サーバーが返す投票後の確定値。差分ではなく絶対値。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpvoteResult {
    pub count: i64,
    pub is_upvoted: bool,
}

impl UpvoteResult {
    pub fn new(count: i64, is_upvoted: bool) -> Self {
        Self { count, is_upvoted }
    }
}

/// 楽観的トグルで加算する点数
pub fn toggle_delta(currently_upvoted: bool) -> i64 {
    if currently_upvoted { -1 } else { 1 }
}
