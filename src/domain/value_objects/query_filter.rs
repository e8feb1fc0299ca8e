use super::ids::PostId;
use super::query_key::{CommentScope, PostsFilter, QueryKey, QueryKind};

/// 複数スロットをまとめて選ぶための述語。
///
/// 種別 → スコープ → ID の順に絞り込み、指定のない段は「すべて」に一致する。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryFilter {
    kind: QueryKind,
    scope: Option<CommentScope>,
    id: Option<i64>,
    posts: Option<PostsFilter>,
}

impl QueryFilter {
    pub fn kind(kind: QueryKind) -> Self {
        Self {
            kind,
            scope: None,
            id: None,
            posts: None,
        }
    }

    /// `["post", id]`
    pub fn post(id: PostId) -> Self {
        Self {
            id: Some(id.value()),
            ..Self::kind(QueryKind::Post)
        }
    }

    /// `["posts", ...]` すべて
    pub fn posts() -> Self {
        Self::kind(QueryKind::Posts)
    }

    /// `["comments", ...]` すべて
    pub fn comments() -> Self {
        Self::kind(QueryKind::Comments)
    }

    /// `["comments", scope, targetId]`
    pub fn comment_thread(scope: CommentScope, target_id: i64) -> Self {
        Self {
            scope: Some(scope),
            id: Some(target_id),
            ..Self::kind(QueryKind::Comments)
        }
    }

    /// 指定したキーだけに一致
    pub fn exact(key: &QueryKey) -> Self {
        match key {
            QueryKey::Post { id } => Self::post(*id),
            QueryKey::Posts { filter } => Self {
                posts: Some(filter.clone()),
                ..Self::posts()
            },
            QueryKey::Comments { scope, target_id } => Self::comment_thread(*scope, *target_id),
        }
    }

    pub fn matches(&self, key: &QueryKey) -> bool {
        if key.kind() != self.kind {
            return false;
        }

        match key {
            QueryKey::Post { id } => self.id.map_or(true, |expected| expected == id.value()),
            QueryKey::Posts { filter } => self
                .posts
                .as_ref()
                .map_or(true, |expected| expected == filter),
            QueryKey::Comments { scope, target_id } => {
                self.scope.map_or(true, |expected| expected == *scope)
                    && self.id.map_or(true, |expected| expected == *target_id)
            }
        }
    }
}

impl From<&QueryKey> for QueryFilter {
    fn from(key: &QueryKey) -> Self {
        QueryFilter::exact(key)
    }
}
