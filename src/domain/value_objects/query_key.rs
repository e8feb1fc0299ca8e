use super::ids::PostId;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SortBy {
    Points,
    #[default]
    Recent,
}

impl SortBy {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortBy::Points => "points",
            SortBy::Recent => "recent",
        }
    }
}

impl FromStr for SortBy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "points" => Ok(SortBy::Points),
            "recent" => Ok(SortBy::Recent),
            other => Err(format!("Unknown sortBy: {other}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }
}

impl FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "asc" => Ok(SortOrder::Asc),
            "desc" => Ok(SortOrder::Desc),
            other => Err(format!("Unknown order: {other}")),
        }
    }
}

/// 投稿一覧クエリの絞り込み条件。組み合わせごとに別スロットになる。
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct PostsFilter {
    pub sort_by: SortBy,
    pub order: SortOrder,
    pub author: Option<String>,
    pub site: Option<String>,
}

impl PostsFilter {
    pub fn new(sort_by: SortBy, order: SortOrder) -> Self {
        Self {
            sort_by,
            order,
            author: None,
            site: None,
        }
    }

    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self
    }

    pub fn with_site(mut self, site: impl Into<String>) -> Self {
        self.site = Some(site.into());
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommentScope {
    /// 投稿直下のルートコメント
    Post,
    /// コメントへの返信
    Comment,
}

impl CommentScope {
    pub fn for_target(is_parent: bool) -> Self {
        if is_parent {
            CommentScope::Comment
        } else {
            CommentScope::Post
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CommentScope::Post => "post",
            CommentScope::Comment => "comment",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueryKind {
    Post,
    Posts,
    Comments,
}

impl QueryKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            QueryKind::Post => "post",
            QueryKind::Posts => "posts",
            QueryKind::Comments => "comments",
        }
    }
}

/// キャッシュスロットのキー
///
/// 文法: `["post", id]` / `["posts", sortBy, order, author?, site?]` /
/// `["comments", "post"|"comment", targetId]`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum QueryKey {
    Post { id: PostId },
    Posts { filter: PostsFilter },
    Comments { scope: CommentScope, target_id: i64 },
}

impl QueryKey {
    pub fn post(id: PostId) -> Self {
        QueryKey::Post { id }
    }

    pub fn posts(filter: PostsFilter) -> Self {
        QueryKey::Posts { filter }
    }

    pub fn comments(scope: CommentScope, target_id: i64) -> Self {
        QueryKey::Comments { scope, target_id }
    }

    /// コメント作成先のスレッドキー
    pub fn comment_thread(target_id: i64, is_parent: bool) -> Self {
        QueryKey::Comments {
            scope: CommentScope::for_target(is_parent),
            target_id,
        }
    }

    pub fn kind(&self) -> QueryKind {
        match self {
            QueryKey::Post { .. } => QueryKind::Post,
            QueryKey::Posts { .. } => QueryKind::Posts,
            QueryKey::Comments { .. } => QueryKind::Comments,
        }
    }

    pub fn segments(&self) -> Vec<String> {
        match self {
            QueryKey::Post { id } => vec!["post".to_string(), id.to_string()],
            QueryKey::Posts { filter } => {
                let mut segments = vec![
                    "posts".to_string(),
                    filter.sort_by.as_str().to_string(),
                    filter.order.as_str().to_string(),
                ];
                if let Some(author) = &filter.author {
                    segments.push(author.clone());
                }
                if let Some(site) = &filter.site {
                    if filter.author.is_none() {
                        segments.push(String::new());
                    }
                    segments.push(site.clone());
                }
                segments
            }
            QueryKey::Comments { scope, target_id } => vec![
                "comments".to_string(),
                scope.as_str().to_string(),
                target_id.to_string(),
            ],
        }
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered: Vec<String> = self
            .segments()
            .into_iter()
            .map(|segment| format!("{segment:?}"))
            .collect();
        write!(f, "[{}]", rendered.join(","))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_matches_key_grammar() {
        assert_eq!(QueryKey::post(PostId::new(7)).to_string(), r#"["post","7"]"#);
        assert_eq!(
            QueryKey::posts(PostsFilter::new(SortBy::Points, SortOrder::Desc)).to_string(),
            r#"["posts","points","desc"]"#
        );
        assert_eq!(
            QueryKey::comment_thread(42, true).to_string(),
            r#"["comments","comment","42"]"#
        );
    }

    #[test]
    fn test_distinct_filters_are_distinct_keys() {
        let base = PostsFilter::new(SortBy::Recent, SortOrder::Desc);
        let by_author = base.clone().with_author("alice");
        assert_ne!(QueryKey::posts(base), QueryKey::posts(by_author));
    }

    #[test]
    fn test_site_without_author_keeps_position() {
        let filter = PostsFilter::new(SortBy::Recent, SortOrder::Asc).with_site("example.com");
        assert_eq!(
            QueryKey::posts(filter).segments(),
            vec!["posts", "recent", "asc", "", "example.com"]
        );
    }
}
