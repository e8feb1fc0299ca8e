use chrono::{TimeZone, Utc};
use threadboard_lib::domain::entities::{
    Author, Comment, InfiniteData, Page, Post, QueryData, SessionUser,
};
use threadboard_lib::domain::value_objects::{
    CommentId, CommentScope, PostId, PostsFilter, QueryKey, SortBy, SortOrder, UserId,
};

pub fn post(id: i64, points: i64, is_upvoted: bool) -> Post {
    let created_at = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
    let mut post = Post::new(PostId::new(id), format!("Post {id}"), created_at);
    post.points = points;
    post.is_upvoted = is_upvoted;
    post.comment_count = 0;
    post.author = Some(Author::new("u1", "alice"));
    post
}

pub fn comment(id: i64, post_id: i64, content: &str) -> Comment {
    let mut comment = Comment::placeholder(content, PostId::new(post_id), None, None);
    comment.id = CommentId::new(id);
    comment.user_id = "u2".to_string();
    comment.author = Some(Author::new("u2", "bob"));
    comment.created_at = Utc.with_ymd_and_hms(2025, 1, 2, 0, 0, 0).unwrap();
    comment
}

pub fn session_user() -> SessionUser {
    SessionUser::new(UserId::new("u1"), "alice")
}

pub fn post_key(id: i64) -> QueryKey {
    QueryKey::post(PostId::new(id))
}

pub fn points_desc_key() -> QueryKey {
    QueryKey::posts(PostsFilter::new(SortBy::Points, SortOrder::Desc))
}

pub fn recent_desc_key() -> QueryKey {
    QueryKey::posts(PostsFilter::new(SortBy::Recent, SortOrder::Desc))
}

pub fn post_thread_key(post_id: i64) -> QueryKey {
    QueryKey::comments(CommentScope::Post, post_id)
}

pub fn post_list(posts: Vec<Post>) -> QueryData {
    QueryData::PostList(InfiniteData::from_pages(vec![Page::new(posts, 1, 1)]))
}

pub fn thread(pages: Vec<Vec<Comment>>) -> QueryData {
    let total = pages.len() as u32;
    QueryData::CommentThread(InfiniteData::from_pages(
        pages
            .into_iter()
            .enumerate()
            .map(|(index, data)| Page::new(data, index as u32 + 1, total))
            .collect(),
    ))
}

/// 単体スロットの投稿
pub fn single_post(data: &QueryData) -> Post {
    data.as_post().cloned().expect("slot holds a single post")
}

/// 一覧スロットから投稿を探す
pub fn listed_post(data: &QueryData, id: i64) -> Post {
    data.as_post_list()
        .and_then(|list| list.items().find(|post| post.id == PostId::new(id)).cloned())
        .expect("post is listed")
}

pub fn thread_ids(data: &QueryData) -> Vec<i64> {
    data.as_comment_thread()
        .map(|thread| thread.items().map(|c| c.id.value()).collect())
        .unwrap_or_default()
}
