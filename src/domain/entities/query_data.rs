use super::comment::Comment;
use super::post::Post;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub page: u32,
    pub total_pages: u32,
}

impl Pagination {
    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub data: Vec<T>,
    pub pagination: Pagination,
}

impl<T> Page<T> {
    pub fn new(data: Vec<T>, page: u32, total_pages: u32) -> Self {
        Self {
            data,
            pagination: Pagination { page, total_pages },
        }
    }
}

/// 無限スクロール用のページ列
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InfiniteData<T> {
    pub pages: Vec<Page<T>>,
    pub page_params: Vec<u32>,
}

impl<T> InfiniteData<T> {
    pub fn empty() -> Self {
        Self {
            pages: Vec::new(),
            page_params: Vec::new(),
        }
    }

    pub fn from_pages(pages: Vec<Page<T>>) -> Self {
        let page_params = pages.iter().map(|p| p.pagination.page).collect();
        Self { pages, page_params }
    }

    pub fn push_page(&mut self, page: Page<T>) {
        self.page_params.push(page.pagination.page);
        self.pages.push(page);
    }

    pub fn next_page_param(&self) -> Option<u32> {
        let last = self.pages.last()?;
        if last.pagination.has_next() {
            Some(last.pagination.page + 1)
        } else {
            None
        }
    }

    /// 末尾が `page` の直前のページなら、それを足した新しい値を返す
    pub fn with_next_page(&self, page: Page<T>) -> Option<Self>
    where
        T: Clone,
    {
        if self.next_page_param() != Some(page.pagination.page) {
            return None;
        }
        let mut next = self.clone();
        next.push_page(page);
        Some(next)
    }

    pub fn items(&self) -> impl Iterator<Item = &T> {
        self.pages.iter().flat_map(|page| page.data.iter())
    }

    pub fn items_mut(&mut self) -> impl Iterator<Item = &mut T> {
        self.pages.iter_mut().flat_map(|page| page.data.iter_mut())
    }

    pub fn first_page_mut(&mut self) -> Option<&mut Page<T>> {
        self.pages.first_mut()
    }
}

/// スロットに格納される値
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum QueryData {
    Post(Post),
    PostList(InfiniteData<Post>),
    CommentThread(InfiniteData<Comment>),
}

impl QueryData {
    pub fn as_post(&self) -> Option<&Post> {
        match self {
            QueryData::Post(post) => Some(post),
            _ => None,
        }
    }

    pub fn as_post_list(&self) -> Option<&InfiniteData<Post>> {
        match self {
            QueryData::PostList(list) => Some(list),
            _ => None,
        }
    }

    pub fn as_comment_thread(&self) -> Option<&InfiniteData<Comment>> {
        match self {
            QueryData::CommentThread(thread) => Some(thread),
            _ => None,
        }
    }

    /// 読み込み済みページ数（単一投稿は 1）
    pub fn loaded_pages(&self) -> usize {
        match self {
            QueryData::Post(_) => 1,
            QueryData::PostList(list) => list.pages.len(),
            QueryData::CommentThread(thread) => thread.pages.len(),
        }
    }
}
