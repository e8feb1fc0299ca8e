use crate::application::ports::board_api::BoardApi;
use crate::application::ports::cache::QueryCache;
use crate::domain::entities::{Comment, InfiniteData, Page, Post, QueryData};
use crate::domain::value_objects::{CommentScope, PostsFilter, QueryKey};
use crate::shared::error::AppError;
use futures::future::join_all;
use std::sync::Arc;
use tracing::{debug, warn};

/// スロットの取得・再取得を行うサービス
pub struct QueryRefresher {
    api: Arc<dyn BoardApi>,
    cache: Arc<dyn QueryCache>,
}

impl QueryRefresher {
    pub fn new(api: Arc<dyn BoardApi>, cache: Arc<dyn QueryCache>) -> Self {
        Self { api, cache }
    }

    /// スロットを取得し直す。途中でキャンセルされた場合は `Ok(false)`。
    pub async fn fetch_query(&self, key: &QueryKey) -> Result<bool, AppError> {
        let loaded_pages = self
            .cache
            .get(key)
            .map_or(1, |data| data.loaded_pages().max(1));
        let ticket = self.cache.begin_fetch(key);

        let loaded = match key {
            QueryKey::Post { id } => self.api.fetch_post(*id).await.map(QueryData::Post),
            QueryKey::Posts { filter } => self
                .load_posts(filter, loaded_pages)
                .await
                .map(QueryData::PostList),
            QueryKey::Comments { scope, target_id } => self
                .load_comments(*scope, *target_id, loaded_pages)
                .await
                .map(QueryData::CommentThread),
        };

        match loaded {
            Ok(data) => {
                let accepted = self.cache.complete_fetch(&ticket, data);
                debug!(key = %key, accepted, "fetched query");
                Ok(accepted)
            }
            Err(err) => {
                self.cache.fail_fetch(&ticket);
                warn!(key = %key, error = %err, "failed to fetch query");
                Err(err)
            }
        }
    }

    /// 無限リストに次のページを追加する。次がなければ `Ok(false)`。
    ///
    /// 取得中に楽観的更新や巻き戻しが入っても、その時点のスロット値へページを足す。
    pub async fn fetch_next_page(&self, key: &QueryKey) -> Result<bool, AppError> {
        let Some(current) = self.cache.get(key) else {
            return self.fetch_query(key).await;
        };

        let next = match current.as_ref() {
            QueryData::Post(_) => None,
            QueryData::PostList(list) => list.next_page_param(),
            QueryData::CommentThread(thread) => thread.next_page_param(),
        };
        let Some(page) = next else {
            return Ok(false);
        };
        drop(current);

        let ticket = self.cache.begin_fetch(key);
        let appended = match key {
            QueryKey::Posts { filter } => {
                self.api.fetch_posts(filter, page).await.map(|next| {
                    self.cache.append_page(&ticket, &mut |_, data| {
                        data.as_post_list()?
                            .with_next_page(next.clone())
                            .map(QueryData::PostList)
                    })
                })
            }
            QueryKey::Comments { scope, target_id } => self
                .api
                .fetch_comments(*scope, *target_id, page)
                .await
                .map(|next| {
                    self.cache.append_page(&ticket, &mut |_, data| {
                        data.as_comment_thread()?
                            .with_next_page(next.clone())
                            .map(QueryData::CommentThread)
                    })
                }),
            QueryKey::Post { .. } => Err(AppError::Internal(format!(
                "slot {key} does not hold paginated data"
            ))),
        };

        match appended {
            Ok(accepted) => {
                debug!(key = %key, page, accepted, "fetched next page");
                Ok(accepted)
            }
            Err(err) => {
                self.cache.fail_fetch(&ticket);
                warn!(key = %key, page, error = %err, "failed to fetch next page");
                Err(err)
            }
        }
    }

    /// 無効化で積まれたスロットをまとめて取得し直す。成功した件数を返す。
    pub async fn refresh_pending(&self) -> usize {
        let keys = self.cache.take_refetch_queue();
        if keys.is_empty() {
            return 0;
        }

        let results = join_all(keys.iter().map(|key| self.fetch_query(key))).await;
        let refreshed = results
            .iter()
            .filter(|result| matches!(result, Ok(true)))
            .count();
        debug!(queued = keys.len(), refreshed, "refreshed invalidated queries");
        refreshed
    }

    /// 購読を開始する。データがないか古ければ取得する。
    pub async fn mount(&self, key: &QueryKey) -> Result<Option<Arc<QueryData>>, AppError> {
        if self.cache.mount(key) {
            self.fetch_query(key).await?;
        }
        Ok(self.cache.get(key))
    }

    pub fn unmount(&self, key: &QueryKey) {
        self.cache.unmount(key);
    }

    async fn load_posts(
        &self,
        filter: &PostsFilter,
        pages: usize,
    ) -> Result<InfiniteData<Post>, AppError> {
        let fetched = join_all((1..=pages as u32).map(|page| self.api.fetch_posts(filter, page))).await;
        collect_pages(fetched)
    }

    async fn load_comments(
        &self,
        scope: CommentScope,
        target_id: i64,
        pages: usize,
    ) -> Result<InfiniteData<Comment>, AppError> {
        let fetched = join_all(
            (1..=pages as u32).map(|page| self.api.fetch_comments(scope, target_id, page)),
        )
        .await;
        collect_pages(fetched)
    }
}

fn collect_pages<T>(fetched: Vec<Result<Page<T>, AppError>>) -> Result<InfiniteData<T>, AppError> {
    let pages = fetched.into_iter().collect::<Result<Vec<_>, _>>()?;
    Ok(InfiniteData::from_pages(pages))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::board_api::CommentSubmission;
    use crate::domain::entities::UpvoteResult;
    use crate::domain::value_objects::{CommentId, PostId, SortBy, SortOrder};
    use crate::infrastructure::cache::ViewIndex;
    use async_trait::async_trait;
    use chrono::Utc;
    use mockall::{mock, predicate::*};

    mock! {
        pub Api {}

        #[async_trait]
        impl BoardApi for Api {
            async fn upvote_post(&self, post_id: PostId) -> Result<UpvoteResult, AppError>;
            async fn upvote_comment(&self, comment_id: CommentId) -> Result<UpvoteResult, AppError>;
            async fn post_comment(
                &self,
                target_id: i64,
                content: &str,
                is_parent: bool,
            ) -> Result<CommentSubmission, AppError>;
            async fn fetch_post(&self, post_id: PostId) -> Result<Post, AppError>;
            async fn fetch_posts(&self, filter: &PostsFilter, page: u32) -> Result<Page<Post>, AppError>;
            async fn fetch_comments(
                &self,
                scope: CommentScope,
                target_id: i64,
                page: u32,
            ) -> Result<Page<Comment>, AppError>;
        }
    }

    fn post(id: i64) -> Post {
        Post::new(PostId::new(id), format!("post {id}"), Utc::now())
    }

    fn list_key() -> QueryKey {
        QueryKey::posts(PostsFilter::new(SortBy::Recent, SortOrder::Desc))
    }

    #[tokio::test]
    async fn test_mount_fetches_missing_slot() {
        let mut api = MockApi::new();
        api.expect_fetch_post()
            .with(eq(PostId::new(7)))
            .times(1)
            .returning(|id| Ok(post(id.value())));
        let cache = Arc::new(ViewIndex::new(10));
        let refresher = QueryRefresher::new(Arc::new(api), cache.clone());

        let key = QueryKey::post(PostId::new(7));
        let data = refresher.mount(&key).await.unwrap().unwrap();
        assert_eq!(data.as_post().unwrap().id, PostId::new(7));

        // 二度目はキャッシュから返る
        refresher.mount(&key).await.unwrap();
        assert_eq!(cache.status(&key).unwrap().observers, 2);
    }

    #[tokio::test]
    async fn test_fetch_next_page_appends_until_last() {
        let mut api = MockApi::new();
        api.expect_fetch_posts()
            .returning(|_, page| Ok(Page::new(vec![post(page as i64)], page, 2)));
        let cache = Arc::new(ViewIndex::new(10));
        let refresher = QueryRefresher::new(Arc::new(api), cache.clone());

        assert!(refresher.fetch_query(&list_key()).await.unwrap());
        assert!(refresher.fetch_next_page(&list_key()).await.unwrap());
        assert!(!refresher.fetch_next_page(&list_key()).await.unwrap());

        let data = cache.get(&list_key()).unwrap();
        let list = data.as_post_list().unwrap();
        assert_eq!(list.page_params, vec![1, 2]);
    }

    #[tokio::test]
    async fn test_refetch_reloads_every_loaded_page() {
        let mut api = MockApi::new();
        api.expect_fetch_posts()
            .times(2)
            .returning(|_, page| Ok(Page::new(vec![post(page as i64)], page, 3)));
        let cache = Arc::new(ViewIndex::new(10));
        cache.set(
            list_key(),
            QueryData::PostList(InfiniteData::from_pages(vec![
                Page::new(vec![], 1, 3),
                Page::new(vec![], 2, 3),
            ])),
        );
        let refresher = QueryRefresher::new(Arc::new(api), cache.clone());

        assert!(refresher.fetch_query(&list_key()).await.unwrap());
        let data = cache.get(&list_key()).unwrap();
        assert_eq!(data.as_post_list().unwrap().items().count(), 2);
    }

    #[tokio::test]
    async fn test_failed_fetch_keeps_previous_data() {
        let mut api = MockApi::new();
        api.expect_fetch_post()
            .returning(|_| Err(AppError::Network("offline".to_string())));
        let cache = Arc::new(ViewIndex::new(10));
        let key = QueryKey::post(PostId::new(7));
        cache.set(key.clone(), QueryData::Post(post(7)));
        let refresher = QueryRefresher::new(Arc::new(api), cache.clone());

        assert!(refresher.fetch_query(&key).await.is_err());
        assert!(cache.get(&key).is_some());
    }
}
