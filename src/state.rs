use crate::application::ports::board_api::BoardApi;
use crate::application::ports::cache::QueryCache;
use crate::application::ports::notifier::Notifier;
use crate::application::services::{
    CreateCommentMutation, MutationHandle, OptimisticProjector, QueryRefresher, Reconciler,
    UpvoteCommentMutation, UpvotePostMutation,
};
use crate::domain::entities::SessionUser;
use crate::domain::value_objects::PostsFilter;
use crate::infrastructure::{HttpBoardApi, TracingNotifier, ViewIndex};
use crate::shared::config::AppConfig;
use crate::shared::error::AppError;
use crate::shared::metrics::{MutationMetrics, MutationMetricsSnapshot};
use std::sync::Arc;
use tracing::info;

/// セッション全体の状態。View Index はここで一度だけ作り、各サービスへ注入する。
#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub cache: Arc<dyn QueryCache>,
    pub metrics: Arc<MutationMetrics>,
    pub refresher: Arc<QueryRefresher>,
    pub upvote_post: MutationHandle<UpvotePostMutation>,
    pub upvote_comment: MutationHandle<UpvoteCommentMutation>,
    pub create_comment: MutationHandle<CreateCommentMutation>,
}

impl AppState {
    pub fn new(config: AppConfig) -> Result<Self, AppError> {
        config.validate().map_err(AppError::ConfigurationError)?;

        let api: Arc<dyn BoardApi> = Arc::new(HttpBoardApi::new(&config.api, config.cache.page_size)?);
        let notifier: Arc<dyn Notifier> = Arc::new(TracingNotifier);

        info!(base_url = %config.api.base_url, "board client configured");
        Ok(Self::with_components(config, api, notifier))
    }

    /// 外部依存を差し替えて組み立てる
    pub fn with_components(
        config: AppConfig,
        api: Arc<dyn BoardApi>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let cache: Arc<dyn QueryCache> = Arc::new(ViewIndex::new(config.cache.max_entries));
        let metrics = Arc::new(MutationMetrics::new());

        let projector = Arc::new(OptimisticProjector::new(Arc::clone(&cache)));
        let reconciler = Arc::new(Reconciler::new(
            Arc::clone(&cache),
            notifier,
            Arc::clone(&metrics),
        ));
        let refresher = Arc::new(QueryRefresher::new(Arc::clone(&api), Arc::clone(&cache)));

        let upvote_post = MutationHandle::new(UpvotePostMutation::new(
            Arc::clone(&api),
            Arc::clone(&cache),
            Arc::clone(&projector),
            Arc::clone(&reconciler),
        ));
        let upvote_comment = MutationHandle::new(UpvoteCommentMutation::new(
            Arc::clone(&api),
            Arc::clone(&cache),
            Arc::clone(&projector),
            Arc::clone(&reconciler),
        ));
        let create_comment = MutationHandle::new(CreateCommentMutation::new(
            api,
            Arc::clone(&cache),
            projector,
            reconciler,
        ));

        Self {
            config,
            cache,
            metrics,
            refresher,
            upvote_post,
            upvote_comment,
            create_comment,
        }
    }

    pub fn set_current_user(&self, user: Option<SessionUser>) {
        self.cache.set_current_user(user);
    }

    /// 設定の既定並び順による投稿一覧の条件
    pub fn default_posts_filter(&self) -> PostsFilter {
        PostsFilter::new(
            self.config.cache.default_sort_by,
            self.config.cache.default_order,
        )
    }

    pub fn metrics_snapshot(&self) -> MutationMetricsSnapshot {
        self.metrics.snapshot()
    }
}
