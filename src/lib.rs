//! 掲示板クライアントの楽観的ミューテーションとキャッシュ整合エンジン

pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod shared;
pub mod state;

pub use application::services::{
    CreateCommentArgs, MutationHandle, MutationResponse, MutationStatus, QueryRefresher,
};
pub use shared::logging::init_logging;
pub use shared::{AppConfig, AppError};
pub use state::AppState;
