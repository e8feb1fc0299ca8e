mod create_comment;
mod upvote;


pub use create_comment::{CreateCommentArgs, CreateCommentMutation};
pub use upvote::{UpvoteCommentMutation, UpvotePostMutation};

use crate::domain::entities::PendingMutation;
use crate::domain::value_objects::MutationKind;
use crate::shared::error::AppError;
use async_trait::async_trait;
use serde::Serialize;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::task::JoinHandle;
use tracing::debug;

/// ミューテーションの結果。UI へそのまま渡せる形。
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MutationResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
    pub error_code: Option<String>,
    pub is_form_error: bool,
}

impl<T> MutationResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            error_code: None,
            is_form_error: false,
        }
    }

    pub fn from_app_error(error: &AppError) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.user_message()),
            error_code: Some(error.code().to_string()),
            is_form_error: error.is_form_error(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MutationStatus {
    Idle,
    Pending,
    Success,
    Error,
}

/// 楽観的更新を伴うミューテーション 1 種類分の処理
#[async_trait]
pub trait OptimisticMutation: Send + Sync + 'static {
    type Args: Send + Sync + 'static;
    type Output: Clone + Send + Sync + 'static;

    fn kind(&self) -> MutationKind;

    /// 送信前の検証。正規化した引数を返す。
    fn validate(&self, args: Self::Args) -> Result<Self::Args, AppError>;

    /// 同じ範囲の取得をキャンセルしてから楽観的更新を適用する
    fn on_mutate(&self, args: &Self::Args) -> PendingMutation;

    async fn dispatch(&self, args: &Self::Args) -> Result<Self::Output, AppError>;

    async fn on_success(&self, pending: PendingMutation, args: &Self::Args, output: &Self::Output);

    async fn on_error(&self, pending: PendingMutation, args: &Self::Args, err: &AppError);
}

struct HandleState {
    status: MutationStatus,
    latest: u64,
}

struct Prepared<A> {
    seq: u64,
    args: A,
    pending: PendingMutation,
}

/// UI から呼び出すミューテーションハンドル
pub struct MutationHandle<M: OptimisticMutation> {
    mutation: Arc<M>,
    state: Arc<Mutex<HandleState>>,
}

impl<M: OptimisticMutation> Clone for MutationHandle<M> {
    fn clone(&self) -> Self {
        Self {
            mutation: Arc::clone(&self.mutation),
            state: Arc::clone(&self.state),
        }
    }
}

impl<M: OptimisticMutation> MutationHandle<M> {
    pub fn new(mutation: M) -> Self {
        Self {
            mutation: Arc::new(mutation),
            state: Arc::new(Mutex::new(HandleState {
                status: MutationStatus::Idle,
                latest: 0,
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, HandleState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// 最後に呼ばれたミューテーションの状態
    pub fn status(&self) -> MutationStatus {
        self.lock().status
    }

    pub fn is_pending(&self) -> bool {
        self.status() == MutationStatus::Pending
    }

    pub fn reset(&self) {
        let mut state = self.lock();
        state.latest += 1;
        state.status = MutationStatus::Idle;
    }

    /// 投げっぱなしで実行する。戻った時点で楽観的更新は適用済み。
    ///
    /// Tokio ランタイム上から呼ぶこと。
    pub fn mutate(&self, args: M::Args) -> JoinHandle<MutationResponse<M::Output>> {
        match self.begin(args) {
            Ok(prepared) => {
                let handle = self.clone();
                tokio::spawn(async move { handle.settle(prepared).await })
            }
            Err(response) => tokio::spawn(async move { response }),
        }
    }

    /// 結果を待つ。待つのをやめても送信済みのミューテーションは最後まで反映される。
    pub async fn mutate_async(&self, args: M::Args) -> MutationResponse<M::Output> {
        match self.mutate(args).await {
            Ok(response) => response,
            Err(err) => MutationResponse::from_app_error(&AppError::Internal(format!(
                "mutation task failed: {err}"
            ))),
        }
    }

    fn begin(
        &self,
        args: M::Args,
    ) -> Result<Prepared<M::Args>, MutationResponse<M::Output>> {
        let seq = {
            let mut state = self.lock();
            state.latest += 1;
            state.latest
        };

        let args = match self.mutation.validate(args) {
            Ok(args) => args,
            Err(err) => {
                debug!(mutation = %self.mutation.kind(), error = %err, "mutation rejected before dispatch");
                self.finish(seq, MutationStatus::Error);
                return Err(MutationResponse::from_app_error(&err));
            }
        };

        self.finish(seq, MutationStatus::Pending);
        let pending = self.mutation.on_mutate(&args);
        Ok(Prepared { seq, args, pending })
    }

    async fn settle(&self, prepared: Prepared<M::Args>) -> MutationResponse<M::Output> {
        let Prepared { seq, args, pending } = prepared;
        debug!(mutation = %self.mutation.kind(), id = %pending.id, "dispatching mutation");

        match self.mutation.dispatch(&args).await {
            Ok(output) => {
                self.mutation.on_success(pending, &args, &output).await;
                self.finish(seq, MutationStatus::Success);
                MutationResponse::success(output)
            }
            Err(err) => {
                self.mutation.on_error(pending, &args, &err).await;
                self.finish(seq, MutationStatus::Error);
                MutationResponse::from_app_error(&err)
            }
        }
    }

    /// 後から呼ばれたミューテーションがあれば状態は上書きしない
    fn finish(&self, seq: u64, status: MutationStatus) {
        let mut state = self.lock();
        if state.latest == seq {
            state.status = status;
        }
    }
}
