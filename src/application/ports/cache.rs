use crate::domain::entities::{CacheSnapshot, QueryData, SessionUser};
use crate::domain::value_objects::{QueryFilter, QueryKey};
use chrono::{DateTime, Utc};
use std::sync::Arc;

/// 無効化の対象とするスロット
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotActivity {
    All,
    /// 購読者がいるスロットのみ
    Active,
    /// 購読者がいないスロットのみ
    Inactive,
}

/// 無効化後に再取得キューへ積むスロット
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefetchPolicy {
    None,
    Active,
    All,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidateOptions {
    pub activity: SlotActivity,
    pub refetch: RefetchPolicy,
}

impl InvalidateOptions {
    /// 古いとマークし、表示中のものは再取得する
    pub fn refetch_active() -> Self {
        Self {
            activity: SlotActivity::All,
            refetch: RefetchPolicy::Active,
        }
    }

    /// 古いとマークし、表示の有無にかかわらず再取得する
    pub fn refetch_all() -> Self {
        Self {
            activity: SlotActivity::All,
            refetch: RefetchPolicy::All,
        }
    }

    /// 非表示のスロットだけを古いとマークする。再取得はしない。
    pub fn inactive_only() -> Self {
        Self {
            activity: SlotActivity::Inactive,
            refetch: RefetchPolicy::None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchStatus {
    Idle,
    Fetching,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SlotStatus {
    pub has_data: bool,
    pub is_invalidated: bool,
    pub fetch_status: FetchStatus,
    pub observers: usize,
    pub generation: u64,
    pub updated_at: Option<DateTime<Utc>>,
}

impl SlotStatus {
    pub fn is_mounted(&self) -> bool {
        self.observers > 0
    }

    /// 次に表示されたとき取得し直す必要があるか
    pub fn needs_fetch(&self) -> bool {
        !self.has_data || self.is_invalidated
    }
}

/// 取得開始時に発行される券。キャンセルされると世代がずれて結果は捨てられる。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
    pub key: QueryKey,
    pub generation: u64,
}

/// スロット更新関数。`Some` を返したスロットだけが新しい値に置き換わる。
pub type SlotUpdater<'a> = dyn FnMut(&QueryKey, &QueryData) -> Option<QueryData> + 'a;

/// キー付きキャッシュスロットの集合
pub trait QueryCache: Send + Sync {
    fn get(&self, key: &QueryKey) -> Option<Arc<QueryData>>;

    /// 値を置き換え、無効化フラグを下ろす
    fn set(&self, key: QueryKey, data: QueryData) -> Arc<QueryData>;

    fn status(&self, key: &QueryKey) -> Option<SlotStatus>;

    /// 一致する各スロットへ `updater` を適用し、置き換えたスロットの旧値を返す
    fn update_matching(&self, filter: &QueryFilter, updater: &mut SlotUpdater<'_>)
    -> Vec<CacheSnapshot>;

    fn snapshot_matching(&self, filter: &QueryFilter) -> Vec<CacheSnapshot>;

    fn restore(&self, snapshot: CacheSnapshot);

    /// 無効化したスロット数を返す
    fn invalidate(&self, filter: &QueryFilter, options: InvalidateOptions) -> usize;

    /// 実行中の取得をキャンセルし、キャンセルした件数を返す
    fn cancel(&self, filter: &QueryFilter) -> usize;

    /// 購読者を追加する。取得が必要なら `true`。
    fn mount(&self, key: &QueryKey) -> bool;

    fn unmount(&self, key: &QueryKey);

    fn begin_fetch(&self, key: &QueryKey) -> FetchTicket;

    /// 券が最新なら結果を書き込んで `true`
    fn complete_fetch(&self, ticket: &FetchTicket, data: QueryData) -> bool;

    /// 券が最新なら、その時点のスロット値へ `append` を適用する。
    /// 無効化フラグはそのまま残す。
    fn append_page(&self, ticket: &FetchTicket, append: &mut SlotUpdater<'_>) -> bool;

    fn fail_fetch(&self, ticket: &FetchTicket);

    fn take_refetch_queue(&self) -> Vec<QueryKey>;

    fn current_user(&self) -> Option<SessionUser>;

    fn set_current_user(&self, user: Option<SessionUser>);

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
