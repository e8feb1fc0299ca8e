use crate::application::ports::cache::{
    FetchStatus, FetchTicket, InvalidateOptions, QueryCache, RefetchPolicy, SlotActivity,
    SlotStatus, SlotUpdater,
};
use crate::domain::entities::{CacheSnapshot, QueryData, SessionUser};
use crate::domain::value_objects::{QueryFilter, QueryKey};
use chrono::{DateTime, Utc};
use lru::LruCache;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::debug;

#[derive(Debug, Clone)]
struct Slot {
    data: Option<Arc<QueryData>>,
    is_invalidated: bool,
    fetch_status: FetchStatus,
    observers: usize,
    generation: u64,
    updated_at: Option<DateTime<Utc>>,
}

impl Slot {
    fn empty() -> Self {
        Self {
            data: None,
            is_invalidated: false,
            fetch_status: FetchStatus::Idle,
            observers: 0,
            generation: 0,
            updated_at: None,
        }
    }

    fn replace(&mut self, data: QueryData) -> Arc<QueryData> {
        let data = Arc::new(data);
        self.data = Some(Arc::clone(&data));
        self.updated_at = Some(Utc::now());
        data
    }

    fn status(&self) -> SlotStatus {
        SlotStatus {
            has_data: self.data.is_some(),
            is_invalidated: self.is_invalidated,
            fetch_status: self.fetch_status,
            observers: self.observers,
            generation: self.generation,
            updated_at: self.updated_at,
        }
    }

    fn is_mounted(&self) -> bool {
        self.observers > 0
    }

    fn is_evictable(&self) -> bool {
        !self.is_mounted() && self.fetch_status == FetchStatus::Idle
    }
}

struct Inner {
    slots: LruCache<QueryKey, Slot>,
    refetch_queue: Vec<QueryKey>,
    current_user: Option<SessionUser>,
}

/// クエリキーごとのキャッシュスロット
///
/// 値は `Arc<QueryData>` で保持し、書き込みは常に新しい `Arc` への差し替えで行う。
/// 読み手は `Arc::ptr_eq` で変更を検出できる。
pub struct ViewIndex {
    inner: Mutex<Inner>,
    max_entries: usize,
}

impl ViewIndex {
    pub fn new(max_entries: usize) -> Self {
        Self {
            inner: Mutex::new(Inner {
                slots: LruCache::unbounded(),
                refetch_queue: Vec::new(),
                current_user: None,
            }),
            max_entries: max_entries.max(1),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// 上限を超えた分だけ、古い順に購読者のいないスロットを捨てる
    fn collect_garbage(&self, inner: &mut Inner) {
        let excess = inner.slots.len().saturating_sub(self.max_entries);
        if excess == 0 {
            return;
        }

        let victims: Vec<QueryKey> = inner
            .slots
            .iter()
            .rev()
            .filter(|(_, slot)| slot.is_evictable())
            .take(excess)
            .map(|(key, _)| key.clone())
            .collect();

        for key in victims {
            debug!(key = %key, "evicting cache slot");
            inner.slots.pop(&key);
        }
    }

    fn enqueue_refetch(inner: &mut Inner, key: QueryKey) {
        if !inner.refetch_queue.contains(&key) {
            inner.refetch_queue.push(key);
        }
    }
}

impl Default for ViewIndex {
    fn default() -> Self {
        Self::new(200)
    }
}

impl QueryCache for ViewIndex {
    fn get(&self, key: &QueryKey) -> Option<Arc<QueryData>> {
        let mut inner = self.lock();
        inner.slots.get(key).and_then(|slot| slot.data.clone())
    }

    fn set(&self, key: QueryKey, data: QueryData) -> Arc<QueryData> {
        let mut inner = self.lock();
        let data = match inner.slots.get_mut(&key) {
            Some(slot) => {
                slot.is_invalidated = false;
                slot.replace(data)
            }
            None => {
                let mut slot = Slot::empty();
                let data = slot.replace(data);
                inner.slots.put(key, slot);
                data
            }
        };
        self.collect_garbage(&mut inner);
        data
    }

    fn status(&self, key: &QueryKey) -> Option<SlotStatus> {
        self.lock().slots.peek(key).map(Slot::status)
    }

    fn update_matching(
        &self,
        filter: &QueryFilter,
        updater: &mut SlotUpdater<'_>,
    ) -> Vec<CacheSnapshot> {
        let mut inner = self.lock();
        let mut touched = Vec::new();

        for (key, slot) in inner.slots.iter_mut() {
            if !filter.matches(key) {
                continue;
            }
            let Some(previous) = slot.data.clone() else {
                continue;
            };
            if let Some(next) = updater(key, &previous) {
                slot.replace(next);
                touched.push(CacheSnapshot::new(key.clone(), previous));
            }
        }

        if !touched.is_empty() {
            debug!(filter = ?filter, slots = touched.len(), "updated matching cache slots");
        }
        touched
    }

    fn snapshot_matching(&self, filter: &QueryFilter) -> Vec<CacheSnapshot> {
        self.lock()
            .slots
            .iter()
            .filter(|(key, _)| filter.matches(key))
            .filter_map(|(key, slot)| {
                slot.data
                    .as_ref()
                    .map(|data| CacheSnapshot::new(key.clone(), Arc::clone(data)))
            })
            .collect()
    }

    fn restore(&self, snapshot: CacheSnapshot) {
        let mut inner = self.lock();
        let CacheSnapshot { key, data } = snapshot;
        debug!(key = %key, "restoring cache slot");
        match inner.slots.get_mut(&key) {
            Some(slot) => {
                slot.data = Some(data);
                slot.updated_at = Some(Utc::now());
            }
            None => {
                let mut slot = Slot::empty();
                slot.data = Some(data);
                slot.updated_at = Some(Utc::now());
                inner.slots.put(key, slot);
            }
        }
    }

    fn invalidate(&self, filter: &QueryFilter, options: InvalidateOptions) -> usize {
        let mut inner = self.lock();
        let mut invalidated = 0;
        let mut refetch = Vec::new();

        for (key, slot) in inner.slots.iter_mut() {
            if !filter.matches(key) {
                continue;
            }
            let selected = match options.activity {
                SlotActivity::All => true,
                SlotActivity::Active => slot.is_mounted(),
                SlotActivity::Inactive => !slot.is_mounted(),
            };
            if !selected {
                continue;
            }

            slot.is_invalidated = true;
            invalidated += 1;

            let wants_refetch = match options.refetch {
                RefetchPolicy::None => false,
                RefetchPolicy::Active => slot.is_mounted(),
                RefetchPolicy::All => true,
            };
            if wants_refetch {
                refetch.push(key.clone());
            }
        }

        for key in refetch {
            Self::enqueue_refetch(&mut inner, key);
        }

        debug!(filter = ?filter, invalidated, "invalidated cache slots");
        invalidated
    }

    fn cancel(&self, filter: &QueryFilter) -> usize {
        let mut inner = self.lock();
        let mut cancelled = 0;
        for (key, slot) in inner.slots.iter_mut() {
            if filter.matches(key) && slot.fetch_status == FetchStatus::Fetching {
                slot.generation += 1;
                slot.fetch_status = FetchStatus::Idle;
                cancelled += 1;
            }
        }
        if cancelled > 0 {
            debug!(filter = ?filter, cancelled, "cancelled in-flight fetches");
        }
        cancelled
    }

    fn mount(&self, key: &QueryKey) -> bool {
        let mut inner = self.lock();
        if !inner.slots.contains(key) {
            inner.slots.put(key.clone(), Slot::empty());
        }
        match inner.slots.get_mut(key) {
            Some(slot) => {
                slot.observers += 1;
                slot.status().needs_fetch()
            }
            None => true,
        }
    }

    fn unmount(&self, key: &QueryKey) {
        let mut inner = self.lock();
        if let Some(slot) = inner.slots.peek_mut(key) {
            slot.observers = slot.observers.saturating_sub(1);
        }
        self.collect_garbage(&mut inner);
    }

    fn begin_fetch(&self, key: &QueryKey) -> FetchTicket {
        let mut inner = self.lock();
        if !inner.slots.contains(key) {
            inner.slots.put(key.clone(), Slot::empty());
        }
        let generation = match inner.slots.get_mut(key) {
            Some(slot) => {
                slot.generation += 1;
                slot.fetch_status = FetchStatus::Fetching;
                slot.generation
            }
            None => 0,
        };
        FetchTicket {
            key: key.clone(),
            generation,
        }
    }

    fn complete_fetch(&self, ticket: &FetchTicket, data: QueryData) -> bool {
        let mut inner = self.lock();
        let accepted = match inner.slots.get_mut(&ticket.key) {
            Some(slot) if slot.generation == ticket.generation => {
                slot.fetch_status = FetchStatus::Idle;
                slot.is_invalidated = false;
                slot.replace(data);
                true
            }
            _ => false,
        };

        if accepted {
            self.collect_garbage(&mut inner);
        } else {
            debug!(key = %ticket.key, "discarding result of cancelled fetch");
        }
        accepted
    }

    fn append_page(&self, ticket: &FetchTicket, append: &mut SlotUpdater<'_>) -> bool {
        let mut inner = self.lock();
        let Some(slot) = inner.slots.get_mut(&ticket.key) else {
            return false;
        };
        if slot.generation != ticket.generation {
            debug!(key = %ticket.key, "discarding page of cancelled fetch");
            return false;
        }

        slot.fetch_status = FetchStatus::Idle;
        let appended = slot
            .data
            .clone()
            .and_then(|current| append(&ticket.key, current.as_ref()));
        match appended {
            Some(next) => {
                slot.replace(next);
                true
            }
            None => {
                debug!(key = %ticket.key, "page no longer follows the cached pages");
                false
            }
        }
    }

    fn fail_fetch(&self, ticket: &FetchTicket) {
        let mut inner = self.lock();
        if let Some(slot) = inner.slots.peek_mut(&ticket.key) {
            if slot.generation == ticket.generation {
                slot.fetch_status = FetchStatus::Idle;
            }
        }
    }

    fn take_refetch_queue(&self) -> Vec<QueryKey> {
        std::mem::take(&mut self.lock().refetch_queue)
    }

    fn current_user(&self) -> Option<SessionUser> {
        self.lock().current_user.clone()
    }

    fn set_current_user(&self, user: Option<SessionUser>) {
        self.lock().current_user = user;
    }

    fn len(&self) -> usize {
        self.lock().slots.len()
    }
}
