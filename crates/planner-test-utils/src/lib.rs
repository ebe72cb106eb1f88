//! Shared test utilities for planner integration tests.
//!
//! Provides store doubles that fail or block on demand, service builders
//! wired to deterministic ids, and small constructors for money and dates.

use std::str::FromStr;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use tokio::sync::{Notify, Semaphore};
use tokio_util::sync::CancellationToken;

use planner_core::{
    Event, EventStore, MemoryStore, NewEvent, PlannerService, SequentialIdGenerator, StoreError,
};

/// Parse a decimal literal such as `"4200.00"`.
pub fn money(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap_or_else(|e| panic!("bad decimal literal {s:?}: {e}"))
}

pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day)
        .unwrap_or_else(|| panic!("bad date {year}-{month}-{day}"))
}

/// Kyiv trade show, USD 12,000.
pub fn tech_expo() -> NewEvent {
    NewEvent::new("Tech Expo", date(2025, 4, 2), money("12000"))
        .venue("Kyiv")
        .currency("USD")
}

/// Lviv festival, EUR 5,000. Over budget once 4,200 is paid and 24h at 50/h
/// of staff are booked.
pub fn music_fest() -> NewEvent {
    NewEvent::new("Music Fest", date(2025, 6, 15), money("5000"))
        .venue("Lviv")
        .currency("EUR")
}

/// A service over a fresh [`MemoryStore`] with sequential ids.
pub fn memory_service() -> (Arc<PlannerService>, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    let service = PlannerService::new(store.clone(), Arc::new(SequentialIdGenerator::new()));
    (Arc::new(service), store)
}

/// A service over any store, with sequential ids.
pub fn service_over(store: Arc<dyn EventStore>) -> Arc<PlannerService> {
    Arc::new(PlannerService::new(store, Arc::new(SequentialIdGenerator::new())))
}

// ---------------------------------------------------------------------------
// FailingStore
// ---------------------------------------------------------------------------

/// Memory-backed store whose loads and saves can be switched to fail.
#[derive(Debug, Default)]
pub struct FailingStore {
    inner: MemoryStore,
    fail_loads: AtomicBool,
    fail_saves: AtomicBool,
}

impl FailingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_fail_loads(&self, fail: bool) {
        self.fail_loads.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_saves(&self, fail: bool) {
        self.fail_saves.store(fail, Ordering::SeqCst);
    }

    /// What the store currently holds.
    pub fn snapshot(&self) -> Vec<Event> {
        self.inner.snapshot()
    }

    pub fn save_count(&self) -> usize {
        self.inner.save_count()
    }
}

#[async_trait]
impl EventStore for FailingStore {
    async fn load(&self, cancel: &CancellationToken) -> Result<Vec<Event>, StoreError> {
        if self.fail_loads.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("load failure injected".to_string()));
        }
        self.inner.load(cancel).await
    }

    async fn save(&self, events: &[Event], cancel: &CancellationToken) -> Result<(), StoreError> {
        if self.fail_saves.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("save failure injected".to_string()));
        }
        self.inner.save(events, cancel).await
    }
}

// ---------------------------------------------------------------------------
// GatedStore
// ---------------------------------------------------------------------------

/// Memory-backed store whose saves block until the test releases them.
///
/// Each `save` signals [`GatedStore::save_started`] and then waits for one
/// [`GatedStore::release`] or for its cancellation token.
#[derive(Debug)]
pub struct GatedStore {
    inner: MemoryStore,
    started: Notify,
    permits: Semaphore,
}

impl GatedStore {
    pub fn new() -> Self {
        Self {
            inner: MemoryStore::new(),
            started: Notify::new(),
            permits: Semaphore::new(0),
        }
    }

    /// Wait until some save is in flight.
    pub async fn save_started(&self) {
        self.started.notified().await;
    }

    /// Let `n` pending or future saves through.
    pub fn release(&self, n: usize) {
        self.permits.add_permits(n);
    }

    pub fn snapshot(&self) -> Vec<Event> {
        self.inner.snapshot()
    }

    pub fn save_count(&self) -> usize {
        self.inner.save_count()
    }
}

impl Default for GatedStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EventStore for GatedStore {
    async fn load(&self, cancel: &CancellationToken) -> Result<Vec<Event>, StoreError> {
        self.inner.load(cancel).await
    }

    async fn save(&self, events: &[Event], cancel: &CancellationToken) -> Result<(), StoreError> {
        self.started.notify_one();
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(StoreError::Cancelled),
            permit = self.permits.acquire() => {
                permit
                    .map_err(|_| StoreError::Unavailable("gate closed".to_string()))?
                    .forget();
                self.inner.save(events, cancel).await
            }
        }
    }
}
