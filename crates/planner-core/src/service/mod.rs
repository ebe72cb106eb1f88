//! The planning service: single authority over event data.
//!
//! [`PlannerService`] owns an in-memory copy of every event, hydrated from
//! its [`EventStore`] on first use. Every operation (reads included) runs
//! under one async mutex, so callers observe a strictly serial history.
//!
//! Mutations are staged on a copy of the collection, written to the store in
//! full, and only then committed to the cache. A failed or cancelled save
//! therefore leaves both the cache and the store as they were.

pub mod summary;

use std::sync::Arc;

use rust_decimal::Decimal;
use tokio::sync::{Mutex, MutexGuard};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::error::{PlannerError, Result};
use crate::ids::IdGenerator;
use crate::models::{
    BudgetItem, Event, NewBudgetItem, NewEvent, NewStaffAssignment, StaffAssignment,
};
use crate::money::{normalize_currency, round_money};
use crate::store::EventStore;

pub use summary::{
    EventSummary, PortfolioSummary, TotalsOverflow, build_event_summary, build_portfolio_summary,
};

const DEFAULT_CATEGORY: &str = "General";
const DEFAULT_STAFF_NAME: &str = "Unassigned";

#[derive(Debug, Default)]
struct Cache {
    events: Vec<Event>,
    hydrated: bool,
}

/// Validates commands, serializes access to the event cache, persists every
/// change and computes summaries.
///
/// Share one instance behind an [`Arc`]; it is the only writer to its store.
pub struct PlannerService {
    store: Arc<dyn EventStore>,
    ids: Arc<dyn IdGenerator>,
    cache: Mutex<Cache>,
}

impl std::fmt::Debug for PlannerService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlannerService").finish_non_exhaustive()
    }
}

impl PlannerService {
    pub fn new(store: Arc<dyn EventStore>, ids: Arc<dyn IdGenerator>) -> Self {
        Self {
            store,
            ids,
            cache: Mutex::new(Cache::default()),
        }
    }

    // -----------------------------------------------------------------------
    // Commands
    // -----------------------------------------------------------------------

    /// Create and persist a new event.
    ///
    /// Trims the name and venue, rounds the target budget to two places and
    /// normalizes the currency (blank means `USD`).
    pub async fn create_event(&self, input: NewEvent, cancel: &CancellationToken) -> Result<Event> {
        let name = input.name.trim();
        if name.is_empty() {
            return Err(PlannerError::validation("event name is required"));
        }
        if input.target_budget <= Decimal::ZERO {
            return Err(PlannerError::validation("target budget must be positive"));
        }
        let currency = normalize_currency(&input.currency).ok_or_else(|| {
            PlannerError::validation(format!(
                "currency {:?} is not a three-letter code",
                input.currency.trim()
            ))
        })?;

        let mut cache = self.acquire(cancel).await?;

        let event = Event {
            id: self.ids.create(),
            name: name.to_owned(),
            date: input.date,
            venue: input.venue.trim().to_owned(),
            target_budget: round_money(input.target_budget),
            currency,
            budget_items: Vec::new(),
            staff: Vec::new(),
        };

        let mut staged = cache.events.clone();
        staged.push(event.clone());
        check_totals(&staged)?;
        self.commit(&mut cache, staged, cancel).await?;

        tracing::info!(
            event_id = %event.id,
            name = %event.name,
            date = %event.date,
            "created event"
        );
        Ok(event)
    }

    /// Append a budget line item to an event.
    pub async fn add_budget_item(
        &self,
        event_id: Uuid,
        input: NewBudgetItem,
        cancel: &CancellationToken,
    ) -> Result<BudgetItem> {
        if input.amount <= Decimal::ZERO {
            return Err(PlannerError::validation("amount must be positive"));
        }

        let mut cache = self.acquire(cancel).await?;
        let index = position_of(&cache.events, event_id)?;

        let category = input.category.trim();
        let item = BudgetItem {
            id: self.ids.create(),
            category: if category.is_empty() {
                DEFAULT_CATEGORY.to_owned()
            } else {
                category.to_owned()
            },
            description: input.description.trim().to_owned(),
            amount: round_money(input.amount),
            status: input.status,
        };

        let mut staged = cache.events.clone();
        staged[index].budget_items.push(item.clone());
        check_totals(&staged)?;
        self.commit(&mut cache, staged, cancel).await?;

        tracing::info!(
            event_id = %event_id,
            item_id = %item.id,
            amount = %item.amount,
            status = %item.status,
            "added budget item"
        );
        Ok(item)
    }

    /// Book a staff member on an event.
    pub async fn add_staff_assignment(
        &self,
        event_id: Uuid,
        input: NewStaffAssignment,
        cancel: &CancellationToken,
    ) -> Result<StaffAssignment> {
        if input.hourly_rate <= Decimal::ZERO {
            return Err(PlannerError::validation("hourly rate must be positive"));
        }
        if input.hours_booked <= Decimal::ZERO {
            return Err(PlannerError::validation("hours booked must be positive"));
        }

        let mut cache = self.acquire(cancel).await?;
        let index = position_of(&cache.events, event_id)?;

        let full_name = input.full_name.trim();
        let assignment = StaffAssignment {
            id: self.ids.create(),
            full_name: if full_name.is_empty() {
                DEFAULT_STAFF_NAME.to_owned()
            } else {
                full_name.to_owned()
            },
            role: input.role.trim().to_owned(),
            hourly_rate: round_money(input.hourly_rate),
            hours_booked: round_money(input.hours_booked),
        };

        let mut staged = cache.events.clone();
        staged[index].staff.push(assignment.clone());
        check_totals(&staged)?;
        self.commit(&mut cache, staged, cancel).await?;

        tracing::info!(
            event_id = %event_id,
            staff_id = %assignment.id,
            hourly_rate = %assignment.hourly_rate,
            hours_booked = %assignment.hours_booked,
            "added staff assignment"
        );
        Ok(assignment)
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    /// Every event in creation order.
    pub async fn list_events(&self, cancel: &CancellationToken) -> Result<Vec<Event>> {
        let cache = self.acquire(cancel).await?;
        Ok(cache.events.clone())
    }

    pub async fn get_event(&self, event_id: Uuid, cancel: &CancellationToken) -> Result<Option<Event>> {
        let cache = self.acquire(cancel).await?;
        Ok(cache.events.iter().find(|e| e.id == event_id).cloned())
    }

    pub async fn get_event_summary(
        &self,
        event_id: Uuid,
        cancel: &CancellationToken,
    ) -> Result<Option<EventSummary>> {
        let event = self.get_event(event_id, cancel).await?;
        Ok(event.as_ref().map(build_event_summary).transpose()?)
    }

    /// Rollup over every event currently known to the service.
    pub async fn portfolio_summary(&self, cancel: &CancellationToken) -> Result<PortfolioSummary> {
        let events = self.list_events(cancel).await?;
        Ok(build_portfolio_summary(&events)?)
    }

    // -----------------------------------------------------------------------
    // Gate, hydration, persistence
    // -----------------------------------------------------------------------

    /// Take the gate and make sure the cache is hydrated.
    async fn acquire(&self, cancel: &CancellationToken) -> Result<MutexGuard<'_, Cache>> {
        let mut cache = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                tracing::debug!("cancelled while waiting for the planner gate");
                return Err(PlannerError::Cancelled);
            }
            guard = self.cache.lock() => guard,
        };

        if !cache.hydrated {
            let events = self.store.load(cancel).await.inspect_err(|e| {
                tracing::warn!(error = %e, "failed to hydrate event cache");
            })?;
            tracing::info!(events = events.len(), "hydrated event cache");
            cache.events = events;
            cache.hydrated = true;
        }

        Ok(cache)
    }

    /// Persist `staged` in full, then make it the cache.
    async fn commit(
        &self,
        cache: &mut Cache,
        staged: Vec<Event>,
        cancel: &CancellationToken,
    ) -> Result<()> {
        if let Err(e) = self.store.save(&staged, cancel).await {
            tracing::warn!(error = %e, "failed to persist events; cache left unchanged");
            return Err(e.into());
        }
        cache.events = staged;
        Ok(())
    }
}

/// Reject a staged collection whose rollups would not fit in a `Decimal`.
fn check_totals(staged: &[Event]) -> Result<()> {
    build_portfolio_summary(staged)
        .map(drop)
        .map_err(|e| PlannerError::validation(e.to_string()))
}

fn position_of(events: &[Event], event_id: Uuid) -> Result<usize> {
    events
        .iter()
        .position(|e| e.id == event_id)
        .ok_or(PlannerError::NotFound(event_id))
}
