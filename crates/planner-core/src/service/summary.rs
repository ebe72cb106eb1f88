//! Budget rollups derived from events. Pure functions, never stored.

use rust_decimal::Decimal;
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{BudgetItem, BudgetStatus, Event, StaffAssignment};

/// Financial rollup for a single event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EventSummary {
    pub event_id: Uuid,
    pub name: String,
    #[serde(with = "rust_decimal::serde::arbitrary_precision")]
    pub target_budget: Decimal,
    #[serde(with = "rust_decimal::serde::arbitrary_precision")]
    pub total_planned: Decimal,
    #[serde(with = "rust_decimal::serde::arbitrary_precision")]
    pub total_committed: Decimal,
    #[serde(with = "rust_decimal::serde::arbitrary_precision")]
    pub total_paid: Decimal,
    #[serde(with = "rust_decimal::serde::arbitrary_precision")]
    pub staff_cost: Decimal,
    /// `target_budget - (total_paid + staff_cost)`. Planned and committed
    /// items do not count as spent.
    #[serde(with = "rust_decimal::serde::arbitrary_precision")]
    pub remaining_budget: Decimal,
    pub is_over_budget: bool,
}

/// Financial rollup across every event.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PortfolioSummary {
    pub event_count: usize,
    #[serde(with = "rust_decimal::serde::arbitrary_precision")]
    pub total_target_budget: Decimal,
    #[serde(with = "rust_decimal::serde::arbitrary_precision")]
    pub total_planned: Decimal,
    #[serde(with = "rust_decimal::serde::arbitrary_precision")]
    pub total_committed: Decimal,
    #[serde(with = "rust_decimal::serde::arbitrary_precision")]
    pub total_paid: Decimal,
    #[serde(with = "rust_decimal::serde::arbitrary_precision")]
    pub total_staff_cost: Decimal,
    pub over_budget_events: usize,
}

/// Raised when a rollup does not fit in a [`Decimal`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TotalsOverflow {
    #[error("totals for event {0} exceed the supported range")]
    Event(Uuid),
    #[error("portfolio totals exceed the supported range")]
    Portfolio,
}

fn checked_sum(values: impl IntoIterator<Item = Option<Decimal>>) -> Option<Decimal> {
    values
        .into_iter()
        .try_fold(Decimal::ZERO, |acc, value| acc.checked_add(value?))
}

fn sum_by_status(items: &[BudgetItem], status: BudgetStatus) -> Option<Decimal> {
    checked_sum(
        items
            .iter()
            .filter(|item| item.status == status)
            .map(|item| Some(item.amount)),
    )
}

/// Compute the summary for one event.
pub fn build_event_summary(event: &Event) -> Result<EventSummary, TotalsOverflow> {
    let overflow = || TotalsOverflow::Event(event.id);

    let total_planned =
        sum_by_status(&event.budget_items, BudgetStatus::Planned).ok_or_else(overflow)?;
    let total_committed =
        sum_by_status(&event.budget_items, BudgetStatus::Committed).ok_or_else(overflow)?;
    let total_paid = sum_by_status(&event.budget_items, BudgetStatus::Paid).ok_or_else(overflow)?;
    let staff_cost =
        checked_sum(event.staff.iter().map(StaffAssignment::total_cost)).ok_or_else(overflow)?;
    let remaining_budget = total_paid
        .checked_add(staff_cost)
        .and_then(|spent| event.target_budget.checked_sub(spent))
        .ok_or_else(overflow)?;

    Ok(EventSummary {
        event_id: event.id,
        name: event.name.clone(),
        target_budget: event.target_budget,
        total_planned,
        total_committed,
        total_paid,
        staff_cost,
        remaining_budget,
        is_over_budget: remaining_budget < Decimal::ZERO,
    })
}

/// Compute the portfolio rollup over `events`.
pub fn build_portfolio_summary(events: &[Event]) -> Result<PortfolioSummary, TotalsOverflow> {
    let add = |total: Decimal, value: Decimal| {
        total.checked_add(value).ok_or(TotalsOverflow::Portfolio)
    };

    events
        .iter()
        .try_fold(PortfolioSummary::default(), |acc, event| {
            let summary = build_event_summary(event)?;
            Ok(PortfolioSummary {
                event_count: acc.event_count + 1,
                total_target_budget: add(acc.total_target_budget, summary.target_budget)?,
                total_planned: add(acc.total_planned, summary.total_planned)?,
                total_committed: add(acc.total_committed, summary.total_committed)?,
                total_paid: add(acc.total_paid, summary.total_paid)?,
                total_staff_cost: add(acc.total_staff_cost, summary.staff_cost)?,
                over_budget_events: acc.over_budget_events + usize::from(summary.is_over_budget),
            })
        })
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    fn event(target: i64) -> Event {
        Event {
            id: Uuid::from_u128(1),
            name: "Gala".to_string(),
            date: NaiveDate::from_ymd_opt(2025, 9, 1).unwrap(),
            venue: String::new(),
            target_budget: Decimal::from(target),
            currency: "USD".to_string(),
            budget_items: Vec::new(),
            staff: Vec::new(),
        }
    }

    fn item(amount: i64, status: BudgetStatus) -> BudgetItem {
        BudgetItem {
            id: Uuid::new_v4(),
            category: "General".to_string(),
            description: String::new(),
            amount: Decimal::from(amount),
            status,
        }
    }

    fn staff(rate: i64, hours: i64) -> StaffAssignment {
        StaffAssignment {
            id: Uuid::new_v4(),
            full_name: "Unassigned".to_string(),
            role: String::new(),
            hourly_rate: Decimal::from(rate),
            hours_booked: Decimal::from(hours),
        }
    }

    #[test]
    fn empty_event_has_full_budget_remaining() {
        let summary = build_event_summary(&event(1000)).unwrap();
        assert_eq!(summary.remaining_budget, Decimal::from(1000));
        assert_eq!(summary.staff_cost, Decimal::ZERO);
        assert!(!summary.is_over_budget);
    }

    #[test]
    fn only_paid_items_and_staff_reduce_remaining() {
        let mut ev = event(1000);
        ev.budget_items.push(item(300, BudgetStatus::Planned));
        ev.budget_items.push(item(200, BudgetStatus::Committed));
        ev.budget_items.push(item(100, BudgetStatus::Paid));
        ev.budget_items.push(item(50, BudgetStatus::Paid));
        ev.staff.push(staff(20, 5));

        let summary = build_event_summary(&ev).unwrap();
        assert_eq!(summary.total_planned, Decimal::from(300));
        assert_eq!(summary.total_committed, Decimal::from(200));
        assert_eq!(summary.total_paid, Decimal::from(150));
        assert_eq!(summary.staff_cost, Decimal::from(100));
        assert_eq!(summary.remaining_budget, Decimal::from(750));
    }

    #[test]
    fn exactly_spent_is_not_over_budget() {
        let mut ev = event(500);
        ev.budget_items.push(item(500, BudgetStatus::Paid));

        let summary = build_event_summary(&ev).unwrap();
        assert_eq!(summary.remaining_budget, Decimal::ZERO);
        assert!(!summary.is_over_budget);
    }

    #[test]
    fn summary_is_idempotent() {
        let mut ev = event(800);
        ev.budget_items.push(item(900, BudgetStatus::Paid));
        ev.staff.push(staff(10, 3));

        assert_eq!(build_event_summary(&ev), build_event_summary(&ev));
        assert!(build_event_summary(&ev).unwrap().is_over_budget);
    }

    #[test]
    fn empty_portfolio_is_all_zero() {
        assert_eq!(build_portfolio_summary(&[]).unwrap(), PortfolioSummary::default());
    }

    #[test]
    fn portfolio_counts_over_budget_events() {
        let mut over = event(100);
        over.budget_items.push(item(150, BudgetStatus::Paid));
        let mut under = event(100);
        under.budget_items.push(item(150, BudgetStatus::Planned));

        let portfolio = build_portfolio_summary(&[over, under]).unwrap();
        assert_eq!(portfolio.event_count, 2);
        assert_eq!(portfolio.total_target_budget, Decimal::from(200));
        assert_eq!(portfolio.total_paid, Decimal::from(150));
        assert_eq!(portfolio.total_planned, Decimal::from(150));
        assert_eq!(portfolio.over_budget_events, 1);
    }

    #[test]
    fn staff_cost_overflow_is_an_error() {
        let mut ev = event(1000);
        ev.staff.push(StaffAssignment {
            hourly_rate: Decimal::from(10u64.pow(15)),
            hours_booked: Decimal::from(10u64.pow(15)),
            ..staff(1, 1)
        });

        assert_eq!(build_event_summary(&ev), Err(TotalsOverflow::Event(ev.id)));
        assert_eq!(
            build_portfolio_summary(std::slice::from_ref(&ev)),
            Err(TotalsOverflow::Event(ev.id))
        );
    }

    #[test]
    fn item_sum_overflow_is_an_error() {
        let mut ev = event(1000);
        let mut big = item(0, BudgetStatus::Planned);
        big.amount = Decimal::MAX;
        ev.budget_items.push(big.clone());
        ev.budget_items.push(big);

        assert_eq!(build_event_summary(&ev), Err(TotalsOverflow::Event(ev.id)));
    }

    #[test]
    fn portfolio_target_overflow_is_an_error() {
        let mut huge = event(0);
        huge.target_budget = Decimal::MAX;

        assert!(build_event_summary(&huge).is_ok());
        assert_eq!(
            build_portfolio_summary(&[huge.clone(), huge]),
            Err(TotalsOverflow::Portfolio)
        );
    }
}
