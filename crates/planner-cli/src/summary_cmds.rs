//! CLI handlers for `planner summary` subcommands.

use std::io::Write;

use anyhow::Result;
use tokio_util::sync::CancellationToken;

use planner_core::{EventSummary, PlannerService, PortfolioSummary, build_portfolio_summary};

use crate::SummaryCommands;
use crate::format::format_money;
use crate::parse::parse_id;

pub async fn run_summary_command(
    command: SummaryCommands,
    service: &PlannerService,
    cancel: &CancellationToken,
    out: &mut impl Write,
) -> Result<()> {
    match command {
        SummaryCommands::Event { id } => {
            let id = parse_id(&id, "event")?;
            match service.get_event_summary(id, cancel).await? {
                Some(summary) => write_event_summary(&summary, out),
                None => {
                    writeln!(out, "Event {id} not found.")?;
                    Ok(())
                }
            }
        }
        SummaryCommands::Portfolio => {
            let events = service.list_events(cancel).await?;
            if events.is_empty() {
                writeln!(out, "No events found.")?;
                return Ok(());
            }
            write_portfolio_summary(&build_portfolio_summary(&events)?, out)
        }
    }
}

fn write_event_summary(summary: &EventSummary, out: &mut impl Write) -> Result<()> {
    let m = |amount| format_money(amount, "");
    writeln!(out, "Event {} ({})", summary.name, summary.event_id)?;
    writeln!(out, "  Target budget: {}", m(summary.target_budget))?;
    writeln!(out, "  Planned: {}", m(summary.total_planned))?;
    writeln!(out, "  Committed: {}", m(summary.total_committed))?;
    writeln!(out, "  Paid: {}", m(summary.total_paid))?;
    writeln!(out, "  Staff cost: {}", m(summary.staff_cost))?;
    writeln!(out, "  Remaining: {}", m(summary.remaining_budget))?;
    let status = if summary.is_over_budget {
        "OVER BUDGET"
    } else {
        "on track"
    };
    writeln!(out, "  Status: {status}")?;
    Ok(())
}

fn write_portfolio_summary(summary: &PortfolioSummary, out: &mut impl Write) -> Result<()> {
    let m = |amount| format_money(amount, "");
    writeln!(out, "Events tracked: {}", summary.event_count)?;
    writeln!(out, "Total target budget: {}", m(summary.total_target_budget))?;
    writeln!(
        out,
        "Planned: {} | Committed: {} | Paid: {}",
        m(summary.total_planned),
        m(summary.total_committed),
        m(summary.total_paid)
    )?;
    writeln!(out, "Staff cost: {}", m(summary.total_staff_cost))?;
    writeln!(out, "Over budget events: {}", summary.over_budget_events)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use planner_core::{BudgetStatus, NewBudgetItem, NewEvent, NewStaffAssignment};
    use planner_test_utils::{date, memory_service, money, music_fest};

    use super::*;

    async fn run(service: &PlannerService, command: SummaryCommands) -> String {
        let mut out = Vec::new();
        run_summary_command(command, service, &CancellationToken::new(), &mut out)
            .await
            .unwrap();
        String::from_utf8(out).unwrap()
    }

    #[tokio::test]
    async fn event_summary_over_budget() {
        let (service, _store) = memory_service();
        let cancel = CancellationToken::new();
        let event = service
            .create_event(music_fest(), &cancel)
            .await
            .unwrap();
        service
            .add_budget_item(event.id, NewBudgetItem::new(money("4200"), BudgetStatus::Paid), &cancel)
            .await
            .unwrap();
        service
            .add_staff_assignment(
                event.id,
                NewStaffAssignment::new("Anna", money("50"), money("24")),
                &cancel,
            )
            .await
            .unwrap();

        let output = run(&service, SummaryCommands::Event { id: event.id.to_string() }).await;

        let expected = format!(
            "Event Music Fest ({})\n  Target budget: 5000.00\n  Planned: 0.00\n  Committed: 0.00\n  Paid: 4200.00\n  Staff cost: 1200.00\n  Remaining: -400.00\n  Status: OVER BUDGET\n",
            event.id
        );
        assert_eq!(output, expected);
    }

    #[tokio::test]
    async fn event_summary_unknown_id() {
        let (service, _store) = memory_service();
        let id = uuid::Uuid::from_u128(5);
        let output = run(&service, SummaryCommands::Event { id: id.to_string() }).await;
        assert_eq!(output, format!("Event {id} not found.\n"));
    }

    #[tokio::test]
    async fn portfolio_empty() {
        let (service, _store) = memory_service();
        assert_eq!(run(&service, SummaryCommands::Portfolio).await, "No events found.\n");
    }

    #[tokio::test]
    async fn portfolio_totals() {
        let (service, _store) = memory_service();
        let cancel = CancellationToken::new();
        let expo = service
            .create_event(NewEvent::new("Tech Expo", date(2025, 4, 2), money("12000")), &cancel)
            .await
            .unwrap();
        service
            .add_budget_item(expo.id, NewBudgetItem::new(money("3000"), BudgetStatus::Planned), &cancel)
            .await
            .unwrap();
        service
            .create_event(NewEvent::new("Gala", date(2025, 5, 1), money("900")), &cancel)
            .await
            .unwrap();

        let output = run(&service, SummaryCommands::Portfolio).await;

        assert_eq!(
            output,
            "Events tracked: 2\n\
             Total target budget: 12900.00\n\
             Planned: 3000.00 | Committed: 0.00 | Paid: 0.00\n\
             Staff cost: 0.00\n\
             Over budget events: 0\n"
        );
    }
}
