//! `planner budget add` command: append a budget line item to an event.

use std::io::Write;

use anyhow::Result;
use tokio_util::sync::CancellationToken;

use planner_core::{NewBudgetItem, PlannerService};

use crate::BudgetCommands;
use crate::format::format_money;
use crate::parse::{parse_decimal, parse_id, parse_status};

pub async fn run_budget_command(
    command: BudgetCommands,
    service: &PlannerService,
    cancel: &CancellationToken,
    out: &mut impl Write,
) -> Result<()> {
    let BudgetCommands::Add {
        event_id,
        category,
        description,
        amount,
        status,
    } = command;

    let event_id = parse_id(&event_id, "event")?;
    let input = NewBudgetItem::new(parse_decimal(&amount, "amount")?, parse_status(&status)?)
        .category(category)
        .description(description);

    let item = service.add_budget_item(event_id, input, cancel).await?;
    writeln!(
        out,
        "Added {} {} ({}) to event {event_id}.",
        format_money(item.amount, ""),
        item.category,
        item.status
    )?;
    Ok(())
}
