//! CLI handlers for `planner event` subcommands.
//!
//! Implements:
//! - `planner event create`  -- create and persist a new event
//! - `planner event list`    -- list all events in table format
//! - `planner event details` -- show one event with its items and staff

use std::io::Write;

use anyhow::Result;
use tokio_util::sync::CancellationToken;

use planner_core::{Event, NewEvent, PlannerService};

use crate::EventCommands;
use crate::format::{format_cost, format_money, or_dash, render_table};
use crate::parse::{parse_date, parse_decimal, parse_id};

// -----------------------------------------------------------------------
// Public entry point
// -----------------------------------------------------------------------

/// Dispatch an `EventCommands` variant to the appropriate handler.
pub async fn run_event_command(
    command: EventCommands,
    service: &PlannerService,
    cancel: &CancellationToken,
    out: &mut impl Write,
) -> Result<()> {
    match command {
        EventCommands::Create {
            name,
            date,
            venue,
            budget,
            currency,
        } => {
            let input = NewEvent::new(name, parse_date(&date)?, parse_decimal(&budget, "budget")?)
                .venue(venue)
                .currency(currency);
            cmd_create(service, input, cancel, out).await
        }
        EventCommands::List => cmd_list(service, cancel, out).await,
        EventCommands::Details { id } => {
            let id = parse_id(&id, "event")?;
            cmd_details(service, id, cancel, out).await
        }
    }
}

// -----------------------------------------------------------------------
// Handlers
// -----------------------------------------------------------------------

async fn cmd_create(
    service: &PlannerService,
    input: NewEvent,
    cancel: &CancellationToken,
    out: &mut impl Write,
) -> Result<()> {
    let event = service.create_event(input, cancel).await?;
    writeln!(
        out,
        "Created event '{}' with id {} on {} ({}).",
        event.name,
        event.id,
        event.date,
        format_money(event.target_budget, &event.currency)
    )?;
    Ok(())
}

async fn cmd_list(
    service: &PlannerService,
    cancel: &CancellationToken,
    out: &mut impl Write,
) -> Result<()> {
    let events = service.list_events(cancel).await?;
    if events.is_empty() {
        writeln!(out, "No events found. Use 'event create' to add one.")?;
        return Ok(());
    }

    let rows: Vec<Vec<String>> = events
        .iter()
        .map(|e| {
            vec![
                e.id.to_string(),
                e.name.clone(),
                e.date.to_string(),
                or_dash(&e.venue).to_string(),
                format_money(e.target_budget, &e.currency),
            ]
        })
        .collect();
    write!(
        out,
        "{}",
        render_table(&["Id", "Name", "Date", "Venue", "Budget"], &rows)
    )?;
    Ok(())
}

async fn cmd_details(
    service: &PlannerService,
    id: uuid::Uuid,
    cancel: &CancellationToken,
    out: &mut impl Write,
) -> Result<()> {
    match service.get_event(id, cancel).await? {
        Some(event) => write_event(&event, out),
        None => {
            writeln!(out, "Event {id} not found.")?;
            Ok(())
        }
    }
}

fn write_event(event: &Event, out: &mut impl Write) -> Result<()> {
    writeln!(out, "Event {} ({})", event.name, event.id)?;
    writeln!(out, "  Date: {}", event.date)?;
    writeln!(out, "  Venue: {}", or_dash(&event.venue))?;
    writeln!(
        out,
        "  Budget: {}",
        format_money(event.target_budget, &event.currency)
    )?;
    writeln!(out)?;

    if event.budget_items.is_empty() {
        writeln!(out, "No budget items yet.")?;
    } else {
        let rows: Vec<Vec<String>> = event
            .budget_items
            .iter()
            .map(|item| {
                vec![
                    item.category.clone(),
                    or_dash(&item.description).to_string(),
                    format_money(item.amount, &event.currency),
                    item.status.to_string(),
                ]
            })
            .collect();
        writeln!(out, "Budget Items:")?;
        write!(
            out,
            "{}",
            render_table(&["Category", "Description", "Amount", "Status"], &rows)
        )?;
    }
    writeln!(out)?;

    if event.staff.is_empty() {
        writeln!(out, "No staff assignments yet.")?;
    } else {
        let rows: Vec<Vec<String>> = event
            .staff
            .iter()
            .map(|s| {
                vec![
                    s.full_name.clone(),
                    or_dash(&s.role).to_string(),
                    s.hours_booked.normalize().to_string(),
                    format_money(s.hourly_rate, &event.currency),
                    format_cost(s.total_cost(), &event.currency),
                ]
            })
            .collect();
        writeln!(out, "Staff Assignments:")?;
        write!(
            out,
            "{}",
            render_table(&["Name", "Role", "Hours", "Rate", "Cost"], &rows)
        )?;
    }
    Ok(())
}

// -----------------------------------------------------------------------
// Tests
// -----------------------------------------------------------------------
