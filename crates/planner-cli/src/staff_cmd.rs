//! `planner staff add` command: book a staff member on an event.

use std::io::Write;

use anyhow::Result;
use tokio_util::sync::CancellationToken;

use planner_core::{NewStaffAssignment, PlannerService};

use crate::StaffCommands;
use crate::format::{format_cost, or_dash};
use crate::parse::{parse_decimal, parse_id};

pub async fn run_staff_command(
    command: StaffCommands,
    service: &PlannerService,
    cancel: &CancellationToken,
    out: &mut impl Write,
) -> Result<()> {
    let StaffCommands::Add {
        event_id,
        name,
        role,
        rate,
        hours,
    } = command;

    let event_id = parse_id(&event_id, "event")?;
    let input = NewStaffAssignment::new(
        name,
        parse_decimal(&rate, "hourly rate")?,
        parse_decimal(&hours, "hours")?,
    )
    .role(role);

    let staff = service.add_staff_assignment(event_id, input, cancel).await?;
    writeln!(
        out,
        "Assigned {} ({}) costing {} to event {event_id}.",
        staff.full_name,
        or_dash(&staff.role),
        format_cost(staff.total_cost(), "")
    )?;
    Ok(())
}
