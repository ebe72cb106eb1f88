use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse};
use axum::routing::{get, post};
use axum::{Json, Router};
use tokio_util::sync::CancellationToken;
use tower_http::cors::CorsLayer;
use uuid::Uuid;

use planner_core::{
    NewBudgetItem, NewEvent, NewStaffAssignment, PlannerError, PlannerService,
    build_event_summary, build_portfolio_summary,
};

use crate::format::{format_money, or_dash};

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

pub struct AppError {
    status: StatusCode,
    message: String,
}

impl AppError {
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: msg.into(),
        }
    }
}

impl From<PlannerError> for AppError {
    fn from(err: PlannerError) -> Self {
        let status = match &err {
            PlannerError::Validation(_) => StatusCode::BAD_REQUEST,
            PlannerError::NotFound(_) => StatusCode::NOT_FOUND,
            PlannerError::Cancelled => StatusCode::SERVICE_UNAVAILABLE,
            PlannerError::Persistence(_) | PlannerError::Overflow(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        if status.is_server_error() {
            tracing::error!(error = %err, "request failed");
        }
        Self {
            status,
            message: err.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let body = serde_json::json!({ "error": self.message });
        (self.status, Json(body)).into_response()
    }
}

// ---------------------------------------------------------------------------
// State
// ---------------------------------------------------------------------------

/// Shared by every handler. `cancel` fires on shutdown so in-flight service
/// calls stop waiting on the gate or the store.
#[derive(Clone)]
struct AppState {
    service: Arc<PlannerService>,
    cancel: CancellationToken,
}

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

pub fn build_router(service: Arc<PlannerService>, cancel: CancellationToken) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/api/events", get(list_events).post(create_event))
        .route("/api/events/{id}", get(get_event))
        .route("/api/events/{id}/budget-items", post(add_budget_item))
        .route("/api/events/{id}/staff", post(add_staff))
        .route("/api/events/{id}/summary", get(get_event_summary))
        .route("/api/portfolio", get(portfolio))
        .layer(CorsLayer::permissive())
        .with_state(AppState { service, cancel })
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

/// Serve until `cancel` fires (Ctrl+C in the binary).
pub async fn run_serve(
    service: Arc<PlannerService>,
    bind: &str,
    port: u16,
    cancel: CancellationToken,
) -> Result<()> {
    let app = build_router(service, cancel.clone());
    let addr: SocketAddr = format!("{bind}:{port}").parse()?;
    tracing::info!("planner serve listening on http://{addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(cancel.cancelled_owned())
        .await?;
    tracing::info!("planner serve shut down");
    Ok(())
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

async fn index(State(state): State<AppState>) -> Result<axum::response::Response, AppError> {
    let mut events = state.service.list_events(&state.cancel).await?;
    let portfolio = build_portfolio_summary(&events).map_err(PlannerError::from)?;
    events.sort_by_key(|e| e.date);
    let summaries = events
        .iter()
        .map(build_event_summary)
        .collect::<Result<Vec<_>, _>>()
        .map_err(PlannerError::from)?;

    let rows = if events.is_empty() {
        "<tr><td colspan=\"8\">No events yet.</td></tr>".to_string()
    } else {
        events
            .iter()
            .zip(&summaries)
            .map(|(e, s)| {
                format!(
                    "<tr><td><a href=\"/api/events/{id}\">{name}</a></td><td>{date}</td><td>{venue}</td>\
<td>{budget}</td><td>{paid}</td><td>{staff}</td><td>{remaining}</td><td>{status}</td></tr>",
                    id = e.id,
                    name = escape_html(&e.name),
                    date = e.date,
                    venue = escape_html(or_dash(&e.venue)),
                    budget = format_money(s.target_budget, &e.currency),
                    paid = format_money(s.total_paid, &e.currency),
                    staff = format_money(s.staff_cost, &e.currency),
                    remaining = format_money(s.remaining_budget, &e.currency),
                    status = if s.is_over_budget { "over budget" } else { "on track" },
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    };

    let html = format!(
        "<!DOCTYPE html>\
<html><head><title>Event budget planner</title></head><body>\
<h1>Event budget planner</h1>\
<p><a href=\"/api/events\">/api/events</a> | <a href=\"/api/portfolio\">/api/portfolio</a></p>\
<p>Events: {count} | Target: {target} | Planned: {planned} | Committed: {committed} | Paid: {paid} | Staff: {staff} | Over budget: {over}</p>\
<table><tr><th>Event</th><th>Date</th><th>Venue</th><th>Budget</th><th>Paid</th><th>Staff</th><th>Remaining</th><th>Status</th></tr>{rows}</table>\
</body></html>",
        count = portfolio.event_count,
        target = format_money(portfolio.total_target_budget, ""),
        planned = format_money(portfolio.total_planned, ""),
        committed = format_money(portfolio.total_committed, ""),
        paid = format_money(portfolio.total_paid, ""),
        staff = format_money(portfolio.total_staff_cost, ""),
        over = portfolio.over_budget_events,
    );

    Ok(Html(html).into_response())
}

async fn list_events(State(state): State<AppState>) -> Result<axum::response::Response, AppError> {
    let events = state.service.list_events(&state.cancel).await?;
    Ok(Json(events).into_response())
}

async fn create_event(
    State(state): State<AppState>,
    Json(input): Json<NewEvent>,
) -> Result<axum::response::Response, AppError> {
    let event = state.service.create_event(input, &state.cancel).await?;
    Ok((StatusCode::CREATED, Json(event)).into_response())
}

async fn get_event(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<axum::response::Response, AppError> {
    let event = state
        .service
        .get_event(id, &state.cancel)
        .await?
        .ok_or_else(|| AppError::not_found(format!("event {id} not found")))?;
    Ok(Json(event).into_response())
}

async fn add_budget_item(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(input): Json<NewBudgetItem>,
) -> Result<axum::response::Response, AppError> {
    let item = state.service.add_budget_item(id, input, &state.cancel).await?;
    Ok((StatusCode::CREATED, Json(item)).into_response())
}

async fn add_staff(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(input): Json<NewStaffAssignment>,
) -> Result<axum::response::Response, AppError> {
    let staff = state
        .service
        .add_staff_assignment(id, input, &state.cancel)
        .await?;
    Ok((StatusCode::CREATED, Json(staff)).into_response())
}

async fn get_event_summary(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<axum::response::Response, AppError> {
    let summary = state
        .service
        .get_event_summary(id, &state.cancel)
        .await?
        .ok_or_else(|| AppError::not_found(format!("event {id} not found")))?;
    Ok(Json(summary).into_response())
}

async fn portfolio(State(state): State<AppState>) -> Result<axum::response::Response, AppError> {
    let summary = state.service.portfolio_summary(&state.cancel).await?;
    Ok(Json(summary).into_response())
}

fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
