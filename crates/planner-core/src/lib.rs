//! Core of the event budget planner: data model, identity generation,
//! persistence contract and the planning service.

pub mod error;
pub mod ids;
pub mod models;
pub mod money;
pub mod service;
pub mod store;

pub use error::{PlannerError, Result};
pub use ids::{IdGenerator, RandomIdGenerator, SequentialIdGenerator};
pub use models::{
    BudgetItem, BudgetStatus, Event, NewBudgetItem, NewEvent, NewStaffAssignment, StaffAssignment,
};
pub use service::{
    EventSummary, PlannerService, PortfolioSummary, TotalsOverflow, build_event_summary,
    build_portfolio_summary,
};
pub use store::{EventStore, JsonFileStore, MemoryStore, StoreError};
