use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use crate::money::DEFAULT_CURRENCY;

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Lifecycle status of a budget line item.
///
/// Serialized as the variant name. Deserialization also accepts the ordinal
/// form (`0`, `1`, `2`) found in data files written by older tooling.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
pub enum BudgetStatus {
    #[default]
    Planned,
    Committed,
    Paid,
}

impl BudgetStatus {
    /// All statuses in ordinal order.
    pub const ALL: [BudgetStatus; 3] = [Self::Planned, Self::Committed, Self::Paid];

    fn from_ordinal(value: u64) -> Option<Self> {
        match value {
            0 => Some(Self::Planned),
            1 => Some(Self::Committed),
            2 => Some(Self::Paid),
            _ => None,
        }
    }
}

impl fmt::Display for BudgetStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Planned => "Planned",
            Self::Committed => "Committed",
            Self::Paid => "Paid",
        };
        f.write_str(s)
    }
}

impl FromStr for BudgetStatus {
    type Err = BudgetStatusParseError;

    /// Case-insensitive; surrounding whitespace is ignored.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "planned" => Ok(Self::Planned),
            "committed" => Ok(Self::Committed),
            "paid" => Ok(Self::Paid),
            _ => Err(BudgetStatusParseError(s.to_owned())),
        }
    }
}

impl<'de> Deserialize<'de> for BudgetStatus {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        // Routed through `Value` because untagged enums cannot see numbers
        // when serde_json runs with `arbitrary_precision`.
        match serde_json::Value::deserialize(deserializer)? {
            serde_json::Value::String(name) => name.parse().map_err(serde::de::Error::custom),
            serde_json::Value::Number(n) => n
                .as_u64()
                .and_then(Self::from_ordinal)
                .ok_or_else(|| {
                    serde::de::Error::custom(format!("invalid budget status ordinal: {n}"))
                }),
            other => Err(serde::de::Error::custom(format!(
                "invalid budget status: {other}"
            ))),
        }
    }
}

/// Error returned when parsing an invalid [`BudgetStatus`] string.
#[derive(Debug, Clone)]
pub struct BudgetStatusParseError(pub String);

impl fmt::Display for BudgetStatusParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invalid budget status: {:?} (expected Planned, Committed or Paid)",
            self.0
        )
    }
}

impl std::error::Error for BudgetStatusParseError {}

// ---------------------------------------------------------------------------
// Entities
// ---------------------------------------------------------------------------

/// A planned occasion with a target budget, its cost lines and its staff.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: Uuid,
    pub name: String,
    pub date: NaiveDate,
    #[serde(default)]
    pub venue: String,
    #[serde(with = "rust_decimal::serde::arbitrary_precision")]
    pub target_budget: Decimal,
    #[serde(default = "default_currency")]
    pub currency: String,
    #[serde(default)]
    pub budget_items: Vec<BudgetItem>,
    #[serde(default)]
    pub staff: Vec<StaffAssignment>,
}

/// A single categorized cost entry against an [`Event`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetItem {
    pub id: Uuid,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub description: String,
    #[serde(with = "rust_decimal::serde::arbitrary_precision")]
    pub amount: Decimal,
    #[serde(default)]
    pub status: BudgetStatus,
}

/// A booked worker on an [`Event`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StaffAssignment {
    pub id: Uuid,
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub role: String,
    #[serde(with = "rust_decimal::serde::arbitrary_precision")]
    pub hourly_rate: Decimal,
    #[serde(with = "rust_decimal::serde::arbitrary_precision")]
    pub hours_booked: Decimal,
}

impl StaffAssignment {
    /// Rate times hours. Not rounded. `None` when the product does not fit
    /// in a [`Decimal`].
    pub fn total_cost(&self) -> Option<Decimal> {
        self.hourly_rate.checked_mul(self.hours_booked)
    }
}

fn default_currency() -> String {
    DEFAULT_CURRENCY.to_owned()
}

// ---------------------------------------------------------------------------
// Inputs
// ---------------------------------------------------------------------------

/// Caller-supplied fields for a new event. Normalized by the service.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NewEvent {
    pub name: String,
    pub date: NaiveDate,
    #[serde(default)]
    pub venue: String,
    #[serde(with = "rust_decimal::serde::arbitrary_precision")]
    pub target_budget: Decimal,
    #[serde(default)]
    pub currency: String,
}

impl NewEvent {
    pub fn new(name: impl Into<String>, date: NaiveDate, target_budget: Decimal) -> Self {
        Self {
            name: name.into(),
            date,
            venue: String::new(),
            target_budget,
            currency: String::new(),
        }
    }

    pub fn venue(mut self, venue: impl Into<String>) -> Self {
        self.venue = venue.into();
        self
    }

    pub fn currency(mut self, currency: impl Into<String>) -> Self {
        self.currency = currency.into();
        self
    }
}

/// Caller-supplied fields for a new budget line item.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NewBudgetItem {
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub description: String,
    #[serde(with = "rust_decimal::serde::arbitrary_precision")]
    pub amount: Decimal,
    #[serde(default)]
    pub status: BudgetStatus,
}

impl NewBudgetItem {
    pub fn new(amount: Decimal, status: BudgetStatus) -> Self {
        Self {
            category: String::new(),
            description: String::new(),
            amount,
            status,
        }
    }

    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

/// Caller-supplied fields for a new staff assignment.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NewStaffAssignment {
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub role: String,
    #[serde(with = "rust_decimal::serde::arbitrary_precision")]
    pub hourly_rate: Decimal,
    #[serde(with = "rust_decimal::serde::arbitrary_precision")]
    pub hours_booked: Decimal,
}

impl NewStaffAssignment {
    pub fn new(full_name: impl Into<String>, hourly_rate: Decimal, hours_booked: Decimal) -> Self {
        Self {
            full_name: full_name.into(),
            role: String::new(),
            hourly_rate,
            hours_booked,
        }
    }

    pub fn role(mut self, role: impl Into<String>) -> Self {
        self.role = role.into();
        self
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
