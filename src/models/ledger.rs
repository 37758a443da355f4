// src/models/ledger.rs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "ledger_kind", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LedgerKind {
    Given, // we lent money
    Taken, // we borrowed money
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "ledger_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LedgerStatus {
    Open,
    Settled,
}

impl LedgerStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            LedgerStatus::Open => "OPEN",
            LedgerStatus::Settled => "SETTLED",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LedgerEntry {
    pub id: Uuid,
    #[schema(example = "Suresh (kabadiwala)")]
    pub person_name: String,
    pub phone: Option<String>,
    pub kind: LedgerKind,
    #[schema(example = "5000.00")]
    pub amount: Decimal,
    #[schema(value_type = String, format = Date)]
    pub entry_date: NaiveDate,
    #[schema(value_type = Option<String>, format = Date)]
    pub due_date: Option<NaiveDate>,
    pub status: LedgerStatus,
    #[schema(value_type = Option<String>, format = Date)]
    pub settled_on: Option<NaiveDate>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct LedgerFilter {
    pub status: Option<LedgerStatus>,
}

#[derive(Debug, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LedgerSummary {
    /// Money lent out and not yet returned.
    pub outstanding_given: Decimal,
    /// Money borrowed and not yet repaid.
    pub outstanding_taken: Decimal,
    pub open_entries: i64,
}
