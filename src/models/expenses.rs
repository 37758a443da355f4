// src/models/expenses.rs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::models::balances::BalanceAccount;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Expense {
    pub id: Uuid,
    #[schema(value_type = String, format = Date, example = "2025-03-14")]
    pub expense_date: NaiveDate,
    #[schema(example = "Transport")]
    pub category: String,
    #[schema(example = "Tempo hire, Bhiwandi to yard")]
    pub description: Option<String>,
    #[schema(example = "1800.00")]
    pub amount: Decimal,
    pub paid_from: BalanceAccount,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct DateRange {
    #[param(value_type = Option<String>, format = Date)]
    pub from: Option<NaiveDate>,
    #[param(value_type = Option<String>, format = Date)]
    pub to: Option<NaiveDate>,
}
