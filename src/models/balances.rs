// src/models/balances.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

/// The two money pools every transaction moves: the bank account and the cash box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "balance_account", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BalanceAccount {
    Bank,
    Cash,
}

impl BalanceAccount {
    pub fn as_str(&self) -> &'static str {
        match self {
            BalanceAccount::Bank => "BANK",
            BalanceAccount::Cash => "CASH",
        }
    }
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Balances {
    #[schema(example = "125000.00")]
    pub bank_balance: Decimal,
    #[schema(example = "8400.50")]
    pub cash_balance: Decimal,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SetBalancesPayload {
    pub bank_balance: Decimal,
    pub cash_balance: Decimal,
}
