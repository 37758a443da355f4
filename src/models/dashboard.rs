// src/models/dashboard.rs

use rust_decimal::Decimal;
use serde::Serialize;
use utoipa::ToSchema;

// The cards at the top of the dashboard
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub bank_balance: Decimal,
    pub cash_balance: Decimal,
    pub inventory_value: Decimal,      // Σ quantity × average price
    pub purchases_this_month: Decimal, // inward totals, GST + cash
    pub sales_this_month: Decimal,     // outward totals, GST + cash
    pub expenses_this_month: Decimal,
    pub loans_given_outstanding: Decimal,
    pub loans_taken_outstanding: Decimal,
    pub low_stock_items: i64,
}
