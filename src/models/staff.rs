// src/models/staff.rs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::models::balances::BalanceAccount;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "staff_kind", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StaffKind {
    Staff,
    Labourer,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "wage_basis", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WageBasis {
    Daily,
    Monthly,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "attendance_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AttendanceStatus {
    Present,
    Absent,
    HalfDay,
    Leave,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StaffMember {
    pub id: Uuid,
    #[schema(example = "Raju Yadav")]
    pub name: String,
    pub phone: Option<String>,
    pub kind: StaffKind,
    #[schema(example = "Loader")]
    pub designation: Option<String>,
    pub wage_basis: WageBasis,
    #[schema(example = "650.00")]
    pub wage_rate: Decimal,
    #[schema(value_type = String, format = Date)]
    pub joined_on: NaiveDate,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceRecord {
    pub id: Uuid,
    pub staff_id: Uuid,
    #[schema(value_type = String, format = Date)]
    pub attendance_date: NaiveDate,
    pub status: AttendanceStatus,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WagePayment {
    pub id: Uuid,
    pub staff_id: Uuid,
    #[schema(value_type = String, format = Date)]
    pub period_start: NaiveDate,
    #[schema(value_type = String, format = Date)]
    pub period_end: NaiveDate,
    pub amount: Decimal,
    #[schema(value_type = String, format = Date)]
    pub paid_on: NaiveDate,
    pub paid_from: BalanceAccount,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Attendance counts of one staff member over a period.
#[derive(Debug, Clone, Default, PartialEq, Eq, FromRow)]
pub struct AttendanceTally {
    pub staff_id: Uuid,
    pub present: i64,
    pub half_days: i64,
    pub absent: i64,
    pub leave: i64,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WageSummaryEntry {
    pub staff_id: Uuid,
    pub name: String,
    pub kind: StaffKind,
    pub wage_basis: WageBasis,
    pub wage_rate: Decimal,
    pub present_days: i64,
    pub half_days: i64,
    pub absent_days: i64,
    pub leave_days: i64,
    #[schema(example = "24.5")]
    pub paid_days: Decimal,
    pub earned: Decimal,
    pub already_paid: Decimal,
    pub due: Decimal,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct StaffFilter {
    pub kind: Option<StaffKind>,
    pub active: Option<bool>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct AttendanceFilter {
    pub staff_id: Option<Uuid>,
    #[param(value_type = Option<String>, format = Date)]
    pub from: Option<NaiveDate>,
    #[param(value_type = Option<String>, format = Date)]
    pub to: Option<NaiveDate>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct WagePeriod {
    #[param(value_type = String, format = Date)]
    pub from: NaiveDate,
    #[param(value_type = String, format = Date)]
    pub to: NaiveDate,
}
