// src/handlers/expenses.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::{
        auth::AuthenticatedUser,
        i18n::Locale,
        rbac::{Admin, RequireRole},
    },
    models::{
        balances::BalanceAccount,
        expenses::{DateRange, Expense},
    },
};

/// Body of create and update.
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ExpensePayload {
    #[schema(value_type = String, format = Date, example = "2025-03-14")]
    pub expense_date: NaiveDate,

    #[validate(length(min = 1, max = 60, message = "Category is required."))]
    #[schema(example = "Transport")]
    pub category: String,

    pub description: Option<String>,

    #[validate(custom(function = "crate::common::validation::validate_positive_amount"))]
    pub amount: Decimal,

    pub paid_from: BalanceAccount,
}

impl ExpensePayload {
    fn description(&self) -> Option<&str> {
        self.description.as_deref().map(str::trim).filter(|d| !d.is_empty())
    }
}

#[utoipa::path(
    post,
    path = "/api/expenses",
    tag = "Expenses",
    request_body = ExpensePayload,
    responses(
        (status = 201, description = "Expense booked against the paying account", body = Expense),
        (status = 400, description = "Invalid payload")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_expense(
    State(app_state): State<AppState>,
    locale: Locale,
    _user: AuthenticatedUser,
    Json(payload): Json<ExpensePayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let expense = app_state
        .expense_service
        .create_expense(
            payload.expense_date,
            &payload.category,
            payload.description(),
            payload.amount,
            payload.paid_from,
        )
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(expense)))
}

#[utoipa::path(
    get,
    path = "/api/expenses",
    tag = "Expenses",
    params(DateRange),
    responses(
        (status = 200, description = "Expenses in the range, newest first", body = [Expense])
    ),
    security(("api_jwt" = []))
)]
pub async fn list_expenses(
    State(app_state): State<AppState>,
    locale: Locale,
    _user: AuthenticatedUser,
    Query(range): Query<DateRange>,
) -> Result<impl IntoResponse, ApiError> {
    let expenses = app_state
        .expense_service
        .list_expenses(range.from, range.to)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(expenses))
}

#[utoipa::path(
    put,
    path = "/api/expenses/{id}",
    tag = "Expenses",
    request_body = ExpensePayload,
    params(("id" = Uuid, Path, description = "Expense id")),
    responses(
        (status = 200, description = "Old amount refunded and new amount booked", body = Expense),
        (status = 404, description = "Expense not found")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_expense(
    State(app_state): State<AppState>,
    locale: Locale,
    _user: AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<ExpensePayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let expense = app_state
        .expense_service
        .update_expense(
            id,
            payload.expense_date,
            &payload.category,
            payload.description(),
            payload.amount,
            payload.paid_from,
        )
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(expense))
}

#[utoipa::path(
    delete,
    path = "/api/expenses/{id}",
    tag = "Expenses",
    params(("id" = Uuid, Path, description = "Expense id")),
    responses(
        (status = 204, description = "Expense deleted and refunded"),
        (status = 403, description = "Admin only"),
        (status = 404, description = "Expense not found")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_expense(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireRole<Admin>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .expense_service
        .delete_expense(id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(StatusCode::NO_CONTENT)
}
