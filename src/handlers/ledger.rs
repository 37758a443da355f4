// src/handlers/ledger.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::{NaiveDate, Utc};
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
    models::ledger::{LedgerEntry, LedgerFilter, LedgerKind, LedgerSummary},
};

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateLedgerEntryPayload {
    #[validate(length(min = 1, max = 120, message = "Person name is required."))]
    #[schema(example = "Suresh (kabadiwala, Dharavi)")]
    pub person_name: String,

    pub phone: Option<String>,

    pub kind: LedgerKind,

    #[validate(custom(function = "crate::common::validation::validate_positive_amount"))]
    pub amount: Decimal,

    #[schema(value_type = String, format = Date)]
    pub entry_date: NaiveDate,

    #[schema(value_type = Option<String>, format = Date)]
    pub due_date: Option<NaiveDate>,

    pub notes: Option<String>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SettleLedgerEntryPayload {
    /// Defaults to today.
    #[schema(value_type = Option<String>, format = Date)]
    pub settled_on: Option<NaiveDate>,
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

#[utoipa::path(
    post,
    path = "/api/ledger",
    tag = "Ledger",
    request_body = CreateLedgerEntryPayload,
    responses(
        (status = 201, description = "Loan recorded; cash balance moved", body = LedgerEntry),
        (status = 400, description = "Invalid payload")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_entry(
    State(app_state): State<AppState>,
    locale: Locale,
    _user: AuthenticatedUser,
    Json(payload): Json<CreateLedgerEntryPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let entry = app_state
        .ledger_service
        .create_entry(
            &payload.person_name,
            non_blank(&payload.phone),
            payload.kind,
            payload.amount,
            payload.entry_date,
            payload.due_date,
            non_blank(&payload.notes),
        )
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(entry)))
}

#[utoipa::path(
    get,
    path = "/api/ledger",
    tag = "Ledger",
    params(LedgerFilter),
    responses(
        (status = 200, description = "Ledger entries", body = [LedgerEntry])
    ),
    security(("api_jwt" = []))
)]
pub async fn list_entries(
    State(app_state): State<AppState>,
    locale: Locale,
    _user: AuthenticatedUser,
    Query(filter): Query<LedgerFilter>,
) -> Result<impl IntoResponse, ApiError> {
    let entries = app_state
        .ledger_service
        .list_entries(filter.status)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(entries))
}

#[utoipa::path(
    get,
    path = "/api/ledger/summary",
    tag = "Ledger",
    responses(
        (status = 200, description = "Outstanding amounts of open entries", body = LedgerSummary)
    ),
    security(("api_jwt" = []))
)]
pub async fn get_summary(
    State(app_state): State<AppState>,
    locale: Locale,
    _user: AuthenticatedUser,
) -> Result<impl IntoResponse, ApiError> {
    let summary = app_state
        .ledger_service
        .summary()
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(summary))
}

#[utoipa::path(
    post,
    path = "/api/ledger/{id}/settle",
    tag = "Ledger",
    request_body = SettleLedgerEntryPayload,
    params(("id" = Uuid, Path, description = "Ledger entry id")),
    responses(
        (status = 200, description = "Entry settled; cash balance moved back", body = LedgerEntry),
        (status = 404, description = "Entry not found"),
        (status = 409, description = "Entry is already settled")
    ),
    security(("api_jwt" = []))
)]
pub async fn settle_entry(
    State(app_state): State<AppState>,
    locale: Locale,
    _user: AuthenticatedUser,
    Path(id): Path<Uuid>,
    payload: Option<Json<SettleLedgerEntryPayload>>,
) -> Result<impl IntoResponse, ApiError> {
    let settled_on = payload
        .and_then(|Json(p)| p.settled_on)
        .unwrap_or_else(|| Utc::now().date_naive());

    let entry = app_state
        .ledger_service
        .settle_entry(id, settled_on)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(entry))
}

#[utoipa::path(
    delete,
    path = "/api/ledger/{id}",
    tag = "Ledger",
    params(("id" = Uuid, Path, description = "Ledger entry id")),
    responses(
        (status = 204, description = "Entry deleted"),
        (status = 403, description = "Admin only"),
        (status = 404, description = "Entry not found")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_entry(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireRole<Admin>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .ledger_service
        .delete_entry(id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(StatusCode::NO_CONTENT)
}
