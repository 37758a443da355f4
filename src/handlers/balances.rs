// src/handlers/balances.rs

use axum::{extract::State, response::IntoResponse, Json};

use crate::{
    common::error::ApiError,
    config::AppState,
    middleware::{
        auth::AuthenticatedUser,
        i18n::Locale,
        rbac::{Admin, RequireRole},
    },
    models::balances::{Balances, SetBalancesPayload},
};

// GET /api/balances
#[utoipa::path(
    get,
    path = "/api/balances",
    tag = "Balances",
    responses(
        (status = 200, description = "Current bank and cash balances", body = Balances),
        (status = 401, description = "Not authenticated")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_balances(
    State(app_state): State<AppState>,
    locale: Locale,
    _user: AuthenticatedUser,
) -> Result<impl IntoResponse, ApiError> {
    let balances = app_state
        .balance_service
        .get_balances()
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(balances))
}

// PUT /api/balances
#[utoipa::path(
    put,
    path = "/api/balances",
    tag = "Balances",
    request_body = SetBalancesPayload,
    responses(
        (status = 200, description = "Balances overwritten", body = Balances),
        (status = 403, description = "Admin only")
    ),
    security(("api_jwt" = []))
)]
pub async fn set_opening_balances(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireRole<Admin>,
    Json(payload): Json<SetBalancesPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let balances = app_state
        .balance_service
        .set_opening_balances(payload.bank_balance, payload.cash_balance)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(balances))
}
