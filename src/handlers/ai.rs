// src/handlers/ai.rs

use axum::{extract::State, response::IntoResponse, Json};
use validator::Validate;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::{auth::AuthenticatedUser, i18n::Locale},
    models::ai::{DemandForecast, DemandForecastRequest, PriceSuggestion, PriceSuggestionRequest},
};

#[utoipa::path(
    post,
    path = "/api/ai/suggest-price",
    tag = "AI",
    request_body = PriceSuggestionRequest,
    responses(
        (status = 200, description = "Suggested price band for the material", body = PriceSuggestion),
        (status = 400, description = "Invalid payload"),
        (status = 502, description = "Model unreachable or answered nonsense"),
        (status = 503, description = "No model configured")
    ),
    security(("api_jwt" = []))
)]
pub async fn suggest_price(
    State(app_state): State<AppState>,
    locale: Locale,
    _user: AuthenticatedUser,
    Json(payload): Json<PriceSuggestionRequest>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let suggestion = app_state
        .ai_service
        .suggest_price(&payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(suggestion))
}

#[utoipa::path(
    post,
    path = "/api/ai/forecast-demand",
    tag = "AI",
    request_body = DemandForecastRequest,
    responses(
        (status = 200, description = "Monthly demand forecast", body = DemandForecast),
        (status = 400, description = "Invalid payload"),
        (status = 502, description = "Model unreachable or answered nonsense"),
        (status = 503, description = "No model configured")
    ),
    security(("api_jwt" = []))
)]
pub async fn forecast_demand(
    State(app_state): State<AppState>,
    locale: Locale,
    _user: AuthenticatedUser,
    Json(payload): Json<DemandForecastRequest>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let forecast = app_state
        .ai_service
        .forecast_demand(&payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(forecast))
}
