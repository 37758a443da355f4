// src/handlers/goods.rs

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
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
    models::goods::{GoodsEntry, GoodsEntryPayload, GoodsFilter},
};

#[utoipa::path(
    post,
    path = "/api/goods",
    tag = "Goods",
    request_body = GoodsEntryPayload,
    responses(
        (status = 201, description = "Entry booked; stock and balance updated", body = GoodsEntry),
        (status = 400, description = "Invalid payload"),
        (status = 404, description = "Item not found"),
        (status = 409, description = "Not enough stock for a sale")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_entry(
    State(app_state): State<AppState>,
    locale: Locale,
    _user: AuthenticatedUser,
    Json(payload): Json<GoodsEntryPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let entry = app_state
        .goods_service
        .create_entry(&payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(entry)))
}

#[utoipa::path(
    get,
    path = "/api/goods",
    tag = "Goods",
    params(GoodsFilter),
    responses(
        (status = 200, description = "Entries, newest first", body = [GoodsEntry])
    ),
    security(("api_jwt" = []))
)]
pub async fn list_entries(
    State(app_state): State<AppState>,
    locale: Locale,
    _user: AuthenticatedUser,
    Query(filter): Query<GoodsFilter>,
) -> Result<impl IntoResponse, ApiError> {
    let entries = app_state
        .goods_service
        .list_entries(&filter)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(entries))
}

#[utoipa::path(
    get,
    path = "/api/goods/{id}",
    tag = "Goods",
    params(("id" = Uuid, Path, description = "Goods entry id")),
    responses(
        (status = 200, description = "The entry", body = GoodsEntry),
        (status = 404, description = "Entry not found")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_entry(
    State(app_state): State<AppState>,
    locale: Locale,
    _user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let entry = app_state
        .goods_service
        .get_entry(id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(entry))
}

#[utoipa::path(
    put,
    path = "/api/goods/{id}",
    tag = "Goods",
    request_body = GoodsEntryPayload,
    params(("id" = Uuid, Path, description = "Goods entry id")),
    responses(
        (status = 200, description = "Old effects reversed and new ones applied", body = GoodsEntry),
        (status = 404, description = "Entry or item not found"),
        (status = 409, description = "The edit would drive stock negative")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_entry(
    State(app_state): State<AppState>,
    locale: Locale,
    _user: AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<GoodsEntryPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let entry = app_state
        .goods_service
        .update_entry(id, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(entry))
}

#[utoipa::path(
    delete,
    path = "/api/goods/{id}",
    tag = "Goods",
    params(("id" = Uuid, Path, description = "Goods entry id")),
    responses(
        (status = 204, description = "Entry deleted and its effects reversed"),
        (status = 403, description = "Admin only"),
        (status = 404, description = "Entry not found"),
        (status = 409, description = "Reversing a purchase would drive stock negative")
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
        .goods_service
        .delete_entry(id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(StatusCode::NO_CONTENT)
}

// GET /api/goods/{id}/invoice
#[utoipa::path(
    get,
    path = "/api/goods/{id}/invoice",
    tag = "Goods",
    params(("id" = Uuid, Path, description = "Outward GST entry id")),
    responses(
        (status = 200, description = "Tax invoice", content_type = "application/pdf"),
        (status = 404, description = "Entry not found"),
        (status = 409, description = "Entry is not a GST sale")
    ),
    security(("api_jwt" = []))
)]
pub async fn invoice_pdf(
    State(app_state): State<AppState>,
    locale: Locale,
    _user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<Response, ApiError> {
    let (file_name, pdf_bytes) = app_state
        .document_service
        .generate_tax_invoice(id)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    let headers = [
        (header::CONTENT_TYPE, "application/pdf".to_string()),
        (header::CONTENT_DISPOSITION, format!("attachment; filename=\"{}\"", file_name)),
    ];

    Ok((headers, pdf_bytes).into_response())
}
