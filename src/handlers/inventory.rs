// src/handlers/inventory.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    db::inventory_repo::ItemFields,
    middleware::{
        auth::AuthenticatedUser,
        i18n::Locale,
        rbac::{Admin, RequireRole},
    },
    models::inventory::{InventoryItem, StockMovement},
};

fn default_unit() -> String {
    "kg".to_string()
}

// ---
// Payload: CreateItem
// ---
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateItemPayload {
    #[validate(length(min = 1, max = 120, message = "Name is required."))]
    #[schema(example = "Copper wire (bare bright)")]
    pub name: String,

    pub category: Option<String>,

    #[schema(example = "7404")]
    pub hsn_code: Option<String>,

    #[validate(length(min = 1, max = 16, message = "Unit is required."))]
    #[serde(default = "default_unit")]
    pub unit: String,

    #[validate(custom(function = "crate::common::validation::validate_not_negative"))]
    #[serde(default)]
    pub low_stock_threshold: Decimal,

    // Stock already in the yard when the item is registered
    #[validate(custom(function = "crate::common::validation::validate_not_negative"))]
    #[serde(default)]
    pub opening_stock: Decimal,

    #[validate(custom(function = "crate::common::validation::validate_not_negative"))]
    #[serde(default)]
    pub opening_price: Decimal,
}

// ---
// Payload: UpdateItem (descriptive fields only)
// ---
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateItemPayload {
    #[validate(length(min = 1, max = 120, message = "Name is required."))]
    pub name: String,

    pub category: Option<String>,

    pub hsn_code: Option<String>,

    #[validate(length(min = 1, max = 16, message = "Unit is required."))]
    #[serde(default = "default_unit")]
    pub unit: String,

    #[validate(custom(function = "crate::common::validation::validate_not_negative"))]
    #[serde(default)]
    pub low_stock_threshold: Decimal,
}

// ---
// Payload: AdjustStock
// ---
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AdjustStockPayload {
    /// Signed: positive adds stock, negative removes it.
    #[validate(custom(function = "crate::common::validation::validate_nonzero_quantity"))]
    #[schema(example = "-12.5")]
    pub quantity: Decimal,

    #[validate(custom(function = "crate::common::validation::validate_not_negative"))]
    pub unit_price: Option<Decimal>,

    pub notes: Option<String>,
}

fn trimmed(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

// ---
// Handler: create_item
// ---
#[utoipa::path(
    post,
    path = "/api/inventory/items",
    tag = "Inventory",
    request_body = CreateItemPayload,
    responses(
        (status = 201, description = "Item created", body = InventoryItem),
        (status = 400, description = "Invalid payload"),
        (status = 409, description = "An item with this name already exists")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_item(
    State(app_state): State<AppState>,
    locale: Locale,
    _user: AuthenticatedUser,
    Json(payload): Json<CreateItemPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let fields = ItemFields {
        name: payload.name.trim(),
        category: trimmed(&payload.category),
        hsn_code: trimmed(&payload.hsn_code),
        unit: payload.unit.trim(),
        low_stock_threshold: payload.low_stock_threshold,
    };

    let new_item = app_state
        .inventory_service
        .create_item(&fields, payload.opening_stock, payload.opening_price)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(new_item)))
}

// ---
// Handler: get_all_items
// ---
#[utoipa::path(
    get,
    path = "/api/inventory/items",
    tag = "Inventory",
    responses(
        (status = 200, description = "All items, by name", body = [InventoryItem])
    ),
    security(("api_jwt" = []))
)]
pub async fn get_all_items(
    State(app_state): State<AppState>,
    locale: Locale,
    _user: AuthenticatedUser,
) -> Result<impl IntoResponse, ApiError> {
    let items = app_state
        .inventory_service
        .list_items()
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(items))
}

#[utoipa::path(
    get,
    path = "/api/inventory/items/{id}",
    tag = "Inventory",
    params(("id" = Uuid, Path, description = "Item id")),
    responses(
        (status = 200, description = "The item", body = InventoryItem),
        (status = 404, description = "Item not found")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_item(
    State(app_state): State<AppState>,
    locale: Locale,
    _user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let item = app_state
        .inventory_service
        .get_item(id)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(item))
}

#[utoipa::path(
    put,
    path = "/api/inventory/items/{id}",
    tag = "Inventory",
    request_body = UpdateItemPayload,
    params(("id" = Uuid, Path, description = "Item id")),
    responses(
        (status = 200, description = "Item updated", body = InventoryItem),
        (status = 404, description = "Item not found"),
        (status = 409, description = "Name already used by another item")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_item(
    State(app_state): State<AppState>,
    locale: Locale,
    _user: AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateItemPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let fields = ItemFields {
        name: payload.name.trim(),
        category: trimmed(&payload.category),
        hsn_code: trimmed(&payload.hsn_code),
        unit: payload.unit.trim(),
        low_stock_threshold: payload.low_stock_threshold,
    };

    let item = app_state
        .inventory_service
        .update_item(id, &fields)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(item))
}

#[utoipa::path(
    delete,
    path = "/api/inventory/items/{id}",
    tag = "Inventory",
    params(("id" = Uuid, Path, description = "Item id")),
    responses(
        (status = 204, description = "Item deleted"),
        (status = 403, description = "Admin only"),
        (status = 404, description = "Item not found"),
        (status = 409, description = "Item is referenced by goods entries")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_item(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireRole<Admin>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .inventory_service
        .delete_item(id)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(StatusCode::NO_CONTENT)
}

// ---
// Handler: adjust_stock (manual correction)
// ---
#[utoipa::path(
    post,
    path = "/api/inventory/items/{id}/adjust",
    tag = "Inventory",
    request_body = AdjustStockPayload,
    params(("id" = Uuid, Path, description = "Item id")),
    responses(
        (status = 200, description = "Stock corrected", body = InventoryItem),
        (status = 404, description = "Item not found"),
        (status = 409, description = "Not enough stock to remove")
    ),
    security(("api_jwt" = []))
)]
pub async fn adjust_stock(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<AdjustStockPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let item = app_state
        .inventory_service
        .adjust_stock(id, payload.quantity, payload.unit_price, trimmed(&payload.notes))
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    tracing::info!(item = %id, quantity = %payload.quantity, user = %user.0.sub, "Stock corrected");
    Ok(Json(item))
}

#[utoipa::path(
    get,
    path = "/api/inventory/items/{id}/movements",
    tag = "Inventory",
    params(("id" = Uuid, Path, description = "Item id")),
    responses(
        (status = 200, description = "Stock history, newest first", body = [StockMovement]),
        (status = 404, description = "Item not found")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_movements(
    State(app_state): State<AppState>,
    locale: Locale,
    _user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let movements = app_state
        .inventory_service
        .list_movements(id)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(movements))
}

#[utoipa::path(
    get,
    path = "/api/inventory/low-stock",
    tag = "Inventory",
    responses(
        (status = 200, description = "Items at or below their threshold", body = [InventoryItem])
    ),
    security(("api_jwt" = []))
)]
pub async fn get_low_stock(
    State(app_state): State<AppState>,
    locale: Locale,
    _user: AuthenticatedUser,
) -> Result<impl IntoResponse, ApiError> {
    let items = app_state
        .inventory_service
        .low_stock()
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(items))
}
