// src/handlers/purchase_orders.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
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
    models::purchase_orders::{PurchaseOrder, PurchaseOrderDetail, PurchaseOrderStatus},
    services::purchase_order_service::OrderLine,
};

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderLinePayload {
    #[validate(length(min = 1, message = "Material name is required."))]
    #[schema(example = "HMS 1&2 melting scrap")]
    pub material_name: String,

    /// Optional link to an inventory item.
    pub item_id: Option<Uuid>,

    #[validate(custom(function = "crate::common::validation::validate_positive_quantity"))]
    pub quantity: Decimal,

    #[validate(custom(function = "crate::common::validation::validate_not_negative"))]
    pub rate: Decimal,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderPayload {
    #[validate(length(min = 1, max = 120, message = "Supplier name is required."))]
    pub supplier_name: String,

    #[schema(value_type = String, format = Date)]
    pub order_date: NaiveDate,

    #[schema(value_type = Option<String>, format = Date)]
    pub expected_date: Option<NaiveDate>,

    pub notes: Option<String>,

    #[validate(length(min = 1, message = "An order needs at least one line."), nested)]
    pub items: Vec<OrderLinePayload>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct TransitionOrderPayload {
    pub status: PurchaseOrderStatus,
}

#[utoipa::path(
    post,
    path = "/api/purchase-orders",
    tag = "Purchase Orders",
    request_body = CreateOrderPayload,
    responses(
        (status = 201, description = "Draft order created", body = PurchaseOrderDetail),
        (status = 400, description = "Invalid payload")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_order(
    State(app_state): State<AppState>,
    locale: Locale,
    _user: AuthenticatedUser,
    Json(payload): Json<CreateOrderPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let lines: Vec<OrderLine> = payload
        .items
        .iter()
        .map(|line| OrderLine {
            material_name: &line.material_name,
            item_id: line.item_id,
            quantity: line.quantity,
            rate: line.rate,
        })
        .collect();

    let order = app_state
        .purchase_order_service
        .create_order(
            &payload.supplier_name,
            payload.order_date,
            payload.expected_date,
            payload.notes.as_deref(),
            &lines,
        )
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(order)))
}

#[utoipa::path(
    get,
    path = "/api/purchase-orders",
    tag = "Purchase Orders",
    responses(
        (status = 200, description = "Order headers, newest first", body = [PurchaseOrder])
    ),
    security(("api_jwt" = []))
)]
pub async fn list_orders(
    State(app_state): State<AppState>,
    locale: Locale,
    _user: AuthenticatedUser,
) -> Result<impl IntoResponse, ApiError> {
    let orders = app_state
        .purchase_order_service
        .list_orders()
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(orders))
}

#[utoipa::path(
    get,
    path = "/api/purchase-orders/{id}",
    tag = "Purchase Orders",
    params(("id" = Uuid, Path, description = "Order id")),
    responses(
        (status = 200, description = "Order with its lines", body = PurchaseOrderDetail),
        (status = 404, description = "Order not found")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_order(
    State(app_state): State<AppState>,
    locale: Locale,
    _user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let order = app_state
        .purchase_order_service
        .get_order(id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(order))
}

// POST /api/purchase-orders/{id}/status
#[utoipa::path(
    post,
    path = "/api/purchase-orders/{id}/status",
    tag = "Purchase Orders",
    request_body = TransitionOrderPayload,
    params(("id" = Uuid, Path, description = "Order id")),
    responses(
        (status = 200, description = "Status changed", body = PurchaseOrder),
        (status = 404, description = "Order not found"),
        (status = 409, description = "Transition not allowed")
    ),
    security(("api_jwt" = []))
)]
pub async fn transition_order(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<TransitionOrderPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let order = app_state
        .purchase_order_service
        .transition(id, payload.status)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    tracing::info!(order = %id, status = order.status.as_str(), user = %user.0.sub, "Purchase order moved");
    Ok(Json(order))
}

#[utoipa::path(
    delete,
    path = "/api/purchase-orders/{id}",
    tag = "Purchase Orders",
    params(("id" = Uuid, Path, description = "Order id")),
    responses(
        (status = 204, description = "Order deleted"),
        (status = 403, description = "Admin only"),
        (status = 404, description = "Order not found"),
        (status = 409, description = "Only draft or cancelled orders can be deleted")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_order(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireRole<Admin>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .purchase_order_service
        .delete_order(id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(StatusCode::NO_CONTENT)
}
