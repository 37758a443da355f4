// src/handlers/data.rs

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};

use crate::{
    common::error::ApiError,
    config::AppState,
    middleware::{
        auth::AuthenticatedUser,
        i18n::Locale,
        rbac::{Admin, RequireRole},
    },
    models::data::{Dataset, ImportSummary},
};

// GET /api/data/export/{dataset}
#[utoipa::path(
    get,
    path = "/api/data/export/{dataset}",
    tag = "Data",
    params(("dataset" = String, Path, description = "inventory, goods, expenses, ledger or attendance")),
    responses(
        (status = 200, description = "CSV with a header row", content_type = "text/csv"),
        (status = 400, description = "Unknown dataset")
    ),
    security(("api_jwt" = []))
)]
pub async fn export_dataset(
    State(app_state): State<AppState>,
    locale: Locale,
    _user: AuthenticatedUser,
    Path(dataset): Path<String>,
) -> Result<Response, ApiError> {
    let dataset = dataset
        .parse::<Dataset>()
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let csv = app_state
        .export_service
        .export(dataset)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let headers = [
        (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
        (header::CONTENT_DISPOSITION, format!("attachment; filename=\"{}\"", dataset.file_name())),
    ];

    Ok((headers, csv).into_response())
}

// POST /api/data/import/inventory
#[utoipa::path(
    post,
    path = "/api/data/import/inventory",
    tag = "Data",
    request_body(content = String, content_type = "text/csv", description = "name,category,hsn_code,unit,quantity,average_price,low_stock_threshold"),
    responses(
        (status = 200, description = "Rows created and updated, with rejected lines", body = ImportSummary),
        (status = 400, description = "File is not readable CSV"),
        (status = 403, description = "Admin only")
    ),
    security(("api_jwt" = []))
)]
pub async fn import_inventory(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireRole<Admin>,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    let summary = app_state
        .export_service
        .import_inventory(&body)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(summary))
}
