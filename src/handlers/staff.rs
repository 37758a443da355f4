// src/handlers/staff.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::{Validate, ValidationError, ValidationErrors};

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    db::staff_repo::StaffFields,
    middleware::{
        auth::AuthenticatedUser,
        i18n::Locale,
        rbac::{Admin, RequireRole},
    },
    models::{
        balances::BalanceAccount,
        staff::{
            AttendanceFilter, AttendanceRecord, AttendanceStatus, StaffFilter, StaffKind, StaffMember,
            WageBasis, WagePayment, WagePeriod, WageSummaryEntry,
        },
    },
};

// ---
// Payloads
// ---

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StaffPayload {
    #[validate(length(min = 1, max = 120, message = "Name is required."))]
    pub name: String,
    pub phone: Option<String>,
    pub kind: StaffKind,
    pub designation: Option<String>,
    pub wage_basis: WageBasis,
    #[validate(custom(function = "crate::common::validation::validate_not_negative"))]
    pub wage_rate: Decimal,
    #[schema(value_type = String, format = Date)]
    pub joined_on: NaiveDate,
}

impl StaffPayload {
    fn fields(&self) -> StaffFields<'_> {
        StaffFields {
            name: self.name.trim(),
            phone: self.phone.as_deref().map(str::trim).filter(|p| !p.is_empty()),
            kind: self.kind,
            designation: self.designation.as_deref().map(str::trim).filter(|d| !d.is_empty()),
            wage_basis: self.wage_basis,
            wage_rate: self.wage_rate,
            joined_on: self.joined_on,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct SetActivePayload {
    pub active: bool,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MarkAttendancePayload {
    pub staff_id: Uuid,
    #[schema(value_type = String, format = Date)]
    pub date: NaiveDate,
    pub status: AttendanceStatus,
    pub notes: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceMark {
    pub staff_id: Uuid,
    pub status: AttendanceStatus,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BulkAttendancePayload {
    #[schema(value_type = String, format = Date)]
    pub date: NaiveDate,
    #[validate(length(min = 1, message = "At least one mark is required."))]
    pub marks: Vec<AttendanceMark>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "validate_payment_period"))]
pub struct WagePaymentPayload {
    pub staff_id: Uuid,
    #[schema(value_type = String, format = Date)]
    pub period_start: NaiveDate,
    #[schema(value_type = String, format = Date)]
    pub period_end: NaiveDate,
    #[validate(custom(function = "crate::common::validation::validate_positive_amount"))]
    pub amount: Decimal,
    #[schema(value_type = String, format = Date)]
    pub paid_on: NaiveDate,
    pub paid_from: BalanceAccount,
    pub notes: Option<String>,
}

fn validate_payment_period(payload: &WagePaymentPayload) -> Result<(), ValidationError> {
    if payload.period_start > payload.period_end {
        let mut err = ValidationError::new("period");
        err.message = Some("Period start must not be after its end.".into());
        return Err(err);
    }
    Ok(())
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct WagePaymentFilter {
    pub staff_id: Option<Uuid>,
    #[param(value_type = Option<String>, format = Date)]
    pub from: Option<NaiveDate>,
    #[param(value_type = Option<String>, format = Date)]
    pub to: Option<NaiveDate>,
}

// ---
// Staff
// ---

#[utoipa::path(
    post,
    path = "/api/staff",
    tag = "Staff",
    request_body = StaffPayload,
    responses(
        (status = 201, description = "Staff member added", body = StaffMember),
        (status = 400, description = "Invalid payload")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_staff(
    State(app_state): State<AppState>,
    locale: Locale,
    _user: AuthenticatedUser,
    Json(payload): Json<StaffPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let member = app_state
        .staff_service
        .create_staff(&payload.fields())
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(member)))
}

#[utoipa::path(
    get,
    path = "/api/staff",
    tag = "Staff",
    params(StaffFilter),
    responses((status = 200, description = "Staff members", body = [StaffMember])),
    security(("api_jwt" = []))
)]
pub async fn list_staff(
    State(app_state): State<AppState>,
    locale: Locale,
    _user: AuthenticatedUser,
    Query(filter): Query<StaffFilter>,
) -> Result<impl IntoResponse, ApiError> {
    let staff = app_state
        .staff_service
        .list_staff(&filter)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(staff))
}

#[utoipa::path(
    get,
    path = "/api/staff/{id}",
    tag = "Staff",
    params(("id" = Uuid, Path, description = "Staff member id")),
    responses(
        (status = 200, description = "The staff member", body = StaffMember),
        (status = 404, description = "Staff member not found")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_staff(
    State(app_state): State<AppState>,
    locale: Locale,
    _user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let member = app_state
        .staff_service
        .get_staff(id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(member))
}

#[utoipa::path(
    put,
    path = "/api/staff/{id}",
    tag = "Staff",
    request_body = StaffPayload,
    params(("id" = Uuid, Path, description = "Staff member id")),
    responses(
        (status = 200, description = "Staff member updated", body = StaffMember),
        (status = 404, description = "Staff member not found")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_staff(
    State(app_state): State<AppState>,
    locale: Locale,
    _user: AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<StaffPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let member = app_state
        .staff_service
        .update_staff(id, &payload.fields())
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(member))
}

// PUT /api/staff/{id}/active
#[utoipa::path(
    put,
    path = "/api/staff/{id}/active",
    tag = "Staff",
    request_body = SetActivePayload,
    params(("id" = Uuid, Path, description = "Staff member id")),
    responses(
        (status = 200, description = "Staff member (de)activated", body = StaffMember),
        (status = 404, description = "Staff member not found")
    ),
    security(("api_jwt" = []))
)]
pub async fn set_active(
    State(app_state): State<AppState>,
    locale: Locale,
    _user: AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<SetActivePayload>,
) -> Result<impl IntoResponse, ApiError> {
    let member = app_state
        .staff_service
        .set_active(id, payload.active)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(member))
}

// ---
// Attendance
// ---

#[utoipa::path(
    post,
    path = "/api/attendance",
    tag = "Attendance",
    request_body = MarkAttendancePayload,
    responses(
        (status = 200, description = "Attendance saved (replaces the day's earlier mark)", body = AttendanceRecord),
        (status = 404, description = "Staff member not found")
    ),
    security(("api_jwt" = []))
)]
pub async fn mark_attendance(
    State(app_state): State<AppState>,
    locale: Locale,
    _user: AuthenticatedUser,
    Json(payload): Json<MarkAttendancePayload>,
) -> Result<impl IntoResponse, ApiError> {
    let notes = payload.notes.as_deref().map(str::trim).filter(|n| !n.is_empty());

    let record = app_state
        .staff_service
        .mark_attendance(payload.staff_id, payload.date, payload.status, notes)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(record))
}

#[utoipa::path(
    post,
    path = "/api/attendance/bulk",
    tag = "Attendance",
    request_body = BulkAttendancePayload,
    responses(
        (status = 200, description = "All marks saved", body = [AttendanceRecord]),
        (status = 404, description = "A staff member does not exist; nothing was saved")
    ),
    security(("api_jwt" = []))
)]
pub async fn mark_bulk(
    State(app_state): State<AppState>,
    locale: Locale,
    _user: AuthenticatedUser,
    Json(payload): Json<BulkAttendancePayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let marks: Vec<(Uuid, AttendanceStatus)> =
        payload.marks.iter().map(|m| (m.staff_id, m.status)).collect();

    let records = app_state
        .staff_service
        .mark_bulk(payload.date, &marks)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(records))
}

#[utoipa::path(
    get,
    path = "/api/attendance",
    tag = "Attendance",
    params(AttendanceFilter),
    responses((status = 200, description = "Attendance records", body = [AttendanceRecord])),
    security(("api_jwt" = []))
)]
pub async fn list_attendance(
    State(app_state): State<AppState>,
    locale: Locale,
    _user: AuthenticatedUser,
    Query(filter): Query<AttendanceFilter>,
) -> Result<impl IntoResponse, ApiError> {
    let records = app_state
        .staff_service
        .list_attendance(&filter)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(records))
}

// ---
// Wages
// ---

#[utoipa::path(
    get,
    path = "/api/wages/summary",
    tag = "Wages",
    params(WagePeriod),
    responses(
        (status = 200, description = "Earned, paid and due wages per active staff member", body = [WageSummaryEntry]),
        (status = 400, description = "Period ends before it starts")
    ),
    security(("api_jwt" = []))
)]
pub async fn wage_summary(
    State(app_state): State<AppState>,
    locale: Locale,
    _user: AuthenticatedUser,
    Query(period): Query<WagePeriod>,
) -> Result<impl IntoResponse, ApiError> {
    if period.from > period.to {
        let mut errors = ValidationErrors::new();
        let mut err = ValidationError::new("period");
        err.message = Some("'from' must not be after 'to'.".into());
        errors.add("from", err);
        return Err(AppError::ValidationError(errors).to_api_error(&locale, &app_state.i18n_store));
    }

    let summary = app_state
        .staff_service
        .wage_summary(period.from, period.to)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(summary))
}

#[utoipa::path(
    post,
    path = "/api/wages/payments",
    tag = "Wages",
    request_body = WagePaymentPayload,
    responses(
        (status = 201, description = "Payment booked against the paying account", body = WagePayment),
        (status = 400, description = "Invalid payload"),
        (status = 404, description = "Staff member not found")
    ),
    security(("api_jwt" = []))
)]
pub async fn record_wage_payment(
    State(app_state): State<AppState>,
    locale: Locale,
    _user: AuthenticatedUser,
    Json(payload): Json<WagePaymentPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let payment = app_state
        .staff_service
        .record_wage_payment(
            payload.staff_id,
            payload.period_start,
            payload.period_end,
            payload.amount,
            payload.paid_on,
            payload.paid_from,
            payload.notes.as_deref(),
        )
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(payment)))
}

#[utoipa::path(
    get,
    path = "/api/wages/payments",
    tag = "Wages",
    params(WagePaymentFilter),
    responses((status = 200, description = "Wage payments, newest first", body = [WagePayment])),
    security(("api_jwt" = []))
)]
pub async fn list_wage_payments(
    State(app_state): State<AppState>,
    locale: Locale,
    _user: AuthenticatedUser,
    Query(filter): Query<WagePaymentFilter>,
) -> Result<impl IntoResponse, ApiError> {
    let payments = app_state
        .staff_service
        .list_wage_payments(filter.staff_id, filter.from, filter.to)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(payments))
}

#[utoipa::path(
    delete,
    path = "/api/wages/payments/{id}",
    tag = "Wages",
    params(("id" = Uuid, Path, description = "Wage payment id")),
    responses(
        (status = 204, description = "Payment deleted and refunded"),
        (status = 403, description = "Admin only"),
        (status = 404, description = "Wage payment not found")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_wage_payment(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireRole<Admin>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .staff_service
        .delete_wage_payment(id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(StatusCode::NO_CONTENT)
}
