// src/common/error.rs

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use rust_decimal::Decimal;
use serde_json::json;
use std::collections::HashMap;
use thiserror::Error;

use crate::common::i18n::I18nStore;
use crate::middleware::i18n::Locale;

// Single error type shared by repositories, services and handlers.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("Username already exists")]
    UsernameAlreadyExists,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Role {0} required")]
    Forbidden(&'static str),

    #[error("User not found")]
    UserNotFound,

    #[error("An administrator cannot remove or demote their own account")]
    SelfModification,

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("An inventory item named '{0}' already exists")]
    ItemNameAlreadyExists(String),

    #[error("Inventory item '{0}' is referenced by goods entries")]
    ItemInUse(String),

    #[error("Insufficient stock for '{item}': available {available}, requested {requested}")]
    InsufficientStock {
        item: String,
        available: Decimal,
        requested: Decimal,
    },

    #[error("Invalid state transition from {from} to {to}")]
    InvalidStateTransition { from: String, to: String },

    #[error("Tax invoices exist only for GST sales")]
    InvoiceNotAvailable,

    #[error("AI service is not configured")]
    AiUnavailable,

    #[error("AI upstream error: {0}")]
    AiUpstream(String),

    #[error("AI returned an invalid response: {0}")]
    AiInvalidResponse(String),

    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("CSV header has no '{0}' column")]
    CsvMissingColumn(&'static str),

    #[error("Unknown dataset: {0}")]
    UnknownDataset(String),

    #[error("Font not found: {0}")]
    FontNotFound(String),

    #[error("Database error")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Internal server error")]
    InternalServerError(#[from] anyhow::Error),

    #[error("Bcrypt error: {0}")]
    BcryptError(#[from] bcrypt::BcryptError),

    #[error("JWT error: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),
}

impl From<reqwest::Error> for AppError {
    fn from(e: reqwest::Error) -> Self {
        AppError::AiUpstream(e.to_string())
    }
}

/// Error already rendered for a locale: what actually goes over the wire.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub error: String,
    pub details: Option<serde_json::Value>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = match self.details {
            Some(details) => json!({ "error": self.error, "details": details }),
            None => json!({ "error": self.error }),
        };
        (self.status, Json(body)).into_response()
    }
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_)
            | AppError::CsvError(_)
            | AppError::CsvMissingColumn(_)
            | AppError::UnknownDataset(_)
            | AppError::SelfModification => StatusCode::BAD_REQUEST,
            AppError::InvalidCredentials | AppError::InvalidToken => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::UserNotFound | AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::UsernameAlreadyExists
            | AppError::ItemNameAlreadyExists(_)
            | AppError::ItemInUse(_)
            | AppError::InsufficientStock { .. }
            | AppError::InvalidStateTransition { .. }
            | AppError::InvoiceNotAvailable => StatusCode::CONFLICT,
            AppError::AiUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            AppError::AiUpstream(_) | AppError::AiInvalidResponse(_) => StatusCode::BAD_GATEWAY,
            AppError::FontNotFound(_)
            | AppError::DatabaseError(_)
            | AppError::InternalServerError(_)
            | AppError::BcryptError(_)
            | AppError::JwtError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Renders the error with messages from the caller's language.
    pub fn to_api_error(self, locale: &Locale, store: &I18nStore) -> ApiError {
        let status = self.status();
        let lang = locale.0.as_str();

        if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!("Internal server error: {:?}", self);
        } else if status == StatusCode::BAD_GATEWAY {
            tracing::warn!("AI upstream failure: {}", self);
        }

        let t = |key: &str, args: &[(&str, &str)]| store.translate(lang, key, args);

        let error = match &self {
            AppError::ValidationError(errors) => {
                let mut details: HashMap<String, Vec<String>> = HashMap::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages: Vec<String> = field_errors
                        .iter()
                        .map(|e| match &e.message {
                            Some(m) => m.to_string(),
                            None => e.code.to_string(),
                        })
                        .collect();
                    details.insert(field.to_string(), messages);
                }
                return ApiError {
                    status,
                    error: t("error.validation", &[]),
                    details: Some(json!(details)),
                };
            }
            AppError::UsernameAlreadyExists => t("error.username_exists", &[]),
            AppError::InvalidCredentials => t("error.invalid_credentials", &[]),
            AppError::InvalidToken => t("error.invalid_token", &[]),
            AppError::Forbidden(role) => t("error.forbidden", &[("role", role)]),
            AppError::UserNotFound => t("error.user_not_found", &[]),
            AppError::SelfModification => t("error.self_modification", &[]),
            AppError::NotFound(entity) => {
                let entity = t(&format!("entity.{}", entity), &[]);
                t("error.not_found", &[("entity", &entity)])
            }
            AppError::ItemNameAlreadyExists(name) => t("error.item_name_exists", &[("name", name)]),
            AppError::ItemInUse(name) => t("error.item_in_use", &[("name", name)]),
            AppError::InsufficientStock { item, available, requested } => t(
                "error.insufficient_stock",
                &[
                    ("item", item),
                    ("available", &available.normalize().to_string()),
                    ("requested", &requested.normalize().to_string()),
                ],
            ),
            AppError::InvalidStateTransition { from, to } => {
                t("error.invalid_transition", &[("from", from), ("to", to)])
            }
            AppError::InvoiceNotAvailable => t("error.invoice_unavailable", &[]),
            AppError::AiUnavailable => t("error.ai_unavailable", &[]),
            AppError::AiUpstream(_) => t("error.ai_upstream", &[]),
            AppError::AiInvalidResponse(_) => t("error.ai_invalid_response", &[]),
            AppError::CsvError(e) => t("error.csv", &[("message", &e.to_string())]),
            AppError::CsvMissingColumn(column) => t("error.csv_missing_column", &[("column", *column)]),
            AppError::UnknownDataset(name) => t("error.unknown_dataset", &[("dataset", name)]),
            _ => t("error.internal", &[]),
        };

        ApiError { status, error, details: None }
    }
}

// Handlers that don't extract a Locale (auth middleware, extractors) answer in English.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        self.to_api_error(&Locale::default(), I18nStore::global())
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(err: AppError, lang: &str) -> ApiError {
        err.to_api_error(&Locale(lang.to_string()), I18nStore::global())
    }

    #[test]
    fn insufficient_stock_is_a_conflict_with_interpolated_message() {
        let api = render(
            AppError::InsufficientStock {
                item: "Copper".into(),
                available: Decimal::new(12500, 3),
                requested: Decimal::new(20, 0),
            },
            "en",
        );
        assert_eq!(api.status, StatusCode::CONFLICT);
        assert!(api.error.contains("Copper"));
        assert!(api.error.contains("12.5"));
        assert!(api.error.contains("20"));
    }

    #[test]
    fn not_found_names_the_entity() {
        let api = render(AppError::NotFound("ledger_entry"), "en");
        assert_eq!(api.status, StatusCode::NOT_FOUND);
        assert_eq!(api.error, "Ledger entry not found.");
    }

    #[test]
    fn unknown_language_falls_back_to_english() {
        let api = render(AppError::InvalidCredentials, "fr");
        assert_eq!(api.status, StatusCode::UNAUTHORIZED);
        assert_eq!(api.error, "Invalid username or password.");
    }

    #[test]
    fn hindi_catalog_is_used_when_requested() {
        let en = render(AppError::InvalidToken, "en");
        let hi = render(AppError::InvalidToken, "hi");
        assert_ne!(en.error, hi.error);
    }

    #[test]
    fn validation_errors_carry_field_details() {
        let mut errors = validator::ValidationErrors::new();
        let mut err = validator::ValidationError::new("range");
        err.message = Some("Quantity must be positive.".into());
        errors.add("quantity", err);

        let api = render(AppError::ValidationError(errors), "en");
        assert_eq!(api.status, StatusCode::BAD_REQUEST);
        let details = api.details.expect("details");
        assert_eq!(details["quantity"][0], "Quantity must be positive.");
    }

    #[test]
    fn database_errors_hide_internals() {
        let api = render(AppError::DatabaseError(sqlx::Error::RowNotFound), "en");
        assert_eq!(api.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(api.error, "An unexpected error occurred.");
    }
}
