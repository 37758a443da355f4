// src/middleware/rbac.rs

use axum::{
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use std::marker::PhantomData;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::{auth::AuthenticatedUser, i18n::Locale},
    models::auth::UserRole,
};

/// A role a route can demand.
pub trait RoleDef: Send + Sync + 'static {
    fn role() -> UserRole;
}

/// Guard extractor: add `_guard: RequireRole<Admin>` to a handler's arguments.
pub struct RequireRole<T>(pub PhantomData<T>);

impl<T, S> FromRequestParts<S> for RequireRole<T>
where
    T: RoleDef,
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);
        let locale = Locale::from_request_parts(parts, state).await.unwrap_or_default();

        let user = parts
            .extensions
            .get::<AuthenticatedUser>()
            .ok_or_else(|| AppError::InvalidToken.to_api_error(&locale, &app_state.i18n_store))?;

        let required = T::role();
        if user.0.role != required {
            tracing::warn!(user = %user.0.sub, required = required.as_str(), "Role check failed");
            return Err(AppError::Forbidden(required.as_str()).to_api_error(&locale, &app_state.i18n_store));
        }

        Ok(RequireRole(PhantomData))
    }
}

// ---
// ROLES
// ---

pub struct Admin;
impl RoleDef for Admin {
    fn role() -> UserRole { UserRole::Admin }
}
