// src/middleware/auth.rs

use axum::{
    extract::{FromRef, FromRequestParts, OptionalFromRequestParts, Request, State},
    http::{request::Parts, HeaderMap},
    middleware::Next,
    response::Response,
};
use axum_extra::headers::{authorization::Bearer, Authorization, HeaderMapExt};

use crate::{common::error::AppError, config::AppState, models::auth::Claims};

fn bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .typed_get::<Authorization<Bearer>>()
        .map(|Authorization(bearer)| bearer.token().to_string())
}

/// Rejects the request unless it carries a valid bearer token.
/// The decoded claims are stored in the request extensions.
pub async fn auth_guard(
    State(app_state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = bearer_token(request.headers()).ok_or(AppError::InvalidToken)?;
    let claims = app_state.auth_service.validate_token(&token)?;

    tracing::debug!(user = %claims.sub, role = claims.role.as_str(), "Request authenticated");
    request.extensions_mut().insert(AuthenticatedUser(claims));
    Ok(next.run(request).await)
}

// Extractor for the authenticated user inside handlers
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub Claims);

impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedUser>()
            .cloned()
            .ok_or(AppError::InvalidToken)
    }
}

/// Used on public routes: no header means anonymous, a bad header is still an error.
impl<S> OptionalFromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Option<Self>, Self::Rejection> {
        if let Some(user) = parts.extensions.get::<AuthenticatedUser>() {
            return Ok(Some(user.clone()));
        }

        match bearer_token(&parts.headers) {
            Some(token) => {
                let app_state = AppState::from_ref(state);
                let claims = app_state.auth_service.validate_token(&token)?;
                Ok(Some(AuthenticatedUser(claims)))
            }
            None => Ok(None),
        }
    }
}
