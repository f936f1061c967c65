//! Authentication Middleware
//!
//! Bearer credential validation for protected routes. Verification itself is
//! delegated to the configured [`Authenticator`](crate::application::services::Authenticator).

use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use axum_extra::headers::{authorization::Bearer, Authorization, HeaderMapExt};

use crate::domain::Principal;
use crate::shared::error::AppError;
use crate::startup::AppState;

/// Authenticated user extension
#[derive(Debug, Clone, Copy)]
pub struct AuthUser {
    pub principal: Principal,
}

impl AuthUser {
    pub fn user_id(&self) -> i64 {
        self.principal.user_id
    }
}

/// Token from an `Authorization: Bearer <token>` header, if present.
pub fn bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .typed_get::<Authorization<Bearer>>()
        .map(|Authorization(bearer)| bearer.token().to_owned())
}

/// Authentication middleware that validates bearer tokens
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let principal = state
        .authenticator
        .authenticate(bearer_token(request.headers()).as_deref())?;

    request.extensions_mut().insert(AuthUser { principal });

    Ok(next.run(request).await)
}
