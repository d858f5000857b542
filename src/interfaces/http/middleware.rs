//! Identity middleware for Axum
//!
//! Verifies the bearer JWT and attaches a [`CallerIdentity`] to the request.
//! No authorization decisions are made here; handlers and downstream
//! services receive the identity and the permissions it carries.

use axum::{
    body::Body,
    extract::State,
    http::{header, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use tracing::debug;

use crate::infrastructure::crypto::jwt::{verify_token, JwtConfig, TokenClaims};
use crate::interfaces::http::common::ApiResponse;

/// Why a request could not be identified
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentityError {
    MissingToken,
    MalformedHeader,
    InvalidToken,
}

impl IntoResponse for IdentityError {
    fn into_response(self) -> Response {
        let message = match self {
            Self::MissingToken => "Missing bearer token",
            Self::MalformedHeader => "Authorization header must be 'Bearer <token>'",
            Self::InvalidToken => "Invalid or expired token",
        };
        (
            StatusCode::UNAUTHORIZED,
            Json(ApiResponse::<()>::error(message)),
        )
            .into_response()
    }
}

#[derive(Clone)]
pub struct IdentityState {
    pub jwt_config: JwtConfig,
}

/// The verified caller, available via `Extension<CallerIdentity>`
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CallerIdentity {
    pub subject: String,
    pub permissions: Vec<String>,
}

impl CallerIdentity {
    pub fn has_permission(&self, permission: &str) -> bool {
        self.permissions.iter().any(|p| p == permission)
    }
}

impl From<TokenClaims> for CallerIdentity {
    fn from(claims: TokenClaims) -> Self {
        Self {
            subject: claims.sub,
            permissions: claims.permissions,
        }
    }
}

fn extract_token(auth_header: &str) -> Option<&str> {
    auth_header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

fn identify(request: &Request<Body>, config: &JwtConfig) -> Result<CallerIdentity, IdentityError> {
    let auth_header = request
        .headers()
        .get(header::AUTHORIZATION)
        .ok_or(IdentityError::MissingToken)?
        .to_str()
        .map_err(|_| IdentityError::MalformedHeader)?;

    let token = extract_token(auth_header).ok_or(IdentityError::MalformedHeader)?;
    let claims = verify_token(token, config).map_err(|e| {
        debug!("Token rejected: {}", e);
        IdentityError::InvalidToken
    })?;
    Ok(claims.into())
}

pub async fn identity_middleware(
    State(state): State<IdentityState>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    match identify(&request, &state.jwt_config) {
        Ok(identity) => {
            debug!(subject = %identity.subject, "caller identified");
            request.extensions_mut().insert(identity);
            next.run(request).await
        }
        Err(e) => e.into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bearer_prefix_is_required() {
        assert_eq!(extract_token("Bearer abc"), Some("abc"));
        assert_eq!(extract_token("Bearer   "), None);
        assert_eq!(extract_token("Basic abc"), None);
    }

    #[test]
    fn permissions_are_checked_exactly() {
        let identity = CallerIdentity {
            subject: "ops".into(),
            permissions: vec!["ratebook:write".into()],
        };
        assert!(identity.has_permission("ratebook:write"));
        assert!(!identity.has_permission("ratebook"));
    }
}
