/// Bearer-token authentication building blocks
///
/// The API crate's router wires these into its middleware stack: a
/// state-aware layer there calls [`extract_bearer_token`] and the JWT
/// validator, then attaches an [`AuthContext`] to the request extensions;
/// [`require_admin_middleware`] runs after it on admin-only routes.
///
/// Status codes are deliberate and distinct: missing credentials are 401,
/// a malformed `Authorization` scheme is 400, and a present-but-invalid
/// token or insufficient privilege is 403.

use axum::{
    extract::Request,
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use uuid::Uuid;

/// Authenticated identity attached to request extensions by the
/// authentication layer
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub user_id: Uuid,
    pub email: String,
    pub is_admin: bool,
}

/// Error type for authentication middleware
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// No Authorization header was provided
    #[error("Missing authorization credentials")]
    MissingCredentials,

    /// Authorization header is present but not a bearer token
    #[error("Malformed authorization header")]
    InvalidFormat,

    /// Token failed validation (bad signature, expired, wrong type)
    #[error("Invalid or expired token")]
    InvalidToken,

    /// Authenticated but not an admin
    #[error("Admin privileges required")]
    NotAdmin,
}

impl AuthError {
    fn status(&self) -> StatusCode {
        match self {
            AuthError::MissingCredentials => StatusCode::UNAUTHORIZED,
            AuthError::InvalidFormat => StatusCode::BAD_REQUEST,
            AuthError::InvalidToken => StatusCode::FORBIDDEN,
            AuthError::NotAdmin => StatusCode::FORBIDDEN,
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = Json(json!({
            "error": {
                "code": status.as_u16(),
                "message": self.to_string(),
            }
        }));

        (status, body).into_response()
    }
}

/// Extracts the bearer token from an `Authorization` header value
///
/// `None` header means missing credentials; a header without the `Bearer `
/// prefix is a format error rather than an authentication failure.
pub fn extract_bearer_token(header_value: Option<&str>) -> Result<&str, AuthError> {
    let value = header_value.ok_or(AuthError::MissingCredentials)?;

    let token = value
        .strip_prefix("Bearer ")
        .ok_or(AuthError::InvalidFormat)?
        .trim();

    if token.is_empty() {
        return Err(AuthError::InvalidFormat);
    }

    Ok(token)
}

/// Rejects non-admin callers; must run after the authentication layer
pub async fn require_admin_middleware(req: Request, next: Next) -> Result<Response, AuthError> {
    let context = req
        .extensions()
        .get::<AuthContext>()
        .ok_or(AuthError::MissingCredentials)?;

    if !context.is_admin {
        tracing::debug!(user_id = %context.user_id, "Denied non-admin access");
        return Err(AuthError::NotAdmin);
    }

    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_bearer_token_valid() {
        let token = extract_bearer_token(Some("Bearer abc.def.ghi")).expect("Should extract");
        assert_eq!(token, "abc.def.ghi");
    }

    #[test]
    fn test_extract_bearer_token_missing() {
        assert!(matches!(
            extract_bearer_token(None),
            Err(AuthError::MissingCredentials)
        ));
    }

    #[test]
    fn test_extract_bearer_token_wrong_scheme() {
        assert!(matches!(
            extract_bearer_token(Some("Basic dXNlcjpwYXNz")),
            Err(AuthError::InvalidFormat)
        ));
    }

    #[test]
    fn test_extract_bearer_token_empty_token() {
        assert!(matches!(
            extract_bearer_token(Some("Bearer ")),
            Err(AuthError::InvalidFormat)
        ));
    }

    #[test]
    fn test_error_status_codes() {
        assert_eq!(
            AuthError::MissingCredentials.status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(AuthError::InvalidFormat.status(), StatusCode::BAD_REQUEST);
        assert_eq!(AuthError::InvalidToken.status(), StatusCode::FORBIDDEN);
        assert_eq!(AuthError::NotAdmin.status(), StatusCode::FORBIDDEN);
    }
}
