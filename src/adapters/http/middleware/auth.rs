//! Authentication middleware and extractors for axum.
//!
//! - `auth_middleware` validates Bearer tokens and injects claims into
//!   request extensions
//! - `RequireAuth` extracts the claims, rejecting unauthenticated requests
//! - `RequireAdmin` additionally rejects callers without the admin role
//!
//! The middleware uses the `TokenVerifier` port, so routes are tested with
//! a static verifier instead of minting real JWTs.

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};

use crate::adapters::http::api_error::ErrorResponse;
use crate::ports::{AuthClaims, TokenVerifier};

/// Auth middleware state; wraps the token verifier.
pub type AuthState = Arc<dyn TokenVerifier>;

/// Authentication middleware that validates Bearer tokens.
///
/// 1. Extracts the token from the `Authorization: Bearer <token>` header
/// 2. Verifies it via the `TokenVerifier` port
/// 3. On success, injects `AuthClaims` into request extensions
/// 4. On missing token, continues without claims (webhook and job routes
///    authenticate differently)
/// 5. On invalid token, returns 401
pub async fn auth_middleware(
    State(verifier): State<AuthState>,
    mut request: Request,
    next: Next,
) -> Response {
    let token = request
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "));

    match token {
        Some(token) => match verifier.verify(token).await {
            Ok(claims) => {
                request.extensions_mut().insert(claims);
                next.run(request).await
            }
            Err(err) => {
                tracing::debug!(error = %err, "Bearer token rejected");
                (
                    StatusCode::UNAUTHORIZED,
                    Json(ErrorResponse::new("UNAUTHORIZED", "Invalid or expired token")),
                )
                    .into_response()
            }
        },
        None => next.run(request).await,
    }
}

/// Extractor that requires an authenticated caller.
#[derive(Debug, Clone)]
pub struct RequireAuth(pub AuthClaims);

impl<S> axum::extract::FromRequestParts<S> for RequireAuth
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    fn from_request_parts<'life0, 'life1, 'async_trait>(
        parts: &'life0 mut axum::http::request::Parts,
        _state: &'life1 S,
    ) -> std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self, Self::Rejection>> + Send + 'async_trait>,
    >
    where
        'life0: 'async_trait,
        'life1: 'async_trait,
        Self: 'async_trait,
    {
        Box::pin(async move {
            parts
                .extensions
                .get::<AuthClaims>()
                .cloned()
                .map(RequireAuth)
                .ok_or(AuthRejection::Unauthenticated)
        })
    }
}

/// Extractor that requires an authenticated admin.
#[derive(Debug, Clone)]
pub struct RequireAdmin(pub AuthClaims);

impl<S> axum::extract::FromRequestParts<S> for RequireAdmin
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    fn from_request_parts<'life0, 'life1, 'async_trait>(
        parts: &'life0 mut axum::http::request::Parts,
        _state: &'life1 S,
    ) -> std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self, Self::Rejection>> + Send + 'async_trait>,
    >
    where
        'life0: 'async_trait,
        'life1: 'async_trait,
        Self: 'async_trait,
    {
        Box::pin(async move {
            let claims = parts
                .extensions
                .get::<AuthClaims>()
                .cloned()
                .ok_or(AuthRejection::Unauthenticated)?;

            if !claims.is_admin() {
                return Err(AuthRejection::Forbidden);
            }

            Ok(RequireAdmin(claims))
        })
    }
}

/// Rejection type for authentication failures.
#[derive(Debug, Clone)]
pub enum AuthRejection {
    /// No valid authentication token was provided.
    Unauthenticated,

    /// Authenticated, but lacking the required role.
    Forbidden,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            AuthRejection::Unauthenticated => (
                StatusCode::UNAUTHORIZED,
                "UNAUTHENTICATED",
                "Authentication required",
            ),
            AuthRejection::Forbidden => {
                (StatusCode::FORBIDDEN, "FORBIDDEN", "Admin role required")
            }
        };

        (status, Json(ErrorResponse::new(code, message))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::StaticTokenVerifier;
    use crate::domain::foundation::UserId;
    use crate::ports::UserRole;
    use axum::extract::FromRequestParts;
    use axum::http::Request;

    fn member_claims() -> AuthClaims {
        AuthClaims {
            user_id: UserId::new(),
            role: UserRole::Member,
        }
    }

    fn admin_claims() -> AuthClaims {
        AuthClaims {
            user_id: UserId::new(),
            role: UserRole::Admin,
        }
    }

    #[tokio::test]
    async fn verifier_returns_claims_for_known_token() {
        let claims = member_claims();
        let static_verifier = StaticTokenVerifier::new();
        static_verifier.grant("valid-token", claims.clone());
        let verifier: Arc<dyn TokenVerifier> = Arc::new(static_verifier);

        let result = verifier.verify("valid-token").await;
        assert_eq!(result.unwrap(), claims);
    }

    #[tokio::test]
    async fn verifier_rejects_unknown_token() {
        let verifier: Arc<dyn TokenVerifier> = Arc::new(StaticTokenVerifier::new());
        assert!(verifier.verify("bogus").await.is_err());
    }

    #[tokio::test]
    async fn require_auth_extracts_claims_from_extensions() {
        let mut request: Request<()> = Request::builder().uri("/test").body(()).unwrap();
        request.extensions_mut().insert(member_claims());
        let (mut parts, _body) = request.into_parts();

        let result = RequireAuth::from_request_parts(&mut parts, &()).await;

        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn require_auth_fails_without_claims() {
        let request: Request<()> = Request::builder().uri("/test").body(()).unwrap();
        let (mut parts, _body) = request.into_parts();

        let result = RequireAuth::from_request_parts(&mut parts, &()).await;

        assert!(matches!(result, Err(AuthRejection::Unauthenticated)));
    }

    #[tokio::test]
    async fn require_admin_rejects_member_role() {
        let mut request: Request<()> = Request::builder().uri("/test").body(()).unwrap();
        request.extensions_mut().insert(member_claims());
        let (mut parts, _body) = request.into_parts();

        let result = RequireAdmin::from_request_parts(&mut parts, &()).await;

        assert!(matches!(result, Err(AuthRejection::Forbidden)));
    }

    #[tokio::test]
    async fn require_admin_accepts_admin_role() {
        let mut request: Request<()> = Request::builder().uri("/test").body(()).unwrap();
        request.extensions_mut().insert(admin_claims());
        let (mut parts, _body) = request.into_parts();

        let result = RequireAdmin::from_request_parts(&mut parts, &()).await;

        assert!(result.is_ok());
    }

    #[test]
    fn unauthenticated_rejection_returns_401() {
        let response = AuthRejection::Unauthenticated.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn forbidden_rejection_returns_403() {
        let response = AuthRejection::Forbidden.into_response();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn bearer_token_extraction() {
        let token = "Bearer my-secret-token".strip_prefix("Bearer ");
        assert_eq!(token, Some("my-secret-token"));

        assert_eq!("my-secret-token".strip_prefix("Bearer "), None);
        assert_eq!("Basic dXNlcjpwYXNz".strip_prefix("Bearer "), None);
    }
}
