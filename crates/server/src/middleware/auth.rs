//! Authentication extractors.
//!
//! Route handlers declare the access level they need by taking one of
//! these extractors. Each verifies the `Authorization: Bearer` token and
//! re-reads the user row, so role changes and deletions take effect on
//! the next request rather than at token expiry.

use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts},
};

use crate::error::AppError;
use crate::models::User;
use crate::services::auth::AuthService;
use crate::state::AppState;

/// Extractor requiring any authenticated user.
///
/// # Example
///
/// ```rust,ignore
/// async fn my_orders(
///     CurrentUser(user): CurrentUser,
/// ) -> impl IntoResponse {
///     format!("orders for {}", user.email)
/// }
/// ```
pub struct CurrentUser(pub User);

/// Extractor requiring the seller or admin role.
pub struct SellerOrAdmin(pub User);

/// Extractor requiring the admin role.
pub struct AdminOnly(pub User);

/// Pull the bearer token out of the Authorization header.
fn bearer_token(parts: &Parts) -> Result<&str, AppError> {
    parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .ok_or_else(|| AppError::Unauthenticated("Not authorized, no token".to_string()))
}

async fn authenticate<S>(parts: &Parts, state: &S) -> Result<User, AppError>
where
    AppState: FromRef<S>,
{
    let state = AppState::from_ref(state);
    let token = bearer_token(parts)?;

    let auth = AuthService::new(
        state.pool(),
        &state.config().jwt_secret,
        state.config().token_ttl_secs,
    );
    Ok(auth.authenticate(token).await?)
}

impl<S> FromRequestParts<S> for CurrentUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let user = authenticate(parts, state).await?;
        Ok(Self(user))
    }
}

impl<S> FromRequestParts<S> for SellerOrAdmin
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let user = authenticate(parts, state).await?;
        if !user.role.is_seller_or_admin() {
            return Err(AppError::Unauthorized(
                "Not authorized as a seller or admin".to_string(),
            ));
        }
        Ok(Self(user))
    }
}

impl<S> FromRequestParts<S> for AdminOnly
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let user = authenticate(parts, state).await?;
        if !user.role.is_admin() {
            return Err(AppError::Unauthorized(
                "Not authorized as an admin".to_string(),
            ));
        }
        Ok(Self(user))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    fn parts_with_auth(value: Option<&str>) -> Parts {
        let mut builder = Request::builder().uri("/orders");
        if let Some(v) = value {
            builder = builder.header(AUTHORIZATION, v);
        }
        let (parts, ()) = builder.body(()).expect("request builds").into_parts();
        parts
    }

    #[test]
    fn test_bearer_token_extracted() {
        let parts = parts_with_auth(Some("Bearer abc.def.ghi"));
        assert_eq!(bearer_token(&parts).ok(), Some("abc.def.ghi"));
    }

    #[test]
    fn test_missing_header_rejected() {
        let parts = parts_with_auth(None);
        assert!(matches!(
            bearer_token(&parts),
            Err(AppError::Unauthenticated(_))
        ));
    }

    #[test]
    fn test_non_bearer_scheme_rejected() {
        let parts = parts_with_auth(Some("Basic dXNlcjpwYXNz"));
        assert!(matches!(
            bearer_token(&parts),
            Err(AppError::Unauthenticated(_))
        ));
    }
}
