//! Authentication route handlers.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::post,
};
use serde::{Deserialize, Serialize};

use farmlink_core::Role;

use crate::error::{AppError, Result};
use crate::models::{Address, User};
use crate::services::auth::{AuthService, Registration};
use crate::state::AppState;

/// Registration request body.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    /// Defaults to `customer`. `admin` cannot be self-assigned.
    #[serde(default)]
    pub role: Role,
    pub phone: Option<String>,
    pub address: Option<Address>,
}

/// Login request body.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Token-bearing response for register and login.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: User,
}

/// Assemble the `/auth` routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
}

/// `POST /auth/register` - create identity, returns token.
async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<impl IntoResponse> {
    if req.role == Role::Admin {
        return Err(AppError::Validation(
            "admin accounts cannot be self-registered".to_string(),
        ));
    }
    if req.name.trim().is_empty() {
        return Err(AppError::Validation("name is required".to_string()));
    }

    let auth = auth_service(&state);
    let (user, token) = auth
        .register(Registration {
            name: req.name.trim(),
            email: &req.email,
            password: &req.password,
            role: req.role,
            phone: req.phone.as_deref(),
            address: req.address.as_ref(),
        })
        .await?;

    tracing::info!(user_id = %user.id, role = %user.role, "user registered");
    Ok((StatusCode::CREATED, Json(AuthResponse { token, user })))
}

/// `POST /auth/login` - verify credentials, returns token.
async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<AuthResponse>> {
    let auth = auth_service(&state);
    let (user, token) = auth.login(&req.email, &req.password).await?;

    Ok(Json(AuthResponse { token, user }))
}

fn auth_service(state: &AppState) -> AuthService<'_> {
    AuthService::new(
        state.pool(),
        &state.config().jwt_secret,
        state.config().token_ttl_secs,
    )
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_register_request_defaults_to_customer() {
        let req: RegisterRequest = serde_json::from_str(
            r#"{"name": "Asha", "email": "asha@example.com", "password": "hunter22word"}"#,
        )
        .unwrap();
        assert_eq!(req.role, Role::Customer);
        assert!(req.address.is_none());
    }

    #[test]
    fn test_register_request_accepts_seller_role() {
        let req: RegisterRequest = serde_json::from_str(
            r#"{"name": "Bikram", "email": "b@example.com", "password": "longenough", "role": "seller"}"#,
        )
        .unwrap();
        assert_eq!(req.role, Role::Seller);
    }
}
