use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use super::AppJson;
use crate::auth::{hash_password, verify_password, AuthUser};
use crate::entities::user::AccountResponse;
use crate::entities::{user, Role};
use crate::error::AppError;
use crate::store::{self, accounts::NewAccount};
use crate::AppState;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RegisterRequest {
    /// Display name
    #[validate(length(min = 1, max = 255))]
    name: String,
    #[validate(email)]
    email: String,
    #[validate(length(min = 6, max = 1000))]
    password: String,
    /// `investor` (default) or `business_owner`
    #[serde(default)]
    role: Option<Role>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    email: String,
    password: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AuthResponse {
    /// Bearer token for the `Authorization` header
    pub token: String,
    pub role: Role,
    pub user: AccountResponse,
}

fn issue(state: &AppState, account: user::Model) -> Result<AuthResponse, AppError> {
    let token = state
        .jwt
        .create_token(account.id, account.role)
        .map_err(|e| AppError::InternalError(format!("failed to issue token: {}", e)))?;
    Ok(AuthResponse {
        token,
        role: account.role,
        user: account.into(),
    })
}

/// Create an investor or business owner account
#[utoipa::path(
    post,
    path = "/api/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = AuthResponse),
        (status = 400, description = "Invalid fields or role"),
        (status = 409, description = "Email already registered")
    )
)]
#[tracing::instrument(skip_all, fields(email = %req.email))]
pub async fn register(
    State(state): State<AppState>,
    AppJson(req): AppJson<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), AppError> {
    req.validate()?;

    let role = req.role.unwrap_or_default();
    if !matches!(role, Role::Investor | Role::BusinessOwner) {
        return Err(AppError::InvalidRequest(format!(
            "Cannot self-register with role {}",
            role.as_str()
        )));
    }

    let account = store::accounts::create(
        &state.db,
        NewAccount {
            name: req.name.trim().to_string(),
            email: req.email,
            password_hash: hash_password(&req.password)?,
            role,
        },
    )
    .await
    .map_err(|e| {
        if store::is_unique_violation(&e) {
            AppError::Conflict("User already exists".to_string())
        } else {
            e.into()
        }
    })?;

    tracing::info!(account = %account.id, role = role.as_str(), "account registered");
    Ok((StatusCode::CREATED, Json(issue(&state, account)?)))
}

/// Exchange email and password for a bearer token
#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Logged in", body = AuthResponse),
        (status = 401, description = "Invalid credentials")
    )
)]
#[tracing::instrument(skip_all, fields(email = %req.email))]
pub async fn login(
    State(state): State<AppState>,
    AppJson(req): AppJson<LoginRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    let account = store::accounts::find_by_email(&state.db, &req.email).await?;

    match account {
        Some(account) if verify_password(&req.password, &account.password_hash) => {
            tracing::info!(account = %account.id, "login succeeded");
            Ok(Json(issue(&state, account)?))
        }
        _ => {
            tracing::warn!("login failed");
            Err(AppError::Unauthorized("Invalid email or password".to_string()))
        }
    }
}

/// Current account
#[utoipa::path(
    get,
    path = "/api/auth/me",
    responses(
        (status = 200, description = "Authenticated account", body = AccountResponse),
        (status = 401, description = "Missing or invalid token")
    ),
    security(("bearer_auth" = []))
)]
pub async fn me(State(state): State<AppState>, user: AuthUser) -> Result<Json<AccountResponse>, AppError> {
    let account = store::accounts::find_by_id(&state.db, user.id)
        .await?
        .ok_or_else(|| AppError::NotFound("Account not found".to_string()))?;
    Ok(Json(account.into()))
}
