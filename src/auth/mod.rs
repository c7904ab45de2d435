//! Bearer authentication and the role gate.
//!
//! Handlers take an [`AuthUser`] argument to require a valid token; the
//! extractor re-loads the account so a deleted account stops working
//! immediately. Role checks all go through [`authorize`].

pub mod jwt;
pub mod password;

pub use jwt::{Claims, JwtService};
pub use password::{hash_password, verify_password};

use axum::{extract::FromRequestParts, http::header::AUTHORIZATION, http::request::Parts};
use uuid::Uuid;

use crate::entities::{user, Role};
use crate::error::AppError;
use crate::store;
use crate::AppState;

pub const REVIEWERS: &[Role] = &[Role::Admin, Role::Superadmin];
pub const SUPERADMIN: &[Role] = &[Role::Superadmin];
pub const BUSINESS_OWNER: &[Role] = &[Role::BusinessOwner];
pub const INVESTOR: &[Role] = &[Role::Investor];

/// The account behind a verified bearer token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: Role,
}

impl From<user::Model> for AuthUser {
    fn from(account: user::Model) -> Self {
        Self {
            id: account.id,
            name: account.name,
            email: account.email,
            role: account.role,
        }
    }
}

/// True when the account's role is one of `required`.
pub fn authorize(account: &AuthUser, required: &[Role]) -> bool {
    required.contains(&account.role)
}

impl AuthUser {
    /// [`authorize`] as a guard for handlers.
    pub fn require(&self, required: &[Role]) -> Result<(), AppError> {
        if authorize(self, required) {
            Ok(())
        } else {
            tracing::warn!(account = %self.id, role = self.role.as_str(), "role not permitted");
            Err(AppError::Forbidden(format!(
                "Role {} is not authorized to access this resource",
                self.role.as_str()
            )))
        }
    }
}

/// Accepts both `Bearer <token>` and a raw token.
fn bearer_token(parts: &Parts) -> Option<&str> {
    let value = parts.headers.get(AUTHORIZATION)?.to_str().ok()?;
    let token = value.strip_prefix("Bearer ").unwrap_or(value).trim();
    (!token.is_empty()).then_some(token)
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)
            .ok_or_else(|| AppError::Unauthorized("Not authorized, no token".to_string()))?;

        let claims = state.jwt.verify_token(token).map_err(|e| {
            tracing::debug!("token rejected: {}", e);
            AppError::Unauthorized("Not authorized, token failed".to_string())
        })?;

        let account = store::accounts::find_by_id(&state.db, claims.account_id)
            .await?
            .ok_or_else(|| AppError::Unauthorized("Account no longer exists".to_string()))?;

        Ok(AuthUser::from(account))
    }
}
