use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use super::{AppJson, AppPath, MessageResponse};
use crate::auth::{hash_password, AuthUser, REVIEWERS, SUPERADMIN};
use crate::entities::user::AccountResponse;
use crate::entities::{PostStatus, Role};
use crate::error::AppError;
use crate::store::{self, accounts::NewAccount};
use crate::AppState;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateAdminRequest {
    #[validate(length(min = 1, max = 255))]
    name: String,
    #[validate(email)]
    email: String,
    #[validate(length(min = 6, max = 1000))]
    password: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StatsResponse {
    pub pending_posts: u64,
    pub approved_posts: u64,
    pub rejected_posts: u64,
    /// Businesses visible to investors (approved posts)
    pub total_businesses: u64,
}

/// Create an admin account
#[utoipa::path(
    post,
    path = "/api/admin/create",
    request_body = CreateAdminRequest,
    responses(
        (status = 201, description = "Admin created", body = AccountResponse),
        (status = 403, description = "Caller is not the superadmin"),
        (status = 409, description = "Email already registered")
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(skip_all, fields(superadmin = %user.id, email = %req.email))]
pub async fn create_admin(
    State(state): State<AppState>,
    user: AuthUser,
    AppJson(req): AppJson<CreateAdminRequest>,
) -> Result<(StatusCode, Json<AccountResponse>), AppError> {
    user.require(SUPERADMIN)?;
    req.validate()?;

    let admin = store::accounts::create(
        &state.db,
        NewAccount {
            name: req.name.trim().to_string(),
            email: req.email,
            password_hash: hash_password(&req.password)?,
            role: Role::Admin,
        },
    )
    .await
    .map_err(|e| {
        if store::is_unique_violation(&e) {
            AppError::Conflict("Admin already exists".to_string())
        } else {
            e.into()
        }
    })?;

    tracing::info!(admin = %admin.id, "admin created");
    Ok((StatusCode::CREATED, Json(admin.into())))
}

/// List admin accounts
#[utoipa::path(
    get,
    path = "/api/admin/list",
    responses(
        (status = 200, description = "Admins, newest first", body = Vec<AccountResponse>),
        (status = 403, description = "Caller is not the superadmin")
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_admins(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<Vec<AccountResponse>>, AppError> {
    user.require(SUPERADMIN)?;
    let admins = store::accounts::list_by_role(&state.db, Role::Admin).await?;
    Ok(Json(admins.into_iter().map(AccountResponse::from).collect()))
}

/// Delete an admin account
#[utoipa::path(
    delete,
    path = "/api/admin/{id}",
    params(("id" = Uuid, Path, description = "Admin account id")),
    responses(
        (status = 200, description = "Admin deleted", body = MessageResponse),
        (status = 403, description = "Caller is not the superadmin"),
        (status = 404, description = "No admin with that id")
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(skip_all, fields(superadmin = %user.id, admin = %id))]
pub async fn delete_admin(
    State(state): State<AppState>,
    user: AuthUser,
    AppPath(id): AppPath<Uuid>,
) -> Result<Json<MessageResponse>, AppError> {
    user.require(SUPERADMIN)?;

    if !store::accounts::delete_with_role(&state.db, id, Role::Admin).await? {
        return Err(AppError::NotFound("Admin not found".to_string()));
    }

    tracing::info!("admin deleted");
    Ok(Json(MessageResponse::new("Admin deleted")))
}

/// Post counts for the admin dashboard
#[utoipa::path(
    get,
    path = "/api/admin/stats",
    responses(
        (status = 200, description = "Counts by review status", body = StatsResponse),
        (status = 403, description = "Caller is not an admin")
    ),
    security(("bearer_auth" = []))
)]
pub async fn stats(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<StatsResponse>, AppError> {
    user.require(REVIEWERS)?;

    let pending_posts = store::posts::count_by_status(&state.db, PostStatus::Pending).await?;
    let approved_posts = store::posts::count_by_status(&state.db, PostStatus::Approved).await?;
    let rejected_posts = store::posts::count_by_status(&state.db, PostStatus::Rejected).await?;

    Ok(Json(StatsResponse {
        pending_posts,
        approved_posts,
        rejected_posts,
        total_businesses: approved_posts,
    }))
}
