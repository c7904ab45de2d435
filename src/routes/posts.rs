use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use super::{load_post, lost_race, AppJson, AppPath, AppQuery, MessageResponse};
use crate::auth::{AuthUser, BUSINESS_OWNER, REVIEWERS, SUPERADMIN};
use crate::entities::post::PostResponse;
use crate::entities::{interest, InterestStatus};
use crate::error::AppError;
use crate::store;
use crate::workflow::{self, PostContent, ReviewDecision};
use crate::AppState;

const DEFAULT_PAGE: u64 = 1;
const DEFAULT_LIMIT: u64 = 10;
const MAX_LIMIT: u64 = 100;

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListQuery {
    /// 1-based page number (default 1)
    #[param(required = false)]
    page: Option<String>,
    /// Posts per page (default 10, at most 100)
    #[param(required = false)]
    limit: Option<String>,
}

impl ListQuery {
    /// Missing, non-numeric or non-positive values fall back to the defaults.
    fn resolve(&self) -> (u64, u64) {
        let parse = |value: &Option<String>, default: u64| {
            value
                .as_deref()
                .and_then(|v| v.trim().parse::<u64>().ok())
                .filter(|v| *v > 0)
                .unwrap_or(default)
        };
        (
            parse(&self.page, DEFAULT_PAGE),
            parse(&self.limit, DEFAULT_LIMIT).min(MAX_LIMIT),
        )
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ListPostsResponse {
    pub posts: Vec<PostResponse>,
    pub total_pages: u64,
    pub current_page: u64,
}

/// Listing content. Any `status` in the body is ignored.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PostInput {
    title: Option<String>,
    business_name: Option<String>,
    description: Option<String>,
    industry: Option<String>,
    location: Option<String>,
    /// Non-negative amount (default 0)
    investment_needed: Option<i64>,
}

impl TryFrom<PostInput> for PostContent {
    type Error = AppError;

    fn try_from(input: PostInput) -> Result<Self, Self::Error> {
        PostContent::new(
            input.title,
            input.business_name,
            input.description,
            input.industry,
            input.location,
            input.investment_needed,
        )
        .map_err(Into::into)
    }
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReviewRequest {
    /// `approved` or `rejected`
    status: String,
    /// Required when rejecting
    rejection_reason: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct InterestStatusRequest {
    status: InterestStatus,
}

/// List approved posts, newest first
#[utoipa::path(
    get,
    path = "/api/posts",
    params(ListQuery),
    responses(
        (status = 200, description = "One page of approved posts", body = ListPostsResponse)
    )
)]
#[tracing::instrument(skip_all)]
pub async fn list_posts(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<ListQuery>,
) -> Result<Json<ListPostsResponse>, AppError> {
    let (page, limit) = query.resolve();
    let result = store::posts::list_approved(&state.db, page, limit).await?;

    Ok(Json(ListPostsResponse {
        posts: store::posts::to_responses(&state.db, result.posts).await?,
        total_pages: result.total_pages,
        current_page: page,
    }))
}

/// Get a post by id
#[utoipa::path(
    get,
    path = "/api/posts/{id}",
    params(("id" = Uuid, Path, description = "Post id")),
    responses(
        (status = 200, description = "The post", body = PostResponse),
        (status = 404, description = "Post not found")
    )
)]
pub async fn get_post(
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
) -> Result<Json<PostResponse>, AppError> {
    let post = load_post(&state.db, id).await?;
    Ok(Json(store::posts::to_response(&state.db, post).await?))
}

/// Submit a new listing for review
#[utoipa::path(
    post,
    path = "/api/posts/create",
    request_body = PostInput,
    responses(
        (status = 201, description = "Post created with status pending", body = PostResponse),
        (status = 400, description = "Missing title or invalid amount"),
        (status = 403, description = "Caller is not a business owner")
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(skip_all, fields(account = %user.id))]
pub async fn create_post(
    State(state): State<AppState>,
    user: AuthUser,
    AppJson(input): AppJson<PostInput>,
) -> Result<(StatusCode, Json<PostResponse>), AppError> {
    user.require(BUSINESS_OWNER)?;

    let content = PostContent::try_from(input)?;
    let post = store::posts::insert(&state.db, workflow::submit(user.id, content, Utc::now())).await?;

    tracing::info!(post = %post.id, "post submitted");
    Ok((StatusCode::CREATED, Json(store::posts::to_response(&state.db, post).await?)))
}

/// The caller's own posts, in any status
#[utoipa::path(
    get,
    path = "/api/posts/user/posts",
    responses((status = 200, description = "Own posts, newest first", body = Vec<PostResponse>)),
    security(("bearer_auth" = []))
)]
pub async fn own_posts(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<Vec<PostResponse>>, AppError> {
    let posts = store::posts::list_by_owner(&state.db, user.id).await?;
    Ok(Json(store::posts::to_responses(&state.db, posts).await?))
}

/// Edit a post that has not been approved; it goes back to pending
#[utoipa::path(
    put,
    path = "/api/posts/{id}",
    params(("id" = Uuid, Path, description = "Post id")),
    request_body = PostInput,
    responses(
        (status = 200, description = "Post updated and pending review again", body = PostResponse),
        (status = 403, description = "Not the owner, or the post is approved"),
        (status = 404, description = "Post not found")
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(skip_all, fields(account = %user.id, post = %id))]
pub async fn update_post(
    State(state): State<AppState>,
    user: AuthUser,
    AppPath(id): AppPath<Uuid>,
    AppJson(input): AppJson<PostInput>,
) -> Result<Json<PostResponse>, AppError> {
    user.require(BUSINESS_OWNER)?;

    let post = load_post(&state.db, id).await?;
    let change = workflow::edit(&post, user.id)?;
    let content = PostContent::try_from(input)?;

    let updated = match store::posts::apply_change(&state.db, id, &change, Some(content), Utc::now()).await? {
        Some(updated) => updated,
        None => {
            return Err(lost_race(&state.db, id, |current| workflow::edit(current, user.id).map(|_| ())).await)
        }
    };

    tracing::info!("post edited; back to pending");
    Ok(Json(store::posts::to_response(&state.db, updated).await?))
}

/// Delete a post that has not been approved
#[utoipa::path(
    delete,
    path = "/api/posts/{id}",
    params(("id" = Uuid, Path, description = "Post id")),
    responses(
        (status = 200, description = "Post deleted", body = MessageResponse),
        (status = 403, description = "Not the owner, or the post is approved"),
        (status = 404, description = "Post not found")
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(skip_all, fields(account = %user.id, post = %id))]
pub async fn delete_post(
    State(state): State<AppState>,
    user: AuthUser,
    AppPath(id): AppPath<Uuid>,
) -> Result<Json<MessageResponse>, AppError> {
    user.require(BUSINESS_OWNER)?;

    let post = load_post(&state.db, id).await?;
    let precondition = workflow::delete(&post, user.id)?;

    if !store::posts::delete_if(&state.db, id, &precondition).await? {
        return Err(lost_race(&state.db, id, |current| workflow::delete(current, user.id).map(|_| ())).await);
    }

    tracing::info!("post deleted");
    Ok(Json(MessageResponse::new("Post deleted successfully")))
}

/// Posts waiting for review
#[utoipa::path(
    get,
    path = "/api/posts/admin/pending",
    responses(
        (status = 200, description = "Pending posts, newest first", body = Vec<PostResponse>),
        (status = 403, description = "Caller is not an admin")
    ),
    security(("bearer_auth" = []))
)]
pub async fn pending_posts(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<Vec<PostResponse>>, AppError> {
    user.require(REVIEWERS)?;
    let posts = store::posts::list_pending(&state.db).await?;
    Ok(Json(store::posts::to_responses(&state.db, posts).await?))
}

/// Approve or reject a pending post
#[utoipa::path(
    put,
    path = "/api/posts/admin/review/{id}",
    params(("id" = Uuid, Path, description = "Post id")),
    request_body = ReviewRequest,
    responses(
        (status = 200, description = "Post reviewed", body = PostResponse),
        (status = 400, description = "Invalid status or missing rejection reason"),
        (status = 403, description = "Caller is not an admin"),
        (status = 404, description = "Post not found"),
        (status = 409, description = "Post has already been reviewed")
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(skip_all, fields(reviewer = %user.id, post = %id, decision = %req.status))]
pub async fn review_post(
    State(state): State<AppState>,
    user: AuthUser,
    AppPath(id): AppPath<Uuid>,
    AppJson(req): AppJson<ReviewRequest>,
) -> Result<Json<PostResponse>, AppError> {
    user.require(REVIEWERS)?;

    let decision = ReviewDecision::parse(&req.status, req.rejection_reason.as_deref())?;
    let post = load_post(&state.db, id).await?;
    let change = workflow::review(&post, user.id, decision.clone())?;

    let reviewed = match store::posts::apply_change(&state.db, id, &change, None, Utc::now()).await? {
        Some(reviewed) => reviewed,
        None => {
            return Err(lost_race(&state.db, id, |current| {
                workflow::review(current, user.id, decision).map(|_| ())
            })
            .await)
        }
    };

    tracing::info!(status = ?reviewed.status, "post reviewed");
    Ok(Json(store::posts::to_response(&state.db, reviewed).await?))
}

/// Every reviewed post, most recently changed first
#[utoipa::path(
    get,
    path = "/api/posts/admin/history",
    responses(
        (status = 200, description = "Approved and rejected posts", body = Vec<PostResponse>),
        (status = 403, description = "Caller is not the superadmin")
    ),
    security(("bearer_auth" = []))
)]
pub async fn review_history(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<Vec<PostResponse>>, AppError> {
    user.require(SUPERADMIN)?;
    let posts = store::posts::list_history(&state.db).await?;
    Ok(Json(store::posts::to_responses(&state.db, posts).await?))
}

/// Interests investors have expressed in the caller's posts
#[utoipa::path(
    get,
    path = "/api/posts/user/interests",
    responses(
        (status = 200, description = "Received interests, newest first", body = Vec<interest::Model>),
        (status = 403, description = "Caller is not a business owner")
    ),
    security(("bearer_auth" = []))
)]
pub async fn received_interests(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<Vec<interest::Model>>, AppError> {
    user.require(BUSINESS_OWNER)?;
    Ok(Json(store::ledgers::interests_for_owner(&state.db, user.id).await?))
}

/// Move an interest in one of the caller's posts along its pipeline
#[utoipa::path(
    put,
    path = "/api/posts/interests/{id}/status",
    params(("id" = Uuid, Path, description = "Interest id")),
    request_body = InterestStatusRequest,
    responses(
        (status = 200, description = "Interest updated", body = interest::Model),
        (status = 403, description = "The interest is not on the caller's post"),
        (status = 404, description = "Interest not found")
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(skip_all, fields(account = %user.id, interest = %id))]
pub async fn update_interest_status(
    State(state): State<AppState>,
    user: AuthUser,
    AppPath(id): AppPath<Uuid>,
    AppJson(req): AppJson<InterestStatusRequest>,
) -> Result<Json<interest::Model>, AppError> {
    user.require(BUSINESS_OWNER)?;

    let interest = store::ledgers::find_interest(&state.db, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Interest not found".to_string()))?;
    let post = load_post(&state.db, interest.business).await?;
    if post.created_by != user.id {
        return Err(AppError::Forbidden(
            "You are not authorized to update this interest".to_string(),
        ));
    }

    let updated = store::ledgers::set_interest_status(&state.db, interest, req.status).await?;
    tracing::info!(status = ?updated.status, "interest status changed");
    Ok(Json(updated))
}
