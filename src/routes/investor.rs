use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;

use super::{AppJson, AppPath, MessageResponse};
use crate::auth::{AuthUser, INVESTOR};
use crate::entities::{interest, post, saved_business};
use crate::error::AppError;
use crate::store;
use crate::AppState;

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SaveBusinessRequest {
    business_id: Uuid,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ExpressInterestRequest {
    business_id: Uuid,
    /// Optional note to the business owner
    message: Option<String>,
}

async fn approved_business(state: &AppState, id: Uuid) -> Result<post::Model, AppError> {
    store::posts::find_approved(&state.db, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Business post not found or not approved".to_string()))
}

/// The caller's saved businesses
#[utoipa::path(
    get,
    path = "/api/investor/saved",
    responses(
        (status = 200, description = "Saved businesses, newest first", body = Vec<saved_business::Model>),
        (status = 403, description = "Caller is not an investor")
    ),
    security(("bearer_auth" = []))
)]
pub async fn saved_businesses(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<Vec<saved_business::Model>>, AppError> {
    user.require(INVESTOR)?;
    Ok(Json(store::ledgers::list_saved(&state.db, user.id).await?))
}

/// Save an approved business
#[utoipa::path(
    post,
    path = "/api/investor/saved",
    request_body = SaveBusinessRequest,
    responses(
        (status = 201, description = "Business saved", body = saved_business::Model),
        (status = 404, description = "Business not found or not approved"),
        (status = 409, description = "Business already saved")
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(skip_all, fields(investor = %user.id, business = %req.business_id))]
pub async fn save_business(
    State(state): State<AppState>,
    user: AuthUser,
    AppJson(req): AppJson<SaveBusinessRequest>,
) -> Result<(StatusCode, Json<saved_business::Model>), AppError> {
    user.require(INVESTOR)?;

    let business = approved_business(&state, req.business_id).await?;
    let saved = store::ledgers::save_business(&state.db, user.id, &business)
        .await
        .map_err(|e| {
            if store::is_unique_violation(&e) {
                AppError::Conflict("Business already saved".to_string())
            } else {
                e.into()
            }
        })?;

    tracing::info!("business saved");
    Ok((StatusCode::CREATED, Json(saved)))
}

/// Remove a saved business (by saved-record id or business id)
#[utoipa::path(
    delete,
    path = "/api/investor/saved/{id}",
    params(("id" = Uuid, Path, description = "Saved record id or business id")),
    responses(
        (status = 200, description = "Removed", body = MessageResponse),
        (status = 404, description = "Saved business not found")
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(skip_all, fields(investor = %user.id, target = %id))]
pub async fn remove_saved_business(
    State(state): State<AppState>,
    user: AuthUser,
    AppPath(id): AppPath<Uuid>,
) -> Result<Json<MessageResponse>, AppError> {
    user.require(INVESTOR)?;

    if !store::ledgers::remove_saved(&state.db, user.id, id).await? {
        return Err(AppError::NotFound("Saved business not found".to_string()));
    }
    Ok(Json(MessageResponse::new("Business removed from saved list")))
}

/// The caller's expressions of interest
#[utoipa::path(
    get,
    path = "/api/investor/interests",
    responses(
        (status = 200, description = "Interests, newest first", body = Vec<interest::Model>),
        (status = 403, description = "Caller is not an investor")
    ),
    security(("bearer_auth" = []))
)]
pub async fn interests(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<Vec<interest::Model>>, AppError> {
    user.require(INVESTOR)?;
    Ok(Json(store::ledgers::list_interests(&state.db, user.id).await?))
}

/// Express interest in an approved business
#[utoipa::path(
    post,
    path = "/api/investor/interests",
    request_body = ExpressInterestRequest,
    responses(
        (status = 201, description = "Interest recorded", body = interest::Model),
        (status = 404, description = "Business not found or not approved"),
        (status = 409, description = "Interest already expressed")
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(skip_all, fields(investor = %user.id, business = %req.business_id))]
pub async fn express_interest(
    State(state): State<AppState>,
    user: AuthUser,
    AppJson(req): AppJson<ExpressInterestRequest>,
) -> Result<(StatusCode, Json<interest::Model>), AppError> {
    user.require(INVESTOR)?;

    let business = approved_business(&state, req.business_id).await?;
    let owner = store::accounts::find_by_id(&state.db, business.created_by).await?;
    let interest =
        store::ledgers::express_interest(&state.db, user.id, &business, owner.as_ref(), req.message)
            .await
            .map_err(|e| {
                if store::is_unique_violation(&e) {
                    AppError::Conflict("Interest already expressed for this business".to_string())
                } else {
                    e.into()
                }
            })?;

    tracing::info!("interest expressed");
    Ok((StatusCode::CREATED, Json(interest)))
}

/// Withdraw an interest (by interest id or business id)
#[utoipa::path(
    delete,
    path = "/api/investor/interests/{id}",
    params(("id" = Uuid, Path, description = "Interest id or business id")),
    responses(
        (status = 200, description = "Withdrawn", body = MessageResponse),
        (status = 404, description = "Interest not found")
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(skip_all, fields(investor = %user.id, target = %id))]
pub async fn withdraw_interest(
    State(state): State<AppState>,
    user: AuthUser,
    AppPath(id): AppPath<Uuid>,
) -> Result<Json<MessageResponse>, AppError> {
    user.require(INVESTOR)?;

    if !store::ledgers::withdraw_interest(&state.db, user.id, id).await? {
        return Err(AppError::NotFound("Interest not found".to_string()));
    }
    Ok(Json(MessageResponse::new("Interest withdrawn")))
}
