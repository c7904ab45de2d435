pub mod admin;
pub mod auth;
pub mod investor;
pub mod posts;

use axum::extract::{FromRequest, FromRequestParts};
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::entities::post;
use crate::error::AppError;
use crate::store;
use crate::workflow::TransitionError;

/// `axum::Json` whose rejection is an [`AppError`], so malformed bodies get
/// the usual 400 `{"message"}` response.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct AppJson<T>(pub T);

#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(AppError))]
pub struct AppPath<T>(pub T);

#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(AppError))]
pub struct AppQuery<T>(pub T);

/// Plain acknowledgement body.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }
}

pub(crate) async fn load_post(db: &DatabaseConnection, id: Uuid) -> Result<post::Model, AppError> {
    store::posts::find_by_id(db, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Post not found".to_string()))
}

/// Explains a conditional write that matched no row. The post is re-read and
/// the same workflow check is run against its current state.
pub(crate) async fn lost_race<F>(db: &DatabaseConnection, id: Uuid, check: F) -> AppError
where
    F: FnOnce(&post::Model) -> Result<(), TransitionError>,
{
    tracing::warn!(post = %id, "conditional write matched no row");
    match store::posts::find_by_id(db, id).await {
        Ok(None) => AppError::NotFound("Post not found".to_string()),
        Ok(Some(current)) => match check(&current) {
            Err(e) => e.into(),
            Ok(()) => AppError::Conflict("Post was modified by another request".to_string()),
        },
        Err(e) => e.into(),
    }
}
