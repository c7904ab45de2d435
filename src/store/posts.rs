use chrono::{DateTime, Utc};
use sea_orm::{
    sea_query::Condition, ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait,
    IntoActiveModel, PaginatorTrait, QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

use super::accounts;
use crate::entities::post::{self, PostResponse};
use crate::entities::{Post, PostStatus};
use crate::workflow::{PostContent, Precondition, StatusChange};

/// One page of the public listing.
pub struct Page {
    pub posts: Vec<post::Model>,
    pub total_pages: u64,
}

fn precondition_filter(precondition: &Precondition) -> Condition {
    match precondition {
        Precondition::StatusIs(status) => Condition::all().add(post::Column::Status.eq(*status)),
        Precondition::OwnedAndStatusIsNot { owner, status } => Condition::all()
            .add(post::Column::CreatedBy.eq(*owner))
            .add(post::Column::Status.ne(*status)),
    }
}

pub async fn insert(db: &DatabaseConnection, post: post::Model) -> Result<post::Model, DbErr> {
    post.into_active_model().reset_all().insert(db).await
}

pub async fn find_by_id(db: &DatabaseConnection, id: Uuid) -> Result<Option<post::Model>, DbErr> {
    Post::find_by_id(id).one(db).await
}

pub async fn find_approved(db: &DatabaseConnection, id: Uuid) -> Result<Option<post::Model>, DbErr> {
    Post::find_by_id(id)
        .filter(post::Column::Status.eq(PostStatus::Approved))
        .one(db)
        .await
}

/// Approved posts, newest first. `page` is 1-based; a page past the end is
/// empty.
pub async fn list_approved(db: &DatabaseConnection, page: u64, limit: u64) -> Result<Page, DbErr> {
    let paginator = Post::find()
        .filter(post::Column::Status.eq(PostStatus::Approved))
        .order_by_desc(post::Column::CreatedAt)
        .paginate(db, limit);

    let total_pages = paginator.num_pages().await?;
    let index = page.saturating_sub(1);
    // The paginator computes `limit * index` unchecked
    if index >= total_pages || page_offset(index, limit).is_none() {
        return Ok(Page { posts: Vec::new(), total_pages });
    }

    let posts = paginator.fetch_page(index).await?;
    Ok(Page { posts, total_pages })
}

/// Row offset of a 0-based page, if it fits the database's signed 64-bit range.
fn page_offset(index: u64, limit: u64) -> Option<u64> {
    index
        .checked_mul(limit)
        .filter(|offset| *offset <= i64::MAX as u64)
}

pub async fn list_by_owner(db: &DatabaseConnection, owner: Uuid) -> Result<Vec<post::Model>, DbErr> {
    Post::find()
        .filter(post::Column::CreatedBy.eq(owner))
        .order_by_desc(post::Column::CreatedAt)
        .all(db)
        .await
}

pub async fn list_pending(db: &DatabaseConnection) -> Result<Vec<post::Model>, DbErr> {
    Post::find()
        .filter(post::Column::Status.eq(PostStatus::Pending))
        .order_by_desc(post::Column::CreatedAt)
        .all(db)
        .await
}

/// Reviewed posts, most recently changed first.
pub async fn list_history(db: &DatabaseConnection) -> Result<Vec<post::Model>, DbErr> {
    Post::find()
        .filter(post::Column::Status.ne(PostStatus::Pending))
        .order_by_desc(post::Column::UpdatedAt)
        .all(db)
        .await
}

pub async fn count_by_status(db: &DatabaseConnection, status: PostStatus) -> Result<u64, DbErr> {
    Post::find()
        .filter(post::Column::Status.eq(status))
        .count(db)
        .await
}

/// Writes `change` (and new content, for edits) only if the row still
/// satisfies the change's precondition. `None` means nothing was written:
/// the post is gone or another request changed it first.
pub async fn apply_change(
    db: &DatabaseConnection,
    id: Uuid,
    change: &StatusChange,
    content: Option<PostContent>,
    now: DateTime<Utc>,
) -> Result<Option<post::Model>, DbErr> {
    let mut values = post::ActiveModel {
        status: Set(change.status),
        approved_by: Set(change.approved_by),
        rejection_reason: Set(change.rejection_reason.clone()),
        updated_at: Set(now),
        ..Default::default()
    };
    if let Some(content) = content {
        values.title = Set(content.title);
        values.business_name = Set(content.business_name);
        values.description = Set(content.description);
        values.industry = Set(content.industry);
        values.location = Set(content.location);
        values.investment_needed = Set(content.investment_needed);
    }

    let result = Post::update_many()
        .set(values)
        .filter(post::Column::Id.eq(id))
        .filter(precondition_filter(&change.precondition))
        .exec(db)
        .await?;

    if result.rows_affected == 0 {
        return Ok(None);
    }
    find_by_id(db, id).await
}

/// Deletes the post only if `precondition` still holds.
pub async fn delete_if(
    db: &DatabaseConnection,
    id: Uuid,
    precondition: &Precondition,
) -> Result<bool, DbErr> {
    let result = Post::delete_many()
        .filter(post::Column::Id.eq(id))
        .filter(precondition_filter(precondition))
        .exec(db)
        .await?;
    Ok(result.rows_affected > 0)
}

/// Resolves owner and reviewer summaries for a batch of posts.
pub async fn to_responses(
    db: &DatabaseConnection,
    posts: Vec<post::Model>,
) -> Result<Vec<PostResponse>, DbErr> {
    let ids = posts
        .iter()
        .flat_map(|p| std::iter::once(p.created_by).chain(p.approved_by));
    let accounts = accounts::summaries(db, ids).await?;

    Ok(posts
        .into_iter()
        .map(|p| {
            let owner = accounts.get(&p.created_by).cloned();
            let reviewer = p.approved_by.and_then(|id| accounts.get(&id).cloned());
            PostResponse::new(p, owner, reviewer)
        })
        .collect())
}

pub async fn to_response(db: &DatabaseConnection, post: post::Model) -> Result<PostResponse, DbErr> {
    let mut responses = to_responses(db, vec![post]).await?;
    responses
        .pop()
        .ok_or_else(|| DbErr::Custom("post response missing".to_string()))
}
