//! Saved businesses and expressions of interest.
//!
//! Both are keyed by (investor, business) with a unique index; a duplicate
//! insert surfaces as a unique violation (see [`super::is_unique_violation`]).
//! Display fields are copied from the post at write time and are never
//! refreshed afterwards.

use chrono::Utc;
use sea_orm::{
    sea_query::Condition, ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait,
    JoinType, QueryFilter, QueryOrder, QuerySelect, RelationTrait, Set,
};
use uuid::Uuid;

use crate::entities::{interest, post, saved_business, user};
use crate::entities::{Interest, InterestStatus, SavedBusiness};

const NOT_SPECIFIED: &str = "Not specified";

fn or_not_specified(value: &str) -> String {
    if value.trim().is_empty() {
        NOT_SPECIFIED.to_string()
    } else {
        value.to_string()
    }
}

pub async fn save_business(
    db: &DatabaseConnection,
    investor: Uuid,
    business: &post::Model,
) -> Result<saved_business::Model, DbErr> {
    saved_business::ActiveModel {
        id: Set(Uuid::new_v4()),
        investor: Set(investor),
        business: Set(business.id),
        business_name: Set(business.title.clone()),
        industry: Set(or_not_specified(&business.industry)),
        location: Set(or_not_specified(&business.location)),
        investment_needed: Set(business.investment_needed),
        created_at: Set(Utc::now()),
    }
    .insert(db)
    .await
}

pub async fn list_saved(
    db: &DatabaseConnection,
    investor: Uuid,
) -> Result<Vec<saved_business::Model>, DbErr> {
    SavedBusiness::find()
        .filter(saved_business::Column::Investor.eq(investor))
        .order_by_desc(saved_business::Column::CreatedAt)
        .all(db)
        .await
}

/// `id` may be the saved record's id or the business id.
pub async fn remove_saved(db: &DatabaseConnection, investor: Uuid, id: Uuid) -> Result<bool, DbErr> {
    let result = SavedBusiness::delete_many()
        .filter(saved_business::Column::Investor.eq(investor))
        .filter(
            Condition::any()
                .add(saved_business::Column::Id.eq(id))
                .add(saved_business::Column::Business.eq(id)),
        )
        .exec(db)
        .await?;
    Ok(result.rows_affected > 0)
}

pub async fn express_interest(
    db: &DatabaseConnection,
    investor: Uuid,
    business: &post::Model,
    owner: Option<&user::Model>,
    message: Option<String>,
) -> Result<interest::Model, DbErr> {
    let (contact_name, contact_email) = match owner {
        Some(owner) => (owner.name.clone(), owner.email.clone()),
        None => (NOT_SPECIFIED.to_string(), NOT_SPECIFIED.to_string()),
    };

    interest::ActiveModel {
        id: Set(Uuid::new_v4()),
        investor: Set(investor),
        business: Set(business.id),
        business_name: Set(business.title.clone()),
        industry: Set(or_not_specified(&business.industry)),
        contact_name: Set(contact_name),
        contact_email: Set(contact_email),
        message: Set(message),
        status: Set(InterestStatus::Pending),
        date_interested: Set(Utc::now()),
    }
    .insert(db)
    .await
}

pub async fn list_interests(
    db: &DatabaseConnection,
    investor: Uuid,
) -> Result<Vec<interest::Model>, DbErr> {
    Interest::find()
        .filter(interest::Column::Investor.eq(investor))
        .order_by_desc(interest::Column::DateInterested)
        .all(db)
        .await
}

/// `id` may be the interest's id or the business id.
pub async fn withdraw_interest(db: &DatabaseConnection, investor: Uuid, id: Uuid) -> Result<bool, DbErr> {
    let result = Interest::delete_many()
        .filter(interest::Column::Investor.eq(investor))
        .filter(
            Condition::any()
                .add(interest::Column::Id.eq(id))
                .add(interest::Column::Business.eq(id)),
        )
        .exec(db)
        .await?;
    Ok(result.rows_affected > 0)
}

/// Interests received on any post owned by `owner`, newest first.
pub async fn interests_for_owner(
    db: &DatabaseConnection,
    owner: Uuid,
) -> Result<Vec<interest::Model>, DbErr> {
    Interest::find()
        .join(JoinType::InnerJoin, interest::Relation::Post.def())
        .filter(post::Column::CreatedBy.eq(owner))
        .order_by_desc(interest::Column::DateInterested)
        .all(db)
        .await
}

pub async fn find_interest(db: &DatabaseConnection, id: Uuid) -> Result<Option<interest::Model>, DbErr> {
    Interest::find_by_id(id).one(db).await
}

pub async fn set_interest_status(
    db: &DatabaseConnection,
    interest: interest::Model,
    status: InterestStatus,
) -> Result<interest::Model, DbErr> {
    let mut active: interest::ActiveModel = interest.into();
    active.status = Set(status);
    active.update(db).await
}
