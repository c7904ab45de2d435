use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, QueryOrder, Set,
};
use std::collections::HashMap;
use uuid::Uuid;

use crate::entities::user::{self, AccountSummary};
use crate::entities::{Role, User};

pub struct NewAccount {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
}

/// Emails are compared and stored lower-cased.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

pub async fn find_by_id(db: &DatabaseConnection, id: Uuid) -> Result<Option<user::Model>, DbErr> {
    User::find_by_id(id).one(db).await
}

pub async fn find_by_email(db: &DatabaseConnection, email: &str) -> Result<Option<user::Model>, DbErr> {
    User::find()
        .filter(user::Column::Email.eq(normalize_email(email)))
        .one(db)
        .await
}

/// Fails with a unique violation when the email is taken.
pub async fn create(db: &DatabaseConnection, account: NewAccount) -> Result<user::Model, DbErr> {
    let now = Utc::now();
    user::ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(account.name),
        email: Set(normalize_email(&account.email)),
        password_hash: Set(account.password_hash),
        role: Set(account.role),
        status: Set("active".to_string()),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(db)
    .await
}

pub async fn list_by_role(db: &DatabaseConnection, role: Role) -> Result<Vec<user::Model>, DbErr> {
    User::find()
        .filter(user::Column::Role.eq(role))
        .order_by_desc(user::Column::CreatedAt)
        .all(db)
        .await
}

/// Deletes the account only if it currently has `role`.
pub async fn delete_with_role(db: &DatabaseConnection, id: Uuid, role: Role) -> Result<bool, DbErr> {
    let result = User::delete_many()
        .filter(user::Column::Id.eq(id))
        .filter(user::Column::Role.eq(role))
        .exec(db)
        .await?;
    Ok(result.rows_affected > 0)
}

/// Overwrites role and password of an existing account.
pub async fn promote(
    db: &DatabaseConnection,
    account: user::Model,
    role: Role,
    password_hash: String,
) -> Result<user::Model, DbErr> {
    let mut active: user::ActiveModel = account.into();
    active.role = Set(role);
    active.password_hash = Set(password_hash);
    active.updated_at = Set(Utc::now());
    active.update(db).await
}

/// Summaries for the given ids; unknown ids are simply absent.
pub async fn summaries(
    db: &DatabaseConnection,
    ids: impl IntoIterator<Item = Uuid>,
) -> Result<HashMap<Uuid, AccountSummary>, DbErr> {
    let mut ids: Vec<Uuid> = ids.into_iter().collect();
    ids.sort();
    ids.dedup();
    if ids.is_empty() {
        return Ok(HashMap::new());
    }

    let accounts = User::find().filter(user::Column::Id.is_in(ids)).all(db).await?;
    Ok(accounts
        .iter()
        .map(|account| (account.id, AccountSummary::from(account)))
        .collect())
}
