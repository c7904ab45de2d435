use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// An investor's bookmark of an approved listing. The display fields are a
/// snapshot of the post taken when the bookmark was written and are not kept
/// in sync with later edits.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[sea_orm(table_name = "saved_businesses")]
#[serde(rename_all = "camelCase")]
#[schema(as = SavedBusiness)]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub investor: Uuid,
    pub business: Uuid,
    pub business_name: String,
    pub industry: String,
    pub location: String,
    pub investment_needed: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::post::Entity",
        from = "Column::Business",
        to = "super::post::Column::Id",
        on_delete = "Cascade"
    )]
    Post,
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::Investor",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    Investor,
}

impl Related<super::post::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Post.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
