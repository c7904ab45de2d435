use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Progress of an investor's interest, tracked separately from the post's
/// review status.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
pub enum InterestStatus {
    #[sea_orm(string_value = "Pending")]
    Pending,
    #[sea_orm(string_value = "Contacted")]
    Contacted,
    #[sea_orm(string_value = "In Discussion")]
    #[serde(rename = "In Discussion")]
    InDiscussion,
    #[sea_orm(string_value = "Declined")]
    Declined,
    #[sea_orm(string_value = "Invested")]
    Invested,
}

/// Same snapshot-on-write policy as saved businesses: name, industry and
/// contact details are copied once and never refreshed.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[sea_orm(table_name = "interests")]
#[serde(rename_all = "camelCase")]
#[schema(as = Interest)]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub investor: Uuid,
    pub business: Uuid,
    pub business_name: String,
    pub industry: String,
    pub contact_name: String,
    pub contact_email: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub message: Option<String>,
    pub status: InterestStatus,
    pub date_interested: DateTime<Utc>,
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
