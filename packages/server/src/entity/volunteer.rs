use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// A volunteer opening.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "volunteer")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    pub title: String,
    #[sea_orm(unique)]
    pub slug: String,
    #[sea_orm(column_type = "Text")]
    pub requirements: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub responsibilities: Option<String>,

    #[sea_orm(has_many)]
    pub applicants: HasMany<super::volunteer_applicant::Entity>,

    #[sea_orm(indexed)]
    pub pillar_id: Option<String>,
    #[sea_orm(indexed)]
    pub sub_pillar_id: Option<String>,

    #[sea_orm(default_value = true, indexed)]
    pub is_active: bool,

    pub created_by: String,
    pub updated_by: String,
    #[sea_orm(indexed)]
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
