use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Top level of the content taxonomy.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "pillar")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    pub name: String,
    #[sea_orm(unique)]
    pub slug: String,

    #[sea_orm(has_many)]
    pub sub_pillars: HasMany<super::sub_pillar::Entity>,

    pub created_by: String,
    pub updated_by: String,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
