use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "documentation")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    pub title: String,
    pub thumbnail_key: String,
    pub thumbnail_url: String,

    #[sea_orm(has_many)]
    pub images: HasMany<super::documentation_image::Entity>,

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
