use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// One gallery image of a documentation entry.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "documentation_image")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    #[sea_orm(indexed)]
    pub documentation_id: String,
    #[sea_orm(belongs_to, from = "documentation_id", to = "id")]
    pub documentation: HasOne<super::documentation::Entity>,

    pub image_key: String,
    pub image_url: String,

    pub created_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
