use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::enums::SocialPlatform;

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "team_social")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    #[sea_orm(indexed)]
    pub team_id: String,
    #[sea_orm(belongs_to, from = "team_id", to = "id")]
    pub team: HasOne<super::team::Entity>,

    pub platform: SocialPlatform,
    pub url: String,
}

impl ActiveModelBehavior for ActiveModel {}
