use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// A team member shown on the public roster.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "team")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    pub fullname: String,
    pub image_key: String,
    pub image_url: String,

    #[sea_orm(indexed)]
    pub position_id: String,
    #[sea_orm(belongs_to, from = "position_id", to = "id")]
    pub position: HasOne<super::position::Entity>,

    #[sea_orm(has_many)]
    pub educations: HasMany<super::team_education::Entity>,
    #[sea_orm(has_many)]
    pub socials: HasMany<super::team_social::Entity>,

    pub created_by: String,
    pub updated_by: String,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
