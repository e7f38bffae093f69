use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "career_applicant")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    #[sea_orm(indexed)]
    pub career_id: String,
    #[sea_orm(belongs_to, from = "career_id", to = "id")]
    pub career: HasOne<super::career::Entity>,

    pub fullname: String,
    pub email: String,
    pub phone_number: String,
    #[sea_orm(column_type = "Text")]
    pub address: String,
    pub instagram_url: Option<String>,
    pub portfolio_url: Option<String>,

    pub cv_key: String,
    pub cv_url: String,

    #[sea_orm(default_value = false)]
    pub is_approved: bool,
    pub approved_by: Option<String>,

    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
