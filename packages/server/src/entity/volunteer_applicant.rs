use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::enums::EducationLevel;

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "volunteer_applicant")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    #[sea_orm(indexed)]
    pub volunteer_id: String,
    #[sea_orm(belongs_to, from = "volunteer_id", to = "id")]
    pub volunteer: HasOne<super::volunteer::Entity>,

    pub fullname: String,
    pub email: String,
    pub institution: String,
    pub level: EducationLevel,
    pub study_program: String,
    #[sea_orm(column_type = "Text")]
    pub reason: String,

    pub cv_key: String,
    pub cv_url: String,
    /// Screenshot proving the applicant follows the organisation's socials.
    pub follow_key: String,
    pub follow_url: String,

    #[sea_orm(default_value = false)]
    pub is_approved: bool,
    pub approved_by: Option<String>,

    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
