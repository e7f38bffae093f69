use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::enums::AdminRole;

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "admin")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    pub fullname: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: AdminRole,

    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
