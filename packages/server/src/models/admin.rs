use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entity::admin;
use crate::entity::enums::AdminRole;
use crate::error::AppError;

const MIN_SECRET_LEN: usize = 8;

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct CreateAdminRequest {
    #[schema(example = "budi santoso")]
    pub fullname: String,
    pub password: String,
    pub role: AdminRole,
    /// The shared access key.
    pub access_key: String,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct UpdateAdminRequest {
    pub fullname: Option<String>,
    pub password: Option<String>,
    pub role: Option<AdminRole>,
    pub access_key: String,
}

pub fn validate_create(req: &CreateAdminRequest) -> Result<(), AppError> {
    if req.fullname.trim().is_empty() {
        return Err(AppError::Validation("Field 'fullname' is required".into()));
    }
    validate_password(&req.password)
}

pub fn validate_update(req: &UpdateAdminRequest) -> Result<(), AppError> {
    if let Some(fullname) = &req.fullname
        && fullname.trim().is_empty()
    {
        return Err(AppError::Validation("Field 'fullname' must not be blank".into()));
    }
    if let Some(password) = &req.password {
        validate_password(password)?;
    }
    Ok(())
}

fn validate_password(password: &str) -> Result<(), AppError> {
    if password.chars().count() < MIN_SECRET_LEN {
        return Err(AppError::Validation(format!(
            "Password must be at least {MIN_SECRET_LEN} characters"
        )));
    }
    Ok(())
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct AdminResponse {
    #[schema(example = "JPSA10293")]
    pub id: String,
    pub fullname: String,
    pub role: AdminRole,
    pub created_at: DateTime<Utc>,
}

impl From<admin::Model> for AdminResponse {
    fn from(model: admin::Model) -> Self {
        Self {
            id: model.id,
            fullname: model.fullname,
            role: model.role,
            created_at: model.created_at,
        }
    }
}
