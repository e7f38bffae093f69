use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::entity::{banner, partner};
use crate::error::AppError;
use crate::extractors::multipart::{FormData, UploadedFile};

/// Multipart body of banner create and update.
#[derive(Debug, utoipa::ToSchema)]
pub struct BannerForm {
    /// Alt text, also searched by the admin listing.
    pub alt: Option<String>,
    /// Blank clears the link.
    pub link: Option<Option<String>>,
    #[schema(value_type = Option<String>, format = Binary)]
    pub image: Option<UploadedFile>,
}

impl BannerForm {
    pub fn parse(mut form: FormData) -> Result<Self, AppError> {
        Ok(Self {
            alt: form.text("alt"),
            link: form.nullable_text("link"),
            image: form.take_file("image"),
        })
    }
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct BannerResponse {
    #[schema(example = "JPSBNR10293")]
    pub id: String,
    pub alt: String,
    pub link: Option<String>,
    pub image_url: String,
    pub created_by: String,
    pub updated_by: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<banner::Model> for BannerResponse {
    fn from(model: banner::Model) -> Self {
        Self {
            id: model.id,
            alt: model.alt,
            link: model.link,
            image_url: model.image_url,
            created_by: model.created_by,
            updated_by: model.updated_by,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

/// Multipart body of partner create and update.
#[derive(Debug, utoipa::ToSchema)]
pub struct PartnerForm {
    pub alt: Option<String>,
    #[schema(value_type = Option<String>, format = Binary)]
    pub image: Option<UploadedFile>,
}

impl PartnerForm {
    pub fn parse(mut form: FormData) -> Result<Self, AppError> {
        Ok(Self {
            alt: form.text("alt"),
            image: form.take_file("image"),
        })
    }
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct PartnerResponse {
    #[schema(example = "JPSPTR55102")]
    pub id: String,
    pub alt: String,
    pub image_url: String,
    pub created_by: String,
    pub updated_by: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<partner::Model> for PartnerResponse {
    fn from(model: partner::Model) -> Self {
        Self {
            id: model.id,
            alt: model.alt,
            image_url: model.image_url,
            created_by: model.created_by,
            updated_by: model.updated_by,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}
