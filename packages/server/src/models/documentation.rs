use chrono::{DateTime, Utc};
use serde::Serialize;

use super::shared::AdminMeta;
use crate::entity::{documentation, documentation_image};
use crate::error::AppError;
use crate::extractors::multipart::{FormData, UploadedFile};
use crate::services::listing::Visibility;
use crate::services::taxonomy::TaxonomyNames;

/// Multipart body of documentation create and update. Gallery `images` are
/// only accepted on create and by the add-images endpoint.
#[derive(Debug, utoipa::ToSchema)]
pub struct DocumentationForm {
    pub title: Option<String>,
    pub pillar_id: Option<Option<String>>,
    pub sub_pillar_id: Option<Option<String>>,
    pub is_active: Option<bool>,
    #[schema(value_type = Option<String>, format = Binary)]
    pub thumbnail: Option<UploadedFile>,
    #[schema(value_type = Vec<String>, format = Binary)]
    pub images: Vec<UploadedFile>,
}

impl DocumentationForm {
    pub fn parse(mut form: FormData) -> Result<Self, AppError> {
        Ok(Self {
            title: form.text("title"),
            pillar_id: form.nullable_text("pillar_id"),
            sub_pillar_id: form.nullable_text("sub_pillar_id"),
            is_active: form.flag("is_active")?,
            thumbnail: form.take_file("thumbnail"),
            images: form.take_files("images"),
        })
    }
}

/// Gallery images added to an existing documentation entry.
#[derive(Debug, utoipa::ToSchema)]
pub struct GalleryForm {
    #[schema(value_type = Vec<String>, format = Binary)]
    pub images: Vec<UploadedFile>,
}

impl GalleryForm {
    pub fn parse(mut form: FormData) -> Result<Self, AppError> {
        let images = form.take_files("images");
        if images.is_empty() {
            return Err(AppError::Validation("At least one image is required".into()));
        }
        Ok(Self { images })
    }
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct DocumentationItem {
    #[schema(example = "JPSDOC203948")]
    pub id: String,
    pub title: String,
    pub thumbnail_url: String,
    pub pillar: String,
    pub subpillar: String,
    pub created_at: DateTime<Utc>,
    #[serde(flatten)]
    pub admin: Option<AdminMeta>,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct GalleryImage {
    #[schema(example = "JPSDOCIMG384756")]
    pub id: String,
    pub image_url: String,
    pub created_at: DateTime<Utc>,
}

impl From<documentation_image::Model> for GalleryImage {
    fn from(model: documentation_image::Model) -> Self {
        Self {
            id: model.id,
            image_url: model.image_url,
            created_at: model.created_at,
        }
    }
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct DocumentationDetail {
    #[serde(flatten)]
    pub item: DocumentationItem,
    pub images: Vec<GalleryImage>,
    pub updated_at: DateTime<Utc>,
}

impl DocumentationItem {
    pub fn build(model: documentation::Model, names: &TaxonomyNames, visibility: Visibility) -> Self {
        let pillar = names.pillar(&model.pillar_id);
        let subpillar = names.sub_pillar(&model.sub_pillar_id);
        let admin = (visibility == Visibility::Admin).then(|| AdminMeta {
            pillar_id: model.pillar_id.clone(),
            sub_pillar_id: model.sub_pillar_id.clone(),
            is_active: model.is_active,
            created_by: model.created_by.clone(),
            updated_by: model.updated_by.clone(),
        });
        Self {
            id: model.id,
            title: model.title,
            thumbnail_url: model.thumbnail_url,
            pillar,
            subpillar,
            created_at: model.created_at,
            admin,
        }
    }
}

impl DocumentationDetail {
    pub fn build(
        model: documentation::Model,
        images: Vec<documentation_image::Model>,
        names: &TaxonomyNames,
        visibility: Visibility,
    ) -> Self {
        let updated_at = model.updated_at;
        Self {
            item: DocumentationItem::build(model, names, visibility),
            images: images.into_iter().map(GalleryImage::from).collect(),
            updated_at,
        }
    }
}
