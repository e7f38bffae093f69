use chrono::{DateTime, Utc};
use serde::Serialize;

use super::shared::AdminMeta;
use crate::entity::article;
use crate::error::AppError;
use crate::extractors::multipart::{FormData, UploadedFile};
use crate::services::listing::Visibility;
use crate::services::taxonomy::TaxonomyNames;
use crate::utils::text::reading_time;

/// Multipart body of article create and update. Every field is optional on
/// update; create requires `title`, `content` and `image`.
#[derive(Debug, utoipa::ToSchema)]
pub struct ArticleForm {
    pub title: Option<String>,
    /// Rich-text HTML.
    pub content: Option<String>,
    pub description: Option<String>,
    /// Blank clears the reference.
    pub pillar_id: Option<Option<String>>,
    pub sub_pillar_id: Option<Option<String>>,
    pub is_active: Option<bool>,
    #[schema(value_type = Option<String>, format = Binary)]
    pub image: Option<UploadedFile>,
}

impl ArticleForm {
    pub fn parse(mut form: FormData) -> Result<Self, AppError> {
        Ok(Self {
            title: form.text("title"),
            content: form.text("content"),
            description: form.text("description"),
            pillar_id: form.nullable_text("pillar_id"),
            sub_pillar_id: form.nullable_text("sub_pillar_id"),
            is_active: form.flag("is_active")?,
            image: form.take_file("image"),
        })
    }
}

/// Article as it appears in listings.
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ArticleItem {
    #[schema(example = "JPSARC482913")]
    pub id: String,
    pub title: String,
    pub slug: String,
    pub description: Option<String>,
    pub image_url: String,
    #[schema(example = "3 minute read")]
    pub reading_time: String,
    /// Pillar name, `Lainnya` when uncategorized.
    pub pillar: String,
    pub subpillar: String,
    pub created_at: DateTime<Utc>,
    #[serde(flatten)]
    pub admin: Option<AdminMeta>,
}

/// Article with its body.
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ArticleDetail {
    #[serde(flatten)]
    pub item: ArticleItem,
    pub content: String,
    pub updated_at: DateTime<Utc>,
}

impl ArticleItem {
    pub fn build(model: article::Model, names: &TaxonomyNames, visibility: Visibility) -> Self {
        ArticleDetail::build(model, names, visibility).item
    }
}

impl ArticleDetail {
    pub fn build(model: article::Model, names: &TaxonomyNames, visibility: Visibility) -> Self {
        let pillar = names.pillar(&model.pillar_id);
        let subpillar = names.sub_pillar(&model.sub_pillar_id);
        let reading_time = reading_time(&model.content);
        let admin = (visibility == Visibility::Admin).then(|| AdminMeta {
            pillar_id: model.pillar_id.clone(),
            sub_pillar_id: model.sub_pillar_id.clone(),
            is_active: model.is_active,
            created_by: model.created_by.clone(),
            updated_by: model.updated_by.clone(),
        });
        Self {
            item: ArticleItem {
                id: model.id,
                title: model.title,
                slug: model.slug,
                description: model.description,
                image_url: model.image_url,
                reading_time,
                pillar,
                subpillar,
                created_at: model.created_at,
                admin,
            },
            content: model.content,
            updated_at: model.updated_at,
        }
    }
}
