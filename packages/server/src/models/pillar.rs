use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::shared::Paged;
use crate::entity::{pillar, sub_pillar};
use crate::error::AppError;

/// Subpillar in a pillar create or update. A known `id` renames that
/// subpillar; a missing or unknown one creates a new subpillar.
#[derive(Clone, Debug, Deserialize, utoipa::ToSchema)]
pub struct SubPillarInput {
    pub id: Option<String>,
    #[schema(example = "Gizi Anak")]
    pub name: String,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct CreatePillarRequest {
    #[schema(example = "Kesehatan")]
    pub name: String,
    /// At least one.
    pub subpillars: Vec<SubPillarInput>,
}

#[derive(Debug, Default, Deserialize, utoipa::ToSchema)]
pub struct UpdatePillarRequest {
    pub name: Option<String>,
    /// Upserted one by one; subpillars not listed are left alone.
    #[serde(default)]
    pub subpillars: Vec<SubPillarInput>,
}

pub fn validate_create(req: &CreatePillarRequest) -> Result<(), AppError> {
    validate_name(&req.name, "Pillar")?;
    if req.subpillars.is_empty() {
        return Err(AppError::Validation(
            "A pillar needs at least one subpillar".into(),
        ));
    }
    validate_subpillars(&req.subpillars)
}

pub fn validate_update(req: &UpdatePillarRequest) -> Result<(), AppError> {
    if let Some(name) = &req.name {
        validate_name(name, "Pillar")?;
    }
    validate_subpillars(&req.subpillars)
}

fn validate_subpillars(items: &[SubPillarInput]) -> Result<(), AppError> {
    items
        .iter()
        .try_for_each(|item| validate_name(&item.name, "Subpillar"))
}

fn validate_name(name: &str, what: &str) -> Result<(), AppError> {
    let name = name.trim();
    if name.is_empty() || name.chars().count() > 128 {
        return Err(AppError::Validation(format!(
            "{what} name must be 1-128 characters"
        )));
    }
    Ok(())
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct SubPillarResponse {
    #[schema(example = "JPSSPLR4821")]
    pub id: String,
    pub name: String,
    pub slug: String,
}

impl From<sub_pillar::Model> for SubPillarResponse {
    fn from(model: sub_pillar::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            slug: model.slug,
        }
    }
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct PillarResponse {
    #[schema(example = "JPSPLR1093")]
    pub id: String,
    pub name: String,
    pub slug: String,
    pub subpillars: Vec<SubPillarResponse>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PillarResponse {
    pub fn build(model: pillar::Model, mut subpillars: Vec<sub_pillar::Model>) -> Self {
        subpillars.sort_by(|a, b| a.name.cmp(&b.name));
        Self {
            id: model.id,
            name: model.name,
            slug: model.slug,
            subpillars: subpillars.into_iter().map(Into::into).collect(),
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

/// Pillar listing: the whole tree for public readers, a page for the console.
#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(untagged)]
pub enum PillarListing {
    Tree(Vec<PillarResponse>),
    Table(Paged<PillarResponse>),
}
