use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::shared::Paged;
use crate::entity::enums::{EducationLevel, SocialPlatform};
use crate::entity::{position, team, team_education, team_social};
use crate::error::AppError;
use crate::extractors::multipart::{FormData, UploadedFile};

/// One education entry. Known `id` updates that entry, anything else adds
/// a new one.
#[derive(Clone, Debug, Deserialize, utoipa::ToSchema)]
pub struct EducationInput {
    pub id: Option<String>,
    #[schema(example = "Universitas Indonesia")]
    pub name: String,
    pub level: EducationLevel,
}

#[derive(Clone, Debug, Deserialize, utoipa::ToSchema)]
pub struct SocialInput {
    pub id: Option<String>,
    pub platform: SocialPlatform,
    #[schema(example = "https://instagram.com/jakartapastisehat")]
    pub url: String,
}

/// Multipart body of team member create and update. `educations` and
/// `socials` are JSON arrays sent as text fields.
#[derive(Debug, utoipa::ToSchema)]
pub struct TeamForm {
    pub fullname: Option<String>,
    pub position_id: Option<String>,
    pub educations: Vec<EducationInput>,
    pub socials: Vec<SocialInput>,
    #[schema(value_type = Option<String>, format = Binary)]
    pub image: Option<UploadedFile>,
}

impl TeamForm {
    pub fn parse(mut form: FormData) -> Result<Self, AppError> {
        let educations: Vec<EducationInput> = form.json("educations")?.unwrap_or_default();
        let socials: Vec<SocialInput> = form.json("socials")?.unwrap_or_default();
        for education in &educations {
            if education.name.trim().is_empty() {
                return Err(AppError::Validation("Education name is required".into()));
            }
        }
        for social in &socials {
            if social.url.trim().is_empty() {
                return Err(AppError::Validation("Social link url is required".into()));
            }
        }
        Ok(Self {
            fullname: form.text("fullname"),
            position_id: form.text("position_id"),
            educations,
            socials,
            image: form.take_file("image"),
        })
    }
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct EducationResponse {
    pub id: String,
    pub name: String,
    pub level: EducationLevel,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct SocialResponse {
    pub id: String,
    pub platform: SocialPlatform,
    pub url: String,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct PositionRef {
    pub id: String,
    pub name: String,
}

/// Team member with ordered educations and social links.
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct TeamResponse {
    #[schema(example = "JPSTM402918")]
    pub id: String,
    pub fullname: String,
    pub image_url: String,
    pub position: Option<PositionRef>,
    /// Highest level first.
    pub educations: Vec<EducationResponse>,
    pub socials: Vec<SocialResponse>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TeamResponse {
    pub fn build(
        model: team::Model,
        position: Option<position::Model>,
        mut educations: Vec<team_education::Model>,
        mut socials: Vec<team_social::Model>,
    ) -> Self {
        educations.sort_by_key(|e| std::cmp::Reverse(e.level.rank()));
        socials.sort_by_key(|s| std::cmp::Reverse(s.platform.rank()));
        Self {
            id: model.id,
            fullname: model.fullname,
            image_url: model.image_url,
            position: position.map(|p| PositionRef {
                id: p.id,
                name: p.name,
            }),
            educations: educations
                .into_iter()
                .map(|e| EducationResponse {
                    id: e.id,
                    name: e.name,
                    level: e.level,
                })
                .collect(),
            socials: socials
                .into_iter()
                .map(|s| SocialResponse {
                    id: s.id,
                    platform: s.platform,
                    url: s.url,
                })
                .collect(),
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

/// Team member row of the admin table.
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct TeamItem {
    pub id: String,
    pub fullname: String,
    pub image_url: String,
    pub position: String,
    pub created_at: DateTime<Utc>,
}

/// Team listing: the full roster for public readers, a page of table rows
/// for the console.
#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(untagged)]
pub enum TeamListing {
    Roster(Vec<TeamResponse>),
    Table(Paged<TeamItem>),
}
