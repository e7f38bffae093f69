use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::shared::{AdminMeta, double_option};
use crate::entity::enums::EducationLevel;
use crate::entity::{volunteer, volunteer_applicant};
use crate::error::AppError;
use crate::extractors::multipart::{FormData, UploadedFile};
use crate::services::listing::Visibility;
use crate::services::taxonomy::TaxonomyNames;

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct CreateVolunteerRequest {
    #[schema(example = "Health Walk Marshal")]
    pub title: String,
    pub requirements: String,
    pub responsibilities: Option<String>,
    pub pillar_id: Option<String>,
    pub sub_pillar_id: Option<String>,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

pub(crate) fn default_active() -> bool {
    true
}

#[derive(Debug, Default, Deserialize, utoipa::ToSchema)]
pub struct UpdateVolunteerRequest {
    pub title: Option<String>,
    pub requirements: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub responsibilities: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub pillar_id: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub sub_pillar_id: Option<Option<String>>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct VolunteerItem {
    #[schema(example = "JPSVTR550123")]
    pub id: String,
    pub title: String,
    pub slug: String,
    pub pillar: String,
    pub subpillar: String,
    pub created_at: DateTime<Utc>,
    #[serde(flatten)]
    pub admin: Option<AdminMeta>,
    /// Admin listings only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub applicant_count: Option<u64>,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct VolunteerDetail {
    #[serde(flatten)]
    pub item: VolunteerItem,
    pub requirements: String,
    pub responsibilities: Option<String>,
    pub updated_at: DateTime<Utc>,
}

impl VolunteerItem {
    pub fn build(
        model: volunteer::Model,
        names: &TaxonomyNames,
        visibility: Visibility,
        applicant_count: Option<u64>,
    ) -> Self {
        VolunteerDetail::build(model, names, visibility, applicant_count).item
    }
}

impl VolunteerDetail {
    pub fn build(
        model: volunteer::Model,
        names: &TaxonomyNames,
        visibility: Visibility,
        applicant_count: Option<u64>,
    ) -> Self {
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
            item: VolunteerItem {
                id: model.id,
                title: model.title,
                slug: model.slug,
                pillar,
                subpillar,
                created_at: model.created_at,
                admin,
                applicant_count: applicant_count.filter(|_| visibility == Visibility::Admin),
            },
            requirements: model.requirements,
            responsibilities: model.responsibilities,
            updated_at: model.updated_at,
        }
    }
}

/// Public multipart application to a volunteer posting.
#[derive(Debug, utoipa::ToSchema)]
pub struct VolunteerApplicationForm {
    pub fullname: String,
    pub email: String,
    pub institution: String,
    pub level: EducationLevel,
    pub study_program: String,
    pub reason: String,
    #[schema(value_type = String, format = Binary)]
    pub cv: UploadedFile,
    /// Screenshot proving the applicant follows the organisation's socials.
    #[schema(value_type = String, format = Binary)]
    pub follow_proof: UploadedFile,
}

impl VolunteerApplicationForm {
    pub fn parse(mut form: FormData) -> Result<Self, AppError> {
        let level = form
            .json("level")?
            .ok_or_else(|| AppError::Validation("Field 'level' is required".into()))?;
        Ok(Self {
            fullname: form.required("fullname")?,
            email: form.required("email")?,
            institution: form.required("institution")?,
            level,
            study_program: form.required("study_program")?,
            reason: form.required("reason")?,
            cv: form.take_required_file("cv")?,
            follow_proof: form.take_required_file("follow_proof")?,
        })
    }
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct VolunteerApplicantResponse {
    #[schema(example = "JPSVOLAPPL120398")]
    pub id: String,
    pub volunteer_id: String,
    pub fullname: String,
    pub email: String,
    pub institution: String,
    pub level: EducationLevel,
    pub study_program: String,
    pub reason: String,
    pub cv_url: String,
    pub follow_url: String,
    pub is_approved: bool,
    pub approved_by: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<volunteer_applicant::Model> for VolunteerApplicantResponse {
    fn from(model: volunteer_applicant::Model) -> Self {
        Self {
            id: model.id,
            volunteer_id: model.volunteer_id,
            fullname: model.fullname,
            email: model.email,
            institution: model.institution,
            level: model.level,
            study_program: model.study_program,
            reason: model.reason,
            cv_url: model.cv_url,
            follow_url: model.follow_url,
            is_approved: model.is_approved,
            approved_by: model.approved_by,
            created_at: model.created_at,
        }
    }
}
