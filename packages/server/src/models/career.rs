use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::shared::{AdminMeta, double_option};
use super::volunteer::default_active;
use crate::entity::enums::{EmploymentType, WorkLocation};
use crate::entity::{career, career_applicant};
use crate::error::AppError;
use crate::extractors::multipart::{FormData, UploadedFile};
use crate::services::listing::Visibility;
use crate::services::taxonomy::TaxonomyNames;

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct CreateCareerRequest {
    #[schema(example = "Program Officer")]
    pub title: String,
    pub location: WorkLocation,
    #[serde(rename = "type")]
    pub employment_type: EmploymentType,
    pub requirements: String,
    pub responsibilities: Option<String>,
    pub pillar_id: Option<String>,
    pub sub_pillar_id: Option<String>,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

#[derive(Debug, Default, Deserialize, utoipa::ToSchema)]
pub struct UpdateCareerRequest {
    pub title: Option<String>,
    pub location: Option<WorkLocation>,
    #[serde(rename = "type")]
    pub employment_type: Option<EmploymentType>,
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
pub struct CareerItem {
    #[schema(example = "JPSCRR771203")]
    pub id: String,
    pub title: String,
    pub slug: String,
    pub location: WorkLocation,
    #[serde(rename = "type")]
    pub employment_type: EmploymentType,
    pub pillar: String,
    pub subpillar: String,
    pub created_at: DateTime<Utc>,
    #[serde(flatten)]
    pub admin: Option<AdminMeta>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub applicant_count: Option<u64>,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct CareerDetail {
    #[serde(flatten)]
    pub item: CareerItem,
    pub requirements: String,
    pub responsibilities: Option<String>,
    pub updated_at: DateTime<Utc>,
}

impl CareerItem {
    pub fn build(
        model: career::Model,
        names: &TaxonomyNames,
        visibility: Visibility,
        applicant_count: Option<u64>,
    ) -> Self {
        CareerDetail::build(model, names, visibility, applicant_count).item
    }
}

impl CareerDetail {
    pub fn build(
        model: career::Model,
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
            item: CareerItem {
                id: model.id,
                title: model.title,
                slug: model.slug,
                location: model.location,
                employment_type: model.employment_type,
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

/// Public multipart application to a career posting.
#[derive(Debug, utoipa::ToSchema)]
pub struct CareerApplicationForm {
    pub fullname: String,
    pub email: String,
    pub phone_number: String,
    pub address: String,
    pub instagram_url: Option<String>,
    pub portfolio_url: Option<String>,
    #[schema(value_type = String, format = Binary)]
    pub cv: UploadedFile,
}

impl CareerApplicationForm {
    pub fn parse(mut form: FormData) -> Result<Self, AppError> {
        Ok(Self {
            fullname: form.required("fullname")?,
            email: form.required("email")?,
            phone_number: form.required("phone_number")?,
            address: form.required("address")?,
            instagram_url: form.text("instagram_url"),
            portfolio_url: form.text("portfolio_url"),
            cv: form.take_required_file("cv")?,
        })
    }
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct CareerApplicantResponse {
    #[schema(example = "JPSCARAPPL450982")]
    pub id: String,
    pub career_id: String,
    pub fullname: String,
    pub email: String,
    pub phone_number: String,
    pub address: String,
    pub instagram_url: Option<String>,
    pub portfolio_url: Option<String>,
    pub cv_url: String,
    pub is_approved: bool,
    pub approved_by: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<career_applicant::Model> for CareerApplicantResponse {
    fn from(model: career_applicant::Model) -> Self {
        Self {
            id: model.id,
            career_id: model.career_id,
            fullname: model.fullname,
            email: model.email,
            phone_number: model.phone_number,
            address: model.address,
            instagram_url: model.instagram_url,
            portfolio_url: model.portfolio_url,
            cv_url: model.cv_url,
            is_approved: model.is_approved,
            approved_by: model.approved_by,
            created_at: model.created_at,
        }
    }
}
