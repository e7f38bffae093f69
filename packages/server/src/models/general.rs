use serde::Serialize;

use super::article::ArticleItem;
use super::banner::{BannerResponse, PartnerResponse};
use super::event::EventItem;
use super::team::TeamResponse;
use crate::error::AppError;
use crate::extractors::multipart::{FormData, UploadedFile};

/// Everything the public landing page renders.
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct HomepageResponse {
    pub banners: Vec<BannerResponse>,
    pub partners: Vec<PartnerResponse>,
    /// Latest active articles.
    pub articles: Vec<ArticleItem>,
    pub events: Vec<EventItem>,
    pub teams: Vec<TeamResponse>,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct DashboardResponse {
    pub volunteer_applicants: u64,
    pub events: u64,
    pub articles: u64,
    pub career_applicants: u64,
}

/// Image embedded in rich-text content, stored without an owning record.
#[derive(Debug, utoipa::ToSchema)]
pub struct ContentImageForm {
    #[schema(value_type = String, format = Binary)]
    pub image: UploadedFile,
}

impl ContentImageForm {
    pub fn parse(mut form: FormData) -> Result<Self, AppError> {
        Ok(Self {
            image: form.take_required_file("image")?,
        })
    }
}

/// Uploaded rich-text image.
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ContentImageResponse {
    pub url: String,
}
