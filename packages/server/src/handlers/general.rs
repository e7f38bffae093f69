use axum::Json;
use axum::extract::State;
use axum::response::IntoResponse;
use chrono::Utc;
use sea_orm::*;
use tracing::{info, instrument};

use crate::entity::{article, banner, career_applicant, event, partner, volunteer_applicant};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AdminUser;
use crate::extractors::multipart::{FormData, ensure_image};
use crate::handlers::team::roster;
use crate::models::article::ArticleItem;
use crate::models::event::EventItem;
use crate::models::general::*;
use crate::models::shared::ApiResponse;
use crate::services::lifecycle::{Upload, folder};
use crate::services::listing::Visibility;
use crate::services::taxonomy::TaxonomyNames;
use crate::state::AppState;

/// Articles and events shown on the landing page.
const HOMEPAGE_LATEST: u64 = 3;

#[utoipa::path(
    get,
    path = "/homepage",
    tag = "General",
    operation_id = "getHomepage",
    summary = "Landing page content",
    description = "Every banner and partner, the three newest active articles and events, \
        and the team roster.",
    responses(
        (status = 200, description = "Landing page content", body = ApiResponse<HomepageResponse>),
    ),
)]
#[instrument(skip(state))]
pub async fn homepage(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<HomepageResponse>>, AppError> {
    let db = &state.db;
    let (banners, partners, articles, events, teams) = futures::try_join!(
        banner::Entity::find()
            .order_by_desc(banner::Column::CreatedAt)
            .all(db),
        partner::Entity::find()
            .order_by_desc(partner::Column::CreatedAt)
            .all(db),
        article::Entity::find()
            .filter(article::Column::IsActive.eq(true))
            .order_by_desc(article::Column::CreatedAt)
            .limit(HOMEPAGE_LATEST)
            .all(db),
        event::Entity::find()
            .filter(event::Column::IsActive.eq(true))
            .order_by_desc(event::Column::CreatedAt)
            .limit(HOMEPAGE_LATEST)
            .all(db),
        roster(db),
    )?;

    let names = TaxonomyNames::load(
        db,
        articles
            .iter()
            .map(|m| (&m.pillar_id, &m.sub_pillar_id))
            .chain(events.iter().map(|m| (&m.pillar_id, &m.sub_pillar_id))),
    )
    .await?;

    let now = Utc::now();
    Ok(ApiResponse::ok(HomepageResponse {
        banners: banners.into_iter().map(Into::into).collect(),
        partners: partners.into_iter().map(Into::into).collect(),
        articles: articles
            .into_iter()
            .map(|m| ArticleItem::build(m, &names, Visibility::Public))
            .collect(),
        events: events
            .into_iter()
            .map(|m| EventItem::build(m, &names, Visibility::Public, now))
            .collect(),
        teams,
    }))
}

#[utoipa::path(
    get,
    path = "/dashboard",
    tag = "General",
    operation_id = "getDashboard",
    summary = "Admin dashboard counters",
    responses(
        (status = 200, description = "Record counts", body = ApiResponse<DashboardResponse>),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, _admin))]
pub async fn dashboard(
    _admin: AdminUser,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<DashboardResponse>>, AppError> {
    let db = &state.db;
    let (volunteer_applicants, events, articles, career_applicants) = futures::try_join!(
        volunteer_applicant::Entity::find().count(db),
        event::Entity::find().count(db),
        article::Entity::find().count(db),
        career_applicant::Entity::find().count(db),
    )?;

    Ok(ApiResponse::ok(DashboardResponse {
        volunteer_applicants,
        events,
        articles,
        career_applicants,
    }))
}

#[utoipa::path(
    post,
    path = "/contents",
    tag = "General",
    operation_id = "uploadContentImage",
    summary = "Upload an image for rich-text content",
    description = "Stores the image and returns its public URL. No record owns it.",
    request_body(content = ContentImageForm, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Image stored", body = ApiResponse<ContentImageResponse>),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 502, description = "Upload failed (STORAGE_ERROR)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, _admin, form))]
pub async fn upload_content_image(
    _admin: AdminUser,
    State(state): State<AppState>,
    form: FormData,
) -> Result<impl IntoResponse, AppError> {
    let ContentImageForm { image } = ContentImageForm::parse(form)?;
    ensure_image(&image)?;

    let stored = state
        .blobs
        .upload_all(&[Upload::new(folder::CONTENTS, &image)])
        .await?
        .into_iter()
        .next()
        .ok_or_else(|| AppError::Internal("upload produced no blob".into()))?;

    info!(key = %stored.key, "Content image stored");
    Ok(ApiResponse::created(ContentImageResponse { url: stored.url }))
}
