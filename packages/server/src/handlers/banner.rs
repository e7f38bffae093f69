use axum::Json;
use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use chrono::Utc;
use sea_orm::*;
use tracing::instrument;

use crate::entity::banner;
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AdminUser;
use crate::extractors::multipart::{FormData, ensure_image};
use crate::models::banner::{BannerForm, BannerResponse};
use crate::models::shared::{ApiResponse, IdResponse, ListQuery, Paged};
use crate::services::lifecycle::{Upload, folder};
use crate::services::listing::{self, Visibility};
use crate::state::AppState;
use crate::utils::ident::{self, IdKind};

#[utoipa::path(
    get,
    path = "/",
    tag = "Banners",
    operation_id = "listBanners",
    summary = "List banners",
    description = "Newest first, five per page. `q` searches the alt text.",
    params(ListQuery),
    responses(
        (status = 200, description = "One page of banners", body = ApiResponse<Paged<BannerResponse>>),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, _admin, query))]
pub async fn list_banners(
    _admin: AdminUser,
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<ApiResponse<Paged<BannerResponse>>>, AppError> {
    let page = listing::list::<banner::Entity>(&state.db, Visibility::Admin, &query).await?;
    Ok(ApiResponse::ok(page.map(BannerResponse::from)))
}

#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Banners",
    operation_id = "getBanner",
    summary = "Get a banner",
    params(("id" = String, Path, description = "Banner ID")),
    responses(
        (status = 200, description = "Banner", body = ApiResponse<BannerResponse>),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Banner not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, _admin), fields(id))]
pub async fn get_banner(
    _admin: AdminUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<BannerResponse>>, AppError> {
    let model = find_banner(&state.db, &id).await?;
    Ok(ApiResponse::ok(model.into()))
}

#[utoipa::path(
    post,
    path = "/",
    tag = "Banners",
    operation_id = "createBanner",
    summary = "Create a banner",
    request_body(content = BannerForm, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Banner created", body = ApiResponse<BannerResponse>),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 502, description = "Upload failed (STORAGE_ERROR)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, admin, form))]
pub async fn create_banner(
    admin: AdminUser,
    State(state): State<AppState>,
    form: FormData,
) -> Result<impl IntoResponse, AppError> {
    let BannerForm { alt, link, image } = BannerForm::parse(form)?;
    let alt = alt.ok_or_else(|| AppError::Validation("Field 'alt' is required".into()))?;
    let image = image.ok_or_else(|| AppError::Validation("File 'image' is required".into()))?;
    ensure_image(&image)?;

    let db = state.db.clone();
    let now = Utc::now();
    let model = state
        .blobs
        .create_one(Upload::new(folder::BANNERS, &image), |stored| async move {
            let model = banner::ActiveModel {
                id: Set(ident::mint(IdKind::Banner)),
                alt: Set(alt),
                link: Set(link.flatten()),
                image_key: Set(stored.key),
                image_url: Set(stored.url),
                created_by: Set(admin.admin_id.clone()),
                updated_by: Set(admin.admin_id),
                created_at: Set(now),
                updated_at: Set(now),
            }
            .insert(&db)
            .await?;
            Ok::<_, AppError>(model)
        })
        .await?;

    Ok(ApiResponse::created(BannerResponse::from(model)))
}

#[utoipa::path(
    patch,
    path = "/{id}",
    tag = "Banners",
    operation_id = "updateBanner",
    summary = "Update a banner",
    description = "A new `image` replaces the old one, which is removed after the banner is saved.",
    params(("id" = String, Path, description = "Banner ID")),
    request_body(content = BannerForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Banner updated", body = ApiResponse<BannerResponse>),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Banner not found (NOT_FOUND)", body = ErrorBody),
        (status = 502, description = "Upload failed (STORAGE_ERROR)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, admin, form), fields(id))]
pub async fn update_banner(
    admin: AdminUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    form: FormData,
) -> Result<Json<ApiResponse<BannerResponse>>, AppError> {
    let existing = find_banner(&state.db, &id).await?;
    let BannerForm { alt, link, image } = BannerForm::parse(form)?;
    if let Some(image) = &image {
        ensure_image(image)?;
    }

    let db = state.db.clone();
    let current_key = existing.image_key.clone();
    let model = state
        .blobs
        .replace_one(
            image.as_ref().map(|f| Upload::new(folder::BANNERS, f)),
            &current_key,
            |stored| async move {
                let mut active: banner::ActiveModel = existing.into();
                if let Some(alt) = alt {
                    active.alt = Set(alt);
                }
                if let Some(link) = link {
                    active.link = Set(link);
                }
                if let Some(stored) = stored {
                    active.image_key = Set(stored.key);
                    active.image_url = Set(stored.url);
                }
                active.updated_by = Set(admin.admin_id);
                active.updated_at = Set(Utc::now());
                Ok::<_, AppError>(active.update(&db).await?)
            },
        )
        .await?;

    Ok(ApiResponse::ok(model.into()))
}

#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Banners",
    operation_id = "deleteBanner",
    summary = "Delete a banner",
    params(("id" = String, Path, description = "Banner ID")),
    responses(
        (status = 200, description = "Banner deleted", body = ApiResponse<IdResponse>),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Banner not found (NOT_FOUND)", body = ErrorBody),
        (status = 502, description = "Image removal failed (STORAGE_ERROR)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, _admin), fields(id))]
pub async fn delete_banner(
    _admin: AdminUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<IdResponse>>, AppError> {
    let existing = find_banner(&state.db, &id).await?;

    let db = state.db.clone();
    state
        .blobs
        .delete(&[existing.image_key], || async move {
            banner::Entity::delete_by_id(existing.id).exec(&db).await?;
            Ok::<_, AppError>(())
        })
        .await?;

    Ok(ApiResponse::ok(IdResponse::new(id)))
}

async fn find_banner<C: ConnectionTrait>(db: &C, id: &str) -> Result<banner::Model, AppError> {
    banner::Entity::find_by_id(id.to_string())
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Banner not found".into()))
}
